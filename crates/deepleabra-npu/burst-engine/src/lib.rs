// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 *     http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

//! # DeepLeabra Burst Engine
//!
//! Attentional and burst conductance propagation between cortical layers.
//!
//! ## Architecture
//! - `DeepPrjn`: base projection plus attention and burst accumulators
//! - `DeepLayer`: per-unit activation, burst and conductance state
//! - `DeepNetwork`: per-cycle planning, parallel fan-out, barrier, sequential fan-in
//! - Rayon for multi-threading; per-worker partial accumulators instead of locks
//! - No allocation in the sequential send path after build

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod deep_layer;
pub mod deep_prjn;
pub mod network;
pub mod parallel_send;

pub use deep_layer::{DeepLayer, LayerError, DEFAULT_ACT_AVG};
pub use deep_prjn::DeepPrjn;
pub use network::{
    CycleReport, CycleTime, DeepNetwork, LayerId, NetworkError, NetworkParams, PrjnId,
};
pub use parallel_send::{par_scatter, SendDelta};

/// Burst engine performance statistics
#[derive(Debug, Clone, Default)]
pub struct BurstEngineStats {
    pub total_cycles: u64,
    pub total_unit_sends: u64,
    pub total_synapses_processed: u64,
    pub total_processing_time_us: u64,
}

impl BurstEngineStats {
    /// Get average unit sends per cycle
    pub fn avg_sends_per_cycle(&self) -> f64 {
        if self.total_cycles == 0 {
            0.0
        } else {
            self.total_unit_sends as f64 / self.total_cycles as f64
        }
    }

    /// Get average processing time per cycle (microseconds)
    pub fn avg_processing_time_us(&self) -> f64 {
        if self.total_cycles == 0 {
            0.0
        } else {
            self.total_processing_time_us as f64 / self.total_cycles as f64
        }
    }

    /// Get average synapses touched per unit send
    pub fn avg_synapses_per_send(&self) -> f64 {
        if self.total_unit_sends == 0 {
            0.0
        } else {
            self.total_synapses_processed as f64 / self.total_unit_sends as f64
        }
    }
}
