// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration type definitions
//!
//! This module defines all configuration structs that map to sections in
//! `deepleabra_configuration.toml`.

use deepleabra_npu_neural::{BurstQuarters, OptThreshParams, WtInitParams, WtScaleParams};
use serde::{Deserialize, Serialize};

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DeepLeabraConfig {
    pub system: SystemConfig,
    pub projection: ProjectionConfig,
    pub burst: BurstConfig,
    pub engine: EngineConfig,
}

/// System-level configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SystemConfig {
    /// Worker threads for parallel fan-out (0 = auto-detect)
    pub max_cores: usize,
    /// Force `debug` logging regardless of `log_level`
    pub debug: bool,
    pub log_level: String,
    /// Seed for weight initialization
    pub seed: u64,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            max_cores: 0,
            debug: false,
            log_level: "info".to_string(),
            seed: 1,
        }
    }
}

/// Defaults applied to every new projection
///
/// ```toml
/// [projection.wt_init]
/// mean = 0.5
/// var = 0.25
/// dist = "Uniform"
///
/// [projection.wt_scale]
/// abs = 1.0
/// rel = 1.0
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ProjectionConfig {
    pub wt_init: WtInitParams,
    pub wt_scale: WtScaleParams,
}

/// Burst timing and send gating
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct BurstConfig {
    /// Quarters in which deep bursting is active, e.g. `["Q2", "Q4"]`
    pub burst_quarters: BurstQuarters,
    pub cycles_per_quarter: usize,
    pub opt_thresh: OptThreshParams,
}

impl Default for BurstConfig {
    fn default() -> Self {
        Self {
            burst_quarters: BurstQuarters::default(),
            cycles_per_quarter: 25,
            opt_thresh: OptThreshParams::default(),
        }
    }
}

/// Scheduler configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Send batches with at least this many senders use per-worker partial accumulators
    pub par_send_threshold: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            par_send_threshold: 256,
        }
    }
}
