// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! # DeepLeabra Neural Types (Platform-Agnostic)
//!
//! Everything the projection engine needs that does not own storage:
//! - **Types**: projection type taxonomy, quarters, synapse record
//! - **Synapse**: weight initialization and conductance scale math
//! - **Thresholds**: delta-based send gating
//!
//! No allocation-heavy state lives here; storage is in `deepleabra-npu-runtime`.

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod types;

// Synaptic parameter algorithms
pub mod synapse;

pub mod opt_thresh;

// Re-export everything for convenience
pub use opt_thresh::OptThreshParams;

pub use types::{
    BurstQuarters, DeepChannel, ParsePrjnTypeError, PrjnType, Quarter, SendCadence, Synapse,
};

pub use synapse::{sender_act_scale, WtInitDist, WtInitParams, WtScaleParams};
