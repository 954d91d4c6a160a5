// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! Conductance scaling
//!
//! Every projection multiplies its sending deltas by a single `ge_scale` computed once
//! from population geometry. The scale normalizes for the expected number of active
//! senders a receiver sees, so that a projection's contribution is independent of how
//! large or how sparse the sending layer is. `abs` sets the absolute strength, `rel` the
//! strength relative to other projections into the same receiver (normalized by the
//! caller over the sum of `rel`).

use serde::{Deserialize, Serialize};

/// Extra expected active senders, buffering the estimate for small connection counts.
const SEM_EXTRA: i32 = 2;

/// Absolute and relative projection strength
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WtScaleParams {
    pub abs: f32,
    pub rel: f32,
}

impl Default for WtScaleParams {
    fn default() -> Self {
        Self { abs: 1.0, rel: 1.0 }
    }
}

impl WtScaleParams {
    /// Unnormalized scale: `abs * rel * sender_act_scale(...)`.
    ///
    /// Callers divide by the sum of `rel` across projections into the same receiver.
    #[inline]
    pub fn full_scale(&self, savg: f32, snu: usize, ncon: usize) -> f32 {
        self.abs * self.rel * sender_act_scale(savg, snu, ncon)
    }
}

/// Scale factor for the expected number of active sending units.
///
/// # Arguments
/// * `savg` - expected average activity of the sending layer (fraction active)
/// * `snu` - number of units in the sending layer
/// * `ncon` - number of connections a receiving unit gets from this projection
///
/// # Example
/// ```
/// use deepleabra_npu_neural::sender_act_scale;
///
/// // Full connectivity: 1 / expected active senders
/// assert_eq!(sender_act_scale(0.25, 8, 8), 0.5);
/// ```
pub fn sender_act_scale(savg: f32, snu: usize, ncon: usize) -> f32 {
    if ncon == 0 {
        return 1.0;
    }
    let slay_act_n = ((savg * snu as f32).round() as i32).max(1);
    if ncon == snu {
        return 1.0 / slay_act_n as f32;
    }
    let max_act_n = (ncon as i32).min(slay_act_n);
    let avg_act_n = ((savg * ncon as f32).round() as i32).max(1);
    let exp_act_n = (avg_act_n + SEM_EXTRA).min(max_act_n);
    1.0 / exp_act_n as f32
}
