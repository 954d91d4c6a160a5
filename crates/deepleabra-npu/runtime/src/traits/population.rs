// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Population traits: System-of-Arrays access for receiving layers
//!
//! - All per-unit properties are exposed as slices
//! - Mutations are explicit via `_mut()` methods
//! - Every slice has length `num_units()`

/// A layer of units
pub trait Population: Send + Sync {
    /// Layer name (unique within a network)
    fn name(&self) -> &str;

    /// Number of units
    fn num_units(&self) -> usize;

    /// Expected average activity, used to scale incoming projections
    fn act_avg(&self) -> f32;

    /// Raw excitatory conductance accumulated from base projections
    fn ge_raw(&self) -> &[f32];

    /// Mutable raw excitatory conductance
    fn ge_raw_mut(&mut self) -> &mut [f32];
}

/// A population that accepts deep conductances
///
/// Deep projections deliver into exactly these two fields. A layer that does not
/// implement this trait cannot be the receiver of a deep projection.
pub trait DeepConductances: Population {
    /// Attentional conductance
    fn attn_ge(&self) -> &[f32];

    /// Burst (thalamic relay) conductance
    fn trc_burst_ge(&self) -> &[f32];

    /// Mutable attentional conductance
    fn attn_ge_mut(&mut self) -> &mut [f32];

    /// Mutable burst conductance
    fn trc_burst_ge_mut(&mut self) -> &mut [f32];
}
