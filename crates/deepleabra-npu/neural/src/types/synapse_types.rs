// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Synapse type definitions

/// A single synapse as seen by conductance propagation.
///
/// Learning state (long-term weight, weight change, etc.) belongs to the learning
/// engine and is not stored here.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Synapse {
    /// Effective synaptic weight
    pub wt: f32,
}

impl Synapse {
    #[inline(always)]
    pub fn new(wt: f32) -> Self {
        Self { wt }
    }
}
