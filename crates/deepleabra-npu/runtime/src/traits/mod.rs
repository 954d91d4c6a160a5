// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Population abstraction traits
//!
//! Projections never know the concrete layer type they deliver into. They only need a
//! unit count for sizing and slice access to the conductance fields they feed.

pub mod population;

pub use population::{DeepConductances, Population};
