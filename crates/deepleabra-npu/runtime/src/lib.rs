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

//! # DeepLeabra Base Synaptic Engine
//!
//! Storage and propagation underneath the deep projections.
//!
//! This crate provides:
//! - **Traits**: `Population` (any layer of units) and `DeepConductances` (a layer that
//!   accepts attentional and burst conductance)
//! - **Std Implementation**: `BasePrjn`, a sender-side compressed sparse projection with
//!   weights, a conductance scale and the base `Ge` accumulator
//! - **Errors**: `BuildError` raised while building connectivity
//!
//! ## Usage
//!
//! ```rust
//! use deepleabra_npu_runtime::{BasePrjn, ConnectPattern};
//!
//! let mut prjn = BasePrjn::new(ConnectPattern::Full);
//! prjn.build(4, 3).unwrap();
//! assert_eq!(prjn.num_syns(), 12);
//! ```

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod error;

// Traits module
pub mod traits;

// Standard library implementation
pub mod std_impl;

pub use error::{BuildError, Result};
pub use std_impl::{flush_accumulator, BasePrjn, ConnectPattern};
pub use traits::{DeepConductances, Population};
