// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Standard (Vec-based) storage
//!
//! Dynamic allocation sized at build time. After `build`, no per-cycle allocation
//! happens on the base pathway.

pub mod base_prjn;
pub mod connect_pattern;

pub use base_prjn::{flush_accumulator, BasePrjn};
pub use connect_pattern::ConnectPattern;
