// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! # Neural Types Module
//!
//! Core type definitions shared by the runtime and the burst engine.

pub mod prjn_type;
pub mod quarter;
pub mod synapse_types;

// Re-export commonly used types
pub use prjn_type::{DeepChannel, ParsePrjnTypeError, PrjnType, SendCadence};
pub use quarter::{BurstQuarters, Quarter};
pub use synapse_types::Synapse;
