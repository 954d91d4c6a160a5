// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! Synaptic parameter module
//!
//! Pure functions and parameter structs for weight initialization and conductance scaling.

pub mod wt_init;
pub mod wt_scale;

pub use wt_init::*;
pub use wt_scale::*;
