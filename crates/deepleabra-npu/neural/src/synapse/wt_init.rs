// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! Initial weight distribution
//!
//! Weights live in `[0, 1]`. Every draw is clamped into that range.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Shape of the initial weight distribution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WtInitDist {
    /// `mean + var * U(-1, 1)`
    Uniform,
    /// Every weight is `mean`
    Constant,
}

/// Initial weight parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WtInitParams {
    pub mean: f32,
    pub var: f32,
    pub dist: WtInitDist,
}

impl Default for WtInitParams {
    fn default() -> Self {
        Self {
            mean: 0.5,
            var: 0.25,
            dist: WtInitDist::Uniform,
        }
    }
}

impl WtInitParams {
    /// Draw one initial weight.
    ///
    /// # Example
    /// ```
    /// use deepleabra_npu_neural::{WtInitDist, WtInitParams};
    /// use rand::{rngs::StdRng, SeedableRng};
    ///
    /// let params = WtInitParams { mean: 0.3, var: 0.0, dist: WtInitDist::Constant };
    /// let mut rng = StdRng::seed_from_u64(1);
    /// assert_eq!(params.gen(&mut rng), 0.3);
    /// ```
    #[inline]
    pub fn gen<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        let wt = match self.dist {
            WtInitDist::Constant => self.mean,
            WtInitDist::Uniform => {
                if self.var == 0.0 {
                    self.mean
                } else {
                    self.mean + self.var * rng.gen_range(-1.0f32..=1.0)
                }
            }
        };
        wt.clamp(0.0, 1.0)
    }
}
