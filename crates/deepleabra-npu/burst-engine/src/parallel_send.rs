// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! Parallel fan-out with per-worker partial accumulators
//!
//! Senders are split across rayon workers. Each worker scatters into its own zeroed,
//! receiver-sized partial vector (`fold`); partials are summed element-wise (`reduce`)
//! and the merged vector is added into the projection's accumulator by the caller.
//! No two workers ever write the same memory, so contributions from different senders
//! into a shared receiver are neither lost nor duplicated.

use deepleabra_npu_runtime::BasePrjn;
use rayon::prelude::*;

/// A sender index and the delta it sends this cycle
pub type SendDelta = (usize, f32);

/// Scatter every `(si, delta)` through `prjn` into a fresh receiver-sized vector.
///
/// # Panics
/// If any `si` is not a sender of `prjn`.
pub fn par_scatter(prjn: &BasePrjn, sends: &[SendDelta]) -> Vec<f32> {
    let recv_n = prjn.recv_n();
    sends
        .par_iter()
        .fold(
            || vec![0.0f32; recv_n],
            |mut part, &(si, delta)| {
                prjn.scatter(si, delta, &mut part);
                part
            },
        )
        .reduce(
            || vec![0.0f32; recv_n],
            |mut a, b| {
                add_into(&mut a, &b);
                a
            },
        )
}

/// Element-wise `acc += part`.
///
/// # Panics
/// If the lengths differ.
#[inline]
pub fn add_into(acc: &mut [f32], part: &[f32]) {
    assert_eq!(
        acc.len(),
        part.len(),
        "partial accumulator length {} does not match accumulator length {}",
        part.len(),
        acc.len()
    );
    for (a, p) in acc.iter_mut().zip(part) {
        *a += *p;
    }
}

/// Number of synapses a batch of sends will touch
pub fn synapses_touched(prjn: &BasePrjn, sends: &[SendDelta]) -> u64 {
    let scon_n = prjn.scon_n();
    sends
        .iter()
        .map(|&(si, _)| scon_n[si] as u64)
        .sum()
}
