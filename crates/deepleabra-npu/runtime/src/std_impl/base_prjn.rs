// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! Base projection: sender-side compressed sparse connectivity
//!
//! Layout (per sender `si`):
//! - `scon_n[si]` synapses starting at `scon_idx_st[si]`
//! - `scon_idx[ci]` is the receiver index of synapse `ci`
//! - `syns[ci]` holds its weight
//!
//! Receivers within a sender's run are sorted ascending. Connectivity and weights are
//! read-only while conductance deltas are being sent.

use super::connect_pattern::ConnectPattern;
use crate::error::{BuildError, Result};
use deepleabra_npu_neural::{Synapse, WtInitParams, WtScaleParams};
use rand::Rng;
use std::ops::Range;
use tracing::{debug, warn};

/// Base projection between a sending and a receiving layer
#[derive(Debug, Clone)]
pub struct BasePrjn {
    /// Initial weight distribution
    pub wt_init: WtInitParams,
    /// Absolute and relative strength
    pub wt_scale: WtScaleParams,

    pattern: ConnectPattern,
    send_n: usize,
    recv_n: usize,

    scon_n: Vec<u32>,
    scon_idx_st: Vec<u32>,
    scon_idx: Vec<u32>,
    syns: Vec<Synapse>,
    rcon_n: Vec<u32>,

    ge_scale: f32,
    ge_inc: Vec<f32>,
    built: bool,
}

impl BasePrjn {
    /// Create an unbuilt projection with default parameters
    pub fn new(pattern: ConnectPattern) -> Self {
        let mut prjn = Self {
            wt_init: WtInitParams::default(),
            wt_scale: WtScaleParams::default(),
            pattern,
            send_n: 0,
            recv_n: 0,
            scon_n: Vec::new(),
            scon_idx_st: Vec::new(),
            scon_idx: Vec::new(),
            syns: Vec::new(),
            rcon_n: Vec::new(),
            ge_scale: 1.0,
            ge_inc: Vec::new(),
            built: false,
        };
        prjn.defaults();
        prjn
    }

    /// Reset parameters to their defaults
    pub fn defaults(&mut self) {
        self.wt_init = WtInitParams::default();
        self.wt_scale = WtScaleParams::default();
        self.ge_scale = 1.0;
    }

    /// Bring parameters back into their valid ranges after external edits
    pub fn update_params(&mut self) {
        if !(0.0..=1.0).contains(&self.wt_init.mean) {
            warn!(
                "[PRJN] wt_init.mean {} outside [0, 1], clamping",
                self.wt_init.mean
            );
            self.wt_init.mean = self.wt_init.mean.clamp(0.0, 1.0);
        }
        if self.wt_init.var < 0.0 {
            warn!("[PRJN] wt_init.var {} negative, using 0", self.wt_init.var);
            self.wt_init.var = 0.0;
        }
        if self.wt_scale.abs < 0.0 || self.wt_scale.rel < 0.0 {
            warn!(
                "[PRJN] negative wt_scale (abs {}, rel {}), using magnitude",
                self.wt_scale.abs, self.wt_scale.rel
            );
            self.wt_scale.abs = self.wt_scale.abs.abs();
            self.wt_scale.rel = self.wt_scale.rel.abs();
        }
    }

    /// Build connectivity for the given layer sizes.
    ///
    /// On error nothing is modified.
    pub fn build(&mut self, send_n: usize, recv_n: usize) -> Result<()> {
        let runs = self.pattern.receivers_by_sender(send_n, recv_n)?;
        let total: usize = runs.iter().map(Vec::len).sum();
        if total > u32::MAX as usize {
            return Err(BuildError::TooManySynapses { count: total });
        }

        let mut scon_n = Vec::with_capacity(send_n);
        let mut scon_idx_st = Vec::with_capacity(send_n);
        let mut scon_idx = Vec::with_capacity(total);
        let mut rcon_n = vec![0u32; recv_n];
        for run in &runs {
            scon_idx_st.push(scon_idx.len() as u32);
            scon_n.push(run.len() as u32);
            for &ri in run {
                rcon_n[ri as usize] += 1;
                scon_idx.push(ri);
            }
        }

        self.send_n = send_n;
        self.recv_n = recv_n;
        self.scon_n = scon_n;
        self.scon_idx_st = scon_idx_st;
        self.scon_idx = scon_idx;
        self.syns = vec![Synapse::default(); total];
        self.rcon_n = rcon_n;
        self.ge_inc = vec![0.0; recv_n];
        self.built = true;

        debug!(
            "[PRJN] Built {} projection: {} senders -> {} receivers, {} synapses",
            self.pattern.name(),
            send_n,
            recv_n,
            total
        );
        Ok(())
    }

    /// Draw initial weights
    pub fn init_wts<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let params = self.wt_init;
        for syn in &mut self.syns {
            syn.wt = params.gen(rng);
        }
    }

    /// Zero the base `Ge` accumulator
    pub fn init_ge_inc(&mut self) {
        self.ge_inc.fill(0.0);
    }

    // === Connectivity (Read-Only) ===

    pub fn pattern(&self) -> &ConnectPattern {
        &self.pattern
    }

    pub fn is_built(&self) -> bool {
        self.built
    }

    pub fn send_n(&self) -> usize {
        self.send_n
    }

    pub fn recv_n(&self) -> usize {
        self.recv_n
    }

    pub fn num_syns(&self) -> usize {
        self.syns.len()
    }

    pub fn scon_n(&self) -> &[u32] {
        &self.scon_n
    }

    pub fn scon_idx_st(&self) -> &[u32] {
        &self.scon_idx_st
    }

    pub fn scon_idx(&self) -> &[u32] {
        &self.scon_idx
    }

    pub fn rcon_n(&self) -> &[u32] {
        &self.rcon_n
    }

    /// Mean receiver-side connection count (0 for an empty receiver)
    pub fn avg_rcon_n(&self) -> f32 {
        if self.rcon_n.is_empty() {
            return 0.0;
        }
        let sum: u64 = self.rcon_n.iter().map(|&n| n as u64).sum();
        sum as f32 / self.rcon_n.len() as f32
    }

    /// Synapse index range of sender `si`.
    ///
    /// # Panics
    /// If `si` is not a sender of this projection.
    #[inline]
    pub fn sender_range(&self, si: usize) -> Range<usize> {
        assert!(
            si < self.send_n,
            "sender index {} out of range for projection with {} senders",
            si,
            self.send_n
        );
        let st = self.scon_idx_st[si] as usize;
        st..st + self.scon_n[si] as usize
    }

    /// Synapse index for `(si, ri)`, if connected
    pub fn syn_index(&self, si: usize, ri: usize) -> Option<usize> {
        let range = self.sender_range(si);
        let start = range.start;
        self.scon_idx[range]
            .binary_search(&(ri as u32))
            .ok()
            .map(|off| start + off)
    }

    // === Weights ===

    pub fn syns(&self) -> &[Synapse] {
        &self.syns
    }

    pub fn syns_mut(&mut self) -> &mut [Synapse] {
        &mut self.syns
    }

    /// Set the weight of synapse `(si, ri)`. Returns false if they are not connected.
    pub fn set_wt(&mut self, si: usize, ri: usize, wt: f32) -> bool {
        match self.syn_index(si, ri) {
            Some(ci) => {
                self.syns[ci].wt = wt;
                true
            }
            None => false,
        }
    }

    // === Conductance scale ===

    pub fn ge_scale(&self) -> f32 {
        self.ge_scale
    }

    pub fn set_ge_scale(&mut self, scale: f32) {
        self.ge_scale = scale;
    }

    // === Base Ge pathway ===

    /// Scatter `delta * ge_scale * wt` from sender `si` into any receiver-sized buffer.
    #[inline]
    pub fn scatter(&self, si: usize, delta: f32, acc: &mut [f32]) {
        let range = self.sender_range(si);
        scatter_run(&self.scon_idx, &self.syns, range, delta * self.ge_scale, acc);
    }

    /// Send a delta from sender `si` into the base `Ge` accumulator
    #[inline]
    pub fn send_ge_delta(&mut self, si: usize, delta: f32) {
        let range = self.sender_range(si);
        scatter_run(
            &self.scon_idx,
            &self.syns,
            range,
            delta * self.ge_scale,
            &mut self.ge_inc,
        );
    }

    /// Deliver the base accumulator into the receiving layer's raw conductance
    pub fn recv_ge_inc(&mut self, ge_raw: &mut [f32]) {
        flush_accumulator(&mut self.ge_inc, ge_raw);
    }

    pub fn ge_inc(&self) -> &[f32] {
        &self.ge_inc
    }

    /// Mutable base accumulator, for merging externally computed partial sums
    pub fn ge_inc_mut(&mut self) -> &mut [f32] {
        &mut self.ge_inc
    }
}

#[inline]
fn scatter_run(scon_idx: &[u32], syns: &[Synapse], range: Range<usize>, scaled: f32, acc: &mut [f32]) {
    for ci in range {
        acc[scon_idx[ci] as usize] += scaled * syns[ci].wt;
    }
}

/// Add every accumulator entry into `dst` and zero the accumulator.
///
/// # Panics
/// If the lengths differ.
#[inline]
pub fn flush_accumulator(acc: &mut [f32], dst: &mut [f32]) {
    assert_eq!(
        acc.len(),
        dst.len(),
        "accumulator length {} does not match receiving layer size {}",
        acc.len(),
        dst.len()
    );
    for (d, a) in dst.iter_mut().zip(acc.iter_mut()) {
        *d += *a;
        *a = 0.0;
    }
}
