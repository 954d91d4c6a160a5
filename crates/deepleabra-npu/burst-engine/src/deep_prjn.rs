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

//! # Deep Projection
//!
//! A base projection extended with two receiver-sized accumulators:
//! - `attn_ge_inc`: pending attentional conductance (fed by `DeepAttn`)
//! - `trc_burst_ge_inc`: pending burst conductance (fed by `BurstCtxt` and `BurstTRC`)
//!
//! ## Protocol
//! 1. **Fan-out**: any number of `send_*` calls, one per active sending unit, each adding
//!    `delta * ge_scale * wt` into the accumulator entry of every connected receiver.
//! 2. **Barrier**: all sends complete. Both sends and receives take `&mut self`, so a
//!    receive can never overlap a send on the same projection.
//! 3. **Fan-in**: one `recv_*` call adds every accumulator entry into the receiving
//!    layer's conductance and zeroes the accumulator.
//!
//! Index `i` of either accumulator is always receiving unit `i`.

use crate::parallel_send::{add_into, par_scatter, synapses_touched, SendDelta};
use deepleabra_npu_neural::{DeepChannel, PrjnType};
use deepleabra_npu_runtime::{
    flush_accumulator, BasePrjn, BuildError, ConnectPattern, DeepConductances, Population,
};
use rand::Rng;
use tracing::debug;

/// Projection carrying attentional and burst conductance between two layers
#[derive(Debug, Clone)]
pub struct DeepPrjn {
    name: String,
    prjn_type: PrjnType,
    base: BasePrjn,
    attn_ge_inc: Vec<f32>,
    trc_burst_ge_inc: Vec<f32>,
}

impl DeepPrjn {
    /// Create an unbuilt projection. The type tag is fixed for the projection's lifetime.
    pub fn new(name: impl Into<String>, prjn_type: PrjnType, pattern: ConnectPattern) -> Self {
        Self {
            name: name.into(),
            prjn_type,
            base: BasePrjn::new(pattern),
            attn_ge_inc: Vec::new(),
            trc_burst_ge_inc: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn prjn_type(&self) -> PrjnType {
        self.prjn_type
    }

    pub fn base(&self) -> &BasePrjn {
        &self.base
    }

    /// Mutable base projection, for parameters and weights.
    ///
    /// Rebuild through [`DeepPrjn::build`], never through the base, so the deep
    /// accumulators stay sized to the receiving layer.
    pub fn base_mut(&mut self) -> &mut BasePrjn {
        &mut self.base
    }

    // === Lifecycle ===

    /// Reset parameters to their defaults
    pub fn defaults(&mut self) {
        self.base.defaults();
    }

    pub fn update_params(&mut self) {
        self.base.update_params();
    }

    /// Build base connectivity, then size both accumulators to the receiving layer.
    ///
    /// A base build error is returned unchanged and the accumulators are not allocated.
    pub fn build(&mut self, send_n: usize, recv_n: usize) -> Result<(), BuildError> {
        self.base.build(send_n, recv_n)?;
        self.attn_ge_inc = vec![0.0; recv_n];
        self.trc_burst_ge_inc = vec![0.0; recv_n];
        debug!(
            "[DEEP-PRJN] Built {} ({}): accumulators sized to {} receivers",
            self.name, self.prjn_type, recv_n
        );
        Ok(())
    }

    /// Draw initial weights and clear every accumulator
    pub fn init_wts<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.base.init_wts(rng);
        self.init_ge_inc();
    }

    /// Zero the base `Ge` accumulator and both deep accumulators
    pub fn init_ge_inc(&mut self) {
        self.base.init_ge_inc();
        self.attn_ge_inc.fill(0.0);
        self.trc_burst_ge_inc.fill(0.0);
    }

    // === Fan-out ===

    /// Send an attentional delta from sender `si`.
    ///
    /// # Panics
    /// If `si` is not a sender of this projection.
    #[inline]
    pub fn send_attn_ge_delta(&mut self, si: usize, delta: f32) {
        self.base.scatter(si, delta, &mut self.attn_ge_inc);
    }

    /// Send a burst delta from sender `si`.
    ///
    /// # Panics
    /// If `si` is not a sender of this projection.
    #[inline]
    pub fn send_trc_burst_ge_delta(&mut self, si: usize, delta: f32) {
        self.base.scatter(si, delta, &mut self.trc_burst_ge_inc);
    }

    /// Send a batch of attentional deltas using per-worker partial accumulators
    pub fn send_attn_ge_deltas_par(&mut self, sends: &[SendDelta]) {
        let merged = par_scatter(&self.base, sends);
        add_into(&mut self.attn_ge_inc, &merged);
    }

    /// Send a batch of burst deltas using per-worker partial accumulators
    pub fn send_trc_burst_ge_deltas_par(&mut self, sends: &[SendDelta]) {
        let merged = par_scatter(&self.base, sends);
        add_into(&mut self.trc_burst_ge_inc, &merged);
    }

    /// Send a batch on the channel selected by this projection's type.
    ///
    /// Batches of at least `par_threshold` senders go through the parallel path.
    /// Returns the number of synapses touched.
    pub fn send_deltas(&mut self, sends: &[SendDelta], par_threshold: usize) -> u64 {
        if sends.is_empty() {
            return 0;
        }
        let touched = synapses_touched(&self.base, sends);
        let channel = self.prjn_type.deep_channel();
        if sends.len() >= par_threshold.max(2) {
            let merged = par_scatter(&self.base, sends);
            add_into(self.channel_acc_mut(), &merged);
        } else {
            for &(si, delta) in sends {
                match channel {
                    Some(DeepChannel::Attn) => self.send_attn_ge_delta(si, delta),
                    Some(DeepChannel::Burst) => self.send_trc_burst_ge_delta(si, delta),
                    None => self.base.send_ge_delta(si, delta),
                }
            }
        }
        touched
    }

    fn channel_acc_mut(&mut self) -> &mut [f32] {
        match self.prjn_type.deep_channel() {
            Some(DeepChannel::Attn) => &mut self.attn_ge_inc,
            Some(DeepChannel::Burst) => &mut self.trc_burst_ge_inc,
            None => self.base.ge_inc_mut(),
        }
    }

    // === Fan-in ===

    /// Deliver pending attentional conductance into `recv` and zero the accumulator.
    ///
    /// # Panics
    /// If the accumulator and `recv` differ in size (e.g. before `build`).
    pub fn recv_attn_ge_inc<D: DeepConductances + ?Sized>(&mut self, recv: &mut D) {
        flush_accumulator(&mut self.attn_ge_inc, recv.attn_ge_mut());
    }

    /// Deliver pending burst conductance into `recv` and zero the accumulator.
    ///
    /// # Panics
    /// If the accumulator and `recv` differ in size (e.g. before `build`).
    pub fn recv_trc_burst_ge_inc<D: DeepConductances + ?Sized>(&mut self, recv: &mut D) {
        flush_accumulator(&mut self.trc_burst_ge_inc, recv.trc_burst_ge_mut());
    }

    /// Deliver the base accumulator into `recv`'s raw excitatory conductance
    pub fn recv_ge_inc<P: Population + ?Sized>(&mut self, recv: &mut P) {
        self.base.recv_ge_inc(recv.ge_raw_mut());
    }

    /// Receive on the channel selected by this projection's type
    pub fn recv_deltas<D: DeepConductances + ?Sized>(&mut self, recv: &mut D) {
        match self.prjn_type.deep_channel() {
            Some(DeepChannel::Attn) => self.recv_attn_ge_inc(recv),
            Some(DeepChannel::Burst) => self.recv_trc_burst_ge_inc(recv),
            None => self.recv_ge_inc(recv),
        }
    }

    // === Accumulators (Read-Only) ===

    pub fn attn_ge_inc(&self) -> &[f32] {
        &self.attn_ge_inc
    }

    pub fn trc_burst_ge_inc(&self) -> &[f32] {
        &self.trc_burst_ge_inc
    }
}
