// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! # Cycle Scheduler
//!
//! Owns layers and projections and runs one cycle at a time:
//!
//! 1. **Plan**: every sending layer computes thresholded deltas for each signal a
//!    projection currently needs (activation, burst, end-of-quarter context)
//! 2. **Fan-out**: projections send in parallel, each batching its senders through
//!    per-worker partial accumulators
//! 3. **Barrier**: the parallel fan-out joins before anything is received
//! 4. **Fan-in**: each projection delivers into its receiving layer, sequentially
//!
//! Cadence comes from the projection type: `BurstTRC` only sends inside burst quarters,
//! `BurstCtxt` only on the last cycle of a burst quarter, everything else every cycle.

use crate::deep_layer::{DeepLayer, LayerError};
use crate::deep_prjn::DeepPrjn;
use crate::parallel_send::SendDelta;
use crate::BurstEngineStats;
use ahash::AHashMap;
use deepleabra_npu_neural::{
    BurstQuarters, DeepChannel, OptThreshParams, PrjnType, Quarter, SendCadence, WtInitParams,
    WtScaleParams,
};
use deepleabra_npu_runtime::{BuildError, ConnectPattern, Population};
use rand::{rngs::StdRng, SeedableRng};
use rayon::prelude::*;
use std::fmt;
use std::sync::OnceLock;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info, trace, warn};

/// Runtime-gated per-cycle send tracing.
/// Enable with DEEPLEABRA_TRACE_SEND=1
fn send_trace_enabled() -> bool {
    static ENABLED: OnceLock<bool> = OnceLock::new();
    *ENABLED.get_or_init(|| {
        std::env::var("DEEPLEABRA_TRACE_SEND")
            .ok()
            .as_deref()
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    })
}

#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("Unknown layer '{0}'")]
    UnknownLayer(String),

    #[error("Layer '{0}' already exists")]
    DuplicateLayer(String),

    #[error("Failed to build projection '{prjn}': {source}")]
    Build {
        prjn: String,
        #[source]
        source: BuildError,
    },

    #[error("Network must be built before cycling")]
    NotBuilt,

    #[error(transparent)]
    Layer(#[from] LayerError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PrjnId(pub usize);

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "layer#{}", self.0)
    }
}

impl fmt::Display for PrjnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "prjn#{}", self.0)
    }
}

/// Network-wide parameters
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkParams {
    /// Initial weights for newly connected projections
    pub wt_init: WtInitParams,
    /// Strength for newly connected projections
    pub wt_scale: WtScaleParams,
    /// Quarters in which deep bursting is active
    pub burst_quarters: BurstQuarters,
    pub cycles_per_quarter: usize,
    pub opt_thresh: OptThreshParams,
    /// Batches with at least this many senders use the parallel send path
    pub par_send_threshold: usize,
}

impl Default for NetworkParams {
    fn default() -> Self {
        Self {
            wt_init: WtInitParams::default(),
            wt_scale: WtScaleParams::default(),
            burst_quarters: BurstQuarters::default(),
            cycles_per_quarter: 25,
            opt_thresh: OptThreshParams::default(),
            par_send_threshold: 256,
        }
    }
}

/// Position within a trial
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleTime {
    pub quarter: Quarter,
    /// Cycle within the quarter, starting at 0
    pub cycle: usize,
    pub cycles_per_quarter: usize,
}

impl CycleTime {
    pub fn new(quarter: Quarter, cycle: usize, cycles_per_quarter: usize) -> Self {
        Self {
            quarter,
            cycle,
            cycles_per_quarter,
        }
    }

    /// Last cycle of the quarter
    pub fn is_quarter_end(&self) -> bool {
        self.cycle + 1 >= self.cycles_per_quarter
    }
}

/// What one cycle did
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CycleReport {
    /// Units that sent an activation delta
    pub act_sends: usize,
    /// Units that sent a per-cycle burst delta
    pub burst_sends: usize,
    /// Units that sent an end-of-quarter context delta
    pub ctxt_sends: usize,
    /// Projections with a non-empty send batch
    pub prjns_sent: usize,
    pub synapses_touched: u64,
    pub elapsed_us: u64,
}

impl CycleReport {
    pub fn total_sends(&self) -> usize {
        self.act_sends + self.burst_sends + self.ctxt_sends
    }
}

#[derive(Debug, Clone)]
struct PrjnEntry {
    prjn: DeepPrjn,
    send: LayerId,
    recv: LayerId,
}

/// Which signals a sending layer must compute this cycle
#[derive(Debug, Clone, Copy, Default)]
struct SignalNeeds {
    act: bool,
    burst: bool,
    ctxt: bool,
}

/// Thresholded deltas of one sending layer
#[derive(Debug, Default)]
struct LayerSends {
    act: Vec<SendDelta>,
    burst: Vec<SendDelta>,
    ctxt: Vec<SendDelta>,
}

impl LayerSends {
    fn for_type(&self, prjn_type: PrjnType) -> &[SendDelta] {
        match prjn_type {
            PrjnType::BurstCtxt => &self.ctxt,
            PrjnType::BurstTrc => &self.burst,
            _ => &self.act,
        }
    }
}

fn thresholded(opt: &OptThreshParams, values: &[f32], sent: &mut [f32]) -> Vec<SendDelta> {
    values
        .iter()
        .zip(sent.iter_mut())
        .enumerate()
        .filter_map(|(i, (&v, s))| opt.delta_to_send(v, s).map(|d| (i, d)))
        .collect()
}

fn cadence_active(cadence: SendCadence, in_burst: bool, quarter_end: bool) -> bool {
    match cadence {
        SendCadence::EveryCycle => true,
        SendCadence::DuringBurst => in_burst,
        SendCadence::BurstQuarterEnd => in_burst && quarter_end,
    }
}

/// Layers, projections and the cycle loop
#[derive(Debug, Clone, Default)]
pub struct DeepNetwork {
    params: NetworkParams,
    layers: Vec<DeepLayer>,
    layer_index: AHashMap<String, LayerId>,
    prjns: Vec<PrjnEntry>,
    stats: BurstEngineStats,
    built: bool,
}

impl DeepNetwork {
    pub fn new(params: NetworkParams) -> Self {
        Self {
            params,
            ..Default::default()
        }
    }

    pub fn params(&self) -> &NetworkParams {
        &self.params
    }

    pub fn params_mut(&mut self) -> &mut NetworkParams {
        &mut self.params
    }

    pub fn stats(&self) -> &BurstEngineStats {
        &self.stats
    }

    pub fn is_built(&self) -> bool {
        self.built
    }

    // === Topology ===

    pub fn add_layer(&mut self, layer: DeepLayer) -> Result<LayerId, NetworkError> {
        let name = layer.name().to_string();
        if self.layer_index.contains_key(&name) {
            return Err(NetworkError::DuplicateLayer(name));
        }
        let id = LayerId(self.layers.len());
        self.layers.push(layer);
        self.layer_index.insert(name, id);
        self.built = false;
        Ok(id)
    }

    /// Connect two layers by name. The projection is named `<send>To<recv>`.
    pub fn connect(
        &mut self,
        send: &str,
        recv: &str,
        prjn_type: PrjnType,
        pattern: ConnectPattern,
    ) -> Result<PrjnId, NetworkError> {
        let send_id = self.layer_id(send)?;
        let recv_id = self.layer_id(recv)?;
        let mut prjn = DeepPrjn::new(format!("{}To{}", send, recv), prjn_type, pattern);
        prjn.base_mut().wt_init = self.params.wt_init;
        prjn.base_mut().wt_scale = self.params.wt_scale;

        let id = PrjnId(self.prjns.len());
        self.prjns.push(PrjnEntry {
            prjn,
            send: send_id,
            recv: recv_id,
        });
        self.built = false;
        Ok(id)
    }

    pub fn layer_id(&self, name: &str) -> Result<LayerId, NetworkError> {
        self.layer_index
            .get(name)
            .copied()
            .ok_or_else(|| NetworkError::UnknownLayer(name.to_string()))
    }

    pub fn layer(&self, id: LayerId) -> Option<&DeepLayer> {
        self.layers.get(id.0)
    }

    pub fn layer_mut(&mut self, id: LayerId) -> Option<&mut DeepLayer> {
        self.layers.get_mut(id.0)
    }

    pub fn layer_by_name(&self, name: &str) -> Option<&DeepLayer> {
        let id = self.layer_index.get(name)?;
        self.layers.get(id.0)
    }

    pub fn layers(&self) -> &[DeepLayer] {
        &self.layers
    }

    pub fn prjn(&self, id: PrjnId) -> Option<&DeepPrjn> {
        self.prjns.get(id.0).map(|e| &e.prjn)
    }

    pub fn prjn_mut(&mut self, id: PrjnId) -> Option<&mut DeepPrjn> {
        self.prjns.get_mut(id.0).map(|e| &mut e.prjn)
    }

    pub fn num_prjns(&self) -> usize {
        self.prjns.len()
    }

    /// Sending and receiving layer of a projection
    pub fn prjn_layers(&self, id: PrjnId) -> Option<(LayerId, LayerId)> {
        self.prjns.get(id.0).map(|e| (e.send, e.recv))
    }

    pub fn set_acts(&mut self, layer: &str, acts: &[f32]) -> Result<(), NetworkError> {
        let id = self.layer_id(layer)?;
        self.layers[id.0].set_acts(acts)?;
        Ok(())
    }

    pub fn set_bursts(&mut self, layer: &str, bursts: &[f32]) -> Result<(), NetworkError> {
        let id = self.layer_id(layer)?;
        self.layers[id.0].set_bursts(bursts)?;
        Ok(())
    }

    // === Lifecycle ===

    /// Build every projection and compute conductance scales
    pub fn build(&mut self) -> Result<(), NetworkError> {
        self.built = false;
        for entry in &mut self.prjns {
            let send_n = self.layers[entry.send.0].num_units();
            let recv_n = self.layers[entry.recv.0].num_units();
            entry.prjn.update_params();
            entry
                .prjn
                .build(send_n, recv_n)
                .map_err(|source| NetworkError::Build {
                    prjn: entry.prjn.name().to_string(),
                    source,
                })?;
        }
        self.compute_ge_scales();
        self.built = true;
        info!(
            "[NETWORK] Built {} layers, {} projections",
            self.layers.len(),
            self.prjns.len()
        );
        Ok(())
    }

    /// Set every projection's `ge_scale`, normalizing `rel` over the projections that
    /// share a receiving layer and channel.
    pub fn compute_ge_scales(&mut self) {
        let mut rel_sums: AHashMap<(LayerId, Option<DeepChannel>), f32> = AHashMap::new();
        for entry in &self.prjns {
            let key = (entry.recv, entry.prjn.prjn_type().deep_channel());
            *rel_sums.entry(key).or_insert(0.0) += entry.prjn.base().wt_scale.rel;
        }

        for entry in &mut self.prjns {
            let send = &self.layers[entry.send.0];
            let base = entry.prjn.base();
            let ncon = base.avg_rcon_n().round() as usize;
            if ncon == 0 && base.recv_n() > 0 {
                warn!(
                    "[NETWORK] Projection {} has no connections, scale is degenerate",
                    entry.prjn.name()
                );
            }
            let full = base
                .wt_scale
                .full_scale(send.act_avg(), send.num_units(), ncon);
            let key = (entry.recv, entry.prjn.prjn_type().deep_channel());
            let sum_rel = rel_sums.get(&key).copied().unwrap_or(0.0);
            let scale = if sum_rel > 0.0 {
                full / sum_rel
            } else {
                warn!(
                    "[NETWORK] Projection {} has zero relative strength, scale set to 0",
                    entry.prjn.name()
                );
                0.0
            };
            debug!(
                "[NETWORK] {} ({}): ge_scale {:.4}",
                entry.prjn.name(),
                entry.prjn.prjn_type(),
                scale
            );
            entry.prjn.base_mut().set_ge_scale(scale);
        }
    }

    /// Initialize weights from a seed and reset all layer and accumulator state
    pub fn init_wts(&mut self, seed: u64) {
        let mut rng = StdRng::seed_from_u64(seed);
        for entry in &mut self.prjns {
            entry.prjn.init_wts(&mut rng);
        }
        for layer in &mut self.layers {
            layer.init_acts();
        }
        debug!("[NETWORK] Initialized weights (seed {})", seed);
    }

    /// Zero every layer's conductances and every pending projection accumulator.
    ///
    /// Activations and sent trackers are kept, so unchanged signals stay suppressed.
    pub fn init_conductances(&mut self) {
        for entry in &mut self.prjns {
            entry.prjn.init_ge_inc();
        }
        for layer in &mut self.layers {
            layer.init_conductances();
        }
    }

    // === Cycle ===

    /// Run one fan-out / fan-in cycle
    pub fn cycle(&mut self, time: &CycleTime) -> Result<CycleReport, NetworkError> {
        if !self.built {
            return Err(NetworkError::NotBuilt);
        }
        let start = Instant::now();
        let in_burst = self.params.burst_quarters.contains(time.quarter);
        let quarter_end = time.is_quarter_end();

        let mut needs = vec![SignalNeeds::default(); self.layers.len()];
        for entry in &self.prjns {
            let prjn_type = entry.prjn.prjn_type();
            if !cadence_active(prjn_type.cadence(), in_burst, quarter_end) {
                continue;
            }
            let need = &mut needs[entry.send.0];
            match prjn_type {
                PrjnType::BurstCtxt => need.ctxt = true,
                PrjnType::BurstTrc => need.burst = true,
                _ => need.act = true,
            }
        }

        // Plan: thresholded deltas per sending layer
        let opt = self.params.opt_thresh;
        let plans: Vec<LayerSends> = self
            .layers
            .par_iter_mut()
            .zip(needs.par_iter())
            .map(|(layer, need)| {
                let mut sends = LayerSends::default();
                if need.act {
                    sends.act = thresholded(&opt, &layer.act, &mut layer.act_sent);
                }
                if need.burst {
                    sends.burst = thresholded(&opt, &layer.burst, &mut layer.burst_sent);
                }
                if need.ctxt {
                    sends.ctxt = thresholded(&opt, &layer.burst, &mut layer.ctxt_sent);
                }
                sends
            })
            .collect();

        // Fan-out
        let par_threshold = self.params.par_send_threshold;
        let (synapses_touched, prjns_sent) = self
            .prjns
            .par_iter_mut()
            .map(|entry| {
                let sends = plans[entry.send.0].for_type(entry.prjn.prjn_type());
                if sends.is_empty() {
                    return (0u64, 0usize);
                }
                (entry.prjn.send_deltas(sends, par_threshold), 1usize)
            })
            .reduce(|| (0, 0), |a, b| (a.0 + b.0, a.1 + b.1));

        // Fan-in
        for entry in &mut self.prjns {
            let recv = &mut self.layers[entry.recv.0];
            entry.prjn.recv_deltas(recv);
        }

        let report = CycleReport {
            act_sends: plans.iter().map(|p| p.act.len()).sum(),
            burst_sends: plans.iter().map(|p| p.burst.len()).sum(),
            ctxt_sends: plans.iter().map(|p| p.ctxt.len()).sum(),
            prjns_sent,
            synapses_touched,
            elapsed_us: start.elapsed().as_micros() as u64,
        };

        self.stats.total_cycles += 1;
        self.stats.total_unit_sends += report.total_sends() as u64;
        self.stats.total_synapses_processed += report.synapses_touched;
        self.stats.total_processing_time_us += report.elapsed_us;

        if send_trace_enabled() {
            trace!(
                "[CYCLE] {} cycle {}: act {}, burst {}, ctxt {}, prjns {}, synapses {}",
                time.quarter,
                time.cycle,
                report.act_sends,
                report.burst_sends,
                report.ctxt_sends,
                report.prjns_sent,
                report.synapses_touched
            );
        }
        Ok(report)
    }

    /// Run every cycle of one quarter with the configured cycle count
    pub fn run_quarter(&mut self, quarter: Quarter) -> Result<Vec<CycleReport>, NetworkError> {
        let n = self.params.cycles_per_quarter;
        (0..n)
            .map(|cycle| self.cycle(&CycleTime::new(quarter, cycle, n)))
            .collect()
    }
}
