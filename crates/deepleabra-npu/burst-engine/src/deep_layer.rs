// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Deep layer: a population carrying superficial activation, deep bursts and the
//! conductances deep projections deliver into.
//!
//! Layer dynamics (how `act` and `burst` evolve) are driven from outside; this type
//! holds the state the projection engine reads and writes.

use deepleabra_npu_runtime::{DeepConductances, Population};
use thiserror::Error;

/// Default expected activity used for conductance scaling
pub const DEFAULT_ACT_AVG: f32 = 0.15;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayerError {
    #[error("Layer '{layer}': {field} has {got} values, expected {expected}")]
    SizeMismatch {
        layer: String,
        field: &'static str,
        expected: usize,
        got: usize,
    },
}

/// Per-unit layer state (System-of-Arrays)
#[derive(Debug, Clone)]
pub struct DeepLayer {
    name: String,
    act_avg: f32,

    /// Superficial activation
    pub act: Vec<f32>,
    /// Deep burst activation
    pub burst: Vec<f32>,
    /// Last activation sent on activation-driven projections
    pub act_sent: Vec<f32>,
    /// Last burst sent on per-cycle burst projections
    pub burst_sent: Vec<f32>,
    /// Last burst sent on end-of-quarter context projections
    pub ctxt_sent: Vec<f32>,

    /// Raw excitatory conductance from base projections
    pub ge_raw: Vec<f32>,
    /// Attentional conductance
    pub attn_ge: Vec<f32>,
    /// Burst conductance
    pub trc_burst_ge: Vec<f32>,
}

impl DeepLayer {
    pub fn new(name: impl Into<String>, num_units: usize) -> Self {
        Self {
            name: name.into(),
            act_avg: DEFAULT_ACT_AVG,
            act: vec![0.0; num_units],
            burst: vec![0.0; num_units],
            act_sent: vec![0.0; num_units],
            burst_sent: vec![0.0; num_units],
            ctxt_sent: vec![0.0; num_units],
            ge_raw: vec![0.0; num_units],
            attn_ge: vec![0.0; num_units],
            trc_burst_ge: vec![0.0; num_units],
        }
    }

    /// Set the expected activity used when scaling incoming projections
    pub fn with_act_avg(mut self, act_avg: f32) -> Self {
        self.act_avg = act_avg;
        self
    }

    pub fn set_act_avg(&mut self, act_avg: f32) {
        self.act_avg = act_avg;
    }

    pub fn set_acts(&mut self, acts: &[f32]) -> Result<(), LayerError> {
        self.check_len("act", acts.len())?;
        self.act.copy_from_slice(acts);
        Ok(())
    }

    pub fn set_bursts(&mut self, bursts: &[f32]) -> Result<(), LayerError> {
        self.check_len("burst", bursts.len())?;
        self.burst.copy_from_slice(bursts);
        Ok(())
    }

    /// Zero activations, sent trackers and conductances
    pub fn init_acts(&mut self) {
        for field in [
            &mut self.act,
            &mut self.burst,
            &mut self.act_sent,
            &mut self.burst_sent,
            &mut self.ctxt_sent,
            &mut self.ge_raw,
            &mut self.attn_ge,
            &mut self.trc_burst_ge,
        ] {
            field.fill(0.0);
        }
    }

    /// Zero only the conductances (start of a new cycle's integration)
    pub fn init_conductances(&mut self) {
        self.ge_raw.fill(0.0);
        self.attn_ge.fill(0.0);
        self.trc_burst_ge.fill(0.0);
    }

    fn check_len(&self, field: &'static str, got: usize) -> Result<(), LayerError> {
        if got != self.act.len() {
            return Err(LayerError::SizeMismatch {
                layer: self.name.clone(),
                field,
                expected: self.act.len(),
                got,
            });
        }
        Ok(())
    }
}

impl Population for DeepLayer {
    fn name(&self) -> &str {
        &self.name
    }

    fn num_units(&self) -> usize {
        self.act.len()
    }

    fn act_avg(&self) -> f32 {
        self.act_avg
    }

    fn ge_raw(&self) -> &[f32] {
        &self.ge_raw
    }

    fn ge_raw_mut(&mut self) -> &mut [f32] {
        &mut self.ge_raw
    }
}

impl DeepConductances for DeepLayer {
    fn attn_ge(&self) -> &[f32] {
        &self.attn_ge
    }

    fn trc_burst_ge(&self) -> &[f32] {
        &self.trc_burst_ge
    }

    fn attn_ge_mut(&mut self) -> &mut [f32] {
        &mut self.attn_ge
    }

    fn trc_burst_ge_mut(&mut self) -> &mut [f32] {
        &mut self.trc_burst_ge
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_layer_is_zeroed() {
        let layer = DeepLayer::new("V1", 4);
        assert_eq!(layer.num_units(), 4);
        assert_eq!(layer.act_avg(), DEFAULT_ACT_AVG);
        assert!(layer.attn_ge().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_set_acts_size_mismatch() {
        let mut layer = DeepLayer::new("V1", 3);
        let err = layer.set_acts(&[0.1, 0.2]).unwrap_err();
        assert_eq!(
            err,
            LayerError::SizeMismatch {
                layer: "V1".to_string(),
                field: "act",
                expected: 3,
                got: 2,
            }
        );
        assert!(layer.set_bursts(&[0.0; 3]).is_ok());
    }

    #[test]
    fn test_init_acts_clears_everything() {
        let mut layer = DeepLayer::new("V1", 2);
        layer.set_acts(&[0.5, 0.7]).unwrap();
        layer.act_sent[0] = 0.5;
        layer.trc_burst_ge[1] = 1.0;
        layer.init_acts();
        assert_eq!(layer.act, vec![0.0, 0.0]);
        assert_eq!(layer.act_sent, vec![0.0, 0.0]);
        assert_eq!(layer.trc_burst_ge, vec![0.0, 0.0]);
    }

    #[test]
    fn test_init_conductances_keeps_activity() {
        let mut layer = DeepLayer::new("V1", 2);
        layer.set_bursts(&[0.4, 0.0]).unwrap();
        layer.burst_sent[0] = 0.4;
        layer.ge_raw[0] = 1.0;
        layer.attn_ge[1] = 2.0;
        layer.trc_burst_ge[0] = 3.0;
        layer.init_conductances();
        assert_eq!(layer.ge_raw, vec![0.0, 0.0]);
        assert_eq!(layer.attn_ge, vec![0.0, 0.0]);
        assert_eq!(layer.trc_burst_ge, vec![0.0, 0.0]);
        assert_eq!(layer.burst, vec![0.4, 0.0]);
        assert_eq!(layer.burst_sent, vec![0.4, 0.0]);
    }
}
