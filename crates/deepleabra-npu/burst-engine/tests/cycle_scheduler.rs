// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! # Integration Tests: Cycle Scheduler
//!
//! - Send cadence per projection type across quarters
//! - Delta gating of activation and burst signals
//! - Conservation across projections sharing a receiving layer

use deepleabra_npu_burst_engine::{
    CycleTime, DeepLayer, DeepNetwork, NetworkParams, PrjnId,
};
use deepleabra_npu_neural::{PrjnType, Quarter};
use deepleabra_npu_runtime::{ConnectPattern, DeepConductances, Population};

// ═══════════════════════════════════════════════════════════
// Helper Functions
// ═══════════════════════════════════════════════════════════

struct DeepCircuit {
    net: DeepNetwork,
    ctxt: PrjnId,
    trc: PrjnId,
    attn: PrjnId,
}

/// Super -> Deep (BurstCtxt), Super -> TRC (BurstTRC), Deep -> Super (DeepAttn)
fn create_deep_circuit() -> DeepCircuit {
    let params = NetworkParams {
        cycles_per_quarter: 3,
        ..Default::default()
    };
    let mut net = DeepNetwork::new(params);
    net.add_layer(DeepLayer::new("Super", 2)).unwrap();
    net.add_layer(DeepLayer::new("Deep", 3)).unwrap();
    net.add_layer(DeepLayer::new("TRC", 3)).unwrap();
    let ctxt = net
        .connect("Super", "Deep", PrjnType::BurstCtxt, ConnectPattern::Full)
        .unwrap();
    let trc = net
        .connect("Super", "TRC", PrjnType::BurstTrc, ConnectPattern::Full)
        .unwrap();
    let attn = net
        .connect("Deep", "Super", PrjnType::DeepAttn, ConnectPattern::Full)
        .unwrap();
    net.build().unwrap();
    net.init_wts(42);
    DeepCircuit {
        net,
        ctxt,
        trc,
        attn,
    }
}

fn layer<'a>(net: &'a DeepNetwork, name: &str) -> &'a DeepLayer {
    net.layer_by_name(name).unwrap()
}

/// Expected increment at every receiver from one sender's delta
fn expected_from_sender(net: &DeepNetwork, prjn: PrjnId, si: usize, delta: f32) -> Vec<f32> {
    let p = net.prjn(prjn).unwrap();
    let base = p.base();
    let mut out = vec![0.0f32; base.recv_n()];
    for ci in base.sender_range(si) {
        out[base.scon_idx()[ci] as usize] += delta * base.ge_scale() * base.syns()[ci].wt;
    }
    out
}

fn assert_close(got: &[f32], want: &[f32]) {
    assert_eq!(got.len(), want.len());
    for (g, w) in got.iter().zip(want) {
        assert!((g - w).abs() < 1e-5, "{:?} vs {:?}", got, want);
    }
}

// ═══════════════════════════════════════════════════════════
// Cadence
// ═══════════════════════════════════════════════════════════

#[test]
fn test_burst_signals_wait_for_burst_quarter() {
    let mut c = create_deep_circuit();
    c.net.set_bursts("Super", &[0.5, 0.0]).unwrap();

    let cpq = c.net.params().cycles_per_quarter;
    for quarter in [Quarter::Q1, Quarter::Q2, Quarter::Q3] {
        for cycle in 0..cpq {
            let report = c.net.cycle(&CycleTime::new(quarter, cycle, cpq)).unwrap();
            assert_eq!(report.burst_sends, 0);
            assert_eq!(report.ctxt_sends, 0);
        }
    }
    assert!(layer(&c.net, "TRC").trc_burst_ge().iter().all(|&v| v == 0.0));
    assert!(layer(&c.net, "Deep").trc_burst_ge().iter().all(|&v| v == 0.0));
}

#[test]
fn test_trc_every_burst_cycle_ctxt_at_quarter_end() {
    let mut c = create_deep_circuit();
    c.net.set_bursts("Super", &[0.5, 0.0]).unwrap();
    let cpq = c.net.params().cycles_per_quarter;

    // First burst cycle: TRC receives, Deep does not
    let r0 = c.net.cycle(&CycleTime::new(Quarter::Q4, 0, cpq)).unwrap();
    assert_eq!(r0.burst_sends, 1);
    assert_eq!(r0.ctxt_sends, 0);
    let want_trc = expected_from_sender(&c.net, c.trc, 0, 0.5);
    assert_close(layer(&c.net, "TRC").trc_burst_ge(), &want_trc);
    assert!(layer(&c.net, "Deep").trc_burst_ge().iter().all(|&v| v == 0.0));

    // Unchanged burst: nothing new to send
    let r1 = c.net.cycle(&CycleTime::new(Quarter::Q4, 1, cpq)).unwrap();
    assert_eq!(r1.burst_sends, 0);
    assert_eq!(r1.ctxt_sends, 0);

    // Quarter end: context goes out once
    let r2 = c.net.cycle(&CycleTime::new(Quarter::Q4, 2, cpq)).unwrap();
    assert_eq!(r2.ctxt_sends, 1);
    let want_deep = expected_from_sender(&c.net, c.ctxt, 0, 0.5);
    assert_close(layer(&c.net, "Deep").trc_burst_ge(), &want_deep);
    assert_close(layer(&c.net, "TRC").trc_burst_ge(), &want_trc);

    // Deep burst never leaks into attention
    assert!(layer(&c.net, "Deep").attn_ge().iter().all(|&v| v == 0.0));
}

#[test]
fn test_attention_every_cycle() {
    let mut c = create_deep_circuit();
    c.net.set_acts("Deep", &[0.4, 0.0, 0.9]).unwrap();

    let report = c.net.cycle(&CycleTime::new(Quarter::Q1, 0, 3)).unwrap();
    assert_eq!(report.act_sends, 2);
    assert!(report.prjns_sent >= 1);

    let a = expected_from_sender(&c.net, c.attn, 0, 0.4);
    let b = expected_from_sender(&c.net, c.attn, 2, 0.9);
    let want: Vec<f32> = a.iter().zip(&b).map(|(x, y)| x + y).collect();
    assert_close(layer(&c.net, "Super").attn_ge(), &want);
    assert!(layer(&c.net, "Super").trc_burst_ge().iter().all(|&v| v == 0.0));
}

// ═══════════════════════════════════════════════════════════
// Delta gating
// ═══════════════════════════════════════════════════════════

#[test]
fn test_small_changes_suppressed_and_retraction_restores_zero() {
    let mut c = create_deep_circuit();
    let t = CycleTime::new(Quarter::Q1, 0, 3);

    c.net.set_acts("Deep", &[0.5, 0.0, 0.0]).unwrap();
    assert_eq!(c.net.cycle(&t).unwrap().act_sends, 1);

    c.net.set_acts("Deep", &[0.502, 0.0, 0.0]).unwrap();
    assert_eq!(c.net.cycle(&t).unwrap().act_sends, 0);

    c.net.set_acts("Deep", &[0.0, 0.0, 0.0]).unwrap();
    assert_eq!(c.net.cycle(&t).unwrap().act_sends, 1);
    for &v in layer(&c.net, "Super").attn_ge() {
        assert!(v.abs() < 1e-6, "attention should return to zero, got {}", v);
    }

    // Already retracted
    assert_eq!(c.net.cycle(&t).unwrap().act_sends, 0);
}

#[test]
fn test_run_quarter_and_stats() {
    let mut c = create_deep_circuit();
    c.net.set_acts("Deep", &[0.5, 0.5, 0.5]).unwrap();
    let reports = c.net.run_quarter(Quarter::Q2).unwrap();
    assert_eq!(reports.len(), 3);
    assert_eq!(reports[0].act_sends, 3);
    assert_eq!(reports[1].act_sends, 0);

    let stats = c.net.stats();
    assert_eq!(stats.total_cycles, 3);
    assert_eq!(stats.total_unit_sends, 3);
    assert_eq!(stats.total_synapses_processed, 3 * 2);
}

#[test]
fn test_init_wts_resets_layers() {
    let mut c = create_deep_circuit();
    c.net.set_acts("Deep", &[0.5, 0.5, 0.5]).unwrap();
    c.net.cycle(&CycleTime::new(Quarter::Q1, 0, 3)).unwrap();
    c.net.init_wts(7);
    let sup = layer(&c.net, "Super");
    assert!(sup.attn_ge().iter().all(|&v| v == 0.0));
    assert!(layer(&c.net, "Deep").act_sent.iter().all(|&v| v == 0.0));
}

// ═══════════════════════════════════════════════════════════
// Conservation under parallel fan-out
// ═══════════════════════════════════════════════════════════

#[test]
fn test_conservation_across_projections_parallel() {
    let params = NetworkParams {
        par_send_threshold: 1,
        ..Default::default()
    };
    let mut net = DeepNetwork::new(params);
    net.add_layer(DeepLayer::new("A", 300)).unwrap();
    net.add_layer(DeepLayer::new("B", 200)).unwrap();
    net.add_layer(DeepLayer::new("C", 8)).unwrap();
    let ac = net
        .connect("A", "C", PrjnType::Forward, ConnectPattern::Full)
        .unwrap();
    let bc = net
        .connect("B", "C", PrjnType::Lateral, ConnectPattern::Full)
        .unwrap();
    net.build().unwrap();
    net.init_wts(3);

    let acts_a: Vec<f32> = (0..300).map(|i| 0.2 + (i % 7) as f32 * 0.1).collect();
    let acts_b: Vec<f32> = (0..200).map(|i| if i % 3 == 0 { 0.8 } else { 0.0 }).collect();
    net.set_acts("A", &acts_a).unwrap();
    net.set_acts("B", &acts_b).unwrap();

    let report = net.cycle(&CycleTime::new(Quarter::Q1, 0, 25)).unwrap();
    assert_eq!(report.prjns_sent, 2);

    let mut want = vec![0.0f64; 8];
    for (prjn, acts) in [(ac, &acts_a), (bc, &acts_b)] {
        for (si, &act) in acts.iter().enumerate() {
            if act > 0.1 {
                for (ri, w) in expected_from_sender(&net, prjn, si, act).iter().enumerate() {
                    want[ri] += *w as f64;
                }
            }
        }
    }
    let got = net.layer_by_name("C").unwrap().ge_raw();
    for (g, w) in got.iter().zip(&want) {
        assert!(((*g as f64) - w).abs() < 1e-3 * w.abs().max(1.0), "{} vs {}", g, w);
    }
    assert!(net.prjn(ac).unwrap().base().ge_inc().iter().all(|&v| v == 0.0));
}

#[test]
fn test_conservation_on_deep_channels_parallel() {
    let params = NetworkParams {
        par_send_threshold: 1,
        ..Default::default()
    };
    let mut net = DeepNetwork::new(params);
    net.add_layer(DeepLayer::new("A", 300)).unwrap();
    net.add_layer(DeepLayer::new("B", 200)).unwrap();
    net.add_layer(DeepLayer::new("C", 8)).unwrap();
    let attn: Vec<PrjnId> = ["A", "B"]
        .iter()
        .map(|s| {
            net.connect(s, "C", PrjnType::DeepAttn, ConnectPattern::Full)
                .unwrap()
        })
        .collect();
    let trc: Vec<PrjnId> = ["A", "B"]
        .iter()
        .map(|s| {
            net.connect(s, "C", PrjnType::BurstTrc, ConnectPattern::Full)
                .unwrap()
        })
        .collect();
    net.build().unwrap();
    net.init_wts(11);

    let acts_a: Vec<f32> = (0..300).map(|i| 0.2 + (i % 7) as f32 * 0.1).collect();
    let acts_b: Vec<f32> = (0..200).map(|i| if i % 3 == 0 { 0.8 } else { 0.0 }).collect();
    let bursts_a: Vec<f32> = (0..300).map(|i| 0.15 + (i % 5) as f32 * 0.1).collect();
    let bursts_b: Vec<f32> = (0..200).map(|i| if i % 4 == 0 { 0.6 } else { 0.0 }).collect();
    net.set_acts("A", &acts_a).unwrap();
    net.set_acts("B", &acts_b).unwrap();
    net.set_bursts("A", &bursts_a).unwrap();
    net.set_bursts("B", &bursts_b).unwrap();

    let report = net.cycle(&CycleTime::new(Quarter::Q4, 0, 25)).unwrap();
    assert_eq!(report.prjns_sent, 4);

    let summed = |prjns: &[PrjnId], signals: [&Vec<f32>; 2]| {
        let mut want = vec![0.0f64; 8];
        for (&prjn, values) in prjns.iter().zip(signals) {
            for (si, &v) in values.iter().enumerate() {
                if v > 0.1 {
                    for (ri, w) in expected_from_sender(&net, prjn, si, v).iter().enumerate() {
                        want[ri] += *w as f64;
                    }
                }
            }
        }
        want
    };
    let want_attn = summed(&attn, [&acts_a, &acts_b]);
    let want_trc = summed(&trc, [&bursts_a, &bursts_b]);

    let c = layer(&net, "C");
    for (got, want) in [(c.attn_ge(), &want_attn), (c.trc_burst_ge(), &want_trc)] {
        for (g, w) in got.iter().zip(want.iter()) {
            assert!(((*g as f64) - w).abs() < 1e-3 * w.abs().max(1.0), "{} vs {}", g, w);
        }
    }
    assert!(c.ge_raw().iter().all(|&v| v == 0.0));

    for &id in attn.iter().chain(&trc) {
        let prjn = net.prjn(id).unwrap();
        assert!(prjn.attn_ge_inc().iter().all(|&v| v == 0.0));
        assert!(prjn.trc_burst_ge_inc().iter().all(|&v| v == 0.0));
    }
}

// ═══════════════════════════════════════════════════════════
// Conductance reset between trials
// ═══════════════════════════════════════════════════════════

#[test]
fn test_init_conductances_keeps_sent_trackers() {
    let mut c = create_deep_circuit();
    c.net.set_bursts("Super", &[0.5, 0.0]).unwrap();
    c.net.cycle(&CycleTime::new(Quarter::Q4, 0, 3)).unwrap();
    assert!(layer(&c.net, "TRC").trc_burst_ge().iter().any(|&v| v > 0.0));

    c.net.init_conductances();
    assert!(layer(&c.net, "TRC").trc_burst_ge().iter().all(|&v| v == 0.0));
    assert_eq!(layer(&c.net, "Super").burst_sent, vec![0.5, 0.0]);
    assert_eq!(layer(&c.net, "Super").burst, vec![0.5, 0.0]);

    // Unchanged bursts stay suppressed after the reset
    let report = c.net.cycle(&CycleTime::new(Quarter::Q4, 1, 3)).unwrap();
    assert_eq!(report.burst_sends, 0);
    assert!(layer(&c.net, "TRC").trc_burst_ge().iter().all(|&v| v == 0.0));
}
