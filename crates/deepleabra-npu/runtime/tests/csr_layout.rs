// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Integration tests for the sender-side compressed layout

use deepleabra_npu_runtime::{BasePrjn, BuildError, ConnectPattern};

#[test]
fn test_runs_cover_all_synapses_without_overlap() {
    let edges = vec![(2, 0), (0, 3), (0, 1), (1, 2), (2, 3), (2, 1)];
    let mut prjn = BasePrjn::new(ConnectPattern::Explicit(edges.clone()));
    prjn.build(3, 4).unwrap();

    let mut covered = vec![false; prjn.num_syns()];
    for si in 0..prjn.send_n() {
        let range = prjn.sender_range(si);
        let run = &prjn.scon_idx()[range.clone()];
        assert!(run.windows(2).all(|w| w[0] < w[1]), "run not sorted: {:?}", run);
        for ci in range {
            assert!(!covered[ci]);
            covered[ci] = true;
        }
    }
    assert!(covered.iter().all(|&c| c));
    assert_eq!(prjn.num_syns(), edges.len());

    for &(s, r) in &edges {
        assert!(prjn.syn_index(s as usize, r as usize).is_some());
    }
    assert_eq!(prjn.rcon_n(), &[1, 2, 1, 2]);
    assert!((prjn.avg_rcon_n() - 1.5).abs() < 1e-6);
}

#[test]
fn test_one_to_one_layout() {
    let mut prjn = BasePrjn::new(ConnectPattern::OneToOne);
    prjn.build(5, 5).unwrap();
    assert_eq!(prjn.scon_idx(), &[0, 1, 2, 3, 4]);
    assert_eq!(prjn.rcon_n(), &[1; 5]);
}

#[test]
fn test_empty_receiver() {
    let mut prjn = BasePrjn::new(ConnectPattern::Full);
    prjn.build(3, 0).unwrap();
    assert_eq!(prjn.num_syns(), 0);
    assert_eq!(prjn.avg_rcon_n(), 0.0);
    prjn.send_ge_delta(1, 1.0);
    assert!(prjn.ge_inc().is_empty());
}

#[test]
fn test_rebuild_after_error_keeps_previous_layout() {
    let mut prjn = BasePrjn::new(ConnectPattern::Explicit(vec![(0, 0), (0, 0)]));
    assert_eq!(
        prjn.build(1, 1),
        Err(BuildError::DuplicateSynapse { send: 0, recv: 0 })
    );
    assert_eq!(prjn.num_syns(), 0);
}

#[test]
fn test_pattern_serde() {
    let json = serde_json::to_string(&ConnectPattern::Explicit(vec![(0, 1)])).unwrap();
    let back: ConnectPattern = serde_json::from_str(&json).unwrap();
    assert_eq!(back, ConnectPattern::Explicit(vec![(0, 1)]));
    let full: ConnectPattern = serde_json::from_str("\"Full\"").unwrap();
    assert_eq!(full, ConnectPattern::Full);
}
