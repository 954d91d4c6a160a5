// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Connectivity patterns
//!
//! A pattern expands to one sorted receiver list per sender.

use crate::error::{BuildError, Result};
use ahash::AHashSet;
use serde::{Deserialize, Serialize};

/// How senders connect to receivers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectPattern {
    /// Every sender to every receiver
    Full,
    /// Sender `i` to receiver `i`
    OneToOne,
    /// Explicit `(send, recv)` edges
    Explicit(Vec<(u32, u32)>),
}

impl ConnectPattern {
    /// Pattern name for logging and errors
    pub fn name(&self) -> &'static str {
        match self {
            ConnectPattern::Full => "Full",
            ConnectPattern::OneToOne => "OneToOne",
            ConnectPattern::Explicit(_) => "Explicit",
        }
    }

    /// Expand to per-sender receiver lists, each sorted ascending.
    pub fn receivers_by_sender(&self, send_n: usize, recv_n: usize) -> Result<Vec<Vec<u32>>> {
        match self {
            ConnectPattern::Full => {
                let count = send_n.saturating_mul(recv_n);
                check_count(count)?;
                let row: Vec<u32> = (0..recv_n as u32).collect();
                Ok(vec![row; send_n])
            }
            ConnectPattern::OneToOne => {
                if send_n != recv_n {
                    return Err(BuildError::ShapeMismatch {
                        pattern: self.name(),
                        send_n,
                        recv_n,
                    });
                }
                check_count(send_n)?;
                Ok((0..send_n as u32).map(|i| vec![i]).collect())
            }
            ConnectPattern::Explicit(edges) => {
                check_count(edges.len())?;
                let mut seen: AHashSet<(u32, u32)> = AHashSet::with_capacity(edges.len());
                let mut runs: Vec<Vec<u32>> = vec![Vec::new(); send_n];
                for &(send, recv) in edges {
                    if send as usize >= send_n || recv as usize >= recv_n {
                        return Err(BuildError::EdgeOutOfRange {
                            send,
                            recv,
                            send_n,
                            recv_n,
                        });
                    }
                    if !seen.insert((send, recv)) {
                        return Err(BuildError::DuplicateSynapse { send, recv });
                    }
                    runs[send as usize].push(recv);
                }
                for run in &mut runs {
                    run.sort_unstable();
                }
                Ok(runs)
            }
        }
    }
}

fn check_count(count: usize) -> Result<()> {
    if count > u32::MAX as usize {
        return Err(BuildError::TooManySynapses { count });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full() {
        let runs = ConnectPattern::Full.receivers_by_sender(2, 3).unwrap();
        assert_eq!(runs, vec![vec![0, 1, 2], vec![0, 1, 2]]);
    }

    #[test]
    fn test_one_to_one_shape_mismatch() {
        let err = ConnectPattern::OneToOne
            .receivers_by_sender(3, 4)
            .unwrap_err();
        assert!(matches!(err, BuildError::ShapeMismatch { send_n: 3, recv_n: 4, .. }));
    }

    #[test]
    fn test_explicit_sorted_runs() {
        let pattern = ConnectPattern::Explicit(vec![(0, 2), (1, 0), (0, 0)]);
        let runs = pattern.receivers_by_sender(2, 3).unwrap();
        assert_eq!(runs, vec![vec![0, 2], vec![0]]);
    }

    #[test]
    fn test_explicit_errors() {
        let oob = ConnectPattern::Explicit(vec![(0, 5)]).receivers_by_sender(2, 3);
        assert!(matches!(oob, Err(BuildError::EdgeOutOfRange { recv: 5, .. })));

        let dup = ConnectPattern::Explicit(vec![(1, 1), (1, 1)]).receivers_by_sender(2, 3);
        assert_eq!(dup, Err(BuildError::DuplicateSynapse { send: 1, recv: 1 }));
    }

    #[test]
    fn test_full_too_many() {
        let err = ConnectPattern::Full
            .receivers_by_sender(1 << 17, 1 << 16)
            .unwrap_err();
        assert!(matches!(err, BuildError::TooManySynapses { .. }));
    }
}
