// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Trial quarters and the burst-quarter set
//!
//! A trial is four quarters of equal cycle count. Deep bursting happens in the quarters
//! flagged in [`BurstQuarters`] (the fourth quarter, the plus phase, by default).

use core::fmt;
use serde::{Deserialize, Serialize};

/// One quarter of a trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Quarter {
    Q1,
    Q2,
    Q3,
    Q4,
}

impl Quarter {
    pub const ALL: [Quarter; 4] = [Quarter::Q1, Quarter::Q2, Quarter::Q3, Quarter::Q4];

    /// Zero-based index (Q1 = 0)
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(idx: usize) -> Option<Quarter> {
        Quarter::ALL.get(idx).copied()
    }

    #[inline]
    fn bit(self) -> u8 {
        1 << self.index()
    }
}

impl fmt::Display for Quarter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Q{}", self.index() + 1)
    }
}

/// Set of quarters in which deep bursting is active.
///
/// Serialized as a list of quarters, e.g. `["Q2", "Q4"]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<Quarter>", into = "Vec<Quarter>")]
pub struct BurstQuarters(u8);

impl BurstQuarters {
    pub const fn empty() -> Self {
        Self(0)
    }

    pub fn from_quarters(quarters: &[Quarter]) -> Self {
        let mut set = Self::empty();
        for &q in quarters {
            set.insert(q);
        }
        set
    }

    pub fn insert(&mut self, quarter: Quarter) {
        self.0 |= quarter.bit();
    }

    #[inline]
    pub fn contains(self, quarter: Quarter) -> bool {
        self.0 & quarter.bit() != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = Quarter> {
        Quarter::ALL.into_iter().filter(move |&q| self.contains(q))
    }
}

impl Default for BurstQuarters {
    fn default() -> Self {
        Self::from_quarters(&[Quarter::Q4])
    }
}

impl From<Vec<Quarter>> for BurstQuarters {
    fn from(quarters: Vec<Quarter>) -> Self {
        Self::from_quarters(&quarters)
    }
}

impl From<BurstQuarters> for Vec<Quarter> {
    fn from(set: BurstQuarters) -> Self {
        set.iter().collect()
    }
}
