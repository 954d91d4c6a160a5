// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Projection type taxonomy
//!
//! A closed set of roles: the four generic roles every rate-coded projection can play,
//! plus the three DeepLeabra circuit roles. The tag is fixed when a projection is
//! constructed and decides which accumulator a projection drives and how often the
//! scheduler sends on it. It never changes the scatter/gather algorithm itself.

use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

/// Projection role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrjnType {
    /// Feedforward projection (lower area to higher area)
    Forward,
    /// Feedback projection (higher area to lower area)
    Back,
    /// Lateral projection within an area
    Lateral,
    /// Inhibitory projection
    Inhib,

    /// Superficial to deep projections within the same area. Burst deltas drive the
    /// deep context conductance at the end of each burst quarter. These projections
    /// also select a delay-aware learning rule downstream.
    BurstCtxt,

    /// Superficial to thalamic relay cell (TRC) projections. Burst deltas are sent on
    /// every cycle of the burst quarter(s), accumulating the "outcome" conductance on
    /// the TRC units against which the prior prediction is compared.
    #[serde(rename = "BurstTRC")]
    BurstTrc,

    /// Deep (layer 6 corticothalamic) to superficial projections carrying attentional
    /// modulation. Sent every cycle with the standard delta mechanism.
    DeepAttn,
}

/// Which deep accumulator a projection scatters into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeepChannel {
    Attn,
    Burst,
}

/// When the scheduler sends on a projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SendCadence {
    /// Every cycle of every quarter
    EveryCycle,
    /// Every cycle inside a burst quarter
    DuringBurst,
    /// Once, on the last cycle of a burst quarter
    BurstQuarterEnd,
}

impl PrjnType {
    /// All projection types, base roles first.
    pub const ALL: [PrjnType; 7] = [
        PrjnType::Forward,
        PrjnType::Back,
        PrjnType::Lateral,
        PrjnType::Inhib,
        PrjnType::BurstCtxt,
        PrjnType::BurstTrc,
        PrjnType::DeepAttn,
    ];

    /// True for the three DeepLeabra roles.
    pub fn is_deep(self) -> bool {
        self.deep_channel().is_some()
    }

    /// Accumulator driven by this role, `None` for the base `Ge` pathway.
    pub fn deep_channel(self) -> Option<DeepChannel> {
        match self {
            PrjnType::BurstCtxt | PrjnType::BurstTrc => Some(DeepChannel::Burst),
            PrjnType::DeepAttn => Some(DeepChannel::Attn),
            PrjnType::Forward | PrjnType::Back | PrjnType::Lateral | PrjnType::Inhib => None,
        }
    }

    pub fn cadence(self) -> SendCadence {
        match self {
            PrjnType::BurstCtxt => SendCadence::BurstQuarterEnd,
            PrjnType::BurstTrc => SendCadence::DuringBurst,
            _ => SendCadence::EveryCycle,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PrjnType::Forward => "Forward",
            PrjnType::Back => "Back",
            PrjnType::Lateral => "Lateral",
            PrjnType::Inhib => "Inhib",
            PrjnType::BurstCtxt => "BurstCtxt",
            PrjnType::BurstTrc => "BurstTRC",
            PrjnType::DeepAttn => "DeepAttn",
        }
    }
}

impl fmt::Display for PrjnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string names no projection type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown projection type: {0}")]
pub struct ParsePrjnTypeError(pub String);

impl FromStr for PrjnType {
    type Err = ParsePrjnTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PrjnType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParsePrjnTypeError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deep_roles_map_to_channels() {
        assert_eq!(PrjnType::BurstCtxt.deep_channel(), Some(DeepChannel::Burst));
        assert_eq!(PrjnType::BurstTrc.deep_channel(), Some(DeepChannel::Burst));
        assert_eq!(PrjnType::DeepAttn.deep_channel(), Some(DeepChannel::Attn));
        assert_eq!(PrjnType::Forward.deep_channel(), None);
        assert!(!PrjnType::Inhib.is_deep());
    }

    #[test]
    fn test_cadence() {
        assert_eq!(PrjnType::BurstCtxt.cadence(), SendCadence::BurstQuarterEnd);
        assert_eq!(PrjnType::BurstTrc.cadence(), SendCadence::DuringBurst);
        assert_eq!(PrjnType::DeepAttn.cadence(), SendCadence::EveryCycle);
        assert_eq!(PrjnType::Back.cadence(), SendCadence::EveryCycle);
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("BurstTRC".parse::<PrjnType>().unwrap(), PrjnType::BurstTrc);
        assert_eq!("deepattn".parse::<PrjnType>().unwrap(), PrjnType::DeepAttn);
        assert!("Sideways".parse::<PrjnType>().is_err());
        for t in PrjnType::ALL {
            assert_eq!(t.to_string().parse::<PrjnType>().unwrap(), t);
        }
    }

    #[test]
    fn test_serde_uses_canonical_names() {
        let json = serde_json::to_string(&PrjnType::BurstTrc).unwrap();
        assert_eq!(json, "\"BurstTRC\"");
        let back: PrjnType = serde_json::from_str("\"BurstCtxt\"").unwrap();
        assert_eq!(back, PrjnType::BurstCtxt);
    }
}
