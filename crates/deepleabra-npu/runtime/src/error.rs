// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Error types for projection building

use thiserror::Error;

/// Errors raised while building projection connectivity
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// Pattern requires matching layer shapes
    #[error("Shape mismatch: {pattern} requires equal sizes, got send {send_n}, recv {recv_n}")]
    ShapeMismatch {
        pattern: &'static str,
        send_n: usize,
        recv_n: usize,
    },

    /// Explicit edge references a unit outside either layer
    #[error("Edge ({send}, {recv}) out of range for send {send_n}, recv {recv_n}")]
    EdgeOutOfRange {
        send: u32,
        recv: u32,
        send_n: usize,
        recv_n: usize,
    },

    /// The same (send, recv) pair was listed twice
    #[error("Duplicate synapse ({send}, {recv})")]
    DuplicateSynapse { send: u32, recv: u32 },

    /// Synapse indices are stored as u32
    #[error("Too many synapses: {count} exceeds u32 index range")]
    TooManySynapses { count: usize },
}

/// Result type for build operations
pub type Result<T> = std::result::Result<T, BuildError>;
