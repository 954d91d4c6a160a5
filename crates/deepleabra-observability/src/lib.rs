// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # deepleabra-observability
//!
//! Logging initialization for DeepLeabra with per-crate debug flag support.
//!
//! ## Features
//! - `file-logging`: write logs into a timestamped run folder (desktop only)

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod config;
pub mod init;

pub use cli::*;
pub use config::*;
pub use init::*;

/// Known DeepLeabra crate names for debug flags
pub const KNOWN_CRATES: &[&str] = &[
    "deepleabra",
    "deepleabra-config",
    "deepleabra-npu-neural",
    "deepleabra-npu-runtime",
    "deepleabra-npu-burst-engine",
    "deepleabra-observability",
];

/// Tracing target for a crate name (`deepleabra-npu-runtime` -> `deepleabra_npu_runtime`)
pub fn crate_target(crate_name: &str) -> String {
    crate_name.replace('-', "_")
}
