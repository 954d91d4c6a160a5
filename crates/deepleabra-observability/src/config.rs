// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Logging configuration types

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Base level for crates without a debug flag (trace, debug, info, warn, error)
    pub level: String,

    /// Include the event target in console output
    pub with_target: bool,

    /// Base directory for run folders (file logging only)
    pub log_dir: PathBuf,

    /// Keep this many most recent run folders (file logging only)
    pub retention_runs: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "info".to_string(),
            with_target: false,
            log_dir: PathBuf::from("./logs"),
            retention_runs: 10,
        }
    }
}

impl LoggingConfig {
    /// Default configuration at the given base level
    pub fn with_level(level: impl Into<String>) -> Self {
        LoggingConfig {
            level: level.into(),
            ..Self::default()
        }
    }
}
