// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Per-crate debug flags
//!
//! Supports flags like `--debug-deepleabra-npu-burst-engine` to raise one crate to
//! `debug` while the rest stay at the base level.

use std::collections::BTreeSet;
use std::env;

use crate::{crate_target, KNOWN_CRATES};

/// Environment variable holding comma-separated crate names, or `all`
pub const DEBUG_ENV_VAR: &str = "DEEPLEABRA_DEBUG";

/// Parse debug flags from command-line arguments
///
/// # Example
/// ```rust
/// use deepleabra_observability::CrateDebugFlags;
///
/// let flags = CrateDebugFlags::from_args(vec!["--debug-deepleabra-npu-runtime".to_string()]);
/// assert!(flags.is_enabled("deepleabra-npu-runtime"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrateDebugFlags {
    enabled_crates: BTreeSet<String>,
}

impl CrateDebugFlags {
    /// Looks for arguments matching `--debug-{crate-name}`; `--debug-all` enables every
    /// known crate. Other arguments are ignored.
    pub fn from_args<I>(args: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut flags = Self::default();
        for arg in args {
            if arg == "--debug-all" {
                flags.enable_all();
            } else if let Some(crate_name) = arg.strip_prefix("--debug-") {
                flags.enable(crate_name);
            }
        }
        flags
    }

    /// Apply a `DEEPLEABRA_DEBUG` style value: `all` or comma-separated crate names.
    pub fn apply_env_value(&mut self, value: &str) {
        if value.trim() == "all" {
            self.enable_all();
            return;
        }
        for crate_name in value.split(',') {
            let crate_name = crate_name.trim();
            if !crate_name.is_empty() {
                self.enable(crate_name);
            }
        }
    }

    pub fn enable(&mut self, crate_name: &str) {
        self.enabled_crates.insert(crate_name.to_string());
    }

    pub fn enable_all(&mut self) {
        for crate_name in KNOWN_CRATES {
            self.enable(crate_name);
        }
    }

    /// Check if debug is enabled for a specific crate
    pub fn is_enabled(&self, crate_name: &str) -> bool {
        self.enabled_crates.contains(crate_name)
    }

    pub fn enabled_crates(&self) -> impl Iterator<Item = &str> {
        self.enabled_crates.iter().map(String::as_str)
    }

    pub fn any_enabled(&self) -> bool {
        !self.enabled_crates.is_empty()
    }

    /// `DEBUG` if enabled, `INFO` otherwise
    pub fn log_level(&self, crate_name: &str) -> tracing::Level {
        if self.is_enabled(crate_name) {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// Filter directive string with `info` as the base level
    pub fn to_filter_string(&self) -> String {
        self.to_filter_string_with_base("info")
    }

    /// Filter directive string for `EnvFilter`.
    ///
    /// Format: `deepleabra_npu_runtime=debug,warn`, or just the base level if no crate
    /// is enabled.
    pub fn to_filter_string_with_base(&self, base_level: &str) -> String {
        let mut filters: Vec<String> = self
            .enabled_crates
            .iter()
            .map(|crate_name| format!("{}=debug", crate_target(crate_name)))
            .collect();
        filters.push(base_level.to_lowercase());
        filters.join(",")
    }
}

/// Parse debug flags from the process arguments and `DEEPLEABRA_DEBUG`
pub fn parse_debug_flags() -> CrateDebugFlags {
    let mut flags = CrateDebugFlags::from_args(env::args());
    if let Ok(value) = env::var(DEBUG_ENV_VAR) {
        flags.apply_env_value(&value);
    }
    flags
}

/// Generate help text for debug flags
pub fn debug_flags_help() -> String {
    format!(
        r#"Debug Flags:
  --debug-all                    Enable debug logging for all crates
  --debug-{{crate-name}}          Enable debug logging for specific crate

Available crates:
  {}

Environment Variable:
  {var}={{crate-name}}[,{{crate-name}}]  Enable debug for crates (comma-separated)
  {var}=all                               Enable debug for all crates

Examples:
  --debug-deepleabra-npu-burst-engine
  {var}=deepleabra-npu-runtime,deepleabra-config
"#,
        KNOWN_CRATES.join(", "),
        var = DEBUG_ENV_VAR
    )
}
