// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # DeepLeabra Configuration System
//!
//! Type-safe configuration loader with support for:
//! - TOML file parsing
//! - Environment variable overrides
//! - CLI argument overrides
//!
//! ## Usage
//!
//! ```rust,no_run
//! use deepleabra_config::{load_config, validate_config};
//!
//! // Load configuration with automatic file discovery and overrides
//! let config = load_config(None, None).expect("Failed to load config");
//! validate_config(&config).expect("Invalid config");
//!
//! println!("Cycles per quarter: {}", config.burst.cycles_per_quarter);
//! println!("Parallel send threshold: {}", config.engine.par_send_threshold);
//! ```
//!
//! Every field has a default, so an empty file is a valid configuration.

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod loader;
pub mod types;
pub mod validation;

pub use loader::{
    apply_cli_overrides, apply_environment_overrides, find_config_file, load_config,
    parse_burst_quarters, CONFIG_FILE_NAME,
};
pub use types::*;
pub use validation::{validate_config, ConfigValidationError};

/// Re-export for convenience
pub use serde;

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file not found. Searched: {0}")]
    FileNotFound(String),

    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid TOML syntax: {0}")]
    ParseError(String),

    #[error("Validation failed: {0}")]
    ValidationError(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;
