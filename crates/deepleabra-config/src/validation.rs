// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration validation
//!
//! Every check runs; all failures are reported together.

use crate::{ConfigError, ConfigResult, DeepLeabraConfig};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Validation errors that can occur during config validation
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValidationError {
    OutOfRange {
        field: String,
        value: f64,
        min: f64,
        max: f64,
    },
    InvalidValue { field: String, reason: String },
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OutOfRange {
                field,
                value,
                min,
                max,
            } => {
                write!(
                    f,
                    "{} = {} is outside valid range ({}-{})",
                    field, value, min, max
                )
            }
            Self::InvalidValue { field, reason } => {
                write!(f, "Invalid configuration value for {}: {}", field, reason)
            }
        }
    }
}

/// Validate the complete configuration
///
/// # Errors
///
/// Returns `ConfigError::ValidationError` listing every failed check
pub fn validate_config(config: &DeepLeabraConfig) -> ConfigResult<()> {
    let mut errors = Vec::new();

    validate_system(config, &mut errors);
    validate_projection(config, &mut errors);
    validate_burst(config, &mut errors);

    if config.engine.par_send_threshold == 0 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "engine.par_send_threshold".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    if !errors.is_empty() {
        let error_messages = errors
            .iter()
            .map(|e| format!("  - {}", e))
            .collect::<Vec<_>>()
            .join("\n");

        return Err(ConfigError::ValidationError(format!(
            "Configuration validation failed:\n{}",
            error_messages
        )));
    }

    Ok(())
}

fn check_range(
    field: &str,
    value: f32,
    min: f32,
    max: f32,
    errors: &mut Vec<ConfigValidationError>,
) {
    if !(min..=max).contains(&value) {
        errors.push(ConfigValidationError::OutOfRange {
            field: field.to_string(),
            value: value as f64,
            min: min as f64,
            max: max as f64,
        });
    }
}

fn validate_system(config: &DeepLeabraConfig, errors: &mut Vec<ConfigValidationError>) {
    let level = config.system.log_level.to_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigValidationError::InvalidValue {
            field: "system.log_level".to_string(),
            reason: format!("must be one of {}", LOG_LEVELS.join(", ")),
        });
    }
}

fn validate_projection(config: &DeepLeabraConfig, errors: &mut Vec<ConfigValidationError>) {
    let wt_init = &config.projection.wt_init;
    check_range("projection.wt_init.mean", wt_init.mean, 0.0, 1.0, errors);
    check_range("projection.wt_init.var", wt_init.var, 0.0, 1.0, errors);

    let wt_scale = &config.projection.wt_scale;
    check_range("projection.wt_scale.abs", wt_scale.abs, 0.0, f32::MAX, errors);
    check_range("projection.wt_scale.rel", wt_scale.rel, 0.0, f32::MAX, errors);
}

fn validate_burst(config: &DeepLeabraConfig, errors: &mut Vec<ConfigValidationError>) {
    if config.burst.cycles_per_quarter == 0 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "burst.cycles_per_quarter".to_string(),
            reason: "must be positive".to_string(),
        });
    }
    let opt = &config.burst.opt_thresh;
    check_range("burst.opt_thresh.send", opt.send, 0.0, 1.0, errors);
    check_range("burst.opt_thresh.delta", opt.delta, 0.0, 1.0, errors);
}
