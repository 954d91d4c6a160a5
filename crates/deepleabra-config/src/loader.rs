// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration file loading with override support
//!
//! Three tiers, later wins:
//! 1. TOML file (base values, every field defaulted)
//! 2. Environment variables (runtime overrides)
//! 3. CLI arguments (explicit user overrides)

use crate::{ConfigError, ConfigResult, DeepLeabraConfig};
use deepleabra_npu_neural::{BurstQuarters, Quarter};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Default configuration file name
pub const CONFIG_FILE_NAME: &str = "deepleabra_configuration.toml";

/// Find the configuration file
///
/// Search order:
/// 1. `DEEPLEABRA_CONFIG_PATH` environment variable
/// 2. Current working directory
/// 3. Parent directories (up to 5 levels)
///
/// # Errors
///
/// Returns `ConfigError::FileNotFound` if no config file is found in any location
pub fn find_config_file() -> ConfigResult<PathBuf> {
    if let Ok(env_path) = env::var("DEEPLEABRA_CONFIG_PATH") {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(path);
        }
        return Err(ConfigError::FileNotFound(format!(
            "Config file specified by DEEPLEABRA_CONFIG_PATH not found: {}",
            path.display()
        )));
    }

    let mut search_paths = Vec::new();
    if let Ok(cwd) = env::current_dir() {
        search_paths.push(cwd.join(CONFIG_FILE_NAME));
        let mut current = cwd.clone();
        for _ in 0..5 {
            if let Some(parent) = current.parent() {
                search_paths.push(parent.join(CONFIG_FILE_NAME));
                current = parent.to_path_buf();
            }
        }
    }

    for path in &search_paths {
        if path.exists() {
            return Ok(path.clone());
        }
    }

    let search_list = search_paths
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::FileNotFound(format!(
        "'{}' not found in any of these locations:\n{}\n\nSet DEEPLEABRA_CONFIG_PATH to specify a custom location.",
        CONFIG_FILE_NAME, search_list
    )))
}

/// Load configuration from a TOML file and apply overrides
///
/// # Arguments
///
/// * `config_path` - Optional path to config file. If `None`, the file is searched for.
/// * `cli_args` - Optional CLI argument overrides
///
/// # Errors
///
/// Returns error if the config file is not found or contains invalid TOML.
/// Value ranges are checked separately by [`crate::validate_config`].
pub fn load_config(
    config_path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<DeepLeabraConfig> {
    let config_file = match config_path {
        Some(path) => path.to_path_buf(),
        None => find_config_file()?,
    };

    let content = fs::read_to_string(&config_file)?;
    let mut config: DeepLeabraConfig = toml::from_str(&content)?;

    apply_environment_overrides(&mut config);
    if let Some(cli) = cli_args {
        apply_cli_overrides(&mut config, cli);
    }

    Ok(config)
}

/// Parse a comma-separated quarter list: `"Q2,Q4"` or `"2,4"`.
///
/// Returns `None` if any entry is not a quarter.
pub fn parse_burst_quarters(value: &str) -> Option<BurstQuarters> {
    let mut set = BurstQuarters::empty();
    for item in value.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let digits = item
            .strip_prefix('Q')
            .or_else(|| item.strip_prefix('q'))
            .unwrap_or(item);
        let n: usize = digits.parse().ok()?;
        let quarter = Quarter::from_index(n.checked_sub(1)?)?;
        set.insert(quarter);
    }
    Some(set)
}

fn parse_bool(value: &str) -> bool {
    let v = value.to_lowercase();
    v == "true" || v == "1" || v == "yes"
}

/// Apply environment variable overrides to configuration
///
/// Supported environment variables:
/// - `DEEPLEABRA_MAX_CORES` -> `system.max_cores`
/// - `DEEPLEABRA_LOG_LEVEL` -> `system.log_level`
/// - `DEEPLEABRA_SEED` -> `system.seed`
/// - `DEEPLEABRA_PAR_SEND_THRESHOLD` -> `engine.par_send_threshold`
/// - `DEEPLEABRA_CYCLES_PER_QUARTER` -> `burst.cycles_per_quarter`
/// - `DEEPLEABRA_BURST_QUARTERS` -> `burst.burst_quarters`
///
/// Unparseable values are ignored.
pub fn apply_environment_overrides(config: &mut DeepLeabraConfig) {
    if let Ok(value) = env::var("DEEPLEABRA_MAX_CORES") {
        if let Ok(cores) = value.parse::<usize>() {
            config.system.max_cores = cores;
        }
    }
    if let Ok(value) = env::var("DEEPLEABRA_LOG_LEVEL") {
        config.system.log_level = value;
    }
    if let Ok(value) = env::var("DEEPLEABRA_SEED") {
        if let Ok(seed) = value.parse::<u64>() {
            config.system.seed = seed;
        }
    }
    if let Ok(value) = env::var("DEEPLEABRA_PAR_SEND_THRESHOLD") {
        if let Ok(threshold) = value.parse::<usize>() {
            config.engine.par_send_threshold = threshold;
        }
    }
    if let Ok(value) = env::var("DEEPLEABRA_CYCLES_PER_QUARTER") {
        if let Ok(cycles) = value.parse::<usize>() {
            config.burst.cycles_per_quarter = cycles;
        }
    }
    if let Ok(value) = env::var("DEEPLEABRA_BURST_QUARTERS") {
        if let Some(quarters) = parse_burst_quarters(&value) {
            config.burst.burst_quarters = quarters;
        }
    }
}

/// Apply CLI argument overrides to configuration
///
/// # Arguments
///
/// * `config` - Configuration to modify
/// * `cli_args` - HashMap of CLI arguments (e.g., `{"seed": "7", "burst_quarters": "Q2,Q4"}`)
pub fn apply_cli_overrides(config: &mut DeepLeabraConfig, cli_args: &HashMap<String, String>) {
    // System settings
    if let Some(value) = cli_args.get("max_cores") {
        if let Ok(cores) = value.parse::<usize>() {
            config.system.max_cores = cores;
        }
    }
    if let Some(value) = cli_args.get("debug") {
        config.system.debug = parse_bool(value);
    }
    if let Some(value) = cli_args.get("log_level") {
        config.system.log_level = value.clone();
    }
    if let Some(value) = cli_args.get("seed") {
        if let Ok(seed) = value.parse::<u64>() {
            config.system.seed = seed;
        }
    }

    // Burst timing
    if let Some(value) = cli_args.get("cycles_per_quarter") {
        if let Ok(cycles) = value.parse::<usize>() {
            config.burst.cycles_per_quarter = cycles;
        }
    }
    if let Some(value) = cli_args.get("burst_quarters") {
        if let Some(quarters) = parse_burst_quarters(value) {
            config.burst.burst_quarters = quarters;
        }
    }

    // Engine
    if let Some(value) = cli_args.get("par_send_threshold") {
        if let Ok(threshold) = value.parse::<usize>() {
            config.engine.par_send_threshold = threshold;
        }
    }
}
