// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Unified logging initialization for DeepLeabra
//!
//! Console output is always installed. With the `file-logging` feature each run also
//! writes into its own timestamped folder:
//! ```text
//! ./logs/
//!   └── run_20250101_120000/
//!       └── deepleabra.log
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::cli::CrateDebugFlags;
use crate::config::LoggingConfig;

/// `strftime` format of the timestamp in run folder names
pub const RUN_FOLDER_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Log file written inside each run folder
pub const COMBINED_LOG_FILE: &str = "deepleabra.log";

const RUN_PREFIX: &str = "run_";

/// Keeps file writers alive; logs are flushed when this is dropped
pub struct LoggingGuard {
    #[cfg(feature = "file-logging")]
    _file_guards: Vec<tracing_appender::non_blocking::WorkerGuard>,
    started_at: DateTime<Utc>,
    log_dir: Option<PathBuf>,
}

impl LoggingGuard {
    /// Run folder receiving file logs, if file logging is active
    pub fn log_dir(&self) -> Option<&Path> {
        self.log_dir.as_deref()
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }
}

/// Build the `EnvFilter` for the given flags and base level
pub fn build_filter(debug_flags: &CrateDebugFlags, config: &LoggingConfig) -> Result<EnvFilter> {
    let directives = debug_flags.to_filter_string_with_base(&config.level);
    EnvFilter::try_new(&directives)
        .with_context(|| format!("Invalid log filter directives: {}", directives))
}

/// Folder name for a run started at `started_at`
pub fn run_folder_path(base_log_dir: &Path, started_at: DateTime<Utc>) -> PathBuf {
    base_log_dir.join(format!(
        "{}{}",
        RUN_PREFIX,
        started_at.format(RUN_FOLDER_FORMAT)
    ))
}

/// Initialize the global tracing subscriber
///
/// # Errors
///
/// Fails if the filter directives do not parse, the run folder cannot be created, or a
/// global subscriber is already installed.
pub fn init_logging(debug_flags: &CrateDebugFlags, config: &LoggingConfig) -> Result<LoggingGuard> {
    let started_at = Utc::now();
    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();

    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(config.with_target)
        .with_file(false)
        .with_line_number(false)
        .with_filter(build_filter(debug_flags, config)?)
        .boxed();
    layers.push(console_layer);

    #[cfg(feature = "file-logging")]
    let (file_guards, log_dir) = {
        let run_folder = run_folder_path(&config.log_dir, started_at);
        std::fs::create_dir_all(&run_folder).with_context(|| {
            format!("Failed to create log directory: {}", run_folder.display())
        })?;
        cleanup_old_runs(&config.log_dir, config.retention_runs)?;

        let appender = tracing_appender::rolling::never(&run_folder, COMBINED_LOG_FILE);
        let (non_blocking, guard) = tracing_appender::non_blocking(appender);
        let file_layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_filter(build_filter(debug_flags, config)?)
            .boxed();
        layers.push(file_layer);
        (vec![guard], Some(run_folder))
    };
    #[cfg(not(feature = "file-logging"))]
    let log_dir = None;

    Registry::default()
        .with(layers)
        .try_init()
        .context("A global tracing subscriber is already installed")?;

    tracing::debug!(
        level = %config.level,
        debug_crates = debug_flags.enabled_crates().count(),
        "logging initialized"
    );

    Ok(LoggingGuard {
        #[cfg(feature = "file-logging")]
        _file_guards: file_guards,
        started_at,
        log_dir,
    })
}

/// Initialize logging with default settings
pub fn init_logging_default(debug_flags: &CrateDebugFlags) -> Result<LoggingGuard> {
    init_logging(debug_flags, &LoggingConfig::default())
}

/// Remove all but the `keep` most recent `run_*` folders under `base_log_dir`.
///
/// Folders whose names do not parse as run timestamps are left alone. Returns the
/// number of folders removed.
pub fn cleanup_old_runs(base_log_dir: &Path, keep: usize) -> Result<usize> {
    if !base_log_dir.exists() {
        return Ok(0);
    }

    let mut runs: Vec<(PathBuf, NaiveDateTime)> = Vec::new();
    for entry in std::fs::read_dir(base_log_dir)
        .with_context(|| format!("Failed to read log directory: {}", base_log_dir.display()))?
    {
        let path = entry?.path();
        if !path.is_dir() {
            continue;
        }
        let timestamp = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|n| n.strip_prefix(RUN_PREFIX))
            .and_then(|ts| NaiveDateTime::parse_from_str(ts, RUN_FOLDER_FORMAT).ok());
        if let Some(timestamp) = timestamp {
            runs.push((path, timestamp));
        }
    }

    if runs.len() <= keep {
        return Ok(0);
    }

    // Oldest first
    runs.sort_by_key(|(_, ts)| *ts);
    let to_remove = runs.len() - keep;
    let mut removed = 0;
    for (path, _) in runs.iter().take(to_remove) {
        match std::fs::remove_dir_all(path) {
            Ok(()) => removed += 1,
            Err(e) => eprintln!(
                "Warning: Failed to remove old log directory {}: {}",
                path.display(),
                e
            ),
        }
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_build_filter_accepts_flags() {
        let flags =
            CrateDebugFlags::from_args(vec!["--debug-deepleabra-npu-runtime".to_string()]);
        let config = LoggingConfig::with_level("warn");
        assert!(build_filter(&flags, &config).is_ok());
    }

    #[test]
    fn test_build_filter_rejects_garbage() {
        let config = LoggingConfig::with_level("[[not a level");
        assert!(build_filter(&CrateDebugFlags::default(), &config).is_err());
    }

    #[test]
    fn test_run_folder_name() {
        let ts = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
        let path = run_folder_path(Path::new("logs"), ts);
        assert_eq!(path, Path::new("logs").join("run_20250102_030405"));
    }

    #[test]
    fn test_cleanup_keeps_most_recent_runs() {
        let dir = tempdir().unwrap();
        for name in [
            "run_20250101_000000",
            "run_20250103_000000",
            "run_20250102_000000",
            "run_20250104_000000",
            "notes",
        ] {
            fs::create_dir(dir.path().join(name)).unwrap();
        }

        let removed = cleanup_old_runs(dir.path(), 2).unwrap();
        assert_eq!(removed, 2);
        assert!(!dir.path().join("run_20250101_000000").exists());
        assert!(!dir.path().join("run_20250102_000000").exists());
        assert!(dir.path().join("run_20250103_000000").exists());
        assert!(dir.path().join("run_20250104_000000").exists());
        assert!(dir.path().join("notes").exists());
    }

    #[test]
    fn test_cleanup_missing_dir() {
        let dir = tempdir().unwrap();
        assert_eq!(cleanup_old_runs(&dir.path().join("absent"), 1).unwrap(), 0);
    }
}
