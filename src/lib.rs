// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # DeepLeabra
//!
//! Attentional and burst conductance propagation for rate-coded cortical layers.
//! Deep projections carry `DeepAttn`, `BurstTRC` and `BurstCtxt` signals alongside the
//! ordinary excitatory pathway; each keeps its own per-receiver accumulator that is
//! filled during send and drained during receive.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use deepleabra::prelude::*;
//!
//! let mut net = DeepNetwork::new(NetworkParams::default());
//! net.add_layer(DeepLayer::new("V1", 16))?;
//! net.add_layer(DeepLayer::new("Pulvinar", 16))?;
//! net.connect("V1", "Pulvinar", PrjnType::BurstTrc, ConnectPattern::OneToOne)?;
//! net.build()?;
//! net.init_wts(1);
//!
//! net.set_bursts("V1", &[0.8; 16])?;
//! let reports = net.run_quarter(Quarter::Q4)?;
//! println!("burst sends: {}", reports.iter().map(|r| r.burst_sends).sum::<usize>());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Feature Flags
//! - **`config`** (default): TOML configuration loader
//! - **`observability`** (default): logging initialization
//! - **`file-logging`**: timestamped run folders for log files
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  deepleabra-npu-neural                                  │
//! │  (PrjnType, Quarter, weight and threshold parameters)   │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  deepleabra-npu-runtime                                 │
//! │  (BasePrjn storage, population traits)                  │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  deepleabra-npu-burst-engine                            │
//! │  (DeepPrjn, DeepLayer, DeepNetwork cycle scheduler)     │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub use deepleabra_npu_burst_engine as burst_engine;
pub use deepleabra_npu_neural as neural;
pub use deepleabra_npu_runtime as runtime;

#[cfg(feature = "config")]
pub use deepleabra_config as config;

#[cfg(feature = "observability")]
pub use deepleabra_observability as observability;

use tracing::info;

/// Prelude - commonly used types and traits
pub mod prelude {
    pub use crate::burst_engine::{
        CycleReport, CycleTime, DeepLayer, DeepNetwork, DeepPrjn, NetworkError, NetworkParams,
    };
    pub use crate::neural::{BurstQuarters, DeepChannel, PrjnType, Quarter, SendCadence};
    pub use crate::runtime::{ConnectPattern, DeepConductances, Population};

    #[cfg(feature = "config")]
    pub use crate::config::{load_config, validate_config, DeepLeabraConfig};
}

/// Errors from process-wide runtime setup
#[derive(Debug, thiserror::Error)]
pub enum RuntimeInitError {
    #[error("Failed to build worker thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Size the global rayon pool used for projection fan-out. `0` keeps rayon's default
/// of one worker per logical CPU.
///
/// # Errors
///
/// Fails if the global pool has already been initialized.
pub fn init_thread_pool(max_cores: usize) -> Result<usize, RuntimeInitError> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(max_cores)
        .build_global()?;
    let threads = rayon::current_num_threads();
    info!(threads, "worker pool ready");
    Ok(threads)
}

/// Size the global rayon pool from `system.max_cores`
#[cfg(feature = "config")]
pub fn init_runtime(config: &config::DeepLeabraConfig) -> Result<usize, RuntimeInitError> {
    init_thread_pool(config.system.max_cores)
}

/// Network parameters taken from the `projection`, `burst` and `engine` sections
#[cfg(feature = "config")]
pub fn network_params(config: &config::DeepLeabraConfig) -> burst_engine::NetworkParams {
    burst_engine::NetworkParams {
        wt_init: config.projection.wt_init,
        wt_scale: config.projection.wt_scale,
        burst_quarters: config.burst.burst_quarters,
        cycles_per_quarter: config.burst.cycles_per_quarter,
        opt_thresh: config.burst.opt_thresh,
        par_send_threshold: config.engine.par_send_threshold,
    }
}

/// Logging settings taken from the `system` section. `debug` forces the `debug` level.
#[cfg(all(feature = "config", feature = "observability"))]
pub fn logging_config(config: &config::DeepLeabraConfig) -> observability::LoggingConfig {
    if config.system.debug {
        observability::LoggingConfig::with_level("debug")
    } else {
        observability::LoggingConfig::with_level(config.system.log_level.clone())
    }
}
