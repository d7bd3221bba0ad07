// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

pub mod get;
pub mod selftest;
pub mod status;
pub mod watch;

use anyhow::Context;
use device_metrics::provider::Providers;
use device_metrics::{fake, DeviceMetrics, MetricsConfig};
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Installs the global subscriber. `RUST_LOG` wins over `-v` when set.
pub fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Loads the configuration, picks the providers and initialises the facade.
pub fn build_metrics(config: Option<&Path>, simulate: bool) -> anyhow::Result<DeviceMetrics> {
    let config = match config {
        Some(path) => MetricsConfig::from_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => MetricsConfig::default(),
    };

    let providers = if simulate {
        tracing::info!("using simulated providers");
        fake::simulated_device()
    } else {
        Providers::host(&config)
    };

    let metrics = DeviceMetrics::new(config, providers)?;
    metrics.init()?;
    Ok(metrics)
}
