// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # devmon
//!
//! Command-line diagnostics for the device-metrics facade.
//!
//! ## Usage
//! ```bash
//! # Full health report
//! devmon status
//!
//! # One metric, by name or numeric code
//! devmon get cpu-usage
//! devmon get 6
//!
//! # Sample CPU and temperature every 500 ms, ten times
//! devmon watch --interval-ms 500 --count 10
//!
//! # Run the diagnostic checks against a simulated device
//! devmon --simulate selftest
//! ```

mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "devmon",
    about = "Device health telemetry for resource-constrained devices",
    version,
    author
)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,

    /// Enable verbose logging (repeat for more: -v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Use scripted providers (connected HT40 link, 35% load) instead of
    /// the host.
    #[arg(long, global = true)]
    simulate: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display a full device health report.
    Status {
        /// Print the snapshot as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Read one metric, e.g. "cpu-usage", "wifi-signal" or its code 0-9.
    Get {
        metric: String,
    },

    /// Periodically sample CPU usage and temperature.
    Watch {
        /// Sampling interval in milliseconds.
        #[arg(long, default_value_t = 1000)]
        interval_ms: u64,

        /// Number of samples to take (0 runs until interrupted).
        #[arg(long, default_value_t = 10)]
        count: u64,
    },

    /// Run the diagnostic checks against the facade.
    Selftest,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    commands::init_tracing(cli.verbose);

    let metrics = commands::build_metrics(cli.config.as_deref(), cli.simulate)?;

    match cli.command {
        Commands::Status { json } => commands::status::execute(&metrics, json).await,
        Commands::Get { metric } => commands::get::execute(&metrics, &metric).await,
        Commands::Watch { interval_ms, count } => {
            commands::watch::execute(&metrics, interval_ms, count).await
        }
        Commands::Selftest => commands::selftest::execute(&metrics).await,
    }
}
