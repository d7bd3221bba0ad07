// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # device-metrics
//!
//! A device-health telemetry facade for resource-constrained devices.
//! Application and diagnostic code query one typed interface instead of
//! talking to scheduler, radio, sensor and reset-cause APIs directly.
//!
//! # Metrics
//! - **CPU usage**: delta of the idle task's run time between two
//!   scheduler samples.
//! - **Uptime**: milliseconds since boot.
//! - **Wi-Fi**: link status, RSSI and a heuristic data-rate estimate.
//! - **Temperature**: internal sensor with a last-known-good fallback.
//! - **Reset cause**: classified once per session.
//! - **Counters**: brownout and error counters.
//!
//! # Providers
//! Platform access goes through the traits in [`provider`]. [`host`] has
//! adapters for a Linux host; [`fake`] has scripted doubles for tests and
//! demos.
//!
//! # Degraded readings
//! Some getters still produce a value when their provider fails. The
//! `*_reading` variants return a [`Reading`] that carries both the fallback
//! value and the error. The plain getters return only the `Result`.
//!
//! # Example
//! ```
//! use device_metrics::{fake, DeviceMetrics, DeviceSnapshot, MetricsConfig, WifiStatus};
//!
//! let metrics = DeviceMetrics::new(MetricsConfig::default(), fake::simulated_device()).unwrap();
//! metrics.init().unwrap();
//!
//! assert_eq!(metrics.cpu_usage().unwrap(), 0.0); // first sample is the baseline
//! assert_eq!(metrics.wifi_status().unwrap(), WifiStatus::Connected);
//!
//! let snap = DeviceSnapshot::capture(&metrics).unwrap();
//! println!("{}", snap.summary());
//! ```

mod config;
mod cpu;
mod device;
mod error;
pub mod fake;
pub mod host;
mod metric;
pub mod provider;
mod reading;
mod reset;
mod snapshot;
mod thermal;
mod wifi;

pub use config::{MetricsConfig, TemperatureConfig};
pub use cpu::CpuSampler;
pub use device::{version, DeviceMetrics};
pub use error::{ErrorKind, MetricsError, ProviderError};
pub use metric::{LogLevel, MetricType, MetricValue};
pub use provider::Providers;
pub use reading::Reading;
pub use reset::{RebootReason, ResetCause, UNRECOGNIZED_LABEL};
pub use snapshot::DeviceSnapshot;
pub use thermal::NO_TEMPERATURE;
pub use wifi::{nominal_rate_mbps, signal_factor, WifiStatus};
