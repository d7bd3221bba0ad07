// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Metric identifiers and typed metric values for the dispatch entry point.

use crate::{MetricsError, RebootReason, WifiStatus};
use std::str::FromStr;

/// Closed set of metrics served by
/// [`DeviceMetrics::get_metric`](crate::DeviceMetrics::get_metric).
///
/// The numeric codes are stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MetricType {
    CpuUsage = 0,
    Uptime = 1,
    WifiSignal = 2,
    WifiStatus = 3,
    Temperature = 4,
    BrownoutCount = 5,
    RebootReason = 6,
    WifiDataRate = 7,
    LogLevel = 8,
    ErrorCount = 9,
}

impl MetricType {
    pub const ALL: [MetricType; 10] = [
        Self::CpuUsage,
        Self::Uptime,
        Self::WifiSignal,
        Self::WifiStatus,
        Self::Temperature,
        Self::BrownoutCount,
        Self::RebootReason,
        Self::WifiDataRate,
        Self::LogLevel,
        Self::ErrorCount,
    ];

    pub fn code(&self) -> u32 {
        *self as u32
    }

    /// Kebab-case name, as accepted by [`FromStr`].
    pub fn name(&self) -> &'static str {
        match self {
            Self::CpuUsage => "cpu-usage",
            Self::Uptime => "uptime",
            Self::WifiSignal => "wifi-signal",
            Self::WifiStatus => "wifi-status",
            Self::Temperature => "temperature",
            Self::BrownoutCount => "brownout-count",
            Self::RebootReason => "reboot-reason",
            Self::WifiDataRate => "wifi-data-rate",
            Self::LogLevel => "log-level",
            Self::ErrorCount => "error-count",
        }
    }
}

impl TryFrom<u32> for MetricType {
    type Error = MetricsError;

    fn try_from(code: u32) -> Result<Self, Self::Error> {
        Self::ALL
            .iter()
            .copied()
            .find(|m| m.code() == code)
            .ok_or_else(|| MetricsError::InvalidArgument(format!("unknown metric type {code}")))
    }
}

impl FromStr for MetricType {
    type Err = MetricsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('_', "-");
        Self::ALL
            .iter()
            .copied()
            .find(|m| m.name() == wanted)
            .ok_or_else(|| MetricsError::InvalidArgument(format!("unknown metric '{s}'")))
    }
}

impl std::fmt::Display for MetricType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Verbosity of the diagnostic log sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize)]
pub enum LogLevel {
    None,
    Error,
    Warn,
    Info,
    Debug,
    Verbose,
}

impl LogLevel {
    /// Maps the active `tracing` max level.
    ///
    /// This is the global [`LevelFilter::current`] hint: the most verbose
    /// level any subscriber may enable. A per-target directive such as
    /// `RUST_LOG=device_metrics=warn,info` is not visible here and reports
    /// the broader level.
    ///
    /// [`LevelFilter::current`]: tracing::level_filters::LevelFilter::current
    pub fn current() -> Self {
        Self::from(tracing::level_filters::LevelFilter::current())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::Error => "ERROR",
            Self::Warn => "WARN",
            Self::Info => "INFO",
            Self::Debug => "DEBUG",
            Self::Verbose => "VERBOSE",
        }
    }
}

impl From<tracing::level_filters::LevelFilter> for LogLevel {
    fn from(filter: tracing::level_filters::LevelFilter) -> Self {
        use tracing::level_filters::LevelFilter;
        if filter == LevelFilter::TRACE {
            Self::Verbose
        } else if filter == LevelFilter::DEBUG {
            Self::Debug
        } else if filter == LevelFilter::INFO {
            Self::Info
        } else if filter == LevelFilter::WARN {
            Self::Warn
        } else if filter == LevelFilter::ERROR {
            Self::Error
        } else {
            Self::None
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The value of one metric, tagged by kind.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
#[serde(tag = "metric", content = "value", rename_all = "kebab-case")]
pub enum MetricValue {
    /// Percentage in `[0, 100]`.
    CpuUsage(f32),
    /// Milliseconds since boot.
    Uptime(u64),
    /// dBm.
    WifiSignal(i8),
    WifiStatus(WifiStatus),
    /// Degrees Celsius, `NaN` when unavailable.
    Temperature(f32),
    BrownoutCount(u32),
    RebootReason(RebootReason),
    /// Mbps.
    WifiDataRate(f32),
    LogLevel(LogLevel),
    ErrorCount(u32),
}

impl MetricValue {
    pub fn metric_type(&self) -> MetricType {
        match self {
            Self::CpuUsage(_) => MetricType::CpuUsage,
            Self::Uptime(_) => MetricType::Uptime,
            Self::WifiSignal(_) => MetricType::WifiSignal,
            Self::WifiStatus(_) => MetricType::WifiStatus,
            Self::Temperature(_) => MetricType::Temperature,
            Self::BrownoutCount(_) => MetricType::BrownoutCount,
            Self::RebootReason(_) => MetricType::RebootReason,
            Self::WifiDataRate(_) => MetricType::WifiDataRate,
            Self::LogLevel(_) => MetricType::LogLevel,
            Self::ErrorCount(_) => MetricType::ErrorCount,
        }
    }
}

impl std::fmt::Display for MetricValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CpuUsage(v) => write!(f, "{v:.1}%"),
            Self::Uptime(ms) => write!(f, "{ms} ms"),
            Self::WifiSignal(dbm) => write!(f, "{dbm} dBm"),
            Self::WifiStatus(s) => write!(f, "{s}"),
            Self::Temperature(c) if c.is_nan() => f.write_str("n/a"),
            Self::Temperature(c) => write!(f, "{c:.1} °C"),
            Self::BrownoutCount(n) | Self::ErrorCount(n) => write!(f, "{n}"),
            Self::RebootReason(r) => write!(f, "{r}"),
            Self::WifiDataRate(mbps) => write!(f, "{mbps:.1} Mbps"),
            Self::LogLevel(l) => write!(f, "{l}"),
        }
    }
}
