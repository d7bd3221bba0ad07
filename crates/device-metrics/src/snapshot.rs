// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Aggregated point-in-time device snapshot.
//!
//! A [`DeviceSnapshot`] gathers every metric the facade serves into one
//! serialisable struct for logging and diagnostics. Degraded readings become
//! `None` rather than failing the whole capture.

use crate::{DeviceMetrics, LogLevel, MetricsError, RebootReason, WifiStatus};

/// A complete point-in-time reading of the device's health.
#[derive(Debug, Clone, serde::Serialize)]
pub struct DeviceSnapshot {
    /// Utilisation since the previous CPU sample, `None` if the scheduler
    /// could not be sampled.
    pub cpu_usage_percent: Option<f32>,
    pub uptime_ms: u64,
    pub wifi_status: WifiStatus,
    /// `None` when not associated.
    pub wifi_rssi_dbm: Option<i8>,
    /// `None` when not associated.
    pub wifi_data_rate_mbps: Option<f32>,
    /// Live reading, or `None` when the sensor is absent or has never been
    /// read successfully.
    pub temperature_celsius: Option<f32>,
    /// `true` when `temperature_celsius` is a cached value from an earlier
    /// read.
    pub temperature_stale: bool,
    pub brownout_count: u32,
    pub error_count: u32,
    pub reboot_reason: RebootReason,
    pub log_level: LogLevel,
}

impl DeviceSnapshot {
    /// Captures a new snapshot from an initialised facade.
    ///
    /// Only `InvalidState` aborts the capture; provider failures degrade the
    /// affected field:
    /// - **CPU**: a failed scheduler sample leaves `cpu_usage_percent` empty.
    /// - **Temperature**: a failed read keeps the last good value and marks
    ///   it stale.
    /// - **Wi-Fi**: signal and data rate are empty when not associated.
    pub fn capture(metrics: &DeviceMetrics) -> Result<Self, MetricsError> {
        let cpu_usage_percent = match metrics.cpu_usage() {
            Ok(usage) => Some(usage),
            Err(MetricsError::InvalidState) => return Err(MetricsError::InvalidState),
            Err(e) => {
                tracing::warn!("cpu sample unavailable: {e}");
                None
            }
        };

        let (temp, temp_err) = metrics.temperature_reading()?.into_parts();
        let temperature_celsius = (!temp.is_nan()).then_some(temp);
        let temperature_stale = temperature_celsius.is_some() && temp_err.is_some();

        let wifi_status = *metrics.wifi_status_reading()?.value();
        let wifi_rssi_dbm = metrics.wifi_signal_reading()?.into_result().ok();
        let wifi_data_rate_mbps = metrics.wifi_data_rate_reading()?.into_result().ok();

        Ok(Self {
            cpu_usage_percent,
            uptime_ms: metrics.uptime_ms()?,
            wifi_status,
            wifi_rssi_dbm,
            wifi_data_rate_mbps,
            temperature_celsius,
            temperature_stale,
            brownout_count: metrics.brownout_count()?,
            error_count: metrics.error_count()?,
            reboot_reason: metrics.reboot_reason()?,
            log_level: metrics.log_level()?,
        })
    }

    /// Returns a summary string suitable for logging or CLI display.
    ///
    /// # Example output
    /// ```text
    /// Device: CPU 35.0%, up 3723s, Wi-Fi Connected (-62 dBm, 144.0 Mbps), Temp 47.5°C, reset: Power-on reset, errors 0, brownouts 0
    /// ```
    pub fn summary(&self) -> String {
        let cpu = match self.cpu_usage_percent {
            Some(u) => format!("{u:.1}%"),
            None => "n/a".to_string(),
        };

        let link = match (self.wifi_rssi_dbm, self.wifi_data_rate_mbps) {
            (Some(rssi), Some(rate)) => format!("{} ({rssi} dBm, {rate:.1} Mbps)", self.wifi_status),
            (Some(rssi), None) => format!("{} ({rssi} dBm)", self.wifi_status),
            _ => self.wifi_status.to_string(),
        };

        let temp = match self.temperature_celsius {
            Some(c) if self.temperature_stale => format!("{c:.1}°C (stale)"),
            Some(c) => format!("{c:.1}°C"),
            None => "n/a".to_string(),
        };

        format!(
            "Device: CPU {cpu}, up {}s, Wi-Fi {link}, Temp {temp}, \
             reset: {}, errors {}, brownouts {}",
            self.uptime_ms / 1000,
            self.reboot_reason.label,
            self.error_count,
            self.brownout_count,
        )
    }

    /// Returns `true` if any signal is missing or points at a problem:
    /// - no usable temperature (absent, never read, or stale),
    /// - no wireless link,
    /// - the last restart was a brownout or a watchdog.
    pub fn is_degraded(&self) -> bool {
        self.temperature_celsius.is_none()
            || self.temperature_stale
            || self.wifi_status != WifiStatus::Connected
            || self.brownout_count > 0
            || self.reboot_reason.cause.is_watchdog()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake;
    use crate::MetricsConfig;

    fn sample_snapshot(temp: Option<f32>, status: WifiStatus, reset_code: u32) -> DeviceSnapshot {
        DeviceSnapshot {
            cpu_usage_percent: Some(35.0),
            uptime_ms: 3_723_000,
            wifi_status: status,
            wifi_rssi_dbm: (status == WifiStatus::Connected).then_some(-62),
            wifi_data_rate_mbps: (status == WifiStatus::Connected).then_some(144.0),
            temperature_celsius: temp,
            temperature_stale: false,
            brownout_count: 0,
            error_count: 0,
            reboot_reason: RebootReason::from_code(reset_code),
            log_level: LogLevel::Info,
        }
    }

    #[test]
    fn test_summary_format() {
        let snap = sample_snapshot(Some(47.5), WifiStatus::Connected, 1);
        let summary = snap.summary();
        assert!(summary.contains("CPU 35.0%"));
        assert!(summary.contains("up 3723s"));
        assert!(summary.contains("-62 dBm"));
        assert!(summary.contains("144.0 Mbps"));
        assert!(summary.contains("47.5°C"));
        assert!(summary.contains("Power-on reset"));
    }

    #[test]
    fn test_summary_missing_values() {
        let mut snap = sample_snapshot(None, WifiStatus::Disconnected, 1);
        snap.cpu_usage_percent = None;
        let summary = snap.summary();
        assert!(summary.contains("CPU n/a"));
        assert!(summary.contains("Wi-Fi Disconnected,"));
        assert!(summary.contains("Temp n/a"));
    }

    #[test]
    fn test_healthy_not_degraded() {
        let snap = sample_snapshot(Some(40.0), WifiStatus::Connected, 1);
        assert!(!snap.is_degraded());
    }

    #[test]
    fn test_degraded_conditions() {
        assert!(sample_snapshot(None, WifiStatus::Connected, 1).is_degraded());
        assert!(sample_snapshot(Some(40.0), WifiStatus::Disconnected, 1).is_degraded());
        assert!(sample_snapshot(Some(40.0), WifiStatus::Connected, 6).is_degraded());

        let mut brownout = sample_snapshot(Some(40.0), WifiStatus::Connected, 8);
        brownout.brownout_count = 1;
        assert!(brownout.is_degraded());

        let mut stale = sample_snapshot(Some(40.0), WifiStatus::Connected, 1);
        stale.temperature_stale = true;
        assert!(stale.is_degraded());
        assert!(stale.summary().contains("(stale)"));
    }

    #[test]
    fn test_capture_requires_init() {
        let metrics = DeviceMetrics::new(MetricsConfig::default(), fake::quiet_device()).unwrap();
        assert!(matches!(
            DeviceSnapshot::capture(&metrics),
            Err(MetricsError::InvalidState)
        ));
    }

    #[test]
    fn test_capture_simulated_device() {
        let metrics =
            DeviceMetrics::new(MetricsConfig::default(), fake::simulated_device()).unwrap();
        metrics.init().unwrap();
        let first = DeviceSnapshot::capture(&metrics).unwrap();
        assert_eq!(first.cpu_usage_percent, Some(0.0));
        assert_eq!(first.wifi_status, WifiStatus::Connected);
        assert_eq!(first.wifi_rssi_dbm, Some(-62));
        assert_eq!(first.wifi_data_rate_mbps, Some(144.0));
        assert_eq!(first.temperature_celsius, Some(47.5));
        assert!(!first.temperature_stale);

        let second = DeviceSnapshot::capture(&metrics).unwrap();
        let usage = second.cpu_usage_percent.unwrap();
        assert!((usage - 35.0).abs() < 0.01);
    }

    #[test]
    fn test_capture_quiet_device() {
        let metrics = DeviceMetrics::new(MetricsConfig::default(), fake::quiet_device()).unwrap();
        metrics.init().unwrap();
        let snap = DeviceSnapshot::capture(&metrics).unwrap();
        assert_eq!(snap.wifi_status, WifiStatus::Disconnected);
        assert_eq!(snap.wifi_rssi_dbm, None);
        assert_eq!(snap.temperature_celsius, None);
        assert!(snap.is_degraded());

        let json = serde_json::to_value(&snap).unwrap();
        assert_eq!(json["wifi_status"], "Disconnected");
        assert!(json["temperature_celsius"].is_null());
    }
}
