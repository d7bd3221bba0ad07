// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Facade configuration loaded from TOML files or constructed programmatically.
//!
//! # TOML Format
//! ```toml
//! idle_task_name = "IDLE"
//! thermal_zone_path = "/sys/class/thermal/thermal_zone0/temp"
//!
//! [temperature]
//! enabled = true
//! range_min_c = -10
//! range_max_c = 80
//! ```

use crate::provider::TemperatureRange;
use crate::MetricsError;
use std::path::{Path, PathBuf};

/// Configuration for [`DeviceMetrics`](crate::DeviceMetrics).
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Name of the scheduler's idle task, used for CPU utilisation.
    pub idle_task_name: String,
    /// Thermal zone file read by the host temperature adapter.
    pub thermal_zone_path: PathBuf,
    /// Temperature sensor settings.
    pub temperature: TemperatureConfig,
}

/// Temperature sensor settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TemperatureConfig {
    /// Set to `false` to skip the sensor entirely.
    pub enabled: bool,
    pub range_min_c: i32,
    pub range_max_c: i32,
}

impl Default for TemperatureConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            range_min_c: -10,
            range_max_c: 80,
        }
    }
}

impl TemperatureConfig {
    pub fn range(&self) -> TemperatureRange {
        TemperatureRange {
            min_c: self.range_min_c,
            max_c: self.range_max_c,
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            idle_task_name: "IDLE".to_string(),
            thermal_zone_path: PathBuf::from("/sys/class/thermal/thermal_zone0/temp"),
            temperature: TemperatureConfig::default(),
        }
    }
}

impl MetricsConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, MetricsError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            MetricsError::InvalidArgument(format!("cannot read config '{}': {e}", path.display()))
        })?;
        Self::from_toml(&content)
    }

    /// Parses and validates configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, MetricsError> {
        let config: Self = toml::from_str(toml_str)
            .map_err(|e| MetricsError::InvalidArgument(format!("TOML parse error: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialises configuration to TOML.
    pub fn to_toml(&self) -> Result<String, MetricsError> {
        toml::to_string_pretty(self)
            .map_err(|e| MetricsError::InvalidArgument(format!("TOML serialise error: {e}")))
    }

    pub fn validate(&self) -> Result<(), MetricsError> {
        if self.idle_task_name.trim().is_empty() {
            return Err(MetricsError::InvalidArgument(
                "idle_task_name must not be empty".into(),
            ));
        }
        let t = &self.temperature;
        if t.range_min_c >= t.range_max_c {
            return Err(MetricsError::InvalidArgument(format!(
                "temperature range [{}, {}] is empty",
                t.range_min_c, t.range_max_c
            )));
        }
        Ok(())
    }
}
