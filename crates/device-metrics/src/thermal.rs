// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Temperature reading with a last-known-good cache.
//!
//! The cached value is either a real reading or `NaN`, meaning the sensor
//! has never been read successfully. A failed live read hands back the
//! cached value next to the error instead of leaving the output undefined.

use crate::provider::{TemperatureRange, TemperatureSensor};
use crate::{MetricsError, Reading};

/// Value reported when no temperature is available.
pub const NO_TEMPERATURE: f32 = f32::NAN;

/// Temperature capability state.
#[derive(Debug, Clone, Copy)]
pub struct TemperatureCache {
    enabled: bool,
    last_celsius: f32,
}

impl Default for TemperatureCache {
    fn default() -> Self {
        Self {
            enabled: false,
            last_celsius: NO_TEMPERATURE,
        }
    }
}

impl TemperatureCache {
    /// Configures and starts `sensor`, then seeds the cache with one read.
    ///
    /// Any failure leaves the capability disabled with a `NaN` cache; the
    /// sensor is optional so nothing is returned to the caller.
    pub fn start(sensor: &dyn TemperatureSensor, range: TemperatureRange) -> Self {
        if let Err(e) = sensor.configure(range) {
            tracing::warn!("failed to configure temperature sensor: {e}");
            return Self::default();
        }
        if let Err(e) = sensor.start() {
            tracing::warn!("failed to start temperature sensor: {e}");
            return Self::default();
        }

        let last_celsius = match sensor.read_celsius() {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!("initial temperature read failed: {e}");
                NO_TEMPERATURE
            }
        };
        Self {
            enabled: true,
            last_celsius,
        }
    }

    /// Stops the sensor if it was running and disables the capability.
    pub fn stop(&mut self, sensor: &dyn TemperatureSensor) {
        if self.enabled {
            if let Err(e) = sensor.stop() {
                tracing::warn!("failed to stop temperature sensor: {e}");
            }
            self.enabled = false;
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Last successful reading, or `NaN`.
    pub fn last_celsius(&self) -> f32 {
        self.last_celsius
    }

    /// Performs a live read, falling back to the cached value on failure.
    pub fn read(&mut self, sensor: &dyn TemperatureSensor) -> Reading<f32> {
        if !self.enabled {
            return Reading::degraded(
                NO_TEMPERATURE,
                MetricsError::NotSupported {
                    capability: "temperature sensor",
                },
            );
        }

        match sensor.read_celsius() {
            Ok(c) => {
                self.last_celsius = c;
                Reading::ok(c)
            }
            Err(e) => Reading::degraded(
                self.last_celsius,
                MetricsError::provider("temperature read", e),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::FakeTemperatureSensor;
    use crate::{ErrorKind, ProviderError};

    const RANGE: TemperatureRange = TemperatureRange {
        min_c: -10,
        max_c: 80,
    };

    #[test]
    fn test_start_seeds_cache() {
        let sensor = FakeTemperatureSensor::with_readings(vec![Ok(41.5)]);
        let cache = TemperatureCache::start(&sensor, RANGE);
        assert!(cache.is_enabled());
        assert_eq!(cache.last_celsius(), 41.5);
        assert_eq!(sensor.configured_range(), Some(RANGE));
    }

    #[test]
    fn test_start_failure_disables() {
        let sensor = FakeTemperatureSensor::absent();
        let cache = TemperatureCache::start(&sensor, RANGE);
        assert!(!cache.is_enabled());
        assert!(cache.last_celsius().is_nan());
    }

    #[test]
    fn test_seed_read_failure_keeps_nan() {
        let sensor =
            FakeTemperatureSensor::with_readings(vec![Err(ProviderError::Hardware("i2c".into()))]);
        let cache = TemperatureCache::start(&sensor, RANGE);
        assert!(cache.is_enabled());
        assert!(cache.last_celsius().is_nan());
    }

    #[test]
    fn test_disabled_read_is_not_supported() {
        let sensor = FakeTemperatureSensor::absent();
        let mut cache = TemperatureCache::default();
        let reading = cache.read(&sensor);
        assert!(reading.value().is_nan());
        assert_eq!(reading.error().map(|e| e.kind()), Some(ErrorKind::NotSupported));
        assert_eq!(sensor.read_calls(), 0);
    }

    #[test]
    fn test_failed_read_returns_stale_value() {
        let sensor = FakeTemperatureSensor::with_readings(vec![
            Ok(40.0),
            Ok(42.0),
            Err(ProviderError::Hardware("timeout".into())),
        ]);
        let mut cache = TemperatureCache::start(&sensor, RANGE);
        assert_eq!(*cache.read(&sensor).value(), 42.0);

        let stale = cache.read(&sensor);
        assert_eq!(*stale.value(), 42.0);
        assert_eq!(stale.error().map(|e| e.kind()), Some(ErrorKind::Provider));
        assert_eq!(cache.last_celsius(), 42.0);
    }

    #[test]
    fn test_stop_disables() {
        let sensor = FakeTemperatureSensor::with_readings(vec![Ok(30.0)]);
        let mut cache = TemperatureCache::start(&sensor, RANGE);
        cache.stop(&sensor);
        assert!(!cache.is_enabled());
        assert!(!sensor.is_running());
    }
}
