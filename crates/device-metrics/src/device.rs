// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The metrics facade: lifecycle, cached state and the typed dispatcher.
//!
//! ```text
//! DeviceMetrics::new(config, providers)
//!     │  .init()        baseline uptime, start sensor, classify reset cause
//!     ▼
//!  getters / get_metric(MetricType)  ──► Providers
//!     │  .deinit()      stop sensor
//!     ▼
//!  (re-init resets counters)
//! ```
//!
//! # Concurrency
//! All mutable state lives behind one `Mutex`, and every operation holds it
//! across its provider call. The read-modify-write of the previous CPU sample
//! and of the temperature cache is therefore atomic per call, and
//! `DeviceMetrics` can be shared through an `Arc`.

use crate::cpu::CpuSampler;
use crate::metric::{LogLevel, MetricType, MetricValue};
use crate::provider::{Clock, Providers};
use crate::reset::{RebootReason, ResetCause};
use crate::thermal::TemperatureCache;
use crate::wifi::{self, WifiStatus};
use crate::{MetricsConfig, MetricsError, Reading};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Returns the library version string.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Cached and previous-sample state, reset by every fresh `init`.
#[derive(Debug, Default)]
struct MetricsState {
    initialized: bool,
    cpu: CpuSampler,
    last_uptime_ms: u64,
    temperature: TemperatureCache,
    brownout_count: u32,
    error_count: u32,
    reboot_reason: RebootReason,
}

/// Device-health telemetry facade.
///
/// # Example
/// ```
/// use device_metrics::{fake, DeviceMetrics, MetricType, MetricValue, MetricsConfig};
///
/// let metrics = DeviceMetrics::new(MetricsConfig::default(), fake::quiet_device()).unwrap();
/// metrics.init().unwrap();
///
/// metrics.increment_error_count().unwrap();
/// assert_eq!(metrics.get_metric(MetricType::ErrorCount).unwrap(), MetricValue::ErrorCount(1));
///
/// metrics.deinit().unwrap();
/// ```
#[derive(Debug)]
pub struct DeviceMetrics {
    config: MetricsConfig,
    providers: Providers,
    state: Mutex<MetricsState>,
}

impl DeviceMetrics {
    /// Creates an uninitialised facade. Call [`init`](Self::init) before
    /// reading any metric.
    pub fn new(config: MetricsConfig, providers: Providers) -> Result<Self, MetricsError> {
        config.validate()?;
        Ok(Self {
            config,
            providers,
            state: Mutex::new(MetricsState::default()),
        })
    }

    pub fn config(&self) -> &MetricsConfig {
        &self.config
    }

    fn lock(&self) -> MutexGuard<'_, MetricsState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Locks the state, failing with `InvalidState` before `init`.
    fn session(&self) -> Result<MutexGuard<'_, MetricsState>, MetricsError> {
        let state = self.lock();
        if !state.initialized {
            return Err(MetricsError::InvalidState);
        }
        Ok(state)
    }

    // ── Lifecycle ──────────────────────────────────────────────

    /// Starts a metrics session. A no-op if already initialised.
    ///
    /// Zeroes both counters, records the uptime baseline, tries to bring up
    /// the optional temperature sensor and classifies the reset cause. A
    /// brownout restart sets the brownout counter to 1.
    pub fn init(&self) -> Result<(), MetricsError> {
        let mut state = self.lock();
        if state.initialized {
            return Ok(());
        }

        state.brownout_count = 0;
        state.error_count = 0;
        state.last_uptime_ms = uptime_ms(self.providers.clock.as_ref());

        state.temperature = if self.config.temperature.enabled {
            TemperatureCache::start(
                self.providers.temperature.as_ref(),
                self.config.temperature.range(),
            )
        } else {
            tracing::debug!("temperature sensor disabled by configuration");
            TemperatureCache::default()
        };

        state.reboot_reason = RebootReason::from_code(self.providers.reset_cause.reset_code());
        if state.reboot_reason.cause == ResetCause::Brownout {
            state.brownout_count = 1;
        }

        state.cpu.reset();
        state.initialized = true;

        tracing::info!(
            "device metrics initialized (v{}), last reset: {}",
            version(),
            state.reboot_reason
        );
        Ok(())
    }

    /// Ends the session and stops the temperature sensor. A no-op if not
    /// initialised.
    pub fn deinit(&self) -> Result<(), MetricsError> {
        let mut state = self.lock();
        if !state.initialized {
            return Ok(());
        }
        state.temperature.stop(self.providers.temperature.as_ref());
        state.initialized = false;
        tracing::info!("device metrics deinitialized");
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.lock().initialized
    }

    // ── CPU and uptime ─────────────────────────────────────────

    /// Processor utilisation since the previous call, in `[0, 100]`.
    ///
    /// The first call after `init` establishes the baseline and returns 0.
    pub fn cpu_usage(&self) -> Result<f32, MetricsError> {
        let mut state = self.session()?;
        let snapshot = self
            .providers
            .scheduler
            .snapshot()
            .map_err(|e| MetricsError::provider("scheduler snapshot", e))?;

        let usage = state
            .cpu
            .update_from(&snapshot, &self.config.idle_task_name);
        tracing::debug!(
            "cpu sample: total={} tasks={} usage={usage:.1}%",
            snapshot.total_run_time,
            snapshot.tasks.len()
        );
        Ok(usage)
    }

    /// Milliseconds since boot.
    pub fn uptime_ms(&self) -> Result<u64, MetricsError> {
        let mut state = self.session()?;
        let now = uptime_ms(self.providers.clock.as_ref());
        state.last_uptime_ms = now;
        Ok(now)
    }

    /// The uptime recorded by the latest `init` or `uptime_ms` call.
    pub fn last_uptime_ms(&self) -> Result<u64, MetricsError> {
        Ok(self.session()?.last_uptime_ms)
    }

    // ── Wireless ───────────────────────────────────────────────

    pub fn wifi_status_reading(&self) -> Result<Reading<WifiStatus>, MetricsError> {
        let _state = self.session()?;
        Ok(wifi::link_status(self.providers.radio.as_ref()))
    }

    pub fn wifi_status(&self) -> Result<WifiStatus, MetricsError> {
        self.wifi_status_reading()?.into_result()
    }

    /// RSSI in dBm; the reading carries 0 when the query fails.
    pub fn wifi_signal_reading(&self) -> Result<Reading<i8>, MetricsError> {
        let _state = self.session()?;
        Ok(wifi::signal_strength(self.providers.radio.as_ref()))
    }

    pub fn wifi_signal(&self) -> Result<i8, MetricsError> {
        self.wifi_signal_reading()?.into_result()
    }

    /// Heuristic data rate in Mbps; the reading carries 0.0 when a query
    /// fails.
    pub fn wifi_data_rate_reading(&self) -> Result<Reading<f32>, MetricsError> {
        let _state = self.session()?;
        Ok(wifi::data_rate_mbps(self.providers.radio.as_ref()))
    }

    pub fn wifi_data_rate(&self) -> Result<f32, MetricsError> {
        self.wifi_data_rate_reading()?.into_result()
    }

    // ── Temperature ────────────────────────────────────────────

    /// Live temperature in °C.
    ///
    /// With the sensor disabled the reading is `NaN` with `NotSupported`; on
    /// a failed read it is the last good value (or `NaN`) with the provider
    /// error.
    pub fn temperature_reading(&self) -> Result<Reading<f32>, MetricsError> {
        let mut state = self.session()?;
        Ok(state.temperature.read(self.providers.temperature.as_ref()))
    }

    pub fn temperature(&self) -> Result<f32, MetricsError> {
        self.temperature_reading()?.into_result()
    }

    // ── Counters and reset cause ───────────────────────────────

    pub fn brownout_count(&self) -> Result<u32, MetricsError> {
        Ok(self.session()?.brownout_count)
    }

    pub fn error_count(&self) -> Result<u32, MetricsError> {
        Ok(self.session()?.error_count)
    }

    /// Adds one to the error counter.
    pub fn increment_error_count(&self) -> Result<(), MetricsError> {
        let mut state = self.session()?;
        state.error_count = state.error_count.wrapping_add(1);
        Ok(())
    }

    /// Reset cause classified during `init`.
    pub fn reboot_reason(&self) -> Result<RebootReason, MetricsError> {
        Ok(self.session()?.reboot_reason)
    }

    pub fn log_level(&self) -> Result<LogLevel, MetricsError> {
        let _state = self.session()?;
        Ok(LogLevel::current())
    }

    // ── Dispatch ───────────────────────────────────────────────

    /// Reads one metric, keeping the fallback value of degraded readings.
    ///
    /// `Err` means no value was produced at all (not initialised, or a
    /// failure with no fallback such as a scheduler `NoMemory`).
    pub fn read_metric(&self, metric: MetricType) -> Result<Reading<MetricValue>, MetricsError> {
        let reading = match metric {
            MetricType::CpuUsage => Reading::ok(MetricValue::CpuUsage(self.cpu_usage()?)),
            MetricType::Uptime => Reading::ok(MetricValue::Uptime(self.uptime_ms()?)),
            MetricType::WifiSignal => self.wifi_signal_reading()?.map(MetricValue::WifiSignal),
            MetricType::WifiStatus => self.wifi_status_reading()?.map(MetricValue::WifiStatus),
            MetricType::Temperature => self.temperature_reading()?.map(MetricValue::Temperature),
            MetricType::BrownoutCount => {
                Reading::ok(MetricValue::BrownoutCount(self.brownout_count()?))
            }
            MetricType::RebootReason => {
                Reading::ok(MetricValue::RebootReason(self.reboot_reason()?))
            }
            MetricType::WifiDataRate => {
                self.wifi_data_rate_reading()?.map(MetricValue::WifiDataRate)
            }
            MetricType::LogLevel => Reading::ok(MetricValue::LogLevel(self.log_level()?)),
            MetricType::ErrorCount => Reading::ok(MetricValue::ErrorCount(self.error_count()?)),
        };
        Ok(reading)
    }

    /// Routes `metric` to its getter.
    pub fn get_metric(&self, metric: MetricType) -> Result<MetricValue, MetricsError> {
        self.read_metric(metric)?.into_result()
    }

    /// Like [`get_metric`](Self::get_metric) for a raw metric code.
    ///
    /// Fails with `InvalidState` before `init`. Unknown codes then fail with
    /// `InvalidArgument` before any provider is touched.
    pub fn get_metric_by_code(&self, code: u32) -> Result<MetricValue, MetricsError> {
        if !self.is_initialized() {
            return Err(MetricsError::InvalidState);
        }
        let metric = MetricType::try_from(code)?;
        self.get_metric(metric)
    }
}

impl Drop for DeviceMetrics {
    fn drop(&mut self) {
        // Leave the sensor stopped even if the owner forgot to deinit.
        let _ = self.deinit();
    }
}

fn uptime_ms(clock: &dyn Clock) -> u64 {
    u64::try_from(clock.since_boot().as_millis()).unwrap_or(u64::MAX)
}
