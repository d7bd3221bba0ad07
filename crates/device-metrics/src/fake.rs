// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Scripted, deterministic capability providers.
//!
//! Used by the test suites and by `devmon --simulate`. Every fake counts its
//! calls so tests can assert that a code path never reached the platform.
//! Wrap a fake in an `Arc` to keep a handle after moving it into
//! [`Providers`].

use crate::host::HostClock;
use crate::provider::{
    ApRecord, ChannelWidth, Clock, PhyMode, Providers, ResetCauseReader, SchedulerSnapshot,
    SchedulerStats, TaskRunTime, TemperatureRange, TemperatureSensor, WifiMode, WifiRadio,
};
use crate::ProviderError;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// Builds a provider error on demand (`ProviderError` is not `Clone`).
pub type ErrorFactory = fn() -> ProviderError;

// ── Scheduler ──────────────────────────────────────────────────

#[derive(Debug, Default)]
struct SchedulerScript {
    samples: VecDeque<(u64, u64)>,
    /// Increment applied once the script is exhausted.
    step: Option<(u64, u64)>,
    last: (u64, u64),
}

/// Scheduler that replays `(total, idle)` run-time samples.
///
/// Once the script runs out it either repeats the last sample or, for
/// [`steady_load`](Self::steady_load), keeps advancing at a fixed rate.
#[derive(Debug, Default)]
pub struct FakeScheduler {
    script: Mutex<SchedulerScript>,
    fail_no_memory: AtomicBool,
    calls: AtomicUsize,
}

impl FakeScheduler {
    pub fn from_samples(samples: Vec<(u64, u64)>) -> Self {
        Self {
            script: Mutex::new(SchedulerScript {
                samples: samples.into(),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    /// Scheduler whose counters advance so that every sample after the first
    /// reports `load_percent` utilisation.
    pub fn steady_load(load_percent: f32) -> Self {
        let total_step = 10_000u64;
        let busy = (load_percent.clamp(0.0, 100.0) / 100.0 * total_step as f32).round() as u64;
        Self {
            script: Mutex::new(SchedulerScript {
                step: Some((total_step, total_step - busy)),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    /// Makes the next snapshot fail with [`ProviderError::NoMemory`].
    pub fn fail_next_with_no_memory(&self) {
        self.fail_no_memory.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl SchedulerStats for FakeScheduler {
    fn snapshot(&self) -> Result<SchedulerSnapshot, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_no_memory.swap(false, Ordering::SeqCst) {
            return Err(ProviderError::NoMemory("task status array".into()));
        }

        let mut script = self.script.lock().unwrap_or_else(PoisonError::into_inner);
        let (total, idle) = match (script.samples.pop_front(), script.step) {
            (Some(sample), _) => sample,
            (None, Some((dt, didle))) => (script.last.0 + dt, script.last.1 + didle),
            (None, None) => script.last,
        };
        script.last = (total, idle);

        Ok(SchedulerSnapshot {
            tasks: vec![
                TaskRunTime::new("IDLE", idle),
                TaskRunTime::new("main", total.saturating_sub(idle)),
            ],
            total_run_time: total,
        })
    }
}

// ── Radio ──────────────────────────────────────────────────────

/// Radio with a fixed mode and optional association.
#[derive(Debug)]
pub struct FakeRadio {
    mode: WifiMode,
    mode_failure: Option<ErrorFactory>,
    ap: Option<ApRecord>,
    ap_failure: Option<ErrorFactory>,
    phy: PhyMode,
    phy_failure: Option<ErrorFactory>,
    mode_calls: AtomicUsize,
    ap_calls: AtomicUsize,
    phy_calls: AtomicUsize,
}

impl FakeRadio {
    /// Radio switched off; AP queries fail with `NotConnected`.
    pub fn off() -> Self {
        Self {
            mode: WifiMode::Off,
            mode_failure: None,
            ap: None,
            ap_failure: None,
            phy: PhyMode::Legacy11b,
            phy_failure: None,
            mode_calls: AtomicUsize::new(0),
            ap_calls: AtomicUsize::new(0),
            phy_calls: AtomicUsize::new(0),
        }
    }

    /// Station associated with an AP at `rssi` dBm.
    pub fn connected(rssi: i8, phy: PhyMode, width: ChannelWidth) -> Self {
        Self {
            mode: WifiMode::Station,
            ap: Some(ApRecord {
                rssi,
                primary_channel: 6,
                width,
            }),
            phy,
            ..Self::off()
        }
    }

    pub fn with_mode(mut self, mode: WifiMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_mode_failure(mut self, make: ErrorFactory) -> Self {
        self.mode_failure = Some(make);
        self
    }

    pub fn with_ap_failure(mut self, make: ErrorFactory) -> Self {
        self.ap_failure = Some(make);
        self
    }

    pub fn with_phy_failure(mut self, make: ErrorFactory) -> Self {
        self.phy_failure = Some(make);
        self
    }

    pub fn ap_record_calls(&self) -> usize {
        self.ap_calls.load(Ordering::SeqCst)
    }

    /// Calls across all three queries.
    pub fn total_calls(&self) -> usize {
        self.mode_calls.load(Ordering::SeqCst)
            + self.ap_calls.load(Ordering::SeqCst)
            + self.phy_calls.load(Ordering::SeqCst)
    }
}

impl WifiRadio for FakeRadio {
    fn mode(&self) -> Result<WifiMode, ProviderError> {
        self.mode_calls.fetch_add(1, Ordering::SeqCst);
        match self.mode_failure {
            Some(make) => Err(make()),
            None => Ok(self.mode),
        }
    }

    fn ap_record(&self) -> Result<ApRecord, ProviderError> {
        self.ap_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(make) = self.ap_failure {
            return Err(make());
        }
        self.ap.clone().ok_or(ProviderError::NotConnected)
    }

    fn negotiated_phy_mode(&self) -> Result<PhyMode, ProviderError> {
        self.phy_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(make) = self.phy_failure {
            return Err(make());
        }
        match self.ap {
            Some(_) => Ok(self.phy),
            None => Err(ProviderError::NotConnected),
        }
    }
}

// ── Temperature ────────────────────────────────────────────────

/// Temperature sensor that replays scripted readings.
#[derive(Debug, Default)]
pub struct FakeTemperatureSensor {
    configure_failure: Option<ErrorFactory>,
    start_failure: Option<ErrorFactory>,
    readings: Mutex<VecDeque<Result<f32, ProviderError>>>,
    /// Returned forever once `readings` is exhausted.
    steady: Option<f32>,
    range: Mutex<Option<TemperatureRange>>,
    running: AtomicBool,
    read_calls: AtomicUsize,
}

impl FakeTemperatureSensor {
    /// A device without a sensor: `configure` fails with `NotSupported`.
    pub fn absent() -> Self {
        Self {
            configure_failure: Some(|| ProviderError::NotSupported("temperature sensor".into())),
            ..Default::default()
        }
    }

    /// Sensor that always reads `celsius`.
    pub fn steady(celsius: f32) -> Self {
        Self {
            steady: Some(celsius),
            ..Default::default()
        }
    }

    /// Sensor that replays `readings` and then fails every read.
    pub fn with_readings(readings: Vec<Result<f32, ProviderError>>) -> Self {
        Self {
            readings: Mutex::new(readings.into()),
            ..Default::default()
        }
    }

    pub fn with_start_failure(mut self, make: ErrorFactory) -> Self {
        self.start_failure = Some(make);
        self
    }

    /// Queues another scripted reading.
    pub fn push_reading(&self, reading: Result<f32, ProviderError>) {
        self.readings
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(reading);
    }

    pub fn configured_range(&self) -> Option<TemperatureRange> {
        *self.range.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn read_calls(&self) -> usize {
        self.read_calls.load(Ordering::SeqCst)
    }
}

impl TemperatureSensor for FakeTemperatureSensor {
    fn configure(&self, range: TemperatureRange) -> Result<(), ProviderError> {
        if let Some(make) = self.configure_failure {
            return Err(make());
        }
        *self.range.lock().unwrap_or_else(PoisonError::into_inner) = Some(range);
        Ok(())
    }

    fn start(&self) -> Result<(), ProviderError> {
        if let Some(make) = self.start_failure {
            return Err(make());
        }
        self.running.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn stop(&self) -> Result<(), ProviderError> {
        self.running.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn read_celsius(&self) -> Result<f32, ProviderError> {
        self.read_calls.fetch_add(1, Ordering::SeqCst);
        if !self.is_running() {
            return Err(ProviderError::NotStarted);
        }
        let scripted = self
            .readings
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        match (scripted, self.steady) {
            (Some(reading), _) => reading,
            (None, Some(c)) => Ok(c),
            (None, None) => Err(ProviderError::Hardware("no scripted reading left".into())),
        }
    }
}

// ── Reset cause and clock ──────────────────────────────────────

/// Reset-cause register holding a fixed code.
#[derive(Debug, Clone, Copy)]
pub struct FixedResetCause(pub u32);

impl ResetCauseReader for FixedResetCause {
    fn reset_code(&self) -> u32 {
        self.0
    }
}

/// Clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    millis: AtomicU64,
}

impl ManualClock {
    pub fn at(since_boot: Duration) -> Self {
        Self {
            millis: AtomicU64::new(since_boot.as_millis() as u64),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.millis
            .fetch_add(by.as_millis() as u64, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn since_boot(&self) -> Duration {
        Duration::from_millis(self.millis.load(Ordering::SeqCst))
    }
}

// ── Presets ────────────────────────────────────────────────────

/// A device with no link, no temperature sensor and a power-on reset.
pub fn quiet_device() -> Providers {
    Providers {
        scheduler: Box::new(FakeScheduler::steady_load(0.0)),
        radio: Box::new(FakeRadio::off()),
        temperature: Box::new(FakeTemperatureSensor::absent()),
        reset_cause: Box::new(FixedResetCause(1)),
        clock: Box::new(ManualClock::at(Duration::from_secs(1))),
    }
}

/// A plausible running device: 35 % load, associated on HT40 at -62 dBm,
/// 47.5 °C. Uptime follows the host clock.
pub fn simulated_device() -> Providers {
    Providers {
        scheduler: Box::new(FakeScheduler::steady_load(35.0)),
        radio: Box::new(FakeRadio::connected(-62, PhyMode::Ht, ChannelWidth::Mhz40)),
        temperature: Box::new(FakeTemperatureSensor::steady(47.5)),
        reset_cause: Box::new(FixedResetCause(1)),
        clock: Box::new(HostClock::new()),
    }
}
