// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Capability provider contracts.
//!
//! The facade never talks to hardware directly. Everything it needs from the
//! platform is expressed as one of the traits below and injected through
//! [`Providers`]:
//!
//! | Trait                 | Platform capability                        |
//! |-----------------------|--------------------------------------------|
//! | [`SchedulerStats`]    | per-task cumulative run-time counters      |
//! | [`WifiRadio`]         | radio mode, associated AP, PHY mode        |
//! | [`TemperatureSensor`] | optional internal temperature sensor       |
//! | [`ResetCauseReader`]  | hardware reset-cause register              |
//! | [`Clock`]             | monotonic time since boot                  |
//!
//! All traits take `&self` and must be `Send + Sync`; implementations that
//! keep state use interior mutability.

use crate::ProviderError;
use std::sync::Arc;
use std::time::Duration;

/// Cumulative run time of a single scheduler task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRunTime {
    pub name: String,
    pub run_time: u64,
}

impl TaskRunTime {
    pub fn new(name: impl Into<String>, run_time: u64) -> Self {
        Self {
            name: name.into(),
            run_time,
        }
    }
}

/// One scheduler statistics sample.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchedulerSnapshot {
    pub tasks: Vec<TaskRunTime>,
    /// Total run time across all tasks, in the same unit as `tasks`.
    pub total_run_time: u64,
}

impl SchedulerSnapshot {
    /// Returns the run-time counter of the task called `name`, or 0 when no
    /// such task exists.
    pub fn run_time_of(&self, name: &str) -> u64 {
        self.tasks
            .iter()
            .find(|t| t.name == name)
            .map(|t| t.run_time)
            .unwrap_or(0)
    }
}

/// Operating mode of the wireless radio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum WifiMode {
    Off,
    Station,
    AccessPoint,
    StationAndAccessPoint,
}

/// Physical-layer mode negotiated with the access point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum PhyMode {
    /// 802.11b.
    Legacy11b,
    /// 802.11g.
    Legacy11g,
    /// High throughput (802.11n).
    Ht,
    /// Very high throughput (802.11ac).
    Vht,
    /// High efficiency (802.11ax).
    He,
    /// Vendor long-range mode.
    LongRange,
}

/// Channel bandwidth of the association.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum ChannelWidth {
    Mhz20,
    Mhz40,
}

/// Record describing the access point the station is associated with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApRecord {
    /// Signal strength in dBm.
    pub rssi: i8,
    pub primary_channel: u8,
    pub width: ChannelWidth,
}

/// Sensor measurement range handed to [`TemperatureSensor::configure`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemperatureRange {
    pub min_c: i32,
    pub max_c: i32,
}

/// Task-scheduler statistics.
pub trait SchedulerStats: Send + Sync {
    /// Enumerates tasks with their cumulative run time and the total.
    ///
    /// Counters must be monotonic `u64` values. A platform with narrower
    /// counters (e.g. 32-bit run-time ticks) must widen them across wraps
    /// before reporting: a total that goes backwards is treated as a counter
    /// reset and the sample reports 0 %.
    ///
    /// Returns [`ProviderError::NoMemory`] if scratch space for the task
    /// list cannot be acquired.
    fn snapshot(&self) -> Result<SchedulerSnapshot, ProviderError>;
}

/// Wireless radio status.
pub trait WifiRadio: Send + Sync {
    fn mode(&self) -> Result<WifiMode, ProviderError>;

    /// Returns [`ProviderError::NotConnected`] when the station is not
    /// associated.
    fn ap_record(&self) -> Result<ApRecord, ProviderError>;

    fn negotiated_phy_mode(&self) -> Result<PhyMode, ProviderError>;
}

/// Optional internal temperature sensor.
pub trait TemperatureSensor: Send + Sync {
    fn configure(&self, range: TemperatureRange) -> Result<(), ProviderError>;
    fn start(&self) -> Result<(), ProviderError>;
    fn stop(&self) -> Result<(), ProviderError>;
    /// Synchronous read in degrees Celsius.
    fn read_celsius(&self) -> Result<f32, ProviderError>;
}

/// Hardware reset-cause register, read once at boot.
pub trait ResetCauseReader: Send + Sync {
    fn reset_code(&self) -> u32;
}

/// Monotonic clock.
pub trait Clock: Send + Sync {
    /// Elapsed time since boot.
    fn since_boot(&self) -> Duration;
}

impl<T: SchedulerStats + ?Sized> SchedulerStats for Arc<T> {
    fn snapshot(&self) -> Result<SchedulerSnapshot, ProviderError> {
        (**self).snapshot()
    }
}

impl<T: WifiRadio + ?Sized> WifiRadio for Arc<T> {
    fn mode(&self) -> Result<WifiMode, ProviderError> {
        (**self).mode()
    }

    fn ap_record(&self) -> Result<ApRecord, ProviderError> {
        (**self).ap_record()
    }

    fn negotiated_phy_mode(&self) -> Result<PhyMode, ProviderError> {
        (**self).negotiated_phy_mode()
    }
}

impl<T: TemperatureSensor + ?Sized> TemperatureSensor for Arc<T> {
    fn configure(&self, range: TemperatureRange) -> Result<(), ProviderError> {
        (**self).configure(range)
    }

    fn start(&self) -> Result<(), ProviderError> {
        (**self).start()
    }

    fn stop(&self) -> Result<(), ProviderError> {
        (**self).stop()
    }

    fn read_celsius(&self) -> Result<f32, ProviderError> {
        (**self).read_celsius()
    }
}

impl<T: ResetCauseReader + ?Sized> ResetCauseReader for Arc<T> {
    fn reset_code(&self) -> u32 {
        (**self).reset_code()
    }
}

impl<T: Clock + ?Sized> Clock for Arc<T> {
    fn since_boot(&self) -> Duration {
        (**self).since_boot()
    }
}

/// The full set of capability providers consumed by
/// [`DeviceMetrics`](crate::DeviceMetrics).
pub struct Providers {
    pub scheduler: Box<dyn SchedulerStats>,
    pub radio: Box<dyn WifiRadio>,
    pub temperature: Box<dyn TemperatureSensor>,
    pub reset_cause: Box<dyn ResetCauseReader>,
    pub clock: Box<dyn Clock>,
}

impl std::fmt::Debug for Providers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Providers").finish_non_exhaustive()
    }
}
