// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Capability providers backed by a Linux host.
//!
//! Lets the facade run on a development machine or a Linux-class edge board:
//! - `/proc/stat`: aggregate CPU jiffies. Idle and iowait time are reported
//!   as the idle task, everything else as one busy task.
//! - `/sys/class/thermal/thermal_zone0/temp`: SoC temperature in
//!   millidegrees Celsius.
//! - `/proc/uptime`: time since boot, falling back to process uptime.
//!
//! A host has no station radio or reset-cause register: the radio reports
//! `Off` and every start counts as a power-on reset.

use crate::provider::{
    ApRecord, Clock, PhyMode, Providers, ResetCauseReader, SchedulerSnapshot, SchedulerStats,
    TaskRunTime, TemperatureRange, TemperatureSensor, WifiMode, WifiRadio,
};
use crate::{MetricsConfig, ProviderError};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

const PROC_STAT_PATH: &str = "/proc/stat";
const PROC_UPTIME_PATH: &str = "/proc/uptime";

/// Reset code reported by [`PowerOnReset`].
const POWER_ON_CODE: u32 = 1;

impl Providers {
    /// Providers for the current Linux host.
    pub fn host(config: &MetricsConfig) -> Self {
        Self {
            scheduler: Box::new(ProcStatScheduler::new(&config.idle_task_name)),
            radio: Box::new(NoRadio),
            temperature: Box::new(SysfsThermalSensor::new(&config.thermal_zone_path)),
            reset_cause: Box::new(PowerOnReset),
            clock: Box::new(HostClock::new()),
        }
    }
}

// ── Scheduler ──────────────────────────────────────────────────

/// Scheduler statistics derived from the aggregate `cpu` line of `/proc/stat`.
#[derive(Debug, Clone)]
pub struct ProcStatScheduler {
    path: PathBuf,
    idle_task_name: String,
}

impl ProcStatScheduler {
    pub fn new(idle_task_name: &str) -> Self {
        Self::with_path(PROC_STAT_PATH, idle_task_name)
    }

    pub fn with_path(path: impl Into<PathBuf>, idle_task_name: &str) -> Self {
        Self {
            path: path.into(),
            idle_task_name: idle_task_name.to_string(),
        }
    }
}

impl SchedulerStats for ProcStatScheduler {
    fn snapshot(&self) -> Result<SchedulerSnapshot, ProviderError> {
        let content = read_sysfs_file(&self.path)?;
        let (total, idle) = parse_proc_stat(&content, &self.path)?;

        let mut tasks = Vec::new();
        tasks.try_reserve_exact(2).map_err(|e| {
            ProviderError::NoMemory(format!("task list for {}: {e}", self.path.display()))
        })?;
        tasks.push(TaskRunTime::new(self.idle_task_name.clone(), idle));
        tasks.push(TaskRunTime::new("busy", total.saturating_sub(idle)));

        Ok(SchedulerSnapshot {
            tasks,
            total_run_time: total,
        })
    }
}

/// Parses the aggregate `cpu` line into `(total, idle)` jiffies.
///
/// Format: `cpu  user nice system idle iowait irq softirq steal guest guest_nice`.
/// Guest time is already included in `user`/`nice` and is skipped.
fn parse_proc_stat(content: &str, source_path: &Path) -> Result<(u64, u64), ProviderError> {
    let line = content
        .lines()
        .find(|l| l.split_whitespace().next() == Some("cpu"))
        .ok_or_else(|| ProviderError::Parse {
            path: source_path.display().to_string(),
            detail: "aggregate 'cpu' line not found".to_string(),
        })?;

    let fields = line
        .split_whitespace()
        .skip(1)
        .take(8)
        .map(|s| {
            s.parse::<u64>().map_err(|_| ProviderError::Parse {
                path: source_path.display().to_string(),
                detail: format!("expected integer jiffies, got '{s}'"),
            })
        })
        .collect::<Result<Vec<u64>, _>>()?;

    if fields.len() < 4 {
        return Err(ProviderError::Parse {
            path: source_path.display().to_string(),
            detail: format!("expected at least 4 cpu fields, got {}", fields.len()),
        });
    }

    let total: u64 = fields.iter().sum();
    let idle = fields[3] + fields.get(4).copied().unwrap_or(0);
    Ok((total, idle))
}

// ── Temperature ────────────────────────────────────────────────

/// Temperature sensor backed by a thermal zone file.
#[derive(Debug)]
pub struct SysfsThermalSensor {
    path: PathBuf,
    range: Mutex<Option<TemperatureRange>>,
    running: AtomicBool,
}

impl SysfsThermalSensor {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            range: Mutex::new(None),
            running: AtomicBool::new(false),
        }
    }
}

impl TemperatureSensor for SysfsThermalSensor {
    fn configure(&self, range: TemperatureRange) -> Result<(), ProviderError> {
        if !self.path.exists() {
            return Err(ProviderError::NotSupported(format!(
                "thermal zone {} not found",
                self.path.display()
            )));
        }
        *self.range.lock().unwrap_or_else(PoisonError::into_inner) = Some(range);
        Ok(())
    }

    fn start(&self) -> Result<(), ProviderError> {
        self.running.store(true, Ordering::Release);
        Ok(())
    }

    fn stop(&self) -> Result<(), ProviderError> {
        self.running.store(false, Ordering::Release);
        Ok(())
    }

    fn read_celsius(&self) -> Result<f32, ProviderError> {
        if !self.running.load(Ordering::Acquire) {
            return Err(ProviderError::NotStarted);
        }
        let celsius = read_millidegrees(&self.path)?;

        let range = *self.range.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(r) = range {
            if celsius < r.min_c as f32 || celsius > r.max_c as f32 {
                tracing::debug!(
                    "temperature {celsius:.1} °C outside configured range [{}, {}]",
                    r.min_c,
                    r.max_c
                );
            }
        }
        Ok(celsius)
    }
}

/// Reads a thermal zone file. The kernel reports millidegrees Celsius
/// (e.g., `54321` means 54.321 °C).
fn read_millidegrees(path: &Path) -> Result<f32, ProviderError> {
    let content = read_sysfs_file(path)?;
    let millidegrees: i64 = content.parse::<i64>().map_err(|_| ProviderError::Parse {
        path: path.display().to_string(),
        detail: format!("expected integer millidegrees, got '{content}'"),
    })?;
    Ok(millidegrees as f32 / 1000.0)
}

// ── Clock, radio, reset cause ──────────────────────────────────

/// Time since boot from `/proc/uptime`, or since process start where that
/// file is unavailable.
#[derive(Debug, Clone)]
pub struct HostClock {
    started: Instant,
    path: PathBuf,
}

impl HostClock {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            path: PathBuf::from(PROC_UPTIME_PATH),
        }
    }
}

impl Default for HostClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for HostClock {
    fn since_boot(&self) -> Duration {
        read_sysfs_file(&self.path)
            .ok()
            .and_then(|content| parse_uptime(&content))
            .unwrap_or_else(|| self.started.elapsed())
    }
}

/// Parses the first field of `/proc/uptime` (`"12345.67 45678.90"`).
fn parse_uptime(content: &str) -> Option<Duration> {
    let secs: f64 = content.split_whitespace().next()?.parse().ok()?;
    if secs.is_finite() && secs >= 0.0 {
        Some(Duration::from_secs_f64(secs))
    } else {
        None
    }
}

/// Radio stand-in for hosts without a station interface.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRadio;

impl WifiRadio for NoRadio {
    fn mode(&self) -> Result<WifiMode, ProviderError> {
        Ok(WifiMode::Off)
    }

    fn ap_record(&self) -> Result<ApRecord, ProviderError> {
        Err(ProviderError::NotConnected)
    }

    fn negotiated_phy_mode(&self) -> Result<PhyMode, ProviderError> {
        Err(ProviderError::NotConnected)
    }
}

/// Reset-cause reader for hosts: every start is a power-on.
#[derive(Debug, Clone, Copy, Default)]
pub struct PowerOnReset;

impl ResetCauseReader for PowerOnReset {
    fn reset_code(&self) -> u32 {
        POWER_ON_CODE
    }
}

/// Reads a sysfs/procfs file and returns its trimmed content.
fn read_sysfs_file(path: &Path) -> Result<String, ProviderError> {
    if !path.exists() {
        return Err(ProviderError::NotSupported(format!(
            "{} not found",
            path.display()
        )));
    }
    std::fs::read_to_string(path)
        .map(|s| s.trim().to_string())
        .map_err(|e| ProviderError::Io {
            path: path.display().to_string(),
            source: e,
        })
}
