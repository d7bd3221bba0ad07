// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `devmon selftest` command: on-device diagnostic checks.
//!
//! Exercises every operation of the facade against whatever providers are
//! live and reports pass/fail totals. Exits with an error if any check
//! fails.

use device_metrics::{version, DeviceMetrics, ErrorKind, MetricType, MetricsError, WifiStatus};
use std::time::Duration;

/// Pass/fail bookkeeping for one selftest run.
#[derive(Debug, Default)]
struct Harness {
    passed: u32,
    failed: u32,
}

impl Harness {
    fn check(&mut self, condition: bool, message: &str) {
        if condition {
            self.passed += 1;
            println!("   [PASS] {message}");
        } else {
            self.failed += 1;
            println!("   [FAIL] {message}");
        }
    }

    fn section(&self, name: &str) {
        println!();
        println!("  {name}");
    }
}

fn is_kind<T>(result: &Result<T, MetricsError>, kind: ErrorKind) -> bool {
    matches!(result, Err(e) if e.kind() == kind)
}

pub async fn execute(metrics: &DeviceMetrics) -> anyhow::Result<()> {
    println!("devmon selftest · device-metrics {}", version());
    let mut h = Harness::default();

    h.section("Initialization & deinitialization");
    h.check(metrics.deinit().is_ok(), "deinit succeeds");
    h.check(
        is_kind(&metrics.error_count(), ErrorKind::InvalidState),
        "getters report InvalidState after deinit",
    );
    h.check(metrics.init().is_ok(), "init succeeds");
    h.check(metrics.init().is_ok(), "init is idempotent");

    h.section("Version");
    h.check(!version().is_empty(), "version string is not empty");

    h.section("CPU usage");
    let usage = metrics.cpu_usage();
    h.check(usage.is_ok(), "cpu_usage succeeds");
    if let Ok(u) = usage {
        h.check((0.0..=100.0).contains(&u), &format!("usage {u:.1}% is within 0-100"));
    }

    h.section("Uptime");
    let first = metrics.uptime_ms();
    h.check(first.is_ok(), "uptime_ms succeeds");
    h.check(matches!(first, Ok(ms) if ms > 0), "uptime is greater than 0");
    tokio::time::sleep(Duration::from_millis(100)).await;
    let second = metrics.uptime_ms();
    h.check(second.is_ok(), "second uptime_ms succeeds");
    if let (Ok(a), Ok(b)) = (first, second) {
        h.check(b > a, "uptime increases over time");
    }

    h.section("Wi-Fi");
    let status = metrics.wifi_status();
    h.check(status.is_ok(), "wifi_status succeeds");
    if let Ok(status) = status {
        println!("   status: {status}");
        if status == WifiStatus::Connected {
            let rssi = metrics.wifi_signal();
            h.check(matches!(rssi, Ok(r) if r < 0), "RSSI is negative when connected");
            let rate = metrics.wifi_data_rate();
            h.check(matches!(rate, Ok(r) if r >= 0.0), "data rate is non-negative");
        } else {
            println!("   not connected, skipping signal checks");
        }
    }

    h.section("Temperature");
    let range = metrics.config().temperature.range();
    match metrics.temperature() {
        Ok(c) => {
            h.check(!c.is_nan(), "temperature is not NaN");
            h.check(
                c >= range.min_c as f32 && c <= range.max_c as f32,
                &format!("{c:.1} C is within {}..{} C", range.min_c, range.max_c),
            );
        }
        Err(MetricsError::NotSupported { .. }) => {
            println!("   sensor not supported on this device, skipping");
        }
        Err(e) => h.check(false, &format!("unexpected temperature error: {e}")),
    }

    h.section("Reboot reason");
    let reason = metrics.reboot_reason();
    h.check(reason.is_ok(), "reboot_reason succeeds");
    if let Ok(reason) = reason {
        h.check(!reason.label.is_empty(), &format!("label is set: {reason}"));
    }

    h.section("Brownout & error counts");
    h.check(metrics.brownout_count().is_ok(), "brownout_count succeeds");
    let before = metrics.error_count();
    h.check(before.is_ok(), "error_count succeeds");
    h.check(
        metrics.increment_error_count().is_ok(),
        "increment_error_count succeeds",
    );
    if let (Ok(before), Ok(after)) = (before, metrics.error_count()) {
        h.check(after == before.wrapping_add(1), "error count increased by one");
    }

    h.section("Log level");
    let level = metrics.log_level();
    h.check(level.is_ok(), "log_level succeeds");
    if let Ok(level) = level {
        println!("   level: {level}");
    }

    h.section("Generic dispatch");
    h.check(
        metrics.get_metric(MetricType::CpuUsage).is_ok(),
        "get_metric(cpu-usage) succeeds",
    );
    h.check(
        metrics.get_metric(MetricType::Uptime).is_ok(),
        "get_metric(uptime) succeeds",
    );
    h.check(
        is_kind(&metrics.get_metric_by_code(99), ErrorKind::InvalidArgument),
        "unknown metric code is rejected with InvalidArgument",
    );

    println!();
    println!("  Results: {} passed, {} failed", h.passed, h.failed);
    if h.failed > 0 {
        anyhow::bail!("{} selftest check(s) failed", h.failed);
    }
    println!("  All checks passed");
    Ok(())
}
