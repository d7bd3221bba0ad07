// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `devmon status` command: full device health report.
//!
//! Takes two CPU samples a short interval apart so the report shows real
//! utilisation rather than the 0 % baseline.

use device_metrics::{version, DeviceMetrics, DeviceSnapshot};
use std::time::Duration;

const CPU_SETTLE: Duration = Duration::from_millis(250);

pub async fn execute(metrics: &DeviceMetrics, json: bool) -> anyhow::Result<()> {
    metrics.cpu_usage()?;
    tokio::time::sleep(CPU_SETTLE).await;
    let snapshot = DeviceSnapshot::capture(metrics)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    println!("╔══════════════════════════════════════════════════════╗");
    println!("║            devmon · Device Health Status             ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();

    // ── System ─────────────────────────────────────────────────
    println!("  System");
    println!("   Library:      device-metrics {}", version());
    println!("   Uptime:       {}", format_uptime(snapshot.uptime_ms));
    println!("   Last reset:   {}", snapshot.reboot_reason);
    println!("   Brownouts:    {}", snapshot.brownout_count);
    println!("   Errors:       {}", snapshot.error_count);
    println!("   Log level:    {}", snapshot.log_level);
    println!();

    // ── CPU ────────────────────────────────────────────────────
    println!("  CPU");
    match snapshot.cpu_usage_percent {
        Some(usage) => println!("   Usage:        {usage:.1}%  {}", usage_bar(usage / 100.0)),
        None => println!("   Usage:        n/a"),
    }
    println!();

    // ── Thermal ────────────────────────────────────────────────
    println!("  Thermal");
    match snapshot.temperature_celsius {
        Some(c) if snapshot.temperature_stale => {
            println!("   Temperature:  {c:.1} C  (stale, last good reading)")
        }
        Some(c) => println!("   Temperature:  {c:.1} C"),
        None => println!("   Temperature:  not available"),
    }
    println!();

    // ── Wi-Fi ──────────────────────────────────────────────────
    println!("  Wi-Fi");
    println!("   Status:       {}", snapshot.wifi_status);
    if let Some(rssi) = snapshot.wifi_rssi_dbm {
        println!("   Signal:       {rssi} dBm");
    }
    if let Some(rate) = snapshot.wifi_data_rate_mbps {
        println!("   Est. rate:    {rate:.1} Mbps");
    }
    println!();

    println!("  Assessment");
    if snapshot.is_degraded() {
        println!("   Status:       DEGRADED");
    } else {
        println!("   Status:       Device healthy");
    }
    println!();
    println!("{}", snapshot.summary());

    Ok(())
}

fn format_uptime(ms: u64) -> String {
    let secs = ms / 1000;
    format!(
        "{}d {:02}h {:02}m {:02}s",
        secs / 86_400,
        (secs / 3600) % 24,
        (secs / 60) % 60,
        secs % 60
    )
}

/// Creates a visual usage bar (0.0-1.0 scale).
fn usage_bar(ratio: f32) -> String {
    let filled = ((ratio * 20.0).round() as usize).min(20);
    let symbol = if ratio >= 0.9 {
        "#"
    } else if ratio >= 0.7 {
        "="
    } else {
        "-"
    };
    format!("[{}{}]", symbol.repeat(filled), ".".repeat(20 - filled))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_uptime() {
        assert_eq!(format_uptime(0), "0d 00h 00m 00s");
        assert_eq!(format_uptime(90_061_000), "1d 01h 01m 01s");
    }

    #[test]
    fn test_usage_bar() {
        assert_eq!(usage_bar(0.0), format!("[{}]", ".".repeat(20)));
        assert_eq!(usage_bar(1.0), format!("[{}]", "#".repeat(20)));
        assert!(usage_bar(0.75).starts_with("[="));
    }
}
