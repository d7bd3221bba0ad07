// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `devmon watch` command: periodic CPU and temperature samples.

use device_metrics::DeviceMetrics;
use std::time::Duration;

pub async fn execute(metrics: &DeviceMetrics, interval_ms: u64, count: u64) -> anyhow::Result<()> {
    anyhow::ensure!(interval_ms > 0, "--interval-ms must be greater than 0");

    let mut ticker = tokio::time::interval(Duration::from_millis(interval_ms));

    // The first sample only sets the CPU baseline. The first tick completes
    // immediately, so consume it to keep a full interval before sample 1.
    metrics.cpu_usage()?;
    ticker.tick().await;

    println!("{:>6}  {:>10}  {:>8}  {:>10}", "sample", "uptime(s)", "cpu", "temp");
    let mut sample = 0u64;
    while count == 0 || sample < count {
        ticker.tick().await;
        sample += 1;

        let cpu = match metrics.cpu_usage() {
            Ok(usage) => format!("{usage:.1}%"),
            Err(e) => {
                tracing::warn!("cpu sample failed: {e}");
                "n/a".to_string()
            }
        };
        let (temp, temp_err) = metrics.temperature_reading()?.into_parts();
        let temp = match (temp.is_nan(), temp_err.is_some()) {
            (true, _) => "n/a".to_string(),
            (false, true) => format!("{temp:.1}C*"),
            (false, false) => format!("{temp:.1}C"),
        };
        let uptime = metrics.uptime_ms()? as f64 / 1000.0;

        println!("{sample:>6}  {uptime:>10.1}  {cpu:>8}  {temp:>10}");
    }

    Ok(())
}
