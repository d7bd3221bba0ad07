// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `devmon get` command: read one metric through the typed dispatcher.

use device_metrics::{DeviceMetrics, MetricType};

pub async fn execute(metrics: &DeviceMetrics, metric: &str) -> anyhow::Result<()> {
    let metric = match metric.parse::<u32>() {
        Ok(code) => MetricType::try_from(code)?,
        Err(_) => metric.parse::<MetricType>()?,
    };

    let reading = metrics.read_metric(metric)?;
    match reading.error() {
        Some(e) => println!("{metric}: {} (degraded: {e})", reading.value()),
        None => println!("{metric}: {}", reading.value()),
    }
    Ok(())
}
