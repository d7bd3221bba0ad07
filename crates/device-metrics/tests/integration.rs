// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Integration tests: the facade end-to-end over scripted providers.
//!
//! These mirror how the application and the on-device diagnostic harness use
//! the facade: init once, read every metric, check result codes and value
//! ranges, deinit.

use device_metrics::fake::{
    FakeRadio, FakeScheduler, FakeTemperatureSensor, FixedResetCause, ManualClock,
};
use device_metrics::provider::{ChannelWidth, PhyMode, Providers};
use device_metrics::{
    DeviceMetrics, ErrorKind, MetricType, MetricValue, MetricsConfig, ProviderError, ResetCause,
    WifiStatus,
};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

// ── Helpers ────────────────────────────────────────────────────

/// Shared handles on the fakes behind a facade.
struct Rig {
    scheduler: Arc<FakeScheduler>,
    radio: Arc<FakeRadio>,
    sensor: Arc<FakeTemperatureSensor>,
    clock: Arc<ManualClock>,
    metrics: DeviceMetrics,
}

fn rig(
    scheduler: FakeScheduler,
    radio: FakeRadio,
    sensor: FakeTemperatureSensor,
    reset_code: u32,
) -> Rig {
    let scheduler = Arc::new(scheduler);
    let radio = Arc::new(radio);
    let sensor = Arc::new(sensor);
    let clock = Arc::new(ManualClock::at(Duration::from_millis(2_500)));
    let providers = Providers {
        scheduler: Box::new(scheduler.clone()),
        radio: Box::new(radio.clone()),
        temperature: Box::new(sensor.clone()),
        reset_cause: Box::new(FixedResetCause(reset_code)),
        clock: Box::new(clock.clone()),
    };
    let metrics = DeviceMetrics::new(MetricsConfig::default(), providers).unwrap();
    Rig {
        scheduler,
        radio,
        sensor,
        clock,
        metrics,
    }
}

fn quiet_rig() -> Rig {
    rig(
        FakeScheduler::steady_load(20.0),
        FakeRadio::off(),
        FakeTemperatureSensor::absent(),
        1,
    )
}

// ── Lifecycle ──────────────────────────────────────────────────

#[test]
fn test_every_metric_before_init_is_invalid_state() {
    let r = quiet_rig();
    for metric in MetricType::ALL {
        let err = r.metrics.get_metric(metric).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState, "{metric}");
    }
    assert_eq!(r.scheduler.calls(), 0);
    assert_eq!(r.radio.total_calls(), 0);
}

#[test]
fn test_error_count_scenario() {
    let r = quiet_rig();
    let m = &r.metrics;

    m.init().unwrap();
    assert_eq!(m.error_count().unwrap(), 0);
    for _ in 0..3 {
        m.increment_error_count().unwrap();
    }
    assert_eq!(m.error_count().unwrap(), 3);

    m.deinit().unwrap();
    m.init().unwrap();
    assert_eq!(m.error_count().unwrap(), 0);
}

#[test]
fn test_init_is_idempotent() {
    let r = rig(
        FakeScheduler::steady_load(20.0),
        FakeRadio::off(),
        FakeTemperatureSensor::absent(),
        8,
    );
    let m = &r.metrics;
    m.init().unwrap();
    m.increment_error_count().unwrap();
    m.increment_error_count().unwrap();
    m.init().unwrap();
    assert_eq!(m.error_count().unwrap(), 2);
    assert_eq!(m.brownout_count().unwrap(), 1);
}

#[test]
fn test_reinit_resets_brownout_to_boot_value() {
    let r = rig(
        FakeScheduler::steady_load(20.0),
        FakeRadio::off(),
        FakeTemperatureSensor::absent(),
        8,
    );
    r.metrics.init().unwrap();
    r.metrics.deinit().unwrap();
    r.metrics.init().unwrap();
    // The reset cause is still a brownout, so the fresh session counts it.
    assert_eq!(r.metrics.brownout_count().unwrap(), 1);
    assert_eq!(r.metrics.error_count().unwrap(), 0);
}

#[test]
fn test_increment_n_times() {
    let r = quiet_rig();
    r.metrics.init().unwrap();
    for _ in 0..250 {
        r.metrics.increment_error_count().unwrap();
    }
    assert_eq!(r.metrics.error_count().unwrap(), 250);
}

// ── CPU ────────────────────────────────────────────────────────

#[test]
fn test_cpu_first_sample_zero_then_delta() {
    let r = rig(
        FakeScheduler::from_samples(vec![(5_000, 4_000), (6_000, 4_800), (6_000, 4_800)]),
        FakeRadio::off(),
        FakeTemperatureSensor::absent(),
        1,
    );
    r.metrics.init().unwrap();
    assert_eq!(r.metrics.cpu_usage().unwrap(), 0.0);
    assert!((r.metrics.cpu_usage().unwrap() - 20.0).abs() < 0.001);
    // No time elapsed.
    assert_eq!(r.metrics.cpu_usage().unwrap(), 0.0);
}

#[test]
fn test_cpu_baseline_reset_by_reinit() {
    let r = rig(
        FakeScheduler::steady_load(60.0),
        FakeRadio::off(),
        FakeTemperatureSensor::absent(),
        1,
    );
    r.metrics.init().unwrap();
    r.metrics.cpu_usage().unwrap();
    assert!((r.metrics.cpu_usage().unwrap() - 60.0).abs() < 0.01);

    r.metrics.deinit().unwrap();
    r.metrics.init().unwrap();
    assert_eq!(r.metrics.cpu_usage().unwrap(), 0.0);
}

#[test]
fn test_cpu_no_memory_propagates() {
    let r = quiet_rig();
    r.metrics.init().unwrap();
    r.scheduler.fail_next_with_no_memory();
    let err = r.metrics.cpu_usage().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NoMemory);
}

#[test]
fn test_concurrent_cpu_usage_stays_in_range() {
    let r = rig(
        FakeScheduler::steady_load(45.0),
        FakeRadio::off(),
        FakeTemperatureSensor::absent(),
        1,
    );
    r.metrics.init().unwrap();
    let metrics = Arc::new(r.metrics);

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let m = Arc::clone(&metrics);
            thread::spawn(move || {
                (0..50)
                    .map(|_| m.cpu_usage().unwrap())
                    .collect::<Vec<f32>>()
            })
        })
        .collect();

    let mut samples = Vec::new();
    for h in handles {
        samples.extend(h.join().unwrap());
    }
    assert_eq!(samples.len(), 200);
    assert_eq!(r.scheduler.calls(), 200);
    // Exactly one call saw no baseline; every other call saw a clean delta.
    assert_eq!(samples.iter().filter(|u| **u == 0.0).count(), 1);
    assert!(samples
        .iter()
        .all(|u| *u == 0.0 || (u - 45.0).abs() < 0.01));
}

// ── Temperature ────────────────────────────────────────────────

#[test]
fn test_temperature_not_supported_is_nan() {
    let r = quiet_rig();
    r.metrics.init().unwrap();

    let reading = r.metrics.temperature_reading().unwrap();
    assert!(reading.value().is_nan());
    assert_eq!(reading.error().map(|e| e.kind()), Some(ErrorKind::NotSupported));
    assert_eq!(
        r.metrics.temperature().unwrap_err().kind(),
        ErrorKind::NotSupported
    );
    assert_eq!(r.sensor.read_calls(), 0);
}

#[test]
fn test_temperature_stale_fallback() {
    let r = rig(
        FakeScheduler::steady_load(20.0),
        FakeRadio::off(),
        FakeTemperatureSensor::with_readings(vec![Ok(38.0)]),
        1,
    );
    r.metrics.init().unwrap();
    assert!(r.sensor.is_running());

    r.sensor.push_reading(Ok(39.5));
    assert_eq!(r.metrics.temperature().unwrap(), 39.5);

    r.sensor
        .push_reading(Err(ProviderError::Hardware("sensor timeout".into())));
    let reading = r.metrics.temperature_reading().unwrap();
    assert_eq!(*reading.value(), 39.5);
    assert!(matches!(
        reading.error().and_then(|e| e.provider_error()),
        Some(ProviderError::Hardware(_))
    ));
}

#[test]
fn test_temperature_never_read_falls_back_to_nan() {
    let r = rig(
        FakeScheduler::steady_load(20.0),
        FakeRadio::off(),
        FakeTemperatureSensor::with_readings(vec![
            Err(ProviderError::Hardware("warming up".into())),
            Err(ProviderError::Hardware("warming up".into())),
        ]),
        1,
    );
    r.metrics.init().unwrap();
    let reading = r.metrics.temperature_reading().unwrap();
    assert!(reading.value().is_nan());
    assert_eq!(reading.error().map(|e| e.kind()), Some(ErrorKind::Provider));
}

#[test]
fn test_sensor_start_failure_is_non_fatal() {
    let r = rig(
        FakeScheduler::steady_load(20.0),
        FakeRadio::off(),
        FakeTemperatureSensor::steady(30.0).with_start_failure(|| ProviderError::NotStarted),
        1,
    );
    r.metrics.init().unwrap();
    assert_eq!(
        r.metrics.temperature().unwrap_err().kind(),
        ErrorKind::NotSupported
    );
}

#[test]
fn test_deinit_stops_sensor() {
    let r = rig(
        FakeScheduler::steady_load(20.0),
        FakeRadio::off(),
        FakeTemperatureSensor::steady(30.0),
        1,
    );
    r.metrics.init().unwrap();
    assert!(r.sensor.is_running());
    r.metrics.deinit().unwrap();
    assert!(!r.sensor.is_running());
}

#[test]
fn test_drop_stops_sensor() {
    let r = rig(
        FakeScheduler::steady_load(20.0),
        FakeRadio::off(),
        FakeTemperatureSensor::steady(30.0),
        1,
    );
    let sensor = Arc::clone(&r.sensor);
    r.metrics.init().unwrap();
    drop(r);
    assert!(!sensor.is_running());
}

// ── Wireless ───────────────────────────────────────────────────

#[test]
fn test_no_link_scenario() {
    let r = quiet_rig();
    r.metrics.init().unwrap();

    assert_eq!(r.metrics.wifi_status().unwrap(), WifiStatus::Disconnected);

    let signal = r.metrics.wifi_signal_reading().unwrap();
    assert_eq!(*signal.value(), 0);
    assert!(signal.is_degraded());
    assert!(r.metrics.wifi_signal().is_err());

    let rate = r.metrics.wifi_data_rate_reading().unwrap();
    assert_eq!(*rate.value(), 0.0);
    assert!(rate.is_degraded());
    assert!(r.metrics.wifi_data_rate().is_err());
}

#[test]
fn test_connected_link() {
    let r = rig(
        FakeScheduler::steady_load(20.0),
        FakeRadio::connected(-58, PhyMode::Vht, ChannelWidth::Mhz40),
        FakeTemperatureSensor::absent(),
        1,
    );
    r.metrics.init().unwrap();
    assert_eq!(r.metrics.wifi_status().unwrap(), WifiStatus::Connected);
    assert_eq!(r.metrics.wifi_signal().unwrap(), -58);
    assert_eq!(r.metrics.wifi_data_rate().unwrap(), 200.0);
}

#[test]
fn test_long_range_link_with_weak_signal() {
    let r = rig(
        FakeScheduler::steady_load(20.0),
        FakeRadio::connected(-110, PhyMode::LongRange, ChannelWidth::Mhz20),
        FakeTemperatureSensor::absent(),
        1,
    );
    r.metrics.init().unwrap();
    // Nominal 0.5 Mbps, derated to the 50 % floor.
    assert_eq!(r.metrics.wifi_data_rate().unwrap(), 0.25);
}

// ── Reset cause, uptime, dispatch ──────────────────────────────

#[test]
fn test_unknown_reset_code() {
    let r = rig(
        FakeScheduler::steady_load(20.0),
        FakeRadio::off(),
        FakeTemperatureSensor::absent(),
        77,
    );
    r.metrics.init().unwrap();
    let reason = r.metrics.reboot_reason().unwrap();
    assert_eq!(reason.code, 77);
    assert_eq!(reason.label, "Unknown reason");
    assert_eq!(reason.cause, ResetCause::Unrecognized(77));
    assert_eq!(r.metrics.brownout_count().unwrap(), 0);
}

#[test]
fn test_uptime_follows_clock() {
    let r = quiet_rig();
    r.metrics.init().unwrap();
    assert_eq!(r.metrics.uptime_ms().unwrap(), 2_500);
    r.clock.advance(Duration::from_millis(1_000));
    assert_eq!(r.metrics.uptime_ms().unwrap(), 3_500);
    assert_eq!(r.metrics.last_uptime_ms().unwrap(), 3_500);
}

#[test]
fn test_get_metric_out_of_range_touches_nothing() {
    let r = quiet_rig();
    r.metrics.init().unwrap();
    let err = r.metrics.get_metric_by_code(99).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert_eq!(r.scheduler.calls(), 0);
    assert_eq!(r.radio.total_calls(), 0);
    assert_eq!(r.sensor.read_calls(), 0);
}

#[test]
fn test_get_metric_bad_code_before_init() {
    let r = quiet_rig();
    let err = r.metrics.get_metric_by_code(99).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);
    assert_eq!(r.scheduler.calls(), 0);
    assert_eq!(r.radio.total_calls(), 0);
    assert_eq!(r.sensor.read_calls(), 0);
}

#[test]
fn test_get_metric_routes_every_type() {
    let r = rig(
        FakeScheduler::steady_load(20.0),
        FakeRadio::connected(-70, PhyMode::Ht, ChannelWidth::Mhz20),
        FakeTemperatureSensor::steady(36.6),
        3,
    );
    r.metrics.init().unwrap();
    for metric in MetricType::ALL {
        let value = r.metrics.get_metric(metric).unwrap();
        assert_eq!(value.metric_type(), metric);
    }

    assert_eq!(
        r.metrics.get_metric_by_code(9).unwrap(),
        MetricValue::ErrorCount(0)
    );
    assert_eq!(
        r.metrics.get_metric(MetricType::WifiDataRate).unwrap(),
        MetricValue::WifiDataRate(72.0)
    );
    match r.metrics.get_metric(MetricType::RebootReason).unwrap() {
        MetricValue::RebootReason(reason) => assert_eq!(reason.label, "Software reset"),
        other => panic!("unexpected value {other:?}"),
    }
}

#[test]
fn test_read_metric_keeps_fallback() {
    let r = quiet_rig();
    r.metrics.init().unwrap();
    let reading = r.metrics.read_metric(MetricType::WifiSignal).unwrap();
    assert_eq!(*reading.value(), MetricValue::WifiSignal(0));
    assert!(reading.is_degraded());
}
