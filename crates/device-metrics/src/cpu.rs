// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Delta-based CPU utilisation estimation.
//!
//! The scheduler exposes cumulative run-time counters only, so utilisation is
//! derived from two consecutive samples:
//!
//! ```text
//! usage = 100 - (idle_delta * 100 / total_delta)
//! ```
//!
//! The first sample after a reset only establishes the baseline and reports
//! 0 %.

use crate::provider::SchedulerSnapshot;

/// Previous-sample bookkeeping for the utilisation estimate.
///
/// A `previous_total` of 0 means "no prior sample".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CpuSampler {
    previous_total: u64,
    previous_idle: u64,
}

impl CpuSampler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forgets the previous sample.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Returns `true` once a baseline sample has been stored.
    pub fn has_baseline(&self) -> bool {
        self.previous_total != 0
    }

    /// Feeds a new `(total, idle)` sample and returns the utilisation in
    /// `[0.0, 100.0]` since the previous one.
    ///
    /// The stored sample is always replaced, whichever branch is taken.
    pub fn update(&mut self, total: u64, idle: u64) -> f32 {
        let usage = if self.has_baseline() {
            match total.checked_sub(self.previous_total) {
                Some(total_delta) if total_delta > 0 => {
                    let idle_delta = idle.saturating_sub(self.previous_idle);
                    let idle_pct = idle_delta as f64 * 100.0 / total_delta as f64;
                    (100.0 - idle_pct).clamp(0.0, 100.0) as f32
                }
                // No time elapsed, or the counter went backwards.
                _ => 0.0,
            }
        } else {
            0.0
        };

        self.previous_total = total;
        self.previous_idle = idle;
        usage
    }

    /// Convenience wrapper around [`update`](Self::update) that locates the
    /// idle task by name.
    pub fn update_from(&mut self, snapshot: &SchedulerSnapshot, idle_task: &str) -> f32 {
        let idle = snapshot.run_time_of(idle_task);
        self.update(snapshot.total_run_time, idle)
    }

    /// Returns the stored `(total, idle)` sample.
    pub fn previous(&self) -> (u64, u64) {
        (self.previous_total, self.previous_idle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::TaskRunTime;

    #[test]
    fn test_first_sample_is_zero() {
        let mut s = CpuSampler::new();
        assert_eq!(s.update(1_000, 900), 0.0);
        assert_eq!(s.previous(), (1_000, 900));
    }

    #[test]
    fn test_delta_usage() {
        let mut s = CpuSampler::new();
        s.update(1_000, 900);
        // 1000 ticks elapsed, 250 of them idle -> 75 % busy.
        let usage = s.update(2_000, 1_150);
        assert!((usage - 75.0).abs() < 0.001);
        assert_eq!(s.previous(), (2_000, 1_150));
    }

    #[test]
    fn test_zero_total_delta() {
        let mut s = CpuSampler::new();
        s.update(500, 100);
        assert_eq!(s.update(500, 100), 0.0);
    }

    #[test]
    fn test_counter_went_backwards() {
        let mut s = CpuSampler::new();
        s.update(500, 100);
        assert_eq!(s.update(400, 50), 0.0);
        // Baseline is still replaced.
        assert_eq!(s.previous(), (400, 50));
    }

    #[test]
    fn test_narrow_counter_wrap() {
        let before = u64::from(u32::MAX - 500);

        // Reported raw, the wrapped total looks like a reset.
        let mut raw = CpuSampler::new();
        raw.update(before, 100);
        assert_eq!(raw.update(500, 600), 0.0);

        // Widened across the wrap, the delta is intact.
        let mut widened = CpuSampler::new();
        widened.update(before, 100);
        let usage = widened.update(u64::from(u32::MAX) + 1 + 500, 600);
        assert!((usage - 50.0).abs() < 0.1, "usage {usage}");
    }

    #[test]
    fn test_fully_idle_and_fully_busy() {
        let mut s = CpuSampler::new();
        s.update(100, 0);
        assert_eq!(s.update(200, 100), 0.0);
        assert_eq!(s.update(300, 100), 100.0);
    }

    #[test]
    fn test_usage_always_in_range() {
        let mut s = CpuSampler::new();
        s.update(10, 5);
        let mut total = 10;
        let mut idle = 5;
        for step in 1..50u64 {
            total += step * 7;
            idle += (step * 7) * (step % 4) / 3;
            let usage = s.update(total, idle);
            assert!((0.0..=100.0).contains(&usage), "usage {usage} out of range");
        }
    }

    #[test]
    fn test_missing_idle_task_counts_as_zero() {
        let mut s = CpuSampler::new();
        let snap = |total| SchedulerSnapshot {
            tasks: vec![TaskRunTime::new("main", total)],
            total_run_time: total,
        };
        s.update_from(&snap(100), "IDLE");
        assert_eq!(s.update_from(&snap(200), "IDLE"), 100.0);
    }

    #[test]
    fn test_reset_forgets_baseline() {
        let mut s = CpuSampler::new();
        s.update(100, 10);
        assert!(s.has_baseline());
        s.reset();
        assert!(!s.has_baseline());
        assert_eq!(s.update(200, 20), 0.0);
    }
}
