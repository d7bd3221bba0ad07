// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! A metric value that is always populated, plus an optional degradation.

use crate::MetricsError;

/// A populated value with the error that degraded it, if any.
///
/// Some metrics still produce a meaningful value when their provider fails:
/// the temperature falls back to the last good reading, and the Wi-Fi signal
/// and data rate report zero. `Reading` keeps both halves so callers can
/// decide whether a stale value is good enough. Use
/// [`into_result`](Self::into_result) for strict handling.
#[derive(Debug)]
pub struct Reading<T> {
    value: T,
    error: Option<MetricsError>,
}

impl<T> Reading<T> {
    pub fn ok(value: T) -> Self {
        Self { value, error: None }
    }

    pub fn degraded(value: T, error: MetricsError) -> Self {
        Self {
            value,
            error: Some(error),
        }
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn error(&self) -> Option<&MetricsError> {
        self.error.as_ref()
    }

    pub fn is_degraded(&self) -> bool {
        self.error.is_some()
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Reading<U> {
        Reading {
            value: f(self.value),
            error: self.error,
        }
    }

    pub fn into_parts(self) -> (T, Option<MetricsError>) {
        (self.value, self.error)
    }

    /// Drops the fallback value if the reading is degraded.
    pub fn into_result(self) -> Result<T, MetricsError> {
        match self.error {
            None => Ok(self.value),
            Some(e) => Err(e),
        }
    }
}
