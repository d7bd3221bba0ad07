// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for the metrics facade and its capability providers.

/// Failures reported by a capability provider (scheduler, radio, sensor, ...).
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The station is not associated with an access point.
    #[error("wireless station is not connected")]
    NotConnected,

    /// The capability was used before it was started or configured.
    #[error("capability has not been started")]
    NotStarted,

    /// The capability does not exist on this device.
    #[error("capability not supported: {0}")]
    NotSupported(String),

    /// Scratch space for the request could not be acquired.
    #[error("out of memory: {0}")]
    NoMemory(String),

    /// The hardware reported a failure.
    #[error("hardware failure: {0}")]
    Hardware(String),

    /// Failed to read a sysfs or procfs file.
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    /// Failed to parse a value read from the system.
    #[error("failed to parse value from {path}: {detail}")]
    Parse { path: String, detail: String },
}

/// Errors returned by [`DeviceMetrics`](crate::DeviceMetrics) operations.
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    /// An operation other than `init`/`deinit` was called before `init`.
    #[error("device metrics are not initialized")]
    InvalidState,

    /// Unrecognized metric type, name or invalid configuration value.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// An optional capability is absent (e.g., no temperature sensor).
    #[error("{capability} is not supported on this device")]
    NotSupported { capability: &'static str },

    /// Transient scratch-allocation failure.
    #[error("out of memory: {0}")]
    NoMemory(String),

    /// A capability provider failed; surfaced verbatim.
    #[error("{operation} failed: {source}")]
    Provider {
        operation: &'static str,
        #[source]
        source: ProviderError,
    },
}

/// Flat classification of [`MetricsError`], for callers that only need the
/// result code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum ErrorKind {
    InvalidState,
    InvalidArgument,
    NotSupported,
    NoMemory,
    Provider,
}

impl MetricsError {
    /// Wraps a provider failure, lifting allocation failures into
    /// [`MetricsError::NoMemory`].
    pub(crate) fn provider(operation: &'static str, source: ProviderError) -> Self {
        match source {
            ProviderError::NoMemory(detail) => Self::NoMemory(detail),
            source => Self::Provider { operation, source },
        }
    }

    /// Returns the taxonomy bucket of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidState => ErrorKind::InvalidState,
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::NotSupported { .. } => ErrorKind::NotSupported,
            Self::NoMemory(_) => ErrorKind::NoMemory,
            Self::Provider { .. } => ErrorKind::Provider,
        }
    }

    /// Returns the underlying provider failure, if any.
    pub fn provider_error(&self) -> Option<&ProviderError> {
        match self {
            Self::Provider { source, .. } => Some(source),
            _ => None,
        }
    }
}
