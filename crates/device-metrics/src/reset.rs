// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Reset-cause classification.

/// Label reported for codes outside the known table.
pub const UNRECOGNIZED_LABEL: &str = "Unknown reason";

/// Hardware-reported reason for the most recent restart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum ResetCause {
    Unknown,
    PowerOn,
    External,
    Software,
    Panic,
    InterruptWatchdog,
    TaskWatchdog,
    OtherWatchdog,
    Brownout,
    Sdio,
    DeepSleep,
    Bootloader,
    /// A code the table does not know about.
    Unrecognized(u32),
}

impl ResetCause {
    pub fn from_code(code: u32) -> Self {
        match code {
            0 => Self::Unknown,
            1 => Self::PowerOn,
            2 => Self::External,
            3 => Self::Software,
            4 => Self::Panic,
            5 => Self::InterruptWatchdog,
            6 => Self::TaskWatchdog,
            7 => Self::OtherWatchdog,
            8 => Self::Brownout,
            9 => Self::Sdio,
            10 => Self::DeepSleep,
            11 => Self::Bootloader,
            other => Self::Unrecognized(other),
        }
    }

    pub fn code(&self) -> u32 {
        match self {
            Self::Unknown => 0,
            Self::PowerOn => 1,
            Self::External => 2,
            Self::Software => 3,
            Self::Panic => 4,
            Self::InterruptWatchdog => 5,
            Self::TaskWatchdog => 6,
            Self::OtherWatchdog => 7,
            Self::Brownout => 8,
            Self::Sdio => 9,
            Self::DeepSleep => 10,
            Self::Bootloader => 11,
            Self::Unrecognized(code) => *code,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Unknown => "Unknown",
            Self::PowerOn => "Power-on reset",
            Self::External => "External pin reset",
            Self::Software => "Software reset",
            Self::Panic => "Watchdog reset",
            Self::InterruptWatchdog => "Interrupt watchdog reset",
            Self::TaskWatchdog => "Task watchdog reset",
            Self::OtherWatchdog => "Other watchdog reset",
            Self::Brownout => "Brownout reset",
            Self::Sdio => "SDIO reset",
            Self::DeepSleep => "Deepsleep reset",
            Self::Bootloader => "Bootstrapping reset",
            Self::Unrecognized(_) => UNRECOGNIZED_LABEL,
        }
    }

    /// Returns `true` for any of the watchdog or panic causes.
    pub fn is_watchdog(&self) -> bool {
        matches!(
            self,
            Self::Panic | Self::InterruptWatchdog | Self::TaskWatchdog | Self::OtherWatchdog
        )
    }
}

/// Cached reset cause for the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct RebootReason {
    pub code: u32,
    pub cause: ResetCause,
    pub label: &'static str,
}

impl RebootReason {
    pub fn from_code(code: u32) -> Self {
        let cause = ResetCause::from_code(code);
        Self {
            code,
            cause,
            label: cause.label(),
        }
    }
}

impl Default for RebootReason {
    fn default() -> Self {
        Self::from_code(0)
    }
}

impl std::fmt::Display for RebootReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (code {})", self.label, self.code)
    }
}
