// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Wireless link status and a heuristic data-rate estimate.
//!
//! The data rate is not measured. It is the nominal peak rate for the
//! negotiated PHY mode and channel width, derated when the signal drops
//! below -90 dBm:
//!
//! | PHY mode   | 20 MHz | 40 MHz |
//! |------------|--------|--------|
//! | Long-range | 0.5    | 0.5    |
//! | HT         | 72     | 144    |
//! | VHT        | 96     | 200    |
//! | other      | 11     | 11     |

use crate::provider::{ChannelWidth, PhyMode, WifiMode, WifiRadio};
use crate::{MetricsError, ProviderError, Reading};

/// RSSI below which the nominal rate starts to be derated.
const DERATE_THRESHOLD_DBM: i32 = -90;

/// dB span over which the derating goes from 1.0 to its floor.
const DERATE_SPAN_DB: f32 = 40.0;

/// Lowest derating factor applied to the nominal rate.
const MIN_RATE_FACTOR: f32 = 0.5;

/// Station link status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum WifiStatus {
    NotInitialized,
    Disconnected,
    Connecting,
    Disconnecting,
    Connected,
}

impl WifiStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotInitialized => "Not initialized",
            Self::Disconnected => "Disconnected",
            Self::Connecting => "Connecting",
            Self::Disconnecting => "Disconnecting",
            Self::Connected => "Connected",
        }
    }
}

impl std::fmt::Display for WifiStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifies the link from the radio mode and the AP record query.
///
/// Only a failed mode query degrades the reading; AP record failures are part
/// of the classification.
pub fn link_status(radio: &dyn WifiRadio) -> Reading<WifiStatus> {
    let mode = match radio.mode() {
        Ok(mode) => mode,
        Err(e) => {
            return Reading::degraded(
                WifiStatus::NotInitialized,
                MetricsError::provider("radio mode query", e),
            )
        }
    };

    if matches!(mode, WifiMode::Off | WifiMode::AccessPoint) {
        return Reading::ok(WifiStatus::Disconnected);
    }

    let status = match radio.ap_record() {
        Ok(_) => WifiStatus::Connected,
        Err(ProviderError::NotConnected) => WifiStatus::Disconnected,
        Err(e) => {
            tracing::debug!("access-point query failed: {e}");
            WifiStatus::NotInitialized
        }
    };
    Reading::ok(status)
}

/// RSSI of the associated access point, or 0 next to the error.
pub fn signal_strength(radio: &dyn WifiRadio) -> Reading<i8> {
    match radio.ap_record() {
        Ok(ap) => Reading::ok(ap.rssi),
        Err(e) => Reading::degraded(0, MetricsError::provider("access-point query", e)),
    }
}

/// Nominal peak rate in Mbps for a PHY mode and channel width.
pub fn nominal_rate_mbps(phy: PhyMode, width: ChannelWidth) -> f32 {
    match (phy, width) {
        (PhyMode::LongRange, _) => 0.5,
        (PhyMode::Ht, ChannelWidth::Mhz20) => 72.0,
        (PhyMode::Ht, ChannelWidth::Mhz40) => 144.0,
        (PhyMode::Vht, ChannelWidth::Mhz20) => 96.0,
        (PhyMode::Vht, ChannelWidth::Mhz40) => 200.0,
        (PhyMode::Legacy11b | PhyMode::Legacy11g | PhyMode::He, _) => 11.0,
    }
}

/// Derating factor for `rssi`, in `[0.5, 1.0]`.
pub fn signal_factor(rssi: i8) -> f32 {
    let deficit = (DERATE_THRESHOLD_DBM - i32::from(rssi)).max(0) as f32;
    (1.0 - deficit / DERATE_SPAN_DB).max(MIN_RATE_FACTOR)
}

/// Estimated data rate in Mbps, or 0.0 next to the error.
pub fn data_rate_mbps(radio: &dyn WifiRadio) -> Reading<f32> {
    let ap = match radio.ap_record() {
        Ok(ap) => ap,
        Err(e) => return Reading::degraded(0.0, MetricsError::provider("access-point query", e)),
    };
    let phy = match radio.negotiated_phy_mode() {
        Ok(phy) => phy,
        Err(e) => return Reading::degraded(0.0, MetricsError::provider("PHY mode query", e)),
    };

    Reading::ok(nominal_rate_mbps(phy, ap.width) * signal_factor(ap.rssi))
}
