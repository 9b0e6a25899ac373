// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Cached device state and inbound state deltas.

use serde::Deserialize;

use crate::error::DecodeError;
use crate::types::{Brightness, ColorTemperature, Connectivity, PowerState, RgbColor};

/// Cached state of a light.
///
/// All fields except connectivity are optional because state is unknown
/// until the device has reported it at least once. The session is the sole
/// mutator; callers change state indirectly by issuing commands and waiting
/// for the confirming delta.
///
/// # Examples
///
/// ```
/// use govee_cloud::device::LightState;
///
/// let state = LightState::default();
/// assert!(state.power().is_none());
/// assert!(!state.connectivity().is_connected());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LightState {
    pub(crate) connectivity: Connectivity,
    pub(crate) power: Option<PowerState>,
    pub(crate) brightness: Option<Brightness>,
    pub(crate) color: Option<RgbColor>,
    pub(crate) color_temperature: Option<ColorTemperature>,
}

impl LightState {
    /// Creates an empty state with the given initial connectivity.
    #[must_use]
    pub(crate) fn with_connectivity(connectivity: Connectivity) -> Self {
        Self {
            connectivity,
            ..Self::default()
        }
    }

    /// Returns the cloud connectivity of the device.
    #[must_use]
    pub fn connectivity(&self) -> Connectivity {
        self.connectivity
    }

    /// Returns the power state, or `None` if no status has been received.
    #[must_use]
    pub fn power(&self) -> Option<PowerState> {
        self.power
    }

    /// Returns the brightness, or `None` if no status has been received.
    #[must_use]
    pub fn brightness(&self) -> Option<Brightness> {
        self.brightness
    }

    /// Returns the color, or `None` if the last status did not report one.
    #[must_use]
    pub fn color(&self) -> Option<RgbColor> {
        self.color
    }

    /// Returns the color temperature, or `None` if the last status did not
    /// report one.
    #[must_use]
    pub fn color_temperature(&self) -> Option<ColorTemperature> {
        self.color_temperature
    }
}

/// A state delta received from the broker.
///
/// The platform pushes sparse updates: only the fields present in the
/// payload carry new information, except for color and color temperature
/// where absence means "not set" rather than "unchanged". The `device` and
/// `connected` members are mandatory; a payload lacking either is discarded
/// as a whole. Any other malformed field is ignored field-wise.
#[derive(Debug, Clone, Deserialize)]
pub struct StateDelta {
    /// Identifier of the device the delta belongs to.
    pub(crate) device: String,

    /// Connectivity flag; boolean or `"true"`/`"false"` strings on the wire.
    pub(crate) connected: serde_json::Value,

    #[serde(rename = "onOff", default, deserialize_with = "lenient")]
    pub(crate) on_off: Option<i64>,

    #[serde(default, deserialize_with = "lenient")]
    pub(crate) brightness: Option<i64>,

    #[serde(default, deserialize_with = "lenient")]
    pub(crate) color: Option<ColorChannels>,

    #[serde(rename = "colorTemInKelvin", default, deserialize_with = "lenient")]
    pub(crate) color_tem_in_kelvin: Option<i64>,
}

impl StateDelta {
    /// Decodes a delta from the `state` member of an inbound message.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError`] if the value is not an object or lacks the
    /// mandatory `device`/`connected` members.
    pub fn from_value(value: serde_json::Value) -> Result<Self, DecodeError> {
        let delta: Self = serde_json::from_value(value)?;
        if delta.device.is_empty() {
            return Err(DecodeError::MissingField("device"));
        }
        Ok(delta)
    }

    /// Returns the identifier of the device this delta belongs to.
    #[must_use]
    pub fn device(&self) -> &str {
        &self.device
    }

    /// Returns the decoded connectivity.
    #[must_use]
    pub fn connectivity(&self) -> Connectivity {
        Connectivity::from_value(&self.connected)
    }
}

/// RGB channels as they appear in inbound payloads.
#[derive(Debug, Clone, Copy, Deserialize)]
pub(crate) struct ColorChannels {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
}

impl From<ColorChannels> for RgbColor {
    fn from(channels: ColorChannels) -> Self {
        Self::new(channels.r, channels.g, channels.b)
    }
}

/// Deserializes a field to `None` instead of failing the whole payload when
/// the value has an unexpected shape.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}
