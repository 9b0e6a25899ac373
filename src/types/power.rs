// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Power and connectivity state types.

use std::fmt;

/// Represents the power state of a device.
///
/// An unknown power state (no status received yet) is modeled as
/// `Option<PowerState>::None` on the device, not as a variant here.
///
/// # Examples
///
/// ```
/// use govee_cloud::types::PowerState;
///
/// let on = PowerState::from(true);
/// assert_eq!(on, PowerState::On);
/// assert!(on.is_on());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PowerState {
    /// Power is off.
    Off,
    /// Power is on.
    On,
}

impl PowerState {
    /// Returns `true` if the state is [`PowerState::On`].
    #[must_use]
    pub const fn is_on(&self) -> bool {
        matches!(self, Self::On)
    }

    /// Returns the state as a boolean.
    #[must_use]
    pub const fn as_bool(&self) -> bool {
        matches!(self, Self::On)
    }

    /// Decodes the wire representation: the integer `1` means on, any other
    /// value means off.
    #[must_use]
    pub const fn from_wire(value: i64) -> Self {
        if value == 1 { Self::On } else { Self::Off }
    }
}

impl From<bool> for PowerState {
    fn from(value: bool) -> Self {
        if value { Self::On } else { Self::Off }
    }
}

impl fmt::Display for PowerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Off => write!(f, "off"),
            Self::On => write!(f, "on"),
        }
    }
}

/// Cloud connectivity of a device.
///
/// The platform reports connectivity as a boolean or as the strings
/// `"true"`/`"false"`; anything else maps to [`Connectivity::Unknown`].
///
/// # Examples
///
/// ```
/// use govee_cloud::types::Connectivity;
///
/// assert_eq!(Connectivity::from_value(&serde_json::json!(true)), Connectivity::Connected);
/// assert_eq!(Connectivity::from_value(&serde_json::json!("false")), Connectivity::Disconnected);
/// assert_eq!(Connectivity::from_value(&serde_json::json!(42)), Connectivity::Unknown);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Connectivity {
    /// The device is reachable through the cloud.
    Connected,
    /// The device is registered but currently offline.
    Disconnected,
    /// No connectivity information has been received.
    #[default]
    Unknown,
}

impl Connectivity {
    /// Returns `true` if the device is known to be connected.
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }

    /// Decodes the wire representation.
    ///
    /// Accepts a JSON boolean or the strings `"true"`/`"false"`. Any other
    /// value decodes to [`Connectivity::Unknown`].
    #[must_use]
    pub fn from_value(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Bool(b) => Self::from(*b),
            serde_json::Value::String(s) if s == "true" => Self::Connected,
            serde_json::Value::String(s) if s == "false" => Self::Disconnected,
            _ => Self::Unknown,
        }
    }

    /// Creates a connectivity state from an optional online flag.
    #[must_use]
    pub fn from_online_flag(online: Option<bool>) -> Self {
        online.map_or(Self::Unknown, Self::from)
    }
}

impl From<bool> for Connectivity {
    fn from(value: bool) -> Self {
        if value { Self::Connected } else { Self::Disconnected }
    }
}

impl fmt::Display for Connectivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connected => write!(f, "connected"),
            Self::Disconnected => write!(f, "disconnected"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}
