// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device command definitions.
//!
//! This module provides typed representations of the commands a Govee device
//! accepts over the message broker, plus the publish envelope that wraps
//! them on the wire.
//!
//! # Available Commands
//!
//! | Command | Purpose | Wire name |
//! |---------|---------|-----------|
//! | [`Command::Turn`] | Switch power on/off | `turn` |
//! | [`Command::Brightness`] | Set brightness (raw 0-255) | `brightness` |
//! | [`Command::Color`] | Set RGB color | `color` |
//! | [`Command::ColorTemperature`] | Set white temperature | `colorTem` |
//! | [`Command::StatusRequest`] | Poll device status | `turn` (empty data) |
//!
//! There is no documented "get status" command; an empty `turn` payload is
//! the observed status-poll surrogate. A color-temperature command carries
//! both the kelvin label and the equivalent RGB color, because the protocol
//! has no independent kelvin primitive.

use serde::Serialize;

use crate::types::RgbColor;

/// A command that can be published to a Govee device.
///
/// # Examples
///
/// ```
/// use govee_cloud::command::Command;
///
/// let cmd = Command::Turn { on: true };
/// assert_eq!(cmd.name(), "turn");
/// assert_eq!(cmd.data(), serde_json::json!({"val": true}));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Switch the device on or off.
    Turn {
        /// Desired power state.
        on: bool,
    },

    /// Set the brightness to a raw 0-255 value.
    Brightness {
        /// Raw brightness value.
        level: u8,
    },

    /// Set the RGB color.
    Color {
        /// Desired color.
        color: RgbColor,
    },

    /// Set the white color temperature.
    ///
    /// Carries both the derived RGB rendering and the kelvin label.
    ColorTemperature {
        /// RGB rendering of the temperature.
        color: RgbColor,
        /// Temperature in kelvin.
        kelvin: u16,
    },

    /// Request a status report from the device.
    StatusRequest,
}

impl Command {
    /// Returns the wire command name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Turn { .. } | Self::StatusRequest => "turn",
            Self::Brightness { .. } => "brightness",
            Self::Color { .. } => "color",
            Self::ColorTemperature { .. } => "colorTem",
        }
    }

    /// Returns the command data object.
    #[must_use]
    pub fn data(&self) -> serde_json::Value {
        match self {
            Self::Turn { on } => serde_json::json!({ "val": on }),
            Self::Brightness { level } => serde_json::json!({ "val": level }),
            Self::Color { color } => channels(*color),
            Self::ColorTemperature { color, kelvin } => serde_json::json!({
                "color": channels(*color),
                "colorTemInKelvin": kelvin,
            }),
            Self::StatusRequest => serde_json::json!({}),
        }
    }
}

fn channels(color: RgbColor) -> serde_json::Value {
    serde_json::json!({
        "red": color.red(),
        "green": color.green(),
        "blue": color.blue(),
    })
}

/// The envelope wrapping every published command.
///
/// Wire shape:
///
/// ```json
/// {
///   "msg": {
///     "accountTopic": "GA/...",
///     "cmd": "color",
///     "cmdVersion": 0,
///     "data": { "red": 255, "green": 0, "blue": 255 },
///     "transaction": "1234567890",
///     "type": 1
///   }
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct CommandEnvelope<'a> {
    msg: EnvelopeMsg<'a>,
}

#[derive(Debug, Serialize)]
struct EnvelopeMsg<'a> {
    #[serde(rename = "accountTopic")]
    account_topic: &'a str,
    cmd: &'static str,
    #[serde(rename = "cmdVersion")]
    cmd_version: u8,
    data: serde_json::Value,
    transaction: String,
    #[serde(rename = "type")]
    message_type: u8,
}

impl<'a> CommandEnvelope<'a> {
    /// Wraps a command for publishing.
    ///
    /// `transaction` is the caller's millisecond timestamp, stringified as
    /// the protocol expects.
    #[must_use]
    pub fn new(account_topic: &'a str, transaction: i64, command: &Command) -> Self {
        Self {
            msg: EnvelopeMsg {
                account_topic,
                cmd: command.name(),
                cmd_version: 0,
                data: command.data(),
                transaction: transaction.to_string(),
                message_type: 1,
            },
        }
    }

    /// Serializes the envelope to the compact JSON wire form.
    #[must_use]
    pub fn to_payload(&self) -> Vec<u8> {
        // Serialization of this shape cannot fail
        serde_json::to_vec(self).unwrap_or_default()
    }
}
