// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device model.
//!
//! A Govee device is a single [`Device`] value carrying a capability tag
//! ([`DeviceKind`]) and cached optional state, instead of a class hierarchy.
//! State decoding and command encoding dispatch on the tag.
//!
//! Devices are owned exclusively by the session's registry. The session
//! applies inbound state deltas; callers observe snapshots and mutate state
//! indirectly through the session's command operations.

mod factory;
mod state;

pub use factory::kind_for_sku;
pub use state::{LightState, StateDelta};

use crate::command::Command;
use crate::types::{Brightness, ColorTemperature, Connectivity, PowerState, RgbColor};

/// Capability classification of a device.
///
/// # Examples
///
/// ```
/// use govee_cloud::device::DeviceKind;
///
/// assert!(!DeviceKind::WhiteBulb.supports_color());
/// assert!(DeviceKind::LedStrip.supports_color());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceKind {
    /// A white-only bulb: power and brightness.
    WhiteBulb,
    /// An RGB bulb: power, brightness, color, color temperature.
    RgbBulb,
    /// An RGB LED strip: power, brightness, color, color temperature.
    LedStrip,
}

impl DeviceKind {
    /// Returns `true` if this kind supports color and color temperature.
    #[must_use]
    pub const fn supports_color(&self) -> bool {
        matches!(self, Self::RgbBulb | Self::LedStrip)
    }

    /// Returns a human-readable name for the kind.
    #[must_use]
    pub const fn friendly_name(&self) -> &'static str {
        match self {
            Self::WhiteBulb => "White bulb",
            Self::RgbBulb => "RGB bulb",
            Self::LedStrip => "RGB LED strip",
        }
    }
}

/// A Govee smart light.
///
/// Carries the immutable registration data from the device-list endpoint
/// plus the cached state accumulated from inbound deltas. Cached values lag
/// issued commands: a setter's effect becomes visible only when the device
/// confirms it with a status update.
#[derive(Debug, Clone, PartialEq)]
pub struct Device {
    identifier: String,
    topic: String,
    sku: String,
    name: String,
    kind: DeviceKind,
    state: LightState,
}

impl Device {
    pub(crate) fn new(
        kind: DeviceKind,
        identifier: impl Into<String>,
        topic: impl Into<String>,
        sku: impl Into<String>,
        name: impl Into<String>,
        connectivity: Connectivity,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            topic: topic.into(),
            sku: sku.into(),
            name: name.into(),
            kind,
            state: LightState::with_connectivity(connectivity),
        }
    }

    /// Returns the vendor-assigned device identifier.
    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Returns the per-device broker publish topic.
    #[must_use]
    pub(crate) fn topic(&self) -> &str {
        &self.topic
    }

    /// Returns the SKU of the device model.
    #[must_use]
    pub fn sku(&self) -> &str {
        &self.sku
    }

    /// Returns the display name, or a synthesized placeholder when the
    /// account has none configured.
    #[must_use]
    pub fn name(&self) -> String {
        if self.name.is_empty() {
            format!("{} @ {}", self.sku, self.identifier)
        } else {
            self.name.clone()
        }
    }

    /// Returns the capability kind.
    #[must_use]
    pub fn kind(&self) -> DeviceKind {
        self.kind
    }

    /// Returns the cached state.
    #[must_use]
    pub fn state(&self) -> &LightState {
        &self.state
    }

    pub(crate) fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Applies an inbound state delta.
    ///
    /// Fields absent from the delta keep their cached value, except color
    /// and color temperature on color-capable kinds, where absence means
    /// the device did not report them and the cache resets to unknown.
    pub(crate) fn apply_delta(&mut self, delta: &StateDelta) {
        self.state.connectivity = delta.connectivity();

        if let Some(value) = delta.on_off {
            self.state.power = Some(PowerState::from_wire(value));
        }
        if let Some(raw) = delta.brightness {
            self.state.brightness = Some(Brightness::from_raw_clamped(raw));
        }

        if self.kind.supports_color() {
            self.state.color = delta.color.map(RgbColor::from);
            self.state.color_temperature = delta
                .color_tem_in_kelvin
                .and_then(ColorTemperature::from_wire);
        }
    }

    // =========================================================================
    // Command encoding
    //
    // Each encoder compares the request against the cached state and returns
    // None when the command would be a no-op on the wire.
    // =========================================================================

    pub(crate) fn encode_turn(&self, on: bool) -> Option<Command> {
        if self.state.power == Some(PowerState::from(on)) {
            return None;
        }
        Some(Command::Turn { on })
    }

    /// Unknown power is treated as off, so toggling a fresh device turns
    /// it on.
    pub(crate) fn encode_toggle(&self) -> Option<Command> {
        let currently_on = matches!(self.state.power, Some(PowerState::On));
        self.encode_turn(!currently_on)
    }

    pub(crate) fn encode_brightness(&self, level: Brightness) -> Option<Command> {
        if self.state.brightness == Some(level) {
            return None;
        }
        Some(Command::Brightness { level: level.raw() })
    }

    pub(crate) fn encode_color(&self, color: RgbColor) -> Option<Command> {
        if self.state.color == Some(color) {
            return None;
        }
        Some(Command::Color { color })
    }

    pub(crate) fn encode_color_temperature(&self, temperature: ColorTemperature) -> Option<Command> {
        if self.state.color_temperature == Some(temperature) {
            return None;
        }
        Some(Command::ColorTemperature {
            color: temperature.to_rgb(),
            kelvin: temperature.kelvin(),
        })
    }
}
