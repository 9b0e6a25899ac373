// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types for Govee device control.
//!
//! This module provides type-safe representations of the values exchanged
//! with Govee devices. Each type enforces its valid range at construction
//! time.
//!
//! # Types
//!
//! - [`PowerState`] - On/Off state of a device
//! - [`Connectivity`] - Cloud connection state (connected/disconnected/unknown)
//! - [`Brightness`] - Brightness as a raw 0-255 wire value with fraction accessors
//! - [`RgbColor`] - RGB color with 8-bit channels
//! - [`ColorTemperature`] - White color temperature in kelvin (2000-9000)

mod brightness;
mod color_temp;
mod power;
mod rgb_color;

pub use brightness::Brightness;
pub use color_temp::{ColorTemperature, kelvin_to_rgb};
pub use power::{Connectivity, PowerState};
pub use rgb_color::RgbColor;
