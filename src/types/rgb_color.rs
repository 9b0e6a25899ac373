// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! RGB color type with hex parsing.

use std::fmt;
use std::str::FromStr;

use crate::error::ValueError;

/// RGB color with 8-bit channels (0-255).
///
/// # Examples
///
/// ```
/// use govee_cloud::types::RgbColor;
///
/// // Create from RGB values
/// let color = RgbColor::new(255, 215, 0); // Gold
/// assert_eq!(color.red(), 255);
/// assert_eq!(color.green(), 215);
/// assert_eq!(color.blue(), 0);
///
/// // Parse from hex string
/// let red = RgbColor::from_hex("#FF0000").unwrap();
/// assert_eq!(red.to_hex(), "FF0000");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct RgbColor {
    red: u8,
    green: u8,
    blue: u8,
}

impl RgbColor {
    /// Creates a new RGB color.
    #[must_use]
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Parses an RGB color from a hex string.
    ///
    /// Accepts formats: `#RRGGBB`, `RRGGBB`, `#RGB`, `RGB`
    ///
    /// # Errors
    ///
    /// Returns `ValueError` if the hex string is invalid.
    ///
    /// # Examples
    ///
    /// ```
    /// use govee_cloud::types::RgbColor;
    ///
    /// let color = RgbColor::from_hex("#FF5733").unwrap();
    /// assert_eq!(color.red(), 255);
    ///
    /// // Short format expands each digit
    /// let color = RgbColor::from_hex("#F00").unwrap();
    /// assert_eq!(color.red(), 255);
    /// ```
    pub fn from_hex(hex: &str) -> Result<Self, ValueError> {
        let hex = hex.trim_start_matches('#');

        match hex.len() {
            3 => {
                let chars: Vec<char> = hex.chars().collect();
                let r = parse_hex_char(chars[0])?;
                let g = parse_hex_char(chars[1])?;
                let b = parse_hex_char(chars[2])?;
                // Expand 0-F to 0-255
                Ok(Self::new(r * 17, g * 17, b * 17))
            }
            6 => {
                let r = parse_hex_pair(&hex[0..2])?;
                let g = parse_hex_pair(&hex[2..4])?;
                let b = parse_hex_pair(&hex[4..6])?;
                Ok(Self::new(r, g, b))
            }
            _ => Err(ValueError::InvalidHexColor(hex.to_string())),
        }
    }

    /// Returns the red component.
    #[must_use]
    pub const fn red(&self) -> u8 {
        self.red
    }

    /// Returns the green component.
    #[must_use]
    pub const fn green(&self) -> u8 {
        self.green
    }

    /// Returns the blue component.
    #[must_use]
    pub const fn blue(&self) -> u8 {
        self.blue
    }

    /// Returns the color as a hex string without the hash prefix.
    #[must_use]
    pub fn to_hex(&self) -> String {
        format!("{:02X}{:02X}{:02X}", self.red, self.green, self.blue)
    }

    /// Creates a white color.
    #[must_use]
    pub const fn white() -> Self {
        Self::new(255, 255, 255)
    }

    /// Creates a black color.
    #[must_use]
    pub const fn black() -> Self {
        Self::new(0, 0, 0)
    }
}

impl fmt::Display for RgbColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.to_hex())
    }
}

impl FromStr for RgbColor {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl From<(u8, u8, u8)> for RgbColor {
    fn from((red, green, blue): (u8, u8, u8)) -> Self {
        Self::new(red, green, blue)
    }
}

// Helper function to parse a single hex character
fn parse_hex_char(c: char) -> Result<u8, ValueError> {
    c.to_digit(16)
        .and_then(|d| u8::try_from(d).ok())
        .ok_or_else(|| ValueError::InvalidHexColor(c.to_string()))
}

// Helper function to parse a two-character hex pair
fn parse_hex_pair(s: &str) -> Result<u8, ValueError> {
    u8::from_str_radix(s, 16).map_err(|_| ValueError::InvalidHexColor(s.to_string()))
}
