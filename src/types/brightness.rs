// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Brightness type for light control.
//!
//! The wire protocol carries brightness as a raw 0-255 integer while the
//! public API works with a normalized 0.0-1.0 fraction. This type stores the
//! raw value so that command deduplication compares exactly what would be
//! sent on the wire.

use std::fmt;

use crate::error::ValueError;

/// Brightness level, stored as the raw 0-255 wire value.
///
/// # Examples
///
/// ```
/// use govee_cloud::types::Brightness;
///
/// let half = Brightness::from_fraction(0.5).unwrap();
/// assert_eq!(half.raw(), 128);
///
/// let full = Brightness::from_raw(255);
/// assert!((full.fraction() - 1.0).abs() < f64::EPSILON);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Brightness(u8);

impl Brightness {
    /// Minimum brightness (off).
    pub const MIN: Self = Self(0);

    /// Maximum brightness.
    pub const MAX: Self = Self(255);

    /// Creates a brightness from the raw 0-255 wire value.
    #[must_use]
    pub const fn from_raw(raw: u8) -> Self {
        Self(raw)
    }

    /// Creates a brightness from a possibly out-of-range wire value,
    /// clamping into 0-255.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub const fn from_raw_clamped(raw: i64) -> Self {
        if raw < 0 {
            Self(0)
        } else if raw > 255 {
            Self(255)
        } else {
            Self(raw as u8)
        }
    }

    /// Creates a brightness from a fraction between 0.0 and 1.0.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError::InvalidBrightness`] if the fraction is outside
    /// `[0.0, 1.0]` or not finite.
    ///
    /// # Examples
    ///
    /// ```
    /// use govee_cloud::types::Brightness;
    ///
    /// assert_eq!(Brightness::from_fraction(1.0).unwrap().raw(), 255);
    /// assert!(Brightness::from_fraction(1.5).is_err());
    /// ```
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn from_fraction(fraction: f64) -> Result<Self, ValueError> {
        if !fraction.is_finite() || !(0.0..=1.0).contains(&fraction) {
            return Err(ValueError::InvalidBrightness(fraction));
        }
        Ok(Self((fraction * 255.0).round() as u8))
    }

    /// Creates a brightness from a fraction, clamping into `[0.0, 1.0]`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn from_fraction_clamped(fraction: f64) -> Self {
        let fraction = if fraction.is_finite() { fraction } else { 0.0 };
        Self((fraction.clamp(0.0, 1.0) * 255.0).round() as u8)
    }

    /// Returns the raw 0-255 wire value.
    #[must_use]
    pub const fn raw(&self) -> u8 {
        self.0
    }

    /// Returns the brightness as a fraction between 0.0 and 1.0.
    #[must_use]
    pub fn fraction(&self) -> f64 {
        f64::from(self.0) / 255.0
    }
}

impl fmt::Display for Brightness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.0}%", self.fraction() * 100.0)
    }
}
