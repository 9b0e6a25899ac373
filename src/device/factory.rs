// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! SKU-based device classification.
//!
//! Govee SKUs start with `H` followed by a two-digit family code. Extend the
//! mapping here when adding support for a new family; nothing else in the
//! crate branches on SKU strings.

use super::DeviceKind;

/// The product-family prefix shared by all supported SKUs.
const SKU_PREFIX: char = 'H';

/// Classifies a SKU string into a device kind.
///
/// Returns `None` for SKUs that do not belong to a supported family; the
/// caller is expected to skip such devices.
///
/// # Examples
///
/// ```
/// use govee_cloud::device::{DeviceKind, kind_for_sku};
///
/// assert_eq!(kind_for_sku("H6159"), Some(DeviceKind::RgbBulb));
/// assert_eq!(kind_for_sku("H6085"), Some(DeviceKind::WhiteBulb));
/// assert_eq!(kind_for_sku("H6163"), Some(DeviceKind::LedStrip));
/// assert_eq!(kind_for_sku("H7022"), None);
/// ```
#[must_use]
pub fn kind_for_sku(sku: &str) -> Option<DeviceKind> {
    if sku.len() < 5 || !sku.starts_with(SKU_PREFIX) {
        return None;
    }

    match sku.get(1..3)? {
        // The 60 family is bulbs; H6085 is the only white-only model.
        "60" => {
            if sku == "H6085" {
                Some(DeviceKind::WhiteBulb)
            } else {
                Some(DeviceKind::RgbBulb)
            }
        }
        "61" => Some(DeviceKind::LedStrip),
        _ => None,
    }
}
