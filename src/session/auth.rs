// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Login-token validity and client-id handling.
//!
//! The platform issues JWT bearer tokens. The signature is the platform's
//! business; locally a token counts as valid when it is long enough and its
//! payload segment decodes to claims whose expiry (if any) lies in the
//! future. A token that cannot be decoded is invalid, never an error.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Required length of a client id.
const CLIENT_ID_LEN: usize = 32;

/// Tokens shorter than this cannot possibly be JWTs.
const MIN_TOKEN_LEN: usize = 10;

/// Returns the caller-provided client id if it is usable, otherwise a
/// freshly generated one.
///
/// A usable id is exactly 32 characters, matching what the platform issues
/// and expects back. Callers should persist the id across runs.
pub(crate) fn normalize_client_id(provided: Option<String>) -> String {
    match provided {
        Some(id) if id.len() == CLIENT_ID_LEN => id,
        _ => generate_client_id(),
    }
}

/// Generates a stable 32-character opaque client id.
pub(crate) fn generate_client_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Checks whether a login token is still usable at `now`.
pub(crate) fn token_is_valid(token: &str, now: DateTime<Utc>) -> bool {
    if token.len() < MIN_TOKEN_LEN {
        return false;
    }
    match decode_expiry(token) {
        Some(Some(expiry)) => expiry > now,
        // Decodable claims without an expiry never expire
        Some(None) => true,
        None => false,
    }
}

/// Decodes the `exp` claim of a JWT without verifying the signature.
///
/// The outer `Option` is decodability, the inner one the presence of the
/// claim.
fn decode_expiry(token: &str) -> Option<Option<DateTime<Utc>>> {
    let mut segments = token.split('.');
    let (_header, payload) = (segments.next()?, segments.next()?);
    if segments.next().is_none() || segments.next().is_some() {
        // Not the three-segment JWT shape
        return None;
    }

    let bytes = URL_SAFE_NO_PAD.decode(payload).ok()?;
    let claims: Claims = serde_json::from_slice(&bytes).ok()?;
    Some(claims.exp.and_then(|exp| DateTime::from_timestamp(exp, 0)))
}

#[derive(Debug, Deserialize)]
struct Claims {
    #[serde(default)]
    exp: Option<i64>,
}

/// Builds an unsigned JWT-shaped token with the given payload claims.
#[cfg(test)]
pub(crate) fn token_with_claims(claims: &serde_json::Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string().as_bytes());
    format!("{header}.{payload}.signature")
}
