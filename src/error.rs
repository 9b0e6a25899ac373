// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the Govee cloud library.
//!
//! This module provides an error hierarchy for handling failures across the
//! library: value validation, REST protocol errors, authentication problems,
//! transport failures, and inbound message decoding.

use thiserror::Error;

/// The main error type for this library.
///
/// This enum encompasses all possible errors that can occur when interacting
/// with the Govee cloud platform.
#[derive(Debug, Error)]
pub enum Error {
    /// Error occurred during value validation.
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// The platform answered with an application-level error.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Authentication or certificate material problem.
    #[error("auth error: {0}")]
    Auth(#[from] AuthError),

    /// Network-level failure (HTTP or MQTT).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Error occurred while decoding an inbound state update.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Device was not found in the registry.
    #[error("device not found")]
    DeviceNotFound,

    /// Device does not support the requested capability.
    #[error("device does not support this capability")]
    CapabilityNotSupported,
}

/// Errors related to value validation and constraints.
///
/// These errors occur when attempting to create constrained types
/// with invalid values.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValueError {
    /// A numeric value is outside the allowed range.
    #[error("value {actual} is out of range [{min}, {max}]")]
    OutOfRange {
        /// Minimum allowed value.
        min: u16,
        /// Maximum allowed value.
        max: u16,
        /// The actual value that was provided.
        actual: u16,
    },

    /// An invalid hex color string was provided.
    #[error("invalid hex color: {0}")]
    InvalidHexColor(String),

    /// A brightness fraction is outside the valid range (0.0-1.0).
    #[error("brightness fraction {0} is out of range [0.0, 1.0]")]
    InvalidBrightness(f64),
}

/// Application-level errors reported by the Govee REST API.
///
/// These are fatal to the calling operation and are never retried
/// automatically; the caller decides whether to repeat the whole operation.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The platform embedded a non-success status in an otherwise valid
    /// response body.
    #[error("{endpoint} answered with status {status}")]
    Status {
        /// The endpoint that produced the status.
        endpoint: &'static str,
        /// The embedded application status code.
        status: i64,
    },

    /// A required field is missing from a response.
    #[error("missing field in {endpoint} response: {field}")]
    MissingField {
        /// The endpoint that produced the response.
        endpoint: &'static str,
        /// The field that was expected.
        field: &'static str,
    },

    /// A response body could not be parsed into the expected shape.
    #[error("malformed {endpoint} response: {source}")]
    MalformedResponse {
        /// The endpoint that produced the response.
        endpoint: &'static str,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
}

/// Errors related to authentication and certificate material.
///
/// These are fatal; the caller must supply corrected credentials or
/// certificate files before retrying.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The login exchange succeeded but returned a token that fails
    /// validation (too short, or an undecodable/expired payload).
    #[error("login returned an unusable token")]
    InvalidToken,

    /// The certificate material referenced by the login response is not
    /// available from the configured store.
    #[error("certificate material {certificate_id:?} is not available")]
    CertificateUnavailable {
        /// The certificate identifier named by the platform.
        certificate_id: String,
    },

    /// Certificate material exists but could not be read.
    #[error("failed to read certificate {certificate_id:?}: {source}")]
    CertificateRead {
        /// The certificate identifier named by the platform.
        certificate_id: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Network-level failures, propagated unmodified.
///
/// The caller decides the retry policy for these.
#[derive(Debug, Error)]
pub enum TransportError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// MQTT connection or communication failed.
    #[error("MQTT error: {0}")]
    Mqtt(#[from] rumqttc::ClientError),

    /// Connection to the broker failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Connection attempt timed out.
    #[error("connection timed out after {0} ms")]
    Timeout(u64),

    /// No broker connection is established.
    #[error("broker connection is not established")]
    NotConnected,
}

/// Errors produced while decoding inbound broker messages.
///
/// These are non-fatal at the session level: the offending message is
/// dropped and processing continues.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// A required field is missing from the state delta.
    #[error("state update is missing required field: {0}")]
    MissingField(&'static str),
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_error_display() {
        let err = ValueError::OutOfRange {
            min: 2000,
            max: 9000,
            actual: 9500,
        };
        assert_eq!(err.to_string(), "value 9500 is out of range [2000, 9000]");
    }

    #[test]
    fn error_from_value_error() {
        let value_err = ValueError::InvalidHexColor("GG0000".to_string());
        let err: Error = value_err.into();
        assert!(matches!(err, Error::Value(ValueError::InvalidHexColor(_))));
    }

    #[test]
    fn protocol_status_display() {
        let err = ProtocolError::Status {
            endpoint: "login",
            status: 401,
        };
        assert_eq!(err.to_string(), "login answered with status 401");
    }

    #[test]
    fn auth_error_display() {
        let err = AuthError::CertificateUnavailable {
            certificate_id: "testiot.cert".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "certificate material \"testiot.cert\" is not available"
        );
    }

    #[test]
    fn decode_error_display() {
        let err = DecodeError::MissingField("device");
        assert_eq!(
            err.to_string(),
            "state update is missing required field: device"
        );
    }
}
