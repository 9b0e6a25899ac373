// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! REST client for the Govee cloud API.
//!
//! All requests are JSON POSTs carrying the headers the vendor app sends.
//! HTTP-level failures propagate as [`TransportError`]; a response body that
//! is not the expected shape, or that embeds a non-200 application status,
//! is a [`ProtocolError`](crate::error::ProtocolError).

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use crate::config::PlatformConfig;
use crate::error::{Error, ProtocolError, TransportError};
use crate::types::Connectivity;

use super::transaction_millis;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// REST client bound to one platform configuration and client id.
#[derive(Debug, Clone)]
pub(crate) struct RestClient {
    http: reqwest::Client,
    config: Arc<PlatformConfig>,
    client_id: String,
}

impl RestClient {
    pub(crate) fn new(
        config: Arc<PlatformConfig>,
        client_id: String,
    ) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(TransportError::Http)?;

        Ok(Self {
            http,
            config,
            client_id,
        })
    }

    /// Performs the login exchange.
    pub(crate) async fn login(&self, email: &str, password: &str) -> Result<LoginSession, Error> {
        let body = serde_json::json!({
            "client": self.client_id,
            "email": email,
            "key": "",
            "password": password,
            "transaction": transaction_millis(),
            "view": 0,
        });

        let response = self
            .request(PlatformConfig::LOGIN_PATH, None)
            .json(&body)
            .send()
            .await
            .map_err(TransportError::Http)?
            .error_for_status()
            .map_err(TransportError::Http)?;

        let text = response.text().await.map_err(TransportError::Http)?;
        let parsed: LoginResponse =
            serde_json::from_str(&text).map_err(|source| ProtocolError::MalformedResponse {
                endpoint: "login",
                source,
            })?;

        if parsed.status != 200 {
            tracing::warn!(status = parsed.status, message = %parsed.message, "Login rejected");
            return Err(ProtocolError::Status {
                endpoint: "login",
                status: parsed.status,
            }
            .into());
        }

        let client = parsed.client.ok_or(ProtocolError::MissingField {
            endpoint: "login",
            field: "client",
        })?;

        Ok(LoginSession {
            token: client.token,
            topic: client.topic,
            certificate_id: client.certificate_id,
        })
    }

    /// Fetches the account's device list.
    ///
    /// Entries that cannot be used (missing identifier, SKU or topic) are
    /// skipped with a debug log rather than failing the batch.
    pub(crate) async fn device_list(&self, token: &str) -> Result<Vec<DeviceRecord>, Error> {
        let body = serde_json::json!({
            "key": "",
            "transaction": transaction_millis(),
            "view": 0,
        });

        let response = self
            .request(PlatformConfig::DEVICE_LIST_PATH, Some(token))
            .json(&body)
            .send()
            .await
            .map_err(TransportError::Http)?
            .error_for_status()
            .map_err(TransportError::Http)?;

        let text = response.text().await.map_err(TransportError::Http)?;
        let parsed: DeviceListResponse =
            serde_json::from_str(&text).map_err(|source| ProtocolError::MalformedResponse {
                endpoint: "device-list",
                source,
            })?;

        if parsed.status != 200 {
            return Err(ProtocolError::Status {
                endpoint: "device-list",
                status: parsed.status,
            }
            .into());
        }

        Ok(parsed
            .devices
            .into_iter()
            .filter_map(DeviceRecord::from_raw)
            .collect())
    }

    fn request(&self, path: &str, token: Option<&str>) -> reqwest::RequestBuilder {
        let mut request = self
            .http
            .post(format!("{}{path}", self.config.rest_base_url()))
            .header("x-api-key", self.config.api_key())
            .header("country", self.config.country())
            .header("Accept-Language", self.config.language())
            .header("timezone", self.config.timezone())
            .header("appVersion", self.config.app_version())
            .header("clientId", &self.client_id)
            .header("clientType", self.config.client_type())
            .header("User-Agent", self.config.user_agent())
            .header("timestamp", transaction_millis().to_string());

        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        request
    }
}

/// The usable outcome of a login exchange.
#[derive(Debug, Clone)]
pub(crate) struct LoginSession {
    pub(crate) token: String,
    pub(crate) topic: String,
    pub(crate) certificate_id: String,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    status: i64,
    #[serde(default)]
    message: String,
    #[serde(default)]
    client: Option<LoginClient>,
}

#[derive(Debug, Deserialize)]
struct LoginClient {
    token: String,
    topic: String,
    #[serde(rename = "A")]
    certificate_id: String,
}

#[derive(Debug, Deserialize)]
struct DeviceListResponse {
    status: i64,
    #[serde(default)]
    devices: Vec<RawDevice>,
}

/// A device entry as returned by the device-list endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct RawDevice {
    #[serde(default)]
    device: String,
    #[serde(default)]
    sku: String,
    #[serde(rename = "deviceName", default)]
    device_name: String,
    #[serde(rename = "deviceExt", default)]
    device_ext: Option<RawDeviceExt>,
}

/// The `deviceExt` member nests further JSON documents as *strings*.
#[derive(Debug, Deserialize)]
struct RawDeviceExt {
    #[serde(rename = "deviceSettings", default)]
    device_settings: String,
    #[serde(rename = "lastDeviceData", default)]
    last_device_data: String,
}

#[derive(Debug, Deserialize)]
struct DeviceSettings {
    #[serde(default)]
    topic: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LastDeviceData {
    #[serde(default)]
    online: Option<bool>,
}

/// A validated device-list entry.
#[derive(Debug, Clone)]
pub(crate) struct DeviceRecord {
    pub(crate) identifier: String,
    pub(crate) sku: String,
    pub(crate) name: String,
    pub(crate) topic: String,
    pub(crate) connectivity: Connectivity,
}

impl DeviceRecord {
    pub(crate) fn from_raw(raw: RawDevice) -> Option<Self> {
        if raw.device.is_empty() || raw.sku.is_empty() {
            tracing::debug!("Skipping device-list entry without identifier or SKU");
            return None;
        }

        let Some(ext) = raw.device_ext else {
            tracing::debug!(device = %raw.device, "Skipping device-list entry without deviceExt");
            return None;
        };

        let topic = serde_json::from_str::<DeviceSettings>(&ext.device_settings)
            .ok()
            .and_then(|settings| settings.topic)
            .filter(|topic| !topic.is_empty());
        let Some(topic) = topic else {
            tracing::debug!(device = %raw.device, "Skipping device-list entry without topic");
            return None;
        };

        let online = serde_json::from_str::<LastDeviceData>(&ext.last_device_data)
            .ok()
            .and_then(|data| data.online);

        Some(Self {
            identifier: raw.device,
            sku: raw.sku,
            name: raw.device_name,
            topic,
            connectivity: Connectivity::from_online_flag(online),
        })
    }
}
