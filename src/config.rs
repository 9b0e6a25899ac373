// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Platform configuration.
//!
//! The Govee cloud endpoints, API key and request headers are fixed values
//! observed from the vendor's mobile app. They are collected in a single
//! immutable [`PlatformConfig`] constructed once per [`Session`](crate::Session)
//! instead of living as process-wide globals, so tests and regional variants
//! can substitute their own values.

use std::time::Duration;

/// Configuration for the Govee cloud platform.
///
/// The defaults match the production endpoints. Override the REST base URL
/// or broker settings only for testing or when the vendor moves endpoints.
///
/// # Examples
///
/// ```
/// use govee_cloud::PlatformConfig;
///
/// let config = PlatformConfig::default();
/// assert_eq!(config.rest_base_url(), "https://app.govee.com");
/// assert_eq!(config.broker().port(), 8883);
/// ```
#[derive(Debug, Clone)]
pub struct PlatformConfig {
    rest_base_url: String,
    api_key: String,
    app_version: String,
    client_type: String,
    country: String,
    language: String,
    timezone: String,
    user_agent: String,
    broker: BrokerConfig,
}

impl PlatformConfig {
    /// REST path of the login endpoint.
    pub const LOGIN_PATH: &'static str = "/account/rest/account/v1/login";

    /// REST path of the device-list endpoint.
    pub const DEVICE_LIST_PATH: &'static str = "/device/rest/devices/v1/list";

    /// Sets the REST base URL (scheme + host, no trailing slash).
    #[must_use]
    pub fn with_rest_base_url(mut self, url: impl Into<String>) -> Self {
        self.rest_base_url = url.into();
        self
    }

    /// Sets the API key attached to every REST request.
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = key.into();
        self
    }

    /// Sets the broker configuration.
    #[must_use]
    pub fn with_broker(mut self, broker: BrokerConfig) -> Self {
        self.broker = broker;
        self
    }

    /// Returns the REST base URL.
    #[must_use]
    pub fn rest_base_url(&self) -> &str {
        &self.rest_base_url
    }

    /// Returns the API key.
    #[must_use]
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Returns the app version header value.
    #[must_use]
    pub fn app_version(&self) -> &str {
        &self.app_version
    }

    /// Returns the client type header value.
    #[must_use]
    pub fn client_type(&self) -> &str {
        &self.client_type
    }

    /// Returns the country header value.
    #[must_use]
    pub fn country(&self) -> &str {
        &self.country
    }

    /// Returns the `Accept-Language` header value.
    #[must_use]
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Returns the timezone header value.
    #[must_use]
    pub fn timezone(&self) -> &str {
        &self.timezone
    }

    /// Returns the user agent header value.
    #[must_use]
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Returns the broker configuration.
    #[must_use]
    pub fn broker(&self) -> &BrokerConfig {
        &self.broker
    }
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            rest_base_url: "https://app.govee.com".to_string(),
            api_key: "m20xwttRNzBIKE8KP8wP5Mz7S61aSFa8x9cYOTU9".to_string(),
            app_version: "3.2.1".to_string(),
            client_type: "0".to_string(),
            country: "US".to_string(),
            language: "en".to_string(),
            timezone: "America/Los_Angeles".to_string(),
            user_agent: "okhttp/3.12.0".to_string(),
            broker: BrokerConfig::default(),
        }
    }
}

/// Configuration for the AWS IoT message broker connection.
///
/// # Examples
///
/// ```
/// use govee_cloud::BrokerConfig;
/// use std::time::Duration;
///
/// let broker = BrokerConfig::default()
///     .with_host("example-ats.iot.us-east-1.amazonaws.com")
///     .with_keep_alive(Duration::from_secs(60));
/// ```
#[derive(Debug, Clone)]
pub struct BrokerConfig {
    host: String,
    port: u16,
    alpn_protocol: String,
    keep_alive: Duration,
    connection_timeout: Duration,
    reconnect_min_delay: Duration,
    reconnect_max_delay: Duration,
}

impl BrokerConfig {
    /// Sets the broker host.
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Sets the broker port (default: 8883).
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the keep-alive interval (default: 30 seconds).
    #[must_use]
    pub fn with_keep_alive(mut self, duration: Duration) -> Self {
        self.keep_alive = duration;
        self
    }

    /// Sets the connection timeout (default: 10 seconds).
    #[must_use]
    pub fn with_connection_timeout(mut self, duration: Duration) -> Self {
        self.connection_timeout = duration;
        self
    }

    /// Returns the broker host.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the broker port.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Returns the ALPN protocol name required by the broker endpoint.
    #[must_use]
    pub fn alpn_protocol(&self) -> &str {
        &self.alpn_protocol
    }

    /// Returns the keep-alive interval.
    #[must_use]
    pub fn keep_alive(&self) -> Duration {
        self.keep_alive
    }

    /// Returns the connection timeout.
    #[must_use]
    pub fn connection_timeout(&self) -> Duration {
        self.connection_timeout
    }

    /// Returns the minimum reconnect backoff delay.
    #[must_use]
    pub fn reconnect_min_delay(&self) -> Duration {
        self.reconnect_min_delay
    }

    /// Returns the maximum reconnect backoff delay.
    #[must_use]
    pub fn reconnect_max_delay(&self) -> Duration {
        self.reconnect_max_delay
    }
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            host: "aqm3wd1qlc3dy-ats.iot.us-east-1.amazonaws.com".to_string(),
            port: 8883,
            alpn_protocol: "x-amzn-mqtt-ca".to_string(),
            keep_alive: Duration::from_secs(30),
            connection_timeout: Duration::from_secs(10),
            reconnect_min_delay: Duration::from_secs(1),
            reconnect_max_delay: Duration::from_secs(32),
        }
    }
}
