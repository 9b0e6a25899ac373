// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Cloud session: login lifecycle, device registry and command dispatch.
//!
//! A [`Session`] owns the credentials, the login token, the device registry
//! and the broker subscription. It moves between two states: unauthenticated
//! (no usable token) and authenticated (token, account topic and a live
//! broker subscription, all established together). Every operation that
//! needs the platform re-enters the login gate first, so an expired token is
//! renewed transparently and exactly once even under concurrent calls.
//!
//! State updates arrive asynchronously over the broker; commands never get a
//! synchronous reply. Cached device state therefore changes only when the
//! device confirms a command with a status update.

mod auth;

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{Mutex, RwLock, broadcast, mpsc};

use crate::cert::{CertificateStore, DirCertificateStore};
use crate::command::{Command, CommandEnvelope};
use crate::config::PlatformConfig;
use crate::device::{Device, StateDelta, kind_for_sku};
use crate::error::{AuthError, Error, Result, TransportError};
use crate::event::{DeviceEvent, EventBus};
use crate::protocol::rest::{DeviceRecord, LoginSession, RestClient};
use crate::protocol::{BrokerClient, BrokerConnector, BrokerParams, IotBrokerConnector};
use crate::protocol::transaction_millis;
use crate::types::{Brightness, ColorTemperature, RgbColor};

/// Capacity of the inbound broker-message channel.
const INBOUND_CHANNEL_CAPACITY: usize = 64;

/// A session with the Govee cloud platform.
///
/// Cheaply cloneable; clones share the same registry, token and broker
/// connection.
///
/// # Examples
///
/// ```no_run
/// use govee_cloud::Session;
/// use govee_cloud::cert::DirCertificateStore;
///
/// # async fn example() -> govee_cloud::Result<()> {
/// let session = Session::builder("user@example.com", "secret")
///     .with_certificate_store(DirCertificateStore::new("cert"))
///     .build()?;
///
/// let mut events = session.subscribe();
/// session.update_device_list().await?;
///
/// for device in session.devices().await {
///     session.turn(device.identifier(), true).await?;
/// }
/// # Ok(())
/// # }
/// ```
pub struct Session<C: BrokerConnector = IotBrokerConnector> {
    inner: Arc<SessionInner<C>>,
}

struct SessionInner<C: BrokerConnector> {
    email: String,
    password: String,
    client_id: String,
    rest: RestClient,
    certificates: Box<dyn CertificateStore>,
    connector: C,
    auth: Mutex<AuthState>,
    devices: RwLock<HashMap<String, Device>>,
    broker: Mutex<Option<C::Client>>,
    events: EventBus,
}

/// Token, topic and certificate id of the current login.
///
/// The three are set together after a fully established session and cleared
/// together on any failure, so a present token always comes with a live
/// subscription topic.
#[derive(Debug, Default)]
struct AuthState {
    token: Option<String>,
    topic: Option<String>,
    certificate_id: Option<String>,
}

impl AuthState {
    fn is_valid(&self) -> bool {
        match (&self.token, &self.topic, &self.certificate_id) {
            (Some(token), Some(_), Some(_)) => auth::token_is_valid(token, Utc::now()),
            _ => false,
        }
    }

    fn set(&mut self, login: LoginSession) {
        self.token = Some(login.token);
        self.topic = Some(login.topic);
        self.certificate_id = Some(login.certificate_id);
    }

    fn clear(&mut self) {
        self.token = None;
        self.topic = None;
        self.certificate_id = None;
    }
}

impl Session<IotBrokerConnector> {
    /// Creates a builder for a session with the given account credentials.
    #[must_use]
    pub fn builder(email: impl Into<String>, password: impl Into<String>) -> SessionBuilder {
        SessionBuilder::new(email, password)
    }
}

impl<C: BrokerConnector> Session<C> {
    /// Returns the stable 32-character client id of this session.
    ///
    /// Persist it and pass it to
    /// [`with_client_id`](SessionBuilder::with_client_id) on the next run so
    /// the platform sees the same client.
    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.inner.client_id
    }

    /// Subscribes to device events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<DeviceEvent> {
        self.inner.events.subscribe()
    }

    /// Logs in to the platform, establishing the broker subscription.
    ///
    /// Idempotent: an already valid session is left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Protocol`] when the platform rejects the login,
    /// [`Error::Auth`] when the returned token is unusable or certificate
    /// material is missing, and [`Error::Transport`] on network failures.
    pub async fn login(&self) -> Result<()> {
        self.ensure_session().await.map(|_| ())
    }

    /// Returns `true` if the session currently holds a valid token and a
    /// live broker connection.
    pub async fn is_authenticated(&self) -> bool {
        self.inner.auth.lock().await.is_valid() && self.inner.broker.lock().await.is_some()
    }

    /// Fetches the account's device list, reconciles it into the registry
    /// and requests a status report from every registered device.
    ///
    /// Previously unseen devices produce a [`DeviceEvent::NewDevice`]; known
    /// devices only have their display name refreshed, keeping live state.
    ///
    /// # Errors
    ///
    /// Fails with the same error classes as [`login`](Self::login), plus
    /// [`Error::Protocol`] when the device-list endpoint rejects the call.
    pub async fn update_device_list(&self) -> Result<()> {
        self.refresh_registry().await?;

        let targets: Vec<String> = {
            let devices = self.inner.devices.read().await;
            devices.values().map(|d| d.topic().to_string()).collect()
        };
        for topic in targets {
            self.publish_to(&topic, &Command::StatusRequest).await?;
        }
        Ok(())
    }

    /// Returns snapshots of all registered devices.
    pub async fn devices(&self) -> Vec<Device> {
        self.inner.devices.read().await.values().cloned().collect()
    }

    /// Returns a snapshot of one device.
    pub async fn device(&self, identifier: &str) -> Option<Device> {
        self.inner.devices.read().await.get(identifier).cloned()
    }

    /// Switches a device on or off.
    ///
    /// A request matching the cached power state emits nothing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DeviceNotFound`] for an unknown identifier, plus the
    /// login-gate error classes.
    pub async fn turn(&self, identifier: &str, on: bool) -> Result<()> {
        self.ensure_session().await?;
        let target = {
            let devices = self.inner.devices.read().await;
            let device = devices.get(identifier).ok_or(Error::DeviceNotFound)?;
            device
                .encode_turn(on)
                .map(|command| (device.topic().to_string(), command))
        };
        self.publish_target(target).await
    }

    /// Toggles a device's power state.
    ///
    /// Unknown power is treated as off, so toggling a fresh device turns it
    /// on.
    ///
    /// # Errors
    ///
    /// Same classes as [`turn`](Self::turn).
    pub async fn toggle(&self, identifier: &str) -> Result<()> {
        self.ensure_session().await?;
        let target = {
            let devices = self.inner.devices.read().await;
            let device = devices.get(identifier).ok_or(Error::DeviceNotFound)?;
            device
                .encode_toggle()
                .map(|command| (device.topic().to_string(), command))
        };
        self.publish_target(target).await
    }

    /// Sets a device's brightness as a fraction between 0.0 and 1.0.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Value`] for an out-of-range fraction, plus the same
    /// classes as [`turn`](Self::turn).
    pub async fn set_brightness(&self, identifier: &str, fraction: f64) -> Result<()> {
        let level = Brightness::from_fraction(fraction)?;
        self.ensure_session().await?;
        let target = {
            let devices = self.inner.devices.read().await;
            let device = devices.get(identifier).ok_or(Error::DeviceNotFound)?;
            device
                .encode_brightness(level)
                .map(|command| (device.topic().to_string(), command))
        };
        self.publish_target(target).await
    }

    /// Sets the color of an RGB-capable device.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapabilityNotSupported`] for white-only devices,
    /// plus the same classes as [`turn`](Self::turn).
    pub async fn set_color(&self, identifier: &str, color: RgbColor) -> Result<()> {
        self.ensure_session().await?;
        let target = {
            let devices = self.inner.devices.read().await;
            let device = devices.get(identifier).ok_or(Error::DeviceNotFound)?;
            if !device.kind().supports_color() {
                return Err(Error::CapabilityNotSupported);
            }
            device
                .encode_color(color)
                .map(|command| (device.topic().to_string(), command))
        };
        self.publish_target(target).await
    }

    /// Sets the white color temperature of an RGB-capable device.
    ///
    /// The value is clamped to the supported 2000-9000 K range. The wire
    /// command carries both the kelvin label and the RGB rendering computed
    /// by [`kelvin_to_rgb`](crate::types::kelvin_to_rgb).
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapabilityNotSupported`] for white-only devices,
    /// plus the same classes as [`turn`](Self::turn).
    pub async fn set_color_temperature(&self, identifier: &str, kelvin: u16) -> Result<()> {
        let temperature = ColorTemperature::clamped(kelvin);
        self.ensure_session().await?;
        let target = {
            let devices = self.inner.devices.read().await;
            let device = devices.get(identifier).ok_or(Error::DeviceNotFound)?;
            if !device.kind().supports_color() {
                return Err(Error::CapabilityNotSupported);
            }
            device
                .encode_color_temperature(temperature)
                .map(|command| (device.topic().to_string(), command))
        };
        self.publish_target(target).await
    }

    /// Requests a status report from a device.
    ///
    /// There is no documented status query; an empty `turn` command is the
    /// observed surrogate that makes the device publish its state.
    ///
    /// # Errors
    ///
    /// Same classes as [`turn`](Self::turn).
    pub async fn request_status(&self, identifier: &str) -> Result<()> {
        self.ensure_session().await?;
        let topic = {
            let devices = self.inner.devices.read().await;
            let device = devices.get(identifier).ok_or(Error::DeviceNotFound)?;
            device.topic().to_string()
        };
        self.publish_to(&topic, &Command::StatusRequest).await
    }

    // =========================================================================
    // Login gate
    // =========================================================================

    /// Ensures a valid token and live broker subscription, returning the
    /// token.
    ///
    /// Holds the auth lock for the whole exchange so concurrent callers
    /// cannot race a second login.
    async fn ensure_session(&self) -> Result<String> {
        let mut auth = self.inner.auth.lock().await;

        if auth.is_valid() && self.inner.broker.lock().await.is_some() {
            // Checked right above
            return Ok(auth.token.clone().unwrap_or_default());
        }

        tracing::debug!("Establishing a new session");
        let login = self
            .inner
            .rest
            .login(&self.inner.email, &self.inner.password)
            .await?;

        if !auth::token_is_valid(&login.token, Utc::now()) {
            auth.clear();
            tracing::warn!("Login returned an unusable token");
            return Err(AuthError::InvalidToken.into());
        }

        let identity = match self.inner.certificates.load(&login.certificate_id) {
            Ok(identity) => identity,
            Err(e) => {
                auth.clear();
                return Err(e.into());
            }
        };

        // Replace any previous broker connection with one bound to the new
        // certificate pair and topic. Disconnect is best-effort.
        let mut broker = self.inner.broker.lock().await;
        if let Some(previous) = broker.take() {
            previous.disconnect().await;
        }

        let (inbound_tx, inbound_rx) = mpsc::channel(INBOUND_CHANNEL_CAPACITY);
        let params = BrokerParams {
            client_id: self.inner.client_id.clone(),
            subscribe_topic: login.topic.clone(),
            identity,
        };
        match self.inner.connector.connect(params, inbound_tx).await {
            Ok(client) => *broker = Some(client),
            Err(e) => {
                auth.clear();
                return Err(e.into());
            }
        }
        drop(broker);

        let token = login.token.clone();
        auth.set(login);
        self.spawn_inbound_task(inbound_rx);

        tracing::info!("Session established");
        Ok(token)
    }

    // =========================================================================
    // Registry
    // =========================================================================

    /// Fetches the device list and reconciles it into the registry.
    async fn refresh_registry(&self) -> Result<()> {
        let token = self.ensure_session().await?;
        let records = self.inner.rest.device_list(&token).await?;
        self.reconcile(records).await;
        Ok(())
    }

    /// Merges a device-list snapshot into the registry without discarding
    /// live state. Registered identifiers are never removed.
    async fn reconcile(&self, records: Vec<DeviceRecord>) {
        let mut added = Vec::new();
        {
            let mut devices = self.inner.devices.write().await;
            for record in records {
                if let Some(device) = devices.get_mut(&record.identifier) {
                    device.set_name(record.name);
                } else {
                    let Some(kind) = kind_for_sku(&record.sku) else {
                        tracing::debug!(
                            sku = %record.sku,
                            device = %record.identifier,
                            "Skipping unrecognized SKU family"
                        );
                        continue;
                    };
                    let device = Device::new(
                        kind,
                        record.identifier.clone(),
                        record.topic,
                        record.sku,
                        record.name,
                        record.connectivity,
                    );
                    added.push(device.clone());
                    devices.insert(record.identifier, device);
                }
            }
        }

        for device in added {
            tracing::info!(
                identifier = %device.identifier(),
                kind = device.kind().friendly_name(),
                "New device registered"
            );
            self.inner.events.publish(DeviceEvent::NewDevice { device });
        }
    }

    // =========================================================================
    // Inbound messages
    // =========================================================================

    fn spawn_inbound_task(&self, mut inbound_rx: mpsc::Receiver<String>) {
        let session = self.clone();
        tokio::spawn(async move {
            while let Some(payload) = inbound_rx.recv().await {
                session.handle_broker_message(&payload).await;
            }
            tracing::debug!("Inbound message task stopped");
        });
    }

    /// Processes one inbound broker payload.
    ///
    /// Decode failures drop the message; an unknown device identifier
    /// triggers a single registry refresh before the message is given up on.
    async fn handle_broker_message(&self, payload: &str) {
        let envelope: InboundEnvelope = match serde_json::from_str(payload) {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::debug!(error = %e, "Dropping unparseable broker message");
                return;
            }
        };
        // Messages without a state member are not status updates
        let Some(state) = envelope.state else { return };

        let delta = match StateDelta::from_value(state) {
            Ok(delta) => delta,
            Err(e) => {
                tracing::debug!(error = %e, "Dropping undecodable state update");
                return;
            }
        };

        let known = self.inner.devices.read().await.contains_key(delta.device());
        if !known {
            tracing::debug!(
                device = %delta.device(),
                "Status update for unknown device, refreshing registry"
            );
            if let Err(e) = self.refresh_registry().await {
                tracing::warn!(error = %e, "Registry refresh failed during status recovery");
                return;
            }
        }

        let updated = {
            let mut devices = self.inner.devices.write().await;
            devices.get_mut(delta.device()).map(|device| {
                device.apply_delta(&delta);
                device.clone()
            })
        };

        match updated {
            Some(device) => {
                self.inner
                    .events
                    .publish(DeviceEvent::DeviceUpdated { device });
            }
            None => {
                tracing::debug!(
                    device = %delta.device(),
                    "Dropping status update for unregistered device"
                );
            }
        }
    }

    // =========================================================================
    // Publishing
    // =========================================================================

    async fn publish_target(&self, target: Option<(String, Command)>) -> Result<()> {
        match target {
            Some((topic, command)) => self.publish_to(&topic, &command).await,
            // The request matches the cached state
            None => Ok(()),
        }
    }

    async fn publish_to(&self, topic: &str, command: &Command) -> Result<()> {
        let account_topic = self
            .inner
            .auth
            .lock()
            .await
            .topic
            .clone()
            .ok_or(TransportError::NotConnected)?;
        let envelope = CommandEnvelope::new(&account_topic, transaction_millis(), command);

        let broker = self.inner.broker.lock().await;
        let client = broker.as_ref().ok_or(TransportError::NotConnected)?;
        client.publish(topic, envelope.to_payload()).await?;
        Ok(())
    }
}

impl<C: BrokerConnector> Clone for Session<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C: BrokerConnector> std::fmt::Debug for Session<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("email", &self.inner.email)
            .field("client_id", &self.inner.client_id)
            .finish_non_exhaustive()
    }
}

/// Envelope of an inbound broker message.
///
/// The `msg` and `proType` members also present on the wire carry no
/// information this layer uses.
#[derive(Debug, serde::Deserialize)]
struct InboundEnvelope {
    #[serde(default)]
    state: Option<serde_json::Value>,
}

/// Builder for [`Session`].
///
/// # Examples
///
/// ```no_run
/// use govee_cloud::{PlatformConfig, Session};
/// use govee_cloud::cert::DirCertificateStore;
///
/// let session = Session::builder("user@example.com", "secret")
///     .with_client_id("4182b33c732fd9c54e7b6e9ef47613cf")
///     .with_config(PlatformConfig::default())
///     .with_certificate_store(DirCertificateStore::new("cert"))
///     .build()
///     .unwrap();
/// ```
pub struct SessionBuilder {
    email: String,
    password: String,
    client_id: Option<String>,
    config: PlatformConfig,
    certificates: Option<Box<dyn CertificateStore>>,
}

impl SessionBuilder {
    fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            client_id: None,
            config: PlatformConfig::default(),
            certificates: None,
        }
    }

    /// Reuses a client id from a previous run.
    ///
    /// Anything other than a 32-character id is discarded and replaced by a
    /// freshly generated one.
    #[must_use]
    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    /// Overrides the platform configuration.
    #[must_use]
    pub fn with_config(mut self, config: PlatformConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the certificate store (default: a [`DirCertificateStore`] over
    /// the `cert` directory).
    #[must_use]
    pub fn with_certificate_store(mut self, store: impl CertificateStore) -> Self {
        self.certificates = Some(Box::new(store));
        self
    }

    /// Builds a session using the production AWS IoT broker connector.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] if the HTTP client cannot be created.
    pub fn build(self) -> Result<Session<IotBrokerConnector>> {
        let connector = IotBrokerConnector::new(self.config.broker().clone());
        self.build_with_connector(connector)
    }

    /// Builds a session with a custom broker connector.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] if the HTTP client cannot be created.
    pub fn build_with_connector<C: BrokerConnector>(self, connector: C) -> Result<Session<C>> {
        let client_id = auth::normalize_client_id(self.client_id);
        let config = Arc::new(self.config);
        let rest = RestClient::new(Arc::clone(&config), client_id.clone())
            .map_err(Error::Transport)?;
        let certificates = self
            .certificates
            .unwrap_or_else(|| Box::new(DirCertificateStore::new("cert")));

        Ok(Session {
            inner: Arc::new(SessionInner {
                email: self.email,
                password: self.password,
                client_id,
                rest,
                certificates,
                connector,
                auth: Mutex::new(AuthState::default()),
                devices: RwLock::new(HashMap::new()),
                broker: Mutex::new(None),
                events: EventBus::new(),
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_keeps_valid_client_id() {
        let session = Session::builder("user@example.com", "secret")
            .with_client_id("4182b33c732fd9c54e7b6e9ef47613cf")
            .build()
            .unwrap();
        assert_eq!(session.client_id(), "4182b33c732fd9c54e7b6e9ef47613cf");
    }

    #[test]
    fn builder_replaces_invalid_client_id() {
        let session = Session::builder("user@example.com", "secret")
            .with_client_id("short")
            .build()
            .unwrap();
        assert_eq!(session.client_id().len(), 32);
        assert_ne!(session.client_id(), "short");
    }

    #[test]
    fn builder_generates_client_id_when_absent() {
        let session = Session::builder("user@example.com", "secret")
            .build()
            .unwrap();
        assert_eq!(session.client_id().len(), 32);
    }

    #[tokio::test]
    async fn fresh_session_is_unauthenticated() {
        let session = Session::builder("user@example.com", "secret")
            .build()
            .unwrap();
        assert!(!session.is_authenticated().await);
        assert!(session.devices().await.is_empty());
    }

    #[test]
    fn auth_state_validity_requires_token_and_topic() {
        let mut state = AuthState::default();
        assert!(!state.is_valid());

        let exp = Utc::now().timestamp() + 3600;
        state.set(LoginSession {
            token: auth::token_with_claims(&serde_json::json!({"exp": exp})),
            topic: "GA/abc".to_string(),
            certificate_id: "testiot.cert".to_string(),
        });
        assert!(state.is_valid());

        state.clear();
        assert!(!state.is_valid());
    }

    #[test]
    fn auth_state_expired_token_is_invalid() {
        let mut state = AuthState::default();
        let exp = Utc::now().timestamp() - 10;
        state.set(LoginSession {
            token: auth::token_with_claims(&serde_json::json!({"exp": exp})),
            topic: "GA/abc".to_string(),
            certificate_id: "testiot.cert".to_string(),
        });
        assert!(!state.is_valid());
    }
}
