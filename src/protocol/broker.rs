// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! AWS IoT broker connection.
//!
//! The Govee platform fronts device messaging with an AWS IoT MQTT endpoint
//! that requires mutual TLS with the per-account certificate pair and the
//! `x-amzn-mqtt-ca` ALPN protocol. One connection per session, subscribed to
//! the account topic; commands publish to per-device topics over the same
//! connection.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Packet, QoS, TlsConfiguration, Transport};
use tokio::sync::{mpsc, oneshot};

use crate::config::BrokerConfig;
use crate::error::TransportError;

use super::{BrokerClient, BrokerConnector, BrokerParams};

/// Connector for the AWS IoT broker endpoint.
///
/// This is the production [`BrokerConnector`]; the session uses it by
/// default.
#[derive(Debug, Clone)]
pub struct IotBrokerConnector {
    config: BrokerConfig,
}

impl IotBrokerConnector {
    /// Creates a connector for the given broker configuration.
    #[must_use]
    pub fn new(config: BrokerConfig) -> Self {
        Self { config }
    }
}

impl BrokerConnector for IotBrokerConnector {
    type Client = IotBrokerClient;

    async fn connect(
        &self,
        params: BrokerParams,
        inbound: mpsc::Sender<String>,
    ) -> Result<IotBrokerClient, TransportError> {
        let mut options =
            MqttOptions::new(&params.client_id, self.config.host(), self.config.port());
        options.set_keep_alive(self.config.keep_alive());
        options.set_clean_session(true);
        options.set_transport(Transport::Tls(TlsConfiguration::Simple {
            ca: params.identity.root_ca.clone(),
            alpn: Some(vec![self.config.alpn_protocol().as_bytes().to_vec()]),
            client_auth: Some((
                params.identity.certificate.clone(),
                params.identity.private_key.clone(),
            )),
        }));

        let (client, event_loop) = AsyncClient::new(options, 10);
        let closed = Arc::new(AtomicBool::new(false));
        let (connack_tx, connack_rx) = oneshot::channel();

        tokio::spawn(run_event_loop(
            event_loop,
            client.clone(),
            params.subscribe_topic,
            inbound,
            Arc::clone(&closed),
            connack_tx,
            self.config.clone(),
        ));

        let timeout = self.config.connection_timeout();
        match tokio::time::timeout(timeout, connack_rx).await {
            Ok(Ok(())) => {
                tracing::info!(host = %self.config.host(), "Connected to message broker");
                Ok(IotBrokerClient { client, closed })
            }
            Ok(Err(_)) => Err(TransportError::ConnectionFailed(
                "broker event loop terminated before the connection was acknowledged".to_string(),
            )),
            Err(_) => {
                closed.store(true, Ordering::Release);
                let _ = client.disconnect().await;
                // Safe: practical timeouts never exceed u64::MAX milliseconds
                #[allow(clippy::cast_possible_truncation)]
                let timeout_ms = timeout.as_millis() as u64;
                Err(TransportError::Timeout(timeout_ms))
            }
        }
    }
}

/// An established AWS IoT broker connection.
#[derive(Debug, Clone)]
pub struct IotBrokerClient {
    client: AsyncClient,
    closed: Arc<AtomicBool>,
}

impl BrokerClient for IotBrokerClient {
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<(), TransportError> {
        tracing::debug!(topic = %topic, "Publishing command");
        self.client
            .publish(topic, QoS::AtMostOnce, false, payload)
            .await
            .map_err(TransportError::Mqtt)
    }

    async fn disconnect(&self) {
        self.closed.store(true, Ordering::Release);
        if let Err(e) = self.client.disconnect().await {
            tracing::debug!(error = %e, "Broker disconnect failed");
        }
    }
}

/// Drives the MQTT event loop until the connection is closed.
///
/// The account-topic subscription is re-issued on every CONNACK so that it
/// survives automatic reconnects. Poll errors back off exponentially between
/// the configured bounds.
async fn run_event_loop(
    mut event_loop: EventLoop,
    client: AsyncClient,
    topic: String,
    inbound: mpsc::Sender<String>,
    closed: Arc<AtomicBool>,
    connack_tx: oneshot::Sender<()>,
    config: BrokerConfig,
) {
    let mut connack_tx = Some(connack_tx);
    let mut backoff = config.reconnect_min_delay();

    loop {
        if closed.load(Ordering::Acquire) {
            break;
        }

        match event_loop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(_))) => {
                backoff = config.reconnect_min_delay();
                if let Err(e) = client.subscribe(&topic, QoS::AtMostOnce).await {
                    tracing::warn!(topic = %topic, error = %e, "Account topic subscription failed");
                }
                if let Some(tx) = connack_tx.take() {
                    let _ = tx.send(());
                }
            }
            Ok(Event::Incoming(Packet::Publish(publish))) => {
                match String::from_utf8(publish.payload.to_vec()) {
                    Ok(payload) => {
                        tracing::debug!(topic = %publish.topic, "Broker message received");
                        if inbound.send(payload).await.is_err() {
                            // The session side is gone
                            break;
                        }
                    }
                    Err(_) => {
                        tracing::debug!(topic = %publish.topic, "Dropping non-UTF-8 payload");
                    }
                }
            }
            Ok(Event::Incoming(Packet::Disconnect)) => {
                if closed.load(Ordering::Acquire) {
                    break;
                }
                tracing::info!("Broker requested disconnect, reconnecting");
            }
            Ok(_) => {}
            Err(e) => {
                if closed.load(Ordering::Acquire) {
                    break;
                }
                tracing::warn!(error = %e, delay = ?backoff, "Broker connection lost, retrying");
                tokio::time::sleep(backoff).await;
                backoff = (backoff * 2).min(config.reconnect_max_delay());
            }
        }
    }

    tracing::debug!("Broker event loop stopped");
}
