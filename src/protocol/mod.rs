// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Protocol implementations for the Govee cloud.
//!
//! Two transports are involved: a REST API for login and device listing, and
//! an MQTT broker for state updates and commands. The broker side is behind
//! the [`BrokerConnector`]/[`BrokerClient`] traits so that the session logic
//! is independent of the concrete MQTT stack; [`IotBrokerConnector`] is the
//! production implementation for the AWS IoT endpoint.

mod broker;
pub(crate) mod rest;

pub use broker::IotBrokerConnector;

use std::future::Future;

use tokio::sync::mpsc;

use crate::cert::TlsIdentity;
use crate::error::TransportError;

/// Parameters for establishing a broker connection.
#[derive(Debug)]
pub struct BrokerParams {
    /// MQTT client identifier (the session's stable client id).
    pub client_id: String,
    /// Account topic to subscribe to.
    pub subscribe_topic: String,
    /// TLS material for the mutual-TLS connection.
    pub identity: TlsIdentity,
}

/// An established broker connection.
///
/// Publishing addresses arbitrary topics (one per device); the subscription
/// made at connect time is fixed for the lifetime of the connection.
pub trait BrokerClient: Send + Sync + 'static {
    /// Publishes a payload to a topic.
    fn publish(
        &self,
        topic: &str,
        payload: Vec<u8>,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Tears the connection down, best-effort.
    fn disconnect(&self) -> impl Future<Output = ()> + Send;
}

/// Establishes broker connections.
///
/// Inbound message payloads (UTF-8 JSON) are forwarded into the `inbound`
/// channel for as long as the connection lives.
pub trait BrokerConnector: Send + Sync + 'static {
    /// The connection type produced by this connector.
    type Client: BrokerClient;

    /// Connects, subscribes to the account topic, and starts forwarding
    /// inbound messages.
    fn connect(
        &self,
        params: BrokerParams,
        inbound: mpsc::Sender<String>,
    ) -> impl Future<Output = Result<Self::Client, TransportError>> + Send;
}

/// Returns the current time in milliseconds, used as the per-request
/// transaction marker.
pub(crate) fn transaction_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
