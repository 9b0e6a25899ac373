// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-to-end tests for the session against a mock REST backend and an
//! in-process broker double.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use tokio::sync::{Mutex, broadcast, mpsc};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use govee_cloud::cert::{StaticCertificateStore, TlsIdentity};
use govee_cloud::error::TransportError;
use govee_cloud::protocol::{BrokerClient, BrokerConnector, BrokerParams};
use govee_cloud::{
    AuthError, Connectivity, DeviceEvent, DeviceKind, Error, PlatformConfig, PowerState,
    ProtocolError, RgbColor, Session,
};

const ACCOUNT_TOPIC: &str = "GA/abfe75884b7aff2cc0e5b6d91a028d25";
const CERT_ID: &str = "testiot.cert";

// ============================================================================
// Broker double
// ============================================================================

#[derive(Debug, Clone, Default)]
struct TestBroker {
    connect_count: Arc<AtomicUsize>,
    subscribed_topics: Arc<Mutex<Vec<String>>>,
    published: Arc<Mutex<Vec<(String, serde_json::Value)>>>,
    inbound: Arc<Mutex<Option<mpsc::Sender<String>>>>,
}

impl TestBroker {
    fn connect_count(&self) -> usize {
        self.connect_count.load(Ordering::SeqCst)
    }

    async fn subscribed_topics(&self) -> Vec<String> {
        self.subscribed_topics.lock().await.clone()
    }

    async fn published(&self) -> Vec<(String, serde_json::Value)> {
        self.published.lock().await.clone()
    }

    /// Feeds a payload into the session as if the broker delivered it.
    async fn inject(&self, payload: &serde_json::Value) {
        let guard = self.inbound.lock().await;
        let sender = guard.as_ref().expect("broker not connected");
        sender.send(payload.to_string()).await.expect("session gone");
    }
}

#[derive(Debug, Clone)]
struct TestBrokerClient {
    published: Arc<Mutex<Vec<(String, serde_json::Value)>>>,
}

impl BrokerClient for TestBrokerClient {
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<(), TransportError> {
        let value = serde_json::from_slice(&payload).expect("published payload is JSON");
        self.published.lock().await.push((topic.to_string(), value));
        Ok(())
    }

    async fn disconnect(&self) {}
}

impl BrokerConnector for TestBroker {
    type Client = TestBrokerClient;

    async fn connect(
        &self,
        params: BrokerParams,
        inbound: mpsc::Sender<String>,
    ) -> Result<TestBrokerClient, TransportError> {
        self.connect_count.fetch_add(1, Ordering::SeqCst);
        self.subscribed_topics
            .lock()
            .await
            .push(params.subscribe_topic);
        *self.inbound.lock().await = Some(inbound);
        Ok(TestBrokerClient {
            published: Arc::clone(&self.published),
        })
    }
}

// ============================================================================
// Fixtures
// ============================================================================

fn future_token() -> String {
    let exp = chrono::Utc::now().timestamp() + 3600;
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(
        serde_json::json!({"data": {"sid": "mvpBsGhBR7PgCp4gk37b3qC7gVEELnib"}, "exp": exp})
            .to_string()
            .as_bytes(),
    );
    format!("{header}.{payload}.signature")
}

fn login_body(token: &str) -> serde_json::Value {
    serde_json::json!({
        "message": "Login successful",
        "status": 200,
        "client": {
            "A": CERT_ID,
            "B": "testIot",
            "accountId": 78440,
            "client": "4182b33c732fd9c54e7b6e9ef47613cf",
            "clientType": "0",
            "token": token,
            "topic": ACCOUNT_TOPIC,
        },
    })
}

fn device_entry(
    identifier: &str,
    sku: &str,
    name: &str,
    topic: &str,
    online: Option<bool>,
) -> serde_json::Value {
    let settings = serde_json::json!({
        "topic": topic,
        "sku": sku,
        "device": identifier,
        "deviceName": name,
        "wifiName": "MyWifi",
    });
    let last_data = match online {
        Some(flag) => serde_json::json!({"online": flag}).to_string(),
        None => "{}".to_string(),
    };

    serde_json::json!({
        "device": identifier,
        "sku": sku,
        "deviceName": name,
        "goodsType": 0,
        "deviceExt": {
            "deviceSettings": settings.to_string(),
            "lastDeviceData": last_data,
            "extResources": "{\"skuUrl\":\"\"}",
        },
    })
}

fn device_list_body(devices: &[serde_json::Value]) -> serde_json::Value {
    serde_json::json!({
        "devices": devices,
        "message": "",
        "status": 200,
    })
}

async fn mock_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/account/rest/account/v1/login"))
        .and(header("x-api-key", "m20xwttRNzBIKE8KP8wP5Mz7S61aSFa8x9cYOTU9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(login_body(&future_token())))
        .mount(server)
        .await;
}

async fn mock_device_list(server: &MockServer, devices: &[serde_json::Value]) {
    Mock::given(method("POST"))
        .and(path("/device/rest/devices/v1/list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(device_list_body(devices)))
        .mount(server)
        .await;
}

fn test_session(server: &MockServer, broker: &TestBroker) -> Session<TestBroker> {
    let store = StaticCertificateStore::new().with_identity(
        CERT_ID,
        TlsIdentity {
            certificate: b"cert".to_vec(),
            private_key: b"key".to_vec(),
            root_ca: b"ca".to_vec(),
        },
    );

    Session::builder("user@example.com", "secret")
        .with_config(PlatformConfig::default().with_rest_base_url(server.uri()))
        .with_certificate_store(store)
        .build_with_connector(broker.clone())
        .expect("session builds")
}

async fn next_event(events: &mut broadcast::Receiver<DeviceEvent>) -> DeviceEvent {
    tokio::time::timeout(Duration::from_secs(2), events.recv())
        .await
        .expect("timed out waiting for event")
        .expect("event channel closed")
}

async fn device_list_request_count(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|request| request.url.path() == "/device/rest/devices/v1/list")
        .count()
}

// ============================================================================
// Login lifecycle
// ============================================================================

#[tokio::test]
async fn login_establishes_session() {
    let server = MockServer::start().await;
    mock_login(&server).await;

    let broker = TestBroker::default();
    let session = test_session(&server, &broker);

    session.login().await.unwrap();

    assert!(session.is_authenticated().await);
    assert_eq!(broker.connect_count(), 1);
    assert_eq!(broker.subscribed_topics().await, vec![ACCOUNT_TOPIC]);
}

#[tokio::test]
async fn login_is_idempotent_while_token_is_valid() {
    let server = MockServer::start().await;
    mock_login(&server).await;

    let broker = TestBroker::default();
    let session = test_session(&server, &broker);

    session.login().await.unwrap();
    session.login().await.unwrap();

    assert_eq!(broker.connect_count(), 1, "no second broker connection");
}

#[tokio::test]
async fn rejected_login_leaves_session_unauthenticated() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/account/rest/account/v1/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "message": "Incorrect password",
            "status": 401,
        })))
        .mount(&server)
        .await;

    let broker = TestBroker::default();
    let session = test_session(&server, &broker);

    let err = session.login().await.unwrap_err();
    assert!(matches!(
        err,
        Error::Protocol(ProtocolError::Status { status: 401, .. })
    ));
    assert!(!session.is_authenticated().await);
    assert!(session.devices().await.is_empty());
    assert_eq!(broker.connect_count(), 0, "no broker connection attempted");
}

#[tokio::test]
async fn unusable_token_is_an_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/account/rest/account/v1/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(login_body("bad")))
        .mount(&server)
        .await;

    let broker = TestBroker::default();
    let session = test_session(&server, &broker);

    let err = session.login().await.unwrap_err();
    assert!(matches!(err, Error::Auth(AuthError::InvalidToken)));
    assert_eq!(broker.connect_count(), 0);
}

#[tokio::test]
async fn expired_token_is_an_auth_error() {
    let server = MockServer::start().await;
    let exp = chrono::Utc::now().timestamp() - 3600;
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload =
        URL_SAFE_NO_PAD.encode(serde_json::json!({"exp": exp}).to_string().as_bytes());
    let expired = format!("{header}.{payload}.signature");

    Mock::given(method("POST"))
        .and(path("/account/rest/account/v1/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(login_body(&expired)))
        .mount(&server)
        .await;

    let session = test_session(&server, &TestBroker::default());
    let err = session.login().await.unwrap_err();
    assert!(matches!(err, Error::Auth(AuthError::InvalidToken)));
}

#[tokio::test]
async fn missing_certificate_is_an_auth_error() {
    let server = MockServer::start().await;
    mock_login(&server).await;

    let broker = TestBroker::default();
    // Empty certificate store: the id named by the login response is unknown
    let session = Session::builder("user@example.com", "secret")
        .with_config(PlatformConfig::default().with_rest_base_url(server.uri()))
        .with_certificate_store(StaticCertificateStore::new())
        .build_with_connector(broker.clone())
        .unwrap();

    let err = session.login().await.unwrap_err();
    assert!(matches!(
        err,
        Error::Auth(AuthError::CertificateUnavailable { .. })
    ));
    assert!(!session.is_authenticated().await);
    assert_eq!(broker.connect_count(), 0);
}

#[tokio::test]
async fn login_sends_transaction_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/account/rest/account/v1/login"))
        .and(body_partial_json(serde_json::json!({
            "email": "user@example.com",
            "key": "",
            "password": "secret",
            "view": 0,
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(login_body(&future_token())))
        .expect(1)
        .mount(&server)
        .await;

    let session = test_session(&server, &TestBroker::default());
    session.login().await.unwrap();
}

// ============================================================================
// Registry reconciliation
// ============================================================================

#[tokio::test]
async fn update_device_list_registers_supported_devices() {
    let server = MockServer::start().await;
    mock_login(&server).await;
    mock_device_list(
        &server,
        &[
            device_entry("AA:BB:CC:DD:EE:FF:11:22", "H6159", "Kitchen light", "GD/kitchen", Some(false)),
            device_entry("A2:B2:C3:D4:E5:F6:77:88", "H6163", "Living room", "GD/living", Some(true)),
            device_entry("FF:FF:00:00:11:11:22:22", "H7022", "String lights", "GD/string", None),
        ],
    )
    .await;

    let broker = TestBroker::default();
    let session = test_session(&server, &broker);
    let mut events = session.subscribe();

    session.update_device_list().await.unwrap();

    // Exactly the two supported devices produce new-device events
    let first = next_event(&mut events).await;
    let second = next_event(&mut events).await;
    assert!(first.is_new_device());
    assert!(second.is_new_device());

    let devices = session.devices().await;
    assert_eq!(devices.len(), 2, "unsupported SKU family is skipped");

    let bulb = session.device("AA:BB:CC:DD:EE:FF:11:22").await.unwrap();
    assert_eq!(bulb.kind(), DeviceKind::RgbBulb);
    assert_eq!(bulb.name(), "Kitchen light");
    assert_eq!(bulb.state().connectivity(), Connectivity::Disconnected);

    let strip = session.device("A2:B2:C3:D4:E5:F6:77:88").await.unwrap();
    assert_eq!(strip.kind(), DeviceKind::LedStrip);
    assert_eq!(strip.state().connectivity(), Connectivity::Connected);

    // Each registered device received a status poll (empty turn command)
    let published = broker.published().await;
    assert_eq!(published.len(), 2);
    let mut topics: Vec<&str> = published.iter().map(|(t, _)| t.as_str()).collect();
    topics.sort_unstable();
    assert_eq!(topics, vec!["GD/kitchen", "GD/living"]);
    for (_, payload) in &published {
        assert_eq!(payload["msg"]["cmd"], "turn");
        assert_eq!(payload["msg"]["data"], serde_json::json!({}));
        assert_eq!(payload["msg"]["accountTopic"], ACCOUNT_TOPIC);
        assert_eq!(payload["msg"]["type"], 1);
    }
}

#[tokio::test]
async fn reconcile_renames_known_device_in_place() {
    let server = MockServer::start().await;
    mock_login(&server).await;

    let identifier = "AA:BB:CC:DD:EE:FF:11:22";
    Mock::given(method("POST"))
        .and(path("/device/rest/devices/v1/list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(device_list_body(&[
            device_entry(identifier, "H6159", "Old name", "GD/bulb", Some(true)),
        ])))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/device/rest/devices/v1/list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(device_list_body(&[
            device_entry(identifier, "H6159", "New name", "GD/bulb", Some(true)),
        ])))
        .mount(&server)
        .await;

    let broker = TestBroker::default();
    let session = test_session(&server, &broker);
    let mut events = session.subscribe();

    session.update_device_list().await.unwrap();
    assert!(next_event(&mut events).await.is_new_device());

    // Give the device some live state
    broker
        .inject(&serde_json::json!({
            "proType": 0,
            "state": {
                "onOff": 1,
                "brightness": 133,
                "connected": "true",
                "sku": "H6159",
                "device": identifier,
            },
        }))
        .await;
    assert!(!next_event(&mut events).await.is_new_device());

    session.update_device_list().await.unwrap();

    let device = session.device(identifier).await.unwrap();
    assert_eq!(device.name(), "New name");
    // Live state survived the reconcile
    assert_eq!(device.state().power(), Some(PowerState::On));
    assert_eq!(device.state().connectivity(), Connectivity::Connected);
    assert_eq!(session.devices().await.len(), 1);
}

// ============================================================================
// Inbound state updates
// ============================================================================

#[tokio::test]
async fn inbound_delta_updates_state_and_fires_event() {
    let server = MockServer::start().await;
    mock_login(&server).await;
    let identifier = "A2:B2:C3:D4:E5:F6:77:88";
    mock_device_list(
        &server,
        &[device_entry(identifier, "H6163", "Living room", "GD/living", None)],
    )
    .await;

    let broker = TestBroker::default();
    let session = test_session(&server, &broker);
    let mut events = session.subscribe();

    session.update_device_list().await.unwrap();
    assert!(next_event(&mut events).await.is_new_device());

    // An envelope without a state member is not a status update
    broker
        .inject(&serde_json::json!({"proType": 0, "msg": "{}"}))
        .await;

    broker
        .inject(&serde_json::json!({
            "proType": 0,
            "state": {
                "onOff": 1,
                "brightness": 133,
                "color": {"r": 255, "g": 215, "b": 0},
                "colorTemInKelvin": 0,
                "connected": "true",
                "sku": "H6163",
                "device": identifier,
            },
        }))
        .await;

    let event = next_event(&mut events).await;
    assert!(!event.is_new_device());
    let device = event.device();
    assert_eq!(device.state().power(), Some(PowerState::On));
    assert_eq!(device.state().color(), Some(RgbColor::new(255, 215, 0)));
    assert_eq!(device.state().color_temperature(), None);
    assert_eq!(device.state().connectivity(), Connectivity::Connected);
}

#[tokio::test]
async fn unknown_device_triggers_one_registry_refresh() {
    let server = MockServer::start().await;
    mock_login(&server).await;

    let known = "AA:BB:CC:DD:EE:FF:11:22";
    let late = "A2:B2:C3:D4:E5:F6:77:88";
    Mock::given(method("POST"))
        .and(path("/device/rest/devices/v1/list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(device_list_body(&[
            device_entry(known, "H6159", "Kitchen light", "GD/kitchen", Some(true)),
        ])))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/device/rest/devices/v1/list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(device_list_body(&[
            device_entry(known, "H6159", "Kitchen light", "GD/kitchen", Some(true)),
            device_entry(late, "H6163", "Hallway strip", "GD/hall", Some(true)),
        ])))
        .mount(&server)
        .await;

    let broker = TestBroker::default();
    let session = test_session(&server, &broker);
    let mut events = session.subscribe();

    session.update_device_list().await.unwrap();
    assert!(next_event(&mut events).await.is_new_device());

    // A delta for a device the registry has never seen
    broker
        .inject(&serde_json::json!({
            "state": {
                "onOff": 1,
                "connected": true,
                "device": late,
            },
        }))
        .await;

    // The recovery refresh registers the device, then the delta applies
    let recovered = next_event(&mut events).await;
    assert!(recovered.is_new_device());
    assert_eq!(recovered.device().identifier(), late);

    let update = next_event(&mut events).await;
    assert!(!update.is_new_device());
    assert_eq!(update.device().state().power(), Some(PowerState::On));

    assert_eq!(device_list_request_count(&server).await, 2);
}

#[tokio::test]
async fn still_unknown_device_is_dropped_after_one_refresh() {
    let server = MockServer::start().await;
    mock_login(&server).await;
    let known = "AA:BB:CC:DD:EE:FF:11:22";
    mock_device_list(
        &server,
        &[device_entry(known, "H6159", "Kitchen light", "GD/kitchen", Some(true))],
    )
    .await;

    let broker = TestBroker::default();
    let session = test_session(&server, &broker);
    let mut events = session.subscribe();

    session.update_device_list().await.unwrap();
    assert!(next_event(&mut events).await.is_new_device());

    broker
        .inject(&serde_json::json!({
            "state": {
                "onOff": 1,
                "connected": true,
                "device": "00:00:00:00:00:00:00:00",
            },
        }))
        .await;

    // No update fires for the unknown device
    let result = tokio::time::timeout(Duration::from_millis(300), events.recv()).await;
    assert!(result.is_err(), "unexpected event: {result:?}");

    // Initial fetch plus exactly one recovery attempt
    assert_eq!(device_list_request_count(&server).await, 2);
    assert!(session.device("00:00:00:00:00:00:00:00").await.is_none());
}

#[tokio::test]
async fn delta_missing_required_fields_is_dropped() {
    let server = MockServer::start().await;
    mock_login(&server).await;
    let identifier = "AA:BB:CC:DD:EE:FF:11:22";
    mock_device_list(
        &server,
        &[device_entry(identifier, "H6159", "Kitchen light", "GD/kitchen", Some(true))],
    )
    .await;

    let broker = TestBroker::default();
    let session = test_session(&server, &broker);
    let mut events = session.subscribe();

    session.update_device_list().await.unwrap();
    assert!(next_event(&mut events).await.is_new_device());

    // Missing connectivity key: hard decode failure, message discarded
    broker
        .inject(&serde_json::json!({
            "state": {"onOff": 1, "device": identifier},
        }))
        .await;

    let result = tokio::time::timeout(Duration::from_millis(300), events.recv()).await;
    assert!(result.is_err());
    // No recovery refresh for an undecodable message
    assert_eq!(device_list_request_count(&server).await, 1);
}

// ============================================================================
// Commands
// ============================================================================

/// Registers one RGB strip, feeds it a baseline state and returns the
/// session plus the publish log length after setup.
async fn strip_with_state(
    server: &MockServer,
    broker: &TestBroker,
    identifier: &str,
) -> (Session<TestBroker>, usize) {
    mock_login(server).await;
    mock_device_list(
        server,
        &[device_entry(identifier, "H6163", "Living room", "GD/living", Some(true))],
    )
    .await;

    let session = test_session(server, broker);
    let mut events = session.subscribe();
    session.update_device_list().await.unwrap();
    assert!(next_event(&mut events).await.is_new_device());

    broker
        .inject(&serde_json::json!({
            "state": {
                "onOff": 1,
                "brightness": 128,
                "color": {"r": 10, "g": 20, "b": 30},
                "connected": true,
                "device": identifier,
            },
        }))
        .await;
    next_event(&mut events).await;

    let baseline = broker.published().await.len();
    (session, baseline)
}

#[tokio::test]
async fn power_command_is_deduplicated_against_cached_state() {
    let server = MockServer::start().await;
    let broker = TestBroker::default();
    let identifier = "A2:B2:C3:D4:E5:F6:77:88";
    let (session, baseline) = strip_with_state(&server, &broker, identifier).await;

    // Cached power is on: requesting on again publishes nothing
    session.turn(identifier, true).await.unwrap();
    assert_eq!(broker.published().await.len(), baseline);

    // The opposite value publishes exactly one turn command
    session.turn(identifier, false).await.unwrap();
    let published = broker.published().await;
    assert_eq!(published.len(), baseline + 1);
    let (topic, payload) = &published[baseline];
    assert_eq!(topic, "GD/living");
    assert_eq!(payload["msg"]["cmd"], "turn");
    assert_eq!(payload["msg"]["data"], serde_json::json!({"val": false}));
}

#[tokio::test]
async fn toggle_inverts_cached_power() {
    let server = MockServer::start().await;
    let broker = TestBroker::default();
    let identifier = "A2:B2:C3:D4:E5:F6:77:88";
    let (session, baseline) = strip_with_state(&server, &broker, identifier).await;

    session.toggle(identifier).await.unwrap();
    let published = broker.published().await;
    assert_eq!(published.len(), baseline + 1);
    assert_eq!(
        published[baseline].1["msg"]["data"],
        serde_json::json!({"val": false})
    );
}

#[tokio::test]
async fn brightness_command_is_deduplicated_on_raw_value() {
    let server = MockServer::start().await;
    let broker = TestBroker::default();
    let identifier = "A2:B2:C3:D4:E5:F6:77:88";
    let (session, baseline) = strip_with_state(&server, &broker, identifier).await;

    // 128/255 rounds to the cached raw value
    session
        .set_brightness(identifier, 128.0 / 255.0)
        .await
        .unwrap();
    assert_eq!(broker.published().await.len(), baseline);

    session.set_brightness(identifier, 1.0).await.unwrap();
    let published = broker.published().await;
    assert_eq!(published.len(), baseline + 1);
    assert_eq!(published[baseline].1["msg"]["cmd"], "brightness");
    assert_eq!(
        published[baseline].1["msg"]["data"],
        serde_json::json!({"val": 255})
    );
}

#[tokio::test]
async fn color_command_is_deduplicated_channel_wise() {
    let server = MockServer::start().await;
    let broker = TestBroker::default();
    let identifier = "A2:B2:C3:D4:E5:F6:77:88";
    let (session, baseline) = strip_with_state(&server, &broker, identifier).await;

    session
        .set_color(identifier, RgbColor::new(10, 20, 30))
        .await
        .unwrap();
    assert_eq!(broker.published().await.len(), baseline);

    session
        .set_color(identifier, RgbColor::new(255, 0, 255))
        .await
        .unwrap();
    let published = broker.published().await;
    assert_eq!(published.len(), baseline + 1);
    assert_eq!(published[baseline].1["msg"]["cmd"], "color");
    assert_eq!(
        published[baseline].1["msg"]["data"],
        serde_json::json!({"red": 255, "green": 0, "blue": 255})
    );
}

#[tokio::test]
async fn color_temperature_command_carries_rgb_and_kelvin() {
    let server = MockServer::start().await;
    let broker = TestBroker::default();
    let identifier = "A2:B2:C3:D4:E5:F6:77:88";
    let (session, baseline) = strip_with_state(&server, &broker, identifier).await;

    session.set_color_temperature(identifier, 6600).await.unwrap();

    let published = broker.published().await;
    assert_eq!(published.len(), baseline + 1);
    let payload = &published[baseline].1;
    assert_eq!(payload["msg"]["cmd"], "colorTem");
    assert_eq!(payload["msg"]["data"]["colorTemInKelvin"], 6600);
    assert_eq!(payload["msg"]["data"]["color"]["red"], 255);
    assert_eq!(payload["msg"]["data"]["color"]["blue"], 255);
}

#[tokio::test]
async fn color_temperature_clamps_out_of_range_requests() {
    let server = MockServer::start().await;
    let broker = TestBroker::default();
    let identifier = "A2:B2:C3:D4:E5:F6:77:88";
    let (session, baseline) = strip_with_state(&server, &broker, identifier).await;

    session
        .set_color_temperature(identifier, 20_000)
        .await
        .unwrap();

    let published = broker.published().await;
    assert_eq!(
        published[baseline].1["msg"]["data"]["colorTemInKelvin"],
        9000
    );
}

#[tokio::test]
async fn color_commands_fail_on_white_only_devices() {
    let server = MockServer::start().await;
    mock_login(&server).await;
    let identifier = "AA:BB:CC:DD:EE:FF:11:22";
    mock_device_list(
        &server,
        &[device_entry(identifier, "H6085", "Bedroom", "GD/bedroom", Some(true))],
    )
    .await;

    let broker = TestBroker::default();
    let session = test_session(&server, &broker);
    session.update_device_list().await.unwrap();

    let baseline = broker.published().await.len();

    let err = session
        .set_color(identifier, RgbColor::new(255, 0, 0))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::CapabilityNotSupported));

    let err = session
        .set_color_temperature(identifier, 4000)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::CapabilityNotSupported));

    assert_eq!(broker.published().await.len(), baseline);
}

#[tokio::test]
async fn commands_to_unknown_devices_fail() {
    let server = MockServer::start().await;
    mock_login(&server).await;
    mock_device_list(&server, &[]).await;

    let session = test_session(&server, &TestBroker::default());
    session.update_device_list().await.unwrap();

    let err = session.turn("nope", true).await.unwrap_err();
    assert!(matches!(err, Error::DeviceNotFound));
}

#[tokio::test]
async fn request_status_publishes_empty_turn() {
    let server = MockServer::start().await;
    let broker = TestBroker::default();
    let identifier = "A2:B2:C3:D4:E5:F6:77:88";
    let (session, baseline) = strip_with_state(&server, &broker, identifier).await;

    session.request_status(identifier).await.unwrap();

    let published = broker.published().await;
    assert_eq!(published.len(), baseline + 1);
    assert_eq!(published[baseline].1["msg"]["cmd"], "turn");
    assert_eq!(published[baseline].1["msg"]["data"], serde_json::json!({}));
}
