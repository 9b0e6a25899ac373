// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Govee Cloud - A Rust library to control Govee smart lights.
//!
//! This library talks to the Govee cloud platform the way the vendor app
//! does: a REST login exchange yields a bearer token, an account-wide MQTT
//! topic and the name of a certificate pair; device state then streams in
//! over an AWS IoT broker subscription while commands publish to per-device
//! topics on the same connection.
//!
//! # Supported Features
//!
//! - **Power control**: Turn bulbs and strips on/off, toggle
//! - **Light control**: Brightness, RGB color, white color temperature
//! - **Live state**: Asynchronous status updates pushed by the platform
//! - **Device discovery**: Account device list with automatic registry
//!   reconciliation
//!
//! # Supported Devices
//!
//! - `H60xx` bulbs (RGB, plus the white-only `H6085`)
//! - `H61xx` LED strips (RGB)
//!
//! Other families are skipped during discovery.
//!
//! # Quick Start
//!
//! ```no_run
//! use govee_cloud::{DeviceEvent, Session};
//! use govee_cloud::cert::DirCertificateStore;
//!
//! #[tokio::main]
//! async fn main() -> govee_cloud::Result<()> {
//!     let session = Session::builder("user@example.com", "secret")
//!         .with_certificate_store(DirCertificateStore::new("cert"))
//!         .build()?;
//!
//!     // Watch for devices and state changes
//!     let mut events = session.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             match event {
//!                 DeviceEvent::NewDevice { device } => {
//!                     println!("found {}", device.name());
//!                 }
//!                 DeviceEvent::DeviceUpdated { device } => {
//!                     println!("{} updated", device.name());
//!                 }
//!             }
//!         }
//!     });
//!
//!     session.update_device_list().await?;
//!
//!     for device in session.devices().await {
//!         session.turn(device.identifier(), true).await?;
//!         session.set_brightness(device.identifier(), 0.75).await?;
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Command Semantics
//!
//! Setters are requests, not memory writes: the cached state of a device
//! changes only when the platform confirms the command with a status update
//! over the broker. A setter matching the cached state publishes nothing.
//!
//! # Certificates
//!
//! The broker requires mutual TLS with a certificate pair the platform
//! references by name in the login response but never serves. Provide the
//! material through a [`cert::CertificateStore`].

pub mod cert;
pub mod command;
mod config;
pub mod device;
pub mod error;
pub mod event;
pub mod protocol;
mod session;
pub mod types;

pub use config::{BrokerConfig, PlatformConfig};
pub use device::{Device, DeviceKind};
pub use error::{AuthError, DecodeError, Error, ProtocolError, Result, TransportError, ValueError};
pub use event::DeviceEvent;
pub use session::{Session, SessionBuilder};
pub use types::{Brightness, ColorTemperature, Connectivity, PowerState, RgbColor, kelvin_to_rgb};
