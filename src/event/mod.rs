// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Session events.
//!
//! The session broadcasts registry changes and state updates through an
//! [`EventBus`] backed by a tokio broadcast channel. Each subscriber gets
//! its own copy of every event; a subscriber that falls behind loses the
//! oldest events for itself only (`RecvError::Lagged`).

use tokio::sync::broadcast;

use crate::device::Device;

/// Default channel capacity for the event bus.
const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Events emitted by a session.
///
/// Both variants carry a snapshot of the device at the moment the event was
/// produced; later updates do not mutate an already-delivered event.
///
/// # Examples
///
/// ```no_run
/// use govee_cloud::event::DeviceEvent;
///
/// # async fn example(mut events: tokio::sync::broadcast::Receiver<DeviceEvent>) {
/// while let Ok(event) = events.recv().await {
///     match event {
///         DeviceEvent::NewDevice { device } => {
///             println!("found {} ({})", device.name(), device.sku());
///         }
///         DeviceEvent::DeviceUpdated { device } => {
///             println!("{} is now {}", device.name(), device.state().connectivity());
///         }
///     }
/// }
/// # }
/// ```
#[derive(Debug, Clone)]
pub enum DeviceEvent {
    /// A previously unseen device appeared in the account's device list.
    NewDevice {
        /// Snapshot of the new device.
        device: Device,
    },

    /// A device's cached state changed after an inbound status update.
    DeviceUpdated {
        /// Snapshot of the device after the update.
        device: Device,
    },
}

impl DeviceEvent {
    /// Returns the device snapshot carried by this event.
    #[must_use]
    pub fn device(&self) -> &Device {
        match self {
            Self::NewDevice { device } | Self::DeviceUpdated { device } => device,
        }
    }

    /// Returns `true` if this is a new-device event.
    #[must_use]
    pub fn is_new_device(&self) -> bool {
        matches!(self, Self::NewDevice { .. })
    }
}

/// Broadcast bus for session events.
#[derive(Debug, Clone)]
pub(crate) struct EventBus {
    sender: broadcast::Sender<DeviceEvent>,
}

impl EventBus {
    /// Creates a new event bus with default capacity.
    pub(crate) fn new() -> Self {
        let (sender, _) = broadcast::channel(DEFAULT_CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Subscribes to events published after this call.
    pub(crate) fn subscribe(&self) -> broadcast::Receiver<DeviceEvent> {
        self.sender.subscribe()
    }

    /// Publishes an event to all subscribers.
    ///
    /// If there are no subscribers, the event is silently discarded.
    pub(crate) fn publish(&self, event: DeviceEvent) {
        let _ = self.sender.send(event);
    }
}
