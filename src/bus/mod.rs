//! Publish/subscribe bus abstraction.
//!
//! The publish loop only sees the [`Bus`] trait: explicit connect, publish
//! and disconnect calls, plus a broadcast channel of [`BusEvent`]s for
//! connection status changes that happen in the background.

pub mod mqtt;

pub use mqtt::MqttBus;

use crate::error::{Result, SimError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;

/// Retained online/offline status channel.
pub const STATUS_TOPIC: &str = "iot/status";
pub const TEMPERATURE_TOPIC: &str = "iot/sensor/temperature";
pub const HUMIDITY_TOPIC: &str = "iot/sensor/humidity";
pub const GPS_TOPIC: &str = "iot/sensor/gps";

/// Message delivery guarantee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum QosLevel {
    #[default]
    AtMostOnce,
    AtLeastOnce,
    ExactlyOnce,
}

impl TryFrom<u8> for QosLevel {
    type Error = SimError;

    fn try_from(level: u8) -> Result<Self> {
        match level {
            0 => Ok(Self::AtMostOnce),
            1 => Ok(Self::AtLeastOnce),
            2 => Ok(Self::ExactlyOnce),
            other => Err(SimError::config_error(format!(
                "QoS must be 0, 1 or 2, got {}",
                other
            ))),
        }
    }
}

impl From<QosLevel> for u8 {
    fn from(level: QosLevel) -> u8 {
        match level {
            QosLevel::AtMostOnce => 0,
            QosLevel::AtLeastOnce => 1,
            QosLevel::ExactlyOnce => 2,
        }
    }
}

impl fmt::Display for QosLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", u8::from(*self))
    }
}

/// Connection status change reported by a bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusEvent {
    /// Broker acknowledged a (re)connection
    Connected,
    /// Connection dropped; the bus keeps trying to reconnect
    Disconnected { reason: String },
    /// Broker refused the connection
    ConnectionRefused { reason: String },
}

/// Payload published on [`STATUS_TOPIC`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusMessage {
    pub status: Status,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Online,
    Offline,
}

impl StatusMessage {
    pub fn online() -> Self {
        Self {
            status: Status::Online,
        }
    }

    pub fn offline() -> Self {
        Self {
            status: Status::Offline,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// A message bus client.
///
/// `publish` is fire-and-forget from the caller's point of view: it must not
/// block waiting for the broker, and an `Err` means the message was dropped.
#[async_trait]
pub trait Bus: Send {
    /// Establish the connection. Failure here is fatal for the caller.
    async fn connect(&mut self) -> Result<()>;

    /// Submit one message for delivery.
    async fn publish(&mut self, topic: &str, payload: &str, qos: QosLevel, retain: bool)
        -> Result<()>;

    /// Close the connection and stop background activity.
    async fn disconnect(&mut self) -> Result<()>;

    /// Subscribe to connection status changes.
    fn events(&self) -> broadcast::Receiver<BusEvent>;
}
