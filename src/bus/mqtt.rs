//! MQTT implementation of the bus using `rumqttc`.

use crate::bus::{Bus, BusEvent, QosLevel, StatusMessage, STATUS_TOPIC};
use crate::config::SimulatorConfig;
use crate::error::{Result, SimError};
use async_trait::async_trait;
use rumqttc::{
    AsyncClient, ConnectReturnCode, ConnectionError, Event, EventLoop, LastWill, MqttOptions,
    Outgoing, Packet, QoS,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time;
use tracing::{debug, error, info, trace, warn};

/// Outstanding requests buffered between the client and its event loop.
const REQUEST_CAPACITY: usize = 64;

/// How long the initial connection may take before it counts as failed.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Pause between reconnect attempts after a connection error.
const RECONNECT_DELAY: Duration = Duration::from_secs(1);

/// Grace period for the event loop to flush the DISCONNECT packet.
const DISCONNECT_TIMEOUT: Duration = Duration::from_secs(2);

const EVENT_CAPACITY: usize = 16;

impl From<QosLevel> for QoS {
    fn from(level: QosLevel) -> QoS {
        match level {
            QosLevel::AtMostOnce => QoS::AtMostOnce,
            QosLevel::AtLeastOnce => QoS::AtLeastOnce,
            QosLevel::ExactlyOnce => QoS::ExactlyOnce,
        }
    }
}

/// MQTT client with a background event loop.
///
/// A retained `{"status":"offline"}` last will is registered on
/// `iot/status`, and a retained `{"status":"online"}` is published every
/// time the broker acknowledges a connection.
///
/// Publishes fail while the broker link is down; nothing is queued for
/// delivery after a reconnect.
pub struct MqttBus {
    host: String,
    port: u16,
    keepalive: Duration,
    client_id: String,
    client: Option<AsyncClient>,
    task: Option<JoinHandle<()>>,
    online: Arc<AtomicBool>,
    events: broadcast::Sender<BusEvent>,
}

impl MqttBus {
    pub fn new(
        host: impl Into<String>,
        port: u16,
        keepalive: Duration,
        client_id: impl Into<String>,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            host: host.into(),
            port,
            keepalive,
            client_id: client_id.into(),
            client: None,
            task: None,
            online: Arc::new(AtomicBool::new(false)),
            events,
        }
    }

    pub fn from_config(config: &SimulatorConfig) -> Self {
        Self::new(
            config.host.clone(),
            config.port,
            Duration::from_secs(config.keepalive_secs),
            config.client_id.clone(),
        )
    }

    /// Whether the broker has acknowledged the current connection.
    pub fn is_connected(&self) -> bool {
        self.client.is_some() && self.online.load(Ordering::Acquire)
    }

    fn options(&self) -> Result<MqttOptions> {
        let mut options = MqttOptions::new(&self.client_id, &self.host, self.port);
        options.set_keep_alive(self.keepalive);
        options.set_clean_session(true);
        options.set_last_will(LastWill::new(
            STATUS_TOPIC,
            StatusMessage::offline().to_json()?,
            QoS::AtMostOnce,
            true,
        ));
        Ok(options)
    }
}

#[async_trait]
impl Bus for MqttBus {
    async fn connect(&mut self) -> Result<()> {
        if self.client.is_some() {
            return Ok(());
        }

        let (client, mut eventloop) = AsyncClient::new(self.options()?, REQUEST_CAPACITY);
        let address = format!("{}:{}", self.host, self.port);

        time::timeout(CONNECT_TIMEOUT, wait_for_connack(&mut eventloop))
            .await
            .map_err(|_| {
                SimError::connection_error(format!("timed out connecting to {}", address))
            })??;

        info!("Connected to MQTT broker {}", address);
        publish_online(&client)?;
        self.online.store(true, Ordering::Release);
        let _ = self.events.send(BusEvent::Connected);

        self.task = Some(tokio::spawn(drive_event_loop(
            eventloop,
            client.clone(),
            self.online.clone(),
            self.events.clone(),
        )));
        self.client = Some(client);
        Ok(())
    }

    async fn publish(
        &mut self,
        topic: &str,
        payload: &str,
        qos: QosLevel,
        retain: bool,
    ) -> Result<()> {
        let client = self
            .client
            .as_ref()
            .ok_or_else(|| SimError::publish_error("not connected"))?;
        if !self.online.load(Ordering::Acquire) {
            return Err(SimError::publish_error(format!("{}: not connected", topic)));
        }

        client
            .try_publish(topic, qos.into(), retain, payload.as_bytes().to_vec())
            .map_err(|e| SimError::publish_error(format!("{}: {}", topic, e)))
    }

    async fn disconnect(&mut self) -> Result<()> {
        let Some(client) = self.client.take() else {
            return Ok(());
        };
        self.online.store(false, Ordering::Release);

        let result = client
            .try_disconnect()
            .map_err(|e| SimError::connection_error(format!("disconnect request failed: {}", e)));

        if let Some(mut task) = self.task.take() {
            if time::timeout(DISCONNECT_TIMEOUT, &mut task).await.is_err() {
                debug!("MQTT event loop did not stop in time, aborting it");
                task.abort();
            }
        }

        info!("Disconnected from broker");
        result
    }

    fn events(&self) -> broadcast::Receiver<BusEvent> {
        self.events.subscribe()
    }
}

fn publish_online(client: &AsyncClient) -> Result<()> {
    client
        .try_publish(
            STATUS_TOPIC,
            QoS::AtMostOnce,
            true,
            StatusMessage::online().to_json()?,
        )
        .map_err(|e| SimError::publish_error(format!("{}: {}", STATUS_TOPIC, e)))
}

async fn wait_for_connack(eventloop: &mut EventLoop) -> Result<()> {
    loop {
        match eventloop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(ack))) => {
                return if ack.code == ConnectReturnCode::Success {
                    Ok(())
                } else {
                    Err(SimError::connection_error(format!(
                        "broker refused connection: {:?}",
                        ack.code
                    )))
                };
            }
            Ok(event) => trace!(?event, "MQTT event while connecting"),
            Err(e) => {
                return Err(SimError::connection_error(format!(
                    "MQTT connection failed: {}",
                    e
                )))
            }
        }
    }
}

/// Keep polling the event loop; rumqttc reconnects on the next poll after
/// an error. `online` tracks whether the broker link is up.
async fn drive_event_loop(
    mut eventloop: EventLoop,
    client: AsyncClient,
    online: Arc<AtomicBool>,
    events: broadcast::Sender<BusEvent>,
) {
    let mut closing = false;

    loop {
        match eventloop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(_))) => {
                info!("Reconnected to MQTT broker");
                if let Err(e) = publish_online(&client) {
                    error!("Failed to publish online status: {}", e);
                }
                online.store(true, Ordering::Release);
                let _ = events.send(BusEvent::Connected);
            }
            Ok(Event::Outgoing(Outgoing::Disconnect)) => {
                debug!("DISCONNECT sent");
                closing = true;
            }
            Ok(event) => trace!(?event, "MQTT event"),
            Err(_) if closing => break,
            Err(ConnectionError::ConnectionRefused(code)) => {
                online.store(false, Ordering::Release);
                error!("MQTT connection refused: {:?}", code);
                let _ = events.send(BusEvent::ConnectionRefused {
                    reason: format!("{:?}", code),
                });
                time::sleep(RECONNECT_DELAY).await;
            }
            Err(e) => {
                if online.swap(false, Ordering::AcqRel) {
                    warn!(
                        "Unexpected disconnection: {} (reconnect loop will keep trying)",
                        e
                    );
                    let _ = events.send(BusEvent::Disconnected {
                        reason: e.to_string(),
                    });
                }
                time::sleep(RECONNECT_DELAY).await;
            }
        }
    }
}
