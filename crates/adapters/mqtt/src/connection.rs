//! MQTT connection — drives the rumqttc event loop and feeds bridge device
//! lists to the lifecycle event channel.

use std::time::Duration;

use rumqttc::{AsyncClient, Event, EventLoop, Outgoing, Packet, QoS};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use thingsync_domain::event::LifecycleEvent;

use crate::bridge::BridgeTracker;
use crate::config::MqttConfig;
use crate::error::MqttError;
use crate::publisher::MqttDiscoveryPublisher;

/// Upper bound on how long [`MqttConnection::shutdown`] waits for queued
/// messages and the disconnect packet to be written.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// A live broker connection.
///
/// Owns the background task polling the event loop. Dropping the connection
/// without calling [`shutdown`](Self::shutdown) leaves that task running.
pub struct MqttConnection {
    client: AsyncClient,
    handle: JoinHandle<()>,
}

impl MqttConnection {
    /// Connect to the configured broker and start listening for device lists.
    ///
    /// Lifecycle events derived from device lists are sent on `events`. The
    /// channel is unbounded: the task polling the broker must never wait on
    /// the consumer, whose publishes are only written while polling goes on.
    /// The background task stops when the receiving side is dropped.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`MqttError::InvalidUri`] or [`MqttError::UnsupportedScheme`]
    /// when the configuration cannot produce connection options.
    pub fn start(
        config: &MqttConfig,
        events: mpsc::UnboundedSender<LifecycleEvent>,
    ) -> Result<Self, MqttError> {
        let options = config.mqtt_options()?;
        let (client, eventloop) = AsyncClient::new(options, config.channel_capacity);

        let listener = BridgeListener {
            client: client.clone(),
            eventloop,
            devices_topic: config.devices_topic(),
            tracker: BridgeTracker::new(),
            events,
            reconnect_delay: config.reconnect_delay(),
        };
        let handle = tokio::spawn(listener.run());

        tracing::info!(server = %config.server, client_id = %config.client_id, "MQTT connection started");
        Ok(Self { client, handle })
    }

    /// Transport for publishing descriptions over this connection.
    #[must_use]
    pub fn publisher(&self) -> MqttDiscoveryPublisher {
        MqttDiscoveryPublisher::new(self.client.clone())
    }

    /// Disconnect from the broker and stop the background task.
    ///
    /// Messages queued before the call are written ahead of the disconnect
    /// packet. The task gets five seconds to get there before it is
    /// aborted.
    ///
    /// # Errors
    ///
    /// Returns [`MqttError::Client`] when the disconnect request cannot be
    /// queued; the background task is stopped regardless.
    pub async fn shutdown(self) -> Result<(), MqttError> {
        let Self { client, mut handle } = self;
        let result = client.disconnect().await.map_err(MqttError::Client);
        if tokio::time::timeout(SHUTDOWN_GRACE, &mut handle).await.is_err() {
            tracing::warn!("MQTT listener did not stop in time, aborting");
            handle.abort();
        }
        tracing::info!("MQTT connection stopped");
        result
    }
}

struct BridgeListener {
    client: AsyncClient,
    eventloop: EventLoop,
    devices_topic: String,
    tracker: BridgeTracker,
    events: mpsc::UnboundedSender<LifecycleEvent>,
    reconnect_delay: Duration,
}

impl BridgeListener {
    async fn run(mut self) {
        loop {
            match self.eventloop.poll().await {
                Ok(Event::Incoming(Packet::ConnAck(_))) => self.subscribe(),
                Ok(Event::Incoming(Packet::Publish(publish)))
                    if same_topic(&publish.topic, &self.devices_topic) =>
                {
                    if !self.forward(&publish.payload) {
                        tracing::info!("lifecycle event receiver dropped, stopping MQTT listener");
                        return;
                    }
                }
                Ok(Event::Outgoing(Outgoing::Disconnect)) => {
                    tracing::debug!("disconnect written, stopping MQTT listener");
                    return;
                }
                Ok(_) => {}
                Err(err) => {
                    tracing::warn!(%err, "MQTT connection error, retrying");
                    tokio::time::sleep(self.reconnect_delay).await;
                }
            }
        }
    }

    /// Subscribe (again) after every successful connect.
    fn subscribe(&self) {
        // `try_subscribe` never waits on the request queue this very task
        // drains.
        match self.client.try_subscribe(&self.devices_topic, QoS::AtLeastOnce) {
            Ok(()) => tracing::info!(topic = %self.devices_topic, "subscribed to device list"),
            Err(err) => tracing::warn!(%err, topic = %self.devices_topic, "device list subscription failed"),
        }
    }

    /// Diff a device list and send the resulting events in order. Returns
    /// `false` once the receiver is gone.
    fn forward(&mut self, payload: &[u8]) -> bool {
        let events = match self.tracker.apply_payload(payload) {
            Ok(events) => events,
            Err(err) => {
                tracing::warn!(error = ?err, "ignoring malformed device list");
                return true;
            }
        };
        tracing::debug!(count = events.len(), devices = self.tracker.len(), "device list processed");
        for event in events {
            if self.events.send(event).is_err() {
                return false;
            }
        }
        true
    }
}

fn same_topic(received: &impl AsRef<[u8]>, expected: &str) -> bool {
    received.as_ref() == expected.as_bytes()
}
