//! Retained-publish transport backed by a rumqttc client.

use rumqttc::{AsyncClient, QoS};

use thingsync_app::ports::DiscoveryTransport;
use thingsync_domain::error::ThingSyncError;
use thingsync_domain::topic::RetainedMessage;

use crate::error::MqttError;

/// [`DiscoveryTransport`] that queues retained messages on an MQTT client.
///
/// `AsyncClient::publish` resolves once the request is on the client's
/// ordered queue, so messages reach the broker in call order.
#[derive(Clone)]
pub struct MqttDiscoveryPublisher {
    client: AsyncClient,
}

impl MqttDiscoveryPublisher {
    #[must_use]
    pub fn new(client: AsyncClient) -> Self {
        Self { client }
    }
}

/// Bytes sent for a message; tombstones are zero-length.
pub(crate) fn encode_payload(payload: Option<String>) -> Vec<u8> {
    payload.map(String::into_bytes).unwrap_or_default()
}

impl DiscoveryTransport for MqttDiscoveryPublisher {
    async fn publish(&self, message: RetainedMessage) -> Result<(), ThingSyncError> {
        let retract = message.is_retraction();
        self.client
            .publish(
                message.topic.as_str(),
                QoS::AtMostOnce,
                true,
                encode_payload(message.payload),
            )
            .await
            .map_err(MqttError::Client)?;
        tracing::trace!(topic = %message.topic, retract, "retained message queued");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rumqttc::MqttOptions;
    use thingsync_domain::topic::DiscoveryTopic;

    #[test]
    fn should_encode_tombstone_as_empty_payload() {
        assert!(encode_payload(None).is_empty());
        assert_eq!(encode_payload(Some("{}".to_string())), b"{}".to_vec());
    }

    #[tokio::test]
    async fn should_queue_message_while_event_loop_is_alive() {
        let (client, _eventloop) = AsyncClient::new(MqttOptions::new("test", "localhost", 1883), 4);
        let publisher = MqttDiscoveryPublisher::new(client);

        let result = publisher
            .publish(RetainedMessage::retract(DiscoveryTopic::for_device("bulb")))
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn should_fail_with_transport_error_when_event_loop_is_gone() {
        let (client, eventloop) = AsyncClient::new(MqttOptions::new("test", "localhost", 1883), 4);
        drop(eventloop);
        let publisher = MqttDiscoveryPublisher::new(client);

        let result = publisher
            .publish(RetainedMessage::publish(
                DiscoveryTopic::for_device("bulb"),
                "{}".to_string(),
            ))
            .await;
        assert!(matches!(result, Err(ThingSyncError::Transport(_))));
    }
}
