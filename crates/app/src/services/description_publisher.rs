//! Description publisher — renders a device's thing description and keeps its
//! retained topic up to date.
//!
//! The publisher holds no device state of its own: every call reads the
//! current record from the [`DeviceRegistry`] it is given.

use serde_json::Value;

use thingsync_domain::broker::{BrokerSettings, resolve_reachable_host};
use thingsync_domain::description::{self, SecurityScheme, Substitutions};
use thingsync_domain::device::DeviceRecord;
use thingsync_domain::error::ThingSyncError;
use thingsync_domain::id::DeviceId;
use thingsync_domain::topic::{DiscoveryTopic, RetainedMessage};

use crate::ports::{DiscoveryTransport, InterfaceAddresses, TemplateStore};
use crate::registry::DeviceRegistry;

/// Result of a [`DescriptionPublisher::publish`] call that did not hit a
/// transport failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    /// The description was queued on `topic`.
    Published { topic: DiscoveryTopic },
    /// The device is not in the registry; nothing was sent.
    UnknownDevice,
    /// The description could not be rendered; nothing was sent.
    Skipped(SkipReason),
}

impl PublishOutcome {
    #[must_use]
    pub fn is_published(&self) -> bool {
        matches!(self, Self::Published { .. })
    }
}

/// Why a render was abandoned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No template exists for the device's model.
    MissingTemplate,
    /// A template exists but could not be read.
    UnreadableTemplate,
    /// A substitution value was missing or the output was not a JSON object.
    RenderFailed,
}

/// Application service that renders, publishes, and retracts descriptions.
pub struct DescriptionPublisher<T, S, N> {
    transport: T,
    templates: S,
    interfaces: N,
    settings: BrokerSettings,
}

impl<T, S, N> DescriptionPublisher<T, S, N>
where
    T: DiscoveryTransport,
    S: TemplateStore,
    N: InterfaceAddresses,
{
    /// Create a publisher backed by the given ports.
    pub fn new(transport: T, templates: S, interfaces: N, settings: BrokerSettings) -> Self {
        Self {
            transport,
            templates,
            interfaces,
            settings,
        }
    }

    /// Render the description of device `id` and publish it, retained, under
    /// the device's current friendly name.
    ///
    /// Unknown devices and render failures are reported through the returned
    /// [`PublishOutcome`]; they are logged here and never raised.
    ///
    /// # Errors
    ///
    /// Returns [`ThingSyncError::Transport`] when the transport refuses the
    /// message.
    #[tracing::instrument(skip(self, registry, id), fields(device = %id))]
    pub async fn publish(
        &self,
        registry: &DeviceRegistry,
        id: &DeviceId,
    ) -> Result<PublishOutcome, ThingSyncError> {
        let Some(record) = registry.get(id) else {
            tracing::debug!("device not registered, nothing to publish");
            return Ok(PublishOutcome::UnknownDevice);
        };

        let document = match self.render(record) {
            Ok(document) => document,
            Err(reason) => return Ok(PublishOutcome::Skipped(reason)),
        };

        let topic = DiscoveryTopic::for_device(&record.friendly_name);
        let payload = description::to_canonical_json(&document);
        self.transport
            .publish(RetainedMessage::publish(topic.clone(), payload))
            .await?;

        tracing::info!(%topic, "thing description published");
        Ok(PublishOutcome::Published { topic })
    }

    /// Clear the retained description published under `friendly_name`.
    ///
    /// # Errors
    ///
    /// Returns [`ThingSyncError::Transport`] when the transport refuses the
    /// message.
    #[tracing::instrument(skip(self))]
    pub async fn retract(&self, friendly_name: &str) -> Result<(), ThingSyncError> {
        let topic = DiscoveryTopic::for_device(friendly_name);
        self.transport
            .publish(RetainedMessage::retract(topic.clone()))
            .await?;
        tracing::debug!(%topic, "thing description retracted");
        Ok(())
    }

    /// Run the render pipeline for `record`, logging why it stopped if it did.
    fn render(&self, record: &DeviceRecord) -> Result<Value, SkipReason> {
        let template = match self.templates.load(&record.model) {
            Ok(Some(template)) => template,
            Ok(None) => {
                tracing::warn!(model = %record.model, "no thing model found for model");
                return Err(SkipReason::MissingTemplate);
            }
            Err(err) => {
                tracing::warn!(model = %record.model, error = ?err, "thing model could not be read");
                return Err(SkipReason::UnreadableTemplate);
            }
        };

        let addresses = self.interfaces.addresses();
        let rendered = Substitutions::builder()
            .broker_scheme(self.settings.uri.scheme.as_str())
            .broker_address(resolve_reachable_host(&self.settings.uri, &addresses))
            .base_topic(self.settings.base_topic.as_str())
            .friendly_name(record.friendly_name.as_str())
            .ieee_address(record.id.as_str())
            .build()
            .and_then(|substitutions| {
                description::render(&template, &substitutions, self.security())
            });

        rendered.map_err(|err| {
            tracing::warn!(model = %record.model, error = %err, "thing model could not be rendered");
            SkipReason::RenderFailed
        })
    }

    fn security(&self) -> Option<SecurityScheme> {
        self.settings
            .credentials
            .as_ref()
            .map(|_| SecurityScheme::Basic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{
        BULB_TEMPLATE, InMemoryTemplates, RecordingTransport, StaticInterfaces, settings,
    };
    use thingsync_domain::broker::Credentials;

    type TestPublisher = DescriptionPublisher<RecordingTransport, InMemoryTemplates, StaticInterfaces>;

    fn publisher_with(
        templates: InMemoryTemplates,
        credentials: Option<Credentials>,
    ) -> (TestPublisher, RecordingTransport) {
        let transport = RecordingTransport::default();
        let publisher = DescriptionPublisher::new(
            transport.clone(),
            templates,
            StaticInterfaces::default(),
            settings(credentials),
        );
        (publisher, transport)
    }

    fn registry_with_bulb() -> (DeviceRegistry, DeviceId) {
        let record = DeviceRecord::builder()
            .id("0x000b57fffec6a5b2")
            .friendly_name("bulb")
            .model("AC03641")
            .build()
            .unwrap();
        let id = record.id.clone();
        let mut registry = DeviceRegistry::new();
        registry.upsert(record);
        (registry, id)
    }

    fn payload_of(transport: &RecordingTransport, index: usize) -> Value {
        let messages = transport.messages();
        serde_json::from_str(messages[index].payload.as_deref().unwrap()).unwrap()
    }

    #[tokio::test]
    async fn should_publish_rendered_description_to_discovery_topic() {
        let (publisher, transport) =
            publisher_with(InMemoryTemplates::with("AC03641", BULB_TEMPLATE), None);
        let (registry, id) = registry_with_bulb();

        let outcome = publisher.publish(&registry, &id).await.unwrap();
        assert_eq!(
            outcome,
            PublishOutcome::Published {
                topic: DiscoveryTopic::for_device("bulb")
            }
        );

        let messages = transport.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].topic.as_str(), "wot/td/bulb");

        let doc = payload_of(&transport, 0);
        assert_eq!(doc["base"], "mqtt://192.168.1.20:1883");
        assert_eq!(doc["id"], "urn:zigbee2mqtt:0x000b57fffec6a5b2");
        assert_eq!(
            doc["properties"]["state"]["forms"][0]["href"],
            "zigbee2mqtt/bulb"
        );
        assert!(!messages[0].payload.as_deref().unwrap().contains("{{"));
    }

    #[tokio::test]
    async fn should_publish_identical_bytes_when_called_twice() {
        let (publisher, transport) =
            publisher_with(InMemoryTemplates::with("AC03641", BULB_TEMPLATE), None);
        let (registry, id) = registry_with_bulb();

        publisher.publish(&registry, &id).await.unwrap();
        publisher.publish(&registry, &id).await.unwrap();

        let messages = transport.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0], messages[1]);
    }

    #[tokio::test]
    async fn should_do_nothing_for_unknown_device() {
        let (publisher, transport) =
            publisher_with(InMemoryTemplates::with("AC03641", BULB_TEMPLATE), None);
        let registry = DeviceRegistry::new();

        let outcome = publisher
            .publish(&registry, &DeviceId::new("0xdead"))
            .await
            .unwrap();
        assert_eq!(outcome, PublishOutcome::UnknownDevice);
        assert!(transport.messages().is_empty());
    }

    #[tokio::test]
    async fn should_skip_when_template_is_missing() {
        let (publisher, transport) = publisher_with(InMemoryTemplates::default(), None);
        let (registry, id) = registry_with_bulb();

        let outcome = publisher.publish(&registry, &id).await.unwrap();
        assert_eq!(outcome, PublishOutcome::Skipped(SkipReason::MissingTemplate));
        assert!(transport.messages().is_empty());
    }

    #[tokio::test]
    async fn should_skip_when_rendered_template_is_malformed() {
        let (publisher, transport) = publisher_with(
            InMemoryTemplates::with("AC03641", "{ \"title\": {{FRIENDLY_NAME}} }"),
            None,
        );
        let (registry, id) = registry_with_bulb();

        let outcome = publisher.publish(&registry, &id).await.unwrap();
        assert_eq!(outcome, PublishOutcome::Skipped(SkipReason::RenderFailed));
        assert!(transport.messages().is_empty());
    }

    #[tokio::test]
    async fn should_skip_when_broker_address_cannot_be_resolved() {
        let transport = RecordingTransport::default();
        let publisher = DescriptionPublisher::new(
            transport.clone(),
            InMemoryTemplates::with("AC03641", BULB_TEMPLATE),
            StaticInterfaces(Vec::new()),
            settings(None),
        );
        let (registry, id) = registry_with_bulb();

        let outcome = publisher.publish(&registry, &id).await.unwrap();
        assert_eq!(outcome, PublishOutcome::Skipped(SkipReason::RenderFailed));
        assert!(transport.messages().is_empty());
    }

    #[tokio::test]
    async fn should_inject_basic_security_when_credentials_configured() {
        let credentials = Credentials::from_parts(Some("user"), Some("secret"));
        let (publisher, transport) =
            publisher_with(InMemoryTemplates::with("AC03641", BULB_TEMPLATE), credentials);
        let (registry, id) = registry_with_bulb();

        publisher.publish(&registry, &id).await.unwrap();

        let doc = payload_of(&transport, 0);
        assert_eq!(
            doc["securityDefinitions"],
            serde_json::json!({ "basic_sc": { "scheme": "basic" } })
        );
        assert_eq!(doc["security"], serde_json::json!(["basic_sc"]));
    }

    #[tokio::test]
    async fn should_keep_template_security_without_credentials() {
        let (publisher, transport) =
            publisher_with(InMemoryTemplates::with("AC03641", BULB_TEMPLATE), None);
        let (registry, id) = registry_with_bulb();

        publisher.publish(&registry, &id).await.unwrap();

        let doc = payload_of(&transport, 0);
        assert_eq!(doc["security"], "nosec_sc");
    }

    #[tokio::test]
    async fn should_publish_tombstone_on_retract() {
        let (publisher, transport) = publisher_with(InMemoryTemplates::default(), None);

        publisher.retract("bulb").await.unwrap();

        let messages = transport.messages();
        assert_eq!(
            messages,
            vec![RetainedMessage::retract(DiscoveryTopic::for_device("bulb"))]
        );
    }

    #[tokio::test]
    async fn should_propagate_transport_failure() {
        let (publisher, transport) =
            publisher_with(InMemoryTemplates::with("AC03641", BULB_TEMPLATE), None);
        transport.set_failing(true);
        let (registry, id) = registry_with_bulb();

        let result = publisher.publish(&registry, &id).await;
        assert!(matches!(result, Err(ThingSyncError::Transport(_))));
    }
}
