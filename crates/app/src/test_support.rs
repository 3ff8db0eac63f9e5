//! In-memory port implementations shared by the unit tests.

use std::collections::HashMap;
use std::future::Future;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::{Arc, Mutex};

use thingsync_domain::broker::{BrokerSettings, Credentials};
use thingsync_domain::error::ThingSyncError;
use thingsync_domain::id::ModelId;
use thingsync_domain::topic::RetainedMessage;

use crate::ports::{DiscoveryTransport, InterfaceAddresses, TemplateStore};

pub const BULB_TEMPLATE: &str = r#"{
    "@type": "ThingModel",
    "title": "OSRAM Classic A60 RGBW",
    "id": "urn:zigbee2mqtt:{{IEEE_ADDRESS}}",
    "base": "{{MQTT_BROKER_SCHEME}}://{{MQTT_BROKER_ADDRESS}}",
    "securityDefinitions": { "nosec_sc": { "scheme": "nosec" } },
    "security": "nosec_sc",
    "properties": {
        "state": {
            "forms": [
                { "op": ["observeproperty"], "href": "{{BASE_TOPIC}}/{{FRIENDLY_NAME}}" },
                { "op": "readproperty", "href": "{{BASE_TOPIC}}/{{FRIENDLY_NAME}}/get/state" }
            ]
        }
    }
}"#;

/// Records every message it is asked to publish.
#[derive(Clone, Default)]
pub struct RecordingTransport {
    messages: Arc<Mutex<Vec<RetainedMessage>>>,
    failing: Arc<Mutex<bool>>,
}

impl RecordingTransport {
    pub fn messages(&self) -> Vec<RetainedMessage> {
        self.messages.lock().unwrap().clone()
    }

    pub fn set_failing(&self, failing: bool) {
        *self.failing.lock().unwrap() = failing;
    }
}

impl DiscoveryTransport for RecordingTransport {
    fn publish(
        &self,
        message: RetainedMessage,
    ) -> impl Future<Output = Result<(), ThingSyncError>> + Send {
        let result = if *self.failing.lock().unwrap() {
            Err(ThingSyncError::Transport(Box::new(std::io::Error::other(
                "client gone",
            ))))
        } else {
            self.messages.lock().unwrap().push(message);
            Ok(())
        };
        async { result }
    }
}

#[derive(Default)]
pub struct InMemoryTemplates {
    templates: HashMap<ModelId, String>,
}

impl InMemoryTemplates {
    pub fn with(model: &str, template: &str) -> Self {
        let mut templates = HashMap::new();
        templates.insert(ModelId::new(model), template.to_string());
        Self { templates }
    }
}

impl TemplateStore for InMemoryTemplates {
    fn load(&self, model: &ModelId) -> Result<Option<String>, ThingSyncError> {
        Ok(self.templates.get(model).cloned())
    }
}

pub struct StaticInterfaces(pub Vec<IpAddr>);

impl Default for StaticInterfaces {
    fn default() -> Self {
        Self(vec![
            IpAddr::V4(Ipv4Addr::LOCALHOST),
            IpAddr::V4(Ipv4Addr::new(192, 168, 1, 20)),
        ])
    }
}

impl InterfaceAddresses for StaticInterfaces {
    fn addresses(&self) -> Vec<IpAddr> {
        self.0.clone()
    }
}

pub fn settings(credentials: Option<Credentials>) -> BrokerSettings {
    BrokerSettings {
        uri: "mqtt://localhost:1883".parse().unwrap(),
        base_topic: "zigbee2mqtt".to_string(),
        credentials,
    }
}
