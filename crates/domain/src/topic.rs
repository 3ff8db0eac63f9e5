//! Discovery topics and the retained messages published to them.

use std::fmt;

/// Fixed namespace under which thing descriptions are published.
pub const DISCOVERY_PREFIX: &str = "wot/td";

/// Topic holding the thing description of one device.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DiscoveryTopic(String);

impl DiscoveryTopic {
    /// Topic for the device currently named `friendly_name`.
    #[must_use]
    pub fn for_device(friendly_name: &str) -> Self {
        Self(format!("{DISCOVERY_PREFIX}/{friendly_name}"))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DiscoveryTopic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A retained message to hand to the broker.
///
/// A `None` payload is a tombstone: the broker drops whatever it retained on
/// the topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetainedMessage {
    pub topic: DiscoveryTopic,
    pub payload: Option<String>,
}

impl RetainedMessage {
    #[must_use]
    pub fn publish(topic: DiscoveryTopic, payload: String) -> Self {
        Self {
            topic,
            payload: Some(payload),
        }
    }

    #[must_use]
    pub fn retract(topic: DiscoveryTopic) -> Self {
        Self {
            topic,
            payload: None,
        }
    }

    #[must_use]
    pub fn is_retraction(&self) -> bool {
        self.payload.is_none()
    }
}
