//! Bridge device list → lifecycle events.
//!
//! The device host retains its full device list on `<base_topic>/bridge/devices`
//! and republishes it whenever a device joins, leaves, or is renamed. Each
//! list is diffed against the previous one to recover the individual events.

use std::collections::BTreeMap;

use serde::Deserialize;

use thingsync_domain::event::LifecycleEvent;
use thingsync_domain::id::{DeviceId, ModelId};

use crate::error::MqttError;

/// One entry of the bridge device list. Unknown fields are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct BridgeDevice {
    pub ieee_address: String,
    pub friendly_name: String,
    /// `null` for the coordinator and for devices the host does not support.
    #[serde(default)]
    pub definition: Option<BridgeDefinition>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BridgeDefinition {
    pub model: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Tracked {
    friendly_name: String,
    model: ModelId,
}

/// Remembers the last device list and turns the next one into events.
#[derive(Debug, Default)]
pub struct BridgeTracker {
    known: BTreeMap<DeviceId, Tracked>,
}

impl BridgeTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a raw device list payload and diff it.
    ///
    /// # Errors
    ///
    /// Returns [`MqttError::PayloadParse`] when the payload is not a JSON
    /// device list; the tracker is left unchanged.
    pub fn apply_payload(&mut self, payload: &[u8]) -> Result<Vec<LifecycleEvent>, MqttError> {
        let devices: Vec<BridgeDevice> =
            serde_json::from_slice(payload).map_err(MqttError::PayloadParse)?;
        Ok(self.apply_snapshot(devices))
    }

    /// Diff `devices` against the previous list.
    ///
    /// Removals come first so that a name freed by a leaving device is
    /// retracted before another device is published under it. Then, in list
    /// order, renames and appearances. A device whose model changed is
    /// published again. Devices without a definition are never tracked.
    pub fn apply_snapshot(&mut self, devices: Vec<BridgeDevice>) -> Vec<LifecycleEvent> {
        let mut order = Vec::new();
        let mut next = BTreeMap::new();
        for device in devices {
            let Some(definition) = device.definition else {
                continue;
            };
            let id = DeviceId::new(device.ieee_address);
            if id.is_blank() || next.contains_key(&id) {
                continue;
            }
            order.push(id.clone());
            next.insert(
                id,
                Tracked {
                    friendly_name: device.friendly_name,
                    model: ModelId::new(definition.model),
                },
            );
        }

        let mut events: Vec<LifecycleEvent> = self
            .known
            .keys()
            .filter(|id| !next.contains_key(*id))
            .map(|id| LifecycleEvent::DeviceRemoved { id: id.clone() })
            .collect();

        for id in order {
            let Some(current) = next.get(&id) else {
                continue;
            };
            match self.known.get(&id) {
                None => events.push(state_published(&id, current)),
                Some(previous) => {
                    if previous.friendly_name != current.friendly_name {
                        events.push(LifecycleEvent::EntityRenamed {
                            id: id.clone(),
                            from: previous.friendly_name.clone(),
                            to: current.friendly_name.clone(),
                        });
                    }
                    if previous.model != current.model {
                        events.push(state_published(&id, current));
                    }
                }
            }
        }

        self.known = next;
        events
    }

    /// Number of devices with a definition in the last list.
    pub(crate) fn len(&self) -> usize {
        self.known.len()
    }
}

fn state_published(id: &DeviceId, tracked: &Tracked) -> LifecycleEvent {
    LifecycleEvent::EntityStatePublished {
        id: id.clone(),
        friendly_name: tracked.friendly_name.clone(),
        model: Some(tracked.model.clone()),
    }
}
