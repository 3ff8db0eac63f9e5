//! Lifecycle events emitted by the host device-management system.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::id::{DeviceId, ModelId};

/// Something that happened to a device on the host side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LifecycleEvent {
    /// The host published fresh state for a device. `model` is `None` when the
    /// host could not resolve a model definition for it.
    EntityStatePublished {
        id: DeviceId,
        friendly_name: String,
        model: Option<ModelId>,
    },
    /// The device's friendly name changed from `from` to `to`.
    EntityRenamed {
        id: DeviceId,
        from: String,
        to: String,
    },
    /// The device left the network or was deleted by the user.
    DeviceRemoved { id: DeviceId },
}

impl LifecycleEvent {
    /// The device this event is about.
    #[must_use]
    pub fn device_id(&self) -> &DeviceId {
        match self {
            Self::EntityStatePublished { id, .. }
            | Self::EntityRenamed { id, .. }
            | Self::DeviceRemoved { id } => id,
        }
    }

    /// Short name used in log fields.
    #[must_use]
    pub fn kind(&self) -> LifecycleEventKind {
        match self {
            Self::EntityStatePublished { .. } => LifecycleEventKind::EntityStatePublished,
            Self::EntityRenamed { .. } => LifecycleEventKind::EntityRenamed,
            Self::DeviceRemoved { .. } => LifecycleEventKind::DeviceRemoved,
        }
    }
}

/// Discriminant of a [`LifecycleEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleEventKind {
    EntityStatePublished,
    EntityRenamed,
    DeviceRemoved,
}

impl fmt::Display for LifecycleEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::EntityStatePublished => "entity_state_published",
            Self::EntityRenamed => "entity_renamed",
            Self::DeviceRemoved => "device_removed",
        };
        f.write_str(s)
    }
}
