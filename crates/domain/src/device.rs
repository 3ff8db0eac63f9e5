//! Device record — what the registry remembers about one attached device.
//!
//! Only the fields needed to render and address a thing description are
//! copied out of the host: the identifier, the current friendly name and the
//! model identifier.

use serde::{Deserialize, Serialize};

use crate::error::{ThingSyncError, ValidationError};
use crate::id::{DeviceId, ModelId};

/// A device tracked by the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRecord {
    pub id: DeviceId,
    /// Name the device's description is currently published under.
    pub friendly_name: String,
    pub model: ModelId,
}

impl DeviceRecord {
    /// Create a builder for constructing a [`DeviceRecord`].
    #[must_use]
    pub fn builder() -> DeviceRecordBuilder {
        DeviceRecordBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ThingSyncError::Validation`] when the id, name or model is blank.
    pub fn validate(&self) -> Result<(), ThingSyncError> {
        if self.id.is_blank() {
            return Err(ValidationError::EmptyDeviceId.into());
        }
        if self.friendly_name.trim().is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        if self.model.is_blank() {
            return Err(ValidationError::EmptyModel.into());
        }
        Ok(())
    }

    /// Replace the friendly name, returning the previous one.
    pub fn rename(&mut self, friendly_name: impl Into<String>) -> String {
        std::mem::replace(&mut self.friendly_name, friendly_name.into())
    }
}

/// Step-by-step builder for [`DeviceRecord`].
#[derive(Debug, Default)]
pub struct DeviceRecordBuilder {
    id: Option<DeviceId>,
    friendly_name: Option<String>,
    model: Option<ModelId>,
}

impl DeviceRecordBuilder {
    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(DeviceId::new(id));
        self
    }

    #[must_use]
    pub fn friendly_name(mut self, name: impl Into<String>) -> Self {
        self.friendly_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(ModelId::new(model));
        self
    }

    /// Consume the builder, validate, and return a [`DeviceRecord`].
    ///
    /// # Errors
    ///
    /// Returns [`ThingSyncError::Validation`] if a field is missing or blank.
    pub fn build(self) -> Result<DeviceRecord, ThingSyncError> {
        let record = DeviceRecord {
            id: self.id.unwrap_or_else(|| DeviceId::new("")),
            friendly_name: self.friendly_name.unwrap_or_default(),
            model: self.model.unwrap_or_else(|| ModelId::new("")),
        };
        record.validate()?;
        Ok(record)
    }
}
