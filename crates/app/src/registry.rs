//! Device registry — process-lifetime table of tracked devices.
//!
//! The registry is only ever touched by the sync task, one event at a time, so
//! it is a plain map with no interior locking.

use std::collections::HashMap;

use thingsync_domain::device::DeviceRecord;
use thingsync_domain::error::NotFoundError;
use thingsync_domain::id::DeviceId;

/// Devices currently attached to the host and carrying a model.
#[derive(Debug, Default)]
pub struct DeviceRegistry {
    devices: HashMap<DeviceId, DeviceRecord>,
}

impl DeviceRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `record`, overwriting any record with the same id.
    pub fn upsert(&mut self, record: DeviceRecord) {
        self.devices.insert(record.id.clone(), record);
    }

    /// Change the friendly name of a tracked device.
    ///
    /// Returns the name the device held before, i.e. the topic that must now
    /// be retracted.
    ///
    /// # Errors
    ///
    /// Returns [`NotFoundError`] when `id` is not tracked; the registry is left
    /// unchanged.
    pub fn rename(
        &mut self,
        id: &DeviceId,
        friendly_name: impl Into<String>,
    ) -> Result<String, NotFoundError> {
        let record = self.devices.get_mut(id).ok_or_else(|| not_found(id))?;
        Ok(record.rename(friendly_name))
    }

    /// Stop tracking a device, returning the name it was last published under.
    ///
    /// # Errors
    ///
    /// Returns [`NotFoundError`] when `id` is not tracked.
    pub fn remove(&mut self, id: &DeviceId) -> Result<String, NotFoundError> {
        self.devices
            .remove(id)
            .map(|record| record.friendly_name)
            .ok_or_else(|| not_found(id))
    }

    #[must_use]
    pub fn get(&self, id: &DeviceId) -> Option<&DeviceRecord> {
        self.devices.get(id)
    }

    #[must_use]
    pub fn contains(&self, id: &DeviceId) -> bool {
        self.devices.contains_key(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}

fn not_found(id: &DeviceId) -> NotFoundError {
    NotFoundError {
        entity: "Device",
        id: id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bulb() -> DeviceRecord {
        DeviceRecord::builder()
            .id("0x000b57fffec6a5b2")
            .friendly_name("bulb")
            .model("AC03641")
            .build()
            .unwrap()
    }

    #[test]
    fn should_store_record_on_upsert() {
        let mut registry = DeviceRegistry::new();
        registry.upsert(bulb());
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(&bulb().id), Some(&bulb()));
    }

    #[test]
    fn should_keep_single_record_when_upserted_twice() {
        let mut registry = DeviceRegistry::new();
        registry.upsert(bulb());
        registry.upsert(bulb());
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(&bulb().id), Some(&bulb()));
    }

    #[test]
    fn should_overwrite_record_on_upsert_with_new_name() {
        let mut registry = DeviceRegistry::new();
        registry.upsert(bulb());
        let mut renamed = bulb();
        renamed.friendly_name = "lamp".to_string();
        registry.upsert(renamed);
        assert_eq!(registry.get(&bulb().id).unwrap().friendly_name, "lamp");
    }

    #[test]
    fn should_return_previous_name_on_rename() {
        let mut registry = DeviceRegistry::new();
        registry.upsert(bulb());
        let old = registry.rename(&bulb().id, "smartlight").unwrap();
        assert_eq!(old, "bulb");
        let record = registry.get(&bulb().id).unwrap();
        assert_eq!(record.friendly_name, "smartlight");
        assert_eq!(record.model.as_str(), "AC03641");
    }

    #[test]
    fn should_fail_rename_of_unknown_device() {
        let mut registry = DeviceRegistry::new();
        let err = registry
            .rename(&DeviceId::new("0xdead"), "smartlight")
            .unwrap_err();
        assert_eq!(err.id, "0xdead");
        assert!(registry.is_empty());
    }

    #[test]
    fn should_return_last_name_on_remove() {
        let mut registry = DeviceRegistry::new();
        registry.upsert(bulb());
        registry.rename(&bulb().id, "smartlight").unwrap();
        let last = registry.remove(&bulb().id).unwrap();
        assert_eq!(last, "smartlight");
        assert!(!registry.contains(&bulb().id));
    }

    #[test]
    fn should_fail_remove_of_unknown_device() {
        let mut registry = DeviceRegistry::new();
        registry.upsert(bulb());
        assert!(registry.remove(&DeviceId::new("0xdead")).is_err());
        assert_eq!(registry.len(), 1);
    }
}
