//! Description sync — reacts to lifecycle events by updating the registry and
//! publishing or retracting descriptions.
//!
//! Events are handled strictly one at a time: the registry mutation and every
//! publish/retract it implies are issued before the next event is looked at.
//! A rename always retracts the old topic *before* publishing the new one.

use tokio::sync::mpsc;

use thingsync_domain::device::DeviceRecord;
use thingsync_domain::error::ThingSyncError;
use thingsync_domain::event::LifecycleEvent;
use thingsync_domain::id::{DeviceId, ModelId};

use crate::ports::{DiscoveryTransport, InterfaceAddresses, TemplateStore};
use crate::registry::DeviceRegistry;
use crate::services::description_publisher::DescriptionPublisher;

/// Owns the registry and drives the publisher from lifecycle events.
pub struct DescriptionSync<T, S, N> {
    registry: DeviceRegistry,
    publisher: DescriptionPublisher<T, S, N>,
}

impl<T, S, N> DescriptionSync<T, S, N>
where
    T: DiscoveryTransport,
    S: TemplateStore,
    N: InterfaceAddresses,
{
    /// Create a sync with an empty registry.
    pub fn new(publisher: DescriptionPublisher<T, S, N>) -> Self {
        Self {
            registry: DeviceRegistry::new(),
            publisher,
        }
    }

    /// Read-only view of the tracked devices.
    #[must_use]
    pub fn registry(&self) -> &DeviceRegistry {
        &self.registry
    }

    /// Apply one lifecycle event.
    ///
    /// Failures are contained: they are logged and the sync stays ready for
    /// the next event.
    #[tracing::instrument(skip(self, event), fields(event = %event.kind(), device = %event.device_id()))]
    pub async fn handle(&mut self, event: LifecycleEvent) {
        let result = match event {
            LifecycleEvent::EntityStatePublished {
                id,
                friendly_name,
                model,
            } => self.on_state_published(id, friendly_name, model).await,
            LifecycleEvent::EntityRenamed { id, from, to } => {
                self.on_renamed(&id, &from, to).await
            }
            LifecycleEvent::DeviceRemoved { id } => self.on_removed(&id).await,
        };

        if let Err(err) = result {
            tracing::warn!(error = ?err, "lifecycle event could not be fully applied");
        }
    }

    /// Drain `events` until every sender is dropped.
    pub async fn run(mut self, mut events: mpsc::UnboundedReceiver<LifecycleEvent>) {
        tracing::info!("description sync started");
        while let Some(event) = events.recv().await {
            self.handle(event).await;
        }
        tracing::info!(devices = self.registry.len(), "description sync stopped");
    }

    async fn on_state_published(
        &mut self,
        id: DeviceId,
        friendly_name: String,
        model: Option<ModelId>,
    ) -> Result<(), ThingSyncError> {
        let Some(model) = model else {
            tracing::debug!("device has no model definition, not registering");
            return Ok(());
        };

        let record = DeviceRecord {
            id,
            friendly_name,
            model,
        };
        record.validate()?;
        let id = record.id.clone();
        self.registry.upsert(record);

        self.publish(&id).await
    }

    async fn on_renamed(
        &mut self,
        id: &DeviceId,
        from: &str,
        to: String,
    ) -> Result<(), ThingSyncError> {
        let previous = match self.registry.rename(id, to) {
            Ok(previous) => previous,
            Err(err) => {
                tracing::warn!(%err, "ignoring rename of unregistered device");
                return Ok(());
            }
        };
        if previous != from {
            tracing::debug!(
                registered = %previous,
                reported = %from,
                "rename source differs from registry, retracting registered name"
            );
        }

        self.publisher.retract(&previous).await?;
        self.publish(id).await
    }

    async fn on_removed(&mut self, id: &DeviceId) -> Result<(), ThingSyncError> {
        let last_name = match self.registry.remove(id) {
            Ok(name) => name,
            Err(err) => {
                tracing::warn!(%err, "ignoring removal of unregistered device");
                return Ok(());
            }
        };
        self.publisher.retract(&last_name).await
    }

    async fn publish(&self, id: &DeviceId) -> Result<(), ThingSyncError> {
        let outcome = self.publisher.publish(&self.registry, id).await?;
        if !outcome.is_published() {
            tracing::debug!(?outcome, "description not published");
        }
        Ok(())
    }
}
