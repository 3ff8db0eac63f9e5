//! Transport port — retained publishes to the discovery namespace.

use std::future::Future;

use thingsync_domain::error::ThingSyncError;
use thingsync_domain::topic::RetainedMessage;

/// Hands retained messages to the broker.
///
/// The returned future resolves once the message is queued for delivery, not
/// once the broker acknowledges it. Implementations must keep messages in the
/// order `publish` was called; retained-state correctness depends on it.
pub trait DiscoveryTransport {
    /// Queue a retained message. A `None` payload clears the topic.
    fn publish(
        &self,
        message: RetainedMessage,
    ) -> impl Future<Output = Result<(), ThingSyncError>> + Send;
}

impl<T: DiscoveryTransport + Send + Sync> DiscoveryTransport for std::sync::Arc<T> {
    fn publish(
        &self,
        message: RetainedMessage,
    ) -> impl Future<Output = Result<(), ThingSyncError>> + Send {
        (**self).publish(message)
    }
}
