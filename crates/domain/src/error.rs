//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`ThingSyncError`] via `#[from]` (or `into_domain()` in adapters).

use crate::description::RenderError;

/// Top-level error shared by the domain, application, and adapter layers.
#[derive(Debug, thiserror::Error)]
pub enum ThingSyncError {
    #[error("validation error")]
    Validation(#[from] ValidationError),

    #[error("not found")]
    NotFound(#[from] NotFoundError),

    #[error("render error")]
    Render(#[from] RenderError),

    /// Failure in an outbound collaborator (broker client, template store, …).
    #[error("transport error")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// A domain invariant was violated.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("device identifier must not be empty")]
    EmptyDeviceId,

    #[error("model identifier must not be empty")]
    EmptyModel,

    #[error("{0}")]
    Invalid(String),
}

/// A lookup by identifier found nothing.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}
