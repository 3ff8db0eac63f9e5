//! Template store port — per-model thing description templates.

use thingsync_domain::error::ThingSyncError;
use thingsync_domain::id::ModelId;

/// Read-only lookup of template text by model.
///
/// Reads are local and synchronous.
pub trait TemplateStore {
    /// Load the template for `model`.
    ///
    /// Returns `Ok(None)` when no template exists for the model, which is an
    /// expected condition rather than an error.
    ///
    /// # Errors
    ///
    /// Returns an error when a template exists but cannot be read.
    fn load(&self, model: &ModelId) -> Result<Option<String>, ThingSyncError>;
}

impl<T: TemplateStore> TemplateStore for std::sync::Arc<T> {
    fn load(&self, model: &ModelId) -> Result<Option<String>, ThingSyncError> {
        (**self).load(model)
    }
}
