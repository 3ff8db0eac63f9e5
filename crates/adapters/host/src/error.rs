//! Host adapter error types.

use std::path::PathBuf;

use thingsync_domain::error::ThingSyncError;

/// Errors originating from the template directory.
#[derive(Debug, thiserror::Error)]
pub enum TemplateStoreError {
    /// The template file exists but could not be read.
    #[error("failed to read template {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<TemplateStoreError> for ThingSyncError {
    fn from(err: TemplateStoreError) -> Self {
        Self::Transport(Box::new(err))
    }
}
