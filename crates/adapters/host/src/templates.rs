//! Filesystem template store.
//!
//! Templates live in one directory, one file per model, named
//! `<model>.tm.json`.

use std::path::{Path, PathBuf};

use thingsync_app::ports::TemplateStore;
use thingsync_domain::error::ThingSyncError;
use thingsync_domain::id::ModelId;

use crate::error::TemplateStoreError;

const TEMPLATE_SUFFIX: &str = ".tm.json";

/// [`TemplateStore`] reading `<dir>/<model>.tm.json`.
#[derive(Debug, Clone)]
pub struct FsTemplateStore {
    dir: PathBuf,
}

impl FsTemplateStore {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the template for `model`, or `None` when the model id could
    /// escape the template directory.
    fn path_for(&self, model: &ModelId) -> Option<PathBuf> {
        let name = model.as_str();
        if name.is_empty() || name.contains(['/', '\\']) || name.contains("..") {
            return None;
        }
        Some(self.dir.join(format!("{name}{TEMPLATE_SUFFIX}")))
    }
}

impl TemplateStore for FsTemplateStore {
    fn load(&self, model: &ModelId) -> Result<Option<String>, ThingSyncError> {
        let Some(path) = self.path_for(model) else {
            tracing::warn!(%model, "model id is not a valid template name");
            return Ok(None);
        };
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(TemplateStoreError::Read { path, source }.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_load_template_by_model() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("AC03641.tm.json"),
            "{\"title\":\"{{FRIENDLY_NAME}}\"}",
        )
        .unwrap();
        let store = FsTemplateStore::new(dir.path());

        let template = store.load(&ModelId::new("AC03641")).unwrap();
        assert_eq!(template.as_deref(), Some("{\"title\":\"{{FRIENDLY_NAME}}\"}"));
    }

    #[test]
    fn should_return_none_for_missing_template() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsTemplateStore::new(dir.path());

        assert!(store.load(&ModelId::new("E1603")).unwrap().is_none());
    }

    #[test]
    fn should_refuse_model_ids_escaping_the_directory() {
        let store = FsTemplateStore::new("thing_models");

        assert!(store.load(&ModelId::new("../secrets")).unwrap().is_none());
        assert!(store.load(&ModelId::new("a/b")).unwrap().is_none());
        assert!(store.path_for(&ModelId::new("..")).is_none());
    }

    #[test]
    fn should_fail_when_template_path_is_a_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("AC03641.tm.json")).unwrap();
        let store = FsTemplateStore::new(dir.path());

        let result = store.load(&ModelId::new("AC03641"));
        assert!(matches!(result, Err(ThingSyncError::Transport(_))));
    }
}
