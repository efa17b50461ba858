//! Loading the initial topic forest.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::application::{ApplicationResult, IoResultExt};
use crate::domain::TopicTreeController;
use crate::infrastructure::traits::FileSystem;

/// Service building controllers from seed files.
pub struct SeedService {
    fs: Arc<dyn FileSystem>,
}

impl SeedService {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    /// Build a controller from `seed_file`, or from the default topic when
    /// no file is given.
    ///
    /// An unreadable file is an error; readable but malformed content falls
    /// back to the default topic.
    #[instrument(level = "debug", skip(self))]
    pub fn load(
        &self,
        seed_file: Option<&Path>,
        default_topic: &str,
    ) -> ApplicationResult<TopicTreeController> {
        let Some(path) = seed_file else {
            debug!("load: no seed file, using default topic");
            return Ok(TopicTreeController::with_default(None, default_topic));
        };
        let json = self
            .fs
            .read_to_string(path)
            .with_path_context("read seed file", path)?;
        Ok(TopicTreeController::from_json(&json, default_topic))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    use crate::application::ApplicationError;
    use crate::infrastructure::traits::RealFileSystem;

    fn service() -> SeedService {
        SeedService::new(Arc::new(RealFileSystem))
    }

    #[test]
    fn given_seed_file_when_loading_then_forest_built() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("seed.json");
        std::fs::write(
            &path,
            r#"[{"prompt":"Movies","children":[{"prompt":"Sci-Fi","children":[]}]}]"#,
        )
        .unwrap();

        let tree = service().load(Some(&path), "Fallback").unwrap();

        assert_eq!(tree.len(), 2);
        assert_eq!(tree.current().prompt, "Movies");
    }

    #[test]
    fn given_malformed_seed_file_when_loading_then_default_topic() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("seed.json");
        std::fs::write(&path, r#"{"prompt": "not a list"}"#).unwrap();

        let tree = service().load(Some(&path), "Fallback").unwrap();

        assert_eq!(tree.len(), 1);
        assert_eq!(tree.current().prompt, "Fallback");
    }

    #[test]
    fn given_missing_seed_file_when_loading_then_error() {
        let temp = TempDir::new().unwrap();
        let result = service().load(Some(&temp.path().join("nope.json")), "Fallback");
        assert!(matches!(
            result,
            Err(ApplicationError::OperationFailed { .. })
        ));
    }
}
