//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use tracing::debug;

use crate::application::services::{
    ArticleStore, LlmArticleGenerator, LlmChildGenerator, SeedService,
};
use crate::application::{ApplicationError, ExplorerSession};
use crate::config::Settings;
use crate::domain::TopicTreeController;
use crate::infrastructure::completion::{ApiCompletionClient, ApiCompletionConfig};
use crate::infrastructure::error::InfraResult;
use crate::infrastructure::traits::{
    CompletionClient, FileSystem, RealFileSystem, Selector, SkimSelector,
};

/// Container holding all application services.
///
/// The completion client is only built when a generator is requested, so
/// offline commands work without an API key.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    /// Interactive selector abstraction
    pub selector: Arc<dyn Selector>,

    completion: Option<Arc<dyn CompletionClient>>,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        Self::with_deps(
            settings,
            Arc::new(RealFileSystem),
            Arc::new(SkimSelector),
            None,
        )
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(
        settings: Settings,
        fs: Arc<dyn FileSystem>,
        selector: Arc<dyn Selector>,
        completion: Option<Arc<dyn CompletionClient>>,
    ) -> Self {
        let settings = Arc::new(settings);

        Self {
            settings,
            fs,
            selector,
            completion,
        }
    }

    /// Completion client: the injected one, or an HTTP client from settings.
    pub fn completion_client(&self) -> InfraResult<Arc<dyn CompletionClient>> {
        if let Some(client) = &self.completion {
            return Ok(Arc::clone(client));
        }
        let config = ApiCompletionConfig::from_settings(&self.settings.llm)
            .map_err(ApplicationError::from)?;
        debug!("completion client: {} at {}", config.model, config.base_url);
        let client = ApiCompletionClient::new(config).map_err(ApplicationError::from)?;
        Ok(Arc::new(client))
    }

    pub fn seed_service(&self) -> SeedService {
        SeedService::new(Arc::clone(&self.fs))
    }

    /// Initial topic tree from the configured seed file.
    pub fn load_tree(&self) -> InfraResult<TopicTreeController> {
        let tree = self
            .seed_service()
            .load(self.settings.seed_file.as_deref(), &self.settings.default_topic)?;
        Ok(tree)
    }

    /// Session over the configured seed forest with completion-backed generators.
    pub fn explorer_session(&self) -> InfraResult<ExplorerSession> {
        let client = self.completion_client()?;
        let children = LlmChildGenerator::new(
            Arc::clone(&client),
            self.settings.llm.min_children,
            self.settings.llm.max_children,
        );
        let articles = LlmArticleGenerator::new(client);
        Ok(ExplorerSession::new(
            self.load_tree()?,
            Arc::new(children),
            Arc::new(articles),
        ))
    }

    /// Article store, if an article directory is configured.
    pub fn article_store(&self) -> Option<ArticleStore> {
        self.settings
            .article_dir
            .as_ref()
            .map(|dir| ArticleStore::new(Arc::clone(&self.fs), dir.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::application::ApplicationError;
    use crate::infrastructure::error::{CompletionError, InfraError};
    use crate::infrastructure::traits::ChatMessage;

    struct StaticClient;

    #[async_trait]
    impl CompletionClient for StaticClient {
        async fn complete(&self, _messages: &[ChatMessage]) -> Result<String, CompletionError> {
            Ok(r#"{"children":[{"prompt":"Dune"},{"prompt":"Alien"}]}"#.to_string())
        }
    }

    fn container(completion: Option<Arc<dyn CompletionClient>>) -> ServiceContainer {
        ServiceContainer::with_deps(
            Settings::default(),
            Arc::new(RealFileSystem),
            Arc::new(SkimSelector),
            completion,
        )
    }

    #[test]
    fn given_no_api_key_when_building_client_then_config_error() {
        let result = container(None).completion_client();
        assert!(matches!(
            result,
            Err(InfraError::Application(ApplicationError::Completion(
                CompletionError::Config(_)
            )))
        ));
    }

    #[test]
    fn given_no_api_key_when_loading_tree_then_offline_tree_available() {
        let tree = container(None).load_tree().unwrap();
        assert_eq!(tree.current().prompt, crate::domain::DEFAULT_TOPIC);
    }

    #[tokio::test]
    async fn given_injected_client_when_exploring_then_generation_uses_it() {
        let mut session = container(Some(Arc::new(StaticClient)))
            .explorer_session()
            .unwrap();

        let ids = session.generate_children().await.unwrap();

        assert_eq!(ids.len(), 2);
        assert_eq!(session.tree().current().prompt, "Dune");
    }

    #[test]
    fn given_no_article_dir_when_asking_for_store_then_none() {
        assert!(container(None).article_store().is_none());
    }
}
