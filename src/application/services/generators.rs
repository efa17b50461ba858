//! Completion-backed topic and article generators.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, instrument};

use crate::application::generator::{ArticleGenerator, ChildGenerator};
use crate::application::prompts::{
    build_article_prompt, build_topics_prompt, parse_children, ARTICLE_SYSTEM_PROMPT,
    TOPICS_SYSTEM_PROMPT,
};
use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{NewTopic, PathEntry, TopicId};
use crate::infrastructure::traits::{ChatMessage, CompletionClient};

/// Asks a completion endpoint for subtopics.
pub struct LlmChildGenerator {
    client: Arc<dyn CompletionClient>,
    min_children: usize,
    max_children: usize,
}

impl LlmChildGenerator {
    pub fn new(client: Arc<dyn CompletionClient>, min_children: usize, max_children: usize) -> Self {
        Self {
            client,
            min_children,
            max_children,
        }
    }
}

#[async_trait]
impl ChildGenerator for LlmChildGenerator {
    #[instrument(level = "debug", skip(self, path), fields(path_len = path.len()))]
    async fn generate_children(
        &self,
        prompt: &str,
        parent: &TopicId,
        path: &[PathEntry],
    ) -> ApplicationResult<Vec<NewTopic>> {
        let messages = [
            ChatMessage::system(TOPICS_SYSTEM_PROMPT),
            ChatMessage::user(build_topics_prompt(
                prompt,
                path,
                self.min_children,
                self.max_children,
            )),
        ];
        let reply = self.client.complete(&messages).await?;
        let topics = parse_children(&reply, self.max_children)?;
        debug!("generate_children: {} topics for {}", topics.len(), parent);
        Ok(topics)
    }
}

/// Asks a completion endpoint for a markdown article.
pub struct LlmArticleGenerator {
    client: Arc<dyn CompletionClient>,
}

impl LlmArticleGenerator {
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ArticleGenerator for LlmArticleGenerator {
    #[instrument(level = "debug", skip(self, path), fields(path_len = path.len()))]
    async fn generate_article(&self, path: &[PathEntry]) -> ApplicationResult<String> {
        let messages = [
            ChatMessage::system(ARTICLE_SYSTEM_PROMPT),
            ChatMessage::user(build_article_prompt(path)?),
        ];
        let markdown = self.client.complete(&messages).await?;
        if markdown.trim().is_empty() {
            return Err(ApplicationError::InvalidResponse("empty article".to_string()));
        }
        Ok(markdown)
    }
}
