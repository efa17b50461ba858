//! Contracts of the asynchronous topic and article generators.

use async_trait::async_trait;
use serde::Serialize;

use crate::application::ApplicationResult;
use crate::domain::{NewTopic, PathEntry, TopicId};

/// Proposes subtopics for a topic, given the path that led to it.
#[async_trait]
pub trait ChildGenerator: Send + Sync {
    /// Generate subtopics for `prompt`.
    ///
    /// `path` runs from the root down to and including the topic itself.
    async fn generate_children(
        &self,
        prompt: &str,
        parent: &TopicId,
        path: &[PathEntry],
    ) -> ApplicationResult<Vec<NewTopic>>;
}

/// Writes a markdown article about the last topic of a path.
#[async_trait]
pub trait ArticleGenerator: Send + Sync {
    async fn generate_article(&self, path: &[PathEntry]) -> ApplicationResult<String>;
}

/// Outstanding request for subtopics of one topic.
///
/// Captures everything needed to apply the result later, even if the cursor
/// has moved on in the meantime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChildRequest {
    pub parent: TopicId,
    pub prompt: String,
    pub path: Vec<PathEntry>,
}

/// Generated article together with the path it describes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Article {
    pub title: String,
    pub path: Vec<PathEntry>,
    pub markdown: String,
}
