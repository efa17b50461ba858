//! Explorer session: one topic tree, its generators and the generation gate.

use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::Local;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::application::generator::{Article, ArticleGenerator, ChildGenerator, ChildRequest};
use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{NewTopic, ParentRef, PathEntry, TopicId, TopicTreeController};

/// Number of entries kept in the session debug log.
pub const DEBUG_LOG_CAPACITY: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    Left,
    Right,
    Up,
    Down,
}

impl FromStr for Gesture {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "l" | "left" => Ok(Gesture::Left),
            "r" | "right" => Ok(Gesture::Right),
            "u" | "up" => Ok(Gesture::Up),
            "d" | "down" => Ok(Gesture::Down),
            other => Err(format!("unknown gesture: {other}")),
        }
    }
}

impl fmt::Display for Gesture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Gesture::Left => "left",
            Gesture::Right => "right",
            Gesture::Up => "up",
            Gesture::Down => "down",
        };
        write!(f, "{name}")
    }
}

/// Outcome of a gesture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwipeAction {
    /// Pure navigation; `moved` is false when the gesture was a no-op.
    Navigated { moved: bool },
    /// Cursor is a leaf: the caller should run this request and hand the
    /// result back via `complete_children_request`.
    GenerateChildren(ChildRequest),
    /// The caller should produce an article for this path.
    GenerateArticle(Vec<PathEntry>),
}

/// Interactive exploration state for one user.
///
/// Navigation is always allowed; only child generation is gated, so at most
/// one request is outstanding at a time.
pub struct ExplorerSession {
    id: Uuid,
    tree: TopicTreeController,
    children: Arc<dyn ChildGenerator>,
    articles: Arc<dyn ArticleGenerator>,
    generating: bool,
    debug_log: VecDeque<String>,
}

impl ExplorerSession {
    pub fn new(
        tree: TopicTreeController,
        children: Arc<dyn ChildGenerator>,
        articles: Arc<dyn ArticleGenerator>,
    ) -> Self {
        let id = Uuid::new_v4();
        debug!("session {}: {} topics", id, tree.len());
        Self {
            id,
            tree,
            children,
            articles,
            generating: false,
            debug_log: VecDeque::with_capacity(DEBUG_LOG_CAPACITY),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn tree(&self) -> &TopicTreeController {
        &self.tree
    }

    pub fn is_generating(&self) -> bool {
        self.generating
    }

    pub fn child_generator(&self) -> Arc<dyn ChildGenerator> {
        Arc::clone(&self.children)
    }

    pub fn article_generator(&self) -> Arc<dyn ArticleGenerator> {
        Arc::clone(&self.articles)
    }

    /// Debug log entries, newest first.
    pub fn debug_log(&self) -> impl Iterator<Item = &str> {
        self.debug_log.iter().map(String::as_str)
    }

    /// Record a timestamped entry in the debug log.
    pub fn note(&mut self, message: impl AsRef<str>) {
        let entry = format!("{}: {}", Local::now().format("%H:%M:%S"), message.as_ref());
        debug!("note: {}", entry);
        self.debug_log.push_front(entry);
        self.debug_log.truncate(DEBUG_LOG_CAPACITY);
    }

    /// Apply a gesture to the tree.
    ///
    /// Right at a leaf starts a child request, which fails while another one
    /// is outstanding.
    #[instrument(level = "debug", skip(self), fields(session = %self.id))]
    pub fn swipe(&mut self, gesture: Gesture) -> ApplicationResult<SwipeAction> {
        let from = self.tree.current_id().clone();
        let action = match gesture {
            Gesture::Left => SwipeAction::Navigated {
                moved: self.tree.advance_sibling()?,
            },
            Gesture::Right if self.tree.can_descend() => SwipeAction::Navigated {
                moved: self.tree.descend(),
            },
            Gesture::Right => SwipeAction::GenerateChildren(self.begin_children_request()?),
            Gesture::Up => SwipeAction::Navigated {
                moved: self.tree.ascend(),
            },
            Gesture::Down => SwipeAction::GenerateArticle(self.article_path()?),
        };
        if let SwipeAction::Navigated { moved } = action {
            let to = self.tree.current_id().clone();
            if moved {
                self.note(format!("Swiped {gesture}: {from} -> {to}"));
            } else {
                self.note(format!("Swiped {gesture}: stayed at {from}"));
            }
        }
        Ok(action)
    }

    /// Mark generation as started for the cursor topic.
    #[instrument(level = "debug", skip(self), fields(session = %self.id))]
    pub fn begin_children_request(&mut self) -> ApplicationResult<ChildRequest> {
        if self.generating {
            warn!("begin_children_request: already generating");
            return Err(ApplicationError::GenerationInProgress);
        }
        let current = self.tree.current();
        let request = ChildRequest {
            parent: current.id.clone(),
            prompt: current.prompt.clone(),
            path: self.tree.full_path(&current.id),
        };
        self.generating = true;
        self.note(format!("Generating subtopics for: {}", request.prompt));
        Ok(request)
    }

    /// Apply the result of a child request and clear the generation flag.
    ///
    /// Topics land under `request.parent` regardless of where the cursor is
    /// now; a later result for the same parent simply appends again.
    #[instrument(level = "debug", skip(self, result), fields(session = %self.id, parent = %request.parent))]
    pub fn complete_children_request(
        &mut self,
        request: ChildRequest,
        result: ApplicationResult<Vec<NewTopic>>,
    ) -> ApplicationResult<Vec<TopicId>> {
        self.generating = false;
        let topics = match result {
            Ok(topics) if topics.is_empty() => {
                self.note(format!("No new topics generated for: {}", request.prompt));
                return Err(ApplicationError::NoTopicsGenerated(request.prompt));
            }
            Ok(topics) => topics,
            Err(e) => {
                self.note(format!("Error generating topics: {e}"));
                return Err(e);
            }
        };

        let ids = self
            .tree
            .append_children(&ParentRef::Topic(request.parent.clone()), topics)?;
        info!("{} subtopics added under {}", ids.len(), request.parent);
        self.note(format!(
            "Added {} subtopics to {}",
            ids.len(),
            request.prompt
        ));
        Ok(ids)
    }

    /// Run a child request against `generator`, detached from any session.
    pub async fn run_children_request(
        generator: Arc<dyn ChildGenerator>,
        request: ChildRequest,
    ) -> (ChildRequest, ApplicationResult<Vec<NewTopic>>) {
        let result = generator
            .generate_children(&request.prompt, &request.parent, &request.path)
            .await;
        (request, result)
    }

    /// Generate and append subtopics for the cursor topic in one step.
    pub async fn generate_children(&mut self) -> ApplicationResult<Vec<TopicId>> {
        let request = self.begin_children_request()?;
        let (request, result) =
            Self::run_children_request(Arc::clone(&self.children), request).await;
        self.complete_children_request(request, result)
    }

    /// Add a topic next to the cursor and move onto it.
    #[instrument(level = "debug", skip(self), fields(session = %self.id))]
    pub fn add_topic(&mut self, prompt: &str) -> ApplicationResult<TopicId> {
        let parent = match self.tree.current().id.parent() {
            Some(parent) => ParentRef::Topic(parent),
            None => ParentRef::Root,
        };
        let ids = self
            .tree
            .append_children(&parent, vec![NewTopic::new(prompt)])?;
        let id = ids.into_iter().next().ok_or(ApplicationError::NoTopicsGenerated(
            prompt.to_string(),
        ))?;
        self.note(format!("Added topic {} under {}", id, parent));
        Ok(id)
    }

    /// Move the cursor to `id`; returns whether it was found.
    pub fn switch_to(&mut self, id: &TopicId) -> bool {
        let found = self.tree.switch_to(id);
        if found {
            self.note(format!("Switched to {id}"));
        } else {
            self.note(format!("Topic {id} not found"));
        }
        found
    }

    /// Path handed to the article generator for the cursor topic.
    pub fn article_path(&self) -> ApplicationResult<Vec<PathEntry>> {
        let path = self.tree.full_path(self.tree.current_id());
        if path.is_empty() {
            return Err(ApplicationError::EmptyPath);
        }
        Ok(path)
    }

    /// Write an article about the cursor topic.
    pub async fn generate_article(&mut self) -> ApplicationResult<Article> {
        let path = self.article_path()?;
        let article = Self::run_article_request(Arc::clone(&self.articles), path).await;
        match &article {
            Ok(article) => self.note(format!("Generated article: {}", article.title)),
            Err(e) => self.note(format!("Error generating article: {e}")),
        }
        article
    }

    /// Run an article request against `generator`, detached from any session.
    pub async fn run_article_request(
        generator: Arc<dyn ArticleGenerator>,
        path: Vec<PathEntry>,
    ) -> ApplicationResult<Article> {
        let title = path
            .last()
            .map(|entry| entry.prompt.clone())
            .ok_or(ApplicationError::EmptyPath)?;
        let markdown = generator.generate_article(&path).await?;
        Ok(Article {
            title,
            path,
            markdown,
        })
    }
}

impl fmt::Debug for ExplorerSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExplorerSession")
            .field("id", &self.id)
            .field("tree", &self.tree)
            .field("generating", &self.generating)
            .finish_non_exhaustive()
    }
}
