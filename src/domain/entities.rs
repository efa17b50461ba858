//! Domain entities: input and output shapes of the topic tree

use serde::{Deserialize, Serialize};

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::topic_id::TopicId;

/// Topic as it appears in seed data: a prompt plus nested children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedTopic {
    pub prompt: String,
    #[serde(default)]
    pub children: Vec<SeedTopic>,
}

impl SeedTopic {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            children: Vec::new(),
        }
    }

    pub fn with_children(prompt: impl Into<String>, children: Vec<SeedTopic>) -> Self {
        Self {
            prompt: prompt.into(),
            children,
        }
    }

    /// Check that this topic and all descendants carry a non-blank prompt.
    pub fn validate(&self) -> DomainResult<()> {
        let mut stack = vec![self];
        while let Some(topic) = stack.pop() {
            if topic.prompt.trim().is_empty() {
                return Err(DomainError::InvalidSeed("blank prompt in seed".to_string()));
            }
            stack.extend(topic.children.iter());
        }
        Ok(())
    }
}

/// Topic to append under an existing parent.
///
/// Incoming `children` are ignored during deserialization: appended topics
/// always start as leaves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTopic {
    pub prompt: String,
}

impl NewTopic {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
        }
    }
}

/// One `{prompt, id}` step of a path through the forest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathEntry {
    pub prompt: String,
    pub id: TopicId,
}

/// Owned, nested copy of a topic and its subtree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopicSnapshot {
    pub prompt: String,
    pub id: TopicId,
    #[serde(rename = "parentId")]
    pub parent_id: Option<TopicId>,
    pub children: Vec<TopicSnapshot>,
}

/// Read-only flags derived from the cursor position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NavigationFlags {
    /// Cursor is a root.
    pub is_at_top: bool,
    /// Cursor has no children.
    pub is_at_bottom: bool,
    pub can_descend: bool,
    pub can_ascend: bool,
}

/// Expand `~`, `$VAR` and `${VAR}` in a path-like string.
///
/// Falls back to the input when a variable is undefined.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}
