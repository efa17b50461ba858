//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent violations of the topic-tree invariants.
/// These are independent of generation and I/O concerns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid topic id: {0:?}")]
    InvalidTopicId(String),

    #[error("topic not found: {0}")]
    TopicNotFound(String),

    #[error("parent not found: {0}")]
    ParentNotFound(String),

    #[error("no topics to append under: {0}")]
    EmptyTopics(String),

    #[error("topic prompt must not be blank")]
    BlankPrompt,

    #[error("invalid seed: {0}")]
    InvalidSeed(String),

    #[error("inconsistent tree: {0}")]
    InconsistentTree(String),
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
