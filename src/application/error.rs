//! Application-level errors (wraps domain errors)

use thiserror::Error;

use crate::domain::DomainError;
use crate::infrastructure::error::CompletionError;

/// Application errors wrap domain errors and add generation-level context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("{0}")]
    Completion(#[from] CompletionError),

    #[error("generation already in progress")]
    GenerationInProgress,

    #[error("no new topics generated for: {0}")]
    NoTopicsGenerated(String),

    #[error("cannot write an article for an empty path")]
    EmptyPath,

    #[error("unusable generator response: {0}")]
    InvalidResponse(String),

    #[error("config error: {message}")]
    Config { message: String },

    #[error("operation failed: {context}")]
    OperationFailed {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
