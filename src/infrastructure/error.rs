//! Infrastructure-level errors (wraps application errors)

use thiserror::Error;

use crate::application::ApplicationError;

/// Infrastructure errors wrap application errors and add I/O-level concerns.
#[derive(Error, Debug)]
pub enum InfraError {
    #[error("{0}")]
    Application(#[from] ApplicationError),

    #[error("I/O error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("selector failed: {message}")]
    Selector { message: String },
}

impl InfraError {
    /// Create an I/O error with context.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}

/// Failures of the completion HTTP client.
#[derive(Error, Debug)]
pub enum CompletionError {
    #[error("completion client misconfigured: {0}")]
    Config(String),

    #[error("completion API error: {0}")]
    Api(String),

    /// Client-side rejection (4xx other than 429); retrying cannot help.
    #[error("completion request rejected: {0}")]
    Rejected(String),

    #[error("completion API rate limit exceeded")]
    RateLimited,

    #[error("unreadable completion response: {0}")]
    Parse(String),
}

/// Result type for infrastructure layer operations.
pub type InfraResult<T> = Result<T, InfraError>;
