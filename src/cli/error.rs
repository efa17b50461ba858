//! CLI-level errors (wraps infrastructure errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;
use crate::infrastructure::{CompletionError, InfraError};

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Infra(#[from] InfraError),

    #[error("{0}")]
    Usage(String),
}

impl From<ApplicationError> for CliError {
    fn from(e: ApplicationError) -> Self {
        CliError::Infra(InfraError::Application(e))
    }
}

impl From<DomainError> for CliError {
    fn from(e: DomainError) -> Self {
        CliError::from(ApplicationError::Domain(e))
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Usage(_) => crate::exitcode::USAGE,
            CliError::Infra(e) => match e {
                InfraError::Io { .. } => crate::exitcode::IOERR,
                InfraError::Selector { .. } => crate::exitcode::SOFTWARE,
                InfraError::Application(e) => application_exit_code(e),
            },
        }
    }
}

fn application_exit_code(e: &ApplicationError) -> i32 {
    match e {
        ApplicationError::Config { .. } => crate::exitcode::CONFIG,
        ApplicationError::Completion(CompletionError::Config(_)) => crate::exitcode::CONFIG,
        ApplicationError::Completion(CompletionError::Rejected(_)) => crate::exitcode::CONFIG,
        ApplicationError::Completion(_) => crate::exitcode::UNAVAILABLE,
        ApplicationError::Domain(DomainError::InvalidTopicId(_)) => crate::exitcode::USAGE,
        ApplicationError::Domain(DomainError::TopicNotFound(_)) => crate::exitcode::NOINPUT,
        ApplicationError::Domain(DomainError::InvalidSeed(_)) => crate::exitcode::DATAERR,
        ApplicationError::OperationFailed { .. } => crate::exitcode::IOERR,
        _ => crate::exitcode::SOFTWARE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(CliError::Usage("x".into()), crate::exitcode::USAGE)]
    #[case(CliError::from(DomainError::TopicNotFound("9".into())), crate::exitcode::NOINPUT)]
    #[case(CliError::from(DomainError::InvalidTopicId("a-b".into())), crate::exitcode::USAGE)]
    #[case(
        CliError::from(ApplicationError::Completion(CompletionError::Config("no key".into()))),
        crate::exitcode::CONFIG
    )]
    #[case(
        CliError::from(ApplicationError::Completion(CompletionError::RateLimited)),
        crate::exitcode::UNAVAILABLE
    )]
    #[case(
        CliError::from(ApplicationError::Completion(CompletionError::Rejected("HTTP 401".into()))),
        crate::exitcode::CONFIG
    )]
    #[case(CliError::from(ApplicationError::GenerationInProgress), crate::exitcode::SOFTWARE)]
    fn test_exit_code(#[case] error: CliError, #[case] expected: i32) {
        assert_eq!(error.exit_code(), expected);
    }
}
