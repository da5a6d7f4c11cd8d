//! CLI-level errors (wraps infrastructure errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;
use crate::infrastructure::InfraError;

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

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Usage(_) => crate::exitcode::USAGE,
            CliError::Infra(e) => match e {
                InfraError::Http(_) => crate::exitcode::SOFTWARE,
                InfraError::Application(app) => application_exit_code(app),
            },
        }
    }
}

fn application_exit_code(e: &ApplicationError) -> i32 {
    use crate::exitcode::*;
    match e {
        ApplicationError::Unauthenticated | ApplicationError::NoToken => NOPERM,
        ApplicationError::Redirected { .. } | ApplicationError::Remote { .. } => UNAVAILABLE,
        ApplicationError::InvalidResponse { .. } | ApplicationError::ConfirmUrlMissing => PROTOCOL,
        ApplicationError::SelectionCancelled => FAILURE,
        ApplicationError::NothingToChoose(_) => NOINPUT,
        ApplicationError::Config { .. } => CONFIG,
        ApplicationError::OperationFailed { .. } => IOERR,
        ApplicationError::Domain(DomainError::FlagNotFound(_)) => NOINPUT,
        ApplicationError::Domain(DomainError::InvalidRollout(_)) => DATAERR,
        ApplicationError::Domain(DomainError::IncompleteSession(_)) => CONFIG,
    }
}
