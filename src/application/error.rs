//! Application-level errors (wraps domain errors)

use thiserror::Error;

use crate::domain::DomainError;

/// Application errors wrap domain errors and add application-level context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("invalid token")]
    Unauthenticated,

    #[error("unexpected redirect to: {location}")]
    Redirected { location: String },

    #[error("request failed with status {status}")]
    Remote { status: u16 },

    #[error("no token provided")]
    NoToken,

    #[error("selection cancelled")]
    SelectionCancelled,

    #[error("no {0} available to choose from")]
    NothingToChoose(&'static str),

    #[error("confirm URL not found in login response")]
    ConfirmUrlMissing,

    #[error("invalid response from {context}: {message}")]
    InvalidResponse { context: String, message: String },

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
