//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent business logic violations.
/// These are independent of infrastructure concerns.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DomainError {
    #[error("flag not found: {0}")]
    FlagNotFound(String),

    #[error("rollout percentage must be between 0 and 100, got {0}")]
    InvalidRollout(u32),

    #[error("no {0} selected for this endpoint")]
    IncompleteSession(&'static str),
}
