//! Error types for the trigger registry.

use thiserror::Error;

/// Result type alias for registry operations.
pub type StateResult<T> = Result<T, StateError>;

/// Errors that can occur during registry operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StateError {
    #[error("there is no such trigger: {0}")]
    NotFound(String),

    #[error("duplicate trigger: {0}")]
    DuplicateTrigger(String),
}
