//! Errors surfaced by the lifecycle controller.

use thiserror::Error;
use uuid::Uuid;

use crate::repository::RepositoryError;

/// Errors that abort a health monitor request.
///
/// Executor failures are deliberately absent: they are absorbed by the
/// controller and only show up as a listener operating status of ERROR.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControlError {
    /// The requested resource does not exist.
    #[error("{resource} {id} not found")]
    NotFound { resource: &'static str, id: Uuid },

    /// The pool already has a health monitor.
    #[error("pool {pool_id} already has a health monitor")]
    DuplicateResource { pool_id: Uuid },

    /// The resource tree is owned by another in-flight mutation.
    #[error("{resource} {id} is immutable and cannot be updated")]
    ImmutableObject { resource: &'static str, id: Uuid },

    /// The store rejected a field value.
    #[error("invalid value {value:?} for option {option}")]
    InvalidOption { option: String, value: String },

    /// The mutation task was cancelled by runtime shutdown.
    #[error("request interrupted before completion")]
    Interrupted,

    /// Any other persistence failure.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl ControlError {
    /// Map a failed lookup, keeping missing records as `NotFound`.
    pub fn from_read(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { resource, id } => Self::NotFound { resource, id },
            other => Self::Repository(other),
        }
    }

    /// Map a failed write to the error the caller should see.
    pub fn from_write(err: RepositoryError, pool_id: Uuid) -> Self {
        match err {
            RepositoryError::InvalidValue { field, value } => Self::InvalidOption {
                option: field.to_string(),
                value,
            },
            RepositoryError::Conflict(_) => Self::DuplicateResource { pool_id },
            RepositoryError::NotFound { resource, id } => Self::NotFound { resource, id },
            other => Self::Repository(other),
        }
    }
}
