//! Error types for the helpdesk core

use serde::Serialize;
use thiserror::Error;

use crate::domain::authorization::{Capability, Denied};
use crate::domain::lifecycle::LifecycleError;
use crate::domain::{RatingValueError, TicketStatus};
use crate::ports::outbound::RepositoryError;

/// Failure of an exposed operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HelpdeskError {
    /// Entity id unknown
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// Actor lacks the capability
    #[error("unauthorized: not permitted to {0}")]
    Unauthorized(Capability),

    /// Status change outside the transition table
    #[error("invalid state transition from {from} to {to}")]
    InvalidStateTransition { from: TicketStatus, to: TicketStatus },

    /// Out-of-range or malformed input
    #[error("validation error: {0}")]
    Validation(String),

    /// Operation conflicts with current state
    #[error("conflict: {0}")]
    Conflict(String),

    /// Unique key violated in storage
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// Storage collaborator failed
    #[error("storage error: {0}")]
    Storage(String),
}

/// Discriminant of [`HelpdeskError`], for callers that branch on the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    Unauthorized,
    InvalidStateTransition,
    Validation,
    Conflict,
    AlreadyExists,
    Storage,
}

impl HelpdeskError {
    pub fn not_found(kind: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Unauthorized(_) => ErrorKind::Unauthorized,
            Self::InvalidStateTransition { .. } => ErrorKind::InvalidStateTransition,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::AlreadyExists(_) => ErrorKind::AlreadyExists,
            Self::Storage(_) => ErrorKind::Storage,
        }
    }
}

impl From<Denied> for HelpdeskError {
    fn from(denied: Denied) -> Self {
        Self::Unauthorized(denied.0)
    }
}

impl From<LifecycleError> for HelpdeskError {
    fn from(err: LifecycleError) -> Self {
        match err {
            LifecycleError::Denied(denied) => denied.into(),
            LifecycleError::InvalidTransition(t) => Self::InvalidStateTransition { from: t.from, to: t.to },
            LifecycleError::AgentNotStaff(_) | LifecycleError::AgentInactive(_) => Self::Validation(err.to_string()),
            LifecycleError::NotAssigned => Self::Conflict(err.to_string()),
        }
    }
}

impl From<RatingValueError> for HelpdeskError {
    fn from(err: RatingValueError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<RepositoryError> for HelpdeskError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(what) => Self::NotFound {
                kind: "entity",
                id: what,
            },
            RepositoryError::DuplicateKey(key) => Self::AlreadyExists(key),
            RepositoryError::Conflict(message) => Self::Conflict(message),
            RepositoryError::Storage(message) => Self::Storage(message),
        }
    }
}

/// Result type for helpdesk operations
pub type HelpdeskResult<T> = Result<T, HelpdeskError>;
