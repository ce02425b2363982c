//! Core error types for STRATA.

use std::fmt;

/// Core result type
pub type CoreResult<T> = Result<T, CoreError>;

/// Core error type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Invalid encoding
    InvalidEncoding,

    /// Invalid logical ID
    InvalidId {
        /// Why the ID was rejected
        reason: String,
    },

    /// Invalid digest format
    InvalidHash {
        /// Why the digest was rejected
        reason: String,
    },

    /// Validation error
    Validation {
        /// Field or subject under validation
        field: String,
        /// Failure reason
        reason: String,
    },

    /// Not found
    NotFound {
        /// Kind of the missing item
        kind: String,
        /// Identifier of the missing item
        id: String,
    },

    /// Already exists
    AlreadyExists {
        /// Kind of the duplicated item
        kind: String,
        /// Identifier of the duplicated item
        id: String,
    },

    /// Handle or reference belongs to another deployment scope
    ForeignScope {
        /// Identifier of the offending item
        id: String,
    },

    /// Internal error (for unexpected errors)
    Internal {
        /// Error message
        message: String,
    },
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEncoding => write!(f, "Invalid encoding"),
            Self::InvalidId { reason } => write!(f, "Invalid ID: {}", reason),
            Self::InvalidHash { reason } => write!(f, "Invalid hash: {}", reason),
            Self::Validation { field, reason } => {
                write!(f, "Validation failed for {}: {}", field, reason)
            }
            Self::NotFound { kind, id } => write!(f, "{} not found: {}", kind, id),
            Self::AlreadyExists { kind, id } => write!(f, "{} already exists: {}", kind, id),
            Self::ForeignScope { id } => {
                write!(f, "{} belongs to a different deployment scope", id)
            }
            Self::Internal { message } => write!(f, "Internal error: {}", message),
        }
    }
}

impl std::error::Error for CoreError {}

impl From<serde_json::Error> for CoreError {
    fn from(_err: serde_json::Error) -> Self {
        Self::InvalidEncoding
    }
}
