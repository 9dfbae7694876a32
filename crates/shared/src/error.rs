//! Engine-wide error taxonomy.
//!
//! Module errors (ledger, fund, payment, ...) each classify themselves into an
//! [`ErrorKind`]; outer layers only ever need the kind and the code.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Classification shared by every error the engine can surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Input was rejected before any mutation; the caller must correct it.
    Validation,
    /// The entity is not in a state that permits the operation.
    StateConflict,
    /// An referenced entity does not exist.
    NotFound,
    /// A lost update was detected; the whole operation may be retried.
    ConcurrencyConflict,
    /// A financial invariant would be broken; rejected and audited.
    InvariantViolation,
    /// The backing store failed.
    Storage,
}

impl ErrorKind {
    /// Returns the HTTP-style status code for outer layers.
    #[must_use]
    pub const fn status_code(self) -> u16 {
        match self {
            Self::Validation => 400,
            Self::NotFound => 404,
            Self::StateConflict | Self::ConcurrencyConflict => 409,
            Self::InvariantViolation => 422,
            Self::Storage => 500,
        }
    }

    /// Returns true if the caller may retry the whole operation.
    #[must_use]
    pub const fn is_retryable(self) -> bool {
        matches!(self, Self::ConcurrencyConflict)
    }

    /// Returns true if rejections of this kind must be recorded for audit review.
    #[must_use]
    pub const fn is_audited(self) -> bool {
        matches!(self, Self::InvariantViolation)
    }
}

/// Application error, flattened to a message per taxonomy kind.
#[derive(Debug, Error)]
pub enum AppError {
    /// Validation error.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Illegal state transition or conflicting document state.
    #[error("State conflict: {0}")]
    StateConflict(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Concurrent modification detected.
    #[error("Concurrency conflict: {0}")]
    ConcurrencyConflict(String),

    /// Financial invariant violation.
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// Backing store error.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl AppError {
    /// Builds an error of the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        let message = message.into();
        match kind {
            ErrorKind::Validation => Self::Validation(message),
            ErrorKind::StateConflict => Self::StateConflict(message),
            ErrorKind::NotFound => Self::NotFound(message),
            ErrorKind::ConcurrencyConflict => Self::ConcurrencyConflict(message),
            ErrorKind::InvariantViolation => Self::InvariantViolation(message),
            ErrorKind::Storage => Self::Storage(message),
        }
    }

    /// Returns the taxonomy kind of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::StateConflict(_) => ErrorKind::StateConflict,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::ConcurrencyConflict(_) => ErrorKind::ConcurrencyConflict,
            Self::InvariantViolation(_) => ErrorKind::InvariantViolation,
            Self::Storage(_) => ErrorKind::Storage,
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        self.kind().status_code()
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::StateConflict(_) => "STATE_CONFLICT",
            Self::NotFound(_) => "NOT_FOUND",
            Self::ConcurrencyConflict(_) => "CONCURRENCY_CONFLICT",
            Self::InvariantViolation(_) => "INVARIANT_VIOLATION",
            Self::Storage(_) => "STORAGE_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(ErrorKind::Validation, 400)]
    #[case(ErrorKind::StateConflict, 409)]
    #[case(ErrorKind::NotFound, 404)]
    #[case(ErrorKind::ConcurrencyConflict, 409)]
    #[case(ErrorKind::InvariantViolation, 422)]
    #[case(ErrorKind::Storage, 500)]
    fn test_kind_status_codes(#[case] kind: ErrorKind, #[case] expected: u16) {
        assert_eq!(kind.status_code(), expected);
        assert_eq!(AppError::new(kind, "x").status_code(), expected);
    }

    #[test]
    fn test_only_concurrency_is_retryable() {
        assert!(ErrorKind::ConcurrencyConflict.is_retryable());
        assert!(!ErrorKind::Validation.is_retryable());
        assert!(!ErrorKind::StateConflict.is_retryable());
        assert!(!ErrorKind::InvariantViolation.is_retryable());
    }

    #[test]
    fn test_only_invariant_violations_are_audited() {
        assert!(ErrorKind::InvariantViolation.is_audited());
        assert!(!ErrorKind::StateConflict.is_audited());
        assert!(!ErrorKind::Storage.is_audited());
    }

    #[test]
    fn test_new_roundtrips_kind() {
        for kind in [
            ErrorKind::Validation,
            ErrorKind::StateConflict,
            ErrorKind::NotFound,
            ErrorKind::ConcurrencyConflict,
            ErrorKind::InvariantViolation,
            ErrorKind::Storage,
        ] {
            assert_eq!(AppError::new(kind, "msg").kind(), kind);
        }
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            AppError::Validation("msg".into()).to_string(),
            "Validation error: msg"
        );
        assert_eq!(
            AppError::InvariantViolation("msg".into()).to_string(),
            "Invariant violation: msg"
        );
        assert_eq!(
            AppError::ConcurrencyConflict("msg".into()).error_code(),
            "CONCURRENCY_CONFLICT"
        );
    }
}
