//! Lifecycle errors.

use tally_shared::ErrorKind;
use thiserror::Error;

use crate::workflow::types::TransactionStatus;

/// A lifecycle step that the current status does not allow, or that lacks
/// the reason it must carry.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// The transaction cannot move from `from` to `to`.
    #[error("Cannot move transaction from {from} to {to}")]
    InvalidTransition {
        /// Status the transaction is in.
        from: TransactionStatus,
        /// Status the step would produce.
        to: TransactionStatus,
    },

    /// Voids and rejections must say why.
    #[error("A reason is required to {operation} a transaction")]
    MissingReason {
        /// `"void"` or `"reject"`.
        operation: &'static str,
    },
}

impl WorkflowError {
    /// Stable code for callers that match on strings.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::MissingReason { .. } => "REASON_REQUIRED",
        }
    }

    /// Taxonomy kind.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidTransition { .. } => ErrorKind::StateConflict,
            Self::MissingReason { .. } => ErrorKind::Validation,
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::post_draft(TransactionStatus::Draft, TransactionStatus::Posted)]
    #[case::revive_void(TransactionStatus::Voided, TransactionStatus::Draft)]
    fn test_transition_message_names_both_states(
        #[case] from: TransactionStatus,
        #[case] to: TransactionStatus,
    ) {
        let err = WorkflowError::InvalidTransition { from, to };
        let message = err.to_string();
        assert!(message.contains(from.as_str()));
        assert!(message.contains(to.as_str()));
        assert_eq!(err.kind(), ErrorKind::StateConflict);
    }

    #[test]
    fn test_missing_reason_is_validation() {
        let err = WorkflowError::MissingReason { operation: "void" };
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.error_code(), "REASON_REQUIRED");
        assert_eq!(err.to_string(), "A reason is required to void a transaction");
    }
}
