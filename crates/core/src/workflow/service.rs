//! Workflow service for transaction state transitions.
//!
//! This module implements the core state machine logic for
//! transitioning transactions through the approval workflow.

use chrono::Utc;
use tally_shared::types::UserId;

use crate::workflow::error::WorkflowError;
use crate::workflow::types::{TransactionStatus, WorkflowAction};

/// Stateless service for managing transaction workflow transitions.
///
/// All methods are associated functions that validate a transition
/// and return the `WorkflowAction` carrying its audit trail. Callers
/// apply the action to the aggregate.
pub struct WorkflowService;

impl WorkflowService {
    /// Submit a draft transaction for approval.
    ///
    /// # Errors
    ///
    /// Returns `WorkflowError::InvalidTransition` if not in Draft status.
    pub fn submit(
        current_status: TransactionStatus,
        submitted_by: UserId,
    ) -> Result<WorkflowAction, WorkflowError> {
        match current_status {
            TransactionStatus::Draft => Ok(WorkflowAction::Submit {
                submitted_by,
                submitted_at: Utc::now(),
            }),
            _ => Err(WorkflowError::InvalidTransition {
                from: current_status,
                to: TransactionStatus::PendingApproval,
            }),
        }
    }

    /// Approve a draft or pending transaction.
    ///
    /// # Errors
    ///
    /// Returns `WorkflowError::InvalidTransition` unless the status is
    /// Draft or PendingApproval.
    pub fn approve(
        current_status: TransactionStatus,
        approved_by: UserId,
        approval_notes: Option<String>,
    ) -> Result<WorkflowAction, WorkflowError> {
        match current_status {
            TransactionStatus::Draft | TransactionStatus::PendingApproval => {
                Ok(WorkflowAction::Approve {
                    approved_by,
                    approved_at: Utc::now(),
                    approval_notes,
                })
            }
            _ => Err(WorkflowError::InvalidTransition {
                from: current_status,
                to: TransactionStatus::Approved,
            }),
        }
    }

    /// Reject a pending transaction back to draft.
    ///
    /// # Errors
    ///
    /// Returns `WorkflowError::MissingReason` if the reason is blank,
    /// `WorkflowError::InvalidTransition` if not in PendingApproval status.
    pub fn reject(
        current_status: TransactionStatus,
        rejection_reason: String,
    ) -> Result<WorkflowAction, WorkflowError> {
        if rejection_reason.trim().is_empty() {
            return Err(WorkflowError::MissingReason { operation: "reject" });
        }

        match current_status {
            TransactionStatus::PendingApproval => Ok(WorkflowAction::Reject { rejection_reason }),
            _ => Err(WorkflowError::InvalidTransition {
                from: current_status,
                to: TransactionStatus::Draft,
            }),
        }
    }

    /// Post an approved transaction to the ledger.
    ///
    /// Returns `Ok(None)` when the transaction is already posted so that a
    /// retried post is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `WorkflowError::InvalidTransition` from any status other than
    /// Approved or Posted.
    pub fn post(
        current_status: TransactionStatus,
        posted_by: UserId,
    ) -> Result<Option<WorkflowAction>, WorkflowError> {
        match current_status {
            TransactionStatus::Approved => Ok(Some(WorkflowAction::Post {
                posted_by,
                posted_at: Utc::now(),
            })),
            TransactionStatus::Posted => Ok(None),
            _ => Err(WorkflowError::InvalidTransition {
                from: current_status,
                to: TransactionStatus::Posted,
            }),
        }
    }

    /// Void a transaction.
    ///
    /// Payment guards on dependent documents are checked by the caller;
    /// this only validates the status transition and the reason.
    ///
    /// # Errors
    ///
    /// Returns `WorkflowError::MissingReason` if the reason is blank,
    /// `WorkflowError::InvalidTransition` if already voided.
    pub fn void(
        current_status: TransactionStatus,
        voided_by: UserId,
        void_reason: String,
    ) -> Result<WorkflowAction, WorkflowError> {
        if void_reason.trim().is_empty() {
            return Err(WorkflowError::MissingReason { operation: "void" });
        }

        match current_status {
            TransactionStatus::Voided => Err(WorkflowError::InvalidTransition {
                from: current_status,
                to: TransactionStatus::Voided,
            }),
            _ => Ok(WorkflowAction::Void {
                voided_by,
                voided_at: Utc::now(),
                void_reason,
            }),
        }
    }

    /// Check if a status transition is valid.
    ///
    /// Valid transitions:
    /// - Draft → PendingApproval (submit)
    /// - Draft → Approved, PendingApproval → Approved (approve)
    /// - PendingApproval → Draft (reject)
    /// - Approved → Posted (post)
    /// - Draft | PendingApproval | Approved | Posted → Voided (void)
    #[must_use]
    pub fn is_valid_transition(from: TransactionStatus, to: TransactionStatus) -> bool {
        matches!(
            (from, to),
            (
                TransactionStatus::Draft,
                TransactionStatus::PendingApproval | TransactionStatus::Approved
            ) | (
                TransactionStatus::PendingApproval,
                TransactionStatus::Approved | TransactionStatus::Draft
            ) | (TransactionStatus::Approved, TransactionStatus::Posted)
                | (
                    TransactionStatus::Draft
                        | TransactionStatus::PendingApproval
                        | TransactionStatus::Approved
                        | TransactionStatus::Posted,
                    TransactionStatus::Voided
                )
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_from_draft() {
        let action = WorkflowService::submit(TransactionStatus::Draft, UserId::new()).unwrap();
        assert_eq!(action.new_status(), TransactionStatus::PendingApproval);
    }

    #[test]
    fn test_submit_from_non_draft_fails() {
        let result = WorkflowService::submit(TransactionStatus::PendingApproval, UserId::new());
        assert!(matches!(
            result,
            Err(WorkflowError::InvalidTransition {
                from: TransactionStatus::PendingApproval,
                ..
            })
        ));
    }

    #[test]
    fn test_approve_from_draft_or_pending() {
        for status in [TransactionStatus::Draft, TransactionStatus::PendingApproval] {
            let action = WorkflowService::approve(status, UserId::new(), None).unwrap();
            assert_eq!(action.new_status(), TransactionStatus::Approved);
        }
    }

    #[test]
    fn test_approve_records_approver() {
        let approver = UserId::new();
        let action = WorkflowService::approve(
            TransactionStatus::PendingApproval,
            approver,
            Some("ok".to_string()),
        )
        .unwrap();
        match action {
            WorkflowAction::Approve {
                approved_by,
                approval_notes,
                ..
            } => {
                assert_eq!(approved_by, approver);
                assert_eq!(approval_notes.as_deref(), Some("ok"));
            }
            other => panic!("expected Approve, got {other:?}"),
        }
    }

    #[test]
    fn test_approve_from_posted_fails() {
        let result = WorkflowService::approve(TransactionStatus::Posted, UserId::new(), None);
        assert!(matches!(result, Err(WorkflowError::InvalidTransition { .. })));
    }

    #[test]
    fn test_reject_from_pending() {
        let action =
            WorkflowService::reject(TransactionStatus::PendingApproval, "Invalid data".to_string())
                .unwrap();
        assert_eq!(action.new_status(), TransactionStatus::Draft);
    }

    #[test]
    fn test_reject_whitespace_reason_fails() {
        let result = WorkflowService::reject(TransactionStatus::PendingApproval, "   ".to_string());
        assert!(matches!(result, Err(WorkflowError::MissingReason { operation: "reject" })));
    }

    #[test]
    fn test_post_from_approved() {
        let action = WorkflowService::post(TransactionStatus::Approved, UserId::new())
            .unwrap()
            .unwrap();
        assert_eq!(action.new_status(), TransactionStatus::Posted);
    }

    #[test]
    fn test_repost_is_noop() {
        let result = WorkflowService::post(TransactionStatus::Posted, UserId::new()).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_post_from_draft_fails() {
        let result = WorkflowService::post(TransactionStatus::Draft, UserId::new());
        assert!(matches!(
            result,
            Err(WorkflowError::InvalidTransition {
                from: TransactionStatus::Draft,
                to: TransactionStatus::Posted,
            })
        ));
    }

    #[test]
    fn test_void_from_any_live_status() {
        for status in [
            TransactionStatus::Draft,
            TransactionStatus::PendingApproval,
            TransactionStatus::Approved,
            TransactionStatus::Posted,
        ] {
            let action =
                WorkflowService::void(status, UserId::new(), "Error found".to_string()).unwrap();
            assert_eq!(action.new_status(), TransactionStatus::Voided);
        }
    }

    #[test]
    fn test_void_twice_fails() {
        let result =
            WorkflowService::void(TransactionStatus::Voided, UserId::new(), "again".to_string());
        assert!(matches!(result, Err(WorkflowError::InvalidTransition { .. })));
    }

    #[test]
    fn test_void_empty_reason_fails() {
        let result = WorkflowService::void(TransactionStatus::Posted, UserId::new(), String::new());
        assert!(matches!(result, Err(WorkflowError::MissingReason { operation: "void" })));
    }

    #[test]
    fn test_is_valid_transition() {
        assert!(WorkflowService::is_valid_transition(
            TransactionStatus::Draft,
            TransactionStatus::PendingApproval
        ));
        assert!(WorkflowService::is_valid_transition(
            TransactionStatus::Draft,
            TransactionStatus::Approved
        ));
        assert!(WorkflowService::is_valid_transition(
            TransactionStatus::Approved,
            TransactionStatus::Posted
        ));
        assert!(WorkflowService::is_valid_transition(
            TransactionStatus::Approved,
            TransactionStatus::Voided
        ));

        assert!(!WorkflowService::is_valid_transition(
            TransactionStatus::Draft,
            TransactionStatus::Posted
        ));
        assert!(!WorkflowService::is_valid_transition(
            TransactionStatus::Voided,
            TransactionStatus::Draft
        ));
        assert!(!WorkflowService::is_valid_transition(
            TransactionStatus::Posted,
            TransactionStatus::Draft
        ));
    }
}
