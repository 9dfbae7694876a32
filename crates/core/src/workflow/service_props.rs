//! Property-based tests for WorkflowService.

use proptest::prelude::*;
use tally_shared::types::UserId;
use uuid::Uuid;

use crate::workflow::error::WorkflowError;
use crate::workflow::service::WorkflowService;
use crate::workflow::types::{TransactionStatus, WorkflowAction};

/// Strategy for generating random TransactionStatus values.
fn arb_status() -> impl Strategy<Value = TransactionStatus> {
    prop_oneof![
        Just(TransactionStatus::Draft),
        Just(TransactionStatus::PendingApproval),
        Just(TransactionStatus::Approved),
        Just(TransactionStatus::Posted),
        Just(TransactionStatus::Voided),
    ]
}

/// Strategy for generating random user IDs.
fn arb_user() -> impl Strategy<Value = UserId> {
    any::<u128>().prop_map(|n| UserId::from_uuid(Uuid::from_u128(n)))
}

/// Strategy for generating non-blank reasons.
fn arb_reason() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9]{1,40}"
}

/// Strategy for generating whitespace-only reasons.
fn arb_blank() -> impl Strategy<Value = String> {
    "[ \t]{0,10}"
}

/// Applies one of the five operations by index.
fn run(
    op: u8,
    status: TransactionStatus,
    user: UserId,
    reason: String,
) -> Result<Option<WorkflowAction>, WorkflowError> {
    match op % 5 {
        0 => WorkflowService::submit(status, user).map(Some),
        1 => WorkflowService::approve(status, user, None).map(Some),
        2 => WorkflowService::reject(status, reason).map(Some),
        3 => WorkflowService::post(status, user),
        _ => WorkflowService::void(status, user, reason).map(Some),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Every successful action lands on a status the transition table allows.
    #[test]
    fn prop_actions_follow_transition_table(
        op in any::<u8>(),
        status in arb_status(),
        user in arb_user(),
        reason in arb_reason(),
    ) {
        if let Ok(Some(action)) = run(op, status, user, reason) {
            prop_assert!(WorkflowService::is_valid_transition(status, action.new_status()));
        }
    }

    /// Rejected transitions report the current status unchanged.
    #[test]
    fn prop_invalid_transition_carries_current_status(
        op in any::<u8>(),
        status in arb_status(),
        user in arb_user(),
        reason in arb_reason(),
    ) {
        if let Err(WorkflowError::InvalidTransition { from, .. }) = run(op, status, user, reason) {
            prop_assert_eq!(from, status);
        }
    }

    /// Voided is terminal: nothing moves a voided transaction.
    #[test]
    fn prop_voided_is_terminal(op in any::<u8>(), user in arb_user(), reason in arb_reason()) {
        let result = run(op, TransactionStatus::Voided, user, reason);
        let is_invalid = matches!(result, Err(WorkflowError::InvalidTransition { .. }));
        prop_assert!(is_invalid);
    }

    /// Blank reasons never void or reject anything.
    #[test]
    fn prop_blank_reasons_rejected(
        status in arb_status(),
        user in arb_user(),
        blank in arb_blank()
    ) {
        let voided = matches!(
            WorkflowService::void(status, user, blank.clone()),
            Err(WorkflowError::MissingReason { operation: "void" })
        );
        let rejected = matches!(
            WorkflowService::reject(status, blank),
            Err(WorkflowError::MissingReason { operation: "reject" })
        );
        prop_assert!(voided);
        prop_assert!(rejected);
    }

    /// Posting is idempotent once posted.
    #[test]
    fn prop_repost_is_noop(user in arb_user()) {
        let result = WorkflowService::post(TransactionStatus::Posted, user);
        prop_assert!(matches!(result, Ok(None)));
    }
}
