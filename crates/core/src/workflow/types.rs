//! Workflow domain types for transaction lifecycle management.
//!
//! This module defines the core types used for managing transaction
//! status transitions and workflow actions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tally_shared::types::UserId;

/// Transaction status in the approval workflow.
///
/// Transactions progress through these states from creation to posting.
/// The valid transitions are:
/// - Draft → PendingApproval (submit)
/// - Draft | PendingApproval → Approved (approve)
/// - PendingApproval → Draft (reject)
/// - Approved → Posted (post; reposting a Posted transaction is a no-op)
/// - any non-Voided status → Voided (void)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    /// Transaction is being drafted and can be modified.
    Draft,
    /// Transaction has been submitted for approval.
    PendingApproval,
    /// Transaction has been approved and is ready for posting.
    Approved,
    /// Transaction has been posted to the ledger (immutable).
    Posted,
    /// Transaction has been voided (terminal).
    Voided,
}

impl TransactionStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::PendingApproval => "PENDING_APPROVAL",
            Self::Approved => "APPROVED",
            Self::Posted => "POSTED",
            Self::Voided => "VOIDED",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "DRAFT" => Some(Self::Draft),
            "PENDING_APPROVAL" => Some(Self::PendingApproval),
            "APPROVED" => Some(Self::Approved),
            "POSTED" => Some(Self::Posted),
            "VOIDED" => Some(Self::Voided),
            _ => None,
        }
    }

    /// Returns true if the transaction's entries can still be changed.
    #[must_use]
    pub fn is_editable(&self) -> bool {
        matches!(self, Self::Draft)
    }

    /// Returns true if the transaction is immutable.
    #[must_use]
    pub fn is_immutable(&self) -> bool {
        matches!(self, Self::Posted | Self::Voided)
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Workflow action representing a state transition with audit data.
///
/// Each variant captures the action performed and the audit trail
/// information (who, when, why).
#[derive(Debug, Clone)]
pub enum WorkflowAction {
    /// Submit a draft transaction for approval.
    Submit {
        /// The user who submitted the transaction.
        submitted_by: UserId,
        /// When the transaction was submitted.
        submitted_at: DateTime<Utc>,
    },
    /// Approve a draft or pending transaction.
    Approve {
        /// The user who approved the transaction.
        approved_by: UserId,
        /// When the transaction was approved.
        approved_at: DateTime<Utc>,
        /// Optional notes from the approver.
        approval_notes: Option<String>,
    },
    /// Reject a pending transaction back to draft.
    Reject {
        /// The reason for rejection.
        rejection_reason: String,
    },
    /// Post an approved transaction to the ledger.
    Post {
        /// The user who posted the transaction.
        posted_by: UserId,
        /// When the transaction was posted.
        posted_at: DateTime<Utc>,
    },
    /// Void a transaction.
    Void {
        /// The user who voided the transaction.
        voided_by: UserId,
        /// When the transaction was voided.
        voided_at: DateTime<Utc>,
        /// The reason for voiding.
        void_reason: String,
    },
}

impl WorkflowAction {
    /// Returns the new status resulting from this action.
    #[must_use]
    pub fn new_status(&self) -> TransactionStatus {
        match self {
            Self::Submit { .. } => TransactionStatus::PendingApproval,
            Self::Approve { .. } => TransactionStatus::Approved,
            Self::Reject { .. } => TransactionStatus::Draft,
            Self::Post { .. } => TransactionStatus::Posted,
            Self::Void { .. } => TransactionStatus::Voided,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_as_str() {
        assert_eq!(TransactionStatus::Draft.as_str(), "DRAFT");
        assert_eq!(TransactionStatus::PendingApproval.as_str(), "PENDING_APPROVAL");
        assert_eq!(TransactionStatus::Posted.as_str(), "POSTED");
    }

    #[test]
    fn test_status_parse() {
        assert_eq!(
            TransactionStatus::parse("pending_approval"),
            Some(TransactionStatus::PendingApproval)
        );
        assert_eq!(TransactionStatus::parse("Voided"), Some(TransactionStatus::Voided));
        assert_eq!(TransactionStatus::parse("pending"), None);
    }

    #[test]
    fn test_status_serde_matches_as_str() {
        for status in [
            TransactionStatus::Draft,
            TransactionStatus::PendingApproval,
            TransactionStatus::Approved,
            TransactionStatus::Posted,
            TransactionStatus::Voided,
        ] {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
        }
    }

    #[test]
    fn test_status_immutable() {
        assert!(!TransactionStatus::Draft.is_immutable());
        assert!(!TransactionStatus::Approved.is_immutable());
        assert!(TransactionStatus::Posted.is_immutable());
        assert!(TransactionStatus::Voided.is_immutable());
        assert!(TransactionStatus::Draft.is_editable());
        assert!(!TransactionStatus::PendingApproval.is_editable());
    }

    #[test]
    fn test_action_new_status() {
        let action = WorkflowAction::Reject {
            rejection_reason: "wrong account".to_string(),
        };
        assert_eq!(action.new_status(), TransactionStatus::Draft);
    }
}
