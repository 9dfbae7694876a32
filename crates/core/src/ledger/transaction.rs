//! Transaction aggregate.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tally_shared::types::{
    AccountId, FiscalPeriodId, FiscalYearId, FundId, TransactionId, UserId,
};

use super::entry::TransactionEntry;
use super::types::{TransactionTotals, TransactionType};
use crate::workflow::{TransactionStatus, WorkflowAction};

/// A financial transaction consisting of balanced entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique identifier.
    pub id: TransactionId,
    /// Transaction type.
    pub transaction_type: TransactionType,
    /// Transaction date.
    pub date: NaiveDate,
    /// Transaction description.
    pub description: String,
    /// Optional external reference.
    pub reference: Option<String>,
    /// Total amount (sum of debits).
    pub amount: Decimal,
    /// Current status.
    pub status: TransactionStatus,
    /// Fiscal year containing the date, if one is defined.
    pub fiscal_year_id: Option<FiscalYearId>,
    /// Fiscal period containing the date, if one is defined.
    pub fiscal_period_id: Option<FiscalPeriodId>,
    /// User who created the transaction.
    pub created_by: UserId,
    /// When the transaction was created.
    pub created_at: DateTime<Utc>,
    /// User who submitted the transaction for approval.
    pub submitted_by: Option<UserId>,
    /// When the transaction was submitted.
    pub submitted_at: Option<DateTime<Utc>>,
    /// User who approved the transaction.
    pub approved_by: Option<UserId>,
    /// When the transaction was approved.
    pub approved_at: Option<DateTime<Utc>>,
    /// Notes left by the approver.
    pub approval_notes: Option<String>,
    /// Reason for the most recent rejection.
    pub rejection_reason: Option<String>,
    /// User who posted the transaction.
    pub posted_by: Option<UserId>,
    /// When the transaction was posted.
    pub posted_at: Option<DateTime<Utc>>,
    /// User who voided the transaction.
    pub voided_by: Option<UserId>,
    /// When the transaction was voided.
    pub voided_at: Option<DateTime<Utc>>,
    /// Why the transaction was voided.
    pub void_reason: Option<String>,
    /// The transaction this one reverses.
    pub reversal_of: Option<TransactionId>,
    /// The reversing transaction created when this one was voided after posting.
    pub reversed_by: Option<TransactionId>,
    /// Entries owned by this transaction.
    pub entries: Vec<TransactionEntry>,
    /// Store version for optimistic concurrency (0 = not yet stored).
    pub version: i64,
}

impl Transaction {
    /// Returns the debit/credit totals.
    #[must_use]
    pub fn totals(&self) -> TransactionTotals {
        TransactionTotals {
            total_debit: self.entries.iter().map(|e| e.debit).sum(),
            total_credit: self.entries.iter().map(|e| e.credit).sum(),
            entry_count: self.entries.len(),
        }
    }

    /// Returns true if debits equal credits.
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        self.totals().is_balanced()
    }

    /// Returns true if this transaction's entries count toward balances.
    ///
    /// A voided transaction that had been posted still counts: its posted
    /// reversal offsets it.
    #[must_use]
    pub fn affects_balances(&self) -> bool {
        match self.status {
            TransactionStatus::Posted => true,
            TransactionStatus::Voided => self.posted_at.is_some(),
            _ => false,
        }
    }

    /// Net debit-minus-credit on a single account.
    #[must_use]
    pub fn net_on_account(&self, account_id: AccountId) -> Decimal {
        self.entries
            .iter()
            .filter(|e| e.account_id == account_id)
            .map(TransactionEntry::signed_amount)
            .sum()
    }

    /// Returns true if any entry touches the account.
    #[must_use]
    pub fn touches_account(&self, account_id: AccountId) -> bool {
        self.entries.iter().any(|e| e.account_id == account_id)
    }

    /// Net change per fund (`credit - debit`) across fund-tagged entries.
    #[must_use]
    pub fn fund_changes(&self) -> BTreeMap<FundId, Decimal> {
        let mut changes = BTreeMap::new();
        for entry in &self.entries {
            if let Some(fund_id) = entry.fund_id {
                *changes.entry(fund_id).or_insert(Decimal::ZERO) += entry.fund_change();
            }
        }
        changes
    }

    /// Applies a validated workflow action to the status and audit fields.
    pub fn apply(&mut self, action: &WorkflowAction) {
        match action {
            WorkflowAction::Submit {
                submitted_by,
                submitted_at,
            } => {
                self.submitted_by = Some(*submitted_by);
                self.submitted_at = Some(*submitted_at);
            }
            WorkflowAction::Approve {
                approved_by,
                approved_at,
                approval_notes,
            } => {
                self.approved_by = Some(*approved_by);
                self.approved_at = Some(*approved_at);
                self.approval_notes.clone_from(approval_notes);
            }
            WorkflowAction::Reject { rejection_reason } => {
                self.rejection_reason = Some(rejection_reason.clone());
            }
            WorkflowAction::Post {
                posted_by,
                posted_at,
            } => {
                self.posted_by = Some(*posted_by);
                self.posted_at = Some(*posted_at);
            }
            WorkflowAction::Void {
                voided_by,
                voided_at,
                void_reason,
            } => {
                self.voided_by = Some(*voided_by);
                self.voided_at = Some(*voided_at);
                self.void_reason = Some(void_reason.clone());
            }
        }
        self.status = action.new_status();
    }
}
