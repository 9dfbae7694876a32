//! Bank reconciliation types.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use tally_shared::types::{
    AccountId, AdjustmentId, BankAccountId, BankTransactionId, ReconciliationId, TransactionId,
    UserId,
};

/// A bank account mapped to one ledger cash account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankAccount {
    /// Unique identifier.
    pub id: BankAccountId,
    /// Display name.
    pub name: String,
    /// Ledger cash account mirroring this bank account.
    pub ledger_account_id: AccountId,
    /// Bank name.
    pub institution: Option<String>,
    /// Inactive accounts accept no new statement lines.
    pub is_active: bool,
    /// Store version for optimistic concurrency (0 = not yet stored).
    pub version: i64,
}

impl BankAccount {
    /// Creates an active bank account.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        ledger_account_id: AccountId,
        institution: Option<String>,
    ) -> Self {
        Self {
            id: BankAccountId::new(),
            name: name.into(),
            ledger_account_id,
            institution,
            is_active: true,
            version: 0,
        }
    }
}

/// Match classification of a bank statement line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchStatus {
    /// No ledger counterpart found yet.
    Unmatched,
    /// Paired with exactly one ledger transaction.
    Matched,
    /// Several equally good ledger candidates; needs a human.
    PotentialMatch,
    /// Non-ledger item backed out through an adjustment.
    Excluded,
    /// Flagged by a user; skipped by auto-match.
    NeedsReview,
}

impl MatchStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unmatched => "UNMATCHED",
            Self::Matched => "MATCHED",
            Self::PotentialMatch => "POTENTIAL_MATCH",
            Self::Excluded => "EXCLUDED",
            Self::NeedsReview => "NEEDS_REVIEW",
        }
    }

    /// Returns true if the line blocks completion.
    #[must_use]
    pub const fn is_outstanding(self) -> bool {
        matches!(self, Self::Unmatched | Self::PotentialMatch | Self::NeedsReview)
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A line reported on a bank statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankTransaction {
    /// Unique identifier.
    pub id: BankTransactionId,
    /// Owning bank account.
    pub bank_account_id: BankAccountId,
    /// Date reported by the bank.
    pub date: NaiveDate,
    /// Bank description.
    pub description: String,
    /// Signed amount; deposits positive, withdrawals negative.
    pub amount: Decimal,
    /// Bank reference, if any.
    pub reference: Option<String>,
    /// Match classification.
    pub match_status: MatchStatus,
    /// Ledger transaction paired with this line.
    pub matched_transaction_id: Option<TransactionId>,
    /// Ranked suggestions when the status is POTENTIAL_MATCH.
    pub candidate_ids: Vec<TransactionId>,
    /// Note left when flagged for review.
    pub review_note: Option<String>,
    /// Completed reconciliation that froze this line.
    pub reconciliation_id: Option<ReconciliationId>,
    /// Store version for optimistic concurrency (0 = not yet stored).
    pub version: i64,
}

/// An already-mapped bank line to ingest.
#[derive(Debug, Clone)]
pub struct BankTransactionInput {
    /// Owning bank account.
    pub bank_account_id: BankAccountId,
    /// Date reported by the bank.
    pub date: NaiveDate,
    /// Bank description.
    pub description: String,
    /// Signed amount.
    pub amount: Decimal,
    /// Bank reference.
    pub reference: Option<String>,
}

/// Reconciliation lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReconciliationStatus {
    /// Matching in progress.
    InProgress,
    /// Balanced and frozen.
    Completed,
}

/// What a statement adjustment represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdjustmentKind {
    /// Bank service charge.
    BankFee,
    /// Interest credited by the bank.
    InterestEarned,
    /// Bank or data-entry correction.
    Correction,
    /// Anything else.
    Other,
}

/// A correction applied to the statement ending balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankStatementAdjustment {
    /// Unique identifier.
    pub id: AdjustmentId,
    /// Kind.
    pub kind: AdjustmentKind,
    /// Signed amount added to the statement ending balance.
    pub amount: Decimal,
    /// Explanation.
    pub memo: String,
    /// Excluded bank line this adjustment backs out, if any.
    pub bank_transaction_id: Option<BankTransactionId>,
    /// When the adjustment was recorded.
    pub created_at: DateTime<Utc>,
}

/// A note appended to a reconciliation, allowed even after completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditNote {
    /// Note text.
    pub note: String,
    /// Author.
    pub author: UserId,
    /// When the note was written.
    pub created_at: DateTime<Utc>,
}

/// A statement-period reconciliation of one bank account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankReconciliation {
    /// Unique identifier.
    pub id: ReconciliationId,
    /// The bank account.
    pub bank_account_id: BankAccountId,
    /// First day of the statement period.
    pub period_start: NaiveDate,
    /// Last day of the statement period.
    pub period_end: NaiveDate,
    /// Opening balance on the statement.
    pub statement_beginning_balance: Decimal,
    /// Closing balance on the statement.
    pub statement_ending_balance: Decimal,
    /// Lifecycle status.
    pub status: ReconciliationStatus,
    /// Statement adjustments.
    pub adjustments: Vec<BankStatementAdjustment>,
    /// Audit notes.
    pub audit_notes: Vec<AuditNote>,
    /// User who started the reconciliation.
    pub started_by: UserId,
    /// User who completed it.
    pub completed_by: Option<UserId>,
    /// When it was completed.
    pub completed_at: Option<DateTime<Utc>>,
    /// Store version for optimistic concurrency (0 = not yet stored).
    pub version: i64,
}

impl BankReconciliation {
    /// Returns true if `date` falls in the statement period.
    #[must_use]
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.period_start && date <= self.period_end
    }

    /// Sum of all adjustments.
    #[must_use]
    pub fn total_adjustments(&self) -> Decimal {
        self.adjustments.iter().map(|a| a.amount).sum()
    }
}

/// Input for starting a reconciliation.
#[derive(Debug, Clone)]
pub struct StartReconciliationInput {
    /// The bank account.
    pub bank_account_id: BankAccountId,
    /// First day of the statement period.
    pub period_start: NaiveDate,
    /// Last day of the statement period.
    pub period_end: NaiveDate,
    /// Opening balance on the statement.
    pub statement_beginning_balance: Decimal,
    /// Closing balance on the statement.
    pub statement_ending_balance: Decimal,
    /// User starting it.
    pub started_by: UserId,
}

/// Number of period lines in each match status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchCounts {
    /// UNMATCHED lines.
    pub unmatched: usize,
    /// MATCHED lines.
    pub matched: usize,
    /// POTENTIAL_MATCH lines.
    pub potential_match: usize,
    /// EXCLUDED lines.
    pub excluded: usize,
    /// NEEDS_REVIEW lines.
    pub needs_review: usize,
}

impl MatchCounts {
    /// Lines that block completion.
    #[must_use]
    pub const fn outstanding(&self) -> usize {
        self.unmatched + self.potential_match + self.needs_review
    }

    pub(crate) fn record(&mut self, status: MatchStatus) {
        match status {
            MatchStatus::Unmatched => self.unmatched += 1,
            MatchStatus::Matched => self.matched += 1,
            MatchStatus::PotentialMatch => self.potential_match += 1,
            MatchStatus::Excluded => self.excluded += 1,
            MatchStatus::NeedsReview => self.needs_review += 1,
        }
    }
}

/// Balance check of a reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationSummary {
    /// The reconciliation.
    pub reconciliation_id: ReconciliationId,
    /// Opening balance on the statement.
    pub statement_beginning_balance: Decimal,
    /// Closing balance on the statement.
    pub statement_ending_balance: Decimal,
    /// Sum of adjustments.
    pub total_adjustments: Decimal,
    /// `statement_ending_balance + total_adjustments`.
    pub adjusted_statement_balance: Decimal,
    /// Cash-account ledger balance the day before the period.
    pub beginning_ledger_balance: Decimal,
    /// Sum of MATCHED bank lines in the period.
    pub total_matched: Decimal,
    /// `adjusted_statement_balance - (beginning_ledger_balance + total_matched)`.
    pub difference: Decimal,
    /// Lines per status.
    pub counts: MatchCounts,
}

impl ReconciliationSummary {
    /// Returns true if the difference is exactly zero.
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        self.difference.is_zero()
    }
}
