//! Bank reconciliation errors.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tally_shared::ErrorKind;
use tally_shared::types::{BankAccountId, BankTransactionId, ReconciliationId, TransactionId};
use thiserror::Error;

use super::types::MatchStatus;
use crate::workflow::TransactionStatus;

/// Errors that can occur while reconciling a bank account.
#[derive(Debug, Error)]
pub enum ReconciliationError {
    // ========== Lookup Errors ==========
    /// Bank account not found.
    #[error("Bank account not found: {0}")]
    BankAccountNotFound(BankAccountId),

    /// Bank transaction not found.
    #[error("Bank transaction not found: {0}")]
    BankTransactionNotFound(BankTransactionId),

    /// Reconciliation not found.
    #[error("Reconciliation not found: {0}")]
    ReconciliationNotFound(ReconciliationId),

    // ========== Validation Errors ==========
    /// Statement period ends before it starts.
    #[error("Statement period end {end} is before start {start}")]
    InvalidPeriod {
        /// Period start.
        start: NaiveDate,
        /// Period end.
        end: NaiveDate,
    },

    /// Amounts must be non-zero.
    #[error("Amount must be non-zero")]
    ZeroAmount,

    /// Bank account is inactive.
    #[error("Bank account {0} is inactive")]
    BankAccountInactive(BankAccountId),

    /// Bank line belongs to another bank account.
    #[error("Bank transaction {0} belongs to a different bank account")]
    WrongBankAccount(BankTransactionId),

    /// Bank line is dated outside the statement period.
    #[error("Bank transaction dated {0} is outside the statement period")]
    OutsidePeriod(NaiveDate),

    /// Ledger transaction does not touch the bank's cash account.
    #[error("Ledger transaction {0} does not touch the bank's cash account")]
    NotOnCashAccount(TransactionId),

    /// Bank and ledger amounts differ.
    #[error("Bank amount {bank_amount} does not equal ledger amount {ledger_amount}")]
    AmountMismatch {
        /// Signed bank amount.
        bank_amount: Decimal,
        /// Signed ledger effect on the cash account.
        ledger_amount: Decimal,
    },

    /// Notes must not be blank.
    #[error("Note text is required")]
    NoteRequired,

    // ========== State Errors ==========
    /// An IN_PROGRESS reconciliation already exists for the account.
    #[error("Bank account {0} already has a reconciliation in progress")]
    ReconciliationInProgress(BankAccountId),

    /// Completed reconciliations are frozen.
    #[error("Reconciliation {0} is completed")]
    ReconciliationCompleted(ReconciliationId),

    /// Bank line was frozen by a completed reconciliation.
    #[error("Bank transaction {0} is already reconciled")]
    BankTransactionReconciled(BankTransactionId),

    /// Operation not allowed from the line's current match status.
    #[error("Cannot move bank transaction from {from} to {to}")]
    InvalidMatchStatus {
        /// Current status.
        from: MatchStatus,
        /// Attempted status.
        to: MatchStatus,
    },

    /// Only POSTED ledger transactions can be matched.
    #[error("Ledger transaction {transaction_id} is {status}, not POSTED")]
    LedgerTransactionNotPosted {
        /// The ledger transaction.
        transaction_id: TransactionId,
        /// Its status.
        status: TransactionStatus,
    },

    /// Ledger transaction already satisfies another bank line.
    #[error("Ledger transaction {0} is already matched")]
    LedgerTransactionAlreadyMatched(TransactionId),

    /// A matched ledger transaction cannot be voided until the match is reset.
    #[error("Ledger transaction {transaction_id} is matched to bank transaction {bank_transaction_id}")]
    LedgerTransactionMatched {
        /// The ledger transaction.
        transaction_id: TransactionId,
        /// The bank line it satisfies.
        bank_transaction_id: BankTransactionId,
    },

    /// A matched line points at a ledger transaction that no longer exists.
    #[error("Matched ledger transaction not found: {0}")]
    MatchedTransactionMissing(TransactionId),

    /// Period still has unresolved lines.
    #[error("{count} bank transactions are still unresolved")]
    OutstandingItems {
        /// Lines that are UNMATCHED, POTENTIAL_MATCH or NEEDS_REVIEW.
        count: usize,
    },

    // ========== Invariant Errors ==========
    /// Adjusted statement balance differs from the ledger.
    #[error(
        "Reconciliation is unbalanced: adjusted statement balance {adjusted_statement_balance}, expected {expected_balance} (difference {difference})"
    )]
    UnbalancedReconciliation {
        /// `ending + Σ adjustments`.
        adjusted_statement_balance: Decimal,
        /// `beginning ledger balance + Σ matched`.
        expected_balance: Decimal,
        /// The two subtracted.
        difference: Decimal,
    },
}

impl ReconciliationError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::BankAccountNotFound(_) => "BANK_ACCOUNT_NOT_FOUND",
            Self::BankTransactionNotFound(_) => "BANK_TRANSACTION_NOT_FOUND",
            Self::ReconciliationNotFound(_) => "RECONCILIATION_NOT_FOUND",
            Self::InvalidPeriod { .. } => "INVALID_PERIOD",
            Self::ZeroAmount => "ZERO_AMOUNT",
            Self::BankAccountInactive(_) => "BANK_ACCOUNT_INACTIVE",
            Self::WrongBankAccount(_) => "WRONG_BANK_ACCOUNT",
            Self::OutsidePeriod(_) => "OUTSIDE_PERIOD",
            Self::NotOnCashAccount(_) => "NOT_ON_CASH_ACCOUNT",
            Self::AmountMismatch { .. } => "AMOUNT_MISMATCH",
            Self::NoteRequired => "NOTE_REQUIRED",
            Self::ReconciliationInProgress(_) => "RECONCILIATION_IN_PROGRESS",
            Self::ReconciliationCompleted(_) => "RECONCILIATION_COMPLETED",
            Self::BankTransactionReconciled(_) => "BANK_TRANSACTION_RECONCILED",
            Self::InvalidMatchStatus { .. } => "INVALID_MATCH_STATUS",
            Self::LedgerTransactionNotPosted { .. } => "LEDGER_TRANSACTION_NOT_POSTED",
            Self::LedgerTransactionAlreadyMatched(_) => "LEDGER_TRANSACTION_ALREADY_MATCHED",
            Self::LedgerTransactionMatched { .. } => "LEDGER_TRANSACTION_MATCHED",
            Self::MatchedTransactionMissing(_) => "MATCHED_TRANSACTION_MISSING",
            Self::OutstandingItems { .. } => "OUTSTANDING_ITEMS",
            Self::UnbalancedReconciliation { .. } => "UNBALANCED_RECONCILIATION",
        }
    }

    /// Returns the taxonomy kind of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::BankAccountNotFound(_)
            | Self::BankTransactionNotFound(_)
            | Self::ReconciliationNotFound(_)
            | Self::MatchedTransactionMissing(_) => ErrorKind::NotFound,

            Self::InvalidPeriod { .. }
            | Self::ZeroAmount
            | Self::BankAccountInactive(_)
            | Self::WrongBankAccount(_)
            | Self::OutsidePeriod(_)
            | Self::NotOnCashAccount(_)
            | Self::AmountMismatch { .. }
            | Self::NoteRequired => ErrorKind::Validation,

            Self::ReconciliationInProgress(_)
            | Self::ReconciliationCompleted(_)
            | Self::BankTransactionReconciled(_)
            | Self::InvalidMatchStatus { .. }
            | Self::LedgerTransactionNotPosted { .. }
            | Self::LedgerTransactionAlreadyMatched(_)
            | Self::LedgerTransactionMatched { .. }
            | Self::OutstandingItems { .. } => ErrorKind::StateConflict,

            Self::UnbalancedReconciliation { .. } => ErrorKind::InvariantViolation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_unbalanced_is_audited_invariant() {
        let err = ReconciliationError::UnbalancedReconciliation {
            adjusted_statement_balance: dec!(11_300),
            expected_balance: dec!(11_275),
            difference: dec!(25),
        };
        assert_eq!(err.kind(), ErrorKind::InvariantViolation);
        assert!(err.kind().is_audited());
        assert_eq!(err.error_code(), "UNBALANCED_RECONCILIATION");
    }

    #[test]
    fn test_matched_void_is_state_conflict() {
        let err = ReconciliationError::LedgerTransactionMatched {
            transaction_id: TransactionId::new(),
            bank_transaction_id: BankTransactionId::new(),
        };
        assert_eq!(err.kind(), ErrorKind::StateConflict);
        assert_eq!(err.error_code(), "LEDGER_TRANSACTION_MATCHED");

        let missing = ReconciliationError::MatchedTransactionMissing(TransactionId::new());
        assert_eq!(missing.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_outstanding_items_is_state_conflict() {
        let err = ReconciliationError::OutstandingItems { count: 2 };
        assert_eq!(err.kind(), ErrorKind::StateConflict);
        assert_eq!(err.to_string(), "2 bank transactions are still unresolved");
    }
}
