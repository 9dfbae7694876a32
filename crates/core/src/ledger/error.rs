//! Ledger error types for validation and state errors.
//!
//! This module defines all errors that can occur during ledger operations,
//! including entry validation, chart-of-accounts errors, and transaction
//! state errors.

use rust_decimal::Decimal;
use tally_shared::ErrorKind;
use tally_shared::types::{AccountId, TransactionId};
use thiserror::Error;

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ========== Validation Errors ==========
    /// Transaction has no entries.
    #[error("Transaction must have at least one entry")]
    EmptyEntries,

    /// Transaction is not balanced (debits != credits).
    #[error("Transaction is not balanced. Debit: {debit}, Credit: {credit}")]
    UnbalancedEntries {
        /// Total debit amount.
        debit: Decimal,
        /// Total credit amount.
        credit: Decimal,
    },

    /// An entry has a negative side, both sides set, or neither side set.
    #[error("Entry {line} must have exactly one non-zero, non-negative side")]
    InvalidEntryAmounts {
        /// Zero-based index of the offending entry.
        line: usize,
    },

    // ========== Account Errors ==========
    /// Account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    /// Account is inactive and cannot be used.
    #[error("Account {0} is inactive")]
    AccountInactive(AccountId),

    /// Account number already in use.
    #[error("Account number {0} already exists")]
    DuplicateAccountNumber(String),

    /// Parent account does not exist.
    #[error("Parent account not found: {0}")]
    ParentAccountNotFound(AccountId),

    /// Re-parenting would make an account its own ancestor.
    #[error("Setting parent {parent_id} on account {account_id} would create a cycle")]
    AccountHierarchyCycle {
        /// The account being re-parented.
        account_id: AccountId,
        /// The proposed parent.
        parent_id: AccountId,
    },

    // ========== Transaction State Errors ==========
    /// Cannot modify a posted transaction.
    #[error("Cannot modify posted transaction")]
    CannotModifyPosted,

    /// Cannot modify a voided transaction.
    #[error("Cannot modify voided transaction")]
    CannotModifyVoided,

    /// Transaction not found.
    #[error("Transaction not found: {0}")]
    TransactionNotFound(TransactionId),
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyEntries => "EMPTY_ENTRIES",
            Self::UnbalancedEntries { .. } => "UNBALANCED_ENTRIES",
            Self::InvalidEntryAmounts { .. } => "INVALID_ENTRY_AMOUNTS",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::AccountInactive(_) => "ACCOUNT_INACTIVE",
            Self::DuplicateAccountNumber(_) => "DUPLICATE_ACCOUNT_NUMBER",
            Self::ParentAccountNotFound(_) => "PARENT_ACCOUNT_NOT_FOUND",
            Self::AccountHierarchyCycle { .. } => "ACCOUNT_HIERARCHY_CYCLE",
            Self::CannotModifyPosted => "CANNOT_MODIFY_POSTED",
            Self::CannotModifyVoided => "CANNOT_MODIFY_VOIDED",
            Self::TransactionNotFound(_) => "TRANSACTION_NOT_FOUND",
        }
    }

    /// Returns the taxonomy kind of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyEntries
            | Self::UnbalancedEntries { .. }
            | Self::InvalidEntryAmounts { .. }
            | Self::AccountInactive(_)
            | Self::DuplicateAccountNumber(_)
            | Self::AccountHierarchyCycle { .. } => ErrorKind::Validation,

            Self::CannotModifyPosted | Self::CannotModifyVoided => ErrorKind::StateConflict,

            Self::AccountNotFound(_)
            | Self::ParentAccountNotFound(_)
            | Self::TransactionNotFound(_) => ErrorKind::NotFound,
        }
    }
}
