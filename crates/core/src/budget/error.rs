//! Budget error types.

use chrono::NaiveDate;
use tally_shared::ErrorKind;
use tally_shared::types::AccountId;
use thiserror::Error;

/// Budget-related errors.
#[derive(Debug, Error)]
pub enum BudgetError {
    /// Account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    /// Budget line already exists for this account.
    #[error("Budget line already exists for account {0}")]
    DuplicateBudgetLine(AccountId),

    /// Amount cannot be negative.
    #[error("Budget amount for account {0} cannot be negative")]
    NegativeAmount(AccountId),

    /// Range ends before it starts.
    #[error("Invalid date range: start {from} is after end {to}")]
    InvalidDateRange {
        /// Start date.
        from: NaiveDate,
        /// End date.
        to: NaiveDate,
    },
}

impl BudgetError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::DuplicateBudgetLine(_) => "DUPLICATE_BUDGET_LINE",
            Self::NegativeAmount(_) => "NEGATIVE_AMOUNT",
            Self::InvalidDateRange { .. } => "INVALID_DATE_RANGE",
        }
    }

    /// Returns the taxonomy kind of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::AccountNotFound(_) => ErrorKind::NotFound,
            Self::DuplicateBudgetLine(_)
            | Self::NegativeAmount(_)
            | Self::InvalidDateRange { .. } => ErrorKind::Validation,
        }
    }
}
