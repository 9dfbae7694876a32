//! Fund accounting errors.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tally_shared::ErrorKind;
use tally_shared::types::FundId;
use thiserror::Error;

use crate::ledger::LedgerError;

/// Errors that can occur during fund operations.
#[derive(Debug, Error)]
pub enum FundError {
    /// Fund not found.
    #[error("Fund not found: {0}")]
    FundNotFound(FundId),

    /// Fund is inactive.
    #[error("Fund {0} is inactive")]
    FundInactive(FundId),

    /// An allocation entry has no fund tag.
    #[error("Entry {line} must carry a fund")]
    MissingFundTag {
        /// Zero-based index of the entry.
        line: usize,
    },

    /// A restricted fund cannot cover the requested amount.
    #[error("Insufficient balance in fund {fund_id}: available {available}, requested {requested}")]
    InsufficientFundBalance {
        /// The fund.
        fund_id: FundId,
        /// Balance available.
        available: Decimal,
        /// Amount requested.
        requested: Decimal,
    },

    /// Posting or reversing would drive a restricted fund negative.
    #[error("Restricted fund {fund_id} would go negative: balance {balance}, change {change}")]
    RestrictedFundOverdrawn {
        /// The fund.
        fund_id: FundId,
        /// Current running balance.
        balance: Decimal,
        /// Net change attempted.
        change: Decimal,
    },

    /// Entry date outside the restricted fund's validity window.
    #[error("Fund {fund_id} does not accept entries dated {date}")]
    OutsideValidityWindow {
        /// The fund.
        fund_id: FundId,
        /// The rejected date.
        date: NaiveDate,
    },

    /// Validity window end precedes its start.
    #[error("Fund validity window ends before it starts")]
    InvalidValidityWindow,

    /// Transfer amount must be positive.
    #[error("Transfer amount must be positive, got {0}")]
    InvalidTransferAmount(Decimal),

    /// Source and destination are the same fund.
    #[error("Cannot transfer a fund to itself")]
    SameFundTransfer,

    /// Underlying ledger validation failed.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl FundError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::FundNotFound(_) => "FUND_NOT_FOUND",
            Self::FundInactive(_) => "FUND_INACTIVE",
            Self::MissingFundTag { .. } => "MISSING_FUND_TAG",
            Self::InsufficientFundBalance { .. } => "INSUFFICIENT_FUND_BALANCE",
            Self::RestrictedFundOverdrawn { .. } => "RESTRICTED_FUND_OVERDRAWN",
            Self::OutsideValidityWindow { .. } => "OUTSIDE_VALIDITY_WINDOW",
            Self::InvalidValidityWindow => "INVALID_VALIDITY_WINDOW",
            Self::InvalidTransferAmount(_) => "INVALID_TRANSFER_AMOUNT",
            Self::SameFundTransfer => "SAME_FUND_TRANSFER",
            Self::Ledger(e) => e.error_code(),
        }
    }

    /// Returns the taxonomy kind of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::FundNotFound(_) => ErrorKind::NotFound,
            Self::InsufficientFundBalance { .. } | Self::RestrictedFundOverdrawn { .. } => {
                ErrorKind::InvariantViolation
            }
            Self::FundInactive(_)
            | Self::MissingFundTag { .. }
            | Self::OutsideValidityWindow { .. }
            | Self::InvalidValidityWindow
            | Self::InvalidTransferAmount(_)
            | Self::SameFundTransfer => ErrorKind::Validation,
            Self::Ledger(e) => e.kind(),
        }
    }
}
