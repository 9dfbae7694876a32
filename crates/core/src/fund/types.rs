//! Fund domain types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::types::{AccountId, FundId, UserId};

/// Fund classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FundType {
    /// Unrestricted operating fund.
    General,
    /// Donor-restricted fund (temporarily).
    Restricted,
    /// Donor-restricted fund in perpetuity.
    PermanentlyRestricted,
    /// Unrestricted but earmarked by the board.
    BoardDesignated,
}

impl FundType {
    /// Returns true if balances of this type must never go negative.
    #[must_use]
    pub const fn is_restricted(self) -> bool {
        matches!(self, Self::Restricted | Self::PermanentlyRestricted)
    }
}

/// A named pool of net assets with a running balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fund {
    /// Unique identifier.
    pub id: FundId,
    /// Display name.
    pub name: String,
    /// Fund classification.
    pub fund_type: FundType,
    /// Running balance, updated on every posting that touches the fund.
    pub balance: Decimal,
    /// Restriction text for restricted funds.
    pub restriction: Option<String>,
    /// First day entries may be allocated to a restricted fund.
    pub valid_from: Option<NaiveDate>,
    /// Last day entries may be allocated to a restricted fund.
    pub valid_to: Option<NaiveDate>,
    /// Inactive funds reject new entries.
    pub is_active: bool,
    /// Store version for optimistic concurrency (0 = not yet stored).
    pub version: i64,
}

impl Fund {
    /// Returns true if the fund is restricted.
    #[must_use]
    pub fn is_restricted(&self) -> bool {
        self.fund_type.is_restricted()
    }

    /// Returns true if the validity window (if any) contains `date`.
    #[must_use]
    pub fn is_valid_on(&self, date: NaiveDate) -> bool {
        self.valid_from.is_none_or(|from| date >= from)
            && self.valid_to.is_none_or(|to| date <= to)
    }
}

/// Input for creating a fund.
#[derive(Debug, Clone)]
pub struct CreateFundInput {
    /// Display name.
    pub name: String,
    /// Fund classification.
    pub fund_type: FundType,
    /// Restriction text.
    pub restriction: Option<String>,
    /// Validity window start.
    pub valid_from: Option<NaiveDate>,
    /// Validity window end.
    pub valid_to: Option<NaiveDate>,
}

/// Input for an inter-fund transfer.
#[derive(Debug, Clone)]
pub struct TransferInput {
    /// Fund giving up net assets.
    pub source_fund_id: FundId,
    /// Fund receiving net assets.
    pub destination_fund_id: FundId,
    /// Amount to move (positive).
    pub amount: Decimal,
    /// Transfer date.
    pub date: NaiveDate,
    /// Account carrying the transfer-out line.
    pub transfer_out_account_id: AccountId,
    /// Account carrying the transfer-in line.
    pub transfer_in_account_id: AccountId,
    /// Description for the generated transaction.
    pub description: String,
    /// User requesting the transfer.
    pub created_by: UserId,
}

/// Result of comparing a fund's stored balance with its ledger history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundReconciliation {
    /// The fund checked.
    pub fund_id: FundId,
    /// Cut-off date for recomputation.
    pub as_of: NaiveDate,
    /// Balance recomputed from posted entries up to `as_of`.
    pub computed_balance: Decimal,
    /// Running balance stored on the fund.
    pub stored_balance: Decimal,
    /// `stored_balance - computed_balance`.
    pub discrepancy: Decimal,
    /// True when the discrepancy is exactly zero.
    pub is_reconciled: bool,
}
