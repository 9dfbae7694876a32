//! Transaction entry domain types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::types::{AccountId, EntryId, FundId};

use super::types::EntryInput;

/// A single line of a transaction, exclusively owned by it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionEntry {
    /// Unique identifier for this entry.
    pub id: EntryId,
    /// The account affected by this entry.
    pub account_id: AccountId,
    /// Optional fund tag.
    pub fund_id: Option<FundId>,
    /// Debit amount.
    pub debit: Decimal,
    /// Credit amount.
    pub credit: Decimal,
    /// Optional memo.
    pub memo: Option<String>,
}

impl TransactionEntry {
    /// Materializes a validated input line.
    #[must_use]
    pub fn from_input(input: &EntryInput) -> Self {
        Self {
            id: EntryId::new(),
            account_id: input.account_id,
            fund_id: input.fund_id,
            debit: input.debit,
            credit: input.credit,
            memo: input.memo.clone(),
        }
    }

    /// Returns the signed amount (positive for debit, negative for credit).
    #[must_use]
    pub fn signed_amount(&self) -> Decimal {
        self.debit - self.credit
    }

    /// Returns this entry's effect on its fund's net-asset balance.
    #[must_use]
    pub fn fund_change(&self) -> Decimal {
        self.credit - self.debit
    }

    /// Builds the offsetting line with debit and credit swapped.
    #[must_use]
    pub fn reversed(&self) -> EntryInput {
        EntryInput {
            account_id: self.account_id,
            fund_id: self.fund_id,
            debit: self.credit,
            credit: self.debit,
            memo: Some(format!(
                "Reversal: {}",
                self.memo.clone().unwrap_or_default()
            )),
        }
    }
}
