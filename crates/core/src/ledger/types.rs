//! Ledger domain types for transaction creation and validation.
//!
//! This module defines the core types used for creating and validating
//! financial transactions in the double-entry bookkeeping system.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use tally_shared::types::{AccountId, FundId, UserId};

/// Chart-of-accounts classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountType {
    /// Resources owned.
    Asset,
    /// Obligations owed.
    Liability,
    /// Net assets.
    Equity,
    /// Income earned.
    Revenue,
    /// Costs incurred.
    Expense,
}

impl AccountType {
    /// Returns the normal balance side implied by this account type.
    ///
    /// Assets and expenses are debit-normal; everything else is credit-normal.
    #[must_use]
    pub const fn normal_balance(self) -> NormalBalance {
        match self {
            Self::Asset | Self::Expense => NormalBalance::Debit,
            Self::Liability | Self::Equity | Self::Revenue => NormalBalance::Credit,
        }
    }

    /// Returns the string representation of the account type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asset => "ASSET",
            Self::Liability => "LIABILITY",
            Self::Equity => "EQUITY",
            Self::Revenue => "REVENUE",
            Self::Expense => "EXPENSE",
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The side on which an account's balance normally sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NormalBalance {
    /// Debits increase the balance.
    Debit,
    /// Credits increase the balance.
    Credit,
}

impl NormalBalance {
    /// Calculates the balance change for an entry on an account with this side.
    ///
    /// - Debit-normal: `debit - credit`
    /// - Credit-normal: `credit - debit`
    #[must_use]
    pub fn balance_change(self, debit: Decimal, credit: Decimal) -> Decimal {
        match self {
            Self::Debit => debit - credit,
            Self::Credit => credit - debit,
        }
    }
}

/// Transaction type classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    /// General journal entry.
    JournalEntry,
    /// Vendor bill or outgoing payment.
    AccountsPayable,
    /// Customer invoice or incoming receipt.
    AccountsReceivable,
    /// Tuition credit applied to a customer account.
    TuitionCredit,
    /// Movement of net assets between funds.
    FundTransfer,
}

/// Input for a single entry in a transaction.
///
/// Exactly one of `debit` / `credit` must be non-zero and neither may be negative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryInput {
    /// The account to post to.
    pub account_id: AccountId,
    /// Optional fund tag.
    pub fund_id: Option<FundId>,
    /// Debit amount (zero for a credit line).
    pub debit: Decimal,
    /// Credit amount (zero for a debit line).
    pub credit: Decimal,
    /// Optional memo for this line.
    pub memo: Option<String>,
}

impl EntryInput {
    /// Builds a debit line.
    #[must_use]
    pub fn debit(account_id: AccountId, amount: Decimal) -> Self {
        Self {
            account_id,
            fund_id: None,
            debit: amount,
            credit: Decimal::ZERO,
            memo: None,
        }
    }

    /// Builds a credit line.
    #[must_use]
    pub fn credit(account_id: AccountId, amount: Decimal) -> Self {
        Self {
            account_id,
            fund_id: None,
            debit: Decimal::ZERO,
            credit: amount,
            memo: None,
        }
    }

    /// Tags the line with a fund.
    #[must_use]
    pub fn with_fund(mut self, fund_id: Option<FundId>) -> Self {
        self.fund_id = fund_id;
        self
    }

    /// Attaches a memo to the line.
    #[must_use]
    pub fn with_memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = Some(memo.into());
        self
    }
}

/// Input for creating a new transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionInput {
    /// The type of transaction.
    pub transaction_type: TransactionType,
    /// The transaction date (determines fiscal period and fund balance checks).
    pub date: NaiveDate,
    /// Description of the transaction.
    pub description: String,
    /// Optional external reference number.
    pub reference: Option<String>,
    /// The entries (must balance).
    pub entries: Vec<EntryInput>,
    /// The user creating the transaction.
    pub created_by: UserId,
}

/// Summary of transaction totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TransactionTotals {
    /// Total debits.
    pub total_debit: Decimal,
    /// Total credits.
    pub total_credit: Decimal,
    /// Number of entries.
    pub entry_count: usize,
}

impl TransactionTotals {
    /// Returns true if debits equal credits.
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        self.total_debit == self.total_credit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_normal_balance_by_type() {
        assert_eq!(AccountType::Asset.normal_balance(), NormalBalance::Debit);
        assert_eq!(AccountType::Expense.normal_balance(), NormalBalance::Debit);
        assert_eq!(AccountType::Liability.normal_balance(), NormalBalance::Credit);
        assert_eq!(AccountType::Equity.normal_balance(), NormalBalance::Credit);
        assert_eq!(AccountType::Revenue.normal_balance(), NormalBalance::Credit);
    }

    #[test]
    fn test_balance_change() {
        assert_eq!(NormalBalance::Debit.balance_change(dec!(100), dec!(30)), dec!(70));
        assert_eq!(NormalBalance::Credit.balance_change(dec!(100), dec!(30)), dec!(-70));
    }

    #[test]
    fn test_entry_builders() {
        let account = AccountId::new();
        let fund = FundId::new();
        let line = EntryInput::credit(account, dec!(25)).with_fund(Some(fund)).with_memo("fee");

        assert_eq!(line.debit, Decimal::ZERO);
        assert_eq!(line.credit, dec!(25));
        assert_eq!(line.fund_id, Some(fund));
        assert_eq!(line.memo.as_deref(), Some("fee"));
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&TransactionType::AccountsPayable).unwrap();
        assert_eq!(json, "\"ACCOUNTS_PAYABLE\"");
    }
}
