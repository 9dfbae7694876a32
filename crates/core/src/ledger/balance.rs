//! Account balance calculations over posted entries.
//!
//! - Debit-normal (Asset/Expense): balance += debit - credit
//! - Credit-normal (Liability/Equity/Revenue): balance += credit - debit

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tally_shared::types::AccountId;

use super::account::Account;
use super::transaction::Transaction;
use super::types::AccountType;

/// Account balance over a date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountBalance {
    /// The account ID.
    pub account_id: AccountId,
    /// Account number.
    pub number: String,
    /// Account name.
    pub name: String,
    /// Account type.
    pub account_type: AccountType,
    /// Total debit amount.
    pub debit_total: Decimal,
    /// Total credit amount.
    pub credit_total: Decimal,
    /// Net balance on the account's normal side.
    pub balance: Decimal,
}

impl AccountBalance {
    /// Creates a zero balance for an account.
    #[must_use]
    pub fn new(account: &Account) -> Self {
        Self {
            account_id: account.id,
            number: account.number.clone(),
            name: account.name.clone(),
            account_type: account.account_type,
            debit_total: Decimal::ZERO,
            credit_total: Decimal::ZERO,
            balance: Decimal::ZERO,
        }
    }

    fn add(&mut self, account: &Account, debit: Decimal, credit: Decimal) {
        self.debit_total += debit;
        self.credit_total += credit;
        self.balance += account.normal_balance().balance_change(debit, credit);
    }
}

/// Folds balance-affecting transactions dated within `[from, to]` into
/// per-account balances, ordered by account number.
///
/// `from = None` means from the beginning of the ledger.
#[must_use]
pub fn account_balances<'a, I>(
    accounts: &[Account],
    transactions: I,
    from: Option<NaiveDate>,
    to: NaiveDate,
) -> Vec<AccountBalance>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let by_id: HashMap<AccountId, &Account> = accounts.iter().map(|a| (a.id, a)).collect();
    let mut balances: HashMap<AccountId, AccountBalance> = accounts
        .iter()
        .map(|a| (a.id, AccountBalance::new(a)))
        .collect();

    let in_range = |date: NaiveDate| date <= to && from.is_none_or(|start| date >= start);

    for txn in transactions {
        if !txn.affects_balances() || !in_range(txn.date) {
            continue;
        }
        for entry in &txn.entries {
            if let (Some(account), Some(balance)) =
                (by_id.get(&entry.account_id), balances.get_mut(&entry.account_id))
            {
                balance.add(account, entry.debit, entry.credit);
            }
        }
    }

    let mut result: Vec<AccountBalance> = balances.into_values().collect();
    result.sort_by(|a, b| a.number.cmp(&b.number));
    result
}

/// Signed (debit - credit) balance of one account as of a date, inclusive.
#[must_use]
pub fn net_balance_as_of<'a, I>(account_id: AccountId, transactions: I, as_of: NaiveDate) -> Decimal
where
    I: IntoIterator<Item = &'a Transaction>,
{
    transactions
        .into_iter()
        .filter(|t| t.affects_balances() && t.date <= as_of)
        .map(|t| t.net_on_account(account_id))
        .sum()
}
