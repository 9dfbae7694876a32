//! Report shapes returned to the reporting layer.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ledger::AccountBalance;

/// Every account's posted activity up to a date, with the debit/credit proof.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialBalanceReport {
    /// Last date included.
    pub as_of: NaiveDate,
    /// Per-account activity, ordered by account number.
    pub accounts: Vec<AccountBalance>,
    /// Column totals.
    pub totals: TrialBalanceTotals,
}

/// Debit and credit column totals of a trial balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialBalanceTotals {
    /// Sum of posted debits.
    pub total_debit: Decimal,
    /// Sum of posted credits.
    pub total_credit: Decimal,
    /// True when the columns agree; always true for a ledger built from
    /// balanced transactions.
    pub is_balanced: bool,
}

impl TrialBalanceTotals {
    /// Sums the debit and credit columns.
    #[must_use]
    pub fn from_balances(balances: &[AccountBalance]) -> Self {
        let (total_debit, total_credit) = balances
            .iter()
            .fold((Decimal::ZERO, Decimal::ZERO), |(dr, cr), b| {
                (dr + b.debit_total, cr + b.credit_total)
            });
        Self {
            total_debit,
            total_credit,
            is_balanced: total_debit == total_credit,
        }
    }
}

/// Revenue or expense accounts of an income statement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeStatementSection {
    /// Sum of the accounts' normal-side balances.
    pub total: Decimal,
    /// Accounts with activity in the range.
    pub accounts: Vec<AccountBalance>,
}

impl IncomeStatementSection {
    pub(crate) fn push(&mut self, balance: AccountBalance) {
        self.total += balance.balance;
        self.accounts.push(balance);
    }
}

/// Revenue less expenses over a date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeStatementReport {
    /// First day included.
    pub period_start: NaiveDate,
    /// Last day included.
    pub period_end: NaiveDate,
    /// Revenue accounts.
    pub revenue: IncomeStatementSection,
    /// Expense accounts.
    pub expenses: IncomeStatementSection,
    /// `revenue.total - expenses.total`.
    pub net_income: Decimal,
}
