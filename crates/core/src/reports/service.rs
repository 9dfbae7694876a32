//! Report generation service.
//!
//! Reports fold POSTED activity (including voided-after-posting originals and
//! their reversals, which net out) and never write.

use chrono::NaiveDate;

use super::error::ReportError;
use super::types::{
    IncomeStatementReport, IncomeStatementSection, TrialBalanceReport, TrialBalanceTotals,
};
use crate::ledger::{Account, AccountBalance, AccountType, Transaction, account_balances};

/// Service for generating financial reports.
pub struct ReportService;

impl ReportService {
    /// Generates a trial balance as of a date.
    ///
    /// The trial balance verifies that total debits equal total credits.
    #[must_use]
    pub fn trial_balance<'a, I>(
        accounts: &[Account],
        transactions: I,
        as_of: NaiveDate,
    ) -> TrialBalanceReport
    where
        I: IntoIterator<Item = &'a Transaction>,
    {
        Self::build_trial_balance(as_of, account_balances(accounts, transactions, None, as_of))
    }

    /// Generates a trial balance report from account balances.
    #[must_use]
    pub fn build_trial_balance(
        as_of: NaiveDate,
        accounts: Vec<AccountBalance>,
    ) -> TrialBalanceReport {
        TrialBalanceReport {
            as_of,
            totals: TrialBalanceTotals::from_balances(&accounts),
            accounts,
        }
    }

    /// Generates an income statement over `[from, to]`.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::InvalidDateRange` if `from > to`.
    pub fn income_statement<'a, I>(
        accounts: &[Account],
        transactions: I,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<IncomeStatementReport, ReportError>
    where
        I: IntoIterator<Item = &'a Transaction>,
    {
        if from > to {
            return Err(ReportError::InvalidDateRange { start: from, end: to });
        }

        let mut revenue = IncomeStatementSection::default();
        let mut expenses = IncomeStatementSection::default();

        for balance in account_balances(accounts, transactions, Some(from), to) {
            match balance.account_type {
                AccountType::Revenue => revenue.push(balance),
                AccountType::Expense => expenses.push(balance),
                AccountType::Asset | AccountType::Liability | AccountType::Equity => {}
            }
        }

        Ok(IncomeStatementReport {
            period_start: from,
            period_end: to,
            net_income: revenue.total - expenses.total,
            revenue,
            expenses,
        })
    }
}
