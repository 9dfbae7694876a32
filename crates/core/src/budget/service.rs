//! Budget service for variance calculation and budget-vs-actual reporting.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use tally_shared::types::AccountId;

use super::error::BudgetError;
use super::types::{
    BudgetLine, BudgetLineWithActual, BudgetVsActualReport, BudgetVsActualSummary, VarianceResult,
    VarianceStatus,
};
use crate::ledger::{Account, AccountBalance, AccountType, Transaction, account_balances};

/// Budget service for business logic.
pub struct BudgetService;

impl BudgetService {
    /// Calculate variance between budgeted and actual amounts.
    ///
    /// For expense accounts: variance = budgeted - actual
    ///   - Positive variance (under budget) is favorable
    ///   - Negative variance (over budget) is unfavorable
    ///
    /// For revenue accounts: variance = actual - budgeted
    ///   - Positive variance (over target) is favorable
    ///   - Negative variance (under target) is unfavorable
    #[must_use]
    pub fn calculate_variance(
        budgeted: Decimal,
        actual: Decimal,
        account_type: AccountType,
    ) -> VarianceResult {
        let variance = match account_type {
            AccountType::Revenue => actual - budgeted,
            // expense, asset, liability, equity - all use budgeted - actual
            _ => budgeted - actual,
        };

        let status = match variance.cmp(&Decimal::ZERO) {
            std::cmp::Ordering::Greater => VarianceStatus::Favorable,
            std::cmp::Ordering::Less => VarianceStatus::Unfavorable,
            std::cmp::Ordering::Equal => VarianceStatus::OnBudget,
        };

        VarianceResult {
            budgeted,
            actual,
            variance,
            variance_percent: Self::percent_of(variance, budgeted),
            utilization_percent: Self::percent_of(actual, budgeted),
            status,
        }
    }

    /// Reject negative amounts and repeated accounts.
    ///
    /// # Errors
    ///
    /// Returns `BudgetError::NegativeAmount` or `BudgetError::DuplicateBudgetLine`.
    pub fn validate_budget_lines(lines: &[BudgetLine]) -> Result<(), BudgetError> {
        let mut seen = HashSet::new();
        for line in lines {
            if line.amount < Decimal::ZERO {
                return Err(BudgetError::NegativeAmount(line.account_id));
            }
            if !seen.insert(line.account_id) {
                return Err(BudgetError::DuplicateBudgetLine(line.account_id));
            }
        }
        Ok(())
    }

    /// Compare budget lines with POSTED activity dated in `[from, to]`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDateRange`, a line validation error, or
    /// `AccountNotFound` for a line whose account is not in `accounts`.
    pub fn budget_vs_actual<'a, I>(
        lines: &[BudgetLine],
        accounts: &[Account],
        transactions: I,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<BudgetVsActualReport, BudgetError>
    where
        I: IntoIterator<Item = &'a Transaction>,
    {
        if from > to {
            return Err(BudgetError::InvalidDateRange { from, to });
        }
        Self::validate_budget_lines(lines)?;

        let balances: HashMap<AccountId, AccountBalance> =
            account_balances(accounts, transactions, Some(from), to)
                .into_iter()
                .map(|b| (b.account_id, b))
                .collect();

        let mut rows = Vec::with_capacity(lines.len());
        for line in lines {
            let balance = balances
                .get(&line.account_id)
                .ok_or(BudgetError::AccountNotFound(line.account_id))?;
            let result =
                Self::calculate_variance(line.amount, balance.balance, balance.account_type);

            rows.push(BudgetLineWithActual {
                account_id: line.account_id,
                account_number: balance.number.clone(),
                account_name: balance.name.clone(),
                account_type: balance.account_type,
                budgeted: result.budgeted,
                actual: result.actual,
                variance: result.variance,
                variance_percent: result.variance_percent,
                utilization_percent: result.utilization_percent,
                status: result.status,
            });
        }
        rows.sort_by(|a, b| a.account_number.cmp(&b.account_number));

        let total_budgeted: Decimal = rows.iter().map(|r| r.budgeted).sum();
        let total_actual: Decimal = rows.iter().map(|r| r.actual).sum();
        let total_variance: Decimal = rows.iter().map(|r| r.variance).sum();

        Ok(BudgetVsActualReport {
            from,
            to,
            lines: rows,
            summary: BudgetVsActualSummary {
                total_budgeted,
                total_actual,
                total_variance,
                overall_utilization: Self::percent_of(total_actual, total_budgeted),
            },
        })
    }

    fn percent_of(value: Decimal, budgeted: Decimal) -> Decimal {
        if budgeted.is_zero() {
            Decimal::ZERO
        } else {
            (value / budgeted * Decimal::ONE_HUNDRED).round_dp(2)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{CreateTransactionInput, EntryInput, LedgerService, TransactionType};
    use crate::workflow::TransactionStatus;
    use rust_decimal_macros::dec;
    use tally_shared::types::UserId;

    #[test]
    fn test_expense_variance_favorable() {
        let result = BudgetService::calculate_variance(dec!(1000), dec!(800), AccountType::Expense);

        assert_eq!(result.budgeted, dec!(1000));
        assert_eq!(result.actual, dec!(800));
        assert_eq!(result.variance, dec!(200));
        assert_eq!(result.variance_percent, dec!(20.00));
        assert_eq!(result.utilization_percent, dec!(80.00));
        assert_eq!(result.status, VarianceStatus::Favorable);
    }

    #[test]
    fn test_expense_variance_unfavorable() {
        let result =
            BudgetService::calculate_variance(dec!(1000), dec!(1200), AccountType::Expense);

        assert_eq!(result.variance, dec!(-200));
        assert_eq!(result.variance_percent, dec!(-20.00));
        assert_eq!(result.utilization_percent, dec!(120.00));
        assert_eq!(result.status, VarianceStatus::Unfavorable);
    }

    #[test]
    fn test_revenue_variance_favorable() {
        let result =
            BudgetService::calculate_variance(dec!(1000), dec!(1200), AccountType::Revenue);

        assert_eq!(result.variance, dec!(200));
        assert_eq!(result.variance_percent, dec!(20.00));
        assert_eq!(result.status, VarianceStatus::Favorable);
    }

    #[test]
    fn test_revenue_variance_unfavorable() {
        let result = BudgetService::calculate_variance(dec!(1000), dec!(800), AccountType::Revenue);

        assert_eq!(result.variance, dec!(-200));
        assert_eq!(result.status, VarianceStatus::Unfavorable);
    }

    #[test]
    fn test_variance_on_budget() {
        let result =
            BudgetService::calculate_variance(dec!(1000), dec!(1000), AccountType::Expense);

        assert_eq!(result.variance, dec!(0));
        assert_eq!(result.status, VarianceStatus::OnBudget);
    }

    #[test]
    fn test_zero_budget_utilization() {
        let result = BudgetService::calculate_variance(dec!(0), dec!(500), AccountType::Expense);

        assert_eq!(result.utilization_percent, dec!(0));
        assert_eq!(result.variance_percent, dec!(0));
    }

    #[test]
    fn test_validate_budget_lines() {
        let account = AccountId::new();
        assert!(matches!(
            BudgetService::validate_budget_lines(&[BudgetLine::new(account, dec!(-1))]),
            Err(BudgetError::NegativeAmount(_))
        ));
        assert!(matches!(
            BudgetService::validate_budget_lines(&[
                BudgetLine::new(account, dec!(1)),
                BudgetLine::new(account, dec!(2)),
            ]),
            Err(BudgetError::DuplicateBudgetLine(_))
        ));
        assert!(BudgetService::validate_budget_lines(&[BudgetLine::new(account, dec!(0))]).is_ok());
    }

    #[test]
    fn test_budget_vs_actual_from_posted_activity() {
        let cash = Account::new("1000", "Cash", AccountType::Asset, None);
        let tuition = Account::new("4100", "Tuition", AccountType::Revenue, None);
        let supplies = Account::new("5100", "Supplies", AccountType::Expense, None);
        let accounts = vec![cash.clone(), tuition.clone(), supplies.clone()];
        let date = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();

        let post = |debit: AccountId,
                    credit: AccountId,
                    amount: Decimal,
                    status: TransactionStatus| {
            let mut txn = LedgerService::create_transaction(
                CreateTransactionInput {
                    transaction_type: TransactionType::JournalEntry,
                    date,
                    description: "activity".to_string(),
                    reference: None,
                    entries: vec![
                        EntryInput::debit(debit, amount),
                        EntryInput::credit(credit, amount),
                    ],
                    created_by: UserId::new(),
                },
                |id| accounts.iter().find(|a| a.id == id),
            )
            .unwrap();
            txn.status = status;
            txn
        };
        let transactions = vec![
            post(cash.id, tuition.id, dec!(12_000), TransactionStatus::Posted),
            post(supplies.id, cash.id, dec!(900), TransactionStatus::Posted),
            post(supplies.id, cash.id, dec!(5_000), TransactionStatus::Draft),
        ];

        let report = BudgetService::budget_vs_actual(
            &[BudgetLine::new(supplies.id, dec!(1000)), BudgetLine::new(tuition.id, dec!(10_000))],
            &accounts,
            &transactions,
            NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 5, 31).unwrap(),
        )
        .unwrap();

        assert_eq!(report.lines[0].account_number, "4100");
        assert_eq!(report.lines[0].actual, dec!(12_000));
        assert_eq!(report.lines[0].variance, dec!(2_000));
        assert_eq!(report.lines[1].actual, dec!(900));
        assert_eq!(report.lines[1].variance, dec!(100));
        assert_eq!(report.lines[1].utilization_percent, dec!(90.00));
        assert_eq!(report.summary.total_variance, dec!(2_100));
    }

    #[test]
    fn test_budget_vs_actual_unknown_account() {
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let result = BudgetService::budget_vs_actual(
            &[BudgetLine::new(AccountId::new(), dec!(1))],
            &[],
            std::iter::empty(),
            day,
            day,
        );
        assert!(matches!(result, Err(BudgetError::AccountNotFound(_))));
    }
}
