//! Budget data types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::types::AccountId;

use crate::ledger::AccountType;

/// A budgeted amount for one account over the report range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetLine {
    /// Account ID.
    pub account_id: AccountId,
    /// Budgeted amount.
    pub amount: Decimal,
    /// Optional notes.
    pub notes: Option<String>,
}

impl BudgetLine {
    /// Creates a budget line without notes.
    #[must_use]
    pub const fn new(account_id: AccountId, amount: Decimal) -> Self {
        Self {
            account_id,
            amount,
            notes: None,
        }
    }
}

/// Budget line with calculated actual amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetLineWithActual {
    /// Account ID.
    pub account_id: AccountId,
    /// Account number.
    pub account_number: String,
    /// Account name.
    pub account_name: String,
    /// Account type.
    pub account_type: AccountType,
    /// Budgeted amount.
    pub budgeted: Decimal,
    /// Actual POSTED activity on the account's normal side.
    pub actual: Decimal,
    /// Variance (budgeted - actual, or actual - budgeted for revenue).
    pub variance: Decimal,
    /// Variance as a percentage of budget.
    pub variance_percent: Decimal,
    /// Utilization percentage (actual / budgeted * 100).
    pub utilization_percent: Decimal,
    /// Variance status.
    pub status: VarianceStatus,
}

/// Budget vs actual report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetVsActualReport {
    /// First day of the range.
    pub from: NaiveDate,
    /// Last day of the range.
    pub to: NaiveDate,
    /// Budget lines with actual amounts, by account number.
    pub lines: Vec<BudgetLineWithActual>,
    /// Summary totals.
    pub summary: BudgetVsActualSummary,
}

/// Budget vs actual summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetVsActualSummary {
    /// Total budgeted amount.
    pub total_budgeted: Decimal,
    /// Total actual amount.
    pub total_actual: Decimal,
    /// Total variance.
    pub total_variance: Decimal,
    /// Overall utilization percentage.
    pub overall_utilization: Decimal,
}

/// Variance calculation result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VarianceResult {
    /// Budgeted amount.
    pub budgeted: Decimal,
    /// Actual amount.
    pub actual: Decimal,
    /// Variance amount.
    pub variance: Decimal,
    /// Variance percentage.
    pub variance_percent: Decimal,
    /// Utilization percentage.
    pub utilization_percent: Decimal,
    /// Variance status.
    pub status: VarianceStatus,
}

/// Variance status classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VarianceStatus {
    /// Favorable variance (under budget for expenses, over target for revenue).
    Favorable,
    /// Unfavorable variance (over budget for expenses, under target for revenue).
    Unfavorable,
    /// On budget (no variance).
    OnBudget,
}
