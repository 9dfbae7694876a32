//! Budget-versus-actual comparison.
//!
//! Budgeted amounts are supplied by the caller per account; actuals come
//! from posted ledger activity in a date range. Expense lines are favorable
//! when under budget, revenue lines when over.

mod error;
mod service;
mod types;


pub use error::BudgetError;
pub use service::BudgetService;
pub use types::{
    BudgetLine, BudgetLineWithActual, BudgetVsActualReport, BudgetVsActualSummary,
    VarianceResult, VarianceStatus,
};
