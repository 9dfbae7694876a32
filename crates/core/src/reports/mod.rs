//! Financial report generation.
//!
//! Trial balance and income statement over POSTED ledger activity.

pub mod error;
pub mod service;
pub mod types;


pub use error::ReportError;
pub use service::ReportService;
pub use types::{
    IncomeStatementReport, IncomeStatementSection, TrialBalanceReport, TrialBalanceTotals,
};
