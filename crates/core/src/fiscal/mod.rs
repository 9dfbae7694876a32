//! Fiscal year and period management.

pub mod error;
pub mod period;
pub mod service;

pub use error::FiscalError;
pub use period::{FiscalPeriod, FiscalPeriodStatus, FiscalYear};
pub use service::FiscalService;
