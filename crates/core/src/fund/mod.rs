//! Fund accounting.
//!
//! Entries carry an optional fund tag; restricted funds must never be driven
//! negative by an allocation, transfer, posting or reversal.

pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use error::FundError;
pub use service::FundService;
pub use types::{CreateFundInput, Fund, FundReconciliation, FundType, TransferInput};
