//! Transaction workflow management.
//!
//! This module implements the transaction lifecycle state machine
//! and void/reversal operations.
//!
//! # Modules
//!
//! - `types` - Workflow domain types (TransactionStatus, WorkflowAction)
//! - `error` - Workflow-specific error types
//! - `service` - State transition logic
//! - `reversal` - Reversing transaction creation

pub mod error;
pub mod reversal;
pub mod service;
pub mod types;

#[cfg(test)]
mod reversal_props;
#[cfg(test)]
mod service_props;

pub use error::WorkflowError;
pub use reversal::ReversalService;
pub use service::WorkflowService;
pub use types::{TransactionStatus, WorkflowAction};
