//! Double-entry bookkeeping logic.
//!
//! This module implements the core ledger functionality:
//! - Chart-of-accounts nodes and hierarchy checks
//! - Transaction aggregates and their entries
//! - Entry validation (balanced, one-sided, non-negative)
//! - Balance calculations over posted entries

pub mod account;
pub mod balance;
pub mod entry;
pub mod error;
pub mod service;
pub mod transaction;
pub mod types;
pub mod validation;

#[cfg(test)]
mod validation_props;

pub use account::{Account, ensure_acyclic};
pub use balance::{AccountBalance, account_balances, net_balance_as_of};
pub use entry::TransactionEntry;
pub use error::LedgerError;
pub use service::LedgerService;
pub use transaction::Transaction;
pub use types::{
    AccountType, CreateTransactionInput, EntryInput, NormalBalance, TransactionTotals,
    TransactionType,
};
pub use validation::validate_entries;
