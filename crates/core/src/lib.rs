//! Core business logic for Tally.
//!
//! This crate contains pure business logic with ZERO storage or async dependencies.
//! All domain types, validation rules, and calculations live here; the `tally-db`
//! crate sequences them into atomic operations against a store.
//!
//! # Modules
//!
//! - `ledger` - Double-entry bookkeeping, chart of accounts, balances
//! - `workflow` - Transaction lifecycle and reversals
//! - `fiscal` - Fiscal years and periods
//! - `fund` - Fund accounting, allocations and transfers
//! - `document` - Bills, invoices, vendors and customers
//! - `recurring` - Recurring document schedules
//! - `payment` - Payment application
//! - `reconciliation` - Bank statement matching and reconciliation
//! - `aging` - Payables/receivables aging
//! - `budget` - Budget variance analysis
//! - `reports` - Trial balance and income statement

pub mod aging;
pub mod budget;
pub mod calendar;
pub mod document;
pub mod fiscal;
pub mod fund;
pub mod ledger;
pub mod payment;
pub mod reconciliation;
pub mod recurring;
pub mod reports;
pub mod workflow;
