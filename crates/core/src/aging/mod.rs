//! Payables and receivables aging.
//!
//! `days_overdue = as_of - due_date`; buckets are current (≤ 0), 1-30,
//! 31-60, 61-90 and 90Plus, each accumulating `amount_due - amount_paid` of
//! documents that are neither PAID nor VOIDED.

pub mod service;
pub mod types;

pub use service::{AgingItem, AgingService};
pub use types::{AgingBucket, AgingBuckets, AgingReport, CounterpartyAging};
