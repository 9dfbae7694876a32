//! Bank reconciliation.
//!
//! Statement lines are matched one-to-one against posted ledger cash
//! transactions, non-ledger items are excluded through statement
//! adjustments, and a reconciliation completes only when
//! `ending + Σ adjustments == beginning ledger balance + Σ matched`.

pub mod error;
pub mod matcher;
pub mod service;
pub mod types;

#[cfg(test)]
mod matcher_props;

pub use error::ReconciliationError;
pub use matcher::{LedgerCandidate, MatchDecision, MatchOutcome};
pub use service::ReconciliationService;
pub use types::{
    AdjustmentKind, AuditNote, BankAccount, BankReconciliation, BankStatementAdjustment,
    BankTransaction, BankTransactionInput, MatchCounts, MatchStatus, ReconciliationStatus,
    ReconciliationSummary, StartReconciliationInput,
};
