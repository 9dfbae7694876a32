//! Store and engine error types.
//!
//! [`EngineError`] is what every repository returns: it wraps the module
//! errors of `tally-core` unchanged, so callers keep the precise variant,
//! code and kind.

use tally_core::budget::BudgetError;
use tally_core::document::DocumentError;
use tally_core::fiscal::FiscalError;
use tally_core::fund::FundError;
use tally_core::ledger::LedgerError;
use tally_core::payment::PaymentError;
use tally_core::reconciliation::ReconciliationError;
use tally_core::recurring::RecurringError;
use tally_core::reports::ReportError;
use tally_core::workflow::WorkflowError;
use tally_shared::{AppError, ErrorKind};
use thiserror::Error;

/// Errors raised by a backing store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A staged change was based on a version that is no longer current.
    #[error("{entity} {id} was modified concurrently (expected version {expected})")]
    VersionConflict {
        /// Entity name.
        entity: &'static str,
        /// Entity ID.
        id: String,
        /// Version the change was staged against.
        expected: i64,
    },

    /// A uniqueness constraint rejected the commit.
    #[error("Unique constraint {constraint} violated by {value}")]
    UniqueViolation {
        /// Constraint name.
        constraint: &'static str,
        /// Offending value.
        value: String,
    },

    /// The backend itself failed.
    #[error("Store backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::VersionConflict { .. } => "VERSION_CONFLICT",
            Self::UniqueViolation { .. } => "UNIQUE_VIOLATION",
            Self::Backend(_) => "STORE_BACKEND_ERROR",
        }
    }

    /// Returns the taxonomy kind of this error.
    ///
    /// A unique violation at commit means a concurrent writer won the race
    /// past the repository's own duplicate check.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::VersionConflict { .. } | Self::UniqueViolation { .. } => {
                ErrorKind::ConcurrencyConflict
            }
            Self::Backend(_) => ErrorKind::Storage,
        }
    }
}

/// Error returned by every engine operation.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Ledger validation or chart-of-accounts error.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Transaction lifecycle error.
    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    /// Fiscal calendar error.
    #[error(transparent)]
    Fiscal(#[from] FiscalError),

    /// Fund accounting error.
    #[error(transparent)]
    Fund(#[from] FundError),

    /// Bill/invoice error.
    #[error(transparent)]
    Document(#[from] DocumentError),

    /// Recurring template error.
    #[error(transparent)]
    Recurring(#[from] RecurringError),

    /// Payment application error.
    #[error(transparent)]
    Payment(#[from] PaymentError),

    /// Bank reconciliation error.
    #[error(transparent)]
    Reconciliation(#[from] ReconciliationError),

    /// Budget error.
    #[error(transparent)]
    Budget(#[from] BudgetError),

    /// Report parameter error.
    #[error(transparent)]
    Report(#[from] ReportError),

    /// Backing store error.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl EngineError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Ledger(e) => e.error_code(),
            Self::Workflow(e) => e.error_code(),
            Self::Fiscal(e) => e.error_code(),
            Self::Fund(e) => e.error_code(),
            Self::Document(e) => e.error_code(),
            Self::Recurring(e) => e.error_code(),
            Self::Payment(e) => e.error_code(),
            Self::Reconciliation(e) => e.error_code(),
            Self::Budget(e) => e.error_code(),
            Self::Report(e) => e.error_code(),
            Self::Store(e) => e.error_code(),
        }
    }

    /// Returns the taxonomy kind of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Ledger(e) => e.kind(),
            Self::Workflow(e) => e.kind(),
            Self::Fiscal(e) => e.kind(),
            Self::Fund(e) => e.kind(),
            Self::Document(e) => e.kind(),
            Self::Recurring(e) => e.kind(),
            Self::Payment(e) => e.kind(),
            Self::Reconciliation(e) => e.kind(),
            Self::Budget(e) => e.kind(),
            Self::Report(e) => e.kind(),
            Self::Store(e) => e.kind(),
        }
    }
}

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        Self::new(err.kind(), err.to_string())
    }
}

/// Records audited rejections and passes the result through.
///
/// Only `InvariantViolation` rejections are written to the audit target;
/// everything else is an ordinary caller error.
pub(crate) fn audited<T>(
    operation: &'static str,
    result: Result<T, EngineError>,
) -> Result<T, EngineError> {
    if let Err(err) = &result
        && err.kind().is_audited()
    {
        tracing::warn!(
            target: "tally::audit",
            operation,
            code = err.error_code(),
            error = %err,
            "invariant violation rejected"
        );
    }
    result
}
