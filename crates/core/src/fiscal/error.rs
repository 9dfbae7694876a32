//! Fiscal calendar errors.

use chrono::NaiveDate;
use tally_shared::ErrorKind;
use tally_shared::types::{FiscalPeriodId, FiscalYearId};
use thiserror::Error;

/// Errors that can occur while managing fiscal years and periods.
#[derive(Debug, Error)]
pub enum FiscalError {
    /// Start date after end date.
    #[error("Fiscal year start {start} is after end {end}")]
    InvalidDateRange {
        /// Requested start date.
        start: NaiveDate,
        /// Requested end date.
        end: NaiveDate,
    },

    /// New fiscal year overlaps an existing one.
    #[error("Fiscal year overlaps existing fiscal year {0}")]
    OverlappingFiscalYear(FiscalYearId),

    /// Fiscal year not found.
    #[error("Fiscal year not found: {0}")]
    FiscalYearNotFound(FiscalYearId),

    /// Fiscal period not found.
    #[error("Fiscal period not found: {0}")]
    PeriodNotFound(FiscalPeriodId),

    /// Period already closed.
    #[error("Fiscal period {0} is already closed")]
    PeriodAlreadyClosed(FiscalPeriodId),

    /// Cannot close a period while an earlier one is open.
    #[error("Cannot close fiscal period: earlier periods must be closed first")]
    EarlierPeriodsNotClosed,

    /// The period containing the date is closed.
    #[error("Fiscal period containing {0} is closed, no posting allowed")]
    PeriodClosed(NaiveDate),

    /// Date arithmetic left the representable range.
    #[error("Date out of range while generating fiscal periods")]
    DateOutOfRange,
}

impl FiscalError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidDateRange { .. } => "INVALID_DATE_RANGE",
            Self::OverlappingFiscalYear(_) => "OVERLAPPING_FISCAL_YEAR",
            Self::FiscalYearNotFound(_) => "FISCAL_YEAR_NOT_FOUND",
            Self::PeriodNotFound(_) => "FISCAL_PERIOD_NOT_FOUND",
            Self::PeriodAlreadyClosed(_) => "PERIOD_ALREADY_CLOSED",
            Self::EarlierPeriodsNotClosed => "EARLIER_PERIODS_NOT_CLOSED",
            Self::PeriodClosed(_) => "PERIOD_CLOSED",
            Self::DateOutOfRange => "DATE_OUT_OF_RANGE",
        }
    }

    /// Returns the taxonomy kind of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidDateRange { .. }
            | Self::OverlappingFiscalYear(_)
            | Self::DateOutOfRange => ErrorKind::Validation,
            Self::FiscalYearNotFound(_) | Self::PeriodNotFound(_) => ErrorKind::NotFound,
            Self::PeriodAlreadyClosed(_)
            | Self::EarlierPeriodsNotClosed
            | Self::PeriodClosed(_) => ErrorKind::StateConflict,
        }
    }
}
