//! Recurring template errors.

use chrono::NaiveDate;
use tally_shared::ErrorKind;
use tally_shared::types::TemplateId;
use thiserror::Error;

use super::types::Frequency;
use crate::document::DocumentError;

/// Errors that can occur while managing or running recurring templates.
#[derive(Debug, Error)]
pub enum RecurringError {
    /// Template not found.
    #[error("Recurring template not found: {0}")]
    TemplateNotFound(TemplateId),

    /// Template is inactive.
    #[error("Recurring template {0} is inactive")]
    TemplateInactive(TemplateId),

    /// Template has passed its end date.
    #[error("Recurring template {template_id} ended on {end_date}")]
    TemplateExpired {
        /// The template.
        template_id: TemplateId,
        /// Its end date.
        end_date: NaiveDate,
    },

    /// Template is not yet due.
    #[error("Recurring template {template_id} is not due until {next_generation_date}")]
    NotDue {
        /// The template.
        template_id: TemplateId,
        /// When it is next due.
        next_generation_date: NaiveDate,
    },

    /// Day-of-month pin is out of range or not applicable to the frequency.
    #[error("Day of month {day} is not valid for {frequency} schedules")]
    InvalidDayOfMonth {
        /// The requested day.
        day: u32,
        /// The template frequency.
        frequency: Frequency,
    },

    /// End date precedes the first generation date.
    #[error("End date {end_date} is before start date {start_date}")]
    InvalidDateRange {
        /// First generation date.
        start_date: NaiveDate,
        /// End date.
        end_date: NaiveDate,
    },

    /// Document number prefix must not be blank.
    #[error("Document number prefix is required")]
    MissingNumberPrefix,

    /// Date arithmetic left the representable range.
    #[error("Date out of range")]
    DateOutOfRange,

    /// The template's lines or terms are invalid for a document.
    #[error(transparent)]
    Document(#[from] DocumentError),
}

impl RecurringError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::TemplateNotFound(_) => "TEMPLATE_NOT_FOUND",
            Self::TemplateInactive(_) => "TEMPLATE_INACTIVE",
            Self::TemplateExpired { .. } => "TEMPLATE_EXPIRED",
            Self::NotDue { .. } => "TEMPLATE_NOT_DUE",
            Self::InvalidDayOfMonth { .. } => "INVALID_DAY_OF_MONTH",
            Self::InvalidDateRange { .. } => "INVALID_DATE_RANGE",
            Self::MissingNumberPrefix => "MISSING_NUMBER_PREFIX",
            Self::DateOutOfRange => "DATE_OUT_OF_RANGE",
            Self::Document(e) => e.error_code(),
        }
    }

    /// Returns the taxonomy kind of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::TemplateNotFound(_) => ErrorKind::NotFound,
            Self::TemplateInactive(_) | Self::TemplateExpired { .. } | Self::NotDue { .. } => {
                ErrorKind::StateConflict
            }
            Self::InvalidDayOfMonth { .. }
            | Self::InvalidDateRange { .. }
            | Self::MissingNumberPrefix
            | Self::DateOutOfRange => ErrorKind::Validation,
            Self::Document(e) => e.kind(),
        }
    }
}
