//! Recurring template types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use tally_shared::types::{AccountId, TemplateId, UserId};

use crate::document::{Counterparty, CreateBillInput, CreateInvoiceInput, LineItemInput};

/// How often a template generates a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Frequency {
    /// Every day.
    Daily,
    /// Every 7 days.
    Weekly,
    /// Every 14 days.
    Biweekly,
    /// Every month.
    Monthly,
    /// Every 3 months.
    Quarterly,
    /// Every 12 months.
    Annually,
}

impl Frequency {
    /// Returns the string representation of the frequency.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "DAILY",
            Self::Weekly => "WEEKLY",
            Self::Biweekly => "BIWEEKLY",
            Self::Monthly => "MONTHLY",
            Self::Quarterly => "QUARTERLY",
            Self::Annually => "ANNUALLY",
        }
    }

    /// Step in months for month-based frequencies.
    #[must_use]
    pub const fn months(self) -> Option<u32> {
        match self {
            Self::Monthly => Some(1),
            Self::Quarterly => Some(3),
            Self::Annually => Some(12),
            Self::Daily | Self::Weekly | Self::Biweekly => None,
        }
    }

    /// Step in days for day-based frequencies.
    #[must_use]
    pub const fn days(self) -> Option<u64> {
        match self {
            Self::Daily => Some(1),
            Self::Weekly => Some(7),
            Self::Biweekly => Some(14),
            Self::Monthly | Self::Quarterly | Self::Annually => None,
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A template that periodically produces a bill or invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurringTemplate {
    /// Unique identifier.
    pub id: TemplateId,
    /// Display name.
    pub name: String,
    /// Vendor or customer.
    pub counterparty: Counterparty,
    /// Lines copied onto every generated document.
    pub line_items: Vec<LineItemInput>,
    /// AP (vendor) or AR (customer) control account.
    pub control_account_id: AccountId,
    /// Description for generated transactions.
    pub description: String,
    /// Terms used to derive each due date.
    pub payment_terms: Option<String>,
    /// Generation frequency.
    pub frequency: Frequency,
    /// Day of month to pin month-based schedules to (1-31).
    pub day_of_month: Option<u32>,
    /// Next date a document is due to be generated.
    pub next_generation_date: NaiveDate,
    /// No documents are generated after this date.
    pub end_date: Option<NaiveDate>,
    /// Number of documents generated so far.
    pub occurrences_generated: u32,
    /// Date of the last generation.
    pub last_generated_on: Option<NaiveDate>,
    /// Prefix for generated document numbers.
    pub number_prefix: String,
    /// Inactive templates never generate.
    pub is_active: bool,
    /// Owner; recorded as creator on generated documents.
    pub created_by: UserId,
    /// Store version for optimistic concurrency (0 = not yet stored).
    pub version: i64,
}

/// Input for creating a template.
#[derive(Debug, Clone)]
pub struct CreateTemplateInput {
    /// Display name.
    pub name: String,
    /// Vendor or customer.
    pub counterparty: Counterparty,
    /// Lines.
    pub line_items: Vec<LineItemInput>,
    /// AP or AR control account.
    pub control_account_id: AccountId,
    /// Description for generated transactions.
    pub description: String,
    /// Payment terms text.
    pub payment_terms: Option<String>,
    /// Frequency.
    pub frequency: Frequency,
    /// Optional day-of-month pin.
    pub day_of_month: Option<u32>,
    /// First generation date.
    pub start_date: NaiveDate,
    /// Optional last date.
    pub end_date: Option<NaiveDate>,
    /// Number prefix, e.g. "RENT".
    pub number_prefix: String,
    /// Owner.
    pub created_by: UserId,
}

/// The document a generation run will create.
#[derive(Debug, Clone)]
pub enum DocumentDraft {
    /// A vendor bill.
    Bill(CreateBillInput),
    /// A customer invoice.
    Invoice(CreateInvoiceInput),
}

/// Everything a generation run will write, computed up front.
#[derive(Debug, Clone)]
pub struct GenerationPlan {
    /// Template being advanced.
    pub template_id: TemplateId,
    /// Assigned document number.
    pub number: String,
    /// Invoice date of the new document.
    pub invoice_date: NaiveDate,
    /// Due date of the new document.
    pub due_date: NaiveDate,
    /// Template's next generation date after this run.
    pub next_generation_date: NaiveDate,
    /// Input for the new document.
    pub draft: DocumentDraft,
}
