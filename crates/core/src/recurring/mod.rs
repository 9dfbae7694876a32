//! Recurring bill and invoice templates.

pub mod error;
pub mod service;
pub mod types;

pub use error::RecurringError;
pub use service::RecurringService;
pub use types::{CreateTemplateInput, DocumentDraft, Frequency, GenerationPlan, RecurringTemplate};
