//! Recurring document schedule arithmetic.
//!
//! Generation is split into a pure plan (number, dates, document input) and
//! [`RecurringService::record_generation`], which the caller applies only
//! after the document has been created in the same commit.

use chrono::{Days, NaiveDate};
use tally_shared::types::TemplateId;

use super::error::RecurringError;
use super::types::{
    CreateTemplateInput, DocumentDraft, Frequency, GenerationPlan, RecurringTemplate,
};
use crate::calendar;
use crate::document::{Counterparty, CreateBillInput, CreateInvoiceInput, DocumentService};

/// Stateless recurring template service.
pub struct RecurringService;

impl RecurringService {
    /// Validate input and build an active template.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDayOfMonth`, `InvalidDateRange`, `MissingNumberPrefix`
    /// or a line-item error.
    pub fn create_template(
        input: CreateTemplateInput,
    ) -> Result<RecurringTemplate, RecurringError> {
        if let Some(day) = input.day_of_month {
            Self::validate_day_of_month(day, input.frequency)?;
        }
        if let Some(end_date) = input.end_date
            && end_date < input.start_date
        {
            return Err(RecurringError::InvalidDateRange {
                start_date: input.start_date,
                end_date,
            });
        }
        if input.number_prefix.trim().is_empty() {
            return Err(RecurringError::MissingNumberPrefix);
        }
        DocumentService::build_lines(&input.line_items)?;

        Ok(RecurringTemplate {
            id: TemplateId::new(),
            name: input.name,
            counterparty: input.counterparty,
            line_items: input.line_items,
            control_account_id: input.control_account_id,
            description: input.description,
            payment_terms: input.payment_terms,
            frequency: input.frequency,
            day_of_month: input.day_of_month,
            next_generation_date: input.start_date,
            end_date: input.end_date,
            occurrences_generated: 0,
            last_generated_on: None,
            number_prefix: input.number_prefix,
            is_active: true,
            created_by: input.created_by,
            version: 0,
        })
    }

    /// Day pins are 1-31 and only apply to month-based frequencies.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDayOfMonth`.
    pub fn validate_day_of_month(day: u32, frequency: Frequency) -> Result<(), RecurringError> {
        if !(1..=31).contains(&day) || frequency.months().is_none() {
            return Err(RecurringError::InvalidDayOfMonth { day, frequency });
        }
        Ok(())
    }

    /// Next scheduled date after `date`.
    ///
    /// Month-based schedules land on `day_of_month` (or `date`'s own day)
    /// clamped to the target month's length.
    #[must_use]
    pub fn advance(
        date: NaiveDate,
        frequency: Frequency,
        day_of_month: Option<u32>,
    ) -> Option<NaiveDate> {
        match (frequency.days(), frequency.months()) {
            (Some(days), _) => date.checked_add_days(Days::new(days)),
            (None, Some(months)) => calendar::shift_months(date, months, day_of_month),
            (None, None) => None,
        }
    }

    /// Returns true if the template should generate on `today`.
    #[must_use]
    pub fn is_due(template: &RecurringTemplate, today: NaiveDate) -> bool {
        template.is_active
            && template.next_generation_date <= today
            && template
                .end_date
                .is_none_or(|end| template.next_generation_date <= end)
    }

    /// Templates due on `today`, ordered by next generation date.
    #[must_use]
    pub fn list_due<'a, I>(templates: I, today: NaiveDate) -> Vec<&'a RecurringTemplate>
    where
        I: IntoIterator<Item = &'a RecurringTemplate>,
    {
        let mut due: Vec<&RecurringTemplate> = templates
            .into_iter()
            .filter(|t| Self::is_due(t, today))
            .collect();
        due.sort_by_key(|t| (t.next_generation_date, t.id));
        due
    }

    /// Format a generated document number: `{prefix}-{sequence}` zero-padded.
    #[must_use]
    pub fn document_number(prefix: &str, sequence: u64, width: usize) -> String {
        format!("{prefix}-{sequence:0width$}")
    }

    /// Ensure the template may generate a document on `today`.
    ///
    /// # Errors
    ///
    /// Returns `TemplateInactive`, `TemplateExpired` or `NotDue`.
    pub fn ensure_due(
        template: &RecurringTemplate,
        today: NaiveDate,
    ) -> Result<(), RecurringError> {
        if !template.is_active {
            return Err(RecurringError::TemplateInactive(template.id));
        }
        if let Some(end_date) = template.end_date
            && template.next_generation_date > end_date
        {
            return Err(RecurringError::TemplateExpired {
                template_id: template.id,
                end_date,
            });
        }
        if template.next_generation_date > today {
            return Err(RecurringError::NotDue {
                template_id: template.id,
                next_generation_date: template.next_generation_date,
            });
        }
        Ok(())
    }

    /// Compute everything one generation run will write.
    ///
    /// The invoice date is `today`; the due date follows the template's terms
    /// (falling back to `default_terms_days`).
    ///
    /// # Errors
    ///
    /// Returns the errors of [`Self::ensure_due`] or `DateOutOfRange`.
    pub fn plan_generation(
        template: &RecurringTemplate,
        today: NaiveDate,
        sequence: u64,
        number_width: usize,
        default_terms_days: i64,
    ) -> Result<GenerationPlan, RecurringError> {
        Self::ensure_due(template, today)?;

        let number = Self::document_number(&template.number_prefix, sequence, number_width);
        let due_date = DocumentService::resolve_due_date(
            today,
            None,
            template.payment_terms.as_deref(),
            default_terms_days,
        )
        .map_err(|_| RecurringError::DateOutOfRange)?;
        let next_generation_date = Self::advance(
            template.next_generation_date,
            template.frequency,
            template.day_of_month,
        )
        .ok_or(RecurringError::DateOutOfRange)?;

        let draft = match template.counterparty {
            Counterparty::Vendor(vendor_id) => DocumentDraft::Bill(CreateBillInput {
                vendor_id,
                number: number.clone(),
                invoice_date: today,
                due_date: Some(due_date),
                description: template.description.clone(),
                ap_account_id: template.control_account_id,
                line_items: template.line_items.clone(),
                created_by: template.created_by,
            }),
            Counterparty::Customer(customer_id) => DocumentDraft::Invoice(CreateInvoiceInput {
                customer_id,
                number: number.clone(),
                invoice_date: today,
                due_date: Some(due_date),
                description: template.description.clone(),
                ar_account_id: template.control_account_id,
                line_items: template.line_items.clone(),
                created_by: template.created_by,
            }),
        };

        Ok(GenerationPlan {
            template_id: template.id,
            number,
            invoice_date: today,
            due_date,
            next_generation_date,
            draft,
        })
    }

    /// Advance the template's counters after its document was created.
    pub fn record_generation(template: &mut RecurringTemplate, plan: &GenerationPlan) {
        template.next_generation_date = plan.next_generation_date;
        template.occurrences_generated += 1;
        template.last_generated_on = Some(plan.invoice_date);
    }
}
