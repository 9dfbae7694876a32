//! Recurring template repository.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;

use tally_core::document::{Counterparty, DocumentError};
use tally_core::ledger::LedgerError;
use tally_core::recurring::{
    CreateTemplateInput, DocumentDraft, RecurringError, RecurringService, RecurringTemplate,
};
use tally_shared::types::TemplateId;

use super::Context;
use super::document::{Document, stage_bill, stage_invoice};
use crate::error::EngineError;
use crate::lock::LockKey;
use crate::store::{AccountStore, ChangeSet, CounterpartyStore, TemplateStore, UnitOfWork};

/// A document generated from a template, with the advanced template.
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedDocument {
    /// The new DRAFT bill or invoice.
    pub document: Document,
    /// The template after its counters advanced.
    pub template: RecurringTemplate,
}

/// Recurring template repository.
#[derive(Clone)]
pub struct RecurringRepository {
    ctx: Context,
}

impl RecurringRepository {
    pub(crate) fn new(ctx: Context) -> Self {
        Self { ctx }
    }

    /// Creates an active template.
    ///
    /// # Errors
    ///
    /// Returns an error if the counterparty or control account is unknown, or
    /// the schedule, lines or prefix are invalid.
    pub async fn create_template(
        &self,
        input: CreateTemplateInput,
    ) -> Result<RecurringTemplate, EngineError> {
        match input.counterparty {
            Counterparty::Vendor(id) => {
                self.ctx
                    .store
                    .get_vendor(id)
                    .await?
                    .ok_or(DocumentError::VendorNotFound(id))?;
            }
            Counterparty::Customer(id) => {
                self.ctx
                    .store
                    .get_customer(id)
                    .await?
                    .ok_or(DocumentError::CustomerNotFound(id))?;
            }
        }
        if self.ctx.store.get_account(input.control_account_id).await?.is_none() {
            return Err(LedgerError::AccountNotFound(input.control_account_id).into());
        }

        let mut template = RecurringService::create_template(input)?;
        let mut changes = ChangeSet::new();
        changes.put(&mut template);
        self.ctx.store.commit(changes).await?;

        info!(
            template_id = %template.id,
            frequency = %template.frequency.as_str(),
            next_generation_date = %template.next_generation_date,
            "recurring template created"
        );
        Ok(template)
    }

    /// Generates the template's next DRAFT document.
    ///
    /// The document and the advanced template commit together; a failed
    /// document leaves the template untouched.
    ///
    /// # Errors
    ///
    /// Returns `TemplateNotFound`, `TemplateInactive`, `TemplateExpired`,
    /// `NotDue`, or any error from creating the document.
    pub async fn generate_from_recurring(
        &self,
        id: TemplateId,
        today: NaiveDate,
    ) -> Result<GeneratedDocument, EngineError> {
        let counterparty = self.get_template(id).await?.counterparty;
        let _locks = self
            .ctx
            .locks
            .acquire_all([LockKey::Counterparty(counterparty), LockKey::Template(id)])
            .await;

        let mut template = self.get_template(id).await?;
        RecurringService::ensure_due(&template, today)?;

        let sequence = self
            .ctx
            .store
            .next_sequence(&format!("document-number:{}", template.number_prefix))
            .await?;
        let plan = RecurringService::plan_generation(
            &template,
            today,
            sequence,
            self.ctx.settings.document_number_width,
            self.ctx.settings.default_payment_terms_days,
        )?;

        let mut changes = ChangeSet::new();
        let document = match plan.draft.clone() {
            DocumentDraft::Bill(input) => {
                Document::Bill(stage_bill(&self.ctx, input, &mut changes).await?)
            }
            DocumentDraft::Invoice(input) => {
                Document::Invoice(stage_invoice(&self.ctx, input, &mut changes).await?)
            }
        };
        RecurringService::record_generation(&mut template, &plan);
        changes.put(&mut template);
        self.ctx.store.commit(changes).await?;

        info!(
            template_id = %id,
            number = %plan.number,
            next_generation_date = %template.next_generation_date,
            "document generated from template"
        );
        Ok(GeneratedDocument { document, template })
    }

    /// Templates due on `today`, ordered by next generation date.
    pub async fn list_due_templates(
        &self,
        today: NaiveDate,
    ) -> Result<Vec<RecurringTemplate>, EngineError> {
        let templates = self.ctx.store.list_templates().await?;
        Ok(RecurringService::list_due(&templates, today)
            .into_iter()
            .cloned()
            .collect())
    }

    /// Stops a template from generating further documents.
    pub async fn deactivate_template(
        &self,
        id: TemplateId,
    ) -> Result<RecurringTemplate, EngineError> {
        let _locks = self.ctx.locks.acquire_all([LockKey::Template(id)]).await;

        let mut template = self.get_template(id).await?;
        template.is_active = false;
        let mut changes = ChangeSet::new();
        changes.put(&mut template);
        self.ctx.store.commit(changes).await?;
        Ok(template)
    }

    /// Fetches a template.
    pub async fn get_template(&self, id: TemplateId) -> Result<RecurringTemplate, EngineError> {
        Ok(self
            .ctx
            .store
            .get_template(id)
            .await?
            .ok_or(RecurringError::TemplateNotFound(id))?)
    }
}
