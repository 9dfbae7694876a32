//! Vendor, customer, bill and invoice repository.

use serde::Serialize;
use tracing::info;

use tally_core::document::{
    Bill, Counterparty, CreateBillInput, CreateInvoiceInput, Customer, DocumentError,
    DocumentHeader, DocumentRef, DocumentService, Invoice, Vendor,
};
use tally_core::ledger::Transaction;
use tally_shared::types::{BillId, CustomerId, InvoiceId, UserId, VendorId};

use super::Context;
use super::transaction::{
    TransactionRepository, account_map, assign_fiscal_period, ensure_funds_exist,
};
use crate::error::EngineError;
use crate::lock::LockKey;
use crate::store::{ChangeSet, CounterpartyStore, DocumentStore, FiscalStore, UnitOfWork};

/// A bill or an invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Document {
    /// Accounts-payable bill.
    Bill(Bill),
    /// Accounts-receivable invoice.
    Invoice(Invoice),
}

impl Document {
    /// Returns the typed reference.
    #[must_use]
    pub const fn reference(&self) -> DocumentRef {
        match self {
            Self::Bill(b) => b.reference(),
            Self::Invoice(i) => i.reference(),
        }
    }

    /// Returns the vendor or customer.
    #[must_use]
    pub const fn counterparty(&self) -> Counterparty {
        match self {
            Self::Bill(b) => b.counterparty(),
            Self::Invoice(i) => i.counterparty(),
        }
    }

    /// Returns the payable/receivable fields.
    #[must_use]
    pub const fn header(&self) -> &DocumentHeader {
        match self {
            Self::Bill(b) => &b.header,
            Self::Invoice(i) => &i.header,
        }
    }

    /// Returns the owned ledger transaction.
    #[must_use]
    pub const fn transaction(&self) -> &Transaction {
        match self {
            Self::Bill(b) => &b.transaction,
            Self::Invoice(i) => &i.transaction,
        }
    }

    pub(crate) fn header_mut(&mut self) -> &mut DocumentHeader {
        match self {
            Self::Bill(b) => &mut b.header,
            Self::Invoice(i) => &mut i.header,
        }
    }

    pub(crate) fn set_transaction(&mut self, transaction: Transaction) {
        match self {
            Self::Bill(b) => b.transaction = transaction,
            Self::Invoice(i) => i.transaction = transaction,
        }
    }

    pub(crate) fn stage(&mut self, changes: &mut ChangeSet) {
        match self {
            Self::Bill(b) => changes.put(b),
            Self::Invoice(i) => changes.put(i),
        }
    }
}

pub(crate) async fn load_document(
    ctx: &Context,
    reference: DocumentRef,
) -> Result<Option<Document>, EngineError> {
    Ok(match reference {
        DocumentRef::Bill(id) => ctx.store.get_bill(id).await?.map(Document::Bill),
        DocumentRef::Invoice(id) => ctx.store.get_invoice(id).await?.map(Document::Invoice),
    })
}

/// Validates and stages a new bill together with its DRAFT transaction.
pub(crate) async fn stage_bill(
    ctx: &Context,
    input: CreateBillInput,
    changes: &mut ChangeSet,
) -> Result<Bill, EngineError> {
    let vendor = ctx
        .store
        .get_vendor(input.vendor_id)
        .await?
        .ok_or(DocumentError::VendorNotFound(input.vendor_id))?;

    let taken = ctx
        .store
        .list_bills()
        .await?
        .iter()
        .any(|b| b.vendor_id == input.vendor_id && b.header.number == input.number);
    if taken {
        return Err(DocumentError::DuplicateDocumentNumber(input.number).into());
    }
    ensure_funds_exist(ctx, input.line_items.iter().map(|l| l.fund_id)).await?;

    let accounts = account_map(ctx).await?;
    let mut bill = DocumentService::create_bill(
        input,
        &vendor,
        ctx.settings.default_payment_terms_days,
        |id| accounts.get(&id),
    )?;

    let years = ctx.store.list_fiscal_years().await?;
    assign_fiscal_period(&mut bill.transaction, &years);
    changes.put(&mut bill.transaction);
    changes.put(&mut bill);
    Ok(bill)
}

/// Validates and stages a new invoice together with its DRAFT transaction.
pub(crate) async fn stage_invoice(
    ctx: &Context,
    input: CreateInvoiceInput,
    changes: &mut ChangeSet,
) -> Result<Invoice, EngineError> {
    let customer = ctx
        .store
        .get_customer(input.customer_id)
        .await?
        .ok_or(DocumentError::CustomerNotFound(input.customer_id))?;

    let taken = ctx
        .store
        .list_invoices()
        .await?
        .iter()
        .any(|i| i.header.number == input.number);
    if taken {
        return Err(DocumentError::DuplicateDocumentNumber(input.number).into());
    }
    ensure_funds_exist(ctx, input.line_items.iter().map(|l| l.fund_id)).await?;

    let accounts = account_map(ctx).await?;
    let mut invoice = DocumentService::create_invoice(
        input,
        &customer,
        ctx.settings.default_payment_terms_days,
        |id| accounts.get(&id),
    )?;

    let years = ctx.store.list_fiscal_years().await?;
    assign_fiscal_period(&mut invoice.transaction, &years);
    changes.put(&mut invoice.transaction);
    changes.put(&mut invoice);
    Ok(invoice)
}

/// Document repository.
///
/// Lifecycle calls resolve the document's transaction and delegate to the
/// [`TransactionRepository`], which keeps the document in step.
#[derive(Clone)]
pub struct DocumentRepository {
    ctx: Context,
    transactions: TransactionRepository,
}

impl DocumentRepository {
    pub(crate) fn new(ctx: Context, transactions: TransactionRepository) -> Self {
        Self { ctx, transactions }
    }

    /// Creates an active vendor.
    pub async fn create_vendor(
        &self,
        name: impl Into<String>,
        payment_terms: Option<String>,
    ) -> Result<Vendor, EngineError> {
        let mut vendor = Vendor::new(name, payment_terms);
        let mut changes = ChangeSet::new();
        changes.put(&mut vendor);
        self.ctx.store.commit(changes).await?;

        info!(vendor_id = %vendor.id, name = %vendor.name, "vendor created");
        Ok(vendor)
    }

    /// Creates an active customer.
    pub async fn create_customer(
        &self,
        name: impl Into<String>,
        payment_terms: Option<String>,
    ) -> Result<Customer, EngineError> {
        let mut customer = Customer::new(name, payment_terms);
        let mut changes = ChangeSet::new();
        changes.put(&mut customer);
        self.ctx.store.commit(changes).await?;

        info!(customer_id = %customer.id, name = %customer.name, "customer created");
        Ok(customer)
    }

    /// Fetches a vendor.
    pub async fn get_vendor(&self, id: VendorId) -> Result<Vendor, EngineError> {
        Ok(self
            .ctx
            .store
            .get_vendor(id)
            .await?
            .ok_or(DocumentError::VendorNotFound(id))?)
    }

    /// Fetches a customer.
    pub async fn get_customer(&self, id: CustomerId) -> Result<Customer, EngineError> {
        Ok(self
            .ctx
            .store
            .get_customer(id)
            .await?
            .ok_or(DocumentError::CustomerNotFound(id))?)
    }

    /// Deactivates a vendor or customer; new documents for it are rejected.
    pub async fn deactivate_counterparty(
        &self,
        counterparty: Counterparty,
    ) -> Result<(), EngineError> {
        let _locks = self
            .ctx
            .locks
            .acquire_all([LockKey::Counterparty(counterparty)])
            .await;

        let mut changes = ChangeSet::new();
        match counterparty {
            Counterparty::Vendor(id) => {
                let mut vendor = self.get_vendor(id).await?;
                vendor.is_active = false;
                changes.put(&mut vendor);
            }
            Counterparty::Customer(id) => {
                let mut customer = self.get_customer(id).await?;
                customer.is_active = false;
                changes.put(&mut customer);
            }
        }
        self.ctx.store.commit(changes).await?;
        Ok(())
    }

    /// Creates a DRAFT bill.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Vendor is not found or inactive
    /// - The number is already used for this vendor
    /// - Lines are empty or inconsistent, or reference unknown accounts/funds
    /// - The due date precedes the invoice date
    pub async fn create_bill(&self, input: CreateBillInput) -> Result<Bill, EngineError> {
        let _locks = self
            .ctx
            .locks
            .acquire_all([LockKey::Counterparty(Counterparty::Vendor(input.vendor_id))])
            .await;

        let mut changes = ChangeSet::new();
        let bill = stage_bill(&self.ctx, input, &mut changes).await?;
        self.ctx.store.commit(changes).await?;

        info!(
            bill_id = %bill.id,
            number = %bill.header.number,
            amount_due = %bill.header.amount_due,
            "bill created"
        );
        Ok(bill)
    }

    /// Creates a DRAFT invoice.
    ///
    /// # Errors
    ///
    /// Same as [`Self::create_bill`], with invoice numbers unique overall.
    pub async fn create_invoice(&self, input: CreateInvoiceInput) -> Result<Invoice, EngineError> {
        let _locks = self
            .ctx
            .locks
            .acquire_all([LockKey::Counterparty(Counterparty::Customer(input.customer_id))])
            .await;

        let mut changes = ChangeSet::new();
        let invoice = stage_invoice(&self.ctx, input, &mut changes).await?;
        self.ctx.store.commit(changes).await?;

        info!(
            invoice_id = %invoice.id,
            number = %invoice.header.number,
            amount_due = %invoice.header.amount_due,
            "invoice created"
        );
        Ok(invoice)
    }

    /// Fetches a bill or invoice.
    pub async fn get_document(&self, reference: DocumentRef) -> Result<Document, EngineError> {
        Ok(load_document(&self.ctx, reference)
            .await?
            .ok_or(DocumentError::DocumentNotFound(reference))?)
    }

    /// Fetches a bill.
    pub async fn get_bill(&self, id: BillId) -> Result<Bill, EngineError> {
        Ok(self
            .ctx
            .store
            .get_bill(id)
            .await?
            .ok_or(DocumentError::DocumentNotFound(DocumentRef::Bill(id)))?)
    }

    /// Fetches an invoice.
    pub async fn get_invoice(&self, id: InvoiceId) -> Result<Invoice, EngineError> {
        Ok(self
            .ctx
            .store
            .get_invoice(id)
            .await?
            .ok_or(DocumentError::DocumentNotFound(DocumentRef::Invoice(id)))?)
    }

    /// Lists every bill.
    pub async fn list_bills(&self) -> Result<Vec<Bill>, EngineError> {
        Ok(self.ctx.store.list_bills().await?)
    }

    /// Lists every invoice.
    pub async fn list_invoices(&self) -> Result<Vec<Invoice>, EngineError> {
        Ok(self.ctx.store.list_invoices().await?)
    }

    /// Submits the document's transaction for approval.
    pub async fn submit_document(
        &self,
        reference: DocumentRef,
        submitted_by: UserId,
    ) -> Result<Document, EngineError> {
        let transaction_id = self.get_document(reference).await?.transaction().id;
        self.transactions.submit(transaction_id, submitted_by).await?;
        self.get_document(reference).await
    }

    /// Approves the document's transaction.
    pub async fn approve_document(
        &self,
        reference: DocumentRef,
        approved_by: UserId,
        approval_notes: Option<String>,
    ) -> Result<Document, EngineError> {
        let transaction_id = self.get_document(reference).await?.transaction().id;
        self.transactions
            .approve(transaction_id, approved_by, approval_notes)
            .await?;
        self.get_document(reference).await
    }

    /// Posts the document's transaction, making the document payable.
    pub async fn post_document(
        &self,
        reference: DocumentRef,
        posted_by: UserId,
    ) -> Result<Document, EngineError> {
        let transaction_id = self.get_document(reference).await?.transaction().id;
        self.transactions.post(transaction_id, posted_by).await?;
        self.get_document(reference).await
    }

    /// Voids the document.
    ///
    /// # Errors
    ///
    /// Returns `CannotVoidPaidDocument` if any amount has been paid.
    pub async fn void_document(
        &self,
        reference: DocumentRef,
        voided_by: UserId,
        reason: impl Into<String>,
    ) -> Result<Document, EngineError> {
        let transaction_id = self.get_document(reference).await?.transaction().id;
        self.transactions
            .void(transaction_id, voided_by, reason)
            .await?;
        self.get_document(reference).await
    }
}
