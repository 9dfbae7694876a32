//! Store abstraction.
//!
//! One read trait per aggregate plus [`UnitOfWork`] for atomic writes.
//! Repositories depend on `Arc<dyn Store>` only.

pub mod change_set;
pub mod memory;

#[cfg(test)]
mod memory_props;

use async_trait::async_trait;
use tally_core::document::{Bill, Customer, DocumentRef, Invoice, Vendor};
use tally_core::fiscal::FiscalYear;
use tally_core::fund::Fund;
use tally_core::ledger::{Account, Transaction};
use tally_core::payment::Payment;
use tally_core::reconciliation::{BankAccount, BankReconciliation, BankTransaction};
use tally_core::recurring::RecurringTemplate;
use tally_shared::types::{
    AccountId, BankAccountId, BankTransactionId, BillId, CustomerId, FiscalYearId, FundId,
    InvoiceId, PaymentId, ReconciliationId, TemplateId, TransactionId, VendorId,
};

use crate::error::StoreError;

pub use change_set::{Change, ChangeSet, Staged, Versioned};
pub use memory::InMemoryStore;

/// Chart of accounts reads.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Fetches an account.
    async fn get_account(&self, id: AccountId) -> Result<Option<Account>, StoreError>;
    /// Lists every account.
    async fn list_accounts(&self) -> Result<Vec<Account>, StoreError>;
}

/// Fiscal calendar reads.
#[async_trait]
pub trait FiscalStore: Send + Sync {
    /// Fetches a fiscal year.
    async fn get_fiscal_year(&self, id: FiscalYearId) -> Result<Option<FiscalYear>, StoreError>;
    /// Lists every fiscal year, ordered by start date.
    async fn list_fiscal_years(&self) -> Result<Vec<FiscalYear>, StoreError>;
}

/// Fund reads.
#[async_trait]
pub trait FundStore: Send + Sync {
    /// Fetches a fund.
    async fn get_fund(&self, id: FundId) -> Result<Option<Fund>, StoreError>;
    /// Lists every fund.
    async fn list_funds(&self) -> Result<Vec<Fund>, StoreError>;
}

/// Ledger transaction reads.
#[async_trait]
pub trait TransactionStore: Send + Sync {
    /// Fetches a transaction.
    async fn get_transaction(&self, id: TransactionId) -> Result<Option<Transaction>, StoreError>;
    /// Lists every transaction, ordered by date then ID.
    async fn list_transactions(&self) -> Result<Vec<Transaction>, StoreError>;
}

/// Vendor and customer reads.
#[async_trait]
pub trait CounterpartyStore: Send + Sync {
    /// Fetches a vendor.
    async fn get_vendor(&self, id: VendorId) -> Result<Option<Vendor>, StoreError>;
    /// Fetches a customer.
    async fn get_customer(&self, id: CustomerId) -> Result<Option<Customer>, StoreError>;
    /// Lists every vendor.
    async fn list_vendors(&self) -> Result<Vec<Vendor>, StoreError>;
    /// Lists every customer.
    async fn list_customers(&self) -> Result<Vec<Customer>, StoreError>;
}

/// Bill and invoice reads.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetches a bill.
    async fn get_bill(&self, id: BillId) -> Result<Option<Bill>, StoreError>;
    /// Fetches an invoice.
    async fn get_invoice(&self, id: InvoiceId) -> Result<Option<Invoice>, StoreError>;
    /// Lists every bill.
    async fn list_bills(&self) -> Result<Vec<Bill>, StoreError>;
    /// Lists every invoice.
    async fn list_invoices(&self) -> Result<Vec<Invoice>, StoreError>;
    /// Finds the document that owns a ledger transaction.
    async fn find_document_by_transaction(
        &self,
        transaction_id: TransactionId,
    ) -> Result<Option<DocumentRef>, StoreError>;
}

/// Payment reads.
#[async_trait]
pub trait PaymentStore: Send + Sync {
    /// Fetches a payment.
    async fn get_payment(&self, id: PaymentId) -> Result<Option<Payment>, StoreError>;
    /// Lists the payments recorded against one document.
    async fn list_payments(&self, document: DocumentRef) -> Result<Vec<Payment>, StoreError>;
    /// Finds the payment whose settlement is a ledger transaction.
    async fn find_payment_by_transaction(
        &self,
        transaction_id: TransactionId,
    ) -> Result<Option<Payment>, StoreError>;
}

/// Recurring template reads.
#[async_trait]
pub trait TemplateStore: Send + Sync {
    /// Fetches a template.
    async fn get_template(&self, id: TemplateId) -> Result<Option<RecurringTemplate>, StoreError>;
    /// Lists every template.
    async fn list_templates(&self) -> Result<Vec<RecurringTemplate>, StoreError>;
}

/// Bank account, statement line and reconciliation reads.
#[async_trait]
pub trait BankStore: Send + Sync {
    /// Fetches a bank account.
    async fn get_bank_account(&self, id: BankAccountId) -> Result<Option<BankAccount>, StoreError>;
    /// Lists every bank account.
    async fn list_bank_accounts(&self) -> Result<Vec<BankAccount>, StoreError>;
    /// Fetches a bank statement line.
    async fn get_bank_transaction(
        &self,
        id: BankTransactionId,
    ) -> Result<Option<BankTransaction>, StoreError>;
    /// Lists the statement lines of one bank account, ordered by date then ID.
    async fn list_bank_transactions(
        &self,
        bank_account_id: BankAccountId,
    ) -> Result<Vec<BankTransaction>, StoreError>;
    /// Fetches a reconciliation.
    async fn get_reconciliation(
        &self,
        id: ReconciliationId,
    ) -> Result<Option<BankReconciliation>, StoreError>;
    /// Lists the reconciliations of one bank account.
    async fn list_reconciliations(
        &self,
        bank_account_id: BankAccountId,
    ) -> Result<Vec<BankReconciliation>, StoreError>;
}

/// Atomic writes.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    /// Applies every staged change or none of them.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::VersionConflict` if any staged version is stale,
    /// `StoreError::UniqueViolation` if a uniqueness constraint would break.
    async fn commit(&self, changes: ChangeSet) -> Result<(), StoreError>;

    /// Returns the next value (starting at 1) of a named sequence.
    async fn next_sequence(&self, name: &str) -> Result<u64, StoreError>;
}

/// Everything a repository needs from a backing store.
pub trait Store:
    AccountStore
    + FiscalStore
    + FundStore
    + TransactionStore
    + CounterpartyStore
    + DocumentStore
    + PaymentStore
    + TemplateStore
    + BankStore
    + UnitOfWork
{
}

impl<T> Store for T where
    T: AccountStore
        + FiscalStore
        + FundStore
        + TransactionStore
        + CounterpartyStore
        + DocumentStore
        + PaymentStore
        + TemplateStore
        + BankStore
        + UnitOfWork
{
}
