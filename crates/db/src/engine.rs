//! The engine facade: one handle over every repository.

use std::sync::Arc;

use crate::repositories::{
    AccountRepository, Context, DocumentRepository, FiscalRepository, FundRepository,
    PaymentRepository, ReconciliationRepository, RecurringRepository, ReportRepository,
    TransactionRepository,
};
use crate::settings::EngineSettings;
use crate::store::{InMemoryStore, Store};

/// Accounting engine.
///
/// Cloning is cheap; clones share the store and the lock registry.
#[derive(Clone)]
pub struct Engine {
    accounts: AccountRepository,
    fiscal: FiscalRepository,
    transactions: TransactionRepository,
    funds: FundRepository,
    documents: DocumentRepository,
    recurring: RecurringRepository,
    payments: PaymentRepository,
    reconciliation: ReconciliationRepository,
    reports: ReportRepository,
}

impl Engine {
    /// Creates an engine over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn Store>, settings: EngineSettings) -> Self {
        let ctx = Context::new(store, settings);
        let transactions = TransactionRepository::new(ctx.clone());
        Self {
            accounts: AccountRepository::new(ctx.clone()),
            fiscal: FiscalRepository::new(ctx.clone()),
            funds: FundRepository::new(ctx.clone()),
            documents: DocumentRepository::new(ctx.clone(), transactions.clone()),
            recurring: RecurringRepository::new(ctx.clone()),
            payments: PaymentRepository::new(ctx.clone()),
            reconciliation: ReconciliationRepository::new(ctx.clone()),
            reports: ReportRepository::new(ctx),
            transactions,
        }
    }

    /// Creates an engine over a fresh [`InMemoryStore`].
    #[must_use]
    pub fn in_memory(settings: EngineSettings) -> Self {
        Self::new(Arc::new(InMemoryStore::new()), settings)
    }

    /// Chart of accounts.
    #[must_use]
    pub const fn accounts(&self) -> &AccountRepository {
        &self.accounts
    }

    /// Fiscal years and periods.
    #[must_use]
    pub const fn fiscal(&self) -> &FiscalRepository {
        &self.fiscal
    }

    /// Ledger transactions and their lifecycle.
    #[must_use]
    pub const fn transactions(&self) -> &TransactionRepository {
        &self.transactions
    }

    /// Funds, allocations and transfers.
    #[must_use]
    pub const fn funds(&self) -> &FundRepository {
        &self.funds
    }

    /// Vendors, customers, bills and invoices.
    #[must_use]
    pub const fn documents(&self) -> &DocumentRepository {
        &self.documents
    }

    /// Recurring templates.
    #[must_use]
    pub const fn recurring(&self) -> &RecurringRepository {
        &self.recurring
    }

    /// Payment application.
    #[must_use]
    pub const fn payments(&self) -> &PaymentRepository {
        &self.payments
    }

    /// Bank accounts, statement lines and reconciliations.
    #[must_use]
    pub const fn reconciliation(&self) -> &ReconciliationRepository {
        &self.reconciliation
    }

    /// Read-side reports.
    #[must_use]
    pub const fn reports(&self) -> &ReportRepository {
        &self.reports
    }
}
