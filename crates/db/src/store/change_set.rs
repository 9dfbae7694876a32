//! Staged writes committed atomically by a [`super::UnitOfWork`].

use std::fmt::Display;
use std::hash::Hash;

use tally_core::document::{Bill, Customer, Invoice, Vendor};
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

/// An entity stored with an optimistic-concurrency version.
pub trait Versioned: Clone + Send + Sync + 'static {
    /// Identifier type.
    type Id: Copy + Eq + Hash + Display + Send + Sync + 'static;

    /// Entity name used in conflict reports.
    const ENTITY: &'static str;

    /// Returns the entity ID.
    fn id(&self) -> Self::Id;

    /// Returns the stored version (0 = never stored).
    fn version(&self) -> i64;

    /// Overwrites the version.
    fn set_version(&mut self, version: i64);

    /// Wraps a staged value into a [`Change`].
    fn into_change(staged: Staged<Self>) -> Change;
}

/// One staged write, or a read guard when `value` is `None`.
#[derive(Debug, Clone)]
pub struct Staged<T: Versioned> {
    /// Entity ID.
    pub id: T::Id,
    /// Version the stored entity must still have (0 = must not exist).
    pub expected: i64,
    /// New value, already carrying `expected + 1`.
    pub value: Option<T>,
}

macro_rules! versioned {
    ($ty:ty, $id:ty, $name:literal, $variant:ident) => {
        impl Versioned for $ty {
            type Id = $id;

            const ENTITY: &'static str = $name;

            fn id(&self) -> Self::Id {
                self.id
            }

            fn version(&self) -> i64 {
                self.version
            }

            fn set_version(&mut self, version: i64) {
                self.version = version;
            }

            fn into_change(staged: Staged<Self>) -> Change {
                Change::$variant(staged)
            }
        }
    };
}

/// A staged change of any entity type.
#[derive(Debug, Clone)]
#[allow(missing_docs)]
pub enum Change {
    Account(Staged<Account>),
    FiscalYear(Staged<FiscalYear>),
    Fund(Staged<Fund>),
    Transaction(Staged<Transaction>),
    Vendor(Staged<Vendor>),
    Customer(Staged<Customer>),
    Bill(Staged<Bill>),
    Invoice(Staged<Invoice>),
    Payment(Staged<Payment>),
    Template(Staged<RecurringTemplate>),
    BankAccount(Staged<BankAccount>),
    BankTransaction(Staged<BankTransaction>),
    Reconciliation(Staged<BankReconciliation>),
}

versioned!(Account, AccountId, "account", Account);
versioned!(FiscalYear, FiscalYearId, "fiscal_year", FiscalYear);
versioned!(Fund, FundId, "fund", Fund);
versioned!(Transaction, TransactionId, "transaction", Transaction);
versioned!(Vendor, VendorId, "vendor", Vendor);
versioned!(Customer, CustomerId, "customer", Customer);
versioned!(Bill, BillId, "bill", Bill);
versioned!(Invoice, InvoiceId, "invoice", Invoice);
versioned!(Payment, PaymentId, "payment", Payment);
versioned!(RecurringTemplate, TemplateId, "recurring_template", Template);
versioned!(BankAccount, BankAccountId, "bank_account", BankAccount);
versioned!(BankTransaction, BankTransactionId, "bank_transaction", BankTransaction);
versioned!(BankReconciliation, ReconciliationId, "bank_reconciliation", Reconciliation);

/// Writes of one operation, applied all-or-nothing.
#[derive(Debug, Clone, Default)]
pub struct ChangeSet {
    changes: Vec<Change>,
}

impl ChangeSet {
    /// Creates an empty change set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stages `entity` for writing and bumps its in-memory version.
    ///
    /// After a successful commit the caller's copy matches the stored one.
    /// Stage each entity at most once per change set.
    pub fn put<T: Versioned>(&mut self, entity: &mut T) {
        let expected = entity.version();
        entity.set_version(expected + 1);
        self.changes.push(T::into_change(Staged {
            id: entity.id(),
            expected,
            value: Some(entity.clone()),
        }));
    }

    /// Requires `entity` to be unchanged at commit without writing it.
    pub fn guard<T: Versioned>(&mut self, entity: &T) {
        self.changes.push(T::into_change(Staged {
            id: entity.id(),
            expected: entity.version(),
            value: None,
        }));
    }

    /// Returns true if nothing is staged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Number of staged entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Staged entries in staging order.
    #[must_use]
    pub fn changes(&self) -> &[Change] {
        &self.changes
    }

    /// Consumes the set.
    #[must_use]
    pub fn into_changes(self) -> Vec<Change> {
        self.changes
    }
}
