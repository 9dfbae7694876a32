//! In-memory reference store.
//!
//! All tables sit behind one `RwLock`; a commit validates every staged
//! version and uniqueness constraint under the write lock before applying
//! anything, so a rejected commit leaves every table untouched.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use async_trait::async_trait;
use tokio::sync::RwLock;

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

use super::change_set::{Change, ChangeSet, Staged, Versioned};
use super::{
    AccountStore, BankStore, CounterpartyStore, DocumentStore, FiscalStore, FundStore,
    PaymentStore, TemplateStore, TransactionStore, UnitOfWork,
};
use crate::error::StoreError;

#[derive(Debug, Default)]
struct Tables {
    accounts: HashMap<AccountId, Account>,
    fiscal_years: HashMap<FiscalYearId, FiscalYear>,
    funds: HashMap<FundId, Fund>,
    transactions: HashMap<TransactionId, Transaction>,
    vendors: HashMap<VendorId, Vendor>,
    customers: HashMap<CustomerId, Customer>,
    bills: HashMap<BillId, Bill>,
    invoices: HashMap<InvoiceId, Invoice>,
    payments: HashMap<PaymentId, Payment>,
    templates: HashMap<TemplateId, RecurringTemplate>,
    bank_accounts: HashMap<BankAccountId, BankAccount>,
    bank_transactions: HashMap<BankTransactionId, BankTransaction>,
    reconciliations: HashMap<ReconciliationId, BankReconciliation>,
    sequences: HashMap<String, u64>,
}

fn check<T: Versioned>(table: &HashMap<T::Id, T>, staged: &Staged<T>) -> Result<(), StoreError> {
    let current = table.get(&staged.id).map(Versioned::version);
    let fresh = match current {
        Some(version) => version == staged.expected,
        None => staged.expected == 0,
    };
    if fresh {
        Ok(())
    } else {
        Err(StoreError::VersionConflict {
            entity: T::ENTITY,
            id: staged.id.to_string(),
            expected: staged.expected,
        })
    }
}

fn apply<T: Versioned>(table: &mut HashMap<T::Id, T>, staged: Staged<T>) {
    if let Some(value) = staged.value {
        table.insert(staged.id, value);
    }
}

/// Checks that the post-commit state keeps `key` unique.
fn ensure_unique<Id>(
    constraint: &'static str,
    existing: impl Iterator<Item = (Id, String)>,
    staged: Vec<(Id, String)>,
) -> Result<(), StoreError>
where
    Id: Copy + Eq + Hash,
{
    if staged.is_empty() {
        return Ok(());
    }
    let restaged: HashSet<Id> = staged.iter().map(|(id, _)| *id).collect();
    let mut owners: HashMap<String, Id> = existing
        .filter(|(id, _)| !restaged.contains(id))
        .map(|(id, key)| (key, id))
        .collect();

    for (id, key) in staged {
        if let Some(owner) = owners.insert(key.clone(), id)
            && owner != id
        {
            return Err(StoreError::UniqueViolation {
                constraint,
                value: key,
            });
        }
    }
    Ok(())
}

fn bill_key(bill: &Bill) -> String {
    format!("{}/{}", bill.vendor_id, bill.header.number)
}

impl Tables {
    fn check(&self, change: &Change) -> Result<(), StoreError> {
        match change {
            Change::Account(s) => check(&self.accounts, s),
            Change::FiscalYear(s) => check(&self.fiscal_years, s),
            Change::Fund(s) => check(&self.funds, s),
            Change::Transaction(s) => check(&self.transactions, s),
            Change::Vendor(s) => check(&self.vendors, s),
            Change::Customer(s) => check(&self.customers, s),
            Change::Bill(s) => check(&self.bills, s),
            Change::Invoice(s) => check(&self.invoices, s),
            Change::Payment(s) => check(&self.payments, s),
            Change::Template(s) => check(&self.templates, s),
            Change::BankAccount(s) => check(&self.bank_accounts, s),
            Change::BankTransaction(s) => check(&self.bank_transactions, s),
            Change::Reconciliation(s) => check(&self.reconciliations, s),
        }
    }

    fn check_unique(&self, changes: &[Change]) -> Result<(), StoreError> {
        let mut account_numbers = Vec::new();
        let mut bill_numbers = Vec::new();
        let mut invoice_numbers = Vec::new();

        for change in changes {
            match change {
                Change::Account(Staged { value: Some(a), .. }) => {
                    account_numbers.push((a.id, a.number.clone()));
                }
                Change::Bill(Staged { value: Some(b), .. }) => {
                    bill_numbers.push((b.id, bill_key(b)));
                }
                Change::Invoice(Staged { value: Some(i), .. }) => {
                    invoice_numbers.push((i.id, i.header.number.clone()));
                }
                _ => {}
            }
        }

        ensure_unique(
            "accounts.number",
            self.accounts.values().map(|a| (a.id, a.number.clone())),
            account_numbers,
        )?;
        ensure_unique(
            "bills.vendor_number",
            self.bills.values().map(|b| (b.id, bill_key(b))),
            bill_numbers,
        )?;
        ensure_unique(
            "invoices.number",
            self.invoices.values().map(|i| (i.id, i.header.number.clone())),
            invoice_numbers,
        )
    }

    fn apply(&mut self, change: Change) {
        match change {
            Change::Account(s) => apply(&mut self.accounts, s),
            Change::FiscalYear(s) => apply(&mut self.fiscal_years, s),
            Change::Fund(s) => apply(&mut self.funds, s),
            Change::Transaction(s) => apply(&mut self.transactions, s),
            Change::Vendor(s) => apply(&mut self.vendors, s),
            Change::Customer(s) => apply(&mut self.customers, s),
            Change::Bill(s) => apply(&mut self.bills, s),
            Change::Invoice(s) => apply(&mut self.invoices, s),
            Change::Payment(s) => apply(&mut self.payments, s),
            Change::Template(s) => apply(&mut self.templates, s),
            Change::BankAccount(s) => apply(&mut self.bank_accounts, s),
            Change::BankTransaction(s) => apply(&mut self.bank_transactions, s),
            Change::Reconciliation(s) => apply(&mut self.reconciliations, s),
        }
    }
}

fn sorted_by_id<T: Versioned>(table: &HashMap<T::Id, T>) -> Vec<T>
where
    T::Id: Ord,
{
    let mut values: Vec<T> = table.values().cloned().collect();
    values.sort_by_key(|v| v.id());
    values
}

/// Store keeping every table in process memory.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountStore for InMemoryStore {
    async fn get_account(&self, id: AccountId) -> Result<Option<Account>, StoreError> {
        Ok(self.tables.read().await.accounts.get(&id).cloned())
    }

    async fn list_accounts(&self) -> Result<Vec<Account>, StoreError> {
        let tables = self.tables.read().await;
        let mut accounts: Vec<Account> = tables.accounts.values().cloned().collect();
        accounts.sort_by(|a, b| a.number.cmp(&b.number));
        Ok(accounts)
    }
}

#[async_trait]
impl FiscalStore for InMemoryStore {
    async fn get_fiscal_year(&self, id: FiscalYearId) -> Result<Option<FiscalYear>, StoreError> {
        Ok(self.tables.read().await.fiscal_years.get(&id).cloned())
    }

    async fn list_fiscal_years(&self) -> Result<Vec<FiscalYear>, StoreError> {
        let tables = self.tables.read().await;
        let mut years: Vec<FiscalYear> = tables.fiscal_years.values().cloned().collect();
        years.sort_by_key(|y| y.start_date);
        Ok(years)
    }
}

#[async_trait]
impl FundStore for InMemoryStore {
    async fn get_fund(&self, id: FundId) -> Result<Option<Fund>, StoreError> {
        Ok(self.tables.read().await.funds.get(&id).cloned())
    }

    async fn list_funds(&self) -> Result<Vec<Fund>, StoreError> {
        Ok(sorted_by_id(&self.tables.read().await.funds))
    }
}

#[async_trait]
impl TransactionStore for InMemoryStore {
    async fn get_transaction(&self, id: TransactionId) -> Result<Option<Transaction>, StoreError> {
        Ok(self.tables.read().await.transactions.get(&id).cloned())
    }

    async fn list_transactions(&self) -> Result<Vec<Transaction>, StoreError> {
        let tables = self.tables.read().await;
        let mut transactions: Vec<Transaction> = tables.transactions.values().cloned().collect();
        transactions.sort_by_key(|t| (t.date, t.id));
        Ok(transactions)
    }
}

#[async_trait]
impl CounterpartyStore for InMemoryStore {
    async fn get_vendor(&self, id: VendorId) -> Result<Option<Vendor>, StoreError> {
        Ok(self.tables.read().await.vendors.get(&id).cloned())
    }

    async fn get_customer(&self, id: CustomerId) -> Result<Option<Customer>, StoreError> {
        Ok(self.tables.read().await.customers.get(&id).cloned())
    }

    async fn list_vendors(&self) -> Result<Vec<Vendor>, StoreError> {
        Ok(sorted_by_id(&self.tables.read().await.vendors))
    }

    async fn list_customers(&self) -> Result<Vec<Customer>, StoreError> {
        Ok(sorted_by_id(&self.tables.read().await.customers))
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn get_bill(&self, id: BillId) -> Result<Option<Bill>, StoreError> {
        Ok(self.tables.read().await.bills.get(&id).cloned())
    }

    async fn get_invoice(&self, id: InvoiceId) -> Result<Option<Invoice>, StoreError> {
        Ok(self.tables.read().await.invoices.get(&id).cloned())
    }

    async fn list_bills(&self) -> Result<Vec<Bill>, StoreError> {
        Ok(sorted_by_id(&self.tables.read().await.bills))
    }

    async fn list_invoices(&self) -> Result<Vec<Invoice>, StoreError> {
        Ok(sorted_by_id(&self.tables.read().await.invoices))
    }

    async fn find_document_by_transaction(
        &self,
        transaction_id: TransactionId,
    ) -> Result<Option<DocumentRef>, StoreError> {
        let tables = self.tables.read().await;
        let bill = tables
            .bills
            .values()
            .find(|b| b.transaction.id == transaction_id)
            .map(Bill::reference);
        Ok(bill.or_else(|| {
            tables
                .invoices
                .values()
                .find(|i| i.transaction.id == transaction_id)
                .map(Invoice::reference)
        }))
    }
}

#[async_trait]
impl PaymentStore for InMemoryStore {
    async fn get_payment(&self, id: PaymentId) -> Result<Option<Payment>, StoreError> {
        Ok(self.tables.read().await.payments.get(&id).cloned())
    }

    async fn list_payments(&self, document: DocumentRef) -> Result<Vec<Payment>, StoreError> {
        let tables = self.tables.read().await;
        let mut payments: Vec<Payment> = tables
            .payments
            .values()
            .filter(|p| p.document == document)
            .cloned()
            .collect();
        payments.sort_by_key(|p| p.id);
        Ok(payments)
    }

    async fn find_payment_by_transaction(
        &self,
        transaction_id: TransactionId,
    ) -> Result<Option<Payment>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .payments
            .values()
            .find(|p| p.transaction_id == Some(transaction_id))
            .cloned())
    }
}

#[async_trait]
impl TemplateStore for InMemoryStore {
    async fn get_template(&self, id: TemplateId) -> Result<Option<RecurringTemplate>, StoreError> {
        Ok(self.tables.read().await.templates.get(&id).cloned())
    }

    async fn list_templates(&self) -> Result<Vec<RecurringTemplate>, StoreError> {
        Ok(sorted_by_id(&self.tables.read().await.templates))
    }
}

#[async_trait]
impl BankStore for InMemoryStore {
    async fn get_bank_account(&self, id: BankAccountId) -> Result<Option<BankAccount>, StoreError> {
        Ok(self.tables.read().await.bank_accounts.get(&id).cloned())
    }

    async fn list_bank_accounts(&self) -> Result<Vec<BankAccount>, StoreError> {
        Ok(sorted_by_id(&self.tables.read().await.bank_accounts))
    }

    async fn get_bank_transaction(
        &self,
        id: BankTransactionId,
    ) -> Result<Option<BankTransaction>, StoreError> {
        Ok(self.tables.read().await.bank_transactions.get(&id).cloned())
    }

    async fn list_bank_transactions(
        &self,
        bank_account_id: BankAccountId,
    ) -> Result<Vec<BankTransaction>, StoreError> {
        let tables = self.tables.read().await;
        let mut lines: Vec<BankTransaction> = tables
            .bank_transactions
            .values()
            .filter(|l| l.bank_account_id == bank_account_id)
            .cloned()
            .collect();
        lines.sort_by_key(|l| (l.date, l.id));
        Ok(lines)
    }

    async fn get_reconciliation(
        &self,
        id: ReconciliationId,
    ) -> Result<Option<BankReconciliation>, StoreError> {
        Ok(self.tables.read().await.reconciliations.get(&id).cloned())
    }

    async fn list_reconciliations(
        &self,
        bank_account_id: BankAccountId,
    ) -> Result<Vec<BankReconciliation>, StoreError> {
        let tables = self.tables.read().await;
        let mut reconciliations: Vec<BankReconciliation> = tables
            .reconciliations
            .values()
            .filter(|r| r.bank_account_id == bank_account_id)
            .cloned()
            .collect();
        reconciliations.sort_by_key(|r| (r.period_start, r.id));
        Ok(reconciliations)
    }
}

#[async_trait]
impl UnitOfWork for InMemoryStore {
    async fn commit(&self, changes: ChangeSet) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        let changes = changes.into_changes();

        for change in &changes {
            tables.check(change)?;
        }
        tables.check_unique(&changes)?;

        for change in changes {
            tables.apply(change);
        }
        Ok(())
    }

    async fn next_sequence(&self, name: &str) -> Result<u64, StoreError> {
        let mut tables = self.tables.write().await;
        let next = tables.sequences.entry(name.to_string()).or_insert(0);
        *next += 1;
        Ok(*next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_core::ledger::AccountType;

    fn cash() -> Account {
        Account::new("1000", "Cash", AccountType::Asset, None)
    }

    #[tokio::test]
    async fn test_commit_inserts_and_bumps_version() {
        let store = InMemoryStore::new();
        let mut account = cash();
        let mut changes = ChangeSet::new();
        changes.put(&mut account);
        store.commit(changes).await.unwrap();

        let stored = store.get_account(account.id).await.unwrap().unwrap();
        assert_eq!(stored.version, 1);
        assert_eq!(stored, account);
    }

    #[tokio::test]
    async fn test_stale_version_is_rejected() {
        let store = InMemoryStore::new();
        let mut account = cash();
        let mut changes = ChangeSet::new();
        changes.put(&mut account);
        store.commit(changes).await.unwrap();

        let mut first = account.clone();
        let mut second = account.clone();
        first.name = "Operating cash".into();
        second.name = "Petty cash".into();

        let mut changes = ChangeSet::new();
        changes.put(&mut first);
        store.commit(changes).await.unwrap();

        let mut changes = ChangeSet::new();
        changes.put(&mut second);
        let err = store.commit(changes).await.unwrap_err();
        assert!(matches!(err, StoreError::VersionConflict { entity: "account", expected: 1, .. }));

        let stored = store.get_account(account.id).await.unwrap().unwrap();
        assert_eq!(stored.name, "Operating cash");
    }

    #[tokio::test]
    async fn test_duplicate_insert_is_rejected() {
        let store = InMemoryStore::new();
        let mut account = cash();
        let mut again = account.clone();

        let mut changes = ChangeSet::new();
        changes.put(&mut account);
        store.commit(changes).await.unwrap();

        let mut changes = ChangeSet::new();
        changes.put(&mut again);
        assert!(store.commit(changes).await.is_err());
    }

    #[tokio::test]
    async fn test_unique_account_number() {
        let store = InMemoryStore::new();
        let mut a = cash();
        let mut b = Account::new("1000", "Other cash", AccountType::Asset, None);

        let mut changes = ChangeSet::new();
        changes.put(&mut a);
        store.commit(changes).await.unwrap();

        let mut changes = ChangeSet::new();
        changes.put(&mut b);
        let err = store.commit(changes).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::UniqueViolation { constraint: "accounts.number", .. }
        ));
        assert!(store.get_account(b.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_renumbering_frees_the_old_number() {
        let store = InMemoryStore::new();
        let mut a = cash();
        let mut changes = ChangeSet::new();
        changes.put(&mut a);
        store.commit(changes).await.unwrap();

        a.number = "1001".into();
        let mut b = Account::new("1000", "New cash", AccountType::Asset, None);
        let mut changes = ChangeSet::new();
        changes.put(&mut a);
        changes.put(&mut b);
        store.commit(changes).await.unwrap();

        assert_eq!(store.list_accounts().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_guard_detects_concurrent_change() {
        let store = InMemoryStore::new();
        let mut account = cash();
        let mut changes = ChangeSet::new();
        changes.put(&mut account);
        store.commit(changes).await.unwrap();

        let observed = account.clone();
        account.is_active = false;
        let mut changes = ChangeSet::new();
        changes.put(&mut account);
        store.commit(changes).await.unwrap();

        let mut other = Account::new("2000", "Payables", AccountType::Liability, None);
        let mut changes = ChangeSet::new();
        changes.put(&mut other);
        changes.guard(&observed);
        assert!(store.commit(changes).await.is_err());
        assert!(store.get_account(other.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_sequences_are_independent() {
        let store = InMemoryStore::new();
        assert_eq!(store.next_sequence("a").await.unwrap(), 1);
        assert_eq!(store.next_sequence("a").await.unwrap(), 2);
        assert_eq!(store.next_sequence("b").await.unwrap(), 1);
    }
}
