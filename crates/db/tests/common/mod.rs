//! Shared fixture for engine integration tests.

#![allow(dead_code)]

use chrono::NaiveDate;
use rust_decimal::Decimal;

use tally_core::document::{
    Bill, CreateBillInput, CreateInvoiceInput, DocumentRef, Invoice, LineItemInput,
};
use tally_core::ledger::{
    Account, AccountType, CreateTransactionInput, EntryInput, Transaction, TransactionType,
};
use tally_core::payment::{CreatePaymentInput, PaymentMethod};
use tally_db::{Engine, EngineSettings};
use tally_shared::types::{AccountId, CustomerId, UserId, VendorId};

pub fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

/// Engine over a fresh in-memory store with a small chart of accounts.
pub struct Fixture {
    pub engine: Engine,
    pub user: UserId,
    pub cash: Account,
    pub receivable: Account,
    pub payable: Account,
    pub net_assets: Account,
    pub revenue: Account,
    pub expense: Account,
    pub transfer_out: Account,
    pub transfer_in: Account,
    pub vendor: VendorId,
    pub customer: CustomerId,
}

impl Fixture {
    pub async fn new() -> Self {
        let engine = Engine::in_memory(EngineSettings::default());
        let accounts = engine.accounts();

        let cash = accounts.create_account("1000", "Cash", AccountType::Asset, None).await.unwrap();
        let receivable = accounts
            .create_account("1200", "Accounts Receivable", AccountType::Asset, None)
            .await
            .unwrap();
        let payable = accounts
            .create_account("2000", "Accounts Payable", AccountType::Liability, None)
            .await
            .unwrap();
        let net_assets = accounts
            .create_account("3000", "Net Assets", AccountType::Equity, None)
            .await
            .unwrap();
        let revenue = accounts
            .create_account("4000", "Tuition Revenue", AccountType::Revenue, None)
            .await
            .unwrap();
        let expense = accounts
            .create_account("5000", "Supplies", AccountType::Expense, None)
            .await
            .unwrap();
        let transfer_out = accounts
            .create_account("3900", "Transfers Out", AccountType::Equity, None)
            .await
            .unwrap();
        let transfer_in = accounts
            .create_account("3910", "Transfers In", AccountType::Equity, None)
            .await
            .unwrap();

        let vendor = engine
            .documents()
            .create_vendor("Office Depot", Some("Net 30".into()))
            .await
            .unwrap()
            .id;
        let customer = engine.documents().create_customer("Jane Parent", None).await.unwrap().id;

        Self {
            engine,
            user: UserId::new(),
            cash,
            receivable,
            payable,
            net_assets,
            revenue,
            expense,
            transfer_out,
            transfer_in,
            vendor,
            customer,
        }
    }

    pub fn journal(&self, date: NaiveDate, entries: Vec<EntryInput>) -> CreateTransactionInput {
        CreateTransactionInput {
            transaction_type: TransactionType::JournalEntry,
            date,
            description: "Journal entry".into(),
            reference: None,
            entries,
            created_by: self.user,
        }
    }

    /// Creates, approves and posts a journal entry.
    pub async fn post_journal(&self, date: NaiveDate, entries: Vec<EntryInput>) -> Transaction {
        let txns = self.engine.transactions();
        let draft = txns.create_transaction(self.journal(date, entries)).await.unwrap();
        txns.approve(draft.id, self.user, None).await.unwrap();
        txns.post(draft.id, self.user).await.unwrap()
    }

    /// Posts a cash movement against net assets; positive amounts are deposits.
    pub async fn post_cash(&self, date: NaiveDate, amount: Decimal) -> Transaction {
        let entries = if amount >= Decimal::ZERO {
            vec![
                EntryInput::debit(self.cash.id, amount),
                EntryInput::credit(self.net_assets.id, amount),
            ]
        } else {
            vec![
                EntryInput::debit(self.expense.id, -amount),
                EntryInput::credit(self.cash.id, -amount),
            ]
        };
        self.post_journal(date, entries).await
    }

    pub fn bill_input(
        &self,
        number: &str,
        invoice_date: NaiveDate,
        due_date: Option<NaiveDate>,
        amount: Decimal,
    ) -> CreateBillInput {
        CreateBillInput {
            vendor_id: self.vendor,
            number: number.into(),
            invoice_date,
            due_date,
            description: format!("Bill {number}"),
            ap_account_id: self.payable.id,
            line_items: vec![LineItemInput::new("Supplies", Decimal::ONE, amount, self.expense.id)],
            created_by: self.user,
        }
    }

    pub fn invoice_input(
        &self,
        number: &str,
        invoice_date: NaiveDate,
        due_date: Option<NaiveDate>,
        amount: Decimal,
    ) -> CreateInvoiceInput {
        CreateInvoiceInput {
            customer_id: self.customer,
            number: number.into(),
            invoice_date,
            due_date,
            description: format!("Invoice {number}"),
            ar_account_id: self.receivable.id,
            line_items: vec![LineItemInput::new("Tuition", Decimal::ONE, amount, self.revenue.id)],
            created_by: self.user,
        }
    }

    /// Creates a bill and takes it through approval to POSTED.
    pub async fn posted_bill(
        &self,
        number: &str,
        invoice_date: NaiveDate,
        due_date: Option<NaiveDate>,
        amount: Decimal,
    ) -> Bill {
        let docs = self.engine.documents();
        let bill = docs
            .create_bill(self.bill_input(number, invoice_date, due_date, amount))
            .await
            .unwrap();
        let reference = DocumentRef::Bill(bill.id);
        docs.submit_document(reference, self.user).await.unwrap();
        docs.approve_document(reference, self.user, None).await.unwrap();
        docs.post_document(reference, self.user).await.unwrap();
        docs.get_bill(bill.id).await.unwrap()
    }

    /// Creates an invoice and posts it.
    pub async fn posted_invoice(
        &self,
        number: &str,
        invoice_date: NaiveDate,
        due_date: Option<NaiveDate>,
        amount: Decimal,
    ) -> Invoice {
        let docs = self.engine.documents();
        let invoice = docs
            .create_invoice(self.invoice_input(number, invoice_date, due_date, amount))
            .await
            .unwrap();
        let reference = DocumentRef::Invoice(invoice.id);
        docs.approve_document(reference, self.user, None).await.unwrap();
        docs.post_document(reference, self.user).await.unwrap();
        docs.get_invoice(invoice.id).await.unwrap()
    }

    pub fn payment(
        &self,
        document: DocumentRef,
        amount: Decimal,
        cash_account_id: Option<AccountId>,
    ) -> CreatePaymentInput {
        CreatePaymentInput {
            document,
            amount,
            payment_date: d(2026, 2, 1),
            method: PaymentMethod::Check,
            reference: None,
            memo: None,
            cash_account_id,
            created_by: self.user,
        }
    }
}
