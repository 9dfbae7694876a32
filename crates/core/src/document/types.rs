//! Bill, invoice and counterparty types.
//!
//! Bills and invoices compose a ledger [`Transaction`] with the
//! payable/receivable fields in a shared [`DocumentHeader`].

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use tally_shared::types::{
    AccountId, BillId, CustomerId, FundId, InvoiceId, LineItemId, UserId, VendorId,
};

use crate::ledger::Transaction;
use crate::workflow::TransactionStatus;

/// Which side of the books a document sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentKind {
    /// Vendor bills.
    Payable,
    /// Customer invoices.
    Receivable,
}

/// Reference to a payable or receivable document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentRef {
    /// A vendor bill.
    Bill(BillId),
    /// A customer invoice.
    Invoice(InvoiceId),
}

impl DocumentRef {
    /// Returns the document kind.
    #[must_use]
    pub const fn kind(self) -> DocumentKind {
        match self {
            Self::Bill(_) => DocumentKind::Payable,
            Self::Invoice(_) => DocumentKind::Receivable,
        }
    }
}

impl fmt::Display for DocumentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bill(id) => write!(f, "bill {id}"),
            Self::Invoice(id) => write!(f, "invoice {id}"),
        }
    }
}

/// The vendor or customer on the other side of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Counterparty {
    /// A vendor; documents are bills.
    Vendor(VendorId),
    /// A customer; documents are invoices.
    Customer(CustomerId),
}

/// Payment status of a bill or invoice, derived from its applied payments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentPaymentStatus {
    /// No payment applied.
    Unpaid,
    /// Some but not all of the amount due has been paid.
    PartiallyPaid,
    /// Paid in full.
    Paid,
    /// The document was voided.
    Voided,
}

impl DocumentPaymentStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unpaid => "UNPAID",
            Self::PartiallyPaid => "PARTIALLY_PAID",
            Self::Paid => "PAID",
            Self::Voided => "VOIDED",
        }
    }

    /// Returns true if the document still carries an open balance.
    #[must_use]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Unpaid | Self::PartiallyPaid)
    }
}

impl fmt::Display for DocumentPaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A document line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Unique identifier.
    pub id: LineItemId,
    /// What was bought or sold.
    pub description: String,
    /// Quantity.
    pub quantity: Decimal,
    /// Price per unit.
    pub unit_price: Decimal,
    /// `quantity × unit_price`.
    pub amount: Decimal,
    /// Expense (bill) or revenue (invoice) account.
    pub account_id: AccountId,
    /// Optional fund carried onto the line's ledger entry.
    pub fund_id: Option<FundId>,
    /// Free-form reporting category.
    pub category: Option<String>,
    /// Taxable flag (informational; tax computation is out of scope).
    pub taxable: bool,
}

/// Input for a document line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItemInput {
    /// What was bought or sold.
    pub description: String,
    /// Quantity (positive).
    pub quantity: Decimal,
    /// Price per unit (positive).
    pub unit_price: Decimal,
    /// Stated line amount; must equal `quantity × unit_price`.
    pub amount: Decimal,
    /// Expense (bill) or revenue (invoice) account.
    pub account_id: AccountId,
    /// Optional fund tag.
    pub fund_id: Option<FundId>,
    /// Reporting category.
    pub category: Option<String>,
    /// Taxable flag.
    pub taxable: bool,
}

impl LineItemInput {
    /// Convenience constructor computing the amount.
    #[must_use]
    pub fn new(
        description: impl Into<String>,
        quantity: Decimal,
        unit_price: Decimal,
        account_id: AccountId,
    ) -> Self {
        Self {
            description: description.into(),
            quantity,
            unit_price,
            amount: quantity * unit_price,
            account_id,
            fund_id: None,
            category: None,
            taxable: false,
        }
    }

    /// Tags the line with a fund.
    #[must_use]
    pub fn with_fund(mut self, fund_id: FundId) -> Self {
        self.fund_id = Some(fund_id);
        self
    }
}

/// Payable/receivable fields shared by bills and invoices.
///
/// Invariant: `0 <= amount_paid <= amount_due`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentHeader {
    /// Document number (vendor's bill number or our invoice number).
    pub number: String,
    /// Document date.
    pub invoice_date: NaiveDate,
    /// Payment due date.
    pub due_date: NaiveDate,
    /// Line subtotal.
    pub amount_due: Decimal,
    /// Sum of applied payments.
    pub amount_paid: Decimal,
    /// Derived payment status.
    pub payment_status: DocumentPaymentStatus,
    /// AP (bill) or AR (invoice) control account.
    pub control_account_id: AccountId,
    /// Lines, summing to `amount_due`.
    pub line_items: Vec<LineItem>,
}

impl DocumentHeader {
    /// Amount still owed.
    #[must_use]
    pub fn outstanding(&self) -> Decimal {
        self.amount_due - self.amount_paid
    }
}

/// Accounts-payable bill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bill {
    /// Unique identifier.
    pub id: BillId,
    /// The vendor billing us.
    pub vendor_id: VendorId,
    /// Payable fields.
    pub header: DocumentHeader,
    /// Underlying ledger transaction.
    pub transaction: Transaction,
    /// Store version for optimistic concurrency (0 = not yet stored).
    pub version: i64,
}

/// Accounts-receivable invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    /// Unique identifier.
    pub id: InvoiceId,
    /// The customer being invoiced.
    pub customer_id: CustomerId,
    /// Receivable fields.
    pub header: DocumentHeader,
    /// Underlying ledger transaction.
    pub transaction: Transaction,
    /// Store version for optimistic concurrency (0 = not yet stored).
    pub version: i64,
}

impl Bill {
    /// Lifecycle status of the underlying transaction.
    #[must_use]
    pub fn status(&self) -> TransactionStatus {
        self.transaction.status
    }

    /// Reference to this bill.
    #[must_use]
    pub const fn reference(&self) -> DocumentRef {
        DocumentRef::Bill(self.id)
    }

    /// The vendor as a counterparty.
    #[must_use]
    pub const fn counterparty(&self) -> Counterparty {
        Counterparty::Vendor(self.vendor_id)
    }
}

impl Invoice {
    /// Lifecycle status of the underlying transaction.
    #[must_use]
    pub fn status(&self) -> TransactionStatus {
        self.transaction.status
    }

    /// Reference to this invoice.
    #[must_use]
    pub const fn reference(&self) -> DocumentRef {
        DocumentRef::Invoice(self.id)
    }

    /// The customer as a counterparty.
    #[must_use]
    pub const fn counterparty(&self) -> Counterparty {
        Counterparty::Customer(self.customer_id)
    }
}

/// A supplier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vendor {
    /// Unique identifier.
    pub id: VendorId,
    /// Display name.
    pub name: String,
    /// Payment terms text, e.g. "Net 30".
    pub payment_terms: Option<String>,
    /// Inactive vendors cannot receive new bills.
    pub is_active: bool,
    /// Year-to-date payments applied to this vendor's bills.
    pub ytd_payments: Decimal,
    /// Store version for optimistic concurrency (0 = not yet stored).
    pub version: i64,
}

/// A customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    /// Unique identifier.
    pub id: CustomerId,
    /// Display name.
    pub name: String,
    /// Payment terms text, e.g. "Due on receipt".
    pub payment_terms: Option<String>,
    /// Inactive customers cannot receive new invoices.
    pub is_active: bool,
    /// Year-to-date receipts applied to this customer's invoices.
    pub ytd_receipts: Decimal,
    /// Store version for optimistic concurrency (0 = not yet stored).
    pub version: i64,
}

impl Vendor {
    /// Creates an active vendor.
    #[must_use]
    pub fn new(name: impl Into<String>, payment_terms: Option<String>) -> Self {
        Self {
            id: VendorId::new(),
            name: name.into(),
            payment_terms,
            is_active: true,
            ytd_payments: Decimal::ZERO,
            version: 0,
        }
    }
}

impl Customer {
    /// Creates an active customer.
    #[must_use]
    pub fn new(name: impl Into<String>, payment_terms: Option<String>) -> Self {
        Self {
            id: CustomerId::new(),
            name: name.into(),
            payment_terms,
            is_active: true,
            ytd_receipts: Decimal::ZERO,
            version: 0,
        }
    }
}

/// Input for creating a bill.
#[derive(Debug, Clone)]
pub struct CreateBillInput {
    /// The vendor.
    pub vendor_id: VendorId,
    /// The vendor's bill number.
    pub number: String,
    /// Bill date.
    pub invoice_date: NaiveDate,
    /// Explicit due date; derived from the vendor's terms when absent.
    pub due_date: Option<NaiveDate>,
    /// Description for the underlying transaction.
    pub description: String,
    /// AP control account credited for the total.
    pub ap_account_id: AccountId,
    /// Lines.
    pub line_items: Vec<LineItemInput>,
    /// The user entering the bill.
    pub created_by: UserId,
}

/// Input for creating an invoice.
#[derive(Debug, Clone)]
pub struct CreateInvoiceInput {
    /// The customer.
    pub customer_id: CustomerId,
    /// Invoice number.
    pub number: String,
    /// Invoice date.
    pub invoice_date: NaiveDate,
    /// Explicit due date; derived from the customer's terms when absent.
    pub due_date: Option<NaiveDate>,
    /// Description for the underlying transaction.
    pub description: String,
    /// AR control account debited for the total.
    pub ar_account_id: AccountId,
    /// Lines.
    pub line_items: Vec<LineItemInput>,
    /// The user entering the invoice.
    pub created_by: UserId,
}
