//! Payable and receivable documents.
//!
//! Bills and invoices wrap a ledger transaction; their approval and posting
//! lifecycle is the transaction's, while payment status is tracked on the
//! document itself.

pub mod error;
pub mod service;
pub mod terms;
pub mod types;

pub use error::DocumentError;
pub use service::DocumentService;
pub use terms::{days_from_terms, parse_payment_terms};
pub use types::{
    Bill, Counterparty, CreateBillInput, CreateInvoiceInput, Customer, DocumentHeader, DocumentKind,
    DocumentPaymentStatus, DocumentRef, Invoice, LineItem, LineItemInput, Vendor,
};
