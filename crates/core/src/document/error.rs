//! Bill and invoice errors.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tally_shared::ErrorKind;
use tally_shared::types::{CustomerId, VendorId};
use thiserror::Error;

use super::types::DocumentRef;
use crate::ledger::LedgerError;
use crate::workflow::WorkflowError;

/// Errors that can occur in the payable/receivable lifecycle.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// Vendor not found.
    #[error("Vendor not found: {0}")]
    VendorNotFound(VendorId),

    /// Customer not found.
    #[error("Customer not found: {0}")]
    CustomerNotFound(CustomerId),

    /// Vendor is inactive.
    #[error("Vendor {0} is inactive")]
    VendorInactive(VendorId),

    /// Customer is inactive.
    #[error("Customer {0} is inactive")]
    CustomerInactive(CustomerId),

    /// Document not found.
    #[error("Document not found: {0}")]
    DocumentNotFound(DocumentRef),

    /// A document needs at least one line.
    #[error("Document must have at least one line item")]
    NoLineItems,

    /// Quantity must be positive.
    #[error("Line {line} quantity must be positive")]
    InvalidQuantity {
        /// Zero-based line index.
        line: usize,
    },

    /// Unit price must be positive.
    #[error("Line {line} unit price must be positive")]
    InvalidUnitPrice {
        /// Zero-based line index.
        line: usize,
    },

    /// Line amount differs from quantity × unit price.
    #[error("Line {line} amount {actual} does not equal quantity × unit price {expected}")]
    LineAmountMismatch {
        /// Zero-based line index.
        line: usize,
        /// `quantity × unit_price`.
        expected: Decimal,
        /// Stated amount.
        actual: Decimal,
    },

    /// Due date precedes the document date.
    #[error("Due date {due_date} is before invoice date {invoice_date}")]
    DueBeforeInvoiceDate {
        /// Document date.
        invoice_date: NaiveDate,
        /// Rejected due date.
        due_date: NaiveDate,
    },

    /// Document number already used.
    #[error("Document number {0} already exists")]
    DuplicateDocumentNumber(String),

    /// Due-date arithmetic left the representable range.
    #[error("Due date out of range")]
    DateOutOfRange,

    /// A document with payments applied cannot be voided.
    #[error("Cannot void document with {amount_paid} already paid")]
    CannotVoidPaidDocument {
        /// Amount already paid.
        amount_paid: Decimal,
    },

    /// Underlying ledger validation failed.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Underlying lifecycle transition failed.
    #[error(transparent)]
    Workflow(#[from] WorkflowError),
}

impl DocumentError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::VendorNotFound(_) => "VENDOR_NOT_FOUND",
            Self::CustomerNotFound(_) => "CUSTOMER_NOT_FOUND",
            Self::VendorInactive(_) => "VENDOR_INACTIVE",
            Self::CustomerInactive(_) => "CUSTOMER_INACTIVE",
            Self::DocumentNotFound(_) => "DOCUMENT_NOT_FOUND",
            Self::NoLineItems => "NO_LINE_ITEMS",
            Self::InvalidQuantity { .. } => "INVALID_QUANTITY",
            Self::InvalidUnitPrice { .. } => "INVALID_UNIT_PRICE",
            Self::LineAmountMismatch { .. } => "LINE_AMOUNT_MISMATCH",
            Self::DueBeforeInvoiceDate { .. } => "DUE_BEFORE_INVOICE_DATE",
            Self::DuplicateDocumentNumber(_) => "DUPLICATE_DOCUMENT_NUMBER",
            Self::DateOutOfRange => "DATE_OUT_OF_RANGE",
            Self::CannotVoidPaidDocument { .. } => "CANNOT_VOID_PAID_DOCUMENT",
            Self::Ledger(e) => e.error_code(),
            Self::Workflow(e) => e.error_code(),
        }
    }

    /// Returns the taxonomy kind of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::VendorNotFound(_) | Self::CustomerNotFound(_) | Self::DocumentNotFound(_) => {
                ErrorKind::NotFound
            }
            Self::CannotVoidPaidDocument { .. } => ErrorKind::StateConflict,
            Self::VendorInactive(_)
            | Self::CustomerInactive(_)
            | Self::NoLineItems
            | Self::InvalidQuantity { .. }
            | Self::InvalidUnitPrice { .. }
            | Self::LineAmountMismatch { .. }
            | Self::DueBeforeInvoiceDate { .. }
            | Self::DuplicateDocumentNumber(_)
            | Self::DateOutOfRange => ErrorKind::Validation,
            Self::Ledger(e) => e.kind(),
            Self::Workflow(e) => e.kind(),
        }
    }
}
