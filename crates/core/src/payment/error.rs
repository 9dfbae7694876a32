//! Payment errors.

use rust_decimal::Decimal;
use tally_shared::ErrorKind;
use tally_shared::types::{PaymentId, TransactionId};
use thiserror::Error;

use super::types::PaymentStatus;
use crate::document::DocumentRef;
use crate::ledger::LedgerError;
use crate::workflow::TransactionStatus;

/// Errors that can occur while applying payments.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// Payment not found.
    #[error("Payment not found: {0}")]
    PaymentNotFound(PaymentId),

    /// The target bill or invoice does not exist.
    #[error("Document not found: {0}")]
    DocumentNotFound(DocumentRef),

    /// Amount must be positive.
    #[error("Payment amount must be positive, got {0}")]
    InvalidAmount(Decimal),

    /// Only posted documents accept payments.
    #[error("{document} is {status} and cannot accept payments")]
    DocumentNotPayable {
        /// The document.
        document: DocumentRef,
        /// Its current lifecycle status.
        status: TransactionStatus,
    },

    /// The payment would exceed the amount due.
    #[error("Payment of {attempted} exceeds remaining balance (due {amount_due}, paid {amount_paid})")]
    Overpayment {
        /// Document amount due.
        amount_due: Decimal,
        /// Amount already paid.
        amount_paid: Decimal,
        /// Rejected payment amount.
        attempted: Decimal,
    },

    /// Illegal payment status transition.
    #[error("Invalid payment status transition from {from} to {to}")]
    InvalidTransition {
        /// The current status.
        from: PaymentStatus,
        /// The attempted target status.
        to: PaymentStatus,
    },

    /// A settlement transaction is voided through its payment only.
    #[error("Transaction {transaction_id} settles payment {payment_id}; void the payment instead")]
    SettlementOwnedByPayment {
        /// The settlement transaction.
        transaction_id: TransactionId,
        /// The payment that owns it.
        payment_id: PaymentId,
    },

    /// Void or failure reason is required.
    #[error("A reason is required")]
    ReasonRequired,

    /// Settlement transaction could not be built.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl PaymentError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::PaymentNotFound(_) => "PAYMENT_NOT_FOUND",
            Self::DocumentNotFound(_) => "DOCUMENT_NOT_FOUND",
            Self::InvalidAmount(_) => "INVALID_AMOUNT",
            Self::DocumentNotPayable { .. } => "DOCUMENT_NOT_PAYABLE",
            Self::Overpayment { .. } => "OVERPAYMENT",
            Self::InvalidTransition { .. } => "INVALID_PAYMENT_TRANSITION",
            Self::SettlementOwnedByPayment { .. } => "SETTLEMENT_OWNED_BY_PAYMENT",
            Self::ReasonRequired => "REASON_REQUIRED",
            Self::Ledger(e) => e.error_code(),
        }
    }

    /// Returns the taxonomy kind of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::PaymentNotFound(_) | Self::DocumentNotFound(_) => ErrorKind::NotFound,
            Self::InvalidAmount(_) | Self::ReasonRequired => ErrorKind::Validation,
            Self::DocumentNotPayable { .. }
            | Self::Overpayment { .. }
            | Self::InvalidTransition { .. }
            | Self::SettlementOwnedByPayment { .. } => ErrorKind::StateConflict,
            Self::Ledger(e) => e.kind(),
        }
    }
}
