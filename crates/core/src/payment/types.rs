//! Payment types.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use tally_shared::types::{AccountId, PaymentId, TransactionId, UserId};

use crate::document::{DocumentPaymentStatus, DocumentRef};

/// How a payment was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    /// Cash.
    Cash,
    /// Paper check.
    Check,
    /// ACH transfer.
    Ach,
    /// Wire transfer.
    Wire,
    /// Credit card.
    CreditCard,
    /// Anything else.
    Other,
}

/// Payment lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    /// Recorded, not yet settled.
    Pending,
    /// Settlement in flight at the bank.
    Processing,
    /// Settled.
    Completed,
    /// Settlement failed.
    Failed,
    /// Voided by a user.
    Voided,
}

impl PaymentStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Processing => "PROCESSING",
            Self::Completed => "COMPLETED",
            Self::Failed => "FAILED",
            Self::Voided => "VOIDED",
        }
    }

    /// Returns true if the payment's amount counts toward `amount_paid`.
    #[must_use]
    pub const fn is_applied(self) -> bool {
        matches!(self, Self::Pending | Self::Processing | Self::Completed)
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A payment applied to one bill or invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    /// Unique identifier.
    pub id: PaymentId,
    /// The document this payment settles.
    pub document: DocumentRef,
    /// Amount (positive).
    pub amount: Decimal,
    /// Payment date.
    pub payment_date: NaiveDate,
    /// Payment method.
    pub method: PaymentMethod,
    /// Check number, confirmation code, etc.
    pub reference: Option<String>,
    /// Free-form memo.
    pub memo: Option<String>,
    /// Current status.
    pub status: PaymentStatus,
    /// Cash account the payment settled through, if any.
    pub cash_account_id: Option<AccountId>,
    /// Settlement transaction generated for the payment.
    pub transaction_id: Option<TransactionId>,
    /// User who recorded the payment.
    pub created_by: UserId,
    /// When the payment was recorded.
    pub created_at: DateTime<Utc>,
    /// When the payment was completed.
    pub processed_at: Option<DateTime<Utc>>,
    /// When the payment was voided or failed.
    pub closed_at: Option<DateTime<Utc>>,
    /// Why the payment was voided or failed.
    pub closed_reason: Option<String>,
    /// Store version for optimistic concurrency (0 = not yet stored).
    pub version: i64,
}

/// Input for recording a payment.
#[derive(Debug, Clone)]
pub struct CreatePaymentInput {
    /// The document to pay.
    pub document: DocumentRef,
    /// Amount (positive).
    pub amount: Decimal,
    /// Payment date.
    pub payment_date: NaiveDate,
    /// Payment method.
    pub method: PaymentMethod,
    /// Check number, confirmation code, etc.
    pub reference: Option<String>,
    /// Free-form memo.
    pub memo: Option<String>,
    /// When set, a posted settlement transaction is generated against this account.
    pub cash_account_id: Option<AccountId>,
    /// User recording the payment.
    pub created_by: UserId,
}

/// A document's paid amount and status derived from its payments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentPosition {
    /// Sum of applied payments.
    pub amount_paid: Decimal,
    /// Resulting payment status.
    pub status: DocumentPaymentStatus,
}
