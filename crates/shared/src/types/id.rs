//! Typed IDs for type-safe entity references.
//!
//! Using typed IDs prevents accidentally passing a `BillId` where an `InvoiceId` is expected.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Macro to generate typed ID wrappers.
macro_rules! typed_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Creates a new random ID using UUID v7 (time-ordered).
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Creates an ID from an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner UUID.
            #[must_use]
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

typed_id!(UserId, "Unique identifier for a user.");
typed_id!(AccountId, "Unique identifier for a chart of accounts entry.");
typed_id!(FundId, "Unique identifier for a fund.");
typed_id!(TransactionId, "Unique identifier for a ledger transaction.");
typed_id!(EntryId, "Unique identifier for a transaction entry.");
typed_id!(FiscalYearId, "Unique identifier for a fiscal year.");
typed_id!(FiscalPeriodId, "Unique identifier for a fiscal period.");
typed_id!(VendorId, "Unique identifier for a vendor.");
typed_id!(CustomerId, "Unique identifier for a customer.");
typed_id!(BillId, "Unique identifier for an accounts-payable bill.");
typed_id!(InvoiceId, "Unique identifier for an accounts-receivable invoice.");
typed_id!(LineItemId, "Unique identifier for a document line item.");
typed_id!(PaymentId, "Unique identifier for a payment.");
typed_id!(TemplateId, "Unique identifier for a recurring document template.");
typed_id!(BankAccountId, "Unique identifier for a bank account.");
typed_id!(BankTransactionId, "Unique identifier for a bank statement line.");
typed_id!(ReconciliationId, "Unique identifier for a bank reconciliation.");
typed_id!(AdjustmentId, "Unique identifier for a bank statement adjustment.");
