//! Payment application against bills and invoices.

pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use error::PaymentError;
pub use service::PaymentService;
pub use types::{CreatePaymentInput, Payment, PaymentMethod, PaymentPosition, PaymentStatus};
