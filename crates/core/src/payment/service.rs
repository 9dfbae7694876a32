//! Payment application rules.
//!
//! The engine records a payment and applies its amount to the document in
//! one step. `amount_paid` is never adjusted by subtraction: after any void
//! or failure it is re-derived from the remaining applied payments with
//! [`PaymentService::derive_payment_status`].

use chrono::Utc;
use rust_decimal::Decimal;
use tally_shared::types::{AccountId, PaymentId};

use super::error::PaymentError;
use super::types::{CreatePaymentInput, Payment, PaymentPosition, PaymentStatus};
use crate::document::{DocumentHeader, DocumentKind, DocumentPaymentStatus};
use crate::ledger::{CreateTransactionInput, EntryInput, TransactionType};
use crate::workflow::TransactionStatus;

/// Stateless payment service.
pub struct PaymentService;

impl PaymentService {
    /// Derive a document's paid amount and status from its payments.
    ///
    /// Only PENDING, PROCESSING and COMPLETED payments count.
    #[must_use]
    pub fn derive_payment_status<'a, I>(amount_due: Decimal, payments: I) -> PaymentPosition
    where
        I: IntoIterator<Item = &'a Payment>,
    {
        let amount_paid: Decimal = payments
            .into_iter()
            .filter(|p| p.status.is_applied())
            .map(|p| p.amount)
            .sum();

        let status = if amount_paid.is_zero() {
            DocumentPaymentStatus::Unpaid
        } else if amount_paid >= amount_due {
            DocumentPaymentStatus::Paid
        } else {
            DocumentPaymentStatus::PartiallyPaid
        };

        PaymentPosition {
            amount_paid,
            status,
        }
    }

    /// Write a derived position onto the document header.
    pub fn apply_position(header: &mut DocumentHeader, position: PaymentPosition) {
        header.amount_paid = position.amount_paid;
        header.payment_status = position.status;
    }

    /// Validate a new payment against its document and build it as PENDING.
    ///
    /// # Errors
    ///
    /// Returns `InvalidAmount`, `DocumentNotPayable` or `Overpayment`.
    pub fn create_payment(
        input: CreatePaymentInput,
        header: &DocumentHeader,
        document_status: TransactionStatus,
    ) -> Result<Payment, PaymentError> {
        if input.amount <= Decimal::ZERO {
            return Err(PaymentError::InvalidAmount(input.amount));
        }
        if document_status != TransactionStatus::Posted {
            return Err(PaymentError::DocumentNotPayable {
                document: input.document,
                status: document_status,
            });
        }
        Self::check_overpayment(header, input.amount)?;

        Ok(Payment {
            id: PaymentId::new(),
            document: input.document,
            amount: input.amount,
            payment_date: input.payment_date,
            method: input.method,
            reference: input.reference,
            memo: input.memo,
            status: PaymentStatus::Pending,
            cash_account_id: input.cash_account_id,
            transaction_id: None,
            created_by: input.created_by,
            created_at: Utc::now(),
            processed_at: None,
            closed_at: None,
            closed_reason: None,
            version: 0,
        })
    }

    /// Reject a payment that would push `amount_paid` past `amount_due`.
    ///
    /// # Errors
    ///
    /// Returns `Overpayment`; partial overpayments are not clamped.
    pub fn check_overpayment(header: &DocumentHeader, amount: Decimal) -> Result<(), PaymentError> {
        if header.amount_paid + amount > header.amount_due {
            return Err(PaymentError::Overpayment {
                amount_due: header.amount_due,
                amount_paid: header.amount_paid,
                attempted: amount,
            });
        }
        Ok(())
    }

    /// PENDING → PROCESSING, once the payment is handed to the bank.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` from any other status.
    pub fn begin_processing(payment: &mut Payment) -> Result<(), PaymentError> {
        Self::transition(payment, PaymentStatus::Processing, &[PaymentStatus::Pending])
    }

    /// PENDING → COMPLETED.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` from any other status.
    pub fn process(payment: &mut Payment) -> Result<(), PaymentError> {
        Self::complete(payment, PaymentStatus::Pending)
    }

    /// PROCESSING → COMPLETED, once the processor confirms.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` from any other status.
    pub fn complete_processing(payment: &mut Payment) -> Result<(), PaymentError> {
        Self::complete(payment, PaymentStatus::Processing)
    }

    fn complete(payment: &mut Payment, from: PaymentStatus) -> Result<(), PaymentError> {
        Self::transition(payment, PaymentStatus::Completed, &[from])?;
        payment.processed_at = Some(Utc::now());
        Ok(())
    }

    /// PENDING | COMPLETED → VOIDED.
    ///
    /// # Errors
    ///
    /// Returns `ReasonRequired` or `InvalidTransition`.
    pub fn void(payment: &mut Payment, reason: &str) -> Result<(), PaymentError> {
        Self::close(
            payment,
            PaymentStatus::Voided,
            &[PaymentStatus::Pending, PaymentStatus::Completed],
            reason,
        )
    }

    /// PENDING | PROCESSING → FAILED.
    ///
    /// # Errors
    ///
    /// Returns `ReasonRequired` or `InvalidTransition`.
    pub fn fail(payment: &mut Payment, reason: &str) -> Result<(), PaymentError> {
        Self::close(
            payment,
            PaymentStatus::Failed,
            &[PaymentStatus::Pending, PaymentStatus::Processing],
            reason,
        )
    }

    /// Build the settlement transaction for a payment through a cash account.
    ///
    /// Bill: debit the AP control account, credit cash.
    /// Invoice: debit cash, credit the AR control account.
    #[must_use]
    pub fn settlement_transaction(
        payment: &Payment,
        header: &DocumentHeader,
        cash_account_id: AccountId,
    ) -> CreateTransactionInput {
        let control = header.control_account_id;
        let (transaction_type, debit, credit, description) = match payment.document.kind() {
            DocumentKind::Payable => (
                TransactionType::AccountsPayable,
                control,
                cash_account_id,
                format!("Payment of bill {}", header.number),
            ),
            DocumentKind::Receivable => (
                TransactionType::AccountsReceivable,
                cash_account_id,
                control,
                format!("Receipt for invoice {}", header.number),
            ),
        };

        CreateTransactionInput {
            transaction_type,
            date: payment.payment_date,
            description,
            reference: payment.reference.clone(),
            entries: vec![
                EntryInput::debit(debit, payment.amount),
                EntryInput::credit(credit, payment.amount),
            ],
            created_by: payment.created_by,
        }
    }

    /// Signed change to the counterparty's year-to-date counter.
    ///
    /// Positive when a payment is applied, negative when it is released.
    #[must_use]
    pub fn ytd_delta(payment: &Payment, applied: bool) -> Decimal {
        if applied { payment.amount } else { -payment.amount }
    }

    fn close(
        payment: &mut Payment,
        to: PaymentStatus,
        allowed: &[PaymentStatus],
        reason: &str,
    ) -> Result<(), PaymentError> {
        if reason.trim().is_empty() {
            return Err(PaymentError::ReasonRequired);
        }
        Self::transition(payment, to, allowed)?;
        payment.closed_at = Some(Utc::now());
        payment.closed_reason = Some(reason.to_string());
        Ok(())
    }

    fn transition(
        payment: &mut Payment,
        to: PaymentStatus,
        allowed: &[PaymentStatus],
    ) -> Result<(), PaymentError> {
        if !allowed.contains(&payment.status) {
            return Err(PaymentError::InvalidTransition {
                from: payment.status,
                to,
            });
        }
        payment.status = to;
        Ok(())
    }
}
