//! Property-based tests for payment status derivation.

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use tally_shared::types::{BillId, UserId};

use super::service::PaymentService;
use super::types::{CreatePaymentInput, Payment, PaymentMethod, PaymentStatus};
use crate::document::{DocumentHeader, DocumentPaymentStatus, DocumentRef};
use crate::workflow::TransactionStatus;
use tally_shared::types::AccountId;

fn arb_amount() -> impl Strategy<Value = Decimal> {
    (1i64..100_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn arb_status() -> impl Strategy<Value = PaymentStatus> {
    prop_oneof![
        Just(PaymentStatus::Pending),
        Just(PaymentStatus::Processing),
        Just(PaymentStatus::Completed),
        Just(PaymentStatus::Failed),
        Just(PaymentStatus::Voided),
    ]
}

fn header(amount_due: Decimal) -> DocumentHeader {
    let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    DocumentHeader {
        number: "B-1".to_string(),
        invoice_date: date,
        due_date: date,
        amount_due,
        amount_paid: Decimal::ZERO,
        payment_status: DocumentPaymentStatus::Unpaid,
        control_account_id: AccountId::new(),
        line_items: vec![],
    }
}

fn payment(amount: Decimal, status: PaymentStatus) -> Payment {
    let mut payment = PaymentService::create_payment(
        CreatePaymentInput {
            document: DocumentRef::Bill(BillId::new()),
            amount,
            payment_date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            method: PaymentMethod::Ach,
            reference: None,
            memo: None,
            cash_account_id: None,
            created_by: UserId::new(),
        },
        &header(Decimal::MAX),
        TransactionStatus::Posted,
    )
    .unwrap();
    payment.status = status;
    payment
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Voiding one payment and re-deriving gives the same position as if the
    /// payment had never existed.
    #[test]
    fn prop_void_then_derive_matches_absence(
        specs in prop::collection::vec((arb_amount(), arb_status()), 1..12),
        amount_due in arb_amount(),
        pick in any::<prop::sample::Index>(),
    ) {
        let mut payments: Vec<Payment> = specs.iter().map(|(a, s)| payment(*a, *s)).collect();
        let index = pick.index(payments.len());

        let without: Vec<Payment> = payments
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != index)
            .map(|(_, p)| p.clone())
            .collect();
        let expected = PaymentService::derive_payment_status(amount_due, &without);

        payments[index].status = PaymentStatus::Voided;
        let actual = PaymentService::derive_payment_status(amount_due, &payments);

        prop_assert_eq!(actual, expected);
    }

    /// Accepted payments never push the paid amount past the amount due.
    #[test]
    fn prop_accepted_payments_stay_within_amount_due(
        amounts in prop::collection::vec(arb_amount(), 1..20),
        amount_due in arb_amount(),
    ) {
        let mut doc = header(amount_due);
        let mut accepted: Vec<Payment> = Vec::new();

        for amount in amounts {
            if PaymentService::check_overpayment(&doc, amount).is_ok() {
                accepted.push(payment(amount, PaymentStatus::Pending));
                let position = PaymentService::derive_payment_status(doc.amount_due, &accepted);
                PaymentService::apply_position(&mut doc, position);
            }
            prop_assert!(doc.amount_paid >= Decimal::ZERO);
            prop_assert!(doc.amount_paid <= doc.amount_due);
        }

        let paid = doc.amount_paid == doc.amount_due;
        prop_assert_eq!(doc.payment_status == DocumentPaymentStatus::Paid, paid);
    }
}
