//! Bill and invoice lifecycle tests.

mod common;

use common::{Fixture, d};
use rust_decimal_macros::dec;

use tally_core::document::{Counterparty, DocumentError, DocumentPaymentStatus, DocumentRef};
use tally_core::ledger::LedgerError;
use tally_core::payment::PaymentError;
use tally_core::workflow::TransactionStatus;
use tally_db::EngineError;
use tally_shared::ErrorKind;

#[tokio::test]
async fn test_bill_lifecycle_posts_ap_transaction() {
    let fx = Fixture::new().await;
    let bill = fx.posted_bill("INV-100", d(2026, 1, 10), None, dec!(320)).await;

    assert_eq!(bill.transaction.status, TransactionStatus::Posted);
    assert_eq!(bill.header.amount_due, dec!(320));
    assert_eq!(bill.header.payment_status, DocumentPaymentStatus::Unpaid);
    // Vendor terms are Net 30.
    assert_eq!(bill.header.due_date, d(2026, 2, 9));

    let stored = fx.engine.transactions().get_transaction(bill.transaction.id).await.unwrap();
    assert_eq!(stored, bill.transaction);

    let payable = fx
        .engine
        .accounts()
        .account_balance(fx.payable.id, d(2026, 1, 31))
        .await
        .unwrap();
    assert_eq!(payable, dec!(-320));
}

#[tokio::test]
async fn test_invoice_defaults_due_date_from_configured_terms() {
    let fx = Fixture::new().await;
    let invoice = fx.posted_invoice("AR-1", d(2026, 3, 1), None, dec!(900)).await;
    assert_eq!(invoice.header.due_date, d(2026, 3, 31));

    let receivable = fx
        .engine
        .accounts()
        .account_balance(fx.receivable.id, d(2026, 3, 31))
        .await
        .unwrap();
    assert_eq!(receivable, dec!(900));
}

#[tokio::test]
async fn test_bill_numbers_unique_per_vendor() {
    let fx = Fixture::new().await;
    let docs = fx.engine.documents();
    docs.create_bill(fx.bill_input("INV-7", d(2026, 1, 1), None, dec!(10))).await.unwrap();

    let err = docs
        .create_bill(fx.bill_input("INV-7", d(2026, 1, 2), None, dec!(20)))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Document(DocumentError::DuplicateDocumentNumber(_))));

    let other = docs.create_vendor("Staples", None).await.unwrap();
    let mut input = fx.bill_input("INV-7", d(2026, 1, 2), None, dec!(20));
    input.vendor_id = other.id;
    assert!(docs.create_bill(input).await.is_ok());
}

#[tokio::test]
async fn test_due_date_before_invoice_date_rejected() {
    let fx = Fixture::new().await;
    let err = fx
        .engine
        .documents()
        .create_invoice(fx.invoice_input("AR-2", d(2026, 3, 10), Some(d(2026, 3, 1)), dec!(5)))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(fx.engine.documents().list_invoices().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_inactive_vendor_rejects_new_bills() {
    let fx = Fixture::new().await;
    let docs = fx.engine.documents();
    docs.deactivate_counterparty(Counterparty::Vendor(fx.vendor)).await.unwrap();

    let err = docs
        .create_bill(fx.bill_input("INV-9", d(2026, 1, 1), None, dec!(10)))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Document(DocumentError::VendorInactive(_))));
}

#[tokio::test]
async fn test_payment_requires_posted_document() {
    let fx = Fixture::new().await;
    let bill = fx
        .engine
        .documents()
        .create_bill(fx.bill_input("INV-11", d(2026, 1, 1), None, dec!(10)))
        .await
        .unwrap();

    let err = fx
        .engine
        .payments()
        .create_payment(fx.payment(DocumentRef::Bill(bill.id), dec!(5), None))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Payment(PaymentError::DocumentNotPayable { .. })));
}

#[tokio::test]
async fn test_void_paid_document_rejected() {
    let fx = Fixture::new().await;
    let bill = fx.posted_bill("INV-12", d(2026, 1, 1), None, dec!(100)).await;
    let reference = DocumentRef::Bill(bill.id);
    fx.engine
        .payments()
        .create_payment(fx.payment(reference, dec!(40), None))
        .await
        .unwrap();

    let err = fx
        .engine
        .documents()
        .void_document(reference, fx.user, "entered twice")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Document(DocumentError::CannotVoidPaidDocument { .. })));

    let unchanged = fx.engine.documents().get_bill(bill.id).await.unwrap();
    assert_eq!(unchanged.transaction.status, TransactionStatus::Posted);
    assert_eq!(unchanged.header.amount_paid, dec!(40));
}

#[tokio::test]
async fn test_void_unpaid_document_reverses_and_marks_voided() {
    let fx = Fixture::new().await;
    let bill = fx.posted_bill("INV-13", d(2026, 1, 1), None, dec!(75)).await;
    let reference = DocumentRef::Bill(bill.id);

    let voided = fx
        .engine
        .documents()
        .void_document(reference, fx.user, "cancelled order")
        .await
        .unwrap();
    assert_eq!(voided.transaction().status, TransactionStatus::Voided);
    assert_eq!(voided.header().payment_status, DocumentPaymentStatus::Voided);

    let payable = fx
        .engine
        .accounts()
        .account_balance(fx.payable.id, d(2026, 12, 31))
        .await
        .unwrap();
    assert!(payable.is_zero());
}

#[tokio::test]
async fn test_unknown_document_is_not_found() {
    let fx = Fixture::new().await;
    let missing = DocumentRef::Invoice(tally_shared::types::InvoiceId::new());

    let err = fx
        .engine
        .payments()
        .create_payment(fx.payment(missing, dec!(1), None))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Payment(PaymentError::DocumentNotFound(r)) if r == missing));
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_bill_line_with_unknown_account_rejected() {
    let fx = Fixture::new().await;
    let mut input = fx.bill_input("INV-14", d(2026, 1, 1), None, dec!(10));
    input.line_items[0].account_id = tally_shared::types::AccountId::new();

    let err = fx.engine.documents().create_bill(input).await.unwrap_err();
    assert!(matches!(
        err,
        EngineError::Document(_) | EngineError::Ledger(LedgerError::AccountNotFound(_))
    ));
}
