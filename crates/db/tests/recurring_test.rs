//! Recurring template generation tests.

mod common;

use chrono::NaiveDate;
use common::{Fixture, d};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use tally_core::document::{Counterparty, DocumentError, LineItemInput};
use tally_core::recurring::{CreateTemplateInput, Frequency, RecurringError, RecurringTemplate};
use tally_core::workflow::TransactionStatus;
use tally_db::{Document, EngineError};
use tally_shared::ErrorKind;

fn rent_input(
    fx: &Fixture,
    frequency: Frequency,
    day_of_month: Option<u32>,
    start: NaiveDate,
) -> CreateTemplateInput {
    CreateTemplateInput {
        name: "Rent".into(),
        counterparty: Counterparty::Vendor(fx.vendor),
        line_items: vec![LineItemInput::new("Rent", Decimal::ONE, dec!(2500), fx.expense.id)],
        control_account_id: fx.payable.id,
        description: "Monthly rent".into(),
        payment_terms: None,
        frequency,
        day_of_month,
        start_date: start,
        end_date: None,
        number_prefix: "RENT".into(),
        created_by: fx.user,
    }
}

async fn rent(fx: &Fixture) -> RecurringTemplate {
    fx.engine
        .recurring()
        .create_template(rent_input(fx, Frequency::Monthly, Some(31), d(2026, 1, 31)))
        .await
        .unwrap()
}

#[tokio::test]
async fn test_month_end_template_clamps_then_recovers() {
    let fx = Fixture::new().await;
    let template = rent(&fx).await;
    let recurring = fx.engine.recurring();

    let first = recurring.generate_from_recurring(template.id, d(2026, 1, 31)).await.unwrap();
    assert_eq!(first.template.next_generation_date, d(2026, 2, 28));
    assert_eq!(first.template.occurrences_generated, 1);
    assert_eq!(first.template.last_generated_on, Some(d(2026, 1, 31)));

    let second = recurring.generate_from_recurring(template.id, d(2026, 2, 28)).await.unwrap();
    assert_eq!(second.template.next_generation_date, d(2026, 3, 31));
    assert_eq!(second.template.occurrences_generated, 2);

    let stored = recurring.get_template(template.id).await.unwrap();
    assert_eq!(stored, second.template);
}

#[tokio::test]
async fn test_generated_document_is_numbered_draft() {
    let fx = Fixture::new().await;
    let template = rent(&fx).await;

    let generated = fx
        .engine
        .recurring()
        .generate_from_recurring(template.id, d(2026, 1, 31))
        .await
        .unwrap();
    let Document::Bill(bill) = &generated.document else {
        panic!("vendor template must generate a bill");
    };
    assert_eq!(bill.header.number, "RENT-000001");
    assert_eq!(bill.header.invoice_date, d(2026, 1, 31));
    // Vendor terms are Net 30.
    assert_eq!(bill.header.due_date, d(2026, 3, 2));
    assert_eq!(bill.header.amount_due, dec!(2500));
    assert_eq!(bill.transaction.status, TransactionStatus::Draft);

    let stored = fx.engine.documents().get_bill(bill.id).await.unwrap();
    assert_eq!(&stored, bill);

    let next = fx
        .engine
        .recurring()
        .generate_from_recurring(template.id, d(2026, 3, 1))
        .await
        .unwrap();
    assert_eq!(next.document.header().number, "RENT-000002");
}

#[tokio::test]
async fn test_not_due_leaves_template_untouched() {
    let fx = Fixture::new().await;
    let template = rent(&fx).await;

    let err = fx
        .engine
        .recurring()
        .generate_from_recurring(template.id, d(2026, 1, 30))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::Recurring(RecurringError::NotDue { next_generation_date, .. })
            if next_generation_date == d(2026, 1, 31)
    ));
    assert_eq!(err.kind(), ErrorKind::StateConflict);

    let stored = fx.engine.recurring().get_template(template.id).await.unwrap();
    assert_eq!(stored, template);
    assert!(fx.engine.documents().list_bills().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_failed_document_does_not_advance_template() {
    let fx = Fixture::new().await;
    let template = rent(&fx).await;
    fx.engine
        .documents()
        .deactivate_counterparty(Counterparty::Vendor(fx.vendor))
        .await
        .unwrap();

    let err = fx
        .engine
        .recurring()
        .generate_from_recurring(template.id, d(2026, 1, 31))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Document(DocumentError::VendorInactive(_))));

    let stored = fx.engine.recurring().get_template(template.id).await.unwrap();
    assert_eq!(stored.next_generation_date, d(2026, 1, 31));
    assert_eq!(stored.occurrences_generated, 0);
    assert_eq!(stored.last_generated_on, None);
    assert!(fx.engine.documents().list_bills().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_inactive_template_never_generates() {
    let fx = Fixture::new().await;
    let template = rent(&fx).await;
    fx.engine.recurring().deactivate_template(template.id).await.unwrap();

    let err = fx
        .engine
        .recurring()
        .generate_from_recurring(template.id, d(2026, 2, 1))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Recurring(RecurringError::TemplateInactive(_))));
    assert!(fx.engine.recurring().list_due_templates(d(2026, 12, 31)).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_list_due_templates_orders_by_next_date() {
    let fx = Fixture::new().await;
    let recurring = fx.engine.recurring();
    let monthly = rent(&fx).await;

    let mut tuition = rent_input(&fx, Frequency::Weekly, None, d(2026, 1, 5));
    tuition.name = "Tuition".into();
    tuition.counterparty = Counterparty::Customer(fx.customer);
    tuition.control_account_id = fx.receivable.id;
    tuition.line_items = vec![LineItemInput::new(
        "Tuition",
        Decimal::ONE,
        dec!(400),
        fx.revenue.id,
    )];
    tuition.number_prefix = "TUI".into();
    let weekly = recurring.create_template(tuition).await.unwrap();

    let due: Vec<_> = recurring
        .list_due_templates(d(2026, 1, 31))
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.id)
        .collect();
    assert_eq!(due, vec![weekly.id, monthly.id]);

    let generated = recurring.generate_from_recurring(weekly.id, d(2026, 1, 31)).await.unwrap();
    assert!(matches!(generated.document, Document::Invoice(_)));
    assert_eq!(generated.template.next_generation_date, d(2026, 1, 12));
    assert!(recurring.list_due_templates(d(2026, 1, 4)).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_template_requires_known_control_account() {
    let fx = Fixture::new().await;
    let mut input = rent_input(&fx, Frequency::Monthly, None, d(2026, 1, 1));
    input.control_account_id = tally_shared::types::AccountId::new();

    let err = fx.engine.recurring().create_template(input).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}
