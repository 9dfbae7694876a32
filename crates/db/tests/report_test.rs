//! Aging and budget report tests.

mod common;

use chrono::Days;
use common::{Fixture, d};
use rstest::rstest;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use tally_core::aging::AgingBucket;
use tally_core::budget::{BudgetLine, VarianceStatus};
use tally_core::document::{Counterparty, DocumentKind, DocumentRef};
use tally_core::fund::{CreateFundInput, FundType};
use tally_core::ledger::EntryInput;
use tally_db::EngineError;

#[rstest]
#[case::due_today(0, AgingBucket::Current)]
#[case::one_day(1, AgingBucket::Days1To30)]
#[case::thirty(30, AgingBucket::Days1To30)]
#[case::thirty_one(31, AgingBucket::Days31To60)]
#[case::sixty(60, AgingBucket::Days31To60)]
#[case::sixty_one(61, AgingBucket::Days61To90)]
#[case::ninety(90, AgingBucket::Days61To90)]
#[case::ninety_one(91, AgingBucket::Days90Plus)]
#[tokio::test]
async fn test_receivable_aging_bucket_boundaries(
    #[case] days_overdue: u64,
    #[case] expected: AgingBucket,
) {
    let fx = Fixture::new().await;
    let due = d(2026, 1, 31);
    fx.engine
        .documents()
        .create_invoice(fx.invoice_input("AR-1", d(2026, 1, 1), Some(due), dec!(120)))
        .await
        .unwrap();

    let as_of = due.checked_add_days(Days::new(days_overdue)).unwrap();
    let report = fx.engine.reports().aging_report(DocumentKind::Receivable, as_of).await.unwrap();
    assert_eq!(report.buckets.get(expected), dec!(120));
    assert_eq!(report.total, dec!(120));
    assert_eq!(report.by_counterparty.len(), 1);
    assert_eq!(report.by_counterparty[0].name, "Jane Parent");
}

#[tokio::test]
async fn test_aging_uses_outstanding_and_skips_paid() {
    let fx = Fixture::new().await;
    let partial = fx.posted_bill("INV-1", d(2026, 1, 1), Some(d(2026, 1, 10)), dec!(400)).await;
    let paid = fx.posted_bill("INV-2", d(2026, 1, 1), Some(d(2026, 1, 10)), dec!(90)).await;
    let payments = fx.engine.payments();
    payments
        .create_payment(fx.payment(DocumentRef::Bill(partial.id), dec!(150), None))
        .await
        .unwrap();
    payments
        .create_payment(fx.payment(DocumentRef::Bill(paid.id), dec!(90), None))
        .await
        .unwrap();

    let report = fx
        .engine
        .reports()
        .aging_report(DocumentKind::Payable, d(2026, 2, 15))
        .await
        .unwrap();
    assert_eq!(report.buckets.get(AgingBucket::Days31To60), dec!(250));
    assert_eq!(report.total, dec!(250));
    let row = &report.by_counterparty[0];
    assert_eq!(row.counterparty, Counterparty::Vendor(fx.vendor));
    assert_eq!(row.document_count, 1);

    let receivables = fx
        .engine
        .reports()
        .aging_report(DocumentKind::Receivable, d(2026, 2, 15))
        .await
        .unwrap();
    assert_eq!(receivables.total, Decimal::ZERO);
}

#[tokio::test]
async fn test_budget_vs_actual_uses_posted_activity_in_range() {
    let fx = Fixture::new().await;
    fx.post_cash(d(2026, 1, 5), dec!(5000)).await;
    fx.post_cash(d(2026, 1, 12), dec!(-300)).await;
    fx.post_cash(d(2026, 2, 3), dec!(-900)).await;

    let report = fx
        .engine
        .reports()
        .budget_vs_actual(
            &[BudgetLine::new(fx.expense.id, dec!(500))],
            d(2026, 1, 1),
            d(2026, 1, 31),
        )
        .await
        .unwrap();
    let line = &report.lines[0];
    assert_eq!(line.actual, dec!(300));
    assert_eq!(line.variance, dec!(200));
    assert_eq!(line.status, VarianceStatus::Favorable);
    assert_eq!(report.summary.total_budgeted, dec!(500));

    let err = fx
        .engine
        .reports()
        .budget_vs_actual(&[], d(2026, 2, 1), d(2026, 1, 1))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Budget(_)));
}

#[tokio::test]
async fn test_fund_balances_pair_stored_and_computed() {
    let fx = Fixture::new().await;
    let fund = fx
        .engine
        .funds()
        .create_fund(CreateFundInput {
            name: "Scholarship".into(),
            fund_type: FundType::Restricted,
            restriction: Some("Need-based aid".into()),
            valid_from: None,
            valid_to: None,
        })
        .await
        .unwrap();
    fx.post_journal(
        d(2026, 3, 1),
        vec![
            EntryInput::debit(fx.cash.id, dec!(700)),
            EntryInput::credit(fx.revenue.id, dec!(700)).with_fund(Some(fund.id)),
        ],
    )
    .await;

    let report = fx.engine.reports().fund_balances(d(2026, 12, 31)).await.unwrap();
    assert_eq!(report.len(), 1);
    let (stored, check) = &report[0];
    assert_eq!(stored.balance, dec!(700));
    assert_eq!(check.computed_balance, dec!(700));
    assert!(check.is_reconciled);
}
