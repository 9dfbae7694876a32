//! Fund accounting tests: allocations, transfers and reconciliation.

mod common;

use common::{Fixture, d};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use tally_core::fund::{CreateFundInput, Fund, FundError, FundType, TransferInput};
use tally_core::ledger::EntryInput;
use tally_core::workflow::TransactionStatus;
use tally_db::EngineError;
use tally_shared::ErrorKind;

async fn fund(fx: &Fixture, name: &str, fund_type: FundType) -> Fund {
    fx.engine
        .funds()
        .create_fund(CreateFundInput {
            name: name.into(),
            fund_type,
            restriction: None,
            valid_from: None,
            valid_to: None,
        })
        .await
        .unwrap()
}

/// Posts a gift into `fund`; only the revenue side carries the fund tag.
async fn seed_fund(fx: &Fixture, fund: &Fund, amount: Decimal) {
    fx.post_journal(
        d(2026, 1, 2),
        vec![
            EntryInput::debit(fx.cash.id, amount),
            EntryInput::credit(fx.revenue.id, amount).with_fund(Some(fund.id)),
        ],
    )
    .await;
}

fn transfer(fx: &Fixture, source: &Fund, destination: &Fund, amount: Decimal) -> TransferInput {
    TransferInput {
        source_fund_id: source.id,
        destination_fund_id: destination.id,
        amount,
        date: d(2026, 1, 15),
        transfer_out_account_id: fx.transfer_out.id,
        transfer_in_account_id: fx.transfer_in.id,
        description: "Release restriction".into(),
        created_by: fx.user,
    }
}

#[tokio::test]
async fn test_posting_updates_running_balance() {
    let fx = Fixture::new().await;
    let scholarship = fund(&fx, "Scholarship", FundType::Restricted).await;
    seed_fund(&fx, &scholarship, dec!(500)).await;

    let stored = fx.engine.funds().get_fund(scholarship.id).await.unwrap();
    assert_eq!(stored.balance, dec!(500));
}

#[tokio::test]
async fn test_transfer_exceeding_restricted_balance_changes_nothing() {
    let fx = Fixture::new().await;
    let restricted = fund(&fx, "Building", FundType::Restricted).await;
    let general = fund(&fx, "Operating", FundType::General).await;
    seed_fund(&fx, &restricted, dec!(500)).await;

    let err = fx
        .engine
        .funds()
        .transfer(transfer(&fx, &restricted, &general, dec!(600)))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::Fund(FundError::InsufficientFundBalance { available, requested, .. })
            if available == dec!(500) && requested == dec!(600)
    ));
    assert_eq!(err.kind(), ErrorKind::InvariantViolation);

    let funds = fx.engine.funds();
    assert_eq!(funds.get_fund(restricted.id).await.unwrap().balance, dec!(500));
    assert_eq!(funds.get_fund(general.id).await.unwrap().balance, Decimal::ZERO);
}

#[tokio::test]
async fn test_transfer_posts_and_moves_both_balances() {
    let fx = Fixture::new().await;
    let restricted = fund(&fx, "Building", FundType::Restricted).await;
    let general = fund(&fx, "Operating", FundType::General).await;
    seed_fund(&fx, &restricted, dec!(500)).await;

    let txn = fx
        .engine
        .funds()
        .transfer(transfer(&fx, &restricted, &general, dec!(200)))
        .await
        .unwrap();
    assert_eq!(txn.status, TransactionStatus::Posted);
    assert!(txn.is_balanced());

    let funds = fx.engine.funds();
    assert_eq!(funds.get_fund(restricted.id).await.unwrap().balance, dec!(300));
    assert_eq!(funds.get_fund(general.id).await.unwrap().balance, dec!(200));
}

#[tokio::test]
async fn test_same_fund_transfer_rejected() {
    let fx = Fixture::new().await;
    let general = fund(&fx, "Operating", FundType::General).await;
    let err = fx
        .engine
        .funds()
        .transfer(transfer(&fx, &general, &general, dec!(1)))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Fund(FundError::SameFundTransfer)));
}

#[tokio::test]
async fn test_allocation_checks_balance_as_of_its_date() {
    let fx = Fixture::new().await;
    let restricted = fund(&fx, "Library", FundType::Restricted).await;
    seed_fund(&fx, &restricted, dec!(100)).await;

    let spend = |date| {
        fx.journal(
            date,
            vec![
                EntryInput::debit(fx.expense.id, dec!(80)).with_fund(Some(restricted.id)),
                EntryInput::credit(fx.net_assets.id, dec!(80)).with_fund(Some(restricted.id)),
            ],
        )
    };
    // Net zero per fund: both sides tagged.
    assert!(fx.engine.funds().allocate(spend(d(2026, 1, 20))).await.is_ok());

    let overdraw = fx.journal(
        d(2026, 1, 1),
        vec![
            EntryInput::debit(fx.expense.id, dec!(80)).with_fund(Some(restricted.id)),
            EntryInput::credit(fx.cash.id, dec!(80)).with_fund(None),
        ],
    );
    let err = fx.engine.funds().allocate(overdraw).await.unwrap_err();
    assert!(matches!(err, EngineError::Fund(FundError::MissingFundTag { line: 1 })));

    let before_gift = fx.journal(
        d(2026, 1, 1),
        vec![
            EntryInput::debit(fx.expense.id, dec!(80)).with_fund(Some(restricted.id)),
            EntryInput::credit(fx.cash.id, dec!(80))
                .with_fund(Some(fund(&fx, "General", FundType::General).await.id)),
        ],
    );
    let err = fx.engine.funds().allocate(before_gift).await.unwrap_err();
    assert!(matches!(
        err,
        EngineError::Fund(FundError::InsufficientFundBalance { available, .. })
            if available.is_zero()
    ));

    let after_gift = fx.journal(
        d(2026, 1, 3),
        vec![
            EntryInput::debit(fx.expense.id, dec!(80)).with_fund(Some(restricted.id)),
            EntryInput::credit(fx.cash.id, dec!(80))
                .with_fund(Some(fund(&fx, "Other", FundType::General).await.id)),
        ],
    );
    let draft = fx.engine.funds().allocate(after_gift).await.unwrap();
    assert_eq!(draft.status, TransactionStatus::Draft);
}

#[tokio::test]
async fn test_reconcile_fund_reports_without_correcting() {
    let fx = Fixture::new().await;
    let general = fund(&fx, "Operating", FundType::General).await;
    seed_fund(&fx, &general, dec!(250)).await;

    let result = fx.engine.funds().reconcile_fund(general.id, d(2026, 12, 31)).await.unwrap();
    assert!(result.is_reconciled);
    assert_eq!(result.computed_balance, dec!(250));

    let early = fx.engine.funds().reconcile_fund(general.id, d(2026, 1, 1)).await.unwrap();
    assert!(!early.is_reconciled);
    assert_eq!(early.discrepancy, dec!(250));
    assert_eq!(fx.engine.funds().get_fund(general.id).await.unwrap().balance, dec!(250));
}

#[tokio::test]
async fn test_void_reversal_cannot_overdraw_restricted_fund() {
    let fx = Fixture::new().await;
    let restricted = fund(&fx, "Endowment", FundType::Restricted).await;
    let general = fund(&fx, "Operating", FundType::General).await;
    let gift = fx
        .post_journal(
            d(2026, 1, 2),
            vec![
                EntryInput::debit(fx.cash.id, dec!(300)),
                EntryInput::credit(fx.revenue.id, dec!(300)).with_fund(Some(restricted.id)),
            ],
        )
        .await;
    fx.engine
        .funds()
        .transfer(transfer(&fx, &restricted, &general, dec!(250)))
        .await
        .unwrap();

    let err = fx.engine.transactions().void(gift.id, fx.user, "bounced").await.unwrap_err();
    assert!(matches!(err, EngineError::Fund(FundError::RestrictedFundOverdrawn { .. })));
    assert_eq!(
        fx.engine.funds().get_fund(restricted.id).await.unwrap().balance,
        dec!(50)
    );
}
