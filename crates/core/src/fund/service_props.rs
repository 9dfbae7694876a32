//! Property-based tests for FundService.

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use tally_shared::types::{AccountId, UserId};

use super::error::FundError;
use super::service::FundService;
use super::types::{CreateFundInput, Fund, FundType, TransferInput};

fn arb_amount() -> impl Strategy<Value = Decimal> {
    (1i64..10_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn arb_fund_type() -> impl Strategy<Value = FundType> {
    prop_oneof![
        Just(FundType::General),
        Just(FundType::Restricted),
        Just(FundType::PermanentlyRestricted),
        Just(FundType::BoardDesignated),
    ]
}

fn fund(fund_type: FundType, balance: Decimal) -> Fund {
    let mut fund = FundService::create_fund(CreateFundInput {
        name: "Fund".to_string(),
        fund_type,
        restriction: None,
        valid_from: None,
        valid_to: None,
    })
    .unwrap();
    fund.balance = balance;
    fund
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// A transfer from a restricted fund succeeds exactly when the balance covers it,
    /// and every accepted transfer moves the amount between the two funds only.
    #[test]
    fn prop_transfer_respects_restriction(
        source_type in arb_fund_type(),
        balance in arb_amount(),
        amount in arb_amount(),
    ) {
        let source = fund(source_type, balance);
        let destination = fund(FundType::General, Decimal::ZERO);
        let input = TransferInput {
            source_fund_id: source.id,
            destination_fund_id: destination.id,
            amount,
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            transfer_out_account_id: AccountId::new(),
            transfer_in_account_id: AccountId::new(),
            description: "generated".to_string(),
            created_by: UserId::new(),
        };

        match FundService::transfer(&input, &source, &destination) {
            Ok(txn) => {
                prop_assert!(!source_type.is_restricted() || amount <= balance);
                let changes = FundService::fund_changes(&txn.entries);
                prop_assert_eq!(changes.len(), 2);
                prop_assert_eq!(changes[&source.id], -amount);
                prop_assert_eq!(changes[&destination.id], amount);
            }
            Err(FundError::InsufficientFundBalance { .. }) => {
                prop_assert!(source_type.is_restricted() && amount > balance);
            }
            Err(other) => prop_assert!(false, "unexpected error {other:?}"),
        }
    }

    /// Reconciliation discrepancy is exactly stored minus computed.
    #[test]
    fn prop_reconcile_discrepancy(stored in arb_amount(), computed in arb_amount()) {
        let fund = fund(FundType::Restricted, stored);
        let as_of = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        let report = FundService::reconcile(&fund, computed, as_of);
        prop_assert_eq!(report.discrepancy, stored - computed);
        prop_assert_eq!(report.is_reconciled, stored == computed);
    }
}
