//! Property-based tests for the bank matcher.

use chrono::{Days, NaiveDate};
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::collections::HashSet;
use tally_shared::types::{BankAccountId, BankTransactionId, TransactionId};

use super::matcher::{LedgerCandidate, MatchDecision, auto_match};
use super::types::{BankTransaction, MatchStatus};

const TOLERANCE: i64 = 3;

fn base() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
}

// Few distinct amounts and dates so collisions and ties are common.
fn arb_amount() -> impl Strategy<Value = Decimal> {
    prop_oneof![
        Just(Decimal::new(5000, 2)),
        Just(Decimal::new(-5000, 2)),
        Just(Decimal::new(12500, 2)),
    ]
}

fn arb_day() -> impl Strategy<Value = u64> {
    0u64..15
}

fn line(day: u64, amount: Decimal) -> BankTransaction {
    BankTransaction {
        id: BankTransactionId::new(),
        bank_account_id: BankAccountId::new(),
        date: base() + Days::new(day),
        description: "generated".to_string(),
        amount,
        reference: None,
        match_status: MatchStatus::Unmatched,
        matched_transaction_id: None,
        candidate_ids: vec![],
        review_note: None,
        reconciliation_id: None,
        version: 0,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Every match pairs equal amounts within tolerance and no ledger
    /// transaction is matched twice.
    #[test]
    fn prop_matching_is_one_to_one(
        lines in prop::collection::vec((arb_day(), arb_amount()), 0..12),
        ledger in prop::collection::vec((arb_day(), arb_amount()), 0..12),
    ) {
        let lines: Vec<BankTransaction> = lines.into_iter().map(|(d, a)| line(d, a)).collect();
        let pool: Vec<LedgerCandidate> = ledger
            .into_iter()
            .map(|(d, a)| LedgerCandidate {
                transaction_id: TransactionId::new(),
                date: base() + Days::new(d),
                amount: a,
            })
            .collect();

        let outcomes = auto_match(&lines, pool.clone(), TOLERANCE);
        prop_assert_eq!(outcomes.len(), lines.len());

        let mut used = HashSet::new();
        for outcome in &outcomes {
            let bank = lines.iter().find(|l| l.id == outcome.bank_transaction_id).unwrap();
            match &outcome.decision {
                MatchDecision::Matched(id) => {
                    prop_assert!(used.insert(*id), "ledger transaction matched twice");
                    let candidate = pool.iter().find(|c| c.transaction_id == *id).unwrap();
                    prop_assert_eq!(candidate.amount, bank.amount);
                    prop_assert!((candidate.date - bank.date).num_days().abs() <= TOLERANCE);
                }
                MatchDecision::Potential(ids) => {
                    prop_assert!(ids.len() >= 2);
                    for id in ids {
                        prop_assert!(!used.contains(id), "suggested an already consumed candidate");
                    }
                }
                MatchDecision::Unmatched => {}
            }
        }
    }

    /// Running the matcher twice on the same input gives the same decisions.
    #[test]
    fn prop_matching_is_deterministic(
        lines in prop::collection::vec((arb_day(), arb_amount()), 0..8),
        ledger in prop::collection::vec((arb_day(), arb_amount()), 0..8),
    ) {
        let lines: Vec<BankTransaction> = lines.into_iter().map(|(d, a)| line(d, a)).collect();
        let pool: Vec<LedgerCandidate> = ledger
            .into_iter()
            .map(|(d, a)| LedgerCandidate {
                transaction_id: TransactionId::new(),
                date: base() + Days::new(d),
                amount: a,
            })
            .collect();

        let mut reversed_pool = pool.clone();
        reversed_pool.reverse();
        prop_assert_eq!(
            auto_match(&lines, pool, TOLERANCE),
            auto_match(&lines, reversed_pool, TOLERANCE)
        );
    }
}
