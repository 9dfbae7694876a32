//! Property-based tests for ReversalService.

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use tally_shared::types::{AccountId, FundId, UserId};

use crate::ledger::{
    Account, AccountType, CreateTransactionInput, EntryInput, LedgerService, Transaction,
    TransactionType,
};
use crate::workflow::reversal::ReversalService;

/// Strategy for generating random positive Decimal amounts.
fn arb_amount() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

/// Builds a balanced transaction: one debit line per amount, one credit for the sum.
fn transaction(amounts: &[Decimal], funded: bool) -> Transaction {
    let mut accounts: Vec<Account> = amounts
        .iter()
        .enumerate()
        .map(|(i, _)| Account::new(format!("5{i:03}"), "Expense", AccountType::Expense, None))
        .collect();
    accounts.push(Account::new("1000", "Cash", AccountType::Asset, None));
    let fund = funded.then(FundId::new);

    let total: Decimal = amounts.iter().copied().sum();
    let mut entries: Vec<EntryInput> = accounts[..amounts.len()]
        .iter()
        .zip(amounts)
        .map(|(a, amount)| EntryInput::debit(a.id, *amount).with_fund(fund))
        .collect();
    let cash: AccountId = accounts[amounts.len()].id;
    entries.push(EntryInput::credit(cash, total).with_fund(fund));

    LedgerService::create_transaction(
        CreateTransactionInput {
            transaction_type: TransactionType::JournalEntry,
            date: NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
            description: "generated".to_string(),
            reference: None,
            entries,
            created_by: UserId::new(),
        },
        |id| accounts.iter().find(|a| a.id == id),
    )
    .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Reversals are balanced, same-sized, and net every account to zero.
    #[test]
    fn prop_reversal_is_balanced_mirror(
        amounts in prop::collection::vec(arb_amount(), 1..6),
        funded in any::<bool>(),
    ) {
        let original = transaction(&amounts, funded);
        let reversal = ReversalService::create_reversing_transaction(
            &original,
            UserId::new(),
            "generated void",
            original.date,
        );

        prop_assert!(reversal.is_balanced());
        prop_assert_eq!(reversal.entries.len(), original.entries.len());
        prop_assert_eq!(reversal.amount, original.amount);

        for entry in &original.entries {
            let net = original.net_on_account(entry.account_id)
                + reversal.net_on_account(entry.account_id);
            prop_assert_eq!(net, Decimal::ZERO);
        }
    }

    /// Fund changes of a reversal exactly cancel the original's.
    #[test]
    fn prop_reversal_cancels_fund_changes(
        amounts in prop::collection::vec(arb_amount(), 1..6),
    ) {
        let original = transaction(&amounts, true);
        let reversal = ReversalService::create_reversing_transaction(
            &original,
            UserId::new(),
            "generated void",
            original.date,
        );

        let reversed = reversal.fund_changes();
        for (fund, change) in original.fund_changes() {
            let undone = reversed.get(&fund).copied().unwrap_or_default();
            prop_assert_eq!(undone + change, Decimal::ZERO);
        }
    }
}
