//! Property-based tests for ledger entry validation rules.

use proptest::prelude::*;
use rust_decimal::Decimal;
use tally_shared::types::AccountId;

use super::error::LedgerError;
use super::types::EntryInput;
use super::validation::validate_entries;

/// Strategy to generate a valid positive amount (> 0).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    // 0.01 to 1,000,000.00
    (1i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate a list of debit amounts.
fn debit_amounts() -> impl Strategy<Value = Vec<Decimal>> {
    prop::collection::vec(positive_amount(), 1..8)
}

/// Balanced entry set: many debits against one credit for their sum.
fn balanced(debits: &[Decimal]) -> Vec<EntryInput> {
    let total: Decimal = debits.iter().copied().sum();
    let mut entries: Vec<EntryInput> = debits
        .iter()
        .map(|amount| EntryInput::debit(AccountId::new(), *amount))
        .collect();
    entries.push(EntryInput::credit(AccountId::new(), total));
    entries
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Any balanced set of one-sided positive entries validates,
    /// and its totals equal the generated sum.
    #[test]
    fn prop_balanced_entries_accepted(debits in debit_amounts()) {
        let total: Decimal = debits.iter().copied().sum();
        let totals = validate_entries(&balanced(&debits)).unwrap();

        prop_assert_eq!(totals.total_debit, total);
        prop_assert_eq!(totals.total_credit, total);
        prop_assert_eq!(totals.entry_count, debits.len() + 1);
    }

    /// Perturbing one side by any non-zero amount makes the set unbalanced.
    #[test]
    fn prop_perturbed_entries_rejected(
        debits in debit_amounts(),
        delta in positive_amount(),
    ) {
        let mut entries = balanced(&debits);
        entries[0].debit += delta;

        let is_unbalanced = matches!(
            validate_entries(&entries),
            Err(LedgerError::UnbalancedEntries { .. })
        );
        prop_assert!(is_unbalanced);
    }

    /// A line carrying both a debit and a credit is rejected wherever it sits.
    #[test]
    fn prop_two_sided_line_rejected(
        debits in debit_amounts(),
        amount in positive_amount(),
        position in 0usize..8,
    ) {
        let mut entries = balanced(&debits);
        let line = position % entries.len();
        entries[line].debit += amount;
        entries[line].credit += amount;

        let rejected_at_line = matches!(
            validate_entries(&entries),
            Err(LedgerError::InvalidEntryAmounts { line: l }) if l == line
        );
        prop_assert!(rejected_at_line);
    }
}
