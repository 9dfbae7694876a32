//! Business rule validation for ledger entries.

use rust_decimal::Decimal;

use super::error::LedgerError;
use super::types::{EntryInput, TransactionTotals};

/// Validates that a set of entries is well-formed and balanced.
///
/// Rules, checked in order:
/// 1. At least one entry.
/// 2. Every entry has exactly one non-zero side and no negative side.
/// 3. Total debits equal total credits.
///
/// # Errors
///
/// Returns `EmptyEntries`, `InvalidEntryAmounts` or `UnbalancedEntries`.
pub fn validate_entries(entries: &[EntryInput]) -> Result<TransactionTotals, LedgerError> {
    if entries.is_empty() {
        return Err(LedgerError::EmptyEntries);
    }

    let mut totals = TransactionTotals::default();

    for (line, entry) in entries.iter().enumerate() {
        let negative = entry.debit < Decimal::ZERO || entry.credit < Decimal::ZERO;
        let one_sided = entry.debit.is_zero() != entry.credit.is_zero();
        if negative || !one_sided {
            return Err(LedgerError::InvalidEntryAmounts { line });
        }

        totals.total_debit += entry.debit;
        totals.total_credit += entry.credit;
        totals.entry_count += 1;
    }

    if !totals.is_balanced() {
        return Err(LedgerError::UnbalancedEntries {
            debit: totals.total_debit,
            credit: totals.total_credit,
        });
    }

    Ok(totals)
}
