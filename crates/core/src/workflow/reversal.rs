//! Reversal service for voiding posted transactions.
//!
//! Voiding a posted transaction never deletes history: it creates a posted
//! reversing transaction with every debit and credit swapped.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use tally_shared::types::{TransactionId, UserId};

use crate::ledger::{Transaction, TransactionEntry};
use crate::workflow::types::TransactionStatus;

/// Stateless service for creating reversing transactions.
pub struct ReversalService;

impl ReversalService {
    /// Create the posted reversing transaction for `original`.
    ///
    /// For each original entry:
    /// - Debits become credits
    /// - Credits become debits
    /// - Account and fund tags are preserved
    /// - Memo is prefixed with "Reversal: "
    ///
    /// The reversal is created, approved and posted by `voided_by` and links
    /// back through `reversal_of`.
    #[must_use]
    pub fn create_reversing_transaction(
        original: &Transaction,
        voided_by: UserId,
        void_reason: &str,
        reversal_date: NaiveDate,
    ) -> Transaction {
        let now = Utc::now();
        let entries: Vec<TransactionEntry> = original
            .entries
            .iter()
            .map(|entry| TransactionEntry::from_input(&entry.reversed()))
            .collect();

        Transaction {
            id: TransactionId::new(),
            transaction_type: original.transaction_type,
            date: reversal_date,
            description: format!(
                "Reversal of transaction {}. Reason: {}",
                original.id, void_reason
            ),
            reference: original.reference.clone(),
            amount: original.amount,
            status: TransactionStatus::Posted,
            fiscal_year_id: None,
            fiscal_period_id: None,
            created_by: voided_by,
            created_at: now,
            submitted_by: None,
            submitted_at: None,
            approved_by: Some(voided_by),
            approved_at: Some(now),
            approval_notes: None,
            rejection_reason: None,
            posted_by: Some(voided_by),
            posted_at: Some(now),
            voided_by: None,
            voided_at: None,
            void_reason: None,
            reversal_of: Some(original.id),
            reversed_by: None,
            entries,
            version: 0,
        }
    }

    /// Validate that original entries are balanced.
    ///
    /// Always true for a posted transaction; checked before reversing.
    #[must_use]
    pub fn validate_reversal(original_entries: &[TransactionEntry]) -> bool {
        let total_debit: Decimal = original_entries.iter().map(|e| e.debit).sum();
        let total_credit: Decimal = original_entries.iter().map(|e| e.credit).sum();

        total_debit == total_credit
    }
}
