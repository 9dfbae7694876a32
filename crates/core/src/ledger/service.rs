//! Ledger service for transaction validation and construction.
//!
//! This module provides the core business logic for validating and building
//! financial transactions before they are handed to the store.

use chrono::Utc;
use tally_shared::types::{AccountId, TransactionId};

use super::account::Account;
use super::entry::TransactionEntry;
use super::error::LedgerError;
use super::transaction::Transaction;
use super::types::{CreateTransactionInput, EntryInput, TransactionTotals};
use super::validation::validate_entries;
use crate::workflow::TransactionStatus;

/// Ledger service for transaction validation and construction.
///
/// This service contains pure business logic with no storage dependencies.
pub struct LedgerService;

impl LedgerService {
    /// Validate the input and build a new DRAFT transaction.
    ///
    /// Steps:
    /// 1. Validates entries (non-empty, one non-negative side each, balanced)
    /// 2. Validates accounts (exist, active)
    /// 3. Materializes entries and totals
    ///
    /// # Arguments
    ///
    /// * `input` - The transaction input to validate
    /// * `account_lookup` - Resolves an account by ID
    ///
    /// # Errors
    ///
    /// Returns `LedgerError` if validation fails; nothing is built.
    pub fn create_transaction<'a, A>(
        input: CreateTransactionInput,
        account_lookup: A,
    ) -> Result<Transaction, LedgerError>
    where
        A: Fn(AccountId) -> Option<&'a Account>,
    {
        let totals = Self::validate(&input.entries, account_lookup)?;

        Ok(Transaction {
            id: TransactionId::new(),
            transaction_type: input.transaction_type,
            date: input.date,
            description: input.description,
            reference: input.reference,
            amount: totals.total_debit,
            status: TransactionStatus::Draft,
            fiscal_year_id: None,
            fiscal_period_id: None,
            created_by: input.created_by,
            created_at: Utc::now(),
            submitted_by: None,
            submitted_at: None,
            approved_by: None,
            approved_at: None,
            approval_notes: None,
            rejection_reason: None,
            posted_by: None,
            posted_at: None,
            voided_by: None,
            voided_at: None,
            void_reason: None,
            reversal_of: None,
            reversed_by: None,
            entries: input.entries.iter().map(TransactionEntry::from_input).collect(),
            version: 0,
        })
    }

    /// Validate entries and the accounts they reference.
    ///
    /// # Errors
    ///
    /// Returns the first entry or account violation found.
    pub fn validate<'a, A>(
        entries: &[EntryInput],
        account_lookup: A,
    ) -> Result<TransactionTotals, LedgerError>
    where
        A: Fn(AccountId) -> Option<&'a Account>,
    {
        let totals = validate_entries(entries)?;

        for entry in entries {
            account_lookup(entry.account_id)
                .ok_or(LedgerError::AccountNotFound(entry.account_id))?
                .ensure_postable()?;
        }

        Ok(totals)
    }

    /// Ensure a transaction's content may still change.
    ///
    /// # Errors
    ///
    /// Returns `CannotModifyPosted` or `CannotModifyVoided`.
    pub fn ensure_modifiable(status: TransactionStatus) -> Result<(), LedgerError> {
        match status {
            TransactionStatus::Posted => Err(LedgerError::CannotModifyPosted),
            TransactionStatus::Voided => Err(LedgerError::CannotModifyVoided),
            _ => Ok(()),
        }
    }
}
