//! Fund service: allocation checks, transfers, posting guards and reconciliation.
//!
//! A fund's balance change per entry is `credit - debit`, so a transfer-out
//! debit lowers the source fund and a transfer-in credit raises the
//! destination.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use tally_shared::types::FundId;

use super::error::FundError;
use super::types::{CreateFundInput, Fund, FundReconciliation, TransferInput};
use crate::ledger::{CreateTransactionInput, EntryInput, Transaction, TransactionType};

/// Stateless fund accounting service.
pub struct FundService;

impl FundService {
    /// Build a new fund with a zero balance.
    ///
    /// # Errors
    ///
    /// Returns `InvalidValidityWindow` if `valid_to < valid_from`.
    pub fn create_fund(input: CreateFundInput) -> Result<Fund, FundError> {
        if let (Some(from), Some(to)) = (input.valid_from, input.valid_to) {
            if to < from {
                return Err(FundError::InvalidValidityWindow);
            }
        }

        Ok(Fund {
            id: FundId::new(),
            name: input.name,
            fund_type: input.fund_type,
            balance: Decimal::ZERO,
            restriction: input.restriction,
            valid_from: input.valid_from,
            valid_to: input.valid_to,
            is_active: true,
            version: 0,
        })
    }

    /// Net change per fund (`credit - debit`) across fund-tagged input lines.
    #[must_use]
    pub fn fund_changes(entries: &[EntryInput]) -> BTreeMap<FundId, Decimal> {
        let mut changes = BTreeMap::new();
        for entry in entries {
            if let Some(fund_id) = entry.fund_id {
                *changes.entry(fund_id).or_insert(Decimal::ZERO) += entry.credit - entry.debit;
            }
        }
        changes
    }

    /// Validate an allocation.
    ///
    /// Every entry must carry an existing, active fund. For each restricted
    /// fund the entry date must sit inside its validity window, and the
    /// fund's balance as of `date` plus the net change must stay non-negative.
    ///
    /// # Arguments
    ///
    /// * `entries` - The allocation lines
    /// * `date` - The transaction date
    /// * `fund_lookup` - Resolves a fund by ID
    /// * `balance_as_of` - Fund balance from posted entries dated on or before `date`
    ///
    /// # Errors
    ///
    /// Returns `MissingFundTag`, `FundNotFound`, `FundInactive`,
    /// `OutsideValidityWindow` or `InsufficientFundBalance`.
    pub fn validate_allocation<'a, F, B>(
        entries: &[EntryInput],
        date: NaiveDate,
        fund_lookup: F,
        balance_as_of: B,
    ) -> Result<(), FundError>
    where
        F: Fn(FundId) -> Option<&'a Fund>,
        B: Fn(FundId) -> Decimal,
    {
        for (line, entry) in entries.iter().enumerate() {
            let fund_id = entry.fund_id.ok_or(FundError::MissingFundTag { line })?;
            let fund = fund_lookup(fund_id).ok_or(FundError::FundNotFound(fund_id))?;
            if !fund.is_active {
                return Err(FundError::FundInactive(fund_id));
            }
        }

        for (fund_id, change) in Self::fund_changes(entries) {
            let fund = fund_lookup(fund_id).ok_or(FundError::FundNotFound(fund_id))?;
            if !fund.is_restricted() {
                continue;
            }
            if !fund.is_valid_on(date) {
                return Err(FundError::OutsideValidityWindow { fund_id, date });
            }
            let available = balance_as_of(fund_id);
            if available + change < Decimal::ZERO {
                return Err(FundError::InsufficientFundBalance {
                    fund_id,
                    available,
                    requested: -change,
                });
            }
        }

        Ok(())
    }

    /// Build the balanced two-entry transaction input for a transfer.
    ///
    /// Debits the transfer-out account in the source fund and credits the
    /// transfer-in account in the destination fund.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransferAmount`, `SameFundTransfer`, `FundInactive`, or
    /// `InsufficientFundBalance` when a restricted source cannot cover the
    /// amount from its current balance.
    pub fn transfer(
        input: &TransferInput,
        source: &Fund,
        destination: &Fund,
    ) -> Result<CreateTransactionInput, FundError> {
        if input.amount <= Decimal::ZERO {
            return Err(FundError::InvalidTransferAmount(input.amount));
        }
        if source.id == destination.id {
            return Err(FundError::SameFundTransfer);
        }
        for fund in [source, destination] {
            if !fund.is_active {
                return Err(FundError::FundInactive(fund.id));
            }
        }
        if source.is_restricted() && input.amount > source.balance {
            return Err(FundError::InsufficientFundBalance {
                fund_id: source.id,
                available: source.balance,
                requested: input.amount,
            });
        }

        Ok(CreateTransactionInput {
            transaction_type: TransactionType::FundTransfer,
            date: input.date,
            description: input.description.clone(),
            reference: None,
            entries: vec![
                EntryInput::debit(input.transfer_out_account_id, input.amount)
                    .with_fund(Some(source.id))
                    .with_memo(format!("Transfer out to {}", destination.name)),
                EntryInput::credit(input.transfer_in_account_id, input.amount)
                    .with_fund(Some(destination.id))
                    .with_memo(format!("Transfer in from {}", source.name)),
            ],
            created_by: input.created_by,
        })
    }

    /// Check that applying `changes` keeps every restricted fund non-negative.
    ///
    /// Used when posting and when posting a reversal; unknown funds are
    /// reported as not found.
    ///
    /// # Errors
    ///
    /// Returns `RestrictedFundOverdrawn` or `FundNotFound`.
    pub fn check_posting<'a, F>(
        changes: &BTreeMap<FundId, Decimal>,
        fund_lookup: F,
    ) -> Result<(), FundError>
    where
        F: Fn(FundId) -> Option<&'a Fund>,
    {
        for (&fund_id, &change) in changes {
            let fund = fund_lookup(fund_id).ok_or(FundError::FundNotFound(fund_id))?;
            if fund.is_restricted() && fund.balance + change < Decimal::ZERO {
                return Err(FundError::RestrictedFundOverdrawn {
                    fund_id,
                    balance: fund.balance,
                    change,
                });
            }
        }
        Ok(())
    }

    /// Fund balance recomputed from balance-affecting entries dated on or before `as_of`.
    #[must_use]
    pub fn compute_balance<'a, I>(fund_id: FundId, transactions: I, as_of: NaiveDate) -> Decimal
    where
        I: IntoIterator<Item = &'a Transaction>,
    {
        transactions
            .into_iter()
            .filter(|t| t.affects_balances() && t.date <= as_of)
            .flat_map(|t| t.entries.iter())
            .filter(|e| e.fund_id == Some(fund_id))
            .map(|e| e.fund_change())
            .sum()
    }

    /// Compare a fund's stored running balance with its recomputed balance.
    ///
    /// Discrepancies are reported, never corrected.
    #[must_use]
    pub fn reconcile(
        fund: &Fund,
        computed_balance: Decimal,
        as_of: NaiveDate,
    ) -> FundReconciliation {
        let discrepancy = fund.balance - computed_balance;
        FundReconciliation {
            fund_id: fund.id,
            as_of,
            computed_balance,
            stored_balance: fund.balance,
            discrepancy,
            is_reconciled: discrepancy.is_zero(),
        }
    }
}
