//! Fund repository: allocations, transfers and reconciliation.

use std::collections::HashMap;

use chrono::NaiveDate;
use tracing::{info, warn};

use tally_core::fund::{
    CreateFundInput, Fund, FundError, FundReconciliation, FundService, TransferInput,
};
use tally_core::ledger::{CreateTransactionInput, LedgerService, Transaction};
use tally_core::workflow::WorkflowService;
use tally_shared::types::FundId;

use super::Context;
use super::transaction::{account_map, assign_fiscal_period, stage_post};
use crate::error::{EngineError, audited};
use crate::lock::LockKey;
use crate::store::{ChangeSet, FiscalStore, FundStore, TransactionStore, UnitOfWork};

/// Fund repository.
#[derive(Clone)]
pub struct FundRepository {
    ctx: Context,
}

impl FundRepository {
    pub(crate) fn new(ctx: Context) -> Self {
        Self { ctx }
    }

    /// Creates an active fund with a zero balance.
    pub async fn create_fund(&self, input: CreateFundInput) -> Result<Fund, EngineError> {
        let mut fund = FundService::create_fund(input)?;
        let mut changes = ChangeSet::new();
        changes.put(&mut fund);
        self.ctx.store.commit(changes).await?;

        info!(fund_id = %fund.id, name = %fund.name, fund_type = ?fund.fund_type, "fund created");
        Ok(fund)
    }

    /// Fetches a fund.
    pub async fn get_fund(&self, id: FundId) -> Result<Fund, EngineError> {
        Ok(self
            .ctx
            .store
            .get_fund(id)
            .await?
            .ok_or(FundError::FundNotFound(id))?)
    }

    /// Lists every fund.
    pub async fn list_funds(&self) -> Result<Vec<Fund>, EngineError> {
        Ok(self.ctx.store.list_funds().await?)
    }

    /// Creates a DRAFT transaction whose entries are all fund-tagged.
    ///
    /// Restricted funds are checked against their balance as of the
    /// transaction date, not the current running balance.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - An entry has no fund, or the fund is unknown or inactive
    /// - A restricted fund would go negative as of the date (audited)
    /// - The date falls outside a restricted fund's validity window
    /// - The entries fail ledger validation
    pub async fn allocate(
        &self,
        input: CreateTransactionInput,
    ) -> Result<Transaction, EngineError> {
        audited("allocate", self.allocate_inner(input).await)
    }

    async fn allocate_inner(
        &self,
        input: CreateTransactionInput,
    ) -> Result<Transaction, EngineError> {
        let fund_ids: Vec<FundId> = input.entries.iter().filter_map(|e| e.fund_id).collect();
        let _locks = self
            .ctx
            .locks
            .acquire_all(fund_ids.iter().map(|id| LockKey::Fund(*id)))
            .await;

        let mut funds = HashMap::new();
        for fund_id in fund_ids {
            if let Some(fund) = self.ctx.store.get_fund(fund_id).await? {
                funds.insert(fund_id, fund);
            }
        }
        let transactions = self.ctx.store.list_transactions().await?;

        FundService::validate_allocation(
            &input.entries,
            input.date,
            |id| funds.get(&id),
            |id| FundService::compute_balance(id, &transactions, input.date),
        )?;

        let accounts = account_map(&self.ctx).await?;
        let mut transaction = LedgerService::create_transaction(input, |id| accounts.get(&id))?;
        let years = self.ctx.store.list_fiscal_years().await?;
        assign_fiscal_period(&mut transaction, &years);

        let mut changes = ChangeSet::new();
        changes.put(&mut transaction);
        self.ctx.store.commit(changes).await?;

        info!(
            transaction_id = %transaction.id,
            amount = %transaction.amount,
            "fund allocation created"
        );
        Ok(transaction)
    }

    /// Moves money between funds with a system-posted transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Either fund is unknown or inactive, or both are the same
    /// - The amount is not positive
    /// - A restricted source cannot cover the amount (audited)
    /// - The date falls in a closed period
    pub async fn transfer(&self, input: TransferInput) -> Result<Transaction, EngineError> {
        audited("transfer", self.transfer_inner(input).await)
    }

    async fn transfer_inner(&self, input: TransferInput) -> Result<Transaction, EngineError> {
        if input.source_fund_id == input.destination_fund_id {
            return Err(FundError::SameFundTransfer.into());
        }
        let mut locks = self
            .ctx
            .locks
            .acquire_all([
                LockKey::Fund(input.source_fund_id),
                LockKey::Fund(input.destination_fund_id),
            ])
            .await;

        let source = self.get_fund(input.source_fund_id).await?;
        let destination = self.get_fund(input.destination_fund_id).await?;
        let request = FundService::transfer(&input, &source, &destination)?;

        let accounts = account_map(&self.ctx).await?;
        let mut transaction = LedgerService::create_transaction(request, |id| accounts.get(&id))?;
        let approval = WorkflowService::approve(transaction.status, input.created_by, None)?;
        transaction.apply(&approval);

        let mut changes = ChangeSet::new();
        stage_post(
            &self.ctx,
            &mut locks,
            &mut transaction,
            input.created_by,
            &mut changes,
        )
        .await?;
        self.ctx.store.commit(changes).await?;

        info!(
            transaction_id = %transaction.id,
            source_fund_id = %source.id,
            destination_fund_id = %destination.id,
            amount = %input.amount,
            "fund transfer posted"
        );
        Ok(transaction)
    }

    /// Compares the stored running balance with one recomputed from posted entries.
    ///
    /// A discrepancy is reported and logged, never corrected.
    pub async fn reconcile_fund(
        &self,
        fund_id: FundId,
        as_of: NaiveDate,
    ) -> Result<FundReconciliation, EngineError> {
        let fund = self.get_fund(fund_id).await?;
        let transactions = self.ctx.store.list_transactions().await?;
        let computed = FundService::compute_balance(fund_id, &transactions, as_of);
        let result = FundService::reconcile(&fund, computed, as_of);

        if !result.is_reconciled {
            warn!(
                fund_id = %fund_id,
                stored = %result.stored_balance,
                computed = %result.computed_balance,
                discrepancy = %result.discrepancy,
                "fund balance discrepancy"
            );
        }
        Ok(result)
    }
}
