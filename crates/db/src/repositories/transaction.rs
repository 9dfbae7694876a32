//! Ledger transaction repository.
//!
//! Owns the transaction lifecycle. The staging helpers here are shared by
//! every repository that posts or voids: documents, payments and fund
//! transfers all go through [`stage_post`] and [`stage_void`].

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::info;

use tally_core::document::{DocumentPaymentStatus, DocumentService};
use tally_core::fiscal::{FiscalService, FiscalYear};
use tally_core::fund::{FundError, FundService};
use tally_core::ledger::{Account, CreateTransactionInput, LedgerError, LedgerService, Transaction};
use tally_core::payment::PaymentError;
use tally_core::reconciliation::ReconciliationService;
use tally_core::workflow::{
    ReversalService, TransactionStatus, WorkflowAction, WorkflowError, WorkflowService,
};
use tally_shared::types::{AccountId, BankAccountId, FundId, TransactionId, UserId};

use super::Context;
use super::document::{Document, load_document};
use crate::error::{EngineError, audited};
use crate::lock::{LockKey, LockSet};
use crate::store::{
    AccountStore, BankStore, ChangeSet, DocumentStore, FiscalStore, FundStore, PaymentStore,
    TransactionStore, UnitOfWork,
};

/// Loads the chart of accounts keyed by ID.
pub(crate) async fn account_map(ctx: &Context) -> Result<HashMap<AccountId, Account>, EngineError> {
    Ok(ctx
        .store
        .list_accounts()
        .await?
        .into_iter()
        .map(|a| (a.id, a))
        .collect())
}

/// Records the fiscal year and period containing the transaction date.
pub(crate) fn assign_fiscal_period(transaction: &mut Transaction, years: &[FiscalYear]) {
    let located = FiscalService::locate(years, transaction.date);
    transaction.fiscal_year_id = located.map(|(year, _)| year.id);
    transaction.fiscal_period_id = located.map(|(_, period)| period.id);
}

/// A concurrent period close invalidates the commit.
fn guard_fiscal_year(years: &[FiscalYear], date: NaiveDate, changes: &mut ChangeSet) {
    if let Some((year, _)) = FiscalService::locate(years, date) {
        changes.guard(year);
    }
}

/// Rejects fund tags that reference unknown funds.
pub(crate) async fn ensure_funds_exist(
    ctx: &Context,
    fund_ids: impl IntoIterator<Item = Option<FundId>>,
) -> Result<(), EngineError> {
    let fund_ids: BTreeSet<FundId> = fund_ids.into_iter().flatten().collect();
    for fund_id in fund_ids {
        if ctx.store.get_fund(fund_id).await?.is_none() {
            return Err(FundError::FundNotFound(fund_id).into());
        }
    }
    Ok(())
}

/// Applies per-fund changes to running balances under the fund locks.
async fn stage_fund_changes(
    ctx: &Context,
    locks: &mut LockSet,
    fund_changes: &BTreeMap<FundId, Decimal>,
    changes: &mut ChangeSet,
) -> Result<(), EngineError> {
    if fund_changes.is_empty() {
        return Ok(());
    }
    locks
        .lock(fund_changes.keys().map(|id| LockKey::Fund(*id)))
        .await;

    let mut funds = HashMap::new();
    for &fund_id in fund_changes.keys() {
        let fund = ctx
            .store
            .get_fund(fund_id)
            .await?
            .ok_or(FundError::FundNotFound(fund_id))?;
        funds.insert(fund_id, fund);
    }

    FundService::check_posting(fund_changes, |id| funds.get(&id))?;

    for (fund_id, change) in fund_changes {
        if let Some(fund) = funds.get_mut(fund_id) {
            fund.balance += *change;
            changes.put(fund);
        }
    }
    Ok(())
}

/// Stages the posting of `transaction`.
///
/// Returns `false` without staging anything when it is already posted.
///
/// # Errors
///
/// Returns `InvalidTransition` unless approved, `PeriodClosed` for a closed
/// period and `RestrictedFundOverdrawn` if a restricted fund would go
/// negative.
pub(crate) async fn stage_post(
    ctx: &Context,
    locks: &mut LockSet,
    transaction: &mut Transaction,
    posted_by: UserId,
    changes: &mut ChangeSet,
) -> Result<bool, EngineError> {
    let Some(action) = WorkflowService::post(transaction.status, posted_by)? else {
        return Ok(false);
    };

    let years = ctx.store.list_fiscal_years().await?;
    FiscalService::ensure_open_for_posting(&years, transaction.date)?;
    stage_fund_changes(ctx, locks, &transaction.fund_changes(), changes).await?;

    assign_fiscal_period(transaction, &years);
    guard_fiscal_year(&years, transaction.date, changes);
    transaction.apply(&action);
    changes.put(transaction);
    Ok(true)
}

/// Rejects the void while a bank line of any account on the transaction's
/// cash accounts is still matched to it.
async fn ensure_not_matched(
    ctx: &Context,
    locks: &mut LockSet,
    transaction: &Transaction,
) -> Result<(), EngineError> {
    let bank_accounts: Vec<BankAccountId> = ctx
        .store
        .list_bank_accounts()
        .await?
        .into_iter()
        .filter(|a| transaction.touches_account(a.ledger_account_id))
        .map(|a| a.id)
        .collect();
    if bank_accounts.is_empty() {
        return Ok(());
    }
    locks
        .lock(bank_accounts.iter().map(|id| LockKey::BankAccount(*id)))
        .await;

    for bank_account_id in bank_accounts {
        let lines = ctx.store.list_bank_transactions(bank_account_id).await?;
        ReconciliationService::ensure_not_matched(transaction.id, &lines)?;
    }
    Ok(())
}

/// Stages the void of `transaction`, returning the reversal if one was needed.
///
/// A posted transaction is reversed on its own date; the reversal is posted
/// and moves fund balances back. A posted transaction still matched to a bank
/// line is rejected with `LedgerTransactionMatched`.
pub(crate) async fn stage_void(
    ctx: &Context,
    locks: &mut LockSet,
    transaction: &mut Transaction,
    voided_by: UserId,
    reason: &str,
    changes: &mut ChangeSet,
) -> Result<Option<Transaction>, EngineError> {
    let action = WorkflowService::void(transaction.status, voided_by, reason.to_string())?;

    let mut reversal = None;
    if transaction.status == TransactionStatus::Posted {
        let years = ctx.store.list_fiscal_years().await?;
        FiscalService::ensure_open_for_posting(&years, transaction.date)?;

        let mut reversing = ReversalService::create_reversing_transaction(
            transaction,
            voided_by,
            reason,
            transaction.date,
        );
        stage_fund_changes(ctx, locks, &reversing.fund_changes(), changes).await?;
        ensure_not_matched(ctx, locks, transaction).await?;
        assign_fiscal_period(&mut reversing, &years);
        guard_fiscal_year(&years, reversing.date, changes);

        transaction.reversed_by = Some(reversing.id);
        changes.put(&mut reversing);
        reversal = Some(reversing);
    }

    transaction.apply(&action);
    changes.put(transaction);
    Ok(reversal)
}

/// Transaction repository.
#[derive(Clone)]
pub struct TransactionRepository {
    ctx: Context,
}

impl TransactionRepository {
    pub(crate) fn new(ctx: Context) -> Self {
        Self { ctx }
    }

    /// Creates a DRAFT transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Entries are empty, unbalanced or have invalid sides
    /// - An account is unknown or inactive
    /// - A fund tag references an unknown fund
    pub async fn create_transaction(
        &self,
        input: CreateTransactionInput,
    ) -> Result<Transaction, EngineError> {
        let accounts = account_map(&self.ctx).await?;
        let mut transaction = LedgerService::create_transaction(input, |id| accounts.get(&id))?;
        ensure_funds_exist(&self.ctx, transaction.entries.iter().map(|e| e.fund_id)).await?;

        let years = self.ctx.store.list_fiscal_years().await?;
        assign_fiscal_period(&mut transaction, &years);

        let mut changes = ChangeSet::new();
        changes.put(&mut transaction);
        self.ctx.store.commit(changes).await?;

        info!(
            transaction_id = %transaction.id,
            amount = %transaction.amount,
            "transaction created"
        );
        Ok(transaction)
    }

    /// Fetches a transaction.
    pub async fn get_transaction(&self, id: TransactionId) -> Result<Transaction, EngineError> {
        Ok(self
            .ctx
            .store
            .get_transaction(id)
            .await?
            .ok_or(LedgerError::TransactionNotFound(id))?)
    }

    /// Lists every transaction, ordered by date.
    pub async fn list_transactions(&self) -> Result<Vec<Transaction>, EngineError> {
        Ok(self.ctx.store.list_transactions().await?)
    }

    /// DRAFT → PENDING_APPROVAL.
    pub async fn submit(
        &self,
        id: TransactionId,
        submitted_by: UserId,
    ) -> Result<Transaction, EngineError> {
        self.transition(id, |t| WorkflowService::submit(t.status, submitted_by))
            .await
    }

    /// DRAFT or PENDING_APPROVAL → APPROVED.
    pub async fn approve(
        &self,
        id: TransactionId,
        approved_by: UserId,
        approval_notes: Option<String>,
    ) -> Result<Transaction, EngineError> {
        self.transition(id, |t| {
            WorkflowService::approve(t.status, approved_by, approval_notes)
        })
        .await
    }

    /// PENDING_APPROVAL → DRAFT with a reason.
    pub async fn reject(
        &self,
        id: TransactionId,
        reason: impl Into<String>,
    ) -> Result<Transaction, EngineError> {
        let reason = reason.into();
        self.transition(id, |t| WorkflowService::reject(t.status, reason))
            .await
    }

    /// APPROVED → POSTED. Posting a POSTED transaction is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Transaction is not found or not approved
    /// - The containing fiscal period is closed
    /// - A restricted fund would be driven negative (audited)
    pub async fn post(
        &self,
        id: TransactionId,
        posted_by: UserId,
    ) -> Result<Transaction, EngineError> {
        audited("post_transaction", self.post_inner(id, posted_by).await)
    }

    /// Voids a transaction, reversing it if it was posted.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The reason is blank or the transaction is already voided
    /// - It belongs to a document that has received payment
    /// - It settles a payment that is still applied (`SettlementOwnedByPayment`)
    /// - It is matched to a bank line (`LedgerTransactionMatched`)
    /// - The reversal would land in a closed period
    /// - The reversal would drive a restricted fund negative (audited)
    pub async fn void(
        &self,
        id: TransactionId,
        voided_by: UserId,
        reason: impl Into<String>,
    ) -> Result<Transaction, EngineError> {
        let reason = reason.into();
        audited("void_transaction", self.void_inner(id, voided_by, &reason).await)
    }

    async fn lock_for_update(
        &self,
        id: TransactionId,
    ) -> Result<(LockSet, Transaction, Option<Document>), EngineError> {
        let owner = self.ctx.store.find_document_by_transaction(id).await?;
        let settles = self.ctx.store.find_payment_by_transaction(id).await?;
        let mut keys = vec![LockKey::Transaction(id)];
        keys.extend(owner.map(LockKey::Document));
        keys.extend(settles.map(|p| LockKey::Document(p.document)));
        let locks = self.ctx.locks.acquire_all(keys).await;

        let transaction = self.get_transaction(id).await?;
        let document = match owner {
            Some(reference) => load_document(&self.ctx, reference).await?,
            None => None,
        };
        Ok((locks, transaction, document))
    }

    async fn transition<F>(&self, id: TransactionId, decide: F) -> Result<Transaction, EngineError>
    where
        F: FnOnce(&Transaction) -> Result<WorkflowAction, WorkflowError>,
    {
        let (_locks, mut transaction, mut document) = self.lock_for_update(id).await?;
        let action = decide(&transaction)?;
        transaction.apply(&action);

        let mut changes = ChangeSet::new();
        changes.put(&mut transaction);
        if let Some(document) = document.as_mut() {
            document.set_transaction(transaction.clone());
            document.stage(&mut changes);
        }
        self.ctx.store.commit(changes).await?;

        info!(
            transaction_id = %transaction.id,
            status = %transaction.status,
            "transaction status changed"
        );
        Ok(transaction)
    }

    async fn post_inner(
        &self,
        id: TransactionId,
        posted_by: UserId,
    ) -> Result<Transaction, EngineError> {
        let (mut locks, mut transaction, mut document) = self.lock_for_update(id).await?;

        let mut changes = ChangeSet::new();
        if !stage_post(&self.ctx, &mut locks, &mut transaction, posted_by, &mut changes).await? {
            return Ok(transaction);
        }
        if let Some(document) = document.as_mut() {
            document.set_transaction(transaction.clone());
            document.stage(&mut changes);
        }
        self.ctx.store.commit(changes).await?;

        info!(
            transaction_id = %transaction.id,
            amount = %transaction.amount,
            "transaction posted"
        );
        Ok(transaction)
    }

    async fn void_inner(
        &self,
        id: TransactionId,
        voided_by: UserId,
        reason: &str,
    ) -> Result<Transaction, EngineError> {
        let (mut locks, mut transaction, mut document) = self.lock_for_update(id).await?;
        let settled = self.ctx.store.find_payment_by_transaction(id).await?;
        if let Some(payment) = settled.filter(|p| p.status.is_applied()) {
            return Err(PaymentError::SettlementOwnedByPayment {
                transaction_id: id,
                payment_id: payment.id,
            }
            .into());
        }
        if let Some(document) = &document {
            DocumentService::ensure_voidable(document.header())?;
        }

        let mut changes = ChangeSet::new();
        let reversal = stage_void(
            &self.ctx,
            &mut locks,
            &mut transaction,
            voided_by,
            reason,
            &mut changes,
        )
        .await?;
        if let Some(document) = document.as_mut() {
            document.header_mut().payment_status = DocumentPaymentStatus::Voided;
            document.set_transaction(transaction.clone());
            document.stage(&mut changes);
        }
        self.ctx.store.commit(changes).await?;

        info!(
            transaction_id = %transaction.id,
            reversal_id = ?reversal.map(|r| r.id),
            "transaction voided"
        );
        Ok(transaction)
    }
}
