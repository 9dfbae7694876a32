//! Bank account, statement line and reconciliation repository.
//!
//! Everything that touches the candidate pool or a reconciliation runs under
//! the bank account lock, so one ledger transaction is never matched to two
//! bank lines.

use std::collections::{HashMap, HashSet};

use chrono::{NaiveDate, TimeDelta};
use rust_decimal::Decimal;
use tracing::{debug, info};

use tally_core::ledger::{LedgerError, net_balance_as_of};
use tally_core::reconciliation::matcher::{apply_decision, auto_match, candidate_pool};
use tally_core::reconciliation::{
    AdjustmentKind, BankAccount, BankReconciliation, BankTransaction, BankTransactionInput,
    MatchStatus, ReconciliationError, ReconciliationService, ReconciliationStatus,
    ReconciliationSummary, StartReconciliationInput,
};
use tally_core::workflow::TransactionStatus;
use tally_shared::types::{
    AccountId, BankAccountId, BankTransactionId, ReconciliationId, TransactionId, UserId,
};

use super::Context;
use crate::error::{EngineError, audited};
use crate::lock::LockKey;
use crate::store::{AccountStore, BankStore, ChangeSet, TransactionStore, UnitOfWork};

/// Ledger transactions already matched to a line of the account.
fn matched_ids<'a>(
    lines: impl IntoIterator<Item = &'a BankTransaction>,
    except: Option<BankTransactionId>,
) -> HashSet<TransactionId> {
    lines
        .into_iter()
        .filter(|l| l.match_status == MatchStatus::Matched && Some(l.id) != except)
        .filter_map(|l| l.matched_transaction_id)
        .collect()
}

fn widen(date: NaiveDate, days: i64) -> NaiveDate {
    date.checked_add_signed(TimeDelta::days(days))
        .unwrap_or(if days < 0 { NaiveDate::MIN } else { NaiveDate::MAX })
}

/// Reconciliation repository.
#[derive(Clone)]
pub struct ReconciliationRepository {
    ctx: Context,
}

impl ReconciliationRepository {
    pub(crate) fn new(ctx: Context) -> Self {
        Self { ctx }
    }

    /// Creates a bank account backed by a ledger cash account.
    pub async fn create_bank_account(
        &self,
        name: impl Into<String>,
        ledger_account_id: AccountId,
        institution: Option<String>,
    ) -> Result<BankAccount, EngineError> {
        if self.ctx.store.get_account(ledger_account_id).await?.is_none() {
            return Err(LedgerError::AccountNotFound(ledger_account_id).into());
        }

        let mut account = BankAccount::new(name, ledger_account_id, institution);
        let mut changes = ChangeSet::new();
        changes.put(&mut account);
        self.ctx.store.commit(changes).await?;

        info!(bank_account_id = %account.id, name = %account.name, "bank account created");
        Ok(account)
    }

    /// Fetches a bank account.
    pub async fn get_bank_account(&self, id: BankAccountId) -> Result<BankAccount, EngineError> {
        Ok(self
            .ctx
            .store
            .get_bank_account(id)
            .await?
            .ok_or(ReconciliationError::BankAccountNotFound(id))?)
    }

    /// Ingests already-mapped statement lines as UNMATCHED, all or nothing.
    pub async fn record_bank_transactions(
        &self,
        batch: Vec<BankTransactionInput>,
    ) -> Result<Vec<BankTransaction>, EngineError> {
        let _locks = self
            .ctx
            .locks
            .acquire_all(batch.iter().map(|i| LockKey::BankAccount(i.bank_account_id)))
            .await;

        let mut changes = ChangeSet::new();
        let mut recorded = Vec::with_capacity(batch.len());
        for input in batch {
            let account = self.get_bank_account(input.bank_account_id).await?;
            let mut line = ReconciliationService::record_bank_transaction(&account, input)?;
            changes.put(&mut line);
            recorded.push(line);
        }
        self.ctx.store.commit(changes).await?;

        info!(count = recorded.len(), "bank transactions recorded");
        Ok(recorded)
    }

    /// Fetches a statement line.
    pub async fn get_bank_transaction(
        &self,
        id: BankTransactionId,
    ) -> Result<BankTransaction, EngineError> {
        Ok(self
            .ctx
            .store
            .get_bank_transaction(id)
            .await?
            .ok_or(ReconciliationError::BankTransactionNotFound(id))?)
    }

    /// Lists a bank account's statement lines in (date, id) order.
    pub async fn list_bank_transactions(
        &self,
        bank_account_id: BankAccountId,
    ) -> Result<Vec<BankTransaction>, EngineError> {
        Ok(self.ctx.store.list_bank_transactions(bank_account_id).await?)
    }

    /// Starts an IN_PROGRESS reconciliation; one per bank account at a time.
    pub async fn start_reconciliation(
        &self,
        input: StartReconciliationInput,
    ) -> Result<BankReconciliation, EngineError> {
        let _locks = self
            .ctx
            .locks
            .acquire_all([LockKey::BankAccount(input.bank_account_id)])
            .await;

        let account = self.get_bank_account(input.bank_account_id).await?;
        let has_open = self
            .ctx
            .store
            .list_reconciliations(account.id)
            .await?
            .iter()
            .any(|r| r.status == ReconciliationStatus::InProgress);

        let mut reconciliation = ReconciliationService::start(input, has_open)?;
        let mut changes = ChangeSet::new();
        changes.put(&mut reconciliation);
        self.ctx.store.commit(changes).await?;

        info!(
            reconciliation_id = %reconciliation.id,
            bank_account_id = %account.id,
            period_start = %reconciliation.period_start,
            period_end = %reconciliation.period_end,
            "reconciliation started"
        );
        Ok(reconciliation)
    }

    /// Fetches a reconciliation.
    pub async fn get_reconciliation(
        &self,
        id: ReconciliationId,
    ) -> Result<BankReconciliation, EngineError> {
        Ok(self
            .ctx
            .store
            .get_reconciliation(id)
            .await?
            .ok_or(ReconciliationError::ReconciliationNotFound(id))?)
    }

    /// Lists a bank account's reconciliations.
    pub async fn list_reconciliations(
        &self,
        bank_account_id: BankAccountId,
    ) -> Result<Vec<BankReconciliation>, EngineError> {
        Ok(self.ctx.store.list_reconciliations(bank_account_id).await?)
    }

    /// Runs the matcher over the period's open lines and returns them.
    ///
    /// Candidates are posted cash transactions dated within the period widened
    /// by the date tolerance and not already matched to another line.
    pub async fn auto_match(
        &self,
        id: ReconciliationId,
    ) -> Result<Vec<BankTransaction>, EngineError> {
        let bank_account_id = self.get_reconciliation(id).await?.bank_account_id;
        let _locks = self
            .ctx
            .locks
            .acquire_all([LockKey::BankAccount(bank_account_id)])
            .await;

        let reconciliation = self.get_reconciliation(id).await?;
        ReconciliationService::ensure_in_progress(&reconciliation)?;
        let account = self.get_bank_account(bank_account_id).await?;

        let lines = self.ctx.store.list_bank_transactions(bank_account_id).await?;
        let already_matched = matched_ids(&lines, None);
        let mut in_period: Vec<BankTransaction> = lines
            .into_iter()
            .filter(|l| reconciliation.contains_date(l.date) && l.reconciliation_id.is_none())
            .collect();

        let tolerance = self.ctx.settings.reconciliation_date_tolerance_days;
        let transactions = self.ctx.store.list_transactions().await?;
        let pool = candidate_pool(
            account.ledger_account_id,
            &transactions,
            widen(reconciliation.period_start, -tolerance),
            widen(reconciliation.period_end, tolerance),
            &already_matched,
        );
        let outcomes = auto_match(&in_period, pool, tolerance);

        let mut changes = ChangeSet::new();
        for outcome in &outcomes {
            let Some(line) = in_period
                .iter_mut()
                .find(|l| l.id == outcome.bank_transaction_id)
            else {
                continue;
            };
            let before = line.clone();
            apply_decision(line, &outcome.decision);
            debug!(
                bank_transaction_id = %line.id,
                amount = %line.amount,
                decision = ?outcome.decision,
                "match decision"
            );
            if *line != before {
                changes.put(line);
            }
        }
        changes.guard(&reconciliation);
        self.ctx.store.commit(changes).await?;

        let matched = in_period
            .iter()
            .filter(|l| l.match_status == MatchStatus::Matched)
            .count();
        info!(reconciliation_id = %id, lines = in_period.len(), matched, "auto-match finished");
        Ok(in_period)
    }

    /// Matches a line to a ledger transaction by hand.
    pub async fn manually_match(
        &self,
        id: ReconciliationId,
        bank_transaction_id: BankTransactionId,
        ledger_transaction_id: TransactionId,
    ) -> Result<BankTransaction, EngineError> {
        let bank_account_id = self.get_reconciliation(id).await?.bank_account_id;
        let _locks = self
            .ctx
            .locks
            .acquire_all([LockKey::BankAccount(bank_account_id)])
            .await;

        let reconciliation = self.get_reconciliation(id).await?;
        let account = self.get_bank_account(bank_account_id).await?;
        let mut line = self.get_bank_transaction(bank_transaction_id).await?;
        let ledger = self
            .ctx
            .store
            .get_transaction(ledger_transaction_id)
            .await?
            .ok_or(LedgerError::TransactionNotFound(ledger_transaction_id))?;

        let lines = self.ctx.store.list_bank_transactions(bank_account_id).await?;
        let already_matched =
            matched_ids(&lines, Some(bank_transaction_id)).contains(&ledger_transaction_id);

        ReconciliationService::manual_match(
            &reconciliation,
            &mut line,
            &ledger,
            account.ledger_account_id,
            already_matched,
        )?;

        let mut changes = ChangeSet::new();
        changes.put(&mut line);
        changes.guard(&reconciliation);
        self.ctx.store.commit(changes).await?;

        info!(
            bank_transaction_id = %line.id,
            transaction_id = %ledger_transaction_id,
            "bank transaction matched manually"
        );
        Ok(line)
    }

    /// Excludes a non-ledger line, backing it out through an adjustment.
    pub async fn exclude_transaction(
        &self,
        id: ReconciliationId,
        bank_transaction_id: BankTransactionId,
        kind: AdjustmentKind,
        memo: impl Into<String>,
    ) -> Result<BankReconciliation, EngineError> {
        let memo = memo.into();
        self.with_line(id, bank_transaction_id, |reconciliation, line| {
            ReconciliationService::exclude(reconciliation, line, kind, memo)
        })
        .await
    }

    /// Returns a MATCHED or EXCLUDED line to UNMATCHED.
    pub async fn reset_transaction_match(
        &self,
        id: ReconciliationId,
        bank_transaction_id: BankTransactionId,
    ) -> Result<BankReconciliation, EngineError> {
        self.with_line(id, bank_transaction_id, ReconciliationService::reset_match)
            .await
    }

    /// Adds a statement adjustment not tied to a bank line.
    pub async fn add_adjustment(
        &self,
        id: ReconciliationId,
        kind: AdjustmentKind,
        amount: Decimal,
        memo: impl Into<String>,
    ) -> Result<BankReconciliation, EngineError> {
        let memo = memo.into();
        self.with_reconciliation(id, |reconciliation| {
            ReconciliationService::add_adjustment(reconciliation, kind, amount, memo).map(|_| ())
        })
        .await
    }

    /// Flags a line as NEEDS_REVIEW; auto-match skips it.
    pub async fn flag_for_review(
        &self,
        bank_transaction_id: BankTransactionId,
        note: impl Into<String>,
    ) -> Result<BankTransaction, EngineError> {
        let bank_account_id = self
            .get_bank_transaction(bank_transaction_id)
            .await?
            .bank_account_id;
        let _locks = self
            .ctx
            .locks
            .acquire_all([LockKey::BankAccount(bank_account_id)])
            .await;

        let mut line = self.get_bank_transaction(bank_transaction_id).await?;
        ReconciliationService::flag_for_review(&mut line, &note.into())?;
        let mut changes = ChangeSet::new();
        changes.put(&mut line);
        self.ctx.store.commit(changes).await?;
        Ok(line)
    }

    /// Balance summary of a reconciliation.
    pub async fn reconciliation_summary(
        &self,
        id: ReconciliationId,
    ) -> Result<ReconciliationSummary, EngineError> {
        let reconciliation = self.get_reconciliation(id).await?;
        let beginning = self.beginning_ledger_balance(&reconciliation).await?;
        let lines = self
            .ctx
            .store
            .list_bank_transactions(reconciliation.bank_account_id)
            .await?;
        Ok(ReconciliationService::summarize(&reconciliation, &lines, beginning))
    }

    /// Completes a balanced reconciliation and freezes its lines.
    ///
    /// # Errors
    ///
    /// Returns `OutstandingItems` while lines remain unresolved and
    /// `UnbalancedReconciliation` (audited) when the balances disagree.
    pub async fn complete_reconciliation(
        &self,
        id: ReconciliationId,
        completed_by: UserId,
    ) -> Result<ReconciliationSummary, EngineError> {
        audited(
            "complete_reconciliation",
            self.complete_inner(id, completed_by).await,
        )
    }

    /// Appends an audit note; allowed on completed reconciliations too.
    pub async fn add_audit_note(
        &self,
        id: ReconciliationId,
        note: impl Into<String>,
        author: UserId,
    ) -> Result<BankReconciliation, EngineError> {
        let bank_account_id = self.get_reconciliation(id).await?.bank_account_id;
        let _locks = self
            .ctx
            .locks
            .acquire_all([LockKey::BankAccount(bank_account_id)])
            .await;

        let mut reconciliation = self.get_reconciliation(id).await?;
        ReconciliationService::add_audit_note(&mut reconciliation, &note.into(), author)?;
        let mut changes = ChangeSet::new();
        changes.put(&mut reconciliation);
        self.ctx.store.commit(changes).await?;
        Ok(reconciliation)
    }

    async fn complete_inner(
        &self,
        id: ReconciliationId,
        completed_by: UserId,
    ) -> Result<ReconciliationSummary, EngineError> {
        let bank_account_id = self.get_reconciliation(id).await?.bank_account_id;
        let _locks = self
            .ctx
            .locks
            .acquire_all([LockKey::BankAccount(bank_account_id)])
            .await;

        let mut reconciliation = self.get_reconciliation(id).await?;
        let beginning = self.beginning_ledger_balance(&reconciliation).await?;
        let mut lines: Vec<BankTransaction> = self
            .ctx
            .store
            .list_bank_transactions(bank_account_id)
            .await?
            .into_iter()
            .filter(|l| reconciliation.contains_date(l.date))
            .collect();

        let statuses: HashMap<TransactionId, TransactionStatus> = self
            .ctx
            .store
            .list_transactions()
            .await?
            .into_iter()
            .map(|t| (t.id, t.status))
            .collect();

        let summary = ReconciliationService::complete(
            &mut reconciliation,
            &mut lines,
            beginning,
            |id| statuses.get(&id).copied(),
            completed_by,
        )?;

        let mut changes = ChangeSet::new();
        for line in &mut lines {
            changes.put(line);
        }
        changes.put(&mut reconciliation);
        self.ctx.store.commit(changes).await?;

        info!(
            reconciliation_id = %id,
            adjusted_statement_balance = %summary.adjusted_statement_balance,
            total_matched = %summary.total_matched,
            "reconciliation completed"
        );
        Ok(summary)
    }

    /// Cash-account ledger balance as of the day before the period.
    async fn beginning_ledger_balance(
        &self,
        reconciliation: &BankReconciliation,
    ) -> Result<Decimal, EngineError> {
        let Some(day_before) = reconciliation.period_start.pred_opt() else {
            return Ok(Decimal::ZERO);
        };
        let account = self.get_bank_account(reconciliation.bank_account_id).await?;
        let transactions = self.ctx.store.list_transactions().await?;
        Ok(net_balance_as_of(
            account.ledger_account_id,
            &transactions,
            day_before,
        ))
    }

    async fn with_reconciliation<F>(
        &self,
        id: ReconciliationId,
        change: F,
    ) -> Result<BankReconciliation, EngineError>
    where
        F: FnOnce(&mut BankReconciliation) -> Result<(), ReconciliationError>,
    {
        let bank_account_id = self.get_reconciliation(id).await?.bank_account_id;
        let _locks = self
            .ctx
            .locks
            .acquire_all([LockKey::BankAccount(bank_account_id)])
            .await;

        let mut reconciliation = self.get_reconciliation(id).await?;
        change(&mut reconciliation)?;
        let mut changes = ChangeSet::new();
        changes.put(&mut reconciliation);
        self.ctx.store.commit(changes).await?;
        Ok(reconciliation)
    }

    async fn with_line<F>(
        &self,
        id: ReconciliationId,
        bank_transaction_id: BankTransactionId,
        change: F,
    ) -> Result<BankReconciliation, EngineError>
    where
        F: FnOnce(&mut BankReconciliation, &mut BankTransaction) -> Result<(), ReconciliationError>,
    {
        let bank_account_id = self.get_reconciliation(id).await?.bank_account_id;
        let _locks = self
            .ctx
            .locks
            .acquire_all([LockKey::BankAccount(bank_account_id)])
            .await;

        let mut reconciliation = self.get_reconciliation(id).await?;
        let mut line = self.get_bank_transaction(bank_transaction_id).await?;
        change(&mut reconciliation, &mut line)?;

        let mut changes = ChangeSet::new();
        changes.put(&mut line);
        changes.put(&mut reconciliation);
        self.ctx.store.commit(changes).await?;
        Ok(reconciliation)
    }
}
