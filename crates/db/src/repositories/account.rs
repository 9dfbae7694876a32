//! Chart of accounts repository.

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::info;

use tally_core::ledger::{
    Account, AccountBalance, AccountType, LedgerError, account_balances, ensure_acyclic,
    net_balance_as_of,
};
use tally_shared::types::AccountId;

use super::Context;
use crate::error::EngineError;
use crate::lock::LockKey;
use crate::store::{AccountStore, ChangeSet, TransactionStore, UnitOfWork};

/// Account repository.
#[derive(Clone)]
pub struct AccountRepository {
    ctx: Context,
}

impl AccountRepository {
    pub(crate) fn new(ctx: Context) -> Self {
        Self { ctx }
    }

    /// Creates an active account.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateAccountNumber` or `ParentAccountNotFound`.
    pub async fn create_account(
        &self,
        number: impl Into<String>,
        name: impl Into<String>,
        account_type: AccountType,
        parent_id: Option<AccountId>,
    ) -> Result<Account, EngineError> {
        let _locks = self.ctx.locks.acquire_all([LockKey::Chart]).await;

        let number = number.into();
        let accounts = self.ctx.store.list_accounts().await?;
        if accounts.iter().any(|a| a.number == number) {
            return Err(LedgerError::DuplicateAccountNumber(number).into());
        }
        if let Some(parent_id) = parent_id {
            if !accounts.iter().any(|a| a.id == parent_id) {
                return Err(LedgerError::ParentAccountNotFound(parent_id).into());
            }
        }

        let mut account = Account::new(number, name, account_type, parent_id);
        let mut changes = ChangeSet::new();
        changes.put(&mut account);
        self.ctx.store.commit(changes).await?;

        info!(account_id = %account.id, number = %account.number, "account created");
        Ok(account)
    }

    /// Moves an account under a new parent, or to the top level.
    ///
    /// # Errors
    ///
    /// Returns `AccountHierarchyCycle` if the account would become its own ancestor.
    pub async fn reparent_account(
        &self,
        id: AccountId,
        new_parent: Option<AccountId>,
    ) -> Result<Account, EngineError> {
        let _locks = self.ctx.locks.acquire_all([LockKey::Chart]).await;

        let accounts: HashMap<AccountId, Account> = self
            .ctx
            .store
            .list_accounts()
            .await?
            .into_iter()
            .map(|a| (a.id, a))
            .collect();
        let mut account = accounts
            .get(&id)
            .cloned()
            .ok_or(LedgerError::AccountNotFound(id))?;

        if let Some(parent_id) = new_parent {
            if !accounts.contains_key(&parent_id) {
                return Err(LedgerError::ParentAccountNotFound(parent_id).into());
            }
            ensure_acyclic(id, parent_id, |a| accounts.get(&a).and_then(|x| x.parent_id))?;
        }

        account.parent_id = new_parent;
        let mut changes = ChangeSet::new();
        changes.put(&mut account);
        self.ctx.store.commit(changes).await?;
        Ok(account)
    }

    /// Deactivates an account; it stays in reports but rejects new entries.
    pub async fn deactivate_account(&self, id: AccountId) -> Result<Account, EngineError> {
        let _locks = self.ctx.locks.acquire_all([LockKey::Chart]).await;

        let mut account = self.get_account(id).await?;
        account.is_active = false;
        let mut changes = ChangeSet::new();
        changes.put(&mut account);
        self.ctx.store.commit(changes).await?;

        info!(account_id = %id, "account deactivated");
        Ok(account)
    }

    /// Fetches an account.
    pub async fn get_account(&self, id: AccountId) -> Result<Account, EngineError> {
        Ok(self
            .ctx
            .store
            .get_account(id)
            .await?
            .ok_or(LedgerError::AccountNotFound(id))?)
    }

    /// Lists the chart ordered by account number.
    pub async fn list_accounts(&self) -> Result<Vec<Account>, EngineError> {
        Ok(self.ctx.store.list_accounts().await?)
    }

    /// Signed debit-minus-credit balance of one account as of a date.
    pub async fn account_balance(
        &self,
        id: AccountId,
        as_of: NaiveDate,
    ) -> Result<Decimal, EngineError> {
        self.get_account(id).await?;
        let transactions = self.ctx.store.list_transactions().await?;
        Ok(net_balance_as_of(id, &transactions, as_of))
    }

    /// Per-account balances over `[from, to]`, ordered by number.
    pub async fn account_balances(
        &self,
        from: Option<NaiveDate>,
        to: NaiveDate,
    ) -> Result<Vec<AccountBalance>, EngineError> {
        let accounts = self.ctx.store.list_accounts().await?;
        let transactions = self.ctx.store.list_transactions().await?;
        Ok(account_balances(&accounts, &transactions, from, to))
    }
}
