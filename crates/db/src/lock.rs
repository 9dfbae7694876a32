//! Per-key pessimistic locks.
//!
//! Every read-modify-write in the repositories runs under the locks of the
//! aggregates it changes. Keys are always taken in [`LockKey`] order, which
//! rules out lock-order deadlocks between operations.

use std::collections::BTreeMap;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

use tally_core::document::{Counterparty, DocumentRef};
use tally_shared::types::{BankAccountId, FundId, TemplateId, TransactionId};

/// A lockable resource.
///
/// The derived ordering is the global acquisition order: documents, then
/// counterparties, transactions, funds, bank accounts, templates, and
/// finally the chart of accounts and the fiscal calendar as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LockKey {
    /// A bill or invoice (payment application).
    Document(DocumentRef),
    /// A vendor or customer (YTD counters, document numbers).
    Counterparty(Counterparty),
    /// A ledger transaction (lifecycle changes).
    Transaction(TransactionId),
    /// A fund (running balance).
    Fund(FundId),
    /// A bank account (matching and reconciliation runs).
    BankAccount(BankAccountId),
    /// A recurring template (generation counters).
    Template(TemplateId),
    /// The chart of accounts (numbers and hierarchy).
    Chart,
    /// The fiscal calendar (years and period closing).
    FiscalCalendar,
}

/// Shared registry of per-key mutexes.
#[derive(Debug, Clone, Default)]
pub struct LockRegistry {
    locks: Arc<DashMap<LockKey, Arc<Mutex<()>>>>,
}

impl LockRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn mutex(&self, key: LockKey) -> Arc<Mutex<()>> {
        self.locks.entry(key).or_default().clone()
    }

    /// Starts an empty lock set bound to this registry.
    #[must_use]
    pub fn set(&self) -> LockSet {
        LockSet {
            registry: self.clone(),
            held: BTreeMap::new(),
        }
    }

    /// Acquires every key, sorted and deduplicated.
    pub async fn acquire_all(&self, keys: impl IntoIterator<Item = LockKey>) -> LockSet {
        let mut set = self.set();
        set.lock(keys).await;
        set
    }
}

/// Guards held by one operation; released together on drop.
#[derive(Debug)]
pub struct LockSet {
    registry: LockRegistry,
    held: BTreeMap<LockKey, OwnedMutexGuard<()>>,
}

impl LockSet {
    /// Acquires the keys not already held, in global order.
    ///
    /// Keys added later in an operation must sort after every key already
    /// held; operations are written so that this holds.
    pub async fn lock(&mut self, keys: impl IntoIterator<Item = LockKey>) {
        let mut wanted: Vec<LockKey> = keys
            .into_iter()
            .filter(|key| !self.held.contains_key(key))
            .collect();
        wanted.sort();
        wanted.dedup();

        if let (Some(first), Some((last_held, _))) = (wanted.first(), self.held.last_key_value()) {
            debug_assert!(first > last_held, "lock {first:?} taken after {last_held:?}");
        }

        for key in wanted {
            let guard = self.registry.mutex(key).lock_owned().await;
            self.held.insert(key, guard);
        }
    }

    /// Returns true if `key` is held.
    #[must_use]
    pub fn holds(&self, key: &LockKey) -> bool {
        self.held.contains_key(key)
    }

    /// Number of keys held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.held.len()
    }

    /// Returns true if no key is held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.held.is_empty()
    }
}
