//! Repository implementations for the engine operations.
//!
//! Each repository is a cheap clonable handle over the shared store, lock
//! registry and settings.

pub mod account;
pub mod document;
pub mod fiscal;
pub mod fund;
pub mod payment;
pub mod reconciliation;
pub mod recurring;
pub mod report;
pub mod transaction;

use std::sync::Arc;

use crate::lock::LockRegistry;
use crate::settings::EngineSettings;
use crate::store::Store;

pub use account::AccountRepository;
pub use document::{Document, DocumentRepository};
pub use fiscal::FiscalRepository;
pub use fund::FundRepository;
pub use payment::PaymentRepository;
pub use reconciliation::ReconciliationRepository;
pub use recurring::{GeneratedDocument, RecurringRepository};
pub use report::ReportRepository;
pub use transaction::TransactionRepository;

/// Shared handles every repository holds.
#[derive(Clone)]
pub(crate) struct Context {
    pub(crate) store: Arc<dyn Store>,
    pub(crate) locks: LockRegistry,
    pub(crate) settings: EngineSettings,
}

impl Context {
    pub(crate) fn new(store: Arc<dyn Store>, settings: EngineSettings) -> Self {
        Self {
            store,
            locks: LockRegistry::new(),
            settings,
        }
    }
}
