//! Transactional layer for Tally.
//!
//! Repositories execute engine operations against a [`store::Store`]: they
//! take the per-key locks they need, read current state, validate through
//! the pure services in `tally-core`, and stage every write into one
//! [`store::ChangeSet`] committed atomically. A rejected operation writes
//! nothing.

pub mod engine;
pub mod error;
pub mod lock;
pub mod repositories;
pub mod settings;
pub mod store;

pub use engine::Engine;
pub use error::{EngineError, StoreError};
pub use lock::{LockKey, LockRegistry, LockSet};
pub use repositories::{Document, GeneratedDocument};
pub use settings::EngineSettings;
pub use store::{ChangeSet, InMemoryStore, Store, UnitOfWork};
