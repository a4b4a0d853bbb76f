//! Persistence Adapters
//!
//! Implementations of the ledger repository trait.

pub mod in_memory;
pub mod turso_store;

pub use in_memory::InMemoryLedgerRepository;
pub use turso_store::{StoreError, TursoLedgerStore};
