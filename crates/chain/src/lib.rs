//! Chain store abstraction and reference implementation.
//!
//! The sync subsystem admits downloaded blocks into a [`ChainStore`] and
//! walks it on startup to resume interrupted work. The store is an external
//! collaborator: consensus executes admitted blocks and advances their
//! [`BlockStatus`] out of [`BlockStatus::Pending`] on its own schedule.
//!
//! [`InMemoryStore`] is the reference implementation used by the test suite
//! and by nodes that do not need persistence.

mod memory;
mod store;

pub use memory::InMemoryStore;
pub use store::{BlockStatus, ChainStore, ExtendedBlock, StoreError};
