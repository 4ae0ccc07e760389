//! Block request manager.
//!
//! This crate drives a node's catch-up of missing blocks from its peers: it
//! discovers what the node is missing, issues bounded, rate-limited requests,
//! tracks outstanding requests with timeouts and retries, reassembles block
//! graphs that arrive out of order, and hands completed subtrees to the
//! chain store and consensus layer.
//!
//! # Protocol Overview
//!
//! 1. **Discovery**: A 1 Hz scheduler periodically broadcasts an inventory
//!    request carrying a locator (tip backwards to the last finalized block,
//!    exponentially spaced). Peers answer with hashes the node is missing.
//!
//! 2. **Fetching**: Each advertised hash becomes a tracked pending block.
//!    The scheduler requests bodies from a uniformly random advertising peer,
//!    lowest known height first, under a shared per-second quota. Requests
//!    time out after 10 s and retry; blocks nobody delivers expire after
//!    300 s and are dropped.
//!
//! 3. **Reassembly**: Bodies whose parent is not yet admitted are parked in
//!    an orphan buffer keyed by the missing parent.
//!
//! 4. **Promotion**: When a body lands whose parent is admitted and executed,
//!    the block and every buffered descendant are admitted to the chain store
//!    in BFS order and passed down to consensus.
//!
//! # Architecture
//!
//! ```text
//! peer dispatcher ──► add_hash / add_header / add_block       (ingest)
//!                          │
//!                          ▼
//!                     PendingPool ◄──────────── tick (1 Hz scheduler)
//!                 order / by_hash /                 │
//!              by_parent / header heap              ├─► InventoryRequest (broadcast)
//!                          │                        └─► DataRequest (random peer)
//!                          ▼
//!                  promote_subtree ──► ChainStore::add_block
//!                          │
//!                          └─────────► Dispatcher::passdown_block
//! ```

mod config;
mod dispatch;
mod manager;
mod pending;
mod pool;
mod traits;

pub use config::SyncConfig;
pub use dispatch::{ChannelDispatcher, NetworkCommand};
pub use manager::{RequestManager, SyncStatus};
pub use pending::{PendingBlock, RequestState};
pub use traits::{Consensus, Dispatcher};
