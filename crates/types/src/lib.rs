//! Core types shared across the lattice node.
//!
//! This crate provides the foundational vocabulary of the sync subsystem:
//!
//! - [`Hash`]: 32-byte blake3 content hash
//! - [`Block`], [`BlockHeader`], [`Transaction`]: the chain's data units
//! - [`compute_tx_root`]: merkle root the body/header consistency check uses
//! - [`PeerId`], [`ChannelId`]: network addressing
//! - [`NetworkMessage`], [`Request`]: traits wire messages implement

mod block;
mod hash;
mod message;
mod peer;

pub use block::{compute_tx_root, Block, BlockHeader, Transaction};
pub use hash::{Hash, HashParseError};
pub use message::{ChannelId, NetworkMessage, Request};
pub use peer::PeerId;
