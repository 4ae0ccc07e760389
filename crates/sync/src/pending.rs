//! Per-block download state.

use lattice_types::{Block, BlockHeader, Hash, PeerId};
use std::time::{Duration, Instant};

/// Where a pending block stands in the request cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    /// A full-block request needs to be sent.
    WantData,
    /// A full-block request is outstanding.
    AwaitingData,
    /// The header is known; a body request needs to be sent.
    WantBody,
    /// A body request is outstanding.
    AwaitingBody,
}

/// In-memory state of one not-yet-admitted block.
///
/// `hash` and `created_at` are fixed at creation; everything else mutates
/// under the request manager's lock.
#[derive(Debug, Clone)]
pub struct PendingBlock {
    pub(crate) hash: Hash,
    pub(crate) header: Option<BlockHeader>,
    pub(crate) body: Option<Block>,
    pub(crate) peers: Vec<PeerId>,
    pub(crate) created_at: Instant,
    pub(crate) last_update: Instant,
    pub(crate) status: RequestState,
}

impl PendingBlock {
    pub(crate) fn new(hash: Hash, now: Instant) -> Self {
        Self {
            hash,
            header: None,
            body: None,
            peers: Vec::new(),
            created_at: now,
            last_update: now,
            status: RequestState::WantData,
        }
    }

    /// The block's content hash.
    pub fn hash(&self) -> Hash {
        self.hash
    }

    /// Current request state.
    pub fn status(&self) -> RequestState {
        self.status
    }

    /// Peers known to advertise this block.
    pub fn peers(&self) -> &[PeerId] {
        &self.peers
    }

    /// Whether the last request has gone unanswered past `timeout`.
    pub fn has_timed_out(&self, now: Instant, timeout: Duration) -> bool {
        now.saturating_duration_since(self.last_update) > timeout
    }

    /// Whether the block has sat undelivered past `expiration`.
    pub fn has_expired(&self, now: Instant, expiration: Duration) -> bool {
        now.saturating_duration_since(self.created_at) > expiration
    }

    /// Record that a request was just sent.
    pub(crate) fn touch(&mut self, now: Instant) {
        self.last_update = now;
    }

    /// Union new peers into the peer set, preserving first-seen order.
    pub(crate) fn add_peers(&mut self, peer_ids: &[PeerId]) {
        for id in peer_ids {
            if !self.peers.contains(id) {
                self.peers.push(id.clone());
            }
        }
    }

    /// Attach a body and leave any outstanding-request state behind.
    pub(crate) fn set_body(&mut self, block: Block) {
        self.body = Some(block);
        self.status = if self.header.is_some() {
            RequestState::WantBody
        } else {
            RequestState::WantData
        };
    }

    /// Drop the header so the block reverts to hash-driven fetching.
    pub(crate) fn clear_header(&mut self) {
        self.header = None;
        self.status = RequestState::WantData;
    }
}
