//! Collaborator contracts the request manager consumes.

use lattice_chain::ExtendedBlock;
use lattice_messages::{DataRequest, InventoryRequest};
use lattice_types::{Block, PeerId};

/// The consensus engine's view exposed to the sync layer.
pub trait Consensus: Send + Sync {
    /// The current best head. With `include_candidates` the tip may extend
    /// into not-yet-committed blocks.
    fn tip(&self, include_candidates: bool) -> Block;

    /// The deepest irreversibly committed block.
    fn last_finalized_block(&self) -> ExtendedBlock;

    /// Identity of the local validator, for log attribution.
    fn id(&self) -> String;
}

/// Outbound side of the peer dispatcher.
///
/// Implementations must not block the caller: the request manager invokes
/// these while holding its lock, so sends should land on a bounded queue and
/// be dropped with a log entry on overflow.
pub trait Dispatcher: Send + Sync {
    /// Broadcast an inventory request. An empty peer list means broadcast.
    fn get_inventory(&self, peer_ids: &[PeerId], request: InventoryRequest);

    /// Request block bodies from specific peers.
    fn get_data(&self, peer_ids: &[PeerId], request: DataRequest);

    /// Forward a newly admitted block to consensus and interested peers.
    fn passdown_block(&self, block: &Block);
}
