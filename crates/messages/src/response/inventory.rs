//! Inventory response.

use lattice_types::{ChannelId, NetworkMessage};
use sbor::prelude::*;

/// A peer's advertisement of block hashes extending the requester's chain.
///
/// The dispatcher feeds each entry to the request manager's hash ingest.
#[derive(Debug, Clone, PartialEq, Eq, BasicSbor)]
pub struct InventoryResponse {
    /// Channel the response travels on.
    pub channel_id: ChannelId,

    /// Hex-encoded advertised block hashes, lowest height first.
    pub hashes: Vec<String>,
}

impl NetworkMessage for InventoryResponse {
    fn message_type_id() -> &'static str {
        "inventory.response"
    }
}
