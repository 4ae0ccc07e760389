//! Inventory (locator) request.

use crate::response::InventoryResponse;
use lattice_types::{ChannelId, NetworkMessage, Request};
use sbor::prelude::*;

/// Ask peers what follows a set of known chain positions.
///
/// `starts` is a locator: hex-encoded block hashes from the requester's tip
/// backwards with exponentially growing gaps, ending at its last finalized
/// block. A peer answers with the hashes extending the first locator entry
/// it recognizes.
#[derive(Debug, Clone, PartialEq, Eq, BasicSbor)]
pub struct InventoryRequest {
    /// Channel the request travels on.
    pub channel_id: ChannelId,

    /// Hex-encoded locator hashes, most recent first.
    pub starts: Vec<String>,

    /// Optional hex-encoded upper bound on the response range.
    pub end: Option<String>,
}

impl InventoryRequest {
    /// Create a new inventory request.
    pub fn new(channel_id: ChannelId, starts: Vec<String>) -> Self {
        Self {
            channel_id,
            starts,
            end: None,
        }
    }

    /// Number of locator entries.
    pub fn locator_len(&self) -> usize {
        self.starts.len()
    }
}

impl NetworkMessage for InventoryRequest {
    fn message_type_id() -> &'static str {
        "inventory.request"
    }
}

impl Request for InventoryRequest {
    type Response = InventoryResponse;
}

#[cfg(test)]
mod tests {
    use super::*;
    use lattice_types::Hash;

    #[test]
    fn test_inventory_request() {
        let starts = vec![
            Hash::from_bytes(b"tip").hex(),
            Hash::from_bytes(b"lfb").hex(),
        ];
        let request = InventoryRequest::new(ChannelId::Block, starts.clone());
        assert_eq!(request.channel_id, ChannelId::Block);
        assert_eq!(request.starts, starts);
        assert_eq!(request.locator_len(), 2);
        assert!(request.end.is_none());
    }
}
