//! Block body fetch request.

use crate::response::DataResponse;
use lattice_types::{ChannelId, Hash, NetworkMessage, Request};
use sbor::prelude::*;

/// Request the full serialized bodies of named blocks.
#[derive(Debug, Clone, PartialEq, Eq, BasicSbor)]
pub struct DataRequest {
    /// Channel the request travels on.
    pub channel_id: ChannelId,

    /// Hex-encoded hashes of the blocks being requested.
    pub entries: Vec<String>,
}

impl DataRequest {
    /// Create a request for a single block, the scheduler's only shape.
    pub fn single(channel_id: ChannelId, hash: &Hash) -> Self {
        Self {
            channel_id,
            entries: vec![hash.hex()],
        }
    }

    /// Number of blocks being requested.
    pub fn count(&self) -> usize {
        self.entries.len()
    }
}

impl NetworkMessage for DataRequest {
    fn message_type_id() -> &'static str {
        "data.request"
    }
}

impl Request for DataRequest {
    type Response = DataResponse;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_entry_request() {
        let hash = Hash::from_bytes(b"block");
        let request = DataRequest::single(ChannelId::Block, &hash);
        assert_eq!(request.count(), 1);
        assert_eq!(request.entries[0], hash.hex());
    }

    #[test]
    fn test_encoding_round_trip() {
        let request = DataRequest::single(ChannelId::Block, &Hash::from_bytes(b"block"));
        let encoded = basic_encode(&request).unwrap();
        let decoded: DataRequest = basic_decode(&encoded).unwrap();
        assert_eq!(request, decoded);
    }
}
