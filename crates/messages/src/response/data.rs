//! Block body response.

use lattice_types::{Block, ChannelId, NetworkMessage};
use sbor::prelude::*;

/// Full block bodies answering a data request.
///
/// The dispatcher feeds each block to the request manager's block ingest.
#[derive(Debug, Clone, PartialEq, Eq, BasicSbor)]
pub struct DataResponse {
    /// Channel the response travels on.
    pub channel_id: ChannelId,

    /// The requested blocks.
    pub blocks: Vec<Block>,
}

impl DataResponse {
    /// Number of blocks carried.
    pub fn count(&self) -> usize {
        self.blocks.len()
    }
}

impl NetworkMessage for DataResponse {
    fn message_type_id() -> &'static str {
        "data.response"
    }
}
