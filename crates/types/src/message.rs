//! Wire message traits and channel identifiers.

use sbor::prelude::*;

/// The logical channel a message travels on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, BasicSbor)]
pub enum ChannelId {
    /// Block headers, bodies, and inventory.
    Block,
    /// Transaction gossip.
    Transaction,
}

/// A message that can be sent over the network.
pub trait NetworkMessage {
    /// A stable, human-readable identifier for this message type.
    fn message_type_id() -> &'static str;
}

/// Type-safe request/response pairing.
pub trait Request: NetworkMessage {
    /// The response type a peer answers this request with.
    type Response: NetworkMessage;
}
