//! Channel-backed dispatcher.

use crate::traits::Dispatcher;
use lattice_messages::{DataRequest, InventoryRequest};
use lattice_types::{Block, PeerId};
use tokio::sync::mpsc;

/// An outbound command for the network layer.
#[derive(Debug, Clone)]
pub enum NetworkCommand {
    /// Broadcast an inventory request.
    Inventory {
        /// Target peers; empty means broadcast.
        peers: Vec<PeerId>,
        /// The locator request.
        request: InventoryRequest,
    },
    /// Request block bodies from specific peers.
    Data {
        /// Target peers.
        peers: Vec<PeerId>,
        /// The body request.
        request: DataRequest,
    },
    /// Forward a newly admitted block.
    Passdown {
        /// The admitted block.
        block: Block,
    },
}

impl NetworkCommand {
    /// Get a human-readable name for this command type.
    pub fn type_name(&self) -> &'static str {
        match self {
            NetworkCommand::Inventory { .. } => "Inventory",
            NetworkCommand::Data { .. } => "Data",
            NetworkCommand::Passdown { .. } => "Passdown",
        }
    }
}

/// A [`Dispatcher`] that enqueues commands on a bounded channel.
///
/// The scheduler must never stall on the network layer, so sends use
/// `try_send`: a full or closed queue drops the command with a log entry and
/// the per-tick retry logic picks up the slack.
pub struct ChannelDispatcher {
    tx: mpsc::Sender<NetworkCommand>,
}

impl ChannelDispatcher {
    /// Create a dispatcher and the receiving end the network layer drains.
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<NetworkCommand>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }

    fn send(&self, command: NetworkCommand) {
        match self.tx.try_send(command) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(command)) => {
                tracing::warn!(
                    command = command.type_name(),
                    "outbound queue full, dropping command"
                );
            }
            Err(mpsc::error::TrySendError::Closed(command)) => {
                tracing::warn!(
                    command = command.type_name(),
                    "network layer gone, dropping command"
                );
            }
        }
    }
}

impl Dispatcher for ChannelDispatcher {
    fn get_inventory(&self, peer_ids: &[PeerId], request: InventoryRequest) {
        self.send(NetworkCommand::Inventory {
            peers: peer_ids.to_vec(),
            request,
        });
    }

    fn get_data(&self, peer_ids: &[PeerId], request: DataRequest) {
        self.send(NetworkCommand::Data {
            peers: peer_ids.to_vec(),
            request,
        });
    }

    fn passdown_block(&self, block: &Block) {
        self.send(NetworkCommand::Passdown {
            block: block.clone(),
        });
    }
}
