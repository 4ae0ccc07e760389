//! Shared fixtures for the request manager tests.

use lattice_chain::{ChainStore, ExtendedBlock, InMemoryStore};
use lattice_messages::{DataRequest, InventoryRequest};
use lattice_sync::{Consensus, Dispatcher, RequestManager, SyncConfig};
use lattice_types::{compute_tx_root, Block, BlockHeader, Hash, PeerId, Transaction};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;

/// Build a finalized anchor block at the given height.
pub fn make_anchor(height: u64) -> Block {
    Block {
        header: BlockHeader {
            height,
            parent: Hash::from_bytes(b"before-anchor"),
            tx_root: Hash::ZERO,
            timestamp: height * 1_000,
        },
        transactions: vec![],
    }
}

/// Build a child block one height above `parent`.
pub fn make_block(parent: &Block) -> Block {
    let height = parent.height() + 1;
    let transactions = vec![
        Transaction(vec![height as u8, 1]),
        Transaction(vec![height as u8, 2]),
    ];
    Block {
        header: BlockHeader {
            height,
            parent: parent.hash(),
            tx_root: compute_tx_root(&transactions),
            timestamp: height * 1_000,
        },
        transactions,
    }
}

/// Build a linear chain of `count` blocks on top of `from`.
pub fn make_chain(from: &Block, count: usize) -> Vec<Block> {
    let mut blocks = Vec::with_capacity(count);
    let mut parent = from.clone();
    for _ in 0..count {
        let block = make_block(&parent);
        parent = block.clone();
        blocks.push(block);
    }
    blocks
}

/// A dispatcher that records every command for inspection.
#[derive(Default)]
pub struct CapturingDispatcher {
    data: Mutex<Vec<(Vec<PeerId>, DataRequest)>>,
    inventory: Mutex<Vec<InventoryRequest>>,
    passdowns: Mutex<Vec<Block>>,
}

impl CapturingDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn data_requests(&self) -> Vec<(Vec<PeerId>, DataRequest)> {
        self.data.lock().clone()
    }

    pub fn inventory_requests(&self) -> Vec<InventoryRequest> {
        self.inventory.lock().clone()
    }

    pub fn passdowns(&self) -> Vec<Block> {
        self.passdowns.lock().clone()
    }
}

impl Dispatcher for CapturingDispatcher {
    fn get_inventory(&self, _peer_ids: &[PeerId], request: InventoryRequest) {
        self.inventory.lock().push(request);
    }

    fn get_data(&self, peer_ids: &[PeerId], request: DataRequest) {
        self.data.lock().push((peer_ids.to_vec(), request));
    }

    fn passdown_block(&self, block: &Block) {
        self.passdowns.lock().push(block.clone());
    }
}

/// A consensus stub whose tip and last finalized block are set by the test.
pub struct FixedConsensus {
    store: Arc<InMemoryStore>,
    tip: RwLock<Hash>,
    lfb: RwLock<Hash>,
}

impl FixedConsensus {
    pub fn new(store: Arc<InMemoryStore>, anchor: Hash) -> Self {
        Self {
            store,
            tip: RwLock::new(anchor),
            lfb: RwLock::new(anchor),
        }
    }

    pub fn set_tip(&self, hash: Hash) {
        *self.tip.write() = hash;
    }
}

impl Consensus for FixedConsensus {
    fn tip(&self, _include_candidates: bool) -> Block {
        self.store
            .find_block(&self.tip.read())
            .expect("tip must be in the store")
            .block
    }

    fn last_finalized_block(&self) -> ExtendedBlock {
        self.store
            .find_block(&self.lfb.read())
            .expect("lfb must be in the store")
    }

    fn id(&self) -> String {
        "validator-0".to_string()
    }
}

/// A request manager wired to an in-memory store, a fixed consensus, and a
/// capturing dispatcher, anchored at a finalized block of height 100.
pub struct Harness {
    pub store: Arc<InMemoryStore>,
    pub consensus: Arc<FixedConsensus>,
    pub dispatcher: Arc<CapturingDispatcher>,
    pub manager: Arc<RequestManager>,
    pub anchor: Block,
}

impl Harness {
    pub fn new(config: SyncConfig) -> Self {
        let anchor = make_anchor(100);
        let store = Arc::new(InMemoryStore::with_genesis(anchor.clone()));
        let consensus = Arc::new(FixedConsensus::new(Arc::clone(&store), anchor.hash()));
        let dispatcher = Arc::new(CapturingDispatcher::new());
        let manager = Arc::new(RequestManager::new(
            config,
            Arc::clone(&store) as Arc<dyn ChainStore>,
            Arc::clone(&consensus) as Arc<dyn Consensus>,
            Arc::clone(&dispatcher) as Arc<dyn Dispatcher>,
        ));
        Self {
            store,
            consensus,
            dispatcher,
            manager,
            anchor,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(SyncConfig::default().with_rng_seed(42))
    }
}
