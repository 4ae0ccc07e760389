//! In-memory reference chain store.

use crate::{BlockStatus, ChainStore, ExtendedBlock, StoreError};
use lattice_types::{Block, Hash};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};

struct Inner {
    blocks: HashMap<Hash, ExtendedBlock>,
    by_height: BTreeMap<u64, Vec<Hash>>,
}

/// A chain store backed by process memory.
///
/// Admission inserts blocks with [`BlockStatus::Pending`] and links them into
/// the parent's `children`; [`InMemoryStore::set_status`] lets the embedding
/// consensus advance blocks through execution and finality.
pub struct InMemoryStore {
    inner: RwLock<Inner>,
}

impl InMemoryStore {
    /// Create a store seeded with a finalized genesis block.
    pub fn with_genesis(genesis: Block) -> Self {
        let store = InMemoryStore {
            inner: RwLock::new(Inner {
                blocks: HashMap::new(),
                by_height: BTreeMap::new(),
            }),
        };
        store.insert(genesis, BlockStatus::Finalized);
        store
    }

    /// Update the status of a stored block.
    pub fn set_status(&self, hash: &Hash, status: BlockStatus) -> Result<(), StoreError> {
        let mut inner = self.inner.write();
        let entry = inner
            .blocks
            .get_mut(hash)
            .ok_or(StoreError::NotFound(*hash))?;
        entry.status = status;
        Ok(())
    }

    /// Number of stored blocks.
    pub fn len(&self) -> usize {
        self.inner.read().blocks.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.read().blocks.is_empty()
    }

    fn insert(&self, block: Block, status: BlockStatus) -> ExtendedBlock {
        let mut inner = self.inner.write();
        let hash = block.hash();
        let height = block.height();
        let parent = block.parent();

        let extended = ExtendedBlock {
            block,
            status,
            children: Vec::new(),
        };
        inner.blocks.insert(hash, extended.clone());
        inner.by_height.entry(height).or_default().push(hash);

        if let Some(parent_entry) = inner.blocks.get_mut(&parent) {
            if !parent_entry.children.contains(&hash) {
                parent_entry.children.push(hash);
            }
        }

        extended
    }
}

impl ChainStore for InMemoryStore {
    fn find_block(&self, hash: &Hash) -> Result<ExtendedBlock, StoreError> {
        self.inner
            .read()
            .blocks
            .get(hash)
            .cloned()
            .ok_or(StoreError::NotFound(*hash))
    }

    fn add_block(&self, block: &Block) -> Result<ExtendedBlock, StoreError> {
        let hash = block.hash();
        if let Some(existing) = self.inner.read().blocks.get(&hash) {
            return Ok(existing.clone());
        }
        Ok(self.insert(block.clone(), BlockStatus::Pending))
    }

    fn find_blocks_by_height(&self, height: u64) -> Vec<ExtendedBlock> {
        let inner = self.inner.read();
        inner
            .by_height
            .get(&height)
            .into_iter()
            .flatten()
            .filter_map(|hash| inner.blocks.get(hash).cloned())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lattice_types::{compute_tx_root, BlockHeader, Transaction};

    fn make_block(parent: &Block, height: u64) -> Block {
        let transactions = vec![Transaction(vec![height as u8])];
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

    fn genesis() -> Block {
        Block {
            header: BlockHeader {
                height: 0,
                parent: Hash::ZERO,
                tx_root: Hash::ZERO,
                timestamp: 0,
            },
            transactions: vec![],
        }
    }

    #[test]
    fn test_admission_is_pending_and_links_parent() {
        let g = genesis();
        let store = InMemoryStore::with_genesis(g.clone());
        let child = make_block(&g, 1);

        let admitted = store.add_block(&child).unwrap();
        assert!(admitted.status.is_pending());

        let parent = store.find_block(&g.hash()).unwrap();
        assert_eq!(parent.children, vec![child.hash()]);
    }

    #[test]
    fn test_add_block_is_idempotent() {
        let g = genesis();
        let store = InMemoryStore::with_genesis(g.clone());
        let child = make_block(&g, 1);

        store.add_block(&child).unwrap();
        store.set_status(&child.hash(), BlockStatus::Committed).unwrap();

        // Re-admission keeps the advanced status.
        let again = store.add_block(&child).unwrap();
        assert_eq!(again.status, BlockStatus::Committed);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_find_blocks_by_height_returns_forks() {
        let g = genesis();
        let store = InMemoryStore::with_genesis(g.clone());

        let mut a = make_block(&g, 1);
        a.header.timestamp = 1;
        let mut b = make_block(&g, 1);
        b.header.timestamp = 2;
        assert_ne!(a.hash(), b.hash());

        store.add_block(&a).unwrap();
        store.add_block(&b).unwrap();

        let at_one = store.find_blocks_by_height(1);
        assert_eq!(at_one.len(), 2);
        assert!(store.find_blocks_by_height(5).is_empty());
    }

    #[test]
    fn test_missing_block_is_not_found() {
        let store = InMemoryStore::with_genesis(genesis());
        let missing = Hash::from_bytes(b"missing");
        assert!(matches!(
            store.find_block(&missing),
            Err(StoreError::NotFound(h)) if h == missing
        ));
    }
}
