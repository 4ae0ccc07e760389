//! Indexes over pending blocks.
//!
//! One arena (`by_hash`) owns every tracked block; the insertion-order list,
//! the orphan buffer, and the header heap all refer to blocks by hash. The
//! heap is kept exact rather than lazily pruned: attaching a body or removing
//! a block also purges its heap entry, so the heap always contains exactly
//! the blocks with a known header and no body.

use crate::pending::PendingBlock;
use lattice_types::{Block, Hash};
use std::cmp::Ordering;
use std::collections::hash_map::Entry;
use std::collections::{BinaryHeap, HashMap};
use std::time::Instant;

/// A header-heap entry; ordered so the lowest height pops first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct HeaderEntry {
    pub(crate) height: u64,
    pub(crate) hash: Hash,
}

impl Ord for HeaderEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .height
            .cmp(&self.height)
            .then_with(|| other.hash.cmp(&self.hash))
    }
}

impl PartialOrd for HeaderEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// All pending-block indexes, maintained together.
#[derive(Debug, Default)]
pub(crate) struct PendingPool {
    /// Hashes in first-seen order; drives fairness of hash-driven fetches.
    order: Vec<Hash>,
    /// Owner of every tracked block.
    by_hash: HashMap<Hash, PendingBlock>,
    /// Orphan buffer: parent hash -> bodies waiting for that parent.
    by_parent: HashMap<Hash, Vec<Block>>,
    /// Blocks with a known header and no body, lowest height first.
    header_heap: BinaryHeap<HeaderEntry>,
}

impl PendingPool {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn len(&self) -> usize {
        self.by_hash.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.by_hash.is_empty()
    }

    pub(crate) fn contains(&self, hash: &Hash) -> bool {
        self.by_hash.contains_key(hash)
    }

    pub(crate) fn get(&self, hash: &Hash) -> Option<&PendingBlock> {
        self.by_hash.get(hash)
    }

    pub(crate) fn get_mut(&mut self, hash: &Hash) -> Option<&mut PendingBlock> {
        self.by_hash.get_mut(hash)
    }

    /// Fetch the block for `hash`, tracking it if it is new.
    pub(crate) fn get_or_insert(&mut self, hash: Hash, now: Instant) -> &mut PendingBlock {
        match self.by_hash.entry(hash) {
            Entry::Vacant(entry) => {
                self.order.push(hash);
                entry.insert(PendingBlock::new(hash, now))
            }
            Entry::Occupied(entry) => entry.into_mut(),
        }
    }

    /// Hashes in first-seen order.
    pub(crate) fn insertion_order(&self) -> Vec<Hash> {
        self.order.clone()
    }

    /// Erase a block from every index.
    pub(crate) fn remove(&mut self, hash: &Hash) -> Option<PendingBlock> {
        let removed = self.by_hash.remove(hash)?;
        if let Some(pos) = self.order.iter().position(|h| h == hash) {
            self.order.remove(pos);
        }
        if let Some(body) = &removed.body {
            self.unpark_one(&body.parent(), hash);
        }
        self.purge_header_entry(hash);
        Some(removed)
    }

    pub(crate) fn push_header_entry(&mut self, height: u64, hash: Hash) {
        self.header_heap.push(HeaderEntry { height, hash });
    }

    pub(crate) fn pop_header_entry(&mut self) -> Option<HeaderEntry> {
        self.header_heap.pop()
    }

    /// Swap in the scratch heap at the end of a scheduling pass.
    pub(crate) fn replace_header_heap(&mut self, heap: BinaryHeap<HeaderEntry>) {
        self.header_heap = heap;
    }

    /// Drop the heap entry for `hash`, if any.
    pub(crate) fn purge_header_entry(&mut self, hash: &Hash) {
        self.header_heap.retain(|entry| entry.hash != *hash);
    }

    pub(crate) fn header_len(&self) -> usize {
        self.header_heap.len()
    }

    /// Park a body under its missing parent. Deduplicated by hash.
    pub(crate) fn park_orphan(&mut self, parent: Hash, block: Block) {
        let children = self.by_parent.entry(parent).or_default();
        if !children.iter().any(|b| b.hash() == block.hash()) {
            children.push(block);
        }
    }

    /// Release every body parked under `parent`.
    pub(crate) fn take_orphans(&mut self, parent: &Hash) -> Option<Vec<Block>> {
        self.by_parent.remove(parent)
    }

    pub(crate) fn orphan_parent_count(&self) -> usize {
        self.by_parent.len()
    }

    pub(crate) fn orphan_block_count(&self) -> usize {
        self.by_parent.values().map(Vec::len).sum()
    }

    /// Every tracked block with a known body.
    pub(crate) fn blocks_with_body(&self) -> Vec<Block> {
        self.by_hash
            .values()
            .filter_map(|pb| pb.body.clone())
            .collect()
    }

    fn unpark_one(&mut self, parent: &Hash, hash: &Hash) {
        if let Some(children) = self.by_parent.get_mut(parent) {
            children.retain(|b| b.hash() != *hash);
            if children.is_empty() {
                self.by_parent.remove(parent);
            }
        }
    }
}
