//! The chain store contract.

use lattice_types::{Block, Hash};

/// Execution status of a stored block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockStatus {
    /// Admitted to the store but not yet executed by consensus.
    Pending,
    /// Executed and committed.
    Committed,
    /// Irreversibly finalized.
    Finalized,
}

impl BlockStatus {
    /// Whether the block is admitted but not yet executed.
    pub fn is_pending(&self) -> bool {
        matches!(self, BlockStatus::Pending)
    }

    /// Whether the block is finalized.
    pub fn is_finalized(&self) -> bool {
        matches!(self, BlockStatus::Finalized)
    }
}

/// A stored block together with its store metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtendedBlock {
    /// The block itself.
    pub block: Block,

    /// Execution status.
    pub status: BlockStatus,

    /// Hashes of known child blocks.
    pub children: Vec<Hash>,
}

impl ExtendedBlock {
    /// The block's content hash.
    pub fn hash(&self) -> Hash {
        self.block.hash()
    }

    /// Height of the block.
    pub fn height(&self) -> u64 {
        self.block.height()
    }
}

/// Errors returned by chain store lookups.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    #[error("block {0} not found")]
    NotFound(Hash),
}

/// The chain store as the sync subsystem sees it.
///
/// `add_block` must be idempotent: re-admitting a block keeps its existing
/// status and metadata. The sync layer relies on this to tolerate late and
/// duplicate responses.
pub trait ChainStore: Send + Sync {
    /// Look up a block by hash.
    fn find_block(&self, hash: &Hash) -> Result<ExtendedBlock, StoreError>;

    /// Admit a block. New blocks enter with [`BlockStatus::Pending`].
    fn add_block(&self, block: &Block) -> Result<ExtendedBlock, StoreError>;

    /// All blocks at the given height, forks included.
    fn find_blocks_by_height(&self, height: u64) -> Vec<ExtendedBlock>;
}
