//! Blocks, headers, and the transaction-root computation.

use crate::Hash;
use sbor::prelude::*;

/// An opaque transaction payload.
#[derive(Debug, Clone, PartialEq, Eq, BasicSbor)]
pub struct Transaction(pub Vec<u8>);

impl Transaction {
    /// Compute the content hash of this transaction.
    pub fn hash(&self) -> Hash {
        Hash::from_bytes(&self.0)
    }
}

/// A block header.
///
/// Headers travel ahead of bodies during sync; the request manager uses the
/// height to prioritize body fetches and the transaction root to reject
/// bodies that do not match a previously received header.
#[derive(Debug, Clone, PartialEq, Eq, BasicSbor)]
pub struct BlockHeader {
    /// Height of the block in the chain.
    pub height: u64,

    /// Hash of the parent block.
    pub parent: Hash,

    /// Merkle root over the block's transactions.
    pub tx_root: Hash,

    /// Proposal timestamp in milliseconds.
    pub timestamp: u64,
}

impl BlockHeader {
    /// Compute the block hash from the canonical header encoding.
    pub fn hash(&self) -> Hash {
        let mut data = Vec::with_capacity(8 + 32 + 32 + 8);
        data.extend_from_slice(&self.height.to_le_bytes());
        data.extend_from_slice(self.parent.as_bytes());
        data.extend_from_slice(self.tx_root.as_bytes());
        data.extend_from_slice(&self.timestamp.to_le_bytes());
        Hash::from_bytes(&data)
    }
}

/// A full block: header plus transaction list.
#[derive(Debug, Clone, PartialEq, Eq, BasicSbor)]
pub struct Block {
    /// The block header.
    pub header: BlockHeader,

    /// The block body.
    pub transactions: Vec<Transaction>,
}

impl Block {
    /// The block's content hash (the header hash).
    pub fn hash(&self) -> Hash {
        self.header.hash()
    }

    /// Hash of the parent block.
    pub fn parent(&self) -> Hash {
        self.header.parent
    }

    /// Height of the block.
    pub fn height(&self) -> u64 {
        self.header.height
    }
}

/// Compute the binary merkle root over a transaction list.
///
/// Leaves are transaction hashes; an odd node at any level is paired with
/// itself. An empty list yields [`Hash::ZERO`].
pub fn compute_tx_root(transactions: &[Transaction]) -> Hash {
    if transactions.is_empty() {
        return Hash::ZERO;
    }

    let mut level: Vec<Hash> = transactions.iter().map(Transaction::hash).collect();
    while level.len() > 1 {
        let mut next = Vec::with_capacity(level.len() / 2 + 1);
        for pair in level.chunks(2) {
            let left = pair[0];
            let right = if pair.len() == 2 { pair[1] } else { pair[0] };
            let mut data = Vec::with_capacity(64);
            data.extend_from_slice(left.as_bytes());
            data.extend_from_slice(right.as_bytes());
            next.push(Hash::from_bytes(&data));
        }
        level = next;
    }
    level[0]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_txs(count: usize) -> Vec<Transaction> {
        (0..count)
            .map(|i| Transaction(vec![i as u8, 0xaa]))
            .collect()
    }

    #[test]
    fn test_empty_tx_root_is_zero() {
        assert_eq!(compute_tx_root(&[]), Hash::ZERO);
    }

    #[test]
    fn test_single_tx_root_is_leaf_hash() {
        let txs = make_txs(1);
        assert_eq!(compute_tx_root(&txs), txs[0].hash());
    }

    #[test]
    fn test_tx_root_detects_body_change() {
        let txs = make_txs(4);
        let root = compute_tx_root(&txs);

        let mut tampered = txs.clone();
        tampered[2] = Transaction(vec![0xff]);
        assert_ne!(root, compute_tx_root(&tampered));
    }

    #[test]
    fn test_odd_leaf_count() {
        // Three leaves must not collapse to the two-leaf root.
        let txs = make_txs(3);
        let root = compute_tx_root(&txs);
        assert_ne!(root, compute_tx_root(&txs[..2]));
    }

    #[test]
    fn test_header_hash_covers_all_fields() {
        let header = BlockHeader {
            height: 7,
            parent: Hash::from_bytes(b"parent"),
            tx_root: Hash::ZERO,
            timestamp: 1_000,
        };
        let mut changed = header.clone();
        changed.height = 8;
        assert_ne!(header.hash(), changed.hash());

        let mut changed = header.clone();
        changed.tx_root = Hash::from_bytes(b"root");
        assert_ne!(header.hash(), changed.hash());
    }
}
