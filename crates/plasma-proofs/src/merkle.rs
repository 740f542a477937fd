//! Fixed-depth binary merkle tree over child block transactions.
//!
//! Every child block commits to a tree of depth [`MERKLE_DEPTH`]. Leaf `i`
//! is the merkle hash of the transaction at index `i`; unused leaves are
//! zero. A membership proof is the concatenation of the 16 sibling hashes
//! from leaf to root, and the leaf index picks the side at every level.

use plasma_types::constants::MERKLE_DEPTH;
use plasma_types::Hash32;
use sha2::{Digest, Sha256};

/// Byte length of a membership proof.
pub const PROOF_LEN: usize = MERKLE_DEPTH * 32;

/// Maximum number of leaves in one child block.
pub const MAX_LEAVES: usize = 1 << MERKLE_DEPTH;

/// Hash two child nodes.
fn hash_nodes(left: &Hash32, right: &Hash32) -> Hash32 {
    let mut hasher = Sha256::new();
    hasher.update(left);
    hasher.update(right);
    hasher.finalize().into()
}

/// Roots of all-zero subtrees, indexed by height.
fn zero_hashes() -> [Hash32; MERKLE_DEPTH + 1] {
    let mut zeros = [[0u8; 32]; MERKLE_DEPTH + 1];
    for height in 0..MERKLE_DEPTH {
        zeros[height + 1] = hash_nodes(&zeros[height], &zeros[height]);
    }
    zeros
}

/// Check that `leaf` sits at `index` in the tree committed to by `root`.
///
/// Returns `false` for proofs of the wrong length or indices that do not
/// fit in the tree.
#[must_use]
pub fn check_membership(leaf: &Hash32, index: u64, root: &Hash32, proof: &[u8]) -> bool {
    if proof.len() != PROOF_LEN || index >= MAX_LEAVES as u64 {
        return false;
    }

    let mut computed = *leaf;
    let mut path = index;
    for sibling in proof.chunks_exact(32) {
        let mut node = [0u8; 32];
        node.copy_from_slice(sibling);
        computed = if path % 2 == 0 {
            hash_nodes(&computed, &node)
        } else {
            hash_nodes(&node, &computed)
        };
        path /= 2;
    }
    computed == *root
}

/// Builder for child block roots and membership proofs.
///
/// Only the populated part of the tree is materialised; everything to the
/// right is filled from precomputed zero-subtree roots.
#[derive(Clone, Debug)]
pub struct MerkleTree {
    /// `levels[0]` holds the leaves, `levels[MERKLE_DEPTH]` the root.
    levels: Vec<Vec<Hash32>>,
    zeros: [Hash32; MERKLE_DEPTH + 1],
}

impl MerkleTree {
    /// Build a tree from leaf hashes, in transaction-index order.
    ///
    /// Returns `None` if there are more leaves than the tree can hold.
    #[must_use]
    pub fn from_leaves(leaves: &[Hash32]) -> Option<Self> {
        if leaves.len() > MAX_LEAVES {
            return None;
        }
        let zeros = zero_hashes();
        let mut levels = Vec::with_capacity(MERKLE_DEPTH + 1);
        levels.push(leaves.to_vec());

        for height in 0..MERKLE_DEPTH {
            let current = &levels[height];
            let next: Vec<Hash32> = current
                .chunks(2)
                .map(|pair| {
                    let right = pair.get(1).unwrap_or(&zeros[height]);
                    hash_nodes(&pair[0], right)
                })
                .collect();
            levels.push(next);
        }

        Some(Self { levels, zeros })
    }

    /// The committed root.
    #[must_use]
    pub fn root(&self) -> Hash32 {
        self.levels[MERKLE_DEPTH]
            .first()
            .copied()
            .unwrap_or(self.zeros[MERKLE_DEPTH])
    }

    /// Number of populated leaves.
    #[must_use]
    pub fn leaf_count(&self) -> usize {
        self.levels[0].len()
    }

    /// Membership proof for the leaf at `index`, in the packed
    /// [`check_membership`] layout. `None` if the index is unpopulated.
    #[must_use]
    pub fn proof(&self, index: usize) -> Option<Vec<u8>> {
        if index >= self.leaf_count() {
            return None;
        }
        let mut proof = Vec::with_capacity(PROOF_LEN);
        let mut position = index;
        for height in 0..MERKLE_DEPTH {
            let sibling = self.levels[height]
                .get(position ^ 1)
                .unwrap_or(&self.zeros[height]);
            proof.extend_from_slice(sibling);
            position /= 2;
        }
        Some(proof)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(n: u8) -> Hash32 {
        [n; 32]
    }

    #[test]
    fn empty_tree_root_is_zero_subtree() {
        let tree = MerkleTree::from_leaves(&[]).unwrap();
        assert_eq!(tree.root(), zero_hashes()[MERKLE_DEPTH]);
        assert!(tree.proof(0).is_none());
    }

    #[test]
    fn every_leaf_proves_membership() {
        let leaves: Vec<Hash32> = (1..=5).map(leaf).collect();
        let tree = MerkleTree::from_leaves(&leaves).unwrap();
        let root = tree.root();
        for (i, l) in leaves.iter().enumerate() {
            let proof = tree.proof(i).unwrap();
            assert_eq!(proof.len(), PROOF_LEN);
            assert!(check_membership(l, i as u64, &root, &proof), "leaf {i}");
        }
    }

    #[test]
    fn wrong_index_fails() {
        let leaves = vec![leaf(1), leaf(2), leaf(3)];
        let tree = MerkleTree::from_leaves(&leaves).unwrap();
        let proof = tree.proof(1).unwrap();
        assert!(!check_membership(&leaf(2), 0, &tree.root(), &proof));
        assert!(!check_membership(&leaf(2), 2, &tree.root(), &proof));
    }

    #[test]
    fn wrong_leaf_or_root_fails() {
        let tree = MerkleTree::from_leaves(&[leaf(1), leaf(2)]).unwrap();
        let proof = tree.proof(0).unwrap();
        assert!(!check_membership(&leaf(9), 0, &tree.root(), &proof));
        assert!(!check_membership(&leaf(1), 0, &[0xAB; 32], &proof));
    }

    #[test]
    fn truncated_proof_fails() {
        let tree = MerkleTree::from_leaves(&[leaf(1)]).unwrap();
        let proof = tree.proof(0).unwrap();
        assert!(!check_membership(&leaf(1), 0, &tree.root(), &proof[..PROOF_LEN - 32]));
        assert!(!check_membership(&leaf(1), MAX_LEAVES as u64, &tree.root(), &proof));
    }

    #[test]
    fn root_is_deterministic_and_order_sensitive() {
        let a = MerkleTree::from_leaves(&[leaf(1), leaf(2)]).unwrap().root();
        let b = MerkleTree::from_leaves(&[leaf(1), leaf(2)]).unwrap().root();
        let c = MerkleTree::from_leaves(&[leaf(2), leaf(1)]).unwrap().root();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
