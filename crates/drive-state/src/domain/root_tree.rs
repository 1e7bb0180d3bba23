//! # Merkle Root Tree
//!
//! Binary hash tree over the ordered store leaves, producing the single root
//! hash returned to consensus as the app hash.
//!
//! ALGORITHM: array-form complete binary tree. Leaves are padded to the
//! nearest power of two with the sentinel hash; each parent is
//! `H(left || right)`.
//!
//! ## Invariants
//!
//! - The leaf at array position `i` must report `index() == i`, checked at
//!   construction.
//! - The root is a pure function of the ordered leaf-hash sequence: same
//!   hashes, same root; one changed leaf hash, changed root.
//! - A tree with no leaves commits to [`SENTINEL_HASH`].
//!
//! The tree holds no subscription to the stores: leaf content changes on
//! commit, and the caller must invoke [`MerkleRootTree::rebuild`] once per
//! commit before reading the root or producing proofs.

use super::errors::RootTreeError;
use super::hash::hash_pair;
use super::proof::{self, Proof, ProofStep, SiblingPosition};
use super::value_objects::{Hash, StoreName, SENTINEL_HASH};
use crate::ports::outbound::StoreLeaf;
use std::sync::Arc;

/// Merkle tree over the named store leaves.
pub struct MerkleRootTree {
    leaves: Vec<Arc<dyn StoreLeaf>>,
    /// All nodes level by level, root at index 0; empty for a leafless tree.
    nodes: Vec<Hash>,
    padded_leaf_count: usize,
    root: Hash,
}

impl MerkleRootTree {
    /// Build a tree over the ordered leaves.
    ///
    /// Fails if any leaf's recorded index disagrees with its position.
    pub fn new(leaves: Vec<Arc<dyn StoreLeaf>>) -> Result<Self, RootTreeError> {
        for (position, leaf) in leaves.iter().enumerate() {
            if leaf.index() != position {
                return Err(RootTreeError::InvalidLeafIndex {
                    store: leaf.name(),
                    expected: position,
                    actual: leaf.index(),
                });
            }
        }

        let mut tree = Self {
            leaves,
            nodes: Vec::new(),
            padded_leaf_count: 0,
            root: SENTINEL_HASH,
        };
        tree.rebuild()?;
        Ok(tree)
    }

    /// Recompute every leaf's hash and reconstruct the tree.
    ///
    /// Must be called after each commit completes, before the root or any
    /// proof is read for that height.
    pub fn rebuild(&mut self) -> Result<(), RootTreeError> {
        let mut leaf_hashes = Vec::with_capacity(self.leaves.len());
        for leaf in &self.leaves {
            leaf_hashes.push(leaf.leaf_hash()?);
        }
        self.rebuild_from_hashes(leaf_hashes);
        Ok(())
    }

    fn rebuild_from_hashes(&mut self, leaf_hashes: Vec<Hash>) {
        if leaf_hashes.is_empty() {
            self.nodes = Vec::new();
            self.padded_leaf_count = 0;
            self.root = SENTINEL_HASH;
            return;
        }

        // Pad to a power of two, minimum 2 for a proper binary tree.
        let padded_leaf_count = if leaf_hashes.len() == 1 {
            2
        } else {
            leaf_hashes.len().next_power_of_two()
        };
        let mut padded = leaf_hashes;
        padded.resize(padded_leaf_count, SENTINEL_HASH);

        // Complete binary tree in array form: parent of node i sits at
        // (i - 1) / 2, children at 2i + 1 and 2i + 2.
        let total_nodes = 2 * padded_leaf_count - 1;
        let mut nodes = vec![SENTINEL_HASH; total_nodes];

        let leaf_start = padded_leaf_count - 1;
        for (i, hash) in padded.iter().enumerate() {
            nodes[leaf_start + i] = *hash;
        }
        for i in (0..leaf_start).rev() {
            nodes[i] = hash_pair(&nodes[2 * i + 1], &nodes[2 * i + 2]);
        }

        self.root = nodes[0];
        self.nodes = nodes;
        self.padded_leaf_count = padded_leaf_count;
    }

    /// The root hash over the current leaf-hash sequence.
    pub fn root_hash(&self) -> Hash {
        self.root
    }

    /// Number of store leaves (before padding).
    pub fn leaf_count(&self) -> usize {
        self.leaves.len()
    }

    /// Root-side proof path for the leaf at the given index: sibling hash
    /// plus side, per level, bottom-up.
    pub fn proof_path(&self, leaf_index: usize) -> Result<Vec<ProofStep>, RootTreeError> {
        if leaf_index >= self.leaves.len() {
            return Err(RootTreeError::LeafOutOfRange {
                index: leaf_index,
                leaf_count: self.leaves.len(),
            });
        }

        let leaf_start = self.padded_leaf_count - 1;
        let mut current = leaf_start + leaf_index;
        let mut path = Vec::new();

        while current > 0 {
            let (sibling, position) = if current % 2 == 0 {
                (current - 1, SiblingPosition::Left)
            } else {
                (current + 1, SiblingPosition::Right)
            };
            path.push(ProofStep {
                hash: self.nodes[sibling],
                position,
            });
            current = (current - 1) / 2;
        }

        Ok(path)
    }

    /// Combined proof for specific keys of one store: the leaf's own opaque
    /// proof bundled with this tree's root path for that leaf.
    pub fn full_proof(
        &self,
        store: StoreName,
        keys: &[Vec<u8>],
    ) -> Result<Proof, RootTreeError> {
        let leaf = self
            .leaves
            .iter()
            .find(|leaf| leaf.name() == store)
            .ok_or(RootTreeError::UnknownStore { store })?;

        let path = self.proof_path(leaf.index())?;
        Ok(Proof {
            root_tree_proof: proof::encode_root_path(&path),
            store_tree_proof: leaf.prove_keys(keys)?,
        })
    }

    /// Verify a proof path without a tree instance: recompute the root from
    /// the leaf hash and path and compare.
    pub fn verify_path(leaf_hash: &Hash, path: &[ProofStep], expected_root: &Hash) -> bool {
        let mut current = *leaf_hash;
        for step in path {
            current = match step.position {
                SiblingPosition::Left => hash_pair(&step.hash, &current),
                SiblingPosition::Right => hash_pair(&current, &step.hash),
            };
        }
        current == *expected_root
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::BackendError;
    use crate::test_utils::FixedLeaf;

    fn leaves(hashes: &[Hash]) -> Vec<Arc<dyn StoreLeaf>> {
        hashes
            .iter()
            .enumerate()
            .map(|(i, hash)| {
                Arc::new(FixedLeaf::new(StoreName::ALL[i], i, *hash)) as Arc<dyn StoreLeaf>
            })
            .collect()
    }

    fn hash_from_byte(b: u8) -> Hash {
        let mut h = [0u8; 32];
        h[0] = b;
        h
    }

    #[test]
    fn test_construction_rejects_mismatched_leaf_index() {
        let bad: Vec<Arc<dyn StoreLeaf>> = vec![
            Arc::new(FixedLeaf::new(StoreName::Identity, 0, hash_from_byte(1))),
            Arc::new(FixedLeaf::new(StoreName::Document, 2, hash_from_byte(2))),
            Arc::new(FixedLeaf::new(StoreName::DataContract, 2, hash_from_byte(3))),
        ];

        let result = MerkleRootTree::new(bad);

        assert!(matches!(
            result,
            Err(RootTreeError::InvalidLeafIndex {
                store: StoreName::Document,
                expected: 1,
                actual: 2,
            })
        ));
    }

    #[test]
    fn test_empty_tree_commits_to_sentinel() {
        let tree = MerkleRootTree::new(vec![]).unwrap();
        assert_eq!(tree.root_hash(), SENTINEL_HASH);
    }

    #[test]
    fn test_two_leaf_root_is_pair_hash() {
        let left = hash_from_byte(0x01);
        let right = hash_from_byte(0x02);
        let tree = MerkleRootTree::new(leaves(&[left, right])).unwrap();

        assert_eq!(tree.root_hash(), hash_pair(&left, &right));
    }

    #[test]
    fn test_single_leaf_pads_with_sentinel() {
        let only = hash_from_byte(0x07);
        let tree = MerkleRootTree::new(leaves(&[only])).unwrap();

        assert_eq!(tree.root_hash(), hash_pair(&only, &SENTINEL_HASH));
    }

    #[test]
    fn test_root_is_pure_function_of_leaf_hashes() {
        let fixed = [hash_from_byte(1), hash_from_byte(2), hash_from_byte(3)];

        let tree_a = MerkleRootTree::new(leaves(&fixed)).unwrap();
        let tree_b = MerkleRootTree::new(leaves(&fixed)).unwrap();
        assert_eq!(tree_a.root_hash(), tree_b.root_hash());

        let mut changed = fixed;
        changed[1] = hash_from_byte(0xFF);
        let tree_c = MerkleRootTree::new(leaves(&changed)).unwrap();
        assert_ne!(tree_a.root_hash(), tree_c.root_hash());
    }

    #[test]
    fn test_rebuild_with_unchanged_leaves_keeps_root() {
        let fixed = [hash_from_byte(1), hash_from_byte(2)];
        let mut tree = MerkleRootTree::new(leaves(&fixed)).unwrap();
        let before = tree.root_hash();

        tree.rebuild().unwrap();
        tree.rebuild().unwrap();

        assert_eq!(tree.root_hash(), before);
    }

    #[test]
    fn test_proof_path_verifies_for_every_leaf() {
        let fixed = [
            hash_from_byte(1),
            hash_from_byte(2),
            hash_from_byte(3),
            hash_from_byte(4),
        ];
        let tree = MerkleRootTree::new(leaves(&fixed)).unwrap();

        for (i, leaf_hash) in fixed.iter().enumerate() {
            let path = tree.proof_path(i).unwrap();
            assert_eq!(path.len(), 2);
            assert!(MerkleRootTree::verify_path(
                leaf_hash,
                &path,
                &tree.root_hash()
            ));
        }
    }

    #[test]
    fn test_tampered_path_does_not_verify() {
        let fixed = [hash_from_byte(1), hash_from_byte(2)];
        let tree = MerkleRootTree::new(leaves(&fixed)).unwrap();

        let mut path = tree.proof_path(0).unwrap();
        path[0].hash[0] ^= 0xFF;

        assert!(!MerkleRootTree::verify_path(
            &fixed[0],
            &path,
            &tree.root_hash()
        ));
    }

    #[test]
    fn test_proof_path_out_of_range() {
        let tree = MerkleRootTree::new(leaves(&[hash_from_byte(1)])).unwrap();
        assert!(matches!(
            tree.proof_path(5),
            Err(RootTreeError::LeafOutOfRange {
                index: 5,
                leaf_count: 1
            })
        ));
    }

    #[test]
    fn test_full_proof_round_trips_components() {
        let fixed = [hash_from_byte(1), hash_from_byte(2)];
        let tree = MerkleRootTree::new(leaves(&fixed)).unwrap();

        let proof = tree
            .full_proof(StoreName::Identity, &[b"key".to_vec()])
            .unwrap();
        let decoded = Proof::from_bytes(&proof.to_bytes()).unwrap();

        assert_eq!(decoded, proof);

        // The root-path component decodes to a path that verifies.
        let path = crate::domain::proof::decode_root_path(&decoded.root_tree_proof).unwrap();
        assert!(MerkleRootTree::verify_path(
            &fixed[0],
            &path,
            &tree.root_hash()
        ));
    }

    #[test]
    fn test_full_proof_unknown_store() {
        let tree = MerkleRootTree::new(leaves(&[hash_from_byte(1)])).unwrap();
        assert!(matches!(
            tree.full_proof(StoreName::DataContract, &[]),
            Err(RootTreeError::UnknownStore {
                store: StoreName::DataContract
            })
        ));
    }

    #[test]
    fn test_failing_leaf_propagates_on_rebuild() {
        let failing: Vec<Arc<dyn StoreLeaf>> =
            vec![Arc::new(FixedLeaf::failing(StoreName::Identity, 0))];
        let result = MerkleRootTree::new(failing);

        assert!(matches!(result, Err(RootTreeError::Leaf(BackendError::Io(_)))));
    }
}
