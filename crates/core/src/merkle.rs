//! Merkle tree with audit and consistency proofs.
//!
//! Nodes live in a flat arena owned by the tree and refer to each other by
//! index. Leaves always occupy the first `leaf_count` slots, in insertion
//! order; internal nodes are appended after them by [`MerkleTree::build_tree`].
//!
//! A node left without a partner at some level is carried up by a parent with
//! a single child, and that parent's hash is the child's hash. Callers who want
//! the last leaf duplicated as a real leaf call
//! [`MerkleTree::fix_odd_number_leaves`] before building.

use crate::hash::{hash_pair, Hash};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors raised when a tree or proof is used outside its contract.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MerkleError {
    #[error("cannot build a tree with no leaves")]
    EmptyTree,

    #[error("tree has not been built")]
    NotBuilt,

    #[error("proof cannot be empty")]
    EmptyProof,

    #[error("node {0} is expected to have a parent")]
    MissingParent(NodeId),

    #[error("consistency proof requested for {old} leaves but the tree has {current}")]
    InvalidConsistencySize { old: usize, current: usize },

    #[error("malformed tree: {0}")]
    MalformedTree(String),

    #[error("leaf index {index} out of range (tree has {count} leaves)")]
    LeafIndexOutOfRange { index: usize, count: usize },
}

pub type Result<T> = std::result::Result<T, MerkleError>;

/// Index of a node inside its tree's arena.
pub type NodeId = usize;

/// Which side of the running hash a proof element belongs on.
///
/// `Left` and `Right` name the side of the node being proven: for `Left` the
/// sibling is hashed on the right (`running || sibling`), for `Right` on the
/// left (`sibling || running`). `OldRoot` marks consistency-proof subtree
/// roots, and the single element of a one-leaf tree's audit proof.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Branch {
    Left,
    Right,
    OldRoot,
}

/// One element of an audit or consistency proof.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofHash {
    pub hash: Hash,
    pub direction: Branch,
}

impl ProofHash {
    pub fn new(hash: Hash, direction: Branch) -> Self {
        Self { hash, direction }
    }
}

impl fmt::Display for ProofHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}:{}", self.direction, self.hash.to_hex())
    }
}

/// A node of the tree. Leaves carry an assigned hash; internal nodes carry
/// the digest of their children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerkleNode {
    hash: Hash,
    left: Option<NodeId>,
    right: Option<NodeId>,
    /// Back-reference for upward traversal only.
    parent: Option<NodeId>,
    /// Number of leaves under this node.
    leaf_count: usize,
}

impl MerkleNode {
    fn leaf(hash: Hash) -> Self {
        Self {
            hash,
            left: None,
            right: None,
            parent: None,
            leaf_count: 1,
        }
    }

    pub fn hash(&self) -> Hash {
        self.hash
    }

    pub fn left(&self) -> Option<NodeId> {
        self.left
    }

    pub fn right(&self) -> Option<NodeId> {
        self.right
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn leaf_count(&self) -> usize {
        self.leaf_count
    }

    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }
}

/// A binary Merkle tree over an ordered list of leaf hashes.
#[derive(Debug, Clone, Default)]
pub struct MerkleTree {
    nodes: Vec<MerkleNode>,
    leaf_count: usize,
    root: Option<NodeId>,
}

impl MerkleTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a tree from leaf hashes and build it.
    pub fn from_leaves(leaves: &[Hash]) -> Result<Self> {
        let mut tree = Self::new();
        tree.append_leaves(leaves);
        tree.build_tree()?;
        Ok(tree)
    }

    /// Number of leaves.
    pub fn leaf_count(&self) -> usize {
        self.leaf_count
    }

    pub fn is_empty(&self) -> bool {
        self.leaf_count == 0
    }

    /// Whether a root is available for the current leaves.
    pub fn is_built(&self) -> bool {
        self.root.is_some()
    }

    /// Get a node by id.
    pub fn node(&self, id: NodeId) -> Option<&MerkleNode> {
        self.nodes.get(id)
    }

    /// The root node, if the tree has been built since the last append.
    pub fn root(&self) -> Option<&MerkleNode> {
        self.root.map(|id| &self.nodes[id])
    }

    pub fn root_hash(&self) -> Option<Hash> {
        self.root().map(MerkleNode::hash)
    }

    /// Leaf hashes in Merkle order.
    pub fn leaves(&self) -> impl Iterator<Item = Hash> + '_ {
        self.nodes[..self.leaf_count].iter().map(MerkleNode::hash)
    }

    /// Append a leaf at the end of the leaf order.
    ///
    /// Any previously built root is discarded; call [`build_tree`](Self::build_tree)
    /// again before trusting the root.
    pub fn append_leaf(&mut self, hash: Hash) -> NodeId {
        self.discard_internal_nodes();
        self.nodes.push(MerkleNode::leaf(hash));
        self.leaf_count += 1;
        self.leaf_count - 1
    }

    pub fn append_leaves(&mut self, hashes: &[Hash]) -> Vec<NodeId> {
        hashes.iter().map(|h| self.append_leaf(*h)).collect()
    }

    /// Duplicate the last leaf as a real leaf when the leaf count is odd.
    pub fn fix_odd_number_leaves(&mut self) {
        if self.leaf_count % 2 == 1 {
            let last = self.nodes[self.leaf_count - 1].hash;
            self.append_leaf(last);
        }
    }

    /// Append all leaves of `other` and rebuild.
    pub fn add_tree(&mut self, other: &MerkleTree) -> Result<Hash> {
        if self.is_empty() {
            return Err(MerkleError::EmptyTree);
        }
        for leaf in other.leaves() {
            self.append_leaf(leaf);
        }
        self.build_tree()
    }

    /// Build the tree bottom-up and return the root hash.
    pub fn build_tree(&mut self) -> Result<Hash> {
        if self.leaf_count == 0 {
            return Err(MerkleError::EmptyTree);
        }
        self.discard_internal_nodes();

        let mut level: Vec<NodeId> = (0..self.leaf_count).collect();
        while level.len() > 1 {
            let mut next = Vec::with_capacity(level.len().div_ceil(2));
            for pair in level.chunks(2) {
                next.push(self.create_parent(pair[0], pair.get(1).copied()));
            }
            level = next;
        }

        let root = level[0];
        self.root = Some(root);
        Ok(self.nodes[root].hash)
    }

    /// Replace the hash of a leaf, recomputing every ancestor up to the root.
    pub fn replace_leaf(&mut self, index: usize, hash: Hash) -> Result<()> {
        if index >= self.leaf_count {
            return Err(MerkleError::LeafIndexOutOfRange {
                index,
                count: self.leaf_count,
            });
        }
        self.nodes[index].hash = hash;

        let mut current = self.nodes[index].parent;
        while let Some(id) = current {
            self.nodes[id].hash = self.expected_hash(id)?;
            current = self.nodes[id].parent;
        }
        Ok(())
    }

    /// Check that every internal node holds the digest of its children.
    pub fn verify_hashes(&self) -> bool {
        (self.leaf_count..self.nodes.len())
            .all(|id| matches!(self.expected_hash(id), Ok(h) if h == self.nodes[id].hash))
    }

    /// Build the audit proof for a leaf.
    ///
    /// Returns an empty proof when the leaf is not in the tree. When several
    /// leaves share the hash, the first one in leaf order is proven.
    pub fn audit_proof(&self, leaf_hash: &Hash) -> Result<Vec<ProofHash>> {
        let root = self.root.ok_or(MerkleError::NotBuilt)?;
        match self.find_leaf(leaf_hash) {
            Some(leaf) if leaf == root => Ok(vec![ProofHash::new(*leaf_hash, Branch::OldRoot)]),
            Some(leaf) => self.build_audit_trail(leaf),
            None => Ok(Vec::new()),
        }
    }

    /// Audit proof for the leaf at `index`.
    pub fn audit_proof_at(&self, index: usize) -> Result<Vec<ProofHash>> {
        if index >= self.leaf_count {
            return Err(MerkleError::LeafIndexOutOfRange {
                index,
                count: self.leaf_count,
            });
        }
        let root = self.root.ok_or(MerkleError::NotBuilt)?;
        if index == root {
            return Ok(vec![ProofHash::new(self.nodes[index].hash, Branch::OldRoot)]);
        }
        self.build_audit_trail(index)
    }

    /// Audit trail from any node (leaf or internal) to the root.
    ///
    /// Used to show that the subtree roots of a consistency proof are part of
    /// the current tree.
    pub fn consistency_audit_proof(&self, node_hash: &Hash) -> Result<Vec<ProofHash>> {
        let root = self.root.ok_or(MerkleError::NotBuilt)?;
        match self.find_node(node_hash) {
            Some(node) if node == root => Ok(vec![ProofHash::new(*node_hash, Branch::OldRoot)]),
            Some(node) => self.build_audit_trail(node),
            None => Ok(Vec::new()),
        }
    }

    /// Prove that the first `m` leaves form a tree whose root is a prefix of
    /// this one.
    ///
    /// The proof lists the roots of the subtrees that make up the old tree,
    /// left to right. The old tree must be the leading `m` leaves of this tree.
    pub fn consistency_proof(&self, m: usize) -> Result<Vec<ProofHash>> {
        self.root.ok_or(MerkleError::NotBuilt)?;
        if m == 0 || m > self.leaf_count {
            return Err(MerkleError::InvalidConsistencySize {
                old: m,
                current: self.leaf_count,
            });
        }

        // Largest full subtree on the left edge that fits in m leaves.
        let mut node: NodeId = 0;
        for _ in 0..m.ilog2() {
            node = self.parent_of(node)?;
        }

        let mut k = self.nodes[node].leaf_count;
        let mut proof = vec![ProofHash::new(self.nodes[node].hash, Branch::OldRoot)];

        if m != k {
            let parent = self.parent_of(node)?;
            let mut sibling = self.nodes[parent].right.ok_or_else(|| {
                MerkleError::MalformedTree("sibling must exist because m != k".into())
            })?;

            loop {
                let sibling_count = self.nodes[sibling].leaf_count;
                let remaining = m - k;

                if remaining == sibling_count {
                    proof.push(ProofHash::new(self.nodes[sibling].hash, Branch::OldRoot));
                    break;
                }

                if remaining > sibling_count {
                    proof.push(ProofHash::new(self.nodes[sibling].hash, Branch::OldRoot));
                    k += sibling_count;
                    let parent = self.parent_of(sibling)?;
                    sibling = self.nodes[parent]
                        .right
                        .filter(|right| *right != sibling)
                        .ok_or_else(|| {
                            MerkleError::MalformedTree("expected a right sibling".into())
                        })?;
                } else {
                    sibling = self.nodes[sibling].left.ok_or_else(|| {
                        MerkleError::MalformedTree("cannot descend below a leaf".into())
                    })?;
                }
            }
        }

        Ok(proof)
    }

    /// Replay an audit proof and compare the result with `root_hash`.
    pub fn verify_audit(root_hash: &Hash, leaf_hash: &Hash, proof: &[ProofHash]) -> Result<bool> {
        if proof.is_empty() {
            return Err(MerkleError::EmptyProof);
        }

        let mut running = *leaf_hash;
        for step in proof {
            running = match step.direction {
                Branch::Left => hash_pair(&running, &step.hash),
                Branch::Right => hash_pair(&step.hash, &running),
                Branch::OldRoot if step.hash == running => running,
                Branch::OldRoot => return Ok(false),
            };
        }

        Ok(running == *root_hash)
    }

    /// The `(left, right)` pairs hashed at each step of an audit proof.
    pub fn audit_hash_pairs(leaf_hash: &Hash, proof: &[ProofHash]) -> Result<Vec<(Hash, Hash)>> {
        if proof.is_empty() {
            return Err(MerkleError::EmptyProof);
        }

        let mut pairs = Vec::with_capacity(proof.len());
        let mut running = *leaf_hash;
        for step in proof {
            let pair = match step.direction {
                Branch::Left => (running, step.hash),
                Branch::Right => (step.hash, running),
                Branch::OldRoot => continue,
            };
            running = hash_pair(&pair.0, &pair.1);
            pairs.push(pair);
        }

        Ok(pairs)
    }

    /// Rebuild the old root from a consistency proof and compare.
    pub fn verify_consistency(old_root: &Hash, proof: &[ProofHash]) -> Result<bool> {
        let (last, rest) = proof.split_last().ok_or(MerkleError::EmptyProof)?;

        let mut hash = last.hash;
        for step in rest.iter().rev() {
            hash = hash_pair(&step.hash, &hash);
        }

        Ok(hash == *old_root)
    }

    fn create_parent(&mut self, left: NodeId, right: Option<NodeId>) -> NodeId {
        let hash = match right {
            Some(r) => hash_pair(&self.nodes[left].hash, &self.nodes[r].hash),
            None => self.nodes[left].hash,
        };
        let leaf_count =
            self.nodes[left].leaf_count + right.map_or(0, |r| self.nodes[r].leaf_count);

        let id = self.nodes.len();
        self.nodes.push(MerkleNode {
            hash,
            left: Some(left),
            right,
            parent: None,
            leaf_count,
        });
        self.nodes[left].parent = Some(id);
        if let Some(r) = right {
            self.nodes[r].parent = Some(id);
        }
        id
    }

    fn expected_hash(&self, id: NodeId) -> Result<Hash> {
        let node = &self.nodes[id];
        let left = node
            .left
            .ok_or_else(|| MerkleError::MalformedTree(format!("internal node {id} has no left child")))?;
        Ok(match node.right {
            Some(right) => hash_pair(&self.nodes[left].hash, &self.nodes[right].hash),
            None => self.nodes[left].hash,
        })
    }

    fn build_audit_trail(&self, start: NodeId) -> Result<Vec<ProofHash>> {
        let mut trail = Vec::new();
        let mut child = start;

        while Some(child) != self.root {
            let parent = self.parent_of(child)?;
            let node = &self.nodes[parent];
            let (sibling, direction) = if node.left == Some(child) {
                (node.right, Branch::Left)
            } else {
                (node.left, Branch::Right)
            };
            if let Some(sibling) = sibling {
                trail.push(ProofHash::new(self.nodes[sibling].hash, direction));
            }
            child = parent;
        }

        Ok(trail)
    }

    fn parent_of(&self, id: NodeId) -> Result<NodeId> {
        self.nodes[id].parent.ok_or(MerkleError::MissingParent(id))
    }

    fn find_leaf(&self, hash: &Hash) -> Option<NodeId> {
        self.nodes[..self.leaf_count].iter().position(|n| n.hash == *hash)
    }

    fn find_node(&self, hash: &Hash) -> Option<NodeId> {
        self.nodes.iter().position(|n| n.hash == *hash)
    }

    fn discard_internal_nodes(&mut self) {
        self.nodes.truncate(self.leaf_count);
        for leaf in &mut self.nodes {
            leaf.parent = None;
        }
        self.root = None;
    }
}

/// Compute the Merkle root of a list of hashes.
pub fn merkle_root(hashes: &[Hash]) -> Result<Hash> {
    MerkleTree::from_leaves(hashes)?
        .root_hash()
        .ok_or(MerkleError::NotBuilt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::hash;

    fn make_hashes(n: usize) -> Vec<Hash> {
        (0..n).map(|i| hash(&[i as u8])).collect()
    }

    #[test]
    fn test_build_empty_tree_fails() {
        let mut tree = MerkleTree::new();
        assert_eq!(tree.build_tree(), Err(MerkleError::EmptyTree));
        assert!(merkle_root(&[]).is_err());
    }

    #[test]
    fn test_merkle_root_single() {
        let hashes = make_hashes(1);
        assert_eq!(merkle_root(&hashes).unwrap(), hashes[0]);
    }

    #[test]
    fn test_merkle_root_two() {
        let hashes = make_hashes(2);
        let expected = hash_pair(&hashes[0], &hashes[1]);
        assert_eq!(merkle_root(&hashes).unwrap(), expected);
    }

    #[test]
    fn test_merkle_root_deterministic() {
        let hashes = make_hashes(10);
        assert_eq!(merkle_root(&hashes).unwrap(), merkle_root(&hashes).unwrap());
    }

    #[test]
    fn test_merkle_root_order_matters() {
        let hashes = make_hashes(4);
        let mut swapped = hashes.clone();
        swapped.swap(1, 2);
        assert_ne!(merkle_root(&hashes).unwrap(), merkle_root(&swapped).unwrap());
    }

    #[test]
    fn test_odd_node_is_carried_up() {
        let h = make_hashes(3);
        let expected = hash_pair(&hash_pair(&h[0], &h[1]), &h[2]);
        assert_eq!(merkle_root(&h).unwrap(), expected);

        let h = make_hashes(5);
        let left = hash_pair(&hash_pair(&h[0], &h[1]), &hash_pair(&h[2], &h[3]));
        assert_eq!(merkle_root(&h).unwrap(), hash_pair(&left, &h[4]));
    }

    #[test]
    fn test_fix_odd_number_leaves_duplicates_last() {
        let h = make_hashes(3);
        let mut tree = MerkleTree::new();
        tree.append_leaves(&h);
        tree.fix_odd_number_leaves();
        assert_eq!(tree.leaf_count(), 4);

        let root = tree.build_tree().unwrap();
        let expected = hash_pair(&hash_pair(&h[0], &h[1]), &hash_pair(&h[2], &h[2]));
        assert_eq!(root, expected);

        // Even count: no-op.
        tree.fix_odd_number_leaves();
        assert_eq!(tree.leaf_count(), 4);
    }

    #[test]
    fn test_append_invalidates_root() {
        let h = make_hashes(3);
        let mut tree = MerkleTree::from_leaves(&h[..2]).unwrap();
        assert!(tree.is_built());

        tree.append_leaf(h[2]);
        assert!(!tree.is_built());
        assert_eq!(tree.root_hash(), None);
        assert_eq!(tree.audit_proof(&h[0]), Err(MerkleError::NotBuilt));

        assert_eq!(tree.build_tree().unwrap(), merkle_root(&h).unwrap());
        assert!(tree.verify_hashes());
    }

    #[test]
    fn test_detached_child_is_malformed_tree() {
        let h = make_hashes(4);
        let mut tree = MerkleTree::from_leaves(&h).unwrap();
        let root = tree.root.unwrap();
        tree.nodes[root].left = None;

        assert!(!tree.verify_hashes());
        let err = tree.replace_leaf(0, h[3]).unwrap_err();
        assert!(matches!(err, MerkleError::MalformedTree(_)));
        assert!(err.to_string().starts_with("malformed tree"));
    }

    #[test]
    fn test_audit_proof_round_trip() {
        for n in 1..=9 {
            let hashes = make_hashes(n);
            let tree = MerkleTree::from_leaves(&hashes).unwrap();
            let root = tree.root_hash().unwrap();

            for leaf in &hashes {
                let proof = tree.audit_proof(leaf).unwrap();
                assert!(!proof.is_empty());
                assert!(MerkleTree::verify_audit(&root, leaf, &proof).unwrap(), "n={n}");
            }
        }
    }

    #[test]
    fn test_single_leaf_proof_is_self_referential() {
        let h = make_hashes(1);
        let tree = MerkleTree::from_leaves(&h).unwrap();
        let proof = tree.audit_proof(&h[0]).unwrap();

        assert_eq!(proof, vec![ProofHash::new(h[0], Branch::OldRoot)]);
        assert!(MerkleTree::verify_audit(&h[0], &h[0], &proof).unwrap());
        assert!(!MerkleTree::verify_audit(&h[0], &hash(b"other"), &proof).unwrap());
    }

    #[test]
    fn test_audit_proof_directions() {
        let h = make_hashes(3);
        let tree = MerkleTree::from_leaves(&h).unwrap();

        let first = tree.audit_proof(&h[0]).unwrap();
        assert_eq!(
            first,
            vec![
                ProofHash::new(h[1], Branch::Left),
                ProofHash::new(h[2], Branch::Left),
            ]
        );

        // The carried-up third leaf has a single sibling on its left.
        let last = tree.audit_proof(&h[2]).unwrap();
        assert_eq!(
            last,
            vec![ProofHash::new(hash_pair(&h[0], &h[1]), Branch::Right)]
        );
    }

    #[test]
    fn test_audit_tamper_detection() {
        let hashes = make_hashes(8);
        let tree = MerkleTree::from_leaves(&hashes).unwrap();
        let root = tree.root_hash().unwrap();
        let proof = tree.audit_proof(&hashes[5]).unwrap();

        for i in 0..proof.len() {
            let mut tampered = proof.clone();
            tampered[i].hash = hash(b"tampered");
            assert!(!MerkleTree::verify_audit(&root, &hashes[5], &tampered).unwrap());
        }
    }

    #[test]
    fn test_audit_proof_missing_leaf_is_empty() {
        let tree = MerkleTree::from_leaves(&make_hashes(4)).unwrap();
        assert!(tree.audit_proof(&hash(b"absent")).unwrap().is_empty());
    }

    #[test]
    fn test_audit_proof_uses_first_duplicate() {
        let h = make_hashes(2);
        let leaves = vec![h[0], h[1], h[0]];
        let tree = MerkleTree::from_leaves(&leaves).unwrap();

        let proof = tree.audit_proof(&h[0]).unwrap();
        assert_eq!(proof, tree.audit_proof_at(0).unwrap());
        assert_ne!(proof, tree.audit_proof_at(2).unwrap());
    }

    #[test]
    fn test_verify_audit_empty_proof_fails() {
        let h = hash(b"x");
        assert_eq!(
            MerkleTree::verify_audit(&h, &h, &[]),
            Err(MerkleError::EmptyProof)
        );
    }

    #[test]
    fn test_audit_hash_pairs_follow_proof() {
        let hashes = make_hashes(4);
        let tree = MerkleTree::from_leaves(&hashes).unwrap();
        let proof = tree.audit_proof(&hashes[3]).unwrap();

        let pairs = MerkleTree::audit_hash_pairs(&hashes[3], &proof).unwrap();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0], (hashes[2], hashes[3]));
        let (l, r) = pairs[1];
        assert_eq!(hash_pair(&l, &r), tree.root_hash().unwrap());
    }

    #[test]
    fn test_consistency_proof_every_prefix() {
        for n in 1..=12 {
            let hashes = make_hashes(n);
            let tree = MerkleTree::from_leaves(&hashes).unwrap();

            for m in 1..=n {
                let old_root = merkle_root(&hashes[..m]).unwrap();
                let proof = tree.consistency_proof(m).unwrap();
                assert!(
                    MerkleTree::verify_consistency(&old_root, &proof).unwrap(),
                    "n={n} m={m}"
                );
            }
        }
    }

    #[test]
    fn test_consistency_after_growth() {
        let hashes = make_hashes(11);
        let mut tree = MerkleTree::from_leaves(&hashes[..6]).unwrap();
        let old_root = tree.root_hash().unwrap();

        tree.append_leaves(&hashes[6..]);
        tree.build_tree().unwrap();

        let proof = tree.consistency_proof(6).unwrap();
        assert!(MerkleTree::verify_consistency(&old_root, &proof).unwrap());
        assert!(!MerkleTree::verify_consistency(&hash(b"forged"), &proof).unwrap());

        // Every subtree root in the proof is anchored in the new tree.
        let new_root = tree.root_hash().unwrap();
        for step in &proof {
            let trail = tree.consistency_audit_proof(&step.hash).unwrap();
            assert!(MerkleTree::verify_audit(&new_root, &step.hash, &trail).unwrap());
        }
    }

    #[test]
    fn test_consistency_proof_rejects_bad_size() {
        let tree = MerkleTree::from_leaves(&make_hashes(4)).unwrap();
        assert_eq!(
            tree.consistency_proof(0),
            Err(MerkleError::InvalidConsistencySize { old: 0, current: 4 })
        );
        assert_eq!(
            tree.consistency_proof(5),
            Err(MerkleError::InvalidConsistencySize { old: 5, current: 4 })
        );
        assert_eq!(
            MerkleTree::verify_consistency(&Hash::ZERO, &[]),
            Err(MerkleError::EmptyProof)
        );
    }

    #[test]
    fn test_replace_leaf_propagates_to_root() {
        let mut hashes = make_hashes(7);
        let mut tree = MerkleTree::from_leaves(&hashes).unwrap();

        hashes[4] = hash(b"replacement");
        tree.replace_leaf(4, hashes[4]).unwrap();

        assert_eq!(tree.root_hash(), Some(merkle_root(&hashes).unwrap()));
        assert!(tree.verify_hashes());
        assert!(matches!(
            tree.replace_leaf(7, Hash::ZERO),
            Err(MerkleError::LeafIndexOutOfRange { index: 7, count: 7 })
        ));
    }

    #[test]
    fn test_add_tree() {
        let hashes = make_hashes(6);
        let mut tree = MerkleTree::from_leaves(&hashes[..4]).unwrap();
        let other = MerkleTree::from_leaves(&hashes[4..]).unwrap();

        let root = tree.add_tree(&other).unwrap();
        assert_eq!(root, merkle_root(&hashes).unwrap());
        assert_eq!(tree.leaf_count(), 6);

        let mut empty = MerkleTree::new();
        assert_eq!(empty.add_tree(&other), Err(MerkleError::EmptyTree));
    }

    #[test]
    fn test_node_links() {
        let tree = MerkleTree::from_leaves(&make_hashes(4)).unwrap();
        let root = tree.root().unwrap();
        assert!(!root.is_leaf());
        assert_eq!(root.leaf_count(), 4);
        assert_eq!(root.parent(), None);

        let left = tree.node(root.left().unwrap()).unwrap();
        let leaf = tree.node(left.left().unwrap()).unwrap();
        assert!(leaf.is_leaf());
        assert_eq!(tree.node(leaf.parent().unwrap()), Some(left));
    }
}
