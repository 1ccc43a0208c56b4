//! Blocks: ordered transactions committed by a Merkle root and linked by hash.

use crate::hash::{hash_concat, Hash};
use crate::merkle::{MerkleError, MerkleTree, ProofHash};
use crate::transaction::Transaction;
use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

/// Errors raised while assembling or finalizing a block.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BlockError {
    #[error("merkle error: {0}")]
    Merkle(#[from] MerkleError),

    #[error("previous block {0} has not been finalized")]
    UnfinalizedPrevious(u64),
}

pub type Result<T> = std::result::Result<T, BlockError>;

/// Lifecycle of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockState {
    /// Transactions are being added; no hash yet.
    Assembling,
    /// Hash set and Merkle tree fixed.
    Finalized,
}

/// Outcome of re-validating one block against its expected predecessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainLink {
    pub is_valid: bool,
    /// Hash recomputed from the block's current contents. The next block must
    /// be checked against this value, not against the stored hash.
    pub current_hash: Hash,
}

/// A block of transactions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    /// Transactions in Merkle order.
    pub transactions: Vec<Transaction>,
    block_number: u64,
    created_at: DateTime<Utc>,
    previous_block_hash: Option<Hash>,
    block_hash: Option<Hash>,
    /// Rebuilt from the transactions, never persisted.
    #[serde(skip)]
    merkle_tree: Option<MerkleTree>,
}

impl Block {
    /// Create an empty, unfinalized block timestamped now.
    pub fn new(block_number: u64) -> Self {
        Self::with_timestamp(block_number, Utc::now())
    }

    /// Create an empty, unfinalized block with an explicit creation time
    /// (truncated to milliseconds, the precision of the hashed timestamp).
    pub fn with_timestamp(block_number: u64, created_at: DateTime<Utc>) -> Self {
        Self {
            transactions: Vec::new(),
            block_number,
            created_at: created_at.trunc_subsecs(3),
            previous_block_hash: None,
            block_hash: None,
            merkle_tree: None,
        }
    }

    /// Block 0 holding a single coinbase transaction, finalized.
    pub fn genesis(miner: &str) -> Result<Self> {
        let mut block = Self::new(0);
        block.add_transaction(Transaction::coinbase(miner));
        block.set_block_hash(None)?;
        Ok(block)
    }

    pub fn block_number(&self) -> u64 {
        self.block_number
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Hash of the predecessor recorded at finalization; `None` for genesis.
    pub fn previous_block_hash(&self) -> Option<Hash> {
        self.previous_block_hash
    }

    /// Hash recorded at finalization; `None` while assembling.
    pub fn block_hash(&self) -> Option<Hash> {
        self.block_hash
    }

    /// Merkle tree built by the last call to [`set_block_hash`](Self::set_block_hash).
    pub fn merkle_tree(&self) -> Option<&MerkleTree> {
        self.merkle_tree.as_ref()
    }

    pub fn state(&self) -> BlockState {
        if self.block_hash.is_some() {
            BlockState::Finalized
        } else {
            BlockState::Assembling
        }
    }

    pub fn is_genesis(&self) -> bool {
        self.block_number == 0 && self.previous_block_hash.is_none()
    }

    pub fn tx_count(&self) -> usize {
        self.transactions.len()
    }

    /// Append a transaction. Nothing is rehashed until the block is finalized.
    pub fn add_transaction(&mut self, transaction: Transaction) {
        self.transactions.push(transaction);
    }

    /// Return an explicitly reset block to `Assembling`.
    pub fn reset(&mut self) {
        self.block_hash = None;
        self.previous_block_hash = None;
        self.merkle_tree = None;
    }

    /// Make this block the head of a chain.
    pub fn clear_previous_block_hash(&mut self) {
        self.previous_block_hash = None;
    }

    /// Build a fresh Merkle tree from the current transactions.
    pub fn build_merkle_tree(&self) -> Result<MerkleTree> {
        let leaves: Vec<Hash> = self.transactions.iter().map(Transaction::hash).collect();
        Ok(MerkleTree::from_leaves(&leaves)?)
    }

    /// Merkle root of the current transactions.
    pub fn merkle_root(&self) -> Result<Hash> {
        self.build_merkle_tree()?
            .root_hash()
            .ok_or(BlockError::Merkle(MerkleError::NotBuilt))
    }

    /// What this block's hash would be given `previous_block_hash`.
    pub fn calculate_block_hash(&self, previous_block_hash: Option<&Hash>) -> Result<Hash> {
        let root = self.merkle_root()?;
        Ok(self.header_hash(Some(&root), previous_block_hash))
    }

    /// Finalize the block against its predecessor (`None` for genesis).
    ///
    /// Rebuilds the Merkle tree, records the previous hash and sets the block
    /// hash. On error the block is left as it was.
    pub fn set_block_hash(&mut self, previous: Option<&Block>) -> Result<Hash> {
        let previous_hash = match previous {
            Some(block) => Some(
                block
                    .block_hash
                    .ok_or(BlockError::UnfinalizedPrevious(block.block_number))?,
            ),
            None => None,
        };

        let tree = self.build_merkle_tree()?;
        let root = tree.root_hash().ok_or(MerkleError::NotBuilt)?;
        let block_hash = self.header_hash(Some(&root), previous_hash.as_ref());

        self.merkle_tree = Some(tree);
        self.previous_block_hash = previous_hash;
        self.block_hash = Some(block_hash);

        debug!(
            block = self.block_number,
            hash = %block_hash.short(),
            "block finalized"
        );
        Ok(block_hash)
    }

    /// Recompute this block's hash against `expected_previous` and compare
    /// with what is stored.
    ///
    /// A block whose transactions no longer produce a tree (none left) is
    /// reported invalid rather than failing.
    pub fn is_valid_chain(&self, expected_previous: Option<&Hash>, verbose: bool) -> ChainLink {
        let root = self.merkle_root().ok();
        let current_hash = self.header_hash(root.as_ref(), expected_previous);
        let is_valid = root.is_some()
            && self.block_hash == Some(current_hash)
            && self.previous_block_hash.as_ref() == expected_previous;

        let verdict = if is_valid { "PASS" } else { "FAILED" };
        if verbose {
            info!(block = self.block_number, "{verdict} verification");
        } else {
            debug!(block = self.block_number, "{verdict} verification");
        }

        ChainLink {
            is_valid,
            current_hash,
        }
    }

    /// Audit proof for the transaction at `index`, together with the root it
    /// proves against.
    pub fn audit_proof(&self, index: usize) -> Result<(Hash, Vec<ProofHash>)> {
        let tree = self.build_merkle_tree()?;
        let root = tree.root_hash().ok_or(MerkleError::NotBuilt)?;
        Ok((root, tree.audit_proof_at(index)?))
    }

    /// `SHA256(merkle_root || block_number || created_at || previous_hash)`.
    fn header_hash(&self, merkle_root: Option<&Hash>, previous: Option<&Hash>) -> Hash {
        let number = self.block_number.to_string();
        let created = self.created_at.to_rfc3339_opts(SecondsFormat::Millis, true);
        hash_concat(&[
            merkle_root.map_or(&[][..], |h| h.as_bytes().as_slice()),
            number.as_bytes(),
            created.as_bytes(),
            previous.map_or(&[][..], |h| h.as_bytes().as_slice()),
        ])
    }
}
