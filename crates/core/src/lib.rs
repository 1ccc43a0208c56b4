//! Core ledger primitives for ledgerchain.
//!
//! This crate provides the fundamental types used throughout the ledger:
//! - SHA-256 hashing
//! - Merkle trees with audit and consistency proofs
//! - Grade-mark transactions
//! - Blocks and their hash derivation

pub mod block;
pub mod hash;
pub mod merkle;
pub mod transaction;

// Re-export commonly used types at the crate root
pub use block::{Block, BlockError, BlockState, ChainLink};
pub use hash::{hash, hash_concat, hash_pair, Hash, H256};
pub use merkle::{merkle_root, Branch, MerkleError, MerkleNode, MerkleTree, NodeId, ProofHash};
pub use transaction::{Transaction, TransactionError, COINBASE_MARK};
