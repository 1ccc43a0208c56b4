//! Persistent storage layer for ledgerchain.
//!
//! This crate stores the ledger between runs:
//! - Accepted blocks, keyed by block number
//! - The pending block still being assembled
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                    Application Layer                     │
//! │               (Ledger, BlockChain, CLI)                  │
//! └────────────────────────┬────────────────────────────────┘
//!                          │
//! ┌────────────────────────▼────────────────────────────────┐
//! │                   Storage Layer                          │
//! │  ┌──────────────────────┐  ┌─────────────────────────┐  │
//! │  │ ChainStore           │  │ Storage (DB)            │  │
//! │  │  - Blocks by number  │  │  - sled wrapper         │  │
//! │  │  - Pending block     │  │  - bincode              │  │
//! │  │                      │  │  - key helpers          │  │
//! │  └──────────────────────┘  └─────────────────────────┘  │
//! └────────────────────────┬────────────────────────────────┘
//!                          │
//! ┌────────────────────────▼────────────────────────────────┐
//! │                    sled Database                         │
//! │              (Embedded Key-Value Store)                  │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! Merkle trees are never written; a reloaded block rebuilds its tree from its
//! transactions and must re-hash to the stored block hash.
//!
//! # Example
//!
//! ```rust,no_run
//! use ledgerchain_storage::{ChainStore, Storage};
//! use ledgerchain_core::Block;
//!
//! let storage = Storage::open("./ledger_data").unwrap();
//! let chain = ChainStore::new(&storage);
//!
//! let genesis = Block::genesis("miner").unwrap();
//! chain.put_block(&genesis).unwrap();
//! assert_eq!(chain.load_blocks().unwrap().len(), 1);
//! ```

pub mod chain;
pub mod db;

// Re-export commonly used types
pub use chain::ChainStore;
pub use db::{Result, Storage, StorageError};
