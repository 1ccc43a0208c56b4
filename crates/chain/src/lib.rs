//! Chain linking, verification and ledger orchestration for ledgerchain.
//!
//! This crate brings the core types together:
//! - **BlockChain**: ordered blocks and the verifier that re-derives every hash
//! - **Ledger**: loads and persists the chain, assembles and commits blocks
//! - **LedgerConfig**: settings shared by the ledger and the CLI
//!
//! # Example
//!
//! ```rust,no_run
//! use ledgerchain_chain::{Ledger, LedgerConfig};
//! use ledgerchain_core::Transaction;
//! use ledgerchain_storage::Storage;
//!
//! let storage = Storage::open("./ledger_data").unwrap();
//! let mut ledger = Ledger::open(&storage, LedgerConfig::default()).unwrap();
//!
//! for student in ["ST01", "ST02", "ST03", "ST04"] {
//!     let tx = Transaction::new(student, "CS101", 8.0, chrono::Utc::now(), 1);
//!     ledger.submit_transaction(tx).unwrap();
//! }
//! ledger.commit_block().unwrap();
//! assert!(ledger.verify().unwrap());
//! ```

pub mod blockchain;
pub mod config;
pub mod ledger;

// Re-export commonly used types
pub use blockchain::{BlockChain, BlockchainError};
pub use config::LedgerConfig;
pub use ledger::{ChainStatus, Ledger, LedgerError};
