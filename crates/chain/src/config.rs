//! Ledger configuration.

use serde::{Deserialize, Serialize};

/// Configuration for a [`Ledger`](crate::Ledger).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Recipient of the genesis coinbase record.
    pub miner: String,
    /// Pending transactions required before a block can be committed.
    pub min_transactions_per_block: usize,
    /// Log every block's verdict at `info` during verification.
    pub verbose_verification: bool,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            miner: "genesis".to_string(),
            min_transactions_per_block: 4,
            verbose_verification: true,
        }
    }
}
