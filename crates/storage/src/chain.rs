//! Block storage and the pending block.

use crate::db::{Result, Storage, BLOCK_PREFIX};
use ledgerchain_core::Block;
use tracing::debug;

/// Key of the block currently being assembled.
const PENDING_BLOCK_KEY: &[u8] = b"chain:pending";

/// Persists accepted blocks by number and the pending block.
///
/// Merkle trees are not stored; they are rebuilt from the transactions.
pub struct ChainStore<'a> {
    storage: &'a Storage,
}

impl<'a> ChainStore<'a> {
    /// Create a new ChainStore wrapping the given storage.
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    // =========================================================================
    // Accepted Blocks
    // =========================================================================

    /// Store a block under its number, replacing any previous entry.
    pub fn put_block(&self, block: &Block) -> Result<()> {
        let key = Storage::block_key(block.block_number());
        self.storage.put(&key, block)?;
        debug!(block = block.block_number(), "stored block");
        Ok(())
    }

    /// Get a block by its number.
    pub fn get_block(&self, number: u64) -> Result<Option<Block>> {
        self.storage.get(Storage::block_key(number))
    }

    /// Check if a block exists.
    pub fn has_block(&self, number: u64) -> Result<bool> {
        self.storage.contains(Storage::block_key(number))
    }

    /// Load every stored block in ascending number order.
    pub fn load_blocks(&self) -> Result<Vec<Block>> {
        let blocks: Vec<Block> = self.storage.scan_prefix(BLOCK_PREFIX.as_bytes())?;
        debug!(count = blocks.len(), "loaded blocks");
        Ok(blocks)
    }

    /// Number of stored blocks.
    pub fn block_count(&self) -> Result<usize> {
        Ok(self.load_blocks()?.len())
    }

    /// Store a whole chain and flush it to disk.
    pub fn save_chain<'b>(&self, blocks: impl IntoIterator<Item = &'b Block>) -> Result<()> {
        for block in blocks {
            self.put_block(block)?;
        }
        self.storage.flush()
    }

    // =========================================================================
    // Pending Block
    // =========================================================================

    /// Store the block being assembled.
    pub fn put_pending(&self, block: &Block) -> Result<()> {
        self.storage.put(PENDING_BLOCK_KEY, block)?;
        self.storage.flush()
    }

    /// Load the block being assembled, if any.
    pub fn get_pending(&self) -> Result<Option<Block>> {
        self.storage.get(PENDING_BLOCK_KEY)
    }

    pub fn clear_pending(&self) -> Result<()> {
        self.storage.delete(PENDING_BLOCK_KEY)
    }
}
