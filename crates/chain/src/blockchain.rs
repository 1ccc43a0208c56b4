//! The block chain: an ordered sequence of accepted blocks and its verifier.

use ledgerchain_core::{Block, Hash};
use thiserror::Error;
use tracing::{info, warn};

/// Errors that can occur during chain operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BlockchainError {
    #[error("genesis block not set")]
    MissingGenesis,
}

pub type Result<T> = std::result::Result<T, BlockchainError>;

/// Accepted blocks in order, plus the blocks that failed the latest
/// verification pass.
///
/// Blocks are linked by position: block `i + 1` follows block `i`.
#[derive(Debug, Clone, Default)]
pub struct BlockChain {
    blocks: Vec<Block>,
    /// Indexes into `blocks`.
    wrong_blocks: Vec<usize>,
    verbose: bool,
}

impl BlockChain {
    /// Create an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Log every block's verdict at `info` during verification.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Append a block. The first block becomes the head and loses any
    /// previous hash. No validation happens here.
    pub fn accept_block(&mut self, mut block: Block) {
        if self.blocks.is_empty() {
            block.clear_previous_block_hash();
        }
        self.blocks.push(block);
    }

    /// `0` for an empty chain, otherwise the last block's number plus one.
    pub fn next_block_number(&self) -> u64 {
        self.blocks.last().map_or(0, |b| b.block_number() + 1)
    }

    /// An empty, unfinalized block carrying the next block number.
    pub fn new_block(&self) -> Block {
        Block::new(self.next_block_number())
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Mutable access to accepted blocks. Changes are only trusted after the
    /// next [`verify_chain`](Self::verify_chain).
    pub fn blocks_mut(&mut self) -> &mut [Block] {
        &mut self.blocks
    }

    pub fn head(&self) -> Option<&Block> {
        self.blocks.first()
    }

    pub fn last(&self) -> Option<&Block> {
        self.blocks.last()
    }

    pub fn get(&self, number: u64) -> Option<&Block> {
        self.blocks.iter().find(|b| b.block_number() == number)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Blocks that failed the latest verification.
    pub fn wrong_blocks(&self) -> impl Iterator<Item = &Block> + '_ {
        self.wrong_blocks.iter().map(|&i| &self.blocks[i])
    }

    pub fn wrong_block_numbers(&self) -> Vec<u64> {
        self.wrong_blocks().map(Block::block_number).collect()
    }

    /// Whether the latest verification found no wrong blocks.
    pub fn is_intact(&self) -> bool {
        self.wrong_blocks.is_empty()
    }

    /// Re-validate every block from head to tail.
    ///
    /// Each block is checked against the hash recomputed for its predecessor,
    /// never the predecessor's stored hash. The wrong-blocks list is replaced
    /// by the result of this pass. Returns whether the chain is intact.
    pub fn verify_chain(&mut self) -> Result<bool> {
        if self.blocks.is_empty() {
            return Err(BlockchainError::MissingGenesis);
        }

        let mut expected_previous: Option<Hash> = None;
        let mut wrong = Vec::new();
        for (index, block) in self.blocks.iter().enumerate() {
            let link = block.is_valid_chain(expected_previous.as_ref(), self.verbose);
            if !link.is_valid {
                wrong.push(index);
            }
            expected_previous = Some(link.current_hash);
        }
        self.wrong_blocks = wrong;

        if self.is_intact() {
            info!(blocks = self.blocks.len(), "Blockchain integrity intact.");
        } else {
            warn!(
                wrong = ?self.wrong_block_numbers(),
                "Blockchain integrity NOT intact."
            );
        }
        Ok(self.is_intact())
    }
}
