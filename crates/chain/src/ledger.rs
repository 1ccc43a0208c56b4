//! Ledger orchestration.
//!
//! The ledger is the single owner of a chain: it loads the chain from storage,
//! verifies it, collects submitted transactions into a pending block and
//! commits that block once enough transactions have arrived.

use crate::blockchain::{BlockChain, BlockchainError};
use crate::config::LedgerConfig;
use ledgerchain_core::{Block, BlockError, Hash, ProofHash, Transaction, TransactionError};
use ledgerchain_storage::{ChainStore, Storage, StorageError};
use thiserror::Error;
use tracing::{info, warn};

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("block error: {0}")]
    Block(#[from] BlockError),

    #[error("chain error: {0}")]
    Chain(#[from] BlockchainError),

    #[error("invalid transaction: {0}")]
    Transaction(#[from] TransactionError),

    #[error("chain integrity is broken at blocks {0:?}")]
    CorruptChain(Vec<u64>),

    #[error("pending block has {have} transactions, at least {need} required")]
    NotEnoughTransactions { have: usize, need: usize },

    #[error("new block does not link to block {0}")]
    CannotLink(u64),

    #[error("block not found: {0}")]
    BlockNotFound(u64),
}

pub type Result<T> = std::result::Result<T, LedgerError>;

/// Outcome of the latest verification pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainStatus {
    Ok,
    WrongBlock,
}

/// A verified chain backed by storage, plus the block being assembled.
pub struct Ledger<'a> {
    store: ChainStore<'a>,
    chain: BlockChain,
    pending: Block,
    config: LedgerConfig,
}

impl<'a> Ledger<'a> {
    /// Load the chain from storage, creating a genesis block if it is empty,
    /// and verify it.
    pub fn open(storage: &'a Storage, config: LedgerConfig) -> Result<Self> {
        let store = ChainStore::new(storage);

        let mut blocks = store.load_blocks()?;
        let created_genesis = blocks.is_empty();
        if created_genesis {
            let genesis = Block::genesis(&config.miner)?;
            info!(miner = %config.miner, "created genesis block");
            blocks.push(genesis);
        }

        let mut chain = BlockChain::new().with_verbose(config.verbose_verification);
        for block in blocks {
            chain.accept_block(block);
        }
        chain.verify_chain()?;

        if created_genesis {
            store.save_chain(chain.blocks())?;
        }

        let next = chain.next_block_number();
        let pending = match store.get_pending()? {
            Some(block) if block.block_number() == next => block,
            Some(stale) => {
                warn!(
                    stale = stale.block_number(),
                    next, "renumbering stale pending block"
                );
                let mut block = Block::new(next);
                block.transactions = stale.transactions;
                store.put_pending(&block)?;
                block
            }
            None => {
                let block = Block::new(next);
                store.put_pending(&block)?;
                block
            }
        };

        Ok(Self {
            store,
            chain,
            pending,
            config,
        })
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn chain(&self) -> &BlockChain {
        &self.chain
    }

    pub fn blocks(&self) -> &[Block] {
        self.chain.blocks()
    }

    pub fn block(&self, number: u64) -> Option<&Block> {
        self.chain.get(number)
    }

    pub fn wrong_blocks(&self) -> Vec<&Block> {
        self.chain.wrong_blocks().collect()
    }

    /// The block collecting submitted transactions.
    pub fn pending(&self) -> &Block {
        &self.pending
    }

    pub fn status(&self) -> ChainStatus {
        if self.chain.is_intact() {
            ChainStatus::Ok
        } else {
            ChainStatus::WrongBlock
        }
    }

    /// Re-run chain verification.
    pub fn verify(&mut self) -> Result<bool> {
        Ok(self.chain.verify_chain()?)
    }

    /// Add a transaction to the pending block.
    pub fn submit_transaction(&mut self, transaction: Transaction) -> Result<()> {
        transaction.validate()?;
        self.ensure_intact()?;

        self.pending.add_transaction(transaction);
        self.store.put_pending(&self.pending)?;
        info!(
            block = self.pending.block_number(),
            pending = self.pending.tx_count(),
            "transaction added to pending block"
        );
        Ok(())
    }

    /// Turn the pending transactions into a new block at the end of the chain.
    pub fn commit_block(&mut self) -> Result<&Block> {
        let have = self.pending.tx_count();
        let need = self.config.min_transactions_per_block;
        if have < need {
            return Err(LedgerError::NotEnoughTransactions { have, need });
        }
        self.ensure_intact()?;

        let previous = self.chain.last().ok_or(BlockchainError::MissingGenesis)?;
        let mut block = self.chain.new_block();
        for transaction in &self.pending.transactions {
            block.add_transaction(transaction.clone());
        }
        block.set_block_hash(Some(previous))?;

        let link = block.is_valid_chain(
            previous.block_hash().as_ref(),
            self.config.verbose_verification,
        );
        if !link.is_valid {
            return Err(LedgerError::CannotLink(previous.block_number()));
        }

        self.store.put_block(&block)?;
        self.chain.accept_block(block);
        self.chain.verify_chain()?;

        self.pending = self.chain.new_block();
        self.store.put_pending(&self.pending)?;

        let committed = self.chain.last().ok_or(BlockchainError::MissingGenesis)?;
        info!(
            block = committed.block_number(),
            txs = committed.tx_count(),
            "block committed"
        );
        Ok(committed)
    }

    /// Audit proof for a transaction in an accepted block, with the Merkle
    /// root it proves against.
    pub fn audit_proof(&self, block_number: u64, tx_index: usize) -> Result<(Hash, Vec<ProofHash>)> {
        let block = self
            .block(block_number)
            .ok_or(LedgerError::BlockNotFound(block_number))?;
        Ok(block.audit_proof(tx_index)?)
    }

    fn ensure_intact(&self) -> Result<()> {
        if self.chain.is_intact() {
            Ok(())
        } else {
            Err(LedgerError::CorruptChain(self.chain.wrong_block_numbers()))
        }
    }
}
