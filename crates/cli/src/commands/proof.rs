//! Merkle proof command.

use super::{load_config, open_storage};
use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};
use colored::Colorize;
use ledgerchain_chain::Ledger;
use ledgerchain_core::MerkleTree;
use std::path::PathBuf;

#[derive(Args)]
pub struct ProofArgs {
    #[command(subcommand)]
    command: ProofCommand,
}

#[derive(Subcommand)]
enum ProofCommand {
    /// Prove a record belongs to a block and check the proof
    Audit {
        /// Directory to store ledger data
        #[arg(short, long, default_value = "./data")]
        data_dir: PathBuf,

        /// Block number
        block: u64,

        /// Index of the record within the block
        tx_index: usize,
    },
}

pub fn run(args: ProofArgs) -> Result<()> {
    match args.command {
        ProofCommand::Audit {
            data_dir,
            block,
            tx_index,
        } => audit(data_dir, block, tx_index),
    }
}

fn audit(data_dir: PathBuf, block_number: u64, tx_index: usize) -> Result<()> {
    let config = load_config(&data_dir)?;
    let storage = open_storage(&data_dir)?;
    let ledger = Ledger::open(&storage, config)?;

    let block = ledger.block(block_number).context("Block not found")?;
    let tx = block
        .transactions
        .get(tx_index)
        .with_context(|| format!("Block #{} has no record {}", block_number, tx_index))?;
    let leaf = tx.hash();

    let (root, proof) = ledger.audit_proof(block_number, tx_index)?;

    println!();
    println!("{}", "Audit Proof:".bold().cyan());
    println!();
    println!("  Record:  {}", leaf.to_hex().bright_yellow());
    println!("  Root:    {}", root.to_hex().bright_yellow());
    println!();
    for (i, step) in proof.iter().enumerate() {
        println!("  {} {}", format!("{}.", i).bright_black(), step);
    }
    println!();

    if MerkleTree::verify_audit(&root, &leaf, &proof)? {
        println!("{}  Proof verified", "✓".green().bold());
        println!();
        Ok(())
    } else {
        bail!("Audit proof does not reproduce the block's Merkle root")
    }
}
