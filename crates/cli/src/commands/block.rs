//! Block operations command.

use super::{load_config, open_storage};
use anyhow::{Context, Result};
use chrono::SecondsFormat;
use clap::{Args, Subcommand};
use colored::Colorize;
use ledgerchain_chain::Ledger;
use ledgerchain_core::{Block, Hash};
use std::path::PathBuf;

#[derive(Args)]
pub struct BlockArgs {
    #[command(subcommand)]
    command: BlockCommand,
}

#[derive(Subcommand)]
enum BlockCommand {
    /// Seal the pending records into a new block
    Commit {
        /// Directory to store ledger data
        #[arg(short, long, default_value = "./data")]
        data_dir: PathBuf,
    },
    /// List recent blocks
    List {
        /// Directory to store ledger data
        #[arg(short, long, default_value = "./data")]
        data_dir: PathBuf,

        /// Number of blocks to show
        #[arg(short, long, default_value = "10")]
        count: usize,
    },
    /// Show detailed block information
    Info {
        /// Directory to store ledger data
        #[arg(short, long, default_value = "./data")]
        data_dir: PathBuf,

        /// Block number
        number: u64,
    },
}

pub fn run(args: BlockArgs) -> Result<()> {
    match args.command {
        BlockCommand::Commit { data_dir } => commit_block(data_dir),
        BlockCommand::List { data_dir, count } => list_blocks(data_dir, count),
        BlockCommand::Info { data_dir, number } => show_block_info(data_dir, number),
    }
}

fn short_hash(hash: Option<Hash>) -> String {
    hash.map_or_else(|| "-".to_string(), |h| h.short())
}

fn commit_block(data_dir: PathBuf) -> Result<()> {
    let config = load_config(&data_dir)?;
    let storage = open_storage(&data_dir)?;
    let mut ledger = Ledger::open(&storage, config)?;

    let block = ledger.commit_block().context("Failed to commit block")?;

    println!();
    println!("{}  Block committed", "✓".green().bold());
    println!(
        "    Hash:   {}",
        block
            .block_hash()
            .map(|h| h.to_hex())
            .unwrap_or_default()
            .bright_yellow()
    );
    println!(
        "    Number: {}",
        block.block_number().to_string().bright_cyan()
    );
    println!("    Txs:    {}", block.tx_count().to_string().bright_cyan());
    println!();

    Ok(())
}

fn list_blocks(data_dir: PathBuf, count: usize) -> Result<()> {
    let config = load_config(&data_dir)?;
    let storage = open_storage(&data_dir)?;
    let ledger = Ledger::open(&storage, config)?;
    let wrong = ledger.chain().wrong_block_numbers();

    println!();
    println!("{}", "Recent Blocks:".bold().cyan());
    println!();

    for block in ledger.blocks().iter().rev().take(count) {
        let marker = if wrong.contains(&block.block_number()) {
            "WRONG".red().bold()
        } else {
            "".normal()
        };
        println!(
            "  {} {} {} {}",
            format!("#{}", block.block_number()).bright_black(),
            short_hash(block.block_hash()).bright_yellow(),
            format!("({} txs)", block.tx_count()).bright_black(),
            marker
        );
    }

    println!();
    Ok(())
}

/// Hex Merkle root, or `-` when the transactions no longer form a tree.
fn merkle_root_display(block: &Block) -> String {
    block
        .merkle_root()
        .map_or_else(|_| "-".to_string(), |root| root.to_hex())
}

fn print_block(block: &Block) {
    println!("  Number:       {}", block.block_number().to_string().bright_cyan());
    println!("  Hash:         {}", short_hash(block.block_hash()).bright_yellow());
    println!(
        "  Previous:     {}",
        block
            .previous_block_hash()
            .map_or_else(|| "none".to_string(), |h| h.to_hex())
            .bright_black()
    );
    println!(
        "  Merkle Root:  {}",
        merkle_root_display(block).bright_black()
    );
    println!(
        "  Created:      {}",
        block
            .created_at()
            .to_rfc3339_opts(SecondsFormat::Millis, true)
            .bright_black()
    );
    println!("  Transactions: {}", block.tx_count().to_string().bright_cyan());
}

fn show_block_info(data_dir: PathBuf, number: u64) -> Result<()> {
    let config = load_config(&data_dir)?;
    let storage = open_storage(&data_dir)?;
    let ledger = Ledger::open(&storage, config)?;

    let block = ledger.block(number).context("Block not found")?;
    let wrong = ledger.chain().wrong_block_numbers().contains(&number);

    println!();
    println!("{}", "Block Information:".bold().cyan());
    println!();
    print_block(block);
    if wrong {
        println!("  Status:       {}", "WRONG".red().bold());
    }
    println!();

    if !block.transactions.is_empty() {
        println!("{}", "Transactions:".bold());
        println!();
        for (i, tx) in block.transactions.iter().enumerate() {
            println!(
                "  {} {} {} {} {} {}",
                format!("{}.", i).bright_black(),
                tx.hash().short().bright_yellow(),
                tx.student_code().bright_cyan(),
                tx.subject_code(),
                tx.mark(),
                format!("#{}", tx.n_mark()).bright_black()
            );
        }
        println!();
    }

    Ok(())
}
