//! Chain integrity command.

use super::{load_config, open_storage};
use anyhow::Result;
use clap::{Args, Subcommand};
use colored::Colorize;
use ledgerchain_chain::{ChainStatus, Ledger};
use std::path::PathBuf;

#[derive(Args)]
pub struct ChainArgs {
    #[command(subcommand)]
    command: ChainCommand,
}

#[derive(Subcommand)]
enum ChainCommand {
    /// Re-derive every block hash and report tampered blocks
    Verify {
        /// Directory to store ledger data
        #[arg(short, long, default_value = "./data")]
        data_dir: PathBuf,
    },
}

pub fn run(args: ChainArgs) -> Result<()> {
    match args.command {
        ChainCommand::Verify { data_dir } => verify_chain(data_dir),
    }
}

fn verify_chain(data_dir: PathBuf) -> Result<()> {
    let config = load_config(&data_dir)?;
    let storage = open_storage(&data_dir)?;
    // Opening the ledger runs a full verification pass.
    let ledger = Ledger::open(&storage, config)?;

    println!();
    match ledger.status() {
        ChainStatus::Ok => {
            println!("{}  Chain intact", "✓".green().bold());
            println!(
                "    Blocks: {}",
                ledger.blocks().len().to_string().bright_cyan()
            );
        }
        ChainStatus::WrongBlock => {
            println!("{}  Chain integrity NOT intact", "✗".red().bold());
            for block in ledger.wrong_blocks() {
                println!(
                    "    {} {}",
                    format!("#{}", block.block_number()).red(),
                    block
                        .block_hash()
                        .map(|h| h.short())
                        .unwrap_or_default()
                        .bright_black()
                );
            }
        }
    }
    println!();

    Ok(())
}
