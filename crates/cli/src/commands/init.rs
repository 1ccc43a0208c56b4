//! Initialize ledger command.

use super::{open_storage, save_config, CONFIG_FILE};
use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;
use ledgerchain_chain::{Ledger, LedgerConfig};
use std::fs;
use std::path::PathBuf;

#[derive(Args)]
pub struct InitArgs {
    /// Directory to store ledger data
    #[arg(short, long, default_value = "./data")]
    data_dir: PathBuf,

    /// Recipient of the genesis coinbase record
    #[arg(short, long, default_value = "genesis")]
    miner: String,

    /// Pending records required to commit a block
    #[arg(long, default_value = "4")]
    min_transactions: usize,
}

pub fn run(args: InitArgs) -> Result<()> {
    println!("{}", "Initializing ledgerchain...".bold().cyan());
    println!();

    if args.data_dir.join(CONFIG_FILE).exists() {
        bail!(
            "Ledger already initialized in {}",
            args.data_dir.display()
        );
    }
    if args.min_transactions == 0 {
        bail!("--min-transactions must be at least 1");
    }

    fs::create_dir_all(&args.data_dir)
        .with_context(|| format!("Failed to create data directory: {:?}", args.data_dir))?;
    let storage = open_storage(&args.data_dir)?;

    println!("{}  Created data directory", "✓".green().bold());

    let config = LedgerConfig {
        miner: args.miner,
        min_transactions_per_block: args.min_transactions,
        ..LedgerConfig::default()
    };
    let ledger = Ledger::open(&storage, config.clone())
        .context("Failed to initialize genesis block")?;

    let genesis = ledger
        .block(0)
        .context("Genesis block missing after initialization")?;
    let genesis_hash = genesis
        .block_hash()
        .context("Genesis block is not finalized")?;

    println!();
    println!("{}  Created genesis block", "✓".green().bold());
    println!("    Hash:   {}", genesis_hash.to_hex().bright_yellow());
    println!("    Miner:  {}", config.miner.bright_cyan());

    save_config(&args.data_dir, &config)?;
    println!(
        "{}  Saved config to: {}",
        "✓".green().bold(),
        args.data_dir
            .join(CONFIG_FILE)
            .display()
            .to_string()
            .bright_black()
    );

    println!();
    println!("{}", "Ledger initialized successfully!".green().bold());
    println!();
    println!("Next steps:");
    println!(
        "  • Use {} to record a grade",
        "ledgerchain tx add".bright_cyan()
    );
    println!(
        "  • Use {} to seal pending records",
        "ledgerchain block commit".bright_cyan()
    );
    println!(
        "  • Use {} to check integrity",
        "ledgerchain chain verify".bright_cyan()
    );

    Ok(())
}
