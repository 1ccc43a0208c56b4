//! CLI commands module.

use anyhow::{Context, Result};
use clap::Subcommand;
use ledgerchain_chain::LedgerConfig;
use ledgerchain_storage::Storage;
use std::fs;
use std::path::Path;

mod block;
mod chain;
mod init;
mod proof;
mod tx;

const CONFIG_FILE: &str = "config.json";

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new ledger
    Init(init::InitArgs),
    /// Grade record operations
    Tx(tx::TxArgs),
    /// Block operations
    Block(block::BlockArgs),
    /// Chain integrity
    Chain(chain::ChainArgs),
    /// Merkle proofs
    Proof(proof::ProofArgs),
}

pub fn run(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Init(args) => init::run(args),
        Commands::Tx(args) => tx::run(args),
        Commands::Block(args) => block::run(args),
        Commands::Chain(args) => chain::run(args),
        Commands::Proof(args) => proof::run(args),
    }
}

fn open_storage(data_dir: &Path) -> Result<Storage> {
    Storage::open(data_dir)
        .with_context(|| "Failed to open storage. Did you run 'ledgerchain init'?")
}

fn load_config(data_dir: &Path) -> Result<LedgerConfig> {
    let config_file = data_dir.join(CONFIG_FILE);
    let contents = fs::read_to_string(&config_file)
        .context("Failed to read config.json. Did you run 'ledgerchain init'?")?;
    serde_json::from_str(&contents).context("Invalid config.json")
}

fn save_config(data_dir: &Path, config: &LedgerConfig) -> Result<()> {
    let config_file = data_dir.join(CONFIG_FILE);
    fs::write(&config_file, serde_json::to_string_pretty(config)?)
        .with_context(|| format!("Failed to write {}", config_file.display()))
}
