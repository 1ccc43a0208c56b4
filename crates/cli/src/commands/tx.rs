//! Grade record command.

use super::{load_config, open_storage};
use anyhow::Result;
use chrono::{SecondsFormat, Utc};
use clap::{Args, Subcommand};
use colored::Colorize;
use ledgerchain_chain::Ledger;
use ledgerchain_core::Transaction;
use std::path::PathBuf;

#[derive(Args)]
pub struct TxArgs {
    #[command(subcommand)]
    command: TxCommand,
}

#[derive(Subcommand)]
enum TxCommand {
    /// Add a grade record to the pending block
    Add {
        /// Directory to store ledger data
        #[arg(short, long, default_value = "./data")]
        data_dir: PathBuf,

        /// Student code
        #[arg(short, long)]
        student: String,

        /// Subject code
        #[arg(long)]
        subject: String,

        /// Mark awarded
        #[arg(short, long)]
        mark: f64,

        /// Ordinal of this mark within the subject
        #[arg(short, long, default_value = "1")]
        n_mark: u32,
    },
    /// Show the pending block
    Pending {
        /// Directory to store ledger data
        #[arg(short, long, default_value = "./data")]
        data_dir: PathBuf,
    },
}

pub fn run(args: TxArgs) -> Result<()> {
    match args.command {
        TxCommand::Add {
            data_dir,
            student,
            subject,
            mark,
            n_mark,
        } => add_record(data_dir, student, subject, mark, n_mark),
        TxCommand::Pending { data_dir } => show_pending(data_dir),
    }
}

fn add_record(
    data_dir: PathBuf,
    student: String,
    subject: String,
    mark: f64,
    n_mark: u32,
) -> Result<()> {
    let config = load_config(&data_dir)?;
    let storage = open_storage(&data_dir)?;
    let mut ledger = Ledger::open(&storage, config)?;

    let tx = Transaction::new(student, subject, mark, Utc::now(), n_mark);
    let tx_hash = tx.hash();
    ledger.submit_transaction(tx)?;

    let pending = ledger.pending();
    let need = ledger.config().min_transactions_per_block;

    println!();
    println!("{}  Record added", "✓".green().bold());
    println!("    Hash:    {}", tx_hash.to_hex().bright_yellow());
    println!(
        "    Pending: {} {}",
        pending.tx_count().to_string().bright_cyan(),
        format!("(block #{}, {} needed to commit)", pending.block_number(), need).bright_black()
    );
    println!();

    Ok(())
}

fn show_pending(data_dir: PathBuf) -> Result<()> {
    let config = load_config(&data_dir)?;
    let storage = open_storage(&data_dir)?;
    let ledger = Ledger::open(&storage, config)?;
    let pending = ledger.pending();

    println!();
    println!(
        "{} {}",
        "Pending Block".bold().cyan(),
        format!("#{}", pending.block_number()).bright_black()
    );
    println!();

    if pending.transactions.is_empty() {
        println!("  {}", "No pending records".bright_black());
    }
    for (i, tx) in pending.transactions.iter().enumerate() {
        println!(
            "  {} {} {} {} {}",
            format!("{}.", i).bright_black(),
            tx.student_code().bright_cyan(),
            tx.subject_code(),
            tx.mark().to_string().bright_yellow(),
            tx.timestamp()
                .to_rfc3339_opts(SecondsFormat::Millis, true)
                .bright_black()
        );
    }
    println!();

    Ok(())
}
