use clap::Parser;
use microledger::application::engine::TransferEngine;
use microledger::domain::account::{AccountId, Balance};
use microledger::domain::ports::LedgerStoreArc;
use microledger::domain::transfer::TransferRequest;
use microledger::error::LedgerError;
use microledger::infrastructure::in_memory::InMemoryLedger;
use microledger::interfaces::csv::balance_writer::BalanceWriter;
use microledger::interfaces::csv::command_reader::{Command, CommandKind, CommandReader};
use miette::{IntoDiagnostic, Result};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input ledger commands CSV file
    input: PathBuf,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[cfg(feature = "storage-rocksdb")]
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Maximum commit attempts per transfer under contention
    #[arg(long, default_value_t = microledger::application::engine::DEFAULT_MAX_ATTEMPTS)]
    max_attempts: u32,

    /// Print final balances as JSON instead of CSV
    #[arg(long)]
    json: bool,
}

#[cfg(feature = "storage-rocksdb")]
fn build_store(cli: &Cli) -> Result<LedgerStoreArc> {
    use microledger::infrastructure::rocksdb::RocksDbLedger;
    Ok(match &cli.db_path {
        Some(path) => Arc::new(RocksDbLedger::open(path).into_diagnostic()?),
        None => Arc::new(InMemoryLedger::new()),
    })
}

#[cfg(not(feature = "storage-rocksdb"))]
fn build_store(_cli: &Cli) -> Result<LedgerStoreArc> {
    Ok(Arc::new(InMemoryLedger::new()))
}

async fn apply_command(engine: &TransferEngine, command: Command) -> Result<(), LedgerError> {
    match command.r#type {
        CommandKind::Open => {
            let initial = command.amount.unwrap_or(Decimal::ZERO);
            engine
                .open_account(AccountId::from(command.account), Balance::new(initial))
                .await
        }
        CommandKind::Transfer => {
            let destination = command.to.ok_or(LedgerError::DestinationNotFound)?;
            let amount = command.amount.ok_or(LedgerError::InvalidAmount)?;
            let request = TransferRequest::new(
                AccountId::from(command.account),
                AccountId::from(destination),
                amount,
            )?;
            engine.transfer(&request).await
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let store = build_store(&cli)?;
    let engine = TransferEngine::with_max_attempts(store, cli.max_attempts);

    let file = File::open(&cli.input).into_diagnostic()?;
    let reader = CommandReader::new(file);
    for command in reader.commands() {
        match command {
            Ok(command) => {
                if let Err(e) = apply_command(&engine, command).await {
                    eprintln!("Error applying command: {}", e);
                }
            }
            Err(e) => {
                eprintln!("Error reading command: {}", e);
            }
        }
    }

    let mut balances = engine.balances().await.into_diagnostic()?;
    balances.sort_by(|a, b| a.0.cmp(&b.0));

    if cli.json {
        let report: BTreeMap<&str, Decimal> = balances
            .iter()
            .map(|(account, balance)| (account.as_str(), balance.value()))
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&report).into_diagnostic()?
        );
    } else {
        let stdout = io::stdout();
        let mut writer = BalanceWriter::new(stdout.lock());
        writer.write_balances(&balances).into_diagnostic()?;
    }

    Ok(())
}
