//! StudentLedger CLI
//!
//! Invokes the student contract against a local ledger directory.

use std::path::Path;

use clap::{Parser, Subcommand};
use studentledger::config::WalSyncStrategy;
use studentledger::contract::Function;
use studentledger::wal::WalRecovery;
use studentledger::{Command, Config, Ledger, Result};
use tracing_subscriber::{fmt, EnvFilter};

/// StudentLedger CLI
#[derive(Parser, Debug)]
#[command(name = "studentmgt")]
#[command(about = "Manage student records on a local ledger")]
#[command(version)]
struct Args {
    /// Ledger data directory
    #[arg(short, long, default_value = "./studentledger_data")]
    data_dir: String,

    /// fsync the WAL only every N transactions (default: every transaction)
    #[arg(long)]
    sync_every: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a student record
    Create {
        id: String,
        name: String,
        /// RFC 3339 timestamp or YYYY-MM-DD
        date_of_birth: String,
        gender: String,
        /// true/false
        graduation_status: String,
    },

    /// Read a student record
    Read { id: String },

    /// Overwrite every field of a student record
    Update {
        id: String,
        name: String,
        /// RFC 3339 timestamp or YYYY-MM-DD
        date_of_birth: String,
        gender: String,
        /// true/false
        graduation_status: String,
    },

    /// Delete a student record
    Delete { id: String },

    /// Print the record counter
    Count,

    /// Print retained committed events
    Events,

    /// Check the WAL for corruption without modifying it
    Verify,
}

fn main() {
    // Initialize tracing/logging (stderr, so stdout carries only results)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,studentledger=info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let mut builder = Config::builder().data_dir(&args.data_dir);
    if let Some(count) = args.sync_every {
        builder = builder.wal_sync_strategy(WalSyncStrategy::EveryNEntries { count });
    }
    let config = builder.build();

    if let Commands::Verify = args.command {
        // Verify reads the WAL as-is; opening the ledger would repair it
        return print_verification(&Ledger::wal_path_for(&config.data_dir));
    }

    let ledger = Ledger::open(config)?;

    match args.command {
        Commands::Create {
            id,
            name,
            date_of_birth,
            gender,
            graduation_status,
        } => {
            let fields = [id, name, date_of_birth, gender, graduation_status];
            let command = Command::parse(Function::CreateStudent.name(), &fields)?;
            let outcome = ledger.submit(&command)?;
            tracing::info!("committed {} at lsn {}", outcome.receipt.tx_id, outcome.receipt.lsn);
        }
        Commands::Read { id } => {
            let payload = ledger.evaluate(&Command::ReadStudent { id })?;
            println!("{}", String::from_utf8_lossy(&payload));
        }
        Commands::Update {
            id,
            name,
            date_of_birth,
            gender,
            graduation_status,
        } => {
            let fields = [id, name, date_of_birth, gender, graduation_status];
            let command = Command::parse(Function::UpdateStudent.name(), &fields)?;
            let outcome = ledger.submit(&command)?;
            tracing::info!("committed {} at lsn {}", outcome.receipt.tx_id, outcome.receipt.lsn);
        }
        Commands::Delete { id } => {
            let outcome = ledger.submit(&Command::DeleteStudent { id })?;
            tracing::info!("committed {} at lsn {}", outcome.receipt.tx_id, outcome.receipt.lsn);
        }
        Commands::Count => {
            let payload = ledger.evaluate(&Command::GetRecordCount)?;
            println!("{}", String::from_utf8_lossy(&payload));
        }
        Commands::Events => {
            for committed in ledger.events() {
                println!(
                    "{}\t{}\t{}\t{}",
                    committed.lsn,
                    committed.tx_id,
                    committed.event.name,
                    committed.event.payload_text()
                );
            }
        }
        Commands::Verify => print_verification(ledger.wal_path())?,
    }

    ledger.close()
}

fn print_verification(wal_path: &Path) -> Result<()> {
    let result = WalRecovery::verify(wal_path)?;
    println!(
        "entries={} corrupted={} last_lsn={} clean={}",
        result.entries_recovered,
        result.entries_corrupted,
        result.last_lsn,
        !result.was_truncated
    );
    Ok(())
}
