//! Accrue CLI - Main entry point

use accrue_cli::{commands, AppConfig, AppContext};
use accrue_core::{Address, Amount, Rate, SystemClock};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "accrue")]
#[command(about = "Accrue - Interest-accruing ledger with custody vault", long_about = None)]
struct Cli {
    /// Data directory path
    #[arg(short, long, default_value = "./data")]
    data: PathBuf,

    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Identity the command runs as (defaults to the configured owner)
    #[arg(long = "as", global = true)]
    caller: Option<Address>,

    /// Correlation ID shared by every journal record of this command
    #[arg(long, global = true)]
    correlation_id: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Journal the initial global rate
    Init {
        /// Per-second rate, decimal ("0.00000005") or scaled integer
        #[arg(long)]
        rate: Option<Rate>,
    },

    /// Raise the global interest rate (owner only)
    SetRate {
        /// Per-second rate, decimal or scaled integer
        rate: Rate,
    },

    /// Deposit backing asset and receive ledger balance
    Deposit {
        /// Amount to deposit
        amount: Amount,
    },

    /// Redeem ledger balance for backing asset ("max" for everything)
    Redeem {
        /// Amount to redeem
        amount: Amount,
    },

    /// Transfer ledger balance to another account ("max" for everything)
    Transfer {
        /// Recipient
        to: Address,
        /// Amount to transfer
        amount: Amount,
    },

    /// Send backing asset into the pool without minting
    Fund {
        /// Amount to add to the pool
        amount: Amount,
    },

    /// Show effective and stored balance
    Balance {
        /// Account to inspect
        user: Address,
    },

    /// Show an account's principal, rate and last update
    Account {
        /// Account to inspect
        user: Address,
    },

    /// Show the global rate and pool
    Rate,

    /// Audit the journal (verify hash chain)
    Audit,
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::from_file(path)?,
        None => AppConfig::default(),
    };
    let caller = cli.caller.clone().unwrap_or_else(|| config.owner.clone());
    let correlation_id = cli
        .correlation_id
        .clone()
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let mut ctx = AppContext::new(&cli.data, config, Arc::new(SystemClock))?;

    match cli.command {
        Commands::Init { rate } => commands::init(&mut ctx, rate, &correlation_id)?,
        Commands::SetRate { rate } => commands::set_rate(&mut ctx, &caller, rate, &correlation_id)?,
        Commands::Deposit { amount } => commands::deposit(&mut ctx, &caller, amount, &correlation_id)?,
        Commands::Redeem { amount } => commands::redeem(&mut ctx, &caller, amount, &correlation_id)?,
        Commands::Transfer { to, amount } => {
            commands::transfer(&mut ctx, &caller, &to, amount, &correlation_id)?
        }
        Commands::Fund { amount } => commands::fund(&mut ctx, &caller, amount, &correlation_id)?,
        Commands::Balance { user } => commands::balance(&ctx, &user)?,
        Commands::Account { user } => commands::account(&ctx, &user)?,
        Commands::Rate => commands::rate(&ctx)?,
        Commands::Audit => commands::audit(&ctx)?,
    }

    Ok(())
}
