//! Kin Wallet CLI
//!
//! A demo wallet for Kin on the Stellar network.

use anyhow::Result;
use clap::{Parser, Subcommand};
use kin_sdk::Network;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;

use commands::WalletContext;
use config::Config;

#[derive(Parser)]
#[command(name = "kin-wallet")]
#[command(about = "Kin wallet - manage Kin accounts on Stellar")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Custom config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Custom keystore file path
    #[arg(short, long, global = true)]
    keystore: Option<String>,

    /// Network to use (main or test)
    #[arg(short, long, global = true)]
    network: Option<Network>,

    /// Horizon server URL
    #[arg(long, global = true)]
    horizon_url: Option<String>,

    /// Index of the account to act on
    #[arg(short, long, global = true, default_value = "0")]
    index: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the first account, or another one with --new
    Create {
        /// Always add a new account
        #[arg(long)]
        new: bool,
    },

    /// List accounts in the keystore
    List,

    /// Show an account's public address
    Address,

    /// Check an account's Kin balance
    Balance {
        /// Decimal places to show
        #[arg(short, long, default_value = "7")]
        precision: usize,
    },

    /// Show whether an account exists and is activated
    Status,

    /// Add the Kin trustline to an account
    Activate,

    /// Send Kin to an address
    Send {
        /// Recipient address
        to: String,

        /// Amount to send in KIN
        amount: String,

        /// Text memo (at most 28 bytes)
        #[arg(short, long)]
        memo: Option<String>,

        /// Skip confirmation prompt
        #[arg(long)]
        yes: bool,
    },

    /// Export an encrypted account backup
    Export {
        /// Output file path
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Import an account from a backup file or a secret seed
    Import {
        /// Backup file written by 'export'
        file: Option<String>,

        /// Read a secret seed from the terminal instead
        #[arg(long, conflicts_with = "file")]
        seed: bool,
    },

    /// Delete an account from the keystore
    Delete {
        /// Skip confirmation prompt
        #[arg(long)]
        yes: bool,
    },

    /// Request test Kin from the faucet
    Fund,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Determine config, then let flags override it
    let config_path = match cli.config {
        Some(path) => PathBuf::from(path),
        None => config::default_config_path()?,
    };
    let mut config = Config::load_or_default(&config_path)?;

    if let Some(network) = cli.network {
        config.network = network;
    }
    if let Some(url) = cli.horizon_url {
        config.horizon_url = Some(url);
    }
    if let Some(path) = cli.keystore {
        config.keystore_path = Some(PathBuf::from(path));
    }

    let ctx = WalletContext {
        keystore_path: config.keystore_path()?,
        config,
        config_path,
        index: cli.index,
    };

    match cli.command {
        Commands::Create { new } => commands::create::run(&ctx, new).await,
        Commands::List => commands::list::run(&ctx).await,
        Commands::Address => commands::address::run(&ctx).await,
        Commands::Balance { precision } => commands::balance::run(&ctx, precision).await,
        Commands::Status => commands::status::run(&ctx).await,
        Commands::Activate => commands::activate::run(&ctx).await,
        Commands::Send {
            to,
            amount,
            memo,
            yes,
        } => commands::send::run(&ctx, &to, &amount, memo, yes).await,
        Commands::Export { output } => commands::export::run(&ctx, output).await,
        Commands::Import { file, seed } => commands::import::run(&ctx, file, seed).await,
        Commands::Delete { yes } => commands::delete::run(&ctx, yes).await,
        Commands::Fund => commands::fund::run(&ctx).await,
    }
}
