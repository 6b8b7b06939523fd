//! CLI Commands
//!
//! Implementation of all wallet CLI commands.

pub mod activate;
pub mod address;
pub mod balance;
pub mod create;
pub mod delete;
pub mod export;
pub mod fund;
pub mod import;
pub mod list;
pub mod send;
pub mod status;

use anyhow::{anyhow, Context, Result};
use kin_sdk::{KinAccount, KinClient};
use std::io::{self, Write};
use std::path::PathBuf;
use zeroize::Zeroizing;

use crate::config::Config;

/// Everything a command needs to reach the keystore and the network
pub struct WalletContext {
    pub config: Config,
    pub config_path: PathBuf,
    pub keystore_path: PathBuf,
    /// Account the command acts on
    pub index: usize,
}

impl WalletContext {
    pub fn open_client(&self) -> Result<KinClient> {
        KinClient::new(self.config.service_provider(), &self.keystore_path)
            .with_context(|| format!("Failed to open keystore {}", self.keystore_path.display()))
    }

    /// The selected account, or an error naming how to create one
    pub fn selected_account(&self, client: &KinClient) -> Result<KinAccount> {
        if !client.has_account() {
            return Err(anyhow!("No account found. Run 'kin-wallet create' first."));
        }
        client.account_at(self.index).ok_or_else(|| {
            anyhow!(
                "No account at index {} (keystore holds {})",
                self.index,
                client.accounts_count()
            )
        })
    }
}

/// Prompt for passphrase input (hidden)
pub fn prompt_passphrase(prompt: &str) -> Result<Zeroizing<String>> {
    print!("{}", prompt);
    io::stdout().flush()?;

    let passphrase = Zeroizing::new(rpassword::read_password()?);
    Ok(passphrase)
}

/// Prompt for a new passphrase twice and require a match
pub fn prompt_new_passphrase() -> Result<Zeroizing<String>> {
    let passphrase = prompt_passphrase("Enter passphrase for the new account: ")?;
    if passphrase.len() < 8 {
        return Err(anyhow!("Passphrase must be at least 8 characters"));
    }

    let confirm = prompt_passphrase("Confirm passphrase: ")?;
    if *passphrase != *confirm {
        return Err(anyhow!("Passphrases do not match"));
    }
    Ok(passphrase)
}

/// Prompt for confirmation
pub fn prompt_confirm(message: &str) -> Result<bool> {
    print!("{} [y/N]: ", message);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    Ok(input.trim().eq_ignore_ascii_case("y") || input.trim().eq_ignore_ascii_case("yes"))
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("\x1b[31mError:\x1b[0m {}", message);
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("\x1b[32m{}\x1b[0m", message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("\x1b[33mWarning:\x1b[0m {}", message);
}
