//! Account import command

use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::Path;

use super::{print_success, prompt_passphrase, WalletContext};

/// Run the import command.
///
/// Without `--seed`, `file` is a backup written by `export`; with it, the
/// secret seed is read from the terminal instead.
pub async fn run(ctx: &WalletContext, file: Option<String>, seed: bool) -> Result<()> {
    let mut client = ctx.open_client()?;

    let account = if seed {
        let secret = prompt_passphrase("Enter secret seed (S...): ")?;
        let passphrase = super::prompt_new_passphrase()?;
        client.import_secret_seed(&secret, &passphrase)?
    } else {
        let file = file.ok_or_else(|| anyhow!("Pass a backup file or --seed"))?;
        let path = Path::new(&file);
        let backup = fs::read_to_string(path)
            .with_context(|| format!("Failed to read backup from {}", path.display()))?;

        let passphrase = prompt_passphrase("Enter the backup's passphrase: ")?;
        client.import_account(backup.trim(), &passphrase)?
    };

    println!();
    print_success("Account imported!");
    println!("  Index:   {}", client.accounts_count() - 1);
    println!("  Address: {}", account.public_address().unwrap_or_default());

    Ok(())
}
