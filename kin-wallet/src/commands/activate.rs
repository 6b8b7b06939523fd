//! Kin trustline activation command

use anyhow::Result;
use kin_sdk::KinError;

use super::{print_error, print_success, prompt_passphrase, WalletContext};

/// Run the activate command
pub async fn run(ctx: &WalletContext) -> Result<()> {
    let client = ctx.open_client()?;
    let account = ctx.selected_account(&client)?;

    let passphrase = prompt_passphrase("Enter account passphrase: ")?;

    println!();
    println!("Activating {}...", account.public_address().unwrap_or_default());

    match account.activate(&passphrase).await {
        Ok(()) => print_success("Account activated for Kin."),
        Err(KinError::AccountNotFound(_)) => {
            print_error("Account does not exist on the ledger yet. Fund it first.");
        }
        Err(e) => return Err(e.into()),
    }

    Ok(())
}
