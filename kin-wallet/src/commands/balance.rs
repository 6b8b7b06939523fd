//! Balance check command

use anyhow::Result;
use kin_sdk::KinError;

use super::{print_error, print_success, print_warning, WalletContext};

/// Run the balance command
pub async fn run(ctx: &WalletContext, precision: usize) -> Result<()> {
    let client = ctx.open_client()?;
    let account = ctx.selected_account(&client)?;

    println!();
    println!("Querying {}...", client.service_provider().provider_url());

    match account.balance().await {
        Ok(balance) => {
            println!();
            print_success(&format!("Balance: {} KIN", balance.value(precision)));
        }
        Err(KinError::AccountNotFound(_)) => {
            print_error("Account does not exist on the ledger yet.");
            if !client.service_provider().is_main_net() {
                println!("Run 'kin-wallet fund' to create it on the test network.");
            }
        }
        Err(KinError::AccountNotActivated(_)) => {
            print_warning("Account is not activated for Kin.");
            println!("Run 'kin-wallet activate' to add the Kin trustline.");
        }
        Err(e) => return Err(e.into()),
    }

    Ok(())
}
