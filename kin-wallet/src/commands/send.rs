//! Send transaction command

use anyhow::{anyhow, Result};
use kin_sdk::{Balance, KinError};
use tokio::sync::oneshot;

use super::{print_error, print_success, print_warning, prompt_confirm, prompt_passphrase, WalletContext};

/// Run the send command
pub async fn run(
    ctx: &WalletContext,
    to: &str,
    amount: &str,
    memo: Option<String>,
    skip_confirm: bool,
) -> Result<()> {
    let client = ctx.open_client()?;
    let account = ctx.selected_account(&client)?;

    let amount = Balance::parse(amount)?;
    if amount.stroops() <= 0 {
        return Err(anyhow!("Amount must be greater than 0"));
    }

    // Show transaction details
    println!();
    println!("Transaction details:");
    println!("  From:    {}", account.public_address().unwrap_or_default());
    println!("  To:      {}", to);
    println!("  Amount:  {}", amount);
    if let Some(memo) = &memo {
        println!("  Memo:    {}", memo);
    }
    if client.service_provider().is_main_net() {
        print_warning("This payment is on the MAIN network.");
    }
    println!();

    if !skip_confirm && !prompt_confirm("Send this transaction?")? {
        println!("Aborted.");
        return Ok(());
    }

    let passphrase = prompt_passphrase("Enter account passphrase: ")?;

    println!();
    println!("Submitting transaction...");

    let (tx, rx) = oneshot::channel();
    let handle = account
        .send_transaction_request(to, passphrase.as_str(), amount, memo)
        .run(move |result| {
            let _ = tx.send(result);
        });

    let result = tokio::select! {
        result = rx => result.map_err(|_| anyhow!("Transaction task ended without a result"))?,
        _ = tokio::signal::ctrl_c() => {
            handle.cancel();
            print_warning("Interrupted. The transaction may still reach the ledger.");
            return Ok(());
        }
    };

    match result {
        Ok(id) => {
            println!();
            print_success("Transaction sent!");
            println!("  Transaction ID: {}", id);
        }
        Err(KinError::InsufficientKin) => {
            print_error("Insufficient Kin for this payment.");
        }
        Err(KinError::AccountNotFound(address)) => {
            print_error(&format!("Account {} does not exist on the ledger.", address));
        }
        Err(KinError::AccountNotActivated(address)) => {
            print_error(&format!("Account {} is not activated for Kin.", address));
        }
        Err(e) => return Err(e.into()),
    }

    Ok(())
}
