//! Account status command

use anyhow::Result;
use kin_sdk::AccountStatus;

use super::WalletContext;

/// Run the status command
pub async fn run(ctx: &WalletContext) -> Result<()> {
    let client = ctx.open_client()?;
    let account = ctx.selected_account(&client)?;

    let status = account.status().await?;

    println!();
    println!("Address: {}", account.public_address().unwrap_or_default());
    println!("Status:  {}", status);

    match status {
        AccountStatus::NotCreated => {
            println!();
            println!("The account must be funded before it exists on the ledger.");
        }
        AccountStatus::NotActivated => {
            println!();
            println!("Run 'kin-wallet activate' so the account can hold Kin.");
        }
        AccountStatus::Activated => {}
    }

    Ok(())
}
