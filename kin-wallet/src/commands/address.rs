//! Address display command

use anyhow::Result;

use super::WalletContext;

/// Run the address command
pub async fn run(ctx: &WalletContext) -> Result<()> {
    let client = ctx.open_client()?;
    let account = ctx.selected_account(&client)?;

    println!();
    println!("Your receiving address:");
    println!();
    println!("  {}", account.public_address().unwrap_or_default());

    Ok(())
}
