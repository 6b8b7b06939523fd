//! Account listing command

use anyhow::Result;

use super::{print_warning, WalletContext};

/// Run the list command
pub async fn run(ctx: &WalletContext) -> Result<()> {
    let client = ctx.open_client()?;

    if !client.has_account() {
        print_warning("No accounts yet. Run 'kin-wallet create' first.");
        return Ok(());
    }

    println!();
    println!("Accounts ({}):", client.accounts_count());
    for index in 0..client.accounts_count() {
        if let Some(account) = client.account_at(index) {
            let marker = if index == ctx.index { "*" } else { " " };
            println!(
                "{} {:>2}. {}",
                marker,
                index,
                account.public_address().unwrap_or_default()
            );
        }
    }

    let provider = client.service_provider();
    println!();
    println!("Network: {} ({})", provider.network(), provider.provider_url());

    Ok(())
}
