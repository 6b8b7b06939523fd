//! Test network faucet command

use anyhow::{anyhow, Context, Result};
use std::time::Duration;

use super::{print_error, print_success, WalletContext};

/// Run the fund command
pub async fn run(ctx: &WalletContext) -> Result<()> {
    let client = ctx.open_client()?;

    if client.service_provider().is_main_net() {
        print_error("The faucet only serves the test network.");
        return Ok(());
    }

    let account = ctx.selected_account(&client)?;
    let address = account.public_address().unwrap_or_default();
    let url = format!("{}{}", ctx.config.faucet_url, address);

    println!();
    println!("Requesting Kin for {}...", address);
    tracing::debug!("Faucet request: {}", url);

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()?;
    let response = http
        .get(&url)
        .send()
        .await
        .context("Faucet request failed")?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(anyhow!(
            "Faucet returned status {}: {}",
            status,
            body.chars().take(200).collect::<String>()
        ));
    }

    print_success("Faucet request accepted.");

    if let Ok(balance) = account.balance().await {
        println!("Balance: {}", balance);
    }

    Ok(())
}
