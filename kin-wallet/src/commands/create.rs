//! Account creation command

use anyhow::Result;

use super::{print_success, print_warning, prompt_new_passphrase, WalletContext};

/// Run the create command
pub async fn run(ctx: &WalletContext, new: bool) -> Result<()> {
    let mut client = ctx.open_client()?;

    // First run: record where everything lives
    if !ctx.config_path.exists() {
        let mut config = ctx.config.clone();
        config.keystore_path = Some(ctx.keystore_path.clone());
        config.save(&ctx.config_path)?;
    }

    if client.has_account() && !new {
        print_warning(&format!(
            "Keystore already holds {} account(s); pass --new to add another.",
            client.accounts_count()
        ));
    }

    let passphrase = if client.has_account() && !new {
        None
    } else {
        Some(prompt_new_passphrase()?)
    };

    let account = match &passphrase {
        Some(passphrase) if new => client.add_account(passphrase)?,
        Some(passphrase) => client.create_account(passphrase)?,
        None => {
            if let Some(first) = client.account() {
                println!("Address: {}", first.public_address().unwrap_or_default());
            }
            return Ok(());
        }
    };

    println!();
    print_success("Account created successfully!");
    println!();
    println!("Index:   {}", client.accounts_count() - 1);
    println!("Address: {}", account.public_address().unwrap_or_default());
    println!();
    println!("Keystore: {}", ctx.keystore_path.display());
    println!();
    println!("Next: 'kin-wallet fund' (test network) or 'kin-wallet activate'.");

    Ok(())
}
