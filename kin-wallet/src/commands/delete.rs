//! Account deletion command

use anyhow::Result;

use super::{print_success, print_warning, prompt_confirm, prompt_passphrase, WalletContext};

/// Run the delete command
pub async fn run(ctx: &WalletContext, skip_confirm: bool) -> Result<()> {
    let mut client = ctx.open_client()?;
    let account = ctx.selected_account(&client)?;
    let address = account.public_address().unwrap_or_default().to_string();

    println!();
    print_warning(&format!("About to delete account {} at index {}.", address, ctx.index));
    print_warning("Without a backup its Kin cannot be recovered.");

    if !skip_confirm && !prompt_confirm("Delete this account?")? {
        println!("Aborted.");
        return Ok(());
    }

    let passphrase = prompt_passphrase("Enter account passphrase: ")?;
    client.delete_account_at(ctx.index, &passphrase)?;

    println!();
    print_success(&format!("Deleted account {}", address));
    println!("{} account(s) remain.", client.accounts_count());

    Ok(())
}
