//! Account export/backup command

use anyhow::{anyhow, Result};
use std::fs;
use std::path::Path;

use super::{
    print_error, print_success, print_warning, prompt_confirm, prompt_passphrase, WalletContext,
};

/// Run the export command
pub async fn run(ctx: &WalletContext, output: Option<String>) -> Result<()> {
    let client = ctx.open_client()?;
    let account = ctx.selected_account(&client)?;

    let passphrase = prompt_passphrase("Enter account passphrase: ")?;
    let backup = account
        .export(&passphrase)
        .map_err(|e| anyhow!("Failed to export account - wrong passphrase? ({})", e))?;

    if let Some(output_path) = output {
        let output_path = Path::new(&output_path);

        if output_path.exists() && !prompt_confirm("Output file exists. Overwrite?")? {
            println!("Aborted.");
            return Ok(());
        }

        // Write with restricted permissions
        #[cfg(unix)]
        {
            use std::io::Write;
            use std::os::unix::fs::OpenOptionsExt;
            let mut file = fs::OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .mode(0o600)
                .open(output_path)?;
            file.write_all(backup.as_bytes())?;
        }

        #[cfg(not(unix))]
        {
            fs::write(output_path, &backup)?;
        }

        println!();
        print_success(&format!("Backup saved to: {}", output_path.display()));
        print_warning("The backup is encrypted with this account's passphrase. Keep both safe.");
    } else {
        println!();
        print_warning("The backup below is encrypted, but anyone with it and your passphrase");
        print_warning("can spend this account's Kin.");
        println!();

        if !prompt_confirm("Show backup on screen?")? {
            print_error("Export cancelled.");
            return Ok(());
        }

        println!();
        println!("{}", backup);
    }

    Ok(())
}
