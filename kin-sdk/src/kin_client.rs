//! Account management facade

use std::path::PathBuf;

use tracing::{debug, info};

use crate::client_wrapper::ClientWrapper;
use crate::error::{check_not_empty, KinError, KinResult};
use crate::kin_account::KinAccount;
use crate::keystore::Account;
use crate::service_provider::ServiceProvider;

/// Entry point of the SDK: enumerates, creates, imports and deletes the
/// locally held accounts.
///
/// Accounts are addressed by their position in the keystore; index 0 is
/// the oldest account still present.
pub struct KinClient {
    wrapper: ClientWrapper,
    accounts: Vec<KinAccount>,
}

impl KinClient {
    /// Open the encrypted keystore at `keystore_path` and connect to the
    /// provider's Horizon server
    pub fn new(service_provider: ServiceProvider, keystore_path: impl Into<PathBuf>) -> KinResult<Self> {
        Self::with_wrapper(ClientWrapper::new(service_provider, keystore_path)?)
    }

    pub fn with_wrapper(wrapper: ClientWrapper) -> KinResult<Self> {
        let accounts: Vec<KinAccount> = wrapper
            .keystore()
            .load_accounts()?
            .into_iter()
            .map(|account| KinAccount::new(account, wrapper.clone()))
            .collect();

        debug!("Loaded {} accounts", accounts.len());
        Ok(Self { wrapper, accounts })
    }

    /// The first account, creating it when the keystore is empty
    pub fn create_account(&mut self, passphrase: &str) -> KinResult<KinAccount> {
        match self.accounts.first() {
            Some(account) => Ok(account.clone()),
            None => self.add_account(passphrase),
        }
    }

    /// Generate a new account and append it
    pub fn add_account(&mut self, passphrase: &str) -> KinResult<KinAccount> {
        check_not_empty(passphrase, "passphrase")?;

        let account = self
            .wrapper
            .keystore()
            .new_account(passphrase)
            .map_err(KinError::CreateAccount)?;

        Ok(self.push(account))
    }

    /// Import a backup made by [`KinAccount::export`]
    pub fn import_account(&mut self, backup: &str, passphrase: &str) -> KinResult<KinAccount> {
        check_not_empty(backup, "backup")?;
        check_not_empty(passphrase, "passphrase")?;

        let account = self
            .wrapper
            .keystore()
            .import_account(backup, passphrase)?;

        Ok(self.push(account))
    }

    /// Import a StrKey secret seed (`S...`)
    pub fn import_secret_seed(&mut self, seed: &str, passphrase: &str) -> KinResult<KinAccount> {
        check_not_empty(seed, "secret seed")?;
        check_not_empty(passphrase, "passphrase")?;

        let account = self
            .wrapper
            .keystore()
            .import_secret_seed(seed, passphrase)?;

        Ok(self.push(account))
    }

    /// The first account, if any
    pub fn account(&self) -> Option<KinAccount> {
        self.account_at(0)
    }

    pub fn account_at(&self, index: usize) -> Option<KinAccount> {
        self.accounts.get(index).cloned()
    }

    pub fn has_account(&self) -> bool {
        !self.accounts.is_empty()
    }

    pub fn accounts_count(&self) -> usize {
        self.accounts.len()
    }

    /// Delete the first account
    pub fn delete_account(&mut self, passphrase: &str) -> KinResult<()> {
        self.delete_account_at(0, passphrase)
    }

    /// Delete the account at `index`. Out of range does nothing; handles to
    /// the deleted account stop working.
    pub fn delete_account_at(&mut self, index: usize, passphrase: &str) -> KinResult<()> {
        if index >= self.accounts.len() {
            return Ok(());
        }
        check_not_empty(passphrase, "passphrase")?;

        self.wrapper
            .keystore()
            .delete_account(index, passphrase)
            .map_err(KinError::DeleteAccount)?;

        let removed = self.accounts.remove(index);
        removed.mark_deleted();
        info!("Deleted account at index {}", index);
        Ok(())
    }

    /// Remove every account from the keystore
    pub fn clear_all_accounts(&mut self) -> KinResult<()> {
        self.wrapper.keystore().clear_all()?;
        for account in self.accounts.drain(..) {
            account.mark_deleted();
        }
        Ok(())
    }

    pub fn service_provider(&self) -> &ServiceProvider {
        self.wrapper.service_provider()
    }

    fn push(&mut self, account: Account) -> KinAccount {
        let handle = KinAccount::new(account, self.wrapper.clone());
        self.accounts.push(handle.clone());
        handle
    }
}

impl std::fmt::Debug for KinClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KinClient")
            .field("service_provider", self.wrapper.service_provider())
            .field("accounts", &self.accounts)
            .finish()
    }
}
