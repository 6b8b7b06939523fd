//! Account Keystore
//!
//! Local storage for account secrets. Accounts are kept in insertion order
//! and that order is the external indexing scheme: index 0 is the first
//! account ever added that has not been deleted.
//!
//! - [`EncryptedKeyStore`] seals each secret seed with Argon2id +
//!   ChaCha20-Poly1305 and persists through a [`Store`] backend.
//! - [`FileStore`] and [`MemoryStore`] are the available backends.

mod encrypted;
mod store;

pub use encrypted::{AccountBackup, EncryptedKeyStore, KdfParams};
pub use store::{FileStore, MemoryStore, Store};

use serde::{Deserialize, Serialize};

use crate::error::KeyStoreError;
use crate::keypair::KeyPair;

/// A locally held account: its public address plus the sealed secret seed.
///
/// The keypair itself is only materialized by
/// [`KeyStore::decrypt_account`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    account_id: String,
    encrypted_seed: String,
}

impl Account {
    pub fn new(account_id: impl Into<String>, encrypted_seed: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            encrypted_seed: encrypted_seed.into(),
        }
    }

    /// The StrKey account id (`G...`)
    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    /// The sealed secret seed, in the keystore's own format
    pub fn encrypted_seed(&self) -> &str {
        &self.encrypted_seed
    }
}

/// Storage for locally held accounts.
///
/// Implementations keep accounts in insertion order. Mutations must be
/// visible in [`load_accounts`](KeyStore::load_accounts) immediately and
/// persisted before they return.
pub trait KeyStore: Send + Sync {
    /// All accounts, in insertion order
    fn load_accounts(&self) -> Result<Vec<Account>, KeyStoreError>;

    /// Generate a new account sealed under `passphrase` and append it
    fn new_account(&self, passphrase: &str) -> Result<Account, KeyStoreError>;

    /// Import a backup produced by [`export_account`](KeyStore::export_account)
    fn import_account(&self, backup: &str, passphrase: &str) -> Result<Account, KeyStoreError>;

    /// Import a raw StrKey secret seed (`S...`), sealing it under `passphrase`
    fn import_secret_seed(&self, seed: &str, passphrase: &str) -> Result<Account, KeyStoreError>;

    /// Delete the account at `index`. An out-of-range index is a no-op.
    fn delete_account(&self, index: usize, passphrase: &str) -> Result<(), KeyStoreError>;

    /// Export an account as a portable encrypted backup, or `None` if the
    /// passphrase does not open it or the account is unknown.
    fn export_account(&self, account: &Account, passphrase: &str) -> Option<String>;

    /// Open an account's sealed seed
    fn decrypt_account(&self, account: &Account, passphrase: &str)
        -> Result<KeyPair, KeyStoreError>;

    /// Re-seal the account at `index` under a new passphrase
    fn change_passphrase(
        &self,
        index: usize,
        old_passphrase: &str,
        new_passphrase: &str,
    ) -> Result<(), KeyStoreError>;

    /// Remove every account
    fn clear_all(&self) -> Result<(), KeyStoreError>;
}
