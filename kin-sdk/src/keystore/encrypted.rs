//! Encrypted Keystore
//!
//! Seals every account's secret seed with:
//! - Argon2id for passphrase-based key derivation
//! - ChaCha20-Poly1305 for authenticated encryption
//!
//! A sealed seed is stored as a single colon-separated string:
//! `v1:<memory_kib>:<iterations>:<parallelism>:<salt>:<nonce hex>:<ciphertext hex>`.
//! The KDF parameters travel with each seed so accounts sealed under older
//! defaults remain readable.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use argon2::{
    password_hash::{rand_core::OsRng, SaltString},
    Argon2, PasswordHasher,
};
use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Nonce,
};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use super::{Account, FileStore, KeyStore, Store};
use crate::error::KeyStoreError;
use crate::keypair::KeyPair;

/// Current keystore document version
const KEYSTORE_VERSION: u32 = 1;

/// Prefix of the sealed seed format
const SEAL_VERSION: &str = "v1";

/// Argon2 parameters (tuned for security vs. usability)
const ARGON2_MEMORY_KB: u32 = 65536; // 64 MB
const ARGON2_ITERATIONS: u32 = 3;
const ARGON2_PARALLELISM: u32 = 4;

/// Ceilings on KDF parameters read back from a seal (1 GiB of memory)
const MAX_MEMORY_KB: u32 = 1 << 20;
const MAX_ITERATIONS: u32 = 16;
const MAX_PARALLELISM: u32 = 16;

const NONCE_LEN: usize = 12;

/// Argon2id cost parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl KdfParams {
    pub fn new(memory_kib: u32, iterations: u32, parallelism: u32) -> Self {
        Self {
            memory_kib,
            iterations,
            parallelism,
        }
    }
}

impl Default for KdfParams {
    fn default() -> Self {
        Self::new(ARGON2_MEMORY_KB, ARGON2_ITERATIONS, ARGON2_PARALLELISM)
    }
}

/// Portable account backup, as produced by export
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountBackup {
    /// StrKey account id
    pub pkey: String,
    /// Sealed secret seed
    pub seed: String,
}

/// On-disk keystore document
#[derive(Serialize, Deserialize)]
struct KeyStoreDocument {
    version: u32,
    accounts: Vec<Account>,
}

/// A secret seed sealed under a passphrase
struct SealedSeed {
    kdf: KdfParams,
    salt: String,
    nonce: [u8; NONCE_LEN],
    ciphertext: Vec<u8>,
}

impl SealedSeed {
    fn seal(seed: &[u8; 32], passphrase: &str, kdf: KdfParams) -> Result<Self, KeyStoreError> {
        // Generate random salt for Argon2
        let salt = SaltString::generate(&mut OsRng);
        let key = derive_key(passphrase, salt.as_str(), kdf)?;

        let mut nonce = [0u8; NONCE_LEN];
        rand::thread_rng().fill(&mut nonce);

        let cipher = ChaCha20Poly1305::new_from_slice(key.as_ref())
            .map_err(|_| KeyStoreError::Crypto("Failed to create cipher".to_string()))?;
        let ciphertext = cipher
            .encrypt(Nonce::from_slice(&nonce), seed.as_slice())
            .map_err(|_| KeyStoreError::Crypto("Encryption failed".to_string()))?;

        Ok(Self {
            kdf,
            salt: salt.to_string(),
            nonce,
            ciphertext,
        })
    }

    fn open(&self, passphrase: &str) -> Result<Zeroizing<[u8; 32]>, KeyStoreError> {
        let key = derive_key(passphrase, &self.salt, self.kdf)?;

        let cipher = ChaCha20Poly1305::new_from_slice(key.as_ref())
            .map_err(|_| KeyStoreError::Crypto("Failed to create cipher".to_string()))?;
        let plaintext = Zeroizing::new(
            cipher
                .decrypt(Nonce::from_slice(&self.nonce), self.ciphertext.as_slice())
                .map_err(|_| KeyStoreError::InvalidPassphrase)?,
        );

        if plaintext.len() != 32 {
            return Err(KeyStoreError::Corrupted("Invalid seed length".to_string()));
        }

        let mut seed = Zeroizing::new([0u8; 32]);
        seed.copy_from_slice(&plaintext);
        Ok(seed)
    }

    fn encode(&self) -> String {
        format!(
            "{}:{}:{}:{}:{}:{}:{}",
            SEAL_VERSION,
            self.kdf.memory_kib,
            self.kdf.iterations,
            self.kdf.parallelism,
            self.salt,
            hex::encode(self.nonce),
            hex::encode(&self.ciphertext)
        )
    }

    fn decode(encoded: &str) -> Result<Self, KeyStoreError> {
        let corrupted = |what: &str| KeyStoreError::Corrupted(format!("Invalid sealed seed: {}", what));

        let parts: Vec<&str> = encoded.split(':').collect();
        if parts.len() != 7 {
            return Err(corrupted("wrong field count"));
        }
        if parts[0] != SEAL_VERSION {
            return Err(KeyStoreError::Corrupted(format!(
                "Unsupported seal version: {} (expected {})",
                parts[0], SEAL_VERSION
            )));
        }

        let number = |field: &str| field.parse::<u32>().map_err(|_| corrupted("KDF parameters"));
        let kdf = KdfParams::new(number(parts[1])?, number(parts[2])?, number(parts[3])?);
        if kdf.memory_kib > MAX_MEMORY_KB
            || kdf.iterations > MAX_ITERATIONS
            || kdf.parallelism > MAX_PARALLELISM
        {
            return Err(corrupted("KDF parameters"));
        }

        let nonce_bytes = hex::decode(parts[5]).map_err(|_| corrupted("nonce format"))?;
        let nonce: [u8; NONCE_LEN] = nonce_bytes
            .try_into()
            .map_err(|_| corrupted("nonce length"))?;
        let ciphertext = hex::decode(parts[6]).map_err(|_| corrupted("ciphertext format"))?;

        Ok(Self {
            kdf,
            salt: parts[4].to_string(),
            nonce,
            ciphertext,
        })
    }
}

/// Derive a 32-byte encryption key from a passphrase using Argon2id
fn derive_key(
    passphrase: &str,
    salt: &str,
    kdf: KdfParams,
) -> Result<Zeroizing<[u8; 32]>, KeyStoreError> {
    let salt = SaltString::from_b64(salt)
        .map_err(|_| KeyStoreError::Corrupted("Invalid salt format".to_string()))?;

    let params = argon2::Params::new(kdf.memory_kib, kdf.iterations, kdf.parallelism, Some(32))
        .map_err(|_| KeyStoreError::Corrupted("Invalid Argon2 parameters".to_string()))?;
    let argon2 = Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params);

    let hash = argon2
        .hash_password(passphrase.as_bytes(), &salt)
        .map_err(|_| KeyStoreError::Crypto("Key derivation failed".to_string()))?;

    let hash_output = hash
        .hash
        .ok_or_else(|| KeyStoreError::Crypto("No hash output".to_string()))?;

    let mut key = Zeroizing::new([0u8; 32]);
    key.copy_from_slice(&hash_output.as_bytes()[..32]);
    Ok(key)
}

/// Keystore that seals account seeds under a passphrase and persists them
/// through a [`Store`].
pub struct EncryptedKeyStore<S = FileStore> {
    store: S,
    kdf: KdfParams,
    accounts: RwLock<Vec<Account>>,
}

impl EncryptedKeyStore<FileStore> {
    /// Open (or start) a keystore document at `path`
    pub fn open_file(path: impl Into<std::path::PathBuf>) -> Result<Self, KeyStoreError> {
        Self::open(FileStore::new(path))
    }
}

impl<S: Store> EncryptedKeyStore<S> {
    /// Load the accounts held by `store`
    pub fn open(store: S) -> Result<Self, KeyStoreError> {
        let accounts = match store.load()? {
            Some(json) => {
                let document: KeyStoreDocument = serde_json::from_str(&json).map_err(|e| {
                    KeyStoreError::Corrupted(format!("Failed to parse keystore: {}", e))
                })?;
                if document.version != KEYSTORE_VERSION {
                    return Err(KeyStoreError::Corrupted(format!(
                        "Unsupported keystore version: {} (expected {})",
                        document.version, KEYSTORE_VERSION
                    )));
                }
                document.accounts
            }
            None => Vec::new(),
        };

        debug!("Opened keystore with {} accounts", accounts.len());

        Ok(Self {
            store,
            kdf: KdfParams::default(),
            accounts: RwLock::new(accounts),
        })
    }

    /// Use different Argon2 costs for newly sealed seeds
    pub fn with_kdf_params(mut self, kdf: KdfParams) -> Self {
        self.kdf = kdf;
        self
    }

    /// The persistence backend
    pub fn store(&self) -> &S {
        &self.store
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Vec<Account>>, KeyStoreError> {
        self.accounts
            .read()
            .map_err(|_| KeyStoreError::Corrupted("keystore lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Vec<Account>>, KeyStoreError> {
        self.accounts
            .write()
            .map_err(|_| KeyStoreError::Corrupted("keystore lock poisoned".to_string()))
    }

    fn persist(&self, accounts: &[Account]) -> Result<(), KeyStoreError> {
        let document = KeyStoreDocument {
            version: KEYSTORE_VERSION,
            accounts: accounts.to_vec(),
        };
        let json = serde_json::to_string_pretty(&document)?;
        self.store.save(&json)
    }

    fn seal(&self, keypair: &KeyPair, passphrase: &str) -> Result<Account, KeyStoreError> {
        let sealed = SealedSeed::seal(&keypair.raw_seed(), passphrase, self.kdf)?;
        Ok(Account::new(keypair.account_id(), sealed.encode()))
    }

    /// Append a sealed account, keeping memory and storage in step
    fn append(&self, keypair: &KeyPair, passphrase: &str) -> Result<Account, KeyStoreError> {
        let account = self.seal(keypair, passphrase)?;

        let mut accounts = self.write()?;
        if accounts.iter().any(|a| a.account_id() == account.account_id()) {
            return Err(KeyStoreError::DuplicateAccount(account.account_id().to_string()));
        }

        let mut updated = accounts.clone();
        updated.push(account.clone());
        self.persist(&updated)?;
        *accounts = updated;

        info!("Added account {} at index {}", account.account_id(), accounts.len() - 1);
        Ok(account)
    }
}

impl<S: Store> KeyStore for EncryptedKeyStore<S> {
    fn load_accounts(&self) -> Result<Vec<Account>, KeyStoreError> {
        Ok(self.read()?.clone())
    }

    fn new_account(&self, passphrase: &str) -> Result<Account, KeyStoreError> {
        self.append(&KeyPair::random(), passphrase)
    }

    fn import_account(&self, backup: &str, passphrase: &str) -> Result<Account, KeyStoreError> {
        let backup: AccountBackup = serde_json::from_str(backup)
            .map_err(|e| KeyStoreError::Corrupted(format!("Invalid account backup: {}", e)))?;

        let seed = SealedSeed::decode(&backup.seed)?.open(passphrase)?;
        let keypair = KeyPair::from_raw_seed(&seed);

        if keypair.account_id() != backup.pkey {
            return Err(KeyStoreError::Corrupted(
                "Backup seed does not match its public key".to_string(),
            ));
        }

        self.append(&keypair, passphrase)
    }

    fn import_secret_seed(&self, seed: &str, passphrase: &str) -> Result<Account, KeyStoreError> {
        let keypair = KeyPair::from_secret_seed(seed)?;
        self.append(&keypair, passphrase)
    }

    fn delete_account(&self, index: usize, passphrase: &str) -> Result<(), KeyStoreError> {
        let mut accounts = self.write()?;

        let Some(account) = accounts.get(index) else {
            debug!("Delete at index {} ignored, keystore holds {}", index, accounts.len());
            return Ok(());
        };

        // Only the passphrase holder may delete
        SealedSeed::decode(account.encrypted_seed())?.open(passphrase)?;

        let mut updated = accounts.clone();
        let removed = updated.remove(index);
        self.persist(&updated)?;
        *accounts = updated;

        info!("Deleted account {} at index {}", removed.account_id(), index);
        Ok(())
    }

    fn export_account(&self, account: &Account, passphrase: &str) -> Option<String> {
        let known = self
            .read()
            .ok()?
            .iter()
            .any(|a| a.account_id() == account.account_id());
        if !known {
            warn!("Export requested for unknown account {}", account.account_id());
            return None;
        }

        let export = || -> Result<String, KeyStoreError> {
            let seed = SealedSeed::decode(account.encrypted_seed())?.open(passphrase)?;
            let resealed = SealedSeed::seal(&seed, passphrase, self.kdf)?;
            let backup = AccountBackup {
                pkey: account.account_id().to_string(),
                seed: resealed.encode(),
            };
            Ok(serde_json::to_string(&backup)?)
        };

        match export() {
            Ok(json) => Some(json),
            Err(e) => {
                warn!("Failed to export account {}: {}", account.account_id(), e);
                None
            }
        }
    }

    fn decrypt_account(
        &self,
        account: &Account,
        passphrase: &str,
    ) -> Result<KeyPair, KeyStoreError> {
        let seed = SealedSeed::decode(account.encrypted_seed())?.open(passphrase)?;
        let keypair = KeyPair::from_raw_seed(&seed);

        if keypair.account_id() != account.account_id() {
            return Err(KeyStoreError::Corrupted(format!(
                "Sealed seed does not belong to {}",
                account.account_id()
            )));
        }
        Ok(keypair)
    }

    fn change_passphrase(
        &self,
        index: usize,
        old_passphrase: &str,
        new_passphrase: &str,
    ) -> Result<(), KeyStoreError> {
        let mut accounts = self.write()?;

        let account = accounts
            .get(index)
            .ok_or_else(|| KeyStoreError::AccountNotFound(format!("index {}", index)))?;

        let seed = SealedSeed::decode(account.encrypted_seed())?.open(old_passphrase)?;
        let resealed = SealedSeed::seal(&seed, new_passphrase, self.kdf)?;

        let mut updated = accounts.clone();
        updated[index] = Account::new(account.account_id(), resealed.encode());
        self.persist(&updated)?;
        *accounts = updated;

        Ok(())
    }

    fn clear_all(&self) -> Result<(), KeyStoreError> {
        let mut accounts = self.write()?;
        self.store.clear()?;
        accounts.clear();
        info!("Cleared keystore");
        Ok(())
    }
}
