//! Account Keys
//!
//! Ed25519 keypairs for Stellar accounts. The public half is rendered as a
//! StrKey account id (`G...`), the private half as a StrKey secret seed
//! (`S...`). Text encoding is delegated to `stellar-strkey`, signing to
//! `ed25519-dalek`.
//!
//! Security: the secret seed is only ever handed out wrapped in
//! `Zeroizing<String>`, and the signing key zeroizes itself on drop.

use ed25519_dalek::{Signer, SigningKey};
use rand::rngs::OsRng;
use stellar_strkey::ed25519::{PrivateKey, PublicKey};
use zeroize::Zeroizing;

use crate::error::KeyStoreError;

/// A Stellar account keypair
#[derive(Clone)]
pub struct KeyPair {
    signing_key: SigningKey,
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("account_id", &self.account_id())
            .finish_non_exhaustive()
    }
}

impl KeyPair {
    /// Generate a new random keypair
    pub fn random() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    /// Restore a keypair from a StrKey secret seed (`S...`)
    pub fn from_secret_seed(seed: &str) -> Result<Self, KeyStoreError> {
        let private = PrivateKey::from_string(seed.trim())
            .map_err(|_| KeyStoreError::Crypto("Invalid secret seed".to_string()))?;
        let raw = Zeroizing::new(private.0);
        Ok(Self::from_raw_seed(&raw))
    }

    /// Restore a keypair from the raw 32-byte ed25519 seed
    pub fn from_raw_seed(seed: &[u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(seed),
        }
    }

    /// The StrKey account id (`G...`), used as the public address
    pub fn account_id(&self) -> String {
        PublicKey(self.public_key_bytes()).to_string()
    }

    /// The StrKey secret seed (`S...`)
    pub fn secret_seed(&self) -> Zeroizing<String> {
        Zeroizing::new(PrivateKey(self.signing_key.to_bytes()).to_string())
    }

    /// The raw 32-byte ed25519 seed
    pub fn raw_seed(&self) -> Zeroizing<[u8; 32]> {
        Zeroizing::new(self.signing_key.to_bytes())
    }

    /// Raw public key bytes
    pub fn public_key_bytes(&self) -> [u8; 32] {
        self.signing_key.verifying_key().to_bytes()
    }

    /// The last four bytes of the public key; Stellar's signature hint
    pub fn signature_hint(&self) -> [u8; 4] {
        let public = self.public_key_bytes();
        let mut hint = [0u8; 4];
        hint.copy_from_slice(&public[28..]);
        hint
    }

    /// Sign a message with the account's private key
    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        self.signing_key.sign(message).to_bytes()
    }
}

/// Decode a StrKey account id into raw public key bytes
pub fn decode_account_id(account_id: &str) -> Option<[u8; 32]> {
    PublicKey::from_string(account_id.trim()).ok().map(|key| key.0)
}

/// Check whether a string is a well-formed StrKey account id
pub fn is_valid_account_id(account_id: &str) -> bool {
    decode_account_id(account_id).is_some()
}
