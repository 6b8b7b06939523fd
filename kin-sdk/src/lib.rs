//! Kin SDK
//!
//! Kin account management on top of the Stellar ledger.
//!
//! ## Security Model
//!
//! - Secret seeds never leave the keystore unencrypted
//! - Every seed is sealed under its own passphrase (Argon2id + ChaCha20-Poly1305)
//! - Transactions are signed locally; Horizon only sees signed envelopes
//!
//! ## Layers
//!
//! - [`keystore`]: encrypted, ordered account storage
//! - [`ledger`]: Horizon access behind the [`Ledger`] trait
//! - [`KinClient`] / [`KinAccount`]: the public facade
//! - [`Request`]: deferred execution with detachable callbacks

pub mod balance;
pub mod client_wrapper;
pub mod error;
pub mod keypair;
pub mod keystore;
pub mod kin_account;
pub mod kin_client;
pub mod ledger;
pub mod request;
pub mod service_provider;

pub use balance::Balance;
pub use client_wrapper::ClientWrapper;
pub use error::{KeyStoreError, KinError, KinResult, LedgerError};
pub use keypair::KeyPair;
pub use keystore::{Account, EncryptedKeyStore, KeyStore};
pub use kin_account::{AccountStatus, KinAccount, TransactionId};
pub use kin_client::KinClient;
pub use ledger::{HorizonLedger, Ledger};
pub use request::{Request, RequestHandle};
pub use service_provider::{Network, ServiceProvider};
