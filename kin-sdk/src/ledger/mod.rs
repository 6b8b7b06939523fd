//! Ledger access
//!
//! The SDK talks to the Stellar ledger through the [`Ledger`] trait. The
//! production implementation is [`HorizonLedger`], which speaks Horizon's
//! REST API; tests substitute in-process fakes.

mod horizon;

pub use horizon::{HorizonLedger, BASE_FEE, MAX_MEMO_BYTES};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::LedgerError;
use crate::keypair::KeyPair;
use crate::service_provider::KinAsset;

/// Horizon's asset type for lumens
pub const ASSET_TYPE_NATIVE: &str = "native";

/// An account as the ledger reports it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountInfo {
    pub account_id: String,
    #[serde(with = "sequence_string")]
    pub sequence: i64,
    #[serde(default)]
    pub balances: Vec<AssetBalance>,
}

impl AccountInfo {
    /// The balance line for `asset`, if the account trusts it
    pub fn balance_of(&self, asset: &KinAsset) -> Option<&AssetBalance> {
        self.balances
            .iter()
            .find(|b| asset.matches(b.asset_code.as_deref(), b.asset_issuer.as_deref()))
    }
}

/// One balance line of an account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetBalance {
    pub asset_type: String,
    #[serde(default)]
    pub asset_code: Option<String>,
    #[serde(default)]
    pub asset_issuer: Option<String>,
    pub balance: String,
}

/// A payment of a non-native asset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payment {
    pub destination: String,
    /// Amount in stroops
    pub amount: i64,
    pub memo: Option<String>,
    pub asset: KinAsset,
}

/// Horizon's answer to a transaction submission
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitTransactionResponse {
    #[serde(default)]
    pub hash: Option<String>,
    #[serde(default)]
    pub ledger: Option<u64>,
    #[serde(default)]
    pub extras: Option<SubmitExtras>,
}

impl SubmitTransactionResponse {
    /// Whether the transaction made it into a ledger
    pub fn is_success(&self) -> bool {
        self.ledger.is_some() && self.hash.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitExtras {
    #[serde(default)]
    pub result_codes: Option<ResultCodes>,
}

/// Result codes of a rejected transaction
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultCodes {
    #[serde(default)]
    pub transaction: Option<String>,
    #[serde(default)]
    pub operations: Option<Vec<String>>,
}

/// Read and write access to the Stellar ledger
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Fetch an account. Unknown accounts yield
    /// [`LedgerError::AccountNotFound`].
    async fn account(&self, address: &str) -> Result<AccountInfo, LedgerError>;

    /// Sign and submit a single-payment transaction from `source`.
    ///
    /// A rejected transaction is not an error: the response carries the
    /// ledger's result codes instead.
    async fn submit_payment(
        &self,
        source: &KeyPair,
        payment: &Payment,
    ) -> Result<SubmitTransactionResponse, LedgerError>;

    /// Sign and submit a change-trust transaction establishing a trustline
    /// from `source` to `asset`
    async fn submit_change_trust(
        &self,
        source: &KeyPair,
        asset: &KinAsset,
    ) -> Result<SubmitTransactionResponse, LedgerError>;
}

/// Horizon renders sequence numbers as JSON strings
mod sequence_string {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &i64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(i64),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Text(text) => text.parse().map_err(de::Error::custom),
            Raw::Number(number) => Ok(number),
        }
    }
}
