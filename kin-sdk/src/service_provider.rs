//! Ledger endpoint configuration

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Code of the Kin asset on the Stellar ledger
pub const KIN_ASSET_CODE: &str = "KIN";

/// Kin issuer on the public network
pub const KIN_ISSUER_MAIN: &str = "GDF42M3IPERQCBLWFEZKQRK77JQ65SCKTU3CW36HZVCX7XX5A5QXZIVK";

/// Kin issuer on the test network
pub const KIN_ISSUER_TEST: &str = "GBC3SG6NGTSZ2OMH3FFGB7UVRQWILW367U4GSOOF4TFSZONV42UJXUH7";

const NETWORK_PASSPHRASE_MAIN: &str = "Public Global Stellar Network ; September 2015";
const NETWORK_PASSPHRASE_TEST: &str = "Test SDF Network ; September 2015";

/// Which Stellar network a provider serves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Main,
    #[default]
    Test,
}

impl Network {
    /// The network passphrase that transactions are signed against
    pub fn passphrase(&self) -> &'static str {
        match self {
            Network::Main => NETWORK_PASSPHRASE_MAIN,
            Network::Test => NETWORK_PASSPHRASE_TEST,
        }
    }

    /// SHA-256 of the passphrase, prefixed to every signature payload
    pub fn network_id(&self) -> [u8; 32] {
        Sha256::digest(self.passphrase().as_bytes()).into()
    }

    fn default_kin_issuer(&self) -> &'static str {
        match self {
            Network::Main => KIN_ISSUER_MAIN,
            Network::Test => KIN_ISSUER_TEST,
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Network::Main => write!(f, "main"),
            Network::Test => write!(f, "test"),
        }
    }
}

impl FromStr for Network {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "main" | "mainnet" | "public" => Ok(Network::Main),
            "test" | "testnet" => Ok(Network::Test),
            other => Err(format!("Unknown network '{}', expected 'main' or 'test'", other)),
        }
    }
}

/// A non-native Stellar asset: code plus issuing account
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KinAsset {
    pub code: String,
    pub issuer: String,
}

impl KinAsset {
    /// The asset code padded to Stellar's four-byte form
    pub fn code_bytes(&self) -> [u8; 4] {
        let mut code = [0u8; 4];
        for (slot, byte) in code.iter_mut().zip(self.code.bytes()) {
            *slot = byte;
        }
        code
    }

    /// Whether a Horizon balance line describes this asset
    pub fn matches(&self, code: Option<&str>, issuer: Option<&str>) -> bool {
        code == Some(self.code.as_str()) && issuer == Some(self.issuer.as_str())
    }
}

/// The Horizon endpoint and network the SDK talks to.
///
/// Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceProvider {
    provider_url: String,
    network: Network,
    kin_asset: KinAsset,
}

impl ServiceProvider {
    pub fn new(provider_url: impl Into<String>, network: Network) -> Self {
        Self {
            provider_url: provider_url.into(),
            network,
            kin_asset: KinAsset {
                code: KIN_ASSET_CODE.to_string(),
                issuer: network.default_kin_issuer().to_string(),
            },
        }
    }

    /// Use a different Kin issuer than the network default
    pub fn with_kin_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.kin_asset.issuer = issuer.into();
        self
    }

    pub fn provider_url(&self) -> &str {
        &self.provider_url
    }

    pub fn network(&self) -> Network {
        self.network
    }

    pub fn is_main_net(&self) -> bool {
        self.network == Network::Main
    }

    pub fn kin_asset(&self) -> &KinAsset {
        &self.kin_asset
    }
}
