//! Shared plumbing behind the facade

use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;

use crate::error::KinResult;
use crate::keystore::{EncryptedKeyStore, KeyStore};
use crate::ledger::{HorizonLedger, Ledger};
use crate::service_provider::ServiceProvider;

/// Holds the service provider together with the keystore and ledger
/// handles that every [`KinClient`](crate::KinClient) and
/// [`KinAccount`](crate::KinAccount) shares.
#[derive(Clone)]
pub struct ClientWrapper {
    service_provider: ServiceProvider,
    keystore: Arc<dyn KeyStore>,
    ledger: Arc<dyn Ledger>,
}

impl ClientWrapper {
    /// Production wiring: an encrypted keystore file at `keystore_path` and
    /// a Horizon client for `service_provider`
    pub fn new(service_provider: ServiceProvider, keystore_path: impl Into<PathBuf>) -> KinResult<Self> {
        let keystore_path = keystore_path.into();
        debug!(
            "Opening keystore {} for {}",
            keystore_path.display(),
            service_provider.provider_url()
        );

        let keystore = EncryptedKeyStore::open_file(keystore_path)?;
        let ledger = HorizonLedger::new(&service_provider)?;

        Ok(Self::with_parts(
            service_provider,
            Arc::new(keystore),
            Arc::new(ledger),
        ))
    }

    /// Wire arbitrary keystore and ledger implementations
    pub fn with_parts(
        service_provider: ServiceProvider,
        keystore: Arc<dyn KeyStore>,
        ledger: Arc<dyn Ledger>,
    ) -> Self {
        Self {
            service_provider,
            keystore,
            ledger,
        }
    }

    pub fn service_provider(&self) -> &ServiceProvider {
        &self.service_provider
    }

    pub fn keystore(&self) -> &Arc<dyn KeyStore> {
        &self.keystore
    }

    pub fn ledger(&self) -> &Arc<dyn Ledger> {
        &self.ledger
    }
}

impl std::fmt::Debug for ClientWrapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientWrapper")
            .field("service_provider", &self.service_provider)
            .finish_non_exhaustive()
    }
}
