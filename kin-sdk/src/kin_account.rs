//! Per-account facade
//!
//! A [`KinAccount`] is a handle onto one keystore account. Balance and
//! payment calls go straight to the ledger; the secret seed is decrypted
//! only for the duration of a signing call.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info};

use crate::balance::Balance;
use crate::client_wrapper::ClientWrapper;
use crate::error::{
    check_not_empty, transaction_error, KeyStoreError, KinError, KinResult, LedgerError,
};
use crate::keypair::{is_valid_account_id, KeyPair};
use crate::keystore::Account;
use crate::ledger::{AccountInfo, Payment, MAX_MEMO_BYTES};
use crate::request::Request;

/// Hash of a transaction accepted by the ledger
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TransactionId(String);

impl TransactionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn id(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where an account stands on the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountStatus {
    /// The ledger has never seen the account
    NotCreated,
    /// The account exists but has no Kin trustline
    NotActivated,
    /// The account can send and receive Kin
    Activated,
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountStatus::NotCreated => write!(f, "not created"),
            AccountStatus::NotActivated => write!(f, "not activated"),
            AccountStatus::Activated => write!(f, "activated"),
        }
    }
}

/// Handle onto one locally held account
#[derive(Clone)]
pub struct KinAccount {
    account: Account,
    wrapper: ClientWrapper,
    deleted: Arc<AtomicBool>,
}

impl KinAccount {
    pub(crate) fn new(account: Account, wrapper: ClientWrapper) -> Self {
        Self {
            account,
            wrapper,
            deleted: Arc::new(AtomicBool::new(false)),
        }
    }

    /// The account's StrKey address, or `None` once the account was deleted
    pub fn public_address(&self) -> Option<&str> {
        if self.is_deleted() {
            return None;
        }
        Some(self.account.account_id())
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted.load(Ordering::SeqCst)
    }

    pub(crate) fn mark_deleted(&self) {
        self.deleted.store(true, Ordering::SeqCst);
    }

    /// Current Kin balance
    pub async fn balance(&self) -> KinResult<Balance> {
        let address = self.live_address()?;
        let info = self.wrapper.ledger().account(address).await?;
        self.kin_balance(&info)
    }

    /// [`balance`](Self::balance) as a deferred [`Request`]
    pub fn balance_request(&self) -> Request<Balance> {
        let account = self.clone();
        Request::new(async move { account.balance().await })
    }

    /// Whether the account exists on the ledger and trusts Kin
    pub async fn status(&self) -> KinResult<AccountStatus> {
        let address = self.live_address()?;
        let asset = self.wrapper.service_provider().kin_asset();

        match self.wrapper.ledger().account(address).await {
            Ok(info) if info.balance_of(asset).is_some() => Ok(AccountStatus::Activated),
            Ok(_) => Ok(AccountStatus::NotActivated),
            Err(LedgerError::AccountNotFound(_)) => Ok(AccountStatus::NotCreated),
            Err(e) => Err(e.into()),
        }
    }

    pub fn status_request(&self) -> Request<AccountStatus> {
        let account = self.clone();
        Request::new(async move { account.status().await })
    }

    /// Establish the Kin trustline so the account can hold Kin.
    ///
    /// The account must already exist on the ledger. Activating an
    /// activated account does nothing.
    pub async fn activate(&self, passphrase: &str) -> KinResult<()> {
        let address = self.live_address()?;
        check_not_empty(passphrase, "passphrase")?;

        let asset = self.wrapper.service_provider().kin_asset();
        let info = self.wrapper.ledger().account(address).await?;
        if info.balance_of(asset).is_some() {
            debug!("Account {} already trusts {}", address, asset.code);
            return Ok(());
        }

        let keypair = self.keypair(passphrase)?;
        let response = self
            .wrapper
            .ledger()
            .submit_change_trust(&keypair, asset)
            .await?;

        if !response.is_success() {
            return Err(transaction_error(&response, address, None));
        }

        info!("Activated account {}", address);
        Ok(())
    }

    pub fn activate_request(&self, passphrase: impl Into<String>) -> Request<()> {
        let account = self.clone();
        let passphrase = passphrase.into();
        Request::new(async move { account.activate(&passphrase).await })
    }

    /// Pay `amount` Kin to `to`, with an optional text memo of at most
    /// 28 bytes
    pub async fn send_transaction(
        &self,
        to: &str,
        passphrase: &str,
        amount: Balance,
        memo: Option<&str>,
    ) -> KinResult<TransactionId> {
        let source = self.live_address()?;
        validate_payment(to, passphrase, amount, memo)?;

        let keypair = self.keypair(passphrase)?;
        let asset = self.wrapper.service_provider().kin_asset();

        // Catch a missing or untrusting destination before paying the fee
        let destination = self.wrapper.ledger().account(to).await?;
        if destination.balance_of(asset).is_none() {
            return Err(KinError::AccountNotActivated(to.to_string()));
        }

        let payment = Payment {
            destination: to.to_string(),
            amount: amount.stroops(),
            memo: memo.filter(|m| !m.is_empty()).map(str::to_string),
            asset: asset.clone(),
        };

        let response = self
            .wrapper
            .ledger()
            .submit_payment(&keypair, &payment)
            .await?;

        match response.hash.as_deref() {
            Some(hash) if response.is_success() => {
                info!("Sent {} from {} to {}: {}", amount, source, to, hash);
                Ok(TransactionId::new(hash))
            }
            _ => Err(transaction_error(&response, source, Some(to))),
        }
    }

    /// [`send_transaction`](Self::send_transaction) as a deferred [`Request`]
    pub fn send_transaction_request(
        &self,
        to: impl Into<String>,
        passphrase: impl Into<String>,
        amount: Balance,
        memo: Option<String>,
    ) -> Request<TransactionId> {
        let account = self.clone();
        let to = to.into();
        let passphrase = passphrase.into();
        Request::new(async move {
            account
                .send_transaction(&to, &passphrase, amount, memo.as_deref())
                .await
        })
    }

    /// Export the account as an encrypted backup that
    /// [`KinClient::import_account`](crate::KinClient::import_account) accepts
    pub fn export(&self, passphrase: &str) -> KinResult<String> {
        self.live_address()?;
        check_not_empty(passphrase, "passphrase")?;

        // Surface a wrong passphrase as such rather than a bare failure
        self.keypair(passphrase)?;

        self.wrapper
            .keystore()
            .export_account(&self.account, passphrase)
            .ok_or_else(|| {
                KinError::KeyStore(KeyStoreError::Crypto(format!(
                    "Could not export account {}",
                    self.account.account_id()
                )))
            })
    }

    fn live_address(&self) -> KinResult<&str> {
        self.public_address().ok_or(KinError::AccountDeleted)
    }

    fn keypair(&self, passphrase: &str) -> KinResult<KeyPair> {
        Ok(self
            .wrapper
            .keystore()
            .decrypt_account(&self.account, passphrase)?)
    }

    fn kin_balance(&self, info: &AccountInfo) -> KinResult<Balance> {
        let asset = self.wrapper.service_provider().kin_asset();
        let line = info
            .balance_of(asset)
            .ok_or_else(|| KinError::AccountNotActivated(info.account_id.clone()))?;
        Balance::parse(&line.balance)
    }
}

impl fmt::Debug for KinAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KinAccount")
            .field("public_address", &self.account.account_id())
            .field("deleted", &self.is_deleted())
            .finish()
    }
}

/// Reject a payment before anything touches the network
fn validate_payment(
    to: &str,
    passphrase: &str,
    amount: Balance,
    memo: Option<&str>,
) -> KinResult<()> {
    check_not_empty(to, "public address")?;
    check_not_empty(passphrase, "passphrase")?;

    if !is_valid_account_id(to) {
        return Err(KinError::InvalidArgument(format!(
            "Invalid public address: {}",
            to
        )));
    }
    if amount.stroops() <= 0 {
        return Err(KinError::InvalidArgument(
            "Amount must be positive".to_string(),
        ));
    }
    if let Some(memo) = memo {
        if memo.len() > MAX_MEMO_BYTES {
            return Err(KinError::InvalidArgument(format!(
                "Memo cannot be longer than {} bytes",
                MAX_MEMO_BYTES
            )));
        }
    }
    Ok(())
}
