//! Error types
//!
//! Each layer has its own enum: the keystore reports storage and passphrase
//! problems, the ledger reports transport and protocol problems, and the
//! facade translates both (plus ledger result codes) into [`KinError`].

use thiserror::Error;

use crate::ledger::SubmitTransactionResponse;

/// Transaction result code reported when a transaction's operations failed
pub const TX_FAILED: &str = "tx_failed";
/// Operation result code: source lacks the Kin to cover the payment
pub const OP_UNDERFUNDED: &str = "op_underfunded";
/// Operation result code: destination has no Kin trustline
pub const OP_NO_TRUST: &str = "op_no_trust";
/// Operation result code: source has no Kin trustline
pub const OP_SRC_NO_TRUST: &str = "op_src_no_trust";
/// Operation result code: destination account does not exist
pub const OP_NO_DESTINATION: &str = "op_no_destination";

/// Errors raised by a [`KeyStore`](crate::keystore::KeyStore)
#[derive(Debug, Error)]
pub enum KeyStoreError {
    #[error("Invalid passphrase")]
    InvalidPassphrase,

    #[error("Account not found: {0}")]
    AccountNotFound(String),

    #[error("Account already exists: {0}")]
    DuplicateAccount(String),

    #[error("Corrupted keystore: {0}")]
    Corrupted(String),

    #[error("Cryptographic failure: {0}")]
    Crypto(String),

    #[error("Keystore I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Keystore serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors raised by a [`Ledger`](crate::ledger::Ledger) implementation
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Account {0} was not found on the ledger")]
    AccountNotFound(String),

    #[error("Horizon returned status {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Transaction encoding failed: {0}")]
    Encoding(String),

    #[error("Malformed ledger response: {0}")]
    MalformedResponse(String),
}

/// Errors surfaced by [`KinClient`](crate::KinClient) and
/// [`KinAccount`](crate::KinAccount)
#[derive(Debug, Error)]
pub enum KinError {
    #[error("Account {0} was not found")]
    AccountNotFound(String),

    #[error("Account {0} is not activated for Kin")]
    AccountNotActivated(String),

    #[error("Account was deleted from this keystore")]
    AccountDeleted,

    #[error("Not enough Kin to perform the transaction")]
    InsufficientKin,

    #[error("Transaction failed with result code {}", .transaction_result_code.as_deref().unwrap_or("<none>"))]
    TransactionFailed {
        transaction_result_code: Option<String>,
        operations_result_codes: Option<Vec<String>>,
    },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Could not create account: {0}")]
    CreateAccount(#[source] KeyStoreError),

    #[error("Could not delete account: {0}")]
    DeleteAccount(#[source] KeyStoreError),

    #[error(transparent)]
    KeyStore(#[from] KeyStoreError),

    #[error(transparent)]
    Ledger(LedgerError),
}

impl From<LedgerError> for KinError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::AccountNotFound(address) => KinError::AccountNotFound(address),
            other => KinError::Ledger(other),
        }
    }
}

/// Result type for facade operations
pub type KinResult<T> = std::result::Result<T, KinError>;

/// Translate a failed submission into the matching [`KinError`].
///
/// `destination` names the account reported when the ledger says the
/// counterparty is missing or cannot hold Kin; `source` is reported when
/// the submitting account itself lacks the trustline.
pub fn transaction_error(
    response: &SubmitTransactionResponse,
    source: &str,
    destination: Option<&str>,
) -> KinError {
    let codes = response
        .extras
        .as_ref()
        .and_then(|extras| extras.result_codes.as_ref());

    let transaction_result_code = codes.and_then(|c| c.transaction.clone());
    let operations_result_codes = codes.and_then(|c| c.operations.clone());

    if transaction_result_code.as_deref() == Some(TX_FAILED) {
        if let Some(ops) = &operations_result_codes {
            if ops.iter().any(|op| op == OP_UNDERFUNDED) {
                return KinError::InsufficientKin;
            }
            if ops.iter().any(|op| op == OP_SRC_NO_TRUST) {
                return KinError::AccountNotActivated(source.to_string());
            }
            if let Some(destination) = destination {
                if ops.iter().any(|op| op == OP_NO_TRUST) {
                    return KinError::AccountNotActivated(destination.to_string());
                }
                if ops.iter().any(|op| op == OP_NO_DESTINATION) {
                    return KinError::AccountNotFound(destination.to_string());
                }
            }
        }
    }

    KinError::TransactionFailed {
        transaction_result_code,
        operations_result_codes,
    }
}

/// Reject empty string arguments
pub(crate) fn check_not_empty(value: &str, param_name: &str) -> KinResult<()> {
    if value.is_empty() {
        return Err(KinError::InvalidArgument(format!(
            "{} cannot be empty",
            param_name
        )));
    }
    Ok(())
}
