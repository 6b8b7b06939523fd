//! Horizon REST client
//!
//! Accounts are read from `GET /accounts/{id}`; transactions are built as
//! XDR envelopes, signed locally and posted to `POST /transactions`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use sha2::{Digest, Sha256};
use stellar_xdr::curr::{
    AccountId, AlphaNum4, Asset, AssetCode4, ChangeTrustAsset, ChangeTrustOp,
    DecoratedSignature, Hash, Limits, Memo, MuxedAccount, Operation, OperationBody, PaymentOp,
    Preconditions, PublicKey, SequenceNumber, Signature, SignatureHint, Transaction,
    TransactionEnvelope, TransactionExt, TransactionSignaturePayload,
    TransactionSignaturePayloadTaggedTransaction, TransactionV1Envelope, Uint256, WriteXdr,
};
use tracing::{debug, info, warn};

use super::{AccountInfo, Ledger, Payment, SubmitTransactionResponse};
use crate::error::LedgerError;
use crate::keypair::{decode_account_id, KeyPair};
use crate::service_provider::{KinAsset, Network, ServiceProvider};

/// Fee charged per operation, in stroops
pub const BASE_FEE: u32 = 100;

/// Largest trustline limit the ledger accepts
const MAX_TRUST_LIMIT: i64 = i64::MAX;

/// Memo text limit in bytes
pub const MAX_MEMO_BYTES: usize = 28;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// [`Ledger`] backed by a Horizon server
pub struct HorizonLedger {
    client: Client,
    base_url: String,
    network: Network,
}

impl HorizonLedger {
    /// Create a client for the provider's Horizon endpoint
    pub fn new(provider: &ServiceProvider) -> Result<Self, LedgerError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            client,
            base_url: provider.provider_url().trim_end_matches('/').to_string(),
            network: provider.network(),
        })
    }

    async fn submit(&self, envelope: String) -> Result<SubmitTransactionResponse, LedgerError> {
        let url = format!("{}/transactions", self.base_url);
        let response = self
            .client
            .post(&url)
            .form(&[("tx", envelope)])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        // Horizon reports rejected transactions as 400 with result codes
        if status.is_success() || status == StatusCode::BAD_REQUEST {
            let parsed: SubmitTransactionResponse = serde_json::from_str(&body)
                .map_err(|e| LedgerError::MalformedResponse(e.to_string()))?;
            if parsed.is_success() {
                info!(
                    "Transaction {} included in ledger {}",
                    parsed.hash.as_deref().unwrap_or_default(),
                    parsed.ledger.unwrap_or_default()
                );
            } else {
                warn!("Transaction rejected: {:?}", parsed.extras);
            }
            return Ok(parsed);
        }

        Err(LedgerError::Http {
            status: status.as_u16(),
            body: body.chars().take(200).collect(),
        })
    }

    async fn submit_operation(
        &self,
        source: &KeyPair,
        memo: Option<&str>,
        body: OperationBody,
    ) -> Result<SubmitTransactionResponse, LedgerError> {
        let account = self.account(&source.account_id()).await?;
        let sequence = next_sequence(account.sequence)?;
        let envelope = build_envelope(self.network, source, sequence, memo, body)?;
        self.submit(envelope).await
    }
}

fn next_sequence(current: i64) -> Result<i64, LedgerError> {
    current.checked_add(1).ok_or_else(|| {
        LedgerError::MalformedResponse(format!("Sequence number exhausted: {}", current))
    })
}

#[async_trait]
impl Ledger for HorizonLedger {
    async fn account(&self, address: &str) -> Result<AccountInfo, LedgerError> {
        let url = format!("{}/accounts/{}", self.base_url, address);
        debug!("Fetching account {}", address);

        let response = self.client.get(&url).send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(LedgerError::AccountNotFound(address.to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LedgerError::Http {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| LedgerError::MalformedResponse(e.to_string()))
    }

    async fn submit_payment(
        &self,
        source: &KeyPair,
        payment: &Payment,
    ) -> Result<SubmitTransactionResponse, LedgerError> {
        let destination = decode_account_id(&payment.destination).ok_or_else(|| {
            LedgerError::Encoding(format!("Invalid destination {}", payment.destination))
        })?;

        let body = OperationBody::Payment(PaymentOp {
            destination: MuxedAccount::Ed25519(Uint256(destination)),
            asset: Asset::CreditAlphanum4(alpha_num4(&payment.asset)?),
            amount: payment.amount,
        });

        debug!(
            "Submitting payment of {} stroops from {} to {}",
            payment.amount,
            source.account_id(),
            payment.destination
        );
        self.submit_operation(source, payment.memo.as_deref(), body)
            .await
    }

    async fn submit_change_trust(
        &self,
        source: &KeyPair,
        asset: &KinAsset,
    ) -> Result<SubmitTransactionResponse, LedgerError> {
        let body = OperationBody::ChangeTrust(ChangeTrustOp {
            line: ChangeTrustAsset::CreditAlphanum4(alpha_num4(asset)?),
            limit: MAX_TRUST_LIMIT,
        });

        debug!("Submitting trustline for {} to {}", source.account_id(), asset.code);
        self.submit_operation(source, None, body).await
    }
}

fn alpha_num4(asset: &KinAsset) -> Result<AlphaNum4, LedgerError> {
    let issuer = decode_account_id(&asset.issuer)
        .ok_or_else(|| LedgerError::Encoding(format!("Invalid asset issuer {}", asset.issuer)))?;

    Ok(AlphaNum4 {
        asset_code: AssetCode4(asset.code_bytes()),
        issuer: AccountId(PublicKey::PublicKeyTypeEd25519(Uint256(issuer))),
    })
}

fn encoding(err: stellar_xdr::curr::Error) -> LedgerError {
    LedgerError::Encoding(err.to_string())
}

/// Build a signed single-operation transaction envelope, base64 encoded
pub(crate) fn build_envelope(
    network: Network,
    source: &KeyPair,
    sequence: i64,
    memo: Option<&str>,
    body: OperationBody,
) -> Result<String, LedgerError> {
    let memo = match memo {
        Some(text) if !text.is_empty() => {
            if text.len() > MAX_MEMO_BYTES {
                return Err(LedgerError::Encoding(format!(
                    "Memo exceeds {} bytes",
                    MAX_MEMO_BYTES
                )));
            }
            Memo::Text(text.as_bytes().to_vec().try_into().map_err(encoding)?)
        }
        _ => Memo::None,
    };

    let operation = Operation {
        source_account: None,
        body,
    };

    let tx = Transaction {
        source_account: MuxedAccount::Ed25519(Uint256(source.public_key_bytes())),
        fee: BASE_FEE,
        seq_num: SequenceNumber(sequence),
        cond: Preconditions::None,
        memo,
        operations: vec![operation].try_into().map_err(encoding)?,
        ext: TransactionExt::V0,
    };

    let payload = TransactionSignaturePayload {
        network_id: Hash(network.network_id()),
        tagged_transaction: TransactionSignaturePayloadTaggedTransaction::Tx(tx.clone()),
    };
    let payload_bytes = payload.to_xdr(Limits::none()).map_err(encoding)?;
    let tx_hash: [u8; 32] = Sha256::digest(&payload_bytes).into();

    let signature = DecoratedSignature {
        hint: SignatureHint(source.signature_hint()),
        signature: Signature(source.sign(&tx_hash).to_vec().try_into().map_err(encoding)?),
    };

    let envelope = TransactionEnvelope::Tx(TransactionV1Envelope {
        tx,
        signatures: vec![signature].try_into().map_err(encoding)?,
    });

    envelope.to_xdr_base64(Limits::none()).map_err(encoding)
}
