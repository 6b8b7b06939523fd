//! Integration tests for kin-sdk
//!
//! These tests drive the public facade end to end:
//! - KinClient account management over a fake keystore
//! - KinAccount balance, activation and payments over a fake ledger
//! - Persistence through the encrypted file keystore
//! - Deferred requests and callback detachment

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use kin_sdk::{
    error::{KeyStoreError, LedgerError},
    keypair::KeyPair,
    keystore::{Account, AccountBackup, EncryptedKeyStore, KdfParams, KeyStore, MemoryStore},
    ledger::{
        AccountInfo, AssetBalance, Ledger, Payment, ResultCodes, SubmitExtras,
        SubmitTransactionResponse,
    },
    service_provider::{KinAsset, KIN_ISSUER_TEST},
    AccountStatus, Balance, ClientWrapper, KinAccount, KinClient, KinError, Network,
    ServiceProvider,
};
use tempfile::TempDir;

const PASSPHRASE: &str = "secure-test-password-123!";
const PROVIDER_URL: &str = "https://horizon-testnet.stellar.org";

// ============================================================================
// Fakes
// ============================================================================

/// Keystore that keeps keypairs in memory, "sealed" by remembering the
/// passphrase next to them
#[derive(Default)]
struct FakeKeyStore {
    entries: Mutex<Vec<(Account, KeyPair, String)>>,
}

impl FakeKeyStore {
    fn with_accounts(count: usize) -> Self {
        let store = Self::default();
        for _ in 0..count {
            store.new_account(PASSPHRASE).unwrap();
        }
        store
    }

    fn append(&self, keypair: KeyPair, passphrase: &str) -> Result<Account, KeyStoreError> {
        let mut entries = self.entries.lock().unwrap();
        let account_id = keypair.account_id();
        if entries.iter().any(|(a, _, _)| a.account_id() == account_id) {
            return Err(KeyStoreError::DuplicateAccount(account_id));
        }
        let account = Account::new(account_id.clone(), format!("fake:{}", account_id));
        entries.push((account.clone(), keypair, passphrase.to_string()));
        Ok(account)
    }
}

impl KeyStore for FakeKeyStore {
    fn load_accounts(&self) -> Result<Vec<Account>, KeyStoreError> {
        Ok(self
            .entries
            .lock()
            .unwrap()
            .iter()
            .map(|(a, _, _)| a.clone())
            .collect())
    }

    fn new_account(&self, passphrase: &str) -> Result<Account, KeyStoreError> {
        self.append(KeyPair::random(), passphrase)
    }

    fn import_account(&self, backup: &str, passphrase: &str) -> Result<Account, KeyStoreError> {
        let backup: AccountBackup = serde_json::from_str(backup)?;
        let keypair = KeyPair::from_secret_seed(&backup.seed)?;
        self.append(keypair, passphrase)
    }

    fn import_secret_seed(&self, seed: &str, passphrase: &str) -> Result<Account, KeyStoreError> {
        self.append(KeyPair::from_secret_seed(seed)?, passphrase)
    }

    fn delete_account(&self, index: usize, passphrase: &str) -> Result<(), KeyStoreError> {
        let mut entries = self.entries.lock().unwrap();
        match entries.get(index) {
            None => Ok(()),
            Some((_, _, stored)) if stored != passphrase => Err(KeyStoreError::InvalidPassphrase),
            Some(_) => {
                entries.remove(index);
                Ok(())
            }
        }
    }

    fn export_account(&self, account: &Account, passphrase: &str) -> Option<String> {
        let keypair = self.decrypt_account(account, passphrase).ok()?;
        serde_json::to_string(&AccountBackup {
            pkey: keypair.account_id(),
            seed: keypair.secret_seed().to_string(),
        })
        .ok()
    }

    fn decrypt_account(
        &self,
        account: &Account,
        passphrase: &str,
    ) -> Result<KeyPair, KeyStoreError> {
        let entries = self.entries.lock().unwrap();
        let (_, keypair, stored) = entries
            .iter()
            .find(|(a, _, _)| a.account_id() == account.account_id())
            .ok_or_else(|| KeyStoreError::AccountNotFound(account.account_id().to_string()))?;
        if stored != passphrase {
            return Err(KeyStoreError::InvalidPassphrase);
        }
        Ok(keypair.clone())
    }

    fn change_passphrase(
        &self,
        index: usize,
        old_passphrase: &str,
        new_passphrase: &str,
    ) -> Result<(), KeyStoreError> {
        let mut entries = self.entries.lock().unwrap();
        let entry = entries
            .get_mut(index)
            .ok_or_else(|| KeyStoreError::AccountNotFound(format!("index {}", index)))?;
        if entry.2 != old_passphrase {
            return Err(KeyStoreError::InvalidPassphrase);
        }
        entry.2 = new_passphrase.to_string();
        Ok(())
    }

    fn clear_all(&self) -> Result<(), KeyStoreError> {
        self.entries.lock().unwrap().clear();
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Submission {
    Payment { source: String, payment: Payment },
    ChangeTrust { source: String, asset: KinAsset },
}

/// Ledger holding a fixed set of accounts and recording submissions
#[derive(Default)]
struct FakeLedger {
    accounts: Mutex<HashMap<String, AccountInfo>>,
    submissions: Mutex<Vec<Submission>>,
    rejection: Mutex<Option<SubmitTransactionResponse>>,
}

impl FakeLedger {
    fn add_account(&self, address: &str, kin: Option<&str>) {
        let mut balances = vec![AssetBalance {
            asset_type: "native".to_string(),
            asset_code: None,
            asset_issuer: None,
            balance: "10000.0000000".to_string(),
        }];
        if let Some(kin) = kin {
            balances.push(AssetBalance {
                asset_type: "credit_alphanum4".to_string(),
                asset_code: Some("KIN".to_string()),
                asset_issuer: Some(KIN_ISSUER_TEST.to_string()),
                balance: kin.to_string(),
            });
        }
        self.accounts.lock().unwrap().insert(
            address.to_string(),
            AccountInfo {
                account_id: address.to_string(),
                sequence: 100,
                balances,
            },
        );
    }

    fn reject_with(&self, transaction: &str, operations: &[&str]) {
        *self.rejection.lock().unwrap() = Some(SubmitTransactionResponse {
            hash: None,
            ledger: None,
            extras: Some(SubmitExtras {
                result_codes: Some(ResultCodes {
                    transaction: Some(transaction.to_string()),
                    operations: Some(operations.iter().map(|s| s.to_string()).collect()),
                }),
            }),
        });
    }

    fn submissions(&self) -> Vec<Submission> {
        self.submissions.lock().unwrap().clone()
    }

    fn respond(&self, submission: Submission) -> SubmitTransactionResponse {
        let mut submissions = self.submissions.lock().unwrap();
        submissions.push(submission);
        if let Some(rejection) = self.rejection.lock().unwrap().clone() {
            return rejection;
        }
        SubmitTransactionResponse {
            hash: Some(format!("tx-{}", submissions.len())),
            ledger: Some(7),
            extras: None,
        }
    }
}

#[async_trait]
impl Ledger for FakeLedger {
    async fn account(&self, address: &str) -> Result<AccountInfo, LedgerError> {
        self.accounts
            .lock()
            .unwrap()
            .get(address)
            .cloned()
            .ok_or_else(|| LedgerError::AccountNotFound(address.to_string()))
    }

    async fn submit_payment(
        &self,
        source: &KeyPair,
        payment: &Payment,
    ) -> Result<SubmitTransactionResponse, LedgerError> {
        Ok(self.respond(Submission::Payment {
            source: source.account_id(),
            payment: payment.clone(),
        }))
    }

    async fn submit_change_trust(
        &self,
        source: &KeyPair,
        asset: &KinAsset,
    ) -> Result<SubmitTransactionResponse, LedgerError> {
        Ok(self.respond(Submission::ChangeTrust {
            source: source.account_id(),
            asset: asset.clone(),
        }))
    }
}

fn provider() -> ServiceProvider {
    ServiceProvider::new(PROVIDER_URL, Network::Test)
}

fn client_with(keystore: Arc<dyn KeyStore>, ledger: Arc<FakeLedger>) -> KinClient {
    KinClient::with_wrapper(ClientWrapper::with_parts(provider(), keystore, ledger)).unwrap()
}

fn fake_client(accounts: usize) -> (KinClient, Arc<FakeLedger>) {
    let ledger = Arc::new(FakeLedger::default());
    let client = client_with(
        Arc::new(FakeKeyStore::with_accounts(accounts)),
        Arc::clone(&ledger),
    );
    (client, ledger)
}

fn address_of(account: &KinAccount) -> String {
    account.public_address().unwrap().to_string()
}

fn kin(amount: &str) -> Balance {
    Balance::parse(amount).unwrap()
}

// ============================================================================
// KinClient Tests
// ============================================================================

mod kin_client {
    use super::*;

    #[test]
    fn test_create_account_adds_when_empty() {
        let (mut client, _) = fake_client(0);

        let account = client.create_account(PASSPHRASE).unwrap();

        assert!(client.has_account());
        assert_eq!(client.accounts_count(), 1);
        assert_eq!(address_of(&client.account().unwrap()), address_of(&account));
    }

    #[test]
    fn test_create_account_returns_existing_first() {
        let (mut client, _) = fake_client(2);
        let first = address_of(&client.account_at(0).unwrap());

        let account = client.create_account(PASSPHRASE).unwrap();

        assert_eq!(address_of(&account), first);
        assert_eq!(client.accounts_count(), 2);
    }

    #[test]
    fn test_add_account_always_adds() {
        let (mut client, _) = fake_client(0);

        let first = client.add_account(PASSPHRASE).unwrap();
        let second = client.add_account(PASSPHRASE).unwrap();

        assert_eq!(client.accounts_count(), 2);
        assert_ne!(address_of(&first), address_of(&second));
        assert_eq!(address_of(&client.account_at(1).unwrap()), address_of(&second));
    }

    #[test]
    fn test_add_account_rejects_empty_passphrase() {
        let (mut client, _) = fake_client(0);
        assert!(matches!(
            client.add_account(""),
            Err(KinError::InvalidArgument(_))
        ));
        assert_eq!(client.accounts_count(), 0);
    }

    #[test]
    fn test_account_lookup() {
        let (client, _) = fake_client(0);
        assert!(client.account().is_none());
        assert!(!client.has_account());

        let (client, _) = fake_client(3);
        assert!(client.account().is_some());
        assert!(client.account_at(2).is_some());
        assert!(client.account_at(3).is_none());
    }

    #[test]
    fn test_accounts_loaded_from_keystore() {
        let keystore = Arc::new(FakeKeyStore::with_accounts(2));
        let expected: Vec<String> = keystore
            .load_accounts()
            .unwrap()
            .iter()
            .map(|a| a.account_id().to_string())
            .collect();

        let client = client_with(keystore, Arc::new(FakeLedger::default()));

        assert_eq!(client.accounts_count(), 2);
        assert_eq!(address_of(&client.account_at(0).unwrap()), expected[0]);
        assert_eq!(address_of(&client.account_at(1).unwrap()), expected[1]);
    }

    #[test]
    fn test_delete_account_removes_first() {
        let (mut client, _) = fake_client(2);
        let second = address_of(&client.account_at(1).unwrap());

        client.delete_account(PASSPHRASE).unwrap();

        assert_eq!(client.accounts_count(), 1);
        assert_eq!(address_of(&client.account().unwrap()), second);
    }

    #[test]
    fn test_delete_account_at_index() {
        let (mut client, _) = fake_client(3);
        let first = address_of(&client.account_at(0).unwrap());
        let third = address_of(&client.account_at(2).unwrap());

        client.delete_account_at(1, PASSPHRASE).unwrap();

        assert_eq!(client.accounts_count(), 2);
        assert_eq!(address_of(&client.account_at(0).unwrap()), first);
        assert_eq!(address_of(&client.account_at(1).unwrap()), third);
    }

    #[test]
    fn test_delete_out_of_range_is_noop() {
        let (mut client, _) = fake_client(1);

        client.delete_account_at(5, PASSPHRASE).unwrap();
        assert_eq!(client.accounts_count(), 1);

        let (mut empty, _) = fake_client(0);
        empty.delete_account("anything").unwrap();
        assert_eq!(empty.accounts_count(), 0);
    }

    #[test]
    fn test_delete_with_wrong_passphrase_fails() {
        let (mut client, _) = fake_client(1);

        let result = client.delete_account("wrong");

        assert!(matches!(
            result,
            Err(KinError::DeleteAccount(KeyStoreError::InvalidPassphrase))
        ));
        assert_eq!(client.accounts_count(), 1);
    }

    #[test]
    fn test_deleted_handle_is_unusable() {
        let (mut client, _) = fake_client(1);
        let account = client.account().unwrap();

        client.delete_account(PASSPHRASE).unwrap();

        assert!(account.is_deleted());
        assert!(account.public_address().is_none());
        assert!(matches!(account.export(PASSPHRASE), Err(KinError::AccountDeleted)));
    }

    #[test]
    fn test_clear_all_accounts() {
        let (mut client, _) = fake_client(3);
        let account = client.account().unwrap();

        client.clear_all_accounts().unwrap();

        assert!(!client.has_account());
        assert!(account.is_deleted());
    }

    #[test]
    fn test_service_provider_passthrough() {
        let (client, _) = fake_client(0);
        let provider = client.service_provider();

        assert_eq!(provider.provider_url(), PROVIDER_URL);
        assert_eq!(provider.network(), Network::Test);
        assert!(!provider.is_main_net());
    }

    #[test]
    fn test_export_then_import_into_other_client() {
        let (mut source, _) = fake_client(0);
        let account = source.add_account(PASSPHRASE).unwrap();
        let backup = account.export(PASSPHRASE).unwrap();

        let (mut target, _) = fake_client(0);
        let imported = target.import_account(&backup, PASSPHRASE).unwrap();

        assert_eq!(address_of(&imported), address_of(&account));
        assert_eq!(target.accounts_count(), 1);
    }

    #[test]
    fn test_import_secret_seed() {
        let keys = KeyPair::random();
        let (mut client, _) = fake_client(0);

        let account = client
            .import_secret_seed(&keys.secret_seed(), PASSPHRASE)
            .unwrap();

        assert_eq!(address_of(&account), keys.account_id());
    }

    #[test]
    fn test_export_wrong_passphrase() {
        let (mut client, _) = fake_client(0);
        let account = client.add_account(PASSPHRASE).unwrap();

        assert!(matches!(
            account.export("wrong"),
            Err(KinError::KeyStore(KeyStoreError::InvalidPassphrase))
        ));
    }
}

// ============================================================================
// KinAccount Tests
// ============================================================================

mod kin_account {
    use super::*;
    use kin_sdk::error::{OP_NO_TRUST, OP_UNDERFUNDED, TX_FAILED};

    #[tokio::test]
    async fn test_balance() {
        let (mut client, ledger) = fake_client(0);
        let account = client.add_account(PASSPHRASE).unwrap();
        ledger.add_account(&address_of(&account), Some("150.2500000"));

        let balance = account.balance().await.unwrap();

        assert_eq!(balance.stroops(), 1_502_500_000);
        assert_eq!(balance.value(2), "150.25");
    }

    #[tokio::test]
    async fn test_balance_of_unknown_account() {
        let (mut client, _) = fake_client(0);
        let account = client.add_account(PASSPHRASE).unwrap();

        match account.balance().await {
            Err(KinError::AccountNotFound(address)) => assert_eq!(address, address_of(&account)),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_balance_without_trustline() {
        let (mut client, ledger) = fake_client(0);
        let account = client.add_account(PASSPHRASE).unwrap();
        ledger.add_account(&address_of(&account), None);

        assert!(matches!(
            account.balance().await,
            Err(KinError::AccountNotActivated(_))
        ));
    }

    #[tokio::test]
    async fn test_status() {
        let (mut client, ledger) = fake_client(0);
        let missing = client.add_account(PASSPHRASE).unwrap();
        let untrusting = client.add_account(PASSPHRASE).unwrap();
        let active = client.add_account(PASSPHRASE).unwrap();
        ledger.add_account(&address_of(&untrusting), None);
        ledger.add_account(&address_of(&active), Some("0.0000000"));

        assert_eq!(missing.status().await.unwrap(), AccountStatus::NotCreated);
        assert_eq!(untrusting.status().await.unwrap(), AccountStatus::NotActivated);
        assert_eq!(active.status().await.unwrap(), AccountStatus::Activated);
    }

    #[tokio::test]
    async fn test_activate_submits_trustline() {
        let (mut client, ledger) = fake_client(0);
        let account = client.add_account(PASSPHRASE).unwrap();
        ledger.add_account(&address_of(&account), None);

        account.activate(PASSPHRASE).await.unwrap();

        assert_eq!(
            ledger.submissions(),
            vec![Submission::ChangeTrust {
                source: address_of(&account),
                asset: client.service_provider().kin_asset().clone(),
            }]
        );
    }

    #[tokio::test]
    async fn test_activate_when_already_active() {
        let (mut client, ledger) = fake_client(0);
        let account = client.add_account(PASSPHRASE).unwrap();
        ledger.add_account(&address_of(&account), Some("1.0000000"));

        account.activate(PASSPHRASE).await.unwrap();

        assert!(ledger.submissions().is_empty());
    }

    #[tokio::test]
    async fn test_send_transaction() {
        let (mut client, ledger) = fake_client(0);
        let account = client.add_account(PASSPHRASE).unwrap();
        let destination = KeyPair::random().account_id();
        ledger.add_account(&address_of(&account), Some("100.0000000"));
        ledger.add_account(&destination, Some("0.0000000"));

        let id = account
            .send_transaction(&destination, PASSPHRASE, kin("12.5"), Some("1-kin-demo"))
            .await
            .unwrap();

        assert_eq!(id.id(), "tx-1");
        match &ledger.submissions()[..] {
            [Submission::Payment { source, payment }] => {
                assert_eq!(source, &address_of(&account));
                assert_eq!(payment.destination, destination);
                assert_eq!(payment.amount, 125_000_000);
                assert_eq!(payment.memo.as_deref(), Some("1-kin-demo"));
                assert_eq!(&payment.asset, client.service_provider().kin_asset());
            }
            other => panic!("unexpected submissions: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_send_to_missing_destination() {
        let (mut client, ledger) = fake_client(0);
        let account = client.add_account(PASSPHRASE).unwrap();
        let destination = KeyPair::random().account_id();
        ledger.add_account(&address_of(&account), Some("100.0000000"));

        match account
            .send_transaction(&destination, PASSPHRASE, kin("1"), None)
            .await
        {
            Err(KinError::AccountNotFound(address)) => assert_eq!(address, destination),
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(ledger.submissions().is_empty());
    }

    #[tokio::test]
    async fn test_send_to_untrusting_destination() {
        let (mut client, ledger) = fake_client(0);
        let account = client.add_account(PASSPHRASE).unwrap();
        let destination = KeyPair::random().account_id();
        ledger.add_account(&address_of(&account), Some("100.0000000"));
        ledger.add_account(&destination, None);

        match account
            .send_transaction(&destination, PASSPHRASE, kin("1"), None)
            .await
        {
            Err(KinError::AccountNotActivated(address)) => assert_eq!(address, destination),
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(ledger.submissions().is_empty());
    }

    #[tokio::test]
    async fn test_send_underfunded() {
        let (mut client, ledger) = fake_client(0);
        let account = client.add_account(PASSPHRASE).unwrap();
        let destination = KeyPair::random().account_id();
        ledger.add_account(&address_of(&account), Some("1.0000000"));
        ledger.add_account(&destination, Some("0.0000000"));
        ledger.reject_with(TX_FAILED, &[OP_UNDERFUNDED]);

        assert!(matches!(
            account
                .send_transaction(&destination, PASSPHRASE, kin("5"), None)
                .await,
            Err(KinError::InsufficientKin)
        ));
    }

    #[tokio::test]
    async fn test_send_rejected_for_trust_by_ledger() {
        let (mut client, ledger) = fake_client(0);
        let account = client.add_account(PASSPHRASE).unwrap();
        let destination = KeyPair::random().account_id();
        ledger.add_account(&address_of(&account), Some("10.0000000"));
        ledger.add_account(&destination, Some("0.0000000"));
        ledger.reject_with(TX_FAILED, &[OP_NO_TRUST]);

        match account
            .send_transaction(&destination, PASSPHRASE, kin("1"), None)
            .await
        {
            Err(KinError::AccountNotActivated(address)) => assert_eq!(address, destination),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_send_other_failure_keeps_codes() {
        let (mut client, ledger) = fake_client(0);
        let account = client.add_account(PASSPHRASE).unwrap();
        let destination = KeyPair::random().account_id();
        ledger.add_account(&address_of(&account), Some("10.0000000"));
        ledger.add_account(&destination, Some("0.0000000"));
        ledger.reject_with("tx_bad_seq", &[]);

        match account
            .send_transaction(&destination, PASSPHRASE, kin("1"), None)
            .await
        {
            Err(KinError::TransactionFailed {
                transaction_result_code,
                ..
            }) => assert_eq!(transaction_result_code.as_deref(), Some("tx_bad_seq")),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_send_wrong_passphrase() {
        let (mut client, ledger) = fake_client(0);
        let account = client.add_account(PASSPHRASE).unwrap();
        let destination = KeyPair::random().account_id();
        ledger.add_account(&destination, Some("0.0000000"));

        assert!(matches!(
            account
                .send_transaction(&destination, "wrong", kin("1"), None)
                .await,
            Err(KinError::KeyStore(KeyStoreError::InvalidPassphrase))
        ));
        assert!(ledger.submissions().is_empty());
    }

    #[tokio::test]
    async fn test_send_invalid_arguments_skip_network() {
        let (mut client, ledger) = fake_client(0);
        let account = client.add_account(PASSPHRASE).unwrap();
        let destination = KeyPair::random().account_id();

        let long_memo = "m".repeat(29);
        let cases = [
            account.send_transaction("", PASSPHRASE, kin("1"), None).await,
            account.send_transaction("GBAD", PASSPHRASE, kin("1"), None).await,
            account.send_transaction(&destination, "", kin("1"), None).await,
            account.send_transaction(&destination, PASSPHRASE, kin("0"), None).await,
            account
                .send_transaction(&destination, PASSPHRASE, kin("1"), Some(&long_memo))
                .await,
        ];

        for case in cases {
            assert!(matches!(case, Err(KinError::InvalidArgument(_))));
        }
        assert!(ledger.submissions().is_empty());
    }

    #[tokio::test]
    async fn test_deleted_account_operations_fail() {
        let (mut client, _) = fake_client(1);
        let account = client.account().unwrap();
        client.delete_account(PASSPHRASE).unwrap();

        assert!(matches!(account.balance().await, Err(KinError::AccountDeleted)));
        assert!(matches!(account.status().await, Err(KinError::AccountDeleted)));
        assert!(matches!(
            account
                .send_transaction(&KeyPair::random().account_id(), PASSPHRASE, kin("1"), None)
                .await,
            Err(KinError::AccountDeleted)
        ));
    }
}

// ============================================================================
// Request Tests
// ============================================================================

mod requests {
    use super::*;
    use tokio::sync::oneshot;

    #[tokio::test]
    async fn test_balance_request_execute() {
        let (mut client, ledger) = fake_client(0);
        let account = client.add_account(PASSPHRASE).unwrap();
        ledger.add_account(&address_of(&account), Some("3.0000000"));

        let balance = account.balance_request().execute().await.unwrap();
        assert_eq!(balance, kin("3"));
    }

    #[tokio::test]
    async fn test_send_request_run_delivers_callback() {
        let (mut client, ledger) = fake_client(0);
        let account = client.add_account(PASSPHRASE).unwrap();
        let destination = KeyPair::random().account_id();
        ledger.add_account(&address_of(&account), Some("10.0000000"));
        ledger.add_account(&destination, Some("0.0000000"));

        let (tx, rx) = oneshot::channel();
        let _handle = account
            .send_transaction_request(destination, PASSPHRASE, kin("2"), None)
            .run(move |result| {
                let _ = tx.send(result);
            });

        let id = rx.await.unwrap().unwrap();
        assert_eq!(id.id(), "tx-1");
    }
}

// ============================================================================
// Encrypted Keystore Tests
// ============================================================================

mod encrypted_keystore {
    use super::*;

    fn fast_kdf() -> KdfParams {
        KdfParams::new(1024, 1, 1)
    }

    fn file_keystore(dir: &TempDir) -> Arc<dyn KeyStore> {
        let keystore = EncryptedKeyStore::open_file(dir.path().join("keystore.json"))
            .unwrap()
            .with_kdf_params(fast_kdf());
        Arc::new(keystore)
    }

    #[test]
    fn test_accounts_survive_reopen() {
        let temp_dir = TempDir::new().unwrap();

        let mut client = client_with(file_keystore(&temp_dir), Arc::new(FakeLedger::default()));
        let first = address_of(&client.add_account(PASSPHRASE).unwrap());
        let second = address_of(&client.add_account(PASSPHRASE).unwrap());
        drop(client);

        let reopened = client_with(file_keystore(&temp_dir), Arc::new(FakeLedger::default()));
        assert_eq!(reopened.accounts_count(), 2);
        assert_eq!(address_of(&reopened.account_at(0).unwrap()), first);
        assert_eq!(address_of(&reopened.account_at(1).unwrap()), second);
    }

    #[test]
    fn test_delete_is_persisted() {
        let temp_dir = TempDir::new().unwrap();

        let mut client = client_with(file_keystore(&temp_dir), Arc::new(FakeLedger::default()));
        client.add_account(PASSPHRASE).unwrap();
        let survivor = address_of(&client.add_account(PASSPHRASE).unwrap());
        client.delete_account(PASSPHRASE).unwrap();

        let reopened = client_with(file_keystore(&temp_dir), Arc::new(FakeLedger::default()));
        assert_eq!(reopened.accounts_count(), 1);
        assert_eq!(address_of(&reopened.account().unwrap()), survivor);
    }

    #[test]
    fn test_export_import_between_keystores() {
        let memory = EncryptedKeyStore::open(MemoryStore::new())
            .unwrap()
            .with_kdf_params(fast_kdf());
        let mut source = client_with(Arc::new(memory), Arc::new(FakeLedger::default()));
        let account = source.add_account(PASSPHRASE).unwrap();
        let backup = account.export(PASSPHRASE).unwrap();

        let temp_dir = TempDir::new().unwrap();
        let mut target = client_with(file_keystore(&temp_dir), Arc::new(FakeLedger::default()));
        let imported = target.import_account(&backup, PASSPHRASE).unwrap();
        assert_eq!(address_of(&imported), address_of(&account));

        // Importing the same account twice is rejected
        assert!(matches!(
            target.import_account(&backup, PASSPHRASE),
            Err(KinError::KeyStore(KeyStoreError::DuplicateAccount(_)))
        ));
    }

    #[tokio::test]
    async fn test_sends_with_encrypted_keystore() {
        let temp_dir = TempDir::new().unwrap();
        let ledger = Arc::new(FakeLedger::default());
        let mut client = client_with(file_keystore(&temp_dir), Arc::clone(&ledger));
        let account = client.add_account(PASSPHRASE).unwrap();
        let destination = KeyPair::random().account_id();
        ledger.add_account(&address_of(&account), Some("5.0000000"));
        ledger.add_account(&destination, Some("0.0000000"));

        account
            .send_transaction(&destination, PASSPHRASE, kin("0.0000001"), None)
            .await
            .unwrap();

        assert!(matches!(
            account
                .send_transaction(&destination, "not-it", kin("1"), None)
                .await,
            Err(KinError::KeyStore(KeyStoreError::InvalidPassphrase))
        ));
    }

    #[test]
    fn test_real_client_opens_keystore_file() {
        let temp_dir = TempDir::new().unwrap();
        let client = KinClient::new(provider(), temp_dir.path().join("keystore.json")).unwrap();
        assert!(!client.has_account());
    }
}
