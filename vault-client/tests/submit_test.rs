use std::{collections::VecDeque, fs, path::PathBuf, sync::Mutex, time::Duration};

use anyhow::{anyhow, Result};
use solana_sdk::{
    hash::Hash,
    pubkey::Pubkey,
    signature::{write_keypair_file, Keypair, Signature, Signer},
    system_program,
    transaction::Transaction,
};
use vault_client::submit::{
    submit_withdraw, wait_for_confirmation, FileKeySource, KeySource, Outcome, Submitter,
    Timeouts, WithdrawRequest,
};
use vault_instruction::{accounts::vault_address, encode};

struct StaticKey(Keypair);

impl KeySource for StaticKey {
    fn load(&self) -> Result<Keypair> {
        Ok(self.0.insecure_clone())
    }
}

struct MissingKey;

impl KeySource for MissingKey {
    fn load(&self) -> Result<Keypair> {
        Err(anyhow!("no key"))
    }
}

/// Replays a fixed sequence of status lookups; an exhausted queue means "pending".
#[derive(Default)]
struct MockSubmitter {
    sent: Mutex<Vec<Transaction>>,
    statuses: Mutex<VecDeque<Result<Option<Outcome>>>>,
    lookups: Mutex<usize>,
}

impl MockSubmitter {
    fn with_statuses(statuses: Vec<Result<Option<Outcome>>>) -> Self {
        Self {
            statuses: Mutex::new(statuses.into()),
            ..Default::default()
        }
    }
}

impl Submitter for MockSubmitter {
    async fn latest_blockhash(&self) -> Result<Hash> {
        Ok(Hash::new_unique())
    }

    async fn send(&self, tx: &Transaction) -> Result<Signature> {
        self.sent.lock().unwrap().push(tx.clone());
        Ok(tx.signatures[0])
    }

    async fn signature_status(&self, _signature: &Signature) -> Result<Option<Outcome>> {
        *self.lookups.lock().unwrap() += 1;
        self.statuses.lock().unwrap().pop_front().unwrap_or(Ok(None))
    }
}

fn fast_timeouts() -> Timeouts {
    Timeouts {
        confirm: Duration::from_millis(50),
        poll_interval: Duration::from_millis(1),
    }
}

#[tokio::test]
async fn test_withdraw_sends_encoded_payload() {
    let owner = Keypair::new();
    let program_id = Pubkey::new_unique();
    let submitter = MockSubmitter::with_statuses(vec![Ok(None), Ok(Some(Outcome::Confirmed))]);
    let request = WithdrawRequest {
        program_id,
        vault: None,
        amount: 100_000,
    };

    let receipt = submit_withdraw(&StaticKey(owner.insecure_clone()), &submitter, &request, fast_timeouts())
        .await
        .unwrap();

    let (expected_vault, _) = vault_address(&owner.pubkey(), &program_id);
    assert_eq!(receipt.owner, owner.pubkey());
    assert_eq!(receipt.vault, expected_vault);
    assert_eq!(receipt.confirmation.outcome, Outcome::Confirmed);

    let sent = submitter.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    let tx = &sent[0];
    assert_eq!(receipt.signature, tx.signatures[0]);
    assert!(tx.verify().is_ok());

    let message = &tx.message;
    assert_eq!(message.instructions.len(), 1);
    let ix = &message.instructions[0];
    assert_eq!(ix.data, encode(100_000).to_vec());
    assert_eq!(message.account_keys[ix.program_id_index as usize], program_id);

    let keys: Vec<Pubkey> = ix
        .accounts
        .iter()
        .map(|&index| message.account_keys[index as usize])
        .collect();
    assert_eq!(keys, vec![owner.pubkey(), expected_vault, system_program::ID]);
}

#[tokio::test]
async fn test_withdraw_uses_vault_override() {
    let vault = Pubkey::new_unique();
    let submitter = MockSubmitter::with_statuses(vec![Ok(Some(Outcome::Confirmed))]);
    let request = WithdrawRequest {
        program_id: Pubkey::new_unique(),
        vault: Some(vault),
        amount: 1,
    };

    let receipt = submit_withdraw(&StaticKey(Keypair::new()), &submitter, &request, fast_timeouts())
        .await
        .unwrap();
    assert_eq!(receipt.vault, vault);
}

#[tokio::test]
async fn test_withdraw_reports_failed_transaction() {
    let submitter = MockSubmitter::with_statuses(vec![Ok(Some(Outcome::Failed(
        "custom program error: 0x1".to_string(),
    )))]);
    let request = WithdrawRequest {
        program_id: Pubkey::new_unique(),
        vault: None,
        amount: 5,
    };

    let receipt = submit_withdraw(&StaticKey(Keypair::new()), &submitter, &request, fast_timeouts())
        .await
        .unwrap();
    assert!(matches!(receipt.confirmation.outcome, Outcome::Failed(ref err) if err.contains("0x1")));
}

#[tokio::test]
async fn test_key_error_stops_before_sending() {
    let submitter = MockSubmitter::default();
    let request = WithdrawRequest {
        program_id: Pubkey::new_unique(),
        vault: None,
        amount: 5,
    };

    let result = submit_withdraw(&MissingKey, &submitter, &request, fast_timeouts()).await;
    assert!(result.is_err());
    assert!(submitter.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_confirmation_times_out() {
    let submitter = MockSubmitter::default();
    let confirmation =
        wait_for_confirmation(&submitter, &Signature::default(), fast_timeouts()).await;

    assert_eq!(confirmation.outcome, Outcome::TimedOut);
    assert!(confirmation.elapsed >= Duration::from_millis(50));
    assert!(*submitter.lookups.lock().unwrap() > 1);
}

#[tokio::test]
async fn test_confirmation_survives_lookup_errors() {
    let submitter = MockSubmitter::with_statuses(vec![
        Err(anyhow!("connection reset")),
        Ok(None),
        Ok(Some(Outcome::Confirmed)),
    ]);
    let confirmation =
        wait_for_confirmation(&submitter, &Signature::default(), fast_timeouts()).await;

    assert_eq!(confirmation.outcome, Outcome::Confirmed);
    assert_eq!(*submitter.lookups.lock().unwrap(), 3);
}

fn temp_key_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("vault-client-{}-{name}.json", std::process::id()))
}

#[test]
fn test_file_key_source_reads_json_keypair() {
    let owner = Keypair::new();
    let path = temp_key_path("owner");
    write_keypair_file(&owner, &path).unwrap();

    let loaded = FileKeySource::new(&path).load().unwrap();
    assert_eq!(loaded.pubkey(), owner.pubkey());

    fs::remove_file(path).ok();
}

#[test]
fn test_file_key_source_errors_name_the_path() {
    let missing = temp_key_path("missing");
    fs::remove_file(&missing).ok();
    let err = FileKeySource::new(&missing).load().unwrap_err();
    assert!(err.to_string().contains(&missing.display().to_string()));

    let garbage = temp_key_path("garbage");
    fs::write(&garbage, "not a keypair").unwrap();
    let err = FileKeySource::new(&garbage).load().unwrap_err();
    assert!(err.to_string().contains(&garbage.display().to_string()));

    fs::remove_file(garbage).ok();
}
