use std::{
    path::PathBuf,
    sync::Arc,
    time::{Duration, Instant},
};

use anyhow::{anyhow, Context, Result};
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::{
    commitment_config::CommitmentConfig,
    hash::Hash,
    pubkey::Pubkey,
    signature::{read_keypair_file, Keypair, Signature, Signer},
    transaction::Transaction,
};
use solana_transaction_status_client_types::TransactionStatus;
use tracing::{debug, info, warn};
use vault_instruction::accounts::{self, vault_address};

/// Supplies the owner identity that signs the withdraw.
pub trait KeySource {
    fn load(&self) -> Result<Keypair>;
}

/// Solana CLI JSON key file.
pub struct FileKeySource {
    path: PathBuf,
}

impl FileKeySource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl KeySource for FileKeySource {
    fn load(&self) -> Result<Keypair> {
        read_keypair_file(&self.path)
            .map_err(|e| anyhow!("failed to read keypair file {}: {e}", self.path.display()))
    }
}

/// How the confirmation wait ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Confirmed,
    Failed(String),
    TimedOut,
}

#[allow(async_fn_in_trait)]
pub trait Submitter {
    async fn latest_blockhash(&self) -> Result<Hash>;
    async fn send(&self, tx: &Transaction) -> Result<Signature>;
    /// `None` while the cluster has not reached the requested commitment.
    async fn signature_status(&self, signature: &Signature) -> Result<Option<Outcome>>;
}

pub struct RpcSubmitter {
    client: Arc<RpcClient>,
    commitment: CommitmentConfig,
}

impl RpcSubmitter {
    pub fn new(rpc_url: &str, commitment: CommitmentConfig) -> Self {
        let client = Arc::new(RpcClient::new_with_commitment(rpc_url.to_string(), commitment));
        Self { client, commitment }
    }
}

impl Submitter for RpcSubmitter {
    async fn latest_blockhash(&self) -> Result<Hash> {
        self.client
            .get_latest_blockhash()
            .await
            .context("failed to fetch latest blockhash")
    }

    async fn send(&self, tx: &Transaction) -> Result<Signature> {
        self.client
            .send_transaction(tx)
            .await
            .context("failed to send transaction")
    }

    async fn signature_status(&self, signature: &Signature) -> Result<Option<Outcome>> {
        let statuses = self.client.get_signature_statuses(&[*signature]).await?;
        let status = statuses.value.into_iter().next().flatten();
        Ok(outcome_from_status(status, self.commitment))
    }
}

/// `None` until the status exists and satisfies `commitment`.
pub fn outcome_from_status(
    status: Option<TransactionStatus>,
    commitment: CommitmentConfig,
) -> Option<Outcome> {
    let status = status.filter(|status| status.satisfies_commitment(commitment))?;
    Some(match status.status {
        Ok(()) => Outcome::Confirmed,
        Err(err) => Outcome::Failed(err.to_string()),
    })
}

#[derive(Debug, Clone, Copy)]
pub struct Timeouts {
    pub confirm: Duration,
    pub poll_interval: Duration,
}

#[derive(Debug, Clone)]
pub struct Confirmation {
    pub elapsed: Duration,
    pub outcome: Outcome,
}

/// Polls the signature status until it lands or `timeouts.confirm` elapses.
/// Status lookups that error out are logged and polled again.
pub async fn wait_for_confirmation<S: Submitter>(
    submitter: &S,
    signature: &Signature,
    timeouts: Timeouts,
) -> Confirmation {
    let start = Instant::now();
    loop {
        match submitter.signature_status(signature).await {
            Ok(Some(outcome)) => {
                return Confirmation {
                    elapsed: start.elapsed(),
                    outcome,
                }
            }
            Ok(None) => debug!(%signature, "not yet confirmed"),
            Err(err) => warn!(%signature, "status lookup failed: {err:#}"),
        }
        if start.elapsed() >= timeouts.confirm {
            return Confirmation {
                elapsed: start.elapsed(),
                outcome: Outcome::TimedOut,
            };
        }
        tokio::time::sleep(timeouts.poll_interval).await;
    }
}

#[derive(Debug, Clone, Copy)]
pub struct WithdrawRequest {
    pub program_id: Pubkey,
    /// Falls back to the owner's vault PDA.
    pub vault: Option<Pubkey>,
    pub amount: u64,
}

#[derive(Debug, Clone)]
pub struct WithdrawReceipt {
    pub owner: Pubkey,
    pub vault: Pubkey,
    pub signature: Signature,
    pub send_time: Duration,
    pub confirmation: Confirmation,
}

pub async fn submit_withdraw<K: KeySource, S: Submitter>(
    keys: &K,
    submitter: &S,
    request: &WithdrawRequest,
    timeouts: Timeouts,
) -> Result<WithdrawReceipt> {
    let owner = keys.load()?;
    let owner_pubkey = owner.pubkey();
    let vault = request
        .vault
        .unwrap_or_else(|| vault_address(&owner_pubkey, &request.program_id).0);

    let instruction = accounts::withdraw(&request.program_id, &owner_pubkey, &vault, request.amount);
    let recent_blockhash = submitter.latest_blockhash().await?;
    let tx = Transaction::new_signed_with_payer(
        &[instruction],
        Some(&owner_pubkey),
        &[&owner],
        recent_blockhash,
    );

    info!(owner = %owner_pubkey, %vault, amount = request.amount, "sending withdraw");
    let start_send = Instant::now();
    let signature = submitter.send(&tx).await?;
    let send_time = start_send.elapsed();
    info!(%signature, ?send_time, "withdraw sent, waiting for confirmation");

    let confirmation = wait_for_confirmation(submitter, &signature, timeouts).await;
    match &confirmation.outcome {
        Outcome::Confirmed => info!(%signature, elapsed = ?confirmation.elapsed, "withdraw confirmed"),
        Outcome::Failed(err) => warn!(%signature, "withdraw failed: {err}"),
        Outcome::TimedOut => warn!(%signature, "withdraw not confirmed in {:?}", timeouts.confirm),
    }

    Ok(WithdrawReceipt {
        owner: owner_pubkey,
        vault,
        signature,
        send_time,
        confirmation,
    })
}
