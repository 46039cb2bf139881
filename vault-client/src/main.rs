use std::io;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use vault_client::{
    report,
    submit::{self, FileKeySource, Outcome, RpcSubmitter, Timeouts, WithdrawRequest},
    AppConfig,
};

#[derive(Parser, Debug)]
#[command(name = "vault-client", about = "Build, check and send vault withdraw instructions")]
struct Cli {
    /// YAML configuration file; missing files fall back to defaults.
    #[arg(long, default_value = "config.yaml")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the encoded withdraw payload for an amount.
    Generate {
        #[arg(long)]
        amount: u64,
    },
    /// Decode a payload and report every validation step.
    Validate {
        #[arg(long, conflicts_with = "hex", required_unless_present = "hex")]
        amount: Option<u64>,
        /// Raw payload, with or without a `0x` prefix.
        #[arg(long)]
        hex: Option<String>,
    },
    /// Sign and send a withdraw, then wait for confirmation.
    Withdraw {
        #[arg(long)]
        amount: u64,
    },
}

fn parse_hex(input: &str) -> Result<Vec<u8>> {
    let digits = input.strip_prefix("0x").unwrap_or(input);
    hex::decode(digits).with_context(|| format!("invalid hex payload: {input:?}"))
}

fn check_amount(parsed: u64, expected: Option<u64>) -> Result<()> {
    match expected {
        Some(expected) if expected != parsed => {
            bail!("parsed amount {parsed} does not match input amount {expected}")
        }
        _ => Ok(()),
    }
}

async fn withdraw(config: &AppConfig, amount: u64) -> Result<()> {
    let request = WithdrawRequest {
        program_id: config.program_id()?,
        vault: config.vault()?,
        amount,
    };
    let timeouts = Timeouts {
        confirm: config.confirm_timeout(),
        poll_interval: config.poll_interval(),
    };
    let keys = FileKeySource::new(config.keypair_path());
    let submitter = RpcSubmitter::new(&config.rpc_url, config.commitment()?);

    info!(rpc_url = %config.rpc_url, program_id = %request.program_id, "submitting withdraw");
    let receipt = submit::submit_withdraw(&keys, &submitter, &request, timeouts).await?;

    println!(
        "Tx Hash: {}\tOwner: {}\tVault: {}\tSend Time: {:.2?}\tConfirmation Time: {:.2?}",
        receipt.signature,
        receipt.owner,
        receipt.vault,
        receipt.send_time,
        receipt.confirmation.elapsed,
    );
    match receipt.confirmation.outcome {
        Outcome::Confirmed => Ok(()),
        Outcome::Failed(err) => bail!("transaction {} failed: {err}", receipt.signature),
        Outcome::TimedOut => bail!("transaction {} was not confirmed in time", receipt.signature),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Generate { amount } => report::write_generate(&mut io::stdout().lock(), amount)?,
        Command::Validate { amount, hex } => {
            let data = match (amount, &hex) {
                (Some(amount), _) => vault_instruction::encode(amount).to_vec(),
                (None, Some(hex)) => parse_hex(hex)?,
                (None, None) => bail!("provide --amount or --hex"),
            };
            let ix = report::write_validation(&mut io::stdout().lock(), &data, amount)??;
            check_amount(ix.amount(), amount)?;
        }
        Command::Withdraw { amount } => {
            let config = AppConfig::load(&cli.config)?;
            withdraw(&config, amount).await?;
        }
    }

    Ok(())
}
