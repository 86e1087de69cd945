//! algo-pay command line client.
//!
//! # Architecture Overview
//!
//! ```text
//!   CLI command
//!       │
//!       ▼
//!   ┌──────────────────────────┐
//!   │ TransactionOrchestrator  │──── state, cached parameters, receipt
//!   └──────┬────────────┬──────┘
//!          │            │
//!          ▼            ▼
//!   ┌────────────┐ ┌─────────────┐
//!   │  Wallet    │ │ Chain client│
//!   │  gateway   │ │  gateway    │
//!   └─────┬──────┘ └──────┬──────┘
//!         ▼               ▼
//!   wallet bridge     algod node (+ indexer health)
//! ```
//!
//! Every step prints its `ResultEnvelope` as JSON.

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use algo_pay::blockchain::{AlgodConnector, ChainGateway, HttpWalletBridge, WalletGateway};
use algo_pay::config::loader::{load_config, parse_config, API_KEY_ENV_VAR};
use algo_pay::observability::{logging, metrics};
use algo_pay::{
    AppConfig, ConfirmationWatcher, ResultEnvelope, Shutdown, TransactionOrchestrator,
    TransactionRequest,
};

const DEFAULT_CONFIG_PATH: &str = "algo-pay.toml";

#[derive(Parser)]
#[command(name = "algo-pay")]
#[command(about = "Sign and submit payments through a wallet bridge", long_about = None)]
struct Cli {
    /// TOML configuration file. Defaults apply when the default path is absent.
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect the wallet and list its accounts
    Accounts,
    /// Fetch suggested network parameters
    Params,
    /// Build, sign and broadcast a payment
    Send {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        /// Amount in whole units, e.g. 1.5
        #[arg(long)]
        amount: Decimal,
        #[arg(long)]
        note: Option<String>,
        /// Poll until the payment settles
        #[arg(long)]
        watch: bool,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = read_config(&cli.config)?;

    logging::init_logging(&config.observability.log_level);
    tracing::info!(config = %cli.config.display(), "algo-pay starting");

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let bridge = HttpWalletBridge::new(&config.wallet)?;
    let mut orchestrator = TransactionOrchestrator::new(
        WalletGateway::new(Arc::new(bridge)),
        ChainGateway::new(Arc::new(AlgodConnector)),
        config.wallet.ledger.clone(),
    );

    let ok = match cli.command {
        Commands::Accounts => {
            emit(&orchestrator.connect().await) && emit(&orchestrator.list_accounts().await)
        }
        Commands::Params => {
            emit(&orchestrator.setup_client(&config.endpoint).await)
                && emit(&orchestrator.refresh_parameters().await)
        }
        Commands::Send {
            from,
            to,
            amount,
            note,
            watch,
        } => {
            let mut request = TransactionRequest::new(from, to, amount);
            request.note = note;
            send(&mut orchestrator, &config, &request, watch).await
        }
    };

    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

async fn send(
    orchestrator: &mut TransactionOrchestrator,
    config: &AppConfig,
    request: &TransactionRequest,
    watch: bool,
) -> bool {
    let prepared = emit(&orchestrator.connect().await)
        && emit(&orchestrator.setup_client(&config.endpoint).await)
        && emit(&orchestrator.refresh_parameters().await);
    if !prepared || !emit(&orchestrator.submit(request).await) {
        return false;
    }
    if !watch {
        return true;
    }

    let shutdown = Shutdown::new();
    let listener = shutdown.trigger_on_ctrl_c();
    let watcher = ConfirmationWatcher::new(config.polling.clone());
    let report = watcher.watch(orchestrator, shutdown.wait()).await;
    listener.abort();
    emit(&report)
}

/// Print an envelope as pretty JSON and report whether it succeeded.
fn emit<T: Serialize>(envelope: &ResultEnvelope<T>) -> bool {
    match serde_json::to_string_pretty(envelope) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error: failed to render result: {}", e),
    }
    envelope.is_ok()
}

fn read_config(path: &Path) -> Result<AppConfig, Box<dyn std::error::Error>> {
    if path == Path::new(DEFAULT_CONFIG_PATH) && !path.exists() {
        return Ok(parse_config("", std::env::var(API_KEY_ENV_VAR).ok())?);
    }
    Ok(load_config(path)?)
}
