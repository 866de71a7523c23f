mod addresses;
mod amount;
mod chain;
mod cli;
mod config;
mod dispatcher;
mod error;
mod gas;
mod nonce;
mod prompt;
mod schedule;
#[cfg(test)]
mod testing;
mod token;
mod transaction;

use alloy::primitives::utils::format_ether;
use anyhow::{Context, Result};
use cli::{Commands, ModeArg, SourceArg, parse_args};
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::ChronoLocal;

use addresses::{AddressPool, AddressSource};
use chain::{ChainClient, RpcChain};
use config::{Config, SAMPLE_CONFIG};
use dispatcher::{Dispatcher, Schedule};
use nonce::NonceTracker;
use prompt::Prompter;
use schedule::TokioPacer;
use token::TokenContract;
use transaction::{TransactionSender, TransferKind};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_timer(ChronoLocal::new("%H:%M:%S".to_string()))
        .init();

    let cli = parse_args();

    let outcome = match cli.command {
        Commands::Start {
            config,
            source,
            wallet_file,
            max_addresses,
            mode,
        } => start(config, source, wallet_file, max_addresses, mode).await,

        Commands::GenerateConfig { output } => generate_config(output),
    };

    if let Err(e) = outcome {
        error!("{:#}", e);
        std::process::exit(1);
    }
    Ok(())
}

async fn start(
    config_path: PathBuf,
    source: Option<SourceArg>,
    wallet_file: PathBuf,
    max_addresses: Option<usize>,
    mode: Option<ModeArg>,
) -> Result<()> {
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;
    info!("Configuration loaded successfully");

    let chain = RpcChain::new(config.rpc_url.clone());
    let account = config.signer.address();

    let nonce = NonceTracker::fetch(&chain, account)
        .await
        .with_context(|| format!("Failed to reach RPC endpoint {}", config.rpc_url))?;
    match (chain.chain_id().await, chain.balance(account).await) {
        (Ok(chain_id), Ok(balance)) => info!(
            "Connected to chain {} as {} (balance {} ETH, next nonce {})",
            chain_id,
            account,
            format_ether(balance),
            nonce.peek()
        ),
        (Err(e), _) | (_, Err(e)) => warn!(error = %e, "Could not read chain id or balance"),
    }

    let mut prompter = Prompter::new(io::stdin().lock(), io::stdout());

    let source = match source {
        Some(source) => source,
        None => prompter.address_source()?,
    };
    let address_source = match source {
        SourceArg::File => AddressSource::File(wallet_file),
        SourceArg::Url => {
            let max = match max_addresses {
                Some(max) => Some(max),
                None => prompter.max_addresses()?,
            };
            AddressSource::Remote {
                url: config.address_url.clone(),
                max,
            }
        }
    };
    let pool = AddressPool::load(address_source)
        .await
        .context("Failed to load addresses")?;

    let mode = match mode {
        Some(mode) => mode,
        None => prompter.transfer_mode()?,
    };
    drop(prompter);

    let kind = match mode {
        ModeArg::Native => TransferKind::Native,
        ModeArg::Token => {
            let address = config.require_token_contract()?;
            let token = TokenContract::load(&chain, address)
                .await
                .context("Failed to load token contract")?;
            TransferKind::Token(token)
        }
    };

    let sender = TransactionSender::new(config.signer.clone(), kind, config.gas_multiplier);
    let schedule = Schedule {
        amount: config.amount,
        delay: config.delay,
        cycle_interval: config.cycle_interval,
        refresh_addresses: config.refresh_addresses,
    };
    let mut dispatcher = Dispatcher::new(chain, TokioPacer, sender, pool, nonce, schedule);

    tokio::select! {
        _ = dispatcher.run() => {}

        _ = signal::ctrl_c() => {
            info!("Received shutdown signal, exiting...");
        }
    }
    info!("{} transfers sent this session", dispatcher.sent());

    Ok(())
}

fn generate_config(output: PathBuf) -> Result<()> {
    let mut file = File::create(&output)
        .context(format!("Failed to create config file at {:?}", output))?;
    file.write_all(SAMPLE_CONFIG.as_bytes())?;

    info!("Sample configuration file generated at {:?}", output);
    info!("Please edit the file with your actual configuration before starting the bot.");
    Ok(())
}
