//! Read one secret field from Vault and print it.
//!
//! Usage:
//!   VAULT_ADDR=https://vault:8200 VAULT_TOKEN=s.xxx vault-read-secret secret/data/app password

use anyhow::Context;
use clap::Parser;
use prometheus::Registry;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use vault_backend::{VaultBackend, VaultConfig, VaultMetrics};

#[derive(Parser, Debug)]
#[command(name = "vault-read-secret")]
#[command(about = "Read one secret field from Vault", long_about = None)]
struct Args {
    /// Secret path, e.g. secret/data/app
    path: String,

    /// Field to read, defaults to "data"
    #[arg(default_value = "")]
    key: String,

    /// Log level filter used when RUST_LOG is unset
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

fn init_tracing(log_level: &str, json_output: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    let registry = tracing_subscriber::registry().with(filter);

    if json_output {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level, args.json_logs);

    let config = VaultConfig::from_env().context("loading Vault configuration")?;
    let metrics = Arc::new(VaultMetrics::new(&Registry::new())?);
    let cancel = CancellationToken::new();

    let backend = VaultBackend::connect(&config, metrics, cancel.clone())
        .await
        .context("connecting to Vault")?;

    let value = backend
        .read_secret(&args.path, &args.key)
        .await
        .with_context(|| format!("reading {}", args.path))?;
    println!("{value}");

    cancel.cancel();
    let exit = backend.join_supervisor().await?;
    info!(?exit, "Token renewal supervisor finished");
    Ok(())
}
