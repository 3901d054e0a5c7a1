use anyhow::{Context as _, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{debug, error};

use omni_agency::api::ApiClient;
use omni_agency::session::SessionStore;
use omni_agency::{config, render, storage};

mod commands;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Path to YAML config file
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: commands::Command,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let cfg = config::load(Some(&args.config))
        .with_context(|| format!("failed to load {}", args.config.display()))?;
    cfg.ensure_dirs()?;

    let database_url = std::env::var("DATABASE_URL").unwrap_or_else(|_| cfg.storage_url());
    debug!(%database_url, "opening local storage");
    let pool = storage::init_pool(&database_url).await?;
    storage::run_migrations(&pool).await?;

    let ctx = commands::Context {
        api: ApiClient::from_config(&cfg).context("failed to build HTTP client")?,
        store: SessionStore::new(pool),
    };

    if let Err(err) = commands::run(&ctx, args.command).await {
        let message = format!("{:#}", err);
        error!(error = %message, "command failed");
        eprintln!("{}", render::failure(&message));
        std::process::exit(1);
    }
    Ok(())
}
