//! `sentrihawk`: front-desk console for the SentriHawk visitor ledger.
//!
//! # Usage
//!
//! ```
//! sentrihawk seed
//! sentrihawk register --name "Jane Smith" --destination tenant1
//! sentrihawk dashboard guard --filter on_site
//! SENTRIHAWK_ROLE=tenant sentrihawk dashboard tenant --tenant tenant1
//! ```
//!
//! Settings come from `sentrihawk.toml` (or `--config`) and `SENTRIHAWK_*`
//! environment variables: `store_path`, `role`, `tenant_id`, `deny_terms`.

mod app;
mod cli;
mod config;
mod render;


use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser;
use sentrihawk_store_sqlite::SqliteStore;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::{app::App, cli::Cli, config::AppConfig};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
  // Logs go to stderr so command output stays pipeable.
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let config = AppConfig::load(cli.config.as_deref())?;

  let store_path = config.store_path();
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?
    .with_deny_list(config.deny_list());
  tracing::debug!(store = ?store_path, role = %config.role, "store opened");

  let app = App { store, config, json: cli.json };
  app.run(cli.command).await
}
