//! hollowverse-server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`) layered with
//! `HOLLOWVERSE_*` environment variables, opens the SQLite store, and serves
//! the GraphQL API at `/graphql`.
//!
//! ```toml
//! host = "0.0.0.0"
//! port = 8080
//!
//! [database]
//! path = "hollowverse.sqlite3"
//! ```

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::Parser;
use hollowverse_api::ApiOptions;
use hollowverse_core::auth::AnonymousAuthProvider;
use hollowverse_server::{GRAPHQL_PATH, ServerConfig, app, serve};
use hollowverse_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Hollowverse GraphQL API server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(
      config::Environment::with_prefix("HOLLOWVERSE")
        .prefix_separator("_")
        .separator("__"),
    )
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  let store = SqliteStore::connect(&server_cfg.database)
    .await
    .with_context(|| format!("failed to open database at {:?}", server_cfg.database.path))?;

  // No identity service is wired in yet; every request is anonymous.
  let options = ApiOptions::new(store, Arc::new(AnonymousAuthProvider));

  let address = format!("{}:{}", server_cfg.host, server_cfg.port);
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  tracing::info!("Listening on http://{address}{GRAPHQL_PATH}");
  serve(listener, app(options), shutdown_signal())
    .await
    .context("server error")?;

  Ok(())
}

async fn shutdown_signal() {
  if tokio::signal::ctrl_c().await.is_err() {
    std::future::pending::<()>().await;
  }
  tracing::info!("shutting down");
}
