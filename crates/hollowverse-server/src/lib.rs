//! HTTP application for the Hollowverse API.
//!
//! Mounts the GraphQL router at [`GRAPHQL_PATH`] and serves it.

use std::future::Future;

use axum::Router;
use hollowverse_api::{ApiOptions, api_router};
use hollowverse_store_sqlite::DatabaseConfig;
use serde::Deserialize;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// The only path the application serves.
pub const GRAPHQL_PATH: &str = "/graphql";

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `HOLLOWVERSE_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:     String,
  #[serde(default = "default_port")]
  pub port:     u16,
  pub database: DatabaseConfig,
}

fn default_host() -> String { "127.0.0.1".into() }

fn default_port() -> u16 { 8080 }

// ─── Application ──────────────────────────────────────────────────────────────

/// Build the application router with the API nested at [`GRAPHQL_PATH`].
pub fn app(options: ApiOptions) -> Router {
  let options = ApiOptions { endpoint: GRAPHQL_PATH.into(), ..options };
  Router::new()
    .nest(GRAPHQL_PATH, api_router(options))
    .layer(TraceLayer::new_for_http())
}

/// Serve `app` on `listener` until `shutdown` resolves.
pub async fn serve(
  listener: TcpListener,
  app: Router,
  shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
  axum::serve(listener, app).with_graceful_shutdown(shutdown).await
}
