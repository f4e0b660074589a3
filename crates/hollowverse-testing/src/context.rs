//! Per-test application bootstrap and teardown.

use std::{
  net::{Ipv4Addr, SocketAddr},
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::{Context as _, Result};
use hollowverse_api::ApiOptions;
use hollowverse_core::auth::AuthProvider;
use hollowverse_server::{GRAPHQL_PATH, app, serve};
use hollowverse_store_sqlite::{DatabaseConfig, SqliteStore};
use tokio::{net::TcpListener, sync::oneshot, task::JoinHandle};
use tracing::{debug, warn};

use crate::{ClientOptions, FakeAuthProvider, GraphQLClient, TestSettings};

/// Replacements for the pieces the API is built from.
#[derive(Clone, Default)]
pub struct ApiOverrides {
  /// Reuse this store instead of opening a throwaway database.
  pub store:         Option<SqliteStore>,
  /// Defaults to [`FakeAuthProvider`].
  pub auth_provider: Option<Arc<dyn AuthProvider>>,
}

#[derive(Clone, Default)]
pub struct TestContextOptions {
  pub api:      ApiOverrides,
  pub client:   ClientOptions,
  /// Where to open a fresh database when no store is supplied. Defaults to a
  /// uniquely named file from [`TestSettings`], deleted on teardown.
  pub database: Option<DatabaseConfig>,
}

/// A running application plus a client pointed at it.
pub struct TestContext {
  pub client:        GraphQLClient,
  pub store:         SqliteStore,
  pub auth_provider: Arc<dyn AuthProvider>,
  /// `http://localhost:<port>/graphql`
  pub endpoint:      String,
  pub addr:          SocketAddr,
  server:            Server,
  owned_file:        Option<PathBuf>,
}

struct Server {
  shutdown: oneshot::Sender<()>,
  task:     JoinHandle<std::io::Result<()>>,
}

impl Server {
  async fn stop(self) -> Result<()> {
    // The server may already have exited; its result is reported below.
    let _ = self.shutdown.send(());
    self
      .task
      .await
      .context("server task panicked")?
      .context("server exited with an error")
  }
}

/// Start the application on a free port.
///
/// The port and the database are acquired concurrently. Any setup failure
/// is returned as is.
pub async fn create_test_context(options: TestContextOptions) -> Result<TestContext> {
  init_tracing();

  let TestContextOptions { api, client, database } = options;
  let auth_provider = api
    .auth_provider
    .unwrap_or_else(|| Arc::new(FakeAuthProvider));

  let (listener, (store, owned_file)) =
    tokio::try_join!(acquire_listener(), acquire_store(api.store, database))?;

  // Nothing is spawned until every fallible step has passed.
  let prepared = listener
    .local_addr()
    .context("listener has no local address")
    .and_then(|addr| {
      let endpoint = format!("http://localhost:{}{GRAPHQL_PATH}", addr.port());
      let client = GraphQLClient::new(endpoint.clone(), client)
        .context("failed to build GraphQL client")?;
      Ok((addr, endpoint, client))
    });
  let (addr, endpoint, client) = match prepared {
    Ok(prepared) => prepared,
    Err(e) => {
      if let Some(path) = owned_file {
        discard_database(store, &path).await;
      }
      return Err(e);
    }
  };

  let application = app(ApiOptions::new(store.clone(), auth_provider.clone()));
  let (shutdown, signal) = oneshot::channel::<()>();
  let task = tokio::spawn(serve(listener, application, async move {
    let _ = signal.await;
  }));

  debug!(%endpoint, "test context ready");
  Ok(TestContext {
    client,
    store,
    auth_provider,
    endpoint,
    addr,
    server: Server { shutdown, task },
    owned_file,
  })
}

impl TestContext {
  /// The database file this context generated and will delete, if any.
  pub fn owned_database_file(&self) -> Option<&Path> { self.owned_file.as_deref() }

  /// Drop the schema and close the database while shutting the listener
  /// down. A database file the context created itself is removed afterwards.
  pub async fn teardown(self) -> Result<()> {
    let Self { client, store, server, owned_file, .. } = self;
    drop(client);

    let close_database = async move {
      store.drop_database().await.context("failed to drop schema")?;
      store.close().await.context("failed to close database")
    };
    tokio::try_join!(close_database, server.stop())?;

    if let Some(path) = owned_file {
      tokio::fs::remove_file(&path)
        .await
        .with_context(|| format!("failed to remove {}", path.display()))?;
    }
    Ok(())
  }
}

async fn acquire_listener() -> Result<TcpListener> {
  TcpListener::bind((Ipv4Addr::LOCALHOST, 0))
    .await
    .context("failed to acquire a free port")
}

async fn acquire_store(
  supplied: Option<SqliteStore>,
  database: Option<DatabaseConfig>,
) -> Result<(SqliteStore, Option<PathBuf>)> {
  if let Some(store) = supplied {
    return Ok((store, None));
  }

  let (config, owned_file) = match database {
    Some(config) => (config, None),
    None => {
      let config = TestSettings::from_env()
        .context("failed to read test settings")?
        .throwaway_database();
      let path = config.path.clone();
      (config, Some(path))
    }
  };

  let store = SqliteStore::connect(&config)
    .await
    .with_context(|| format!("failed to open test database at {}", config.path.display()))?;
  Ok((store, owned_file))
}

/// Best-effort removal of a database the harness created for a context that
/// never started.
async fn discard_database(store: SqliteStore, path: &Path) {
  if let Err(e) = store.close().await {
    warn!(error = %e, "failed to close discarded test database");
  }
  if let Err(e) = tokio::fs::remove_file(path).await {
    warn!(error = %e, path = %path.display(), "failed to remove discarded test database");
  }
}

fn init_tracing() {
  let _ = tracing_subscriber::fmt()
    .with_test_writer()
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
    .try_init();
}
