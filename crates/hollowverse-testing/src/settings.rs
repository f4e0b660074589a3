//! Environment-driven harness settings.

use std::path::PathBuf;

use hollowverse_store_sqlite::DatabaseConfig;
use serde::Deserialize;
use uuid::Uuid;

/// Read from `HOLLOWVERSE_TEST_*` variables.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TestSettings {
  /// Directory for throwaway databases. Defaults to the OS temp dir.
  pub database_dir: Option<PathBuf>,
}

impl TestSettings {
  pub fn from_env() -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .add_source(config::Environment::with_prefix("HOLLOWVERSE_TEST"))
      .build()?
      .try_deserialize()
  }

  /// A fresh, uniquely named database file under [`Self::database_dir`].
  pub fn throwaway_database(&self) -> DatabaseConfig {
    let dir = self.database_dir.clone().unwrap_or_else(std::env::temp_dir);
    let file = format!("hollowverse-api-test-db-{}.sqlite3", Uuid::new_v4().simple());
    DatabaseConfig::throwaway(dir.join(file))
  }
}
