//! Connection options.

use std::path::PathBuf;

use serde::Deserialize;

/// Path that opens a private in-memory database.
pub const IN_MEMORY: &str = ":memory:";

/// How to open a [`SqliteStore`](crate::SqliteStore).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DatabaseConfig {
  /// Database file, or `":memory:"`.
  pub path:        PathBuf,
  /// Create any missing tables on connect.
  #[serde(default = "default_true")]
  pub synchronize: bool,
  /// Drop every table on connect (before synchronising). Meant for
  /// throwaway test databases.
  #[serde(default)]
  pub drop_schema: bool,
}

fn default_true() -> bool { true }

impl DatabaseConfig {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into(), synchronize: true, drop_schema: false }
  }

  pub fn in_memory() -> Self { Self::new(IN_MEMORY) }

  /// A disposable database: synchronised on connect, emptied first.
  pub fn throwaway(path: impl Into<PathBuf>) -> Self {
    Self { drop_schema: true, ..Self::new(path) }
  }
}
