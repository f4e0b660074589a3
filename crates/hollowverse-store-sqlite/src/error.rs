//! Error type for `hollowverse-store-sqlite`.

use hollowverse_core::validation::ValidationErrors;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  /// The write was rejected by the entity's sanitize/validate hook.
  #[error(transparent)]
  Validation(#[from] ValidationErrors),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("user not found: {0}")]
  UserNotFound(Uuid),

  #[error("notable person not found: {0}")]
  NotablePersonNotFound(Uuid),

  #[error("event not found: {0}")]
  EventNotFound(Uuid),

  /// A unique column already holds this value.
  #[error("{0} already exists")]
  Conflict(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
