//! Error types for `hollowverse-core`.

use thiserror::Error;

use crate::validation::ValidationErrors;

#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  Validation(#[from] ValidationErrors),

  #[error("authentication provider error: {0}")]
  Auth(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
