//! API error type and its mapping onto GraphQL errors.
//!
//! Every error carries an `extensions.code`; validation failures also carry
//! `extensions.violations`, the list of failed constraints.

use async_graphql::ErrorExtensions;
use hollowverse_core::validation::ValidationErrors;
use hollowverse_store_sqlite::Error as StoreError;
use thiserror::Error;

/// An error returned by a resolver.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("you must be signed in")]
  Unauthenticated,

  #[error("only the owner may modify this {0}")]
  Forbidden(&'static str),

  #[error("{0} not found")]
  NotFound(String),

  #[error("{0} already exists")]
  Conflict(String),

  #[error(transparent)]
  Validation(ValidationErrors),

  #[error("authentication provider error: {0}")]
  Auth(String),

  #[error("store error: {0}")]
  Store(#[source] StoreError),
}

impl ApiError {
  pub fn code(&self) -> &'static str {
    match self {
      Self::Unauthenticated => "UNAUTHENTICATED",
      Self::Forbidden(_) => "FORBIDDEN",
      Self::NotFound(_) => "NOT_FOUND",
      Self::Conflict(_) => "CONFLICT",
      Self::Validation(_) => "VALIDATION_FAILED",
      Self::Auth(_) => "AUTH_PROVIDER_ERROR",
      Self::Store(_) => "INTERNAL_SERVER_ERROR",
    }
  }
}

impl From<StoreError> for ApiError {
  fn from(e: StoreError) -> Self {
    match e {
      StoreError::Validation(v) => Self::Validation(v),
      StoreError::UserNotFound(id) => Self::NotFound(format!("user {id}")),
      StoreError::NotablePersonNotFound(id) => Self::NotFound(format!("notable person {id}")),
      StoreError::EventNotFound(id) => Self::NotFound(format!("event {id}")),
      StoreError::Conflict(what) => Self::Conflict(what),
      other => Self::Store(other),
    }
  }
}

impl From<hollowverse_core::Error> for ApiError {
  fn from(e: hollowverse_core::Error) -> Self {
    match e {
      hollowverse_core::Error::Validation(v) => Self::Validation(v),
      hollowverse_core::Error::Auth(msg) => Self::Auth(msg),
    }
  }
}

impl ErrorExtensions for ApiError {
  fn extend(&self) -> async_graphql::Error {
    if let Self::Store(e) = self {
      tracing::error!(error = %e, "store failure while resolving request");
    }
    async_graphql::Error::new(self.to_string()).extend_with(|_, ext| {
      ext.set("code", self.code());
      if let Self::Validation(errors) = self
        && let Ok(violations) = async_graphql::to_value(errors.violations())
      {
        ext.set("violations", violations);
      }
    })
  }
}

/// Convert any error that maps onto [`ApiError`] into a coded GraphQL error.
///
/// `?` alone would go through async-graphql's blanket `Display` conversion
/// and drop the extensions.
pub(crate) trait GqlResultExt<T> {
  fn gql(self) -> async_graphql::Result<T>;
}

impl<T, E: Into<ApiError>> GqlResultExt<T> for Result<T, E> {
  fn gql(self) -> async_graphql::Result<T> { self.map_err(|e| e.into().extend()) }
}
