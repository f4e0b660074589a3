//! The authentication provider capability set.
//!
//! The API never verifies tokens itself; it asks an [`AuthProvider`]. Real
//! deployments plug in a provider backed by an identity service, tests plug
//! in a fake.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{Result, user::User};

/// Profile details the identity service reports for a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileDetails {
  /// The provider's opaque user id; stored as [`User::oauth_id`].
  pub id:   String,
  pub name: String,
}

#[async_trait]
pub trait AuthProvider: Send + Sync {
  /// Resolve a bearer token to an existing user, if any.
  async fn find_user_by_token(&self, token: &str) -> Result<Option<User>>;

  /// Fetch the profile the identity service holds for `token`.
  async fn get_profile_details_by_token(&self, token: &str) -> Result<ProfileDetails>;

  /// Fetch a profile photo URL for a provider user id.
  async fn get_photo_url_by_user_id(&self, user_id: &str) -> Result<Option<String>>;
}

/// A provider for deployments without an identity service: nobody is ever
/// signed in and sign-up is refused.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnonymousAuthProvider;

#[async_trait]
impl AuthProvider for AnonymousAuthProvider {
  async fn find_user_by_token(&self, _token: &str) -> Result<Option<User>> { Ok(None) }

  async fn get_profile_details_by_token(&self, _token: &str) -> Result<ProfileDetails> {
    Err(crate::Error::Auth("no identity provider configured".into()))
  }

  async fn get_photo_url_by_user_id(&self, _user_id: &str) -> Result<Option<String>> {
    Ok(None)
  }
}
