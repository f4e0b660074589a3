//! An [`AuthProvider`] that never talks to an identity service.

use async_trait::async_trait;
use hollowverse_core::{
  Result,
  auth::{AuthProvider, ProfileDetails},
  user::User,
};
use uuid::Uuid;

const NAMES: &[&str] = &[
  "Ada Lovelace",
  "Grace Hopper",
  "Alan Turing",
  "Katherine Johnson",
  "Edsger Dijkstra",
  "Barbara Liskov",
];

/// Recognises no token as an existing user and fabricates profile data for
/// sign-ups.
#[derive(Debug, Clone, Copy, Default)]
pub struct FakeAuthProvider;

#[async_trait]
impl AuthProvider for FakeAuthProvider {
  async fn find_user_by_token(&self, _token: &str) -> Result<Option<User>> { Ok(None) }

  async fn get_profile_details_by_token(&self, _token: &str) -> Result<ProfileDetails> {
    let id = Uuid::new_v4();
    let name = NAMES[usize::from(id.as_bytes()[0]) % NAMES.len()];
    Ok(ProfileDetails { id: format!("fake-{}", id.simple()), name: name.into() })
  }

  async fn get_photo_url_by_user_id(&self, user_id: &str) -> Result<Option<String>> {
    Ok(Some(format!("https://photos.example.com/{user_id}.jpg")))
  }
}
