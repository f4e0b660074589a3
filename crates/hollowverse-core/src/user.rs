//! Users: the people who submit events and comments.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::validation::{Constrained, Field, FieldValue, Rule, Sanitizer, WEB_URL};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
  pub id:           Uuid,
  /// Opaque identifier assigned by the authentication provider.
  pub oauth_id:     String,
  pub name:         String,
  pub email:        Option<String>,
  pub photo_url:    Option<String>,
  pub signed_up_at: DateTime<Utc>,
}

/// Input to the store's user insert. `id` and `signed_up_at` are assigned by
/// the store.
#[derive(Debug, Clone)]
pub struct NewUser {
  pub oauth_id:  String,
  pub name:      String,
  pub email:     Option<String>,
  pub photo_url: Option<String>,
}

impl NewUser {
  pub fn new(oauth_id: impl Into<String>, name: impl Into<String>) -> Self {
    Self {
      oauth_id:  oauth_id.into(),
      name:      name.into(),
      email:     None,
      photo_url: None,
    }
  }
}

impl Constrained for NewUser {
  const FIELDS: &'static [Field] = &[
    Field { name: "oauthId", sanitizers: &[Sanitizer::Trim], rules: &[Rule::NotEmpty] },
    Field { name: "name", sanitizers: &[Sanitizer::Trim], rules: &[Rule::NotEmpty] },
    Field { name: "email", sanitizers: &[Sanitizer::Trim], rules: &[Rule::Email] },
    Field { name: "photoUrl", sanitizers: &[Sanitizer::Trim], rules: &[WEB_URL] },
  ];

  fn field(&self, name: &str) -> FieldValue<'_> {
    match name {
      "oauthId" => FieldValue::Text(&self.oauth_id),
      "name" => FieldValue::Text(&self.name),
      "email" => self.email.as_deref().map_or(FieldValue::Null, FieldValue::Text),
      "photoUrl" => self.photo_url.as_deref().map_or(FieldValue::Null, FieldValue::Text),
      _ => FieldValue::Missing,
    }
  }

  fn field_mut(&mut self, name: &str) -> Option<&mut String> {
    match name {
      "oauthId" => Some(&mut self.oauth_id),
      "name" => Some(&mut self.name),
      "email" => self.email.as_mut(),
      "photoUrl" => self.photo_url.as_mut(),
      _ => None,
    }
  }
}
