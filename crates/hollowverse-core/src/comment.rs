//! Comments left by users on an event.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::validation::{Constrained, Field, FieldValue, Rule, Sanitizer};

/// A comment always belongs to exactly one event; deleting the event
/// deletes its comments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotablePersonEventComment {
  pub id:         Uuid,
  pub event_id:   Uuid,
  pub owner_id:   Uuid,
  pub text:       String,
  pub created_at: DateTime<Utc>,
}

/// A comment to be written, either on its own or cascaded with a new event.
/// The parent event is supplied by the write path.
#[derive(Debug, Clone)]
pub struct NewComment {
  pub owner_id: Uuid,
  pub text:     String,
}

impl NewComment {
  pub fn new(owner_id: Uuid, text: impl Into<String>) -> Self {
    Self { owner_id, text: text.into() }
  }
}

impl Constrained for NewComment {
  const FIELDS: &'static [Field] = &[Field {
    name:       "text",
    sanitizers: &[Sanitizer::Trim],
    rules:      &[Rule::NotEmpty],
  }];

  fn field(&self, name: &str) -> FieldValue<'_> {
    match name {
      "text" => FieldValue::Text(&self.text),
      _ => FieldValue::Missing,
    }
  }

  fn field_mut(&mut self, name: &str) -> Option<&mut String> {
    match name {
      "text" => Some(&mut self.text),
      _ => None,
    }
  }
}
