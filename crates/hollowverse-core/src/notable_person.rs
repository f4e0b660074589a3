//! The public figure an event is about.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::validation::{Constrained, Field, FieldValue, Rule, Sanitizer, WEB_URL};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotablePerson {
  pub id:        Uuid,
  pub name:      String,
  /// URL-safe unique handle, e.g. `"tom-hanks"`.
  pub slug:      String,
  pub photo_url: Option<String>,
}

/// Input to the store's notable-person insert.
#[derive(Debug, Clone)]
pub struct NewNotablePerson {
  pub name:      String,
  pub slug:      String,
  pub photo_url: Option<String>,
}

impl NewNotablePerson {
  pub fn new(name: impl Into<String>, slug: impl Into<String>) -> Self {
    Self { name: name.into(), slug: slug.into(), photo_url: None }
  }
}

impl Constrained for NewNotablePerson {
  const FIELDS: &'static [Field] = &[
    Field { name: "name", sanitizers: &[Sanitizer::Trim], rules: &[Rule::NotEmpty] },
    Field { name: "slug", sanitizers: &[Sanitizer::Trim], rules: &[Rule::NotEmpty] },
    Field { name: "photoUrl", sanitizers: &[Sanitizer::Trim], rules: &[WEB_URL] },
  ];

  fn field(&self, name: &str) -> FieldValue<'_> {
    match name {
      "name" => FieldValue::Text(&self.name),
      "slug" => FieldValue::Text(&self.slug),
      "photoUrl" => self.photo_url.as_deref().map_or(FieldValue::Null, FieldValue::Text),
      _ => FieldValue::Missing,
    }
  }

  fn field_mut(&mut self, name: &str) -> Option<&mut String> {
    match name {
      "name" => Some(&mut self.name),
      "slug" => Some(&mut self.slug),
      "photoUrl" => self.photo_url.as_mut(),
      _ => None,
    }
  }
}
