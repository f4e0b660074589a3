//! Events: a quote or action attributed to a notable person, with its source
//! and timing.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  comment::NewComment,
  validation::{Constrained, Field, FieldValue, Rule, Sanitizer, WEB_URL},
};

/// Constraint table shared by inserts and partial updates.
const EVENT_FIELDS: &[Field] = &[
  Field { name: "quote", sanitizers: &[Sanitizer::Trim], rules: &[Rule::NotEmpty] },
  Field { name: "sourceUrl", sanitizers: &[Sanitizer::Trim], rules: &[WEB_URL] },
];

// ─── Entity ──────────────────────────────────────────────────────────────────

/// A persisted event. Relations are held as foreign keys; comments are
/// loaded separately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotablePersonEvent {
  pub id:                         Uuid,
  pub quote:                      String,
  /// Whether the quote was said by the notable person (as opposed to being
  /// about them).
  pub is_quote_by_notable_person: bool,
  pub source_url:                 String,
  pub posted_at:                  DateTime<Utc>,
  pub happened_on:                Option<NaiveDate>,
  pub notable_person_id:          Uuid,
  pub owner_id:                   Uuid,
}

// ─── Insert ──────────────────────────────────────────────────────────────────

/// Input to the store's event insert. Any `comments` are written in the same
/// transaction and each runs its own insert hook.
#[derive(Debug, Clone)]
pub struct NewNotablePersonEvent {
  pub quote:                      String,
  pub is_quote_by_notable_person: bool,
  pub source_url:                 String,
  pub posted_at:                  DateTime<Utc>,
  pub happened_on:                Option<NaiveDate>,
  pub notable_person_id:          Uuid,
  pub owner_id:                   Uuid,
  pub comments:                   Vec<NewComment>,
}

impl Constrained for NewNotablePersonEvent {
  const FIELDS: &'static [Field] = EVENT_FIELDS;

  fn field(&self, name: &str) -> FieldValue<'_> {
    match name {
      "quote" => FieldValue::Text(&self.quote),
      "sourceUrl" => FieldValue::Text(&self.source_url),
      _ => FieldValue::Missing,
    }
  }

  fn field_mut(&mut self, name: &str) -> Option<&mut String> {
    match name {
      "quote" => Some(&mut self.quote),
      "sourceUrl" => Some(&mut self.source_url),
      _ => None,
    }
  }
}

// ─── Update ──────────────────────────────────────────────────────────────────

/// A partial update. `None` leaves the column untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventPatch {
  pub quote:                      Option<String>,
  pub is_quote_by_notable_person: Option<bool>,
  pub source_url:                 Option<String>,
  pub posted_at:                  Option<DateTime<Utc>>,
  /// `Some(None)` clears the date.
  pub happened_on:                Option<Option<NaiveDate>>,
}

impl Constrained for EventPatch {
  const FIELDS: &'static [Field] = EVENT_FIELDS;

  fn field(&self, name: &str) -> FieldValue<'_> {
    let value = match name {
      "quote" => self.quote.as_deref(),
      "sourceUrl" => self.source_url.as_deref(),
      _ => None,
    };
    value.map_or(FieldValue::Missing, FieldValue::Text)
  }

  fn field_mut(&mut self, name: &str) -> Option<&mut String> {
    match name {
      "quote" => self.quote.as_mut(),
      "sourceUrl" => self.source_url.as_mut(),
      _ => None,
    }
  }
}
