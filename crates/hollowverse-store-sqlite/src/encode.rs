//! Conversions between domain types and the plain-text column encodings.
//!
//! Timestamps are fixed-width RFC 3339 UTC strings (so they sort
//! lexically), dates are `YYYY-MM-DD`, UUIDs are hyphenated lowercase.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use hollowverse_core::{
  comment::NotablePersonEventComment, event::NotablePersonEvent,
  notable_person::NotablePerson, user::User,
};
use uuid::Uuid;

use crate::{Error, Result};

const DATE_FORMAT: &str = "%Y-%m-%d";

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub fn encode_date(d: NaiveDate) -> String { d.format(DATE_FORMAT).to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Raw rows ────────────────────────────────────────────────────────────────

/// Column list matching [`RawUser::from_row`].
pub const USER_COLUMNS: &str = "id, oauth_id, name, email, photo_url, signed_up_at";

pub struct RawUser {
  pub id:           String,
  pub oauth_id:     String,
  pub name:         String,
  pub email:        Option<String>,
  pub photo_url:    Option<String>,
  pub signed_up_at: String,
}

impl RawUser {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:           row.get(0)?,
      oauth_id:     row.get(1)?,
      name:         row.get(2)?,
      email:        row.get(3)?,
      photo_url:    row.get(4)?,
      signed_up_at: row.get(5)?,
    })
  }

  pub fn into_user(self) -> Result<User> {
    Ok(User {
      id:           decode_uuid(&self.id)?,
      oauth_id:     self.oauth_id,
      name:         self.name,
      email:        self.email,
      photo_url:    self.photo_url,
      signed_up_at: decode_dt(&self.signed_up_at)?,
    })
  }
}

/// Column list matching [`RawNotablePerson::from_row`].
pub const NOTABLE_PERSON_COLUMNS: &str = "id, name, slug, photo_url";

pub struct RawNotablePerson {
  pub id:        String,
  pub name:      String,
  pub slug:      String,
  pub photo_url: Option<String>,
}

impl RawNotablePerson {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:        row.get(0)?,
      name:      row.get(1)?,
      slug:      row.get(2)?,
      photo_url: row.get(3)?,
    })
  }

  pub fn into_notable_person(self) -> Result<NotablePerson> {
    Ok(NotablePerson {
      id:        decode_uuid(&self.id)?,
      name:      self.name,
      slug:      self.slug,
      photo_url: self.photo_url,
    })
  }
}

/// Column list matching [`RawEvent::from_row`].
pub const EVENT_COLUMNS: &str = "id, quote, is_quote_by_notable_person, source_url, \
                                 posted_at, happened_on, notable_person_id, owner_id";

pub struct RawEvent {
  pub id:                         String,
  pub quote:                      String,
  pub is_quote_by_notable_person: bool,
  pub source_url:                 String,
  pub posted_at:                  String,
  pub happened_on:                Option<String>,
  pub notable_person_id:          String,
  pub owner_id:                   String,
}

impl RawEvent {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:                         row.get(0)?,
      quote:                      row.get(1)?,
      is_quote_by_notable_person: row.get(2)?,
      source_url:                 row.get(3)?,
      posted_at:                  row.get(4)?,
      happened_on:                row.get(5)?,
      notable_person_id:          row.get(6)?,
      owner_id:                   row.get(7)?,
    })
  }

  pub fn into_event(self) -> Result<NotablePersonEvent> {
    Ok(NotablePersonEvent {
      id:                         decode_uuid(&self.id)?,
      quote:                      self.quote,
      is_quote_by_notable_person: self.is_quote_by_notable_person,
      source_url:                 self.source_url,
      posted_at:                  decode_dt(&self.posted_at)?,
      happened_on:                self.happened_on.as_deref().map(decode_date).transpose()?,
      notable_person_id:          decode_uuid(&self.notable_person_id)?,
      owner_id:                   decode_uuid(&self.owner_id)?,
    })
  }
}

/// Column list matching [`RawComment::from_row`].
pub const COMMENT_COLUMNS: &str = "id, event_id, owner_id, text, created_at";

pub struct RawComment {
  pub id:         String,
  pub event_id:   String,
  pub owner_id:   String,
  pub text:       String,
  pub created_at: String,
}

impl RawComment {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get(0)?,
      event_id:   row.get(1)?,
      owner_id:   row.get(2)?,
      text:       row.get(3)?,
      created_at: row.get(4)?,
    })
  }

  pub fn into_comment(self) -> Result<NotablePersonEventComment> {
    Ok(NotablePersonEventComment {
      id:         decode_uuid(&self.id)?,
      event_id:   decode_uuid(&self.event_id)?,
      owner_id:   decode_uuid(&self.owner_id)?,
      text:       self.text,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}
