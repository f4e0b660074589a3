//! [`SqliteStore`]: entity persistence with write hooks.

use chrono::Utc;
use hollowverse_core::{
  comment::{NewComment, NotablePersonEventComment},
  event::{EventPatch, NewNotablePersonEvent, NotablePersonEvent},
  notable_person::{NewNotablePerson, NotablePerson},
  user::{NewUser, User},
  validation::{ValidationErrors, before_insert, before_update},
};
use rusqlite::{OptionalExtension as _, types::Value};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
  DatabaseConfig, Error, Result,
  encode::{
    COMMENT_COLUMNS, EVENT_COLUMNS, NOTABLE_PERSON_COLUMNS, RawComment, RawEvent,
    RawNotablePerson, RawUser, USER_COLUMNS, encode_date, encode_dt, encode_uuid,
  },
  schema::{DROP_SCHEMA, PRAGMAS, SCHEMA},
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Hollowverse store backed by a single SQLite connection.
///
/// Cloning is cheap; every clone talks to the same connection thread.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open a connection as described by `config`.
  pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(&config.path).await?;
    let store = Self { conn };

    store.execute_batch(PRAGMAS).await?;
    if config.drop_schema {
      store.drop_database().await?;
    }
    if config.synchronize {
      store.synchronize().await?;
    }

    info!(path = %config.path.display(), "connected to database");
    Ok(store)
  }

  /// Open a synchronised in-memory store.
  pub async fn open_in_memory() -> Result<Self> {
    Self::connect(&DatabaseConfig::in_memory()).await
  }

  /// Create any missing tables.
  pub async fn synchronize(&self) -> Result<()> {
    debug!("synchronising schema");
    self.execute_batch(SCHEMA).await
  }

  /// Drop every table this store manages.
  pub async fn drop_database(&self) -> Result<()> {
    debug!("dropping schema");
    self.execute_batch(DROP_SCHEMA).await
  }

  /// Close the underlying connection. Other clones of this store fail
  /// afterwards.
  pub async fn close(self) -> Result<()> {
    self.conn.close().await?;
    Ok(())
  }

  /// Names of the user tables currently present, sorted.
  pub async fn table_names(&self) -> Result<Vec<String>> {
    let names = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT name FROM sqlite_master
           WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
           ORDER BY name",
        )?;
        let rows = stmt
          .query_map([], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(names)
  }

  async fn execute_batch(&self, sql: &'static str) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        conn.execute_batch(sql)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Whether a row with primary key `id` exists in `table`.
  async fn exists(&self, table: &'static str, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);
    let found = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT 1 FROM {table} WHERE id = ?1"),
              rusqlite::params![id_str],
              |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false),
        )
      })
      .await?;
    Ok(found)
  }

  async fn require_user(&self, id: Uuid) -> Result<()> {
    if self.exists("users", id).await? { Ok(()) } else { Err(Error::UserNotFound(id)) }
  }

  // ── Users ─────────────────────────────────────────────────────────────────

  pub async fn insert_user(&self, mut input: NewUser) -> Result<User> {
    reject_invalid("user", before_insert(&mut input))?;

    if self.find_user_by_oauth_id(&input.oauth_id).await?.is_some() {
      return Err(Error::Conflict(format!("user with oauth id {:?}", input.oauth_id)));
    }

    let user = User {
      id:           Uuid::new_v4(),
      oauth_id:     input.oauth_id,
      name:         input.name,
      email:        input.email,
      photo_url:    input.photo_url,
      signed_up_at: Utc::now(),
    };

    let id_str    = encode_uuid(user.id);
    let oauth_id  = user.oauth_id.clone();
    let name      = user.name.clone();
    let email     = user.email.clone();
    let photo_url = user.photo_url.clone();
    let at_str    = encode_dt(user.signed_up_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO users (id, oauth_id, name, email, photo_url, signed_up_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![id_str, oauth_id, name, email, photo_url, at_str],
        )?;
        Ok(())
      })
      .await
      .map_err(|e| {
        conflict_on_unique(e, || format!("user with oauth id {:?}", user.oauth_id))
      })?;

    info!(user_id = %user.id, "user created");
    Ok(user)
  }

  pub async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
    let id_str = encode_uuid(id);
    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
              rusqlite::params![id_str],
              RawUser::from_row,
            )
            .optional()?,
        )
      })
      .await?;
    raw.map(RawUser::into_user).transpose()
  }

  pub async fn find_user_by_oauth_id(&self, oauth_id: &str) -> Result<Option<User>> {
    let oauth_id = oauth_id.to_owned();
    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {USER_COLUMNS} FROM users WHERE oauth_id = ?1"),
              rusqlite::params![oauth_id],
              RawUser::from_row,
            )
            .optional()?,
        )
      })
      .await?;
    raw.map(RawUser::into_user).transpose()
  }

  // ── Notable people ────────────────────────────────────────────────────────

  pub async fn insert_notable_person(&self, mut input: NewNotablePerson) -> Result<NotablePerson> {
    reject_invalid("notable person", before_insert(&mut input))?;

    if self.find_notable_person_by_slug(&input.slug).await?.is_some() {
      return Err(Error::Conflict(format!("notable person with slug {:?}", input.slug)));
    }

    let person = NotablePerson {
      id:        Uuid::new_v4(),
      name:      input.name,
      slug:      input.slug,
      photo_url: input.photo_url,
    };

    let id_str    = encode_uuid(person.id);
    let name      = person.name.clone();
    let slug      = person.slug.clone();
    let photo_url = person.photo_url.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO notable_people (id, name, slug, photo_url) VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id_str, name, slug, photo_url],
        )?;
        Ok(())
      })
      .await
      .map_err(|e| {
        conflict_on_unique(e, || format!("notable person with slug {:?}", person.slug))
      })?;

    info!(notable_person_id = %person.id, slug = %person.slug, "notable person created");
    Ok(person)
  }

  pub async fn get_notable_person(&self, id: Uuid) -> Result<Option<NotablePerson>> {
    let id_str = encode_uuid(id);
    let raw: Option<RawNotablePerson> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {NOTABLE_PERSON_COLUMNS} FROM notable_people WHERE id = ?1"),
              rusqlite::params![id_str],
              RawNotablePerson::from_row,
            )
            .optional()?,
        )
      })
      .await?;
    raw.map(RawNotablePerson::into_notable_person).transpose()
  }

  pub async fn find_notable_person_by_slug(&self, slug: &str) -> Result<Option<NotablePerson>> {
    let slug = slug.to_owned();
    let raw: Option<RawNotablePerson> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {NOTABLE_PERSON_COLUMNS} FROM notable_people WHERE slug = ?1"),
              rusqlite::params![slug],
              RawNotablePerson::from_row,
            )
            .optional()?,
        )
      })
      .await?;
    raw.map(RawNotablePerson::into_notable_person).transpose()
  }

  // ── Events ────────────────────────────────────────────────────────────────

  /// Insert an event together with its initial comments.
  ///
  /// The event and every comment run their insert hook first; violations
  /// from comments are reported as `comments.<index>.<field>`. Nothing is
  /// written unless all of them pass.
  pub async fn insert_event(&self, mut input: NewNotablePersonEvent) -> Result<NotablePersonEvent> {
    let mut violations = before_insert(&mut input).err().map(|e| e.0).unwrap_or_default();
    for (index, comment) in input.comments.iter_mut().enumerate() {
      if let Err(e) = before_insert(comment) {
        violations.extend(e.0.into_iter().map(|mut v| {
          v.property = format!("comments.{index}.{}", v.property);
          v
        }));
      }
    }
    if !violations.is_empty() {
      reject_invalid("event", Err(ValidationErrors(violations)))?;
    }

    if !self.exists("notable_people", input.notable_person_id).await? {
      return Err(Error::NotablePersonNotFound(input.notable_person_id));
    }
    self.require_user(input.owner_id).await?;
    for comment in &input.comments {
      self.require_user(comment.owner_id).await?;
    }

    let event = NotablePersonEvent {
      id:                         Uuid::new_v4(),
      quote:                      input.quote,
      is_quote_by_notable_person: input.is_quote_by_notable_person,
      source_url:                 input.source_url,
      posted_at:                  input.posted_at,
      happened_on:                input.happened_on,
      notable_person_id:          input.notable_person_id,
      owner_id:                   input.owner_id,
    };

    let now = Utc::now();
    let comments: Vec<NotablePersonEventComment> = input
      .comments
      .into_iter()
      .map(|c| NotablePersonEventComment {
        id:         Uuid::new_v4(),
        event_id:   event.id,
        owner_id:   c.owner_id,
        text:       c.text,
        created_at: now,
      })
      .collect();

    let row = event.clone();
    let comment_rows = comments.clone();

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT INTO notable_person_events (
             id, quote, is_quote_by_notable_person, source_url,
             posted_at, happened_on, notable_person_id, owner_id
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![
            encode_uuid(row.id),
            row.quote,
            row.is_quote_by_notable_person,
            row.source_url,
            encode_dt(row.posted_at),
            row.happened_on.map(encode_date),
            encode_uuid(row.notable_person_id),
            encode_uuid(row.owner_id),
          ],
        )?;
        for c in &comment_rows {
          insert_comment_row(&tx, c)?;
        }
        tx.commit()?;
        Ok(())
      })
      .await?;

    info!(event_id = %event.id, comments = comments.len(), "event created");
    Ok(event)
  }

  /// Apply a partial update. Only the fields present in `patch` are
  /// sanitised, validated and written; the row is re-read in the same
  /// transaction.
  pub async fn update_event(&self, id: Uuid, mut patch: EventPatch) -> Result<NotablePersonEvent> {
    reject_invalid("event", before_update(&mut patch))?;

    let columns = patch_columns(patch);
    let id_str = encode_uuid(id);
    let raw: Option<RawEvent> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if !columns.is_empty() {
          let assignments = columns
            .iter()
            .enumerate()
            .map(|(i, (column, _))| format!("{column} = ?{}", i + 2))
            .collect::<Vec<_>>()
            .join(", ");
          let params = std::iter::once(Value::Text(id_str.clone()))
            .chain(columns.into_iter().map(|(_, value)| value));
          tx.execute(
            &format!("UPDATE notable_person_events SET {assignments} WHERE id = ?1"),
            rusqlite::params_from_iter(params),
          )?;
        }
        let raw = tx
          .query_row(
            &format!("SELECT {EVENT_COLUMNS} FROM notable_person_events WHERE id = ?1"),
            rusqlite::params![id_str],
            RawEvent::from_row,
          )
          .optional()?;
        tx.commit()?;
        Ok(raw)
      })
      .await?;

    let event = raw.ok_or(Error::EventNotFound(id))?.into_event()?;
    info!(event_id = %id, "event updated");
    Ok(event)
  }

  pub async fn get_event(&self, id: Uuid) -> Result<Option<NotablePersonEvent>> {
    let id_str = encode_uuid(id);
    let raw: Option<RawEvent> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {EVENT_COLUMNS} FROM notable_person_events WHERE id = ?1"),
              rusqlite::params![id_str],
              RawEvent::from_row,
            )
            .optional()?,
        )
      })
      .await?;
    raw.map(RawEvent::into_event).transpose()
  }

  /// Events about a notable person, most recently posted first.
  pub async fn list_events(&self, notable_person_id: Uuid) -> Result<Vec<NotablePersonEvent>> {
    let id_str = encode_uuid(notable_person_id);
    let raws: Vec<RawEvent> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {EVENT_COLUMNS} FROM notable_person_events
           WHERE notable_person_id = ?1
           ORDER BY posted_at DESC, id"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], RawEvent::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    raws.into_iter().map(RawEvent::into_event).collect()
  }

  /// Delete an event; its comments go with it.
  pub async fn delete_event(&self, id: Uuid) -> Result<()> {
    let id_str = encode_uuid(id);
    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM notable_person_events WHERE id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;

    if deleted == 0 {
      return Err(Error::EventNotFound(id));
    }
    info!(event_id = %id, "event deleted");
    Ok(())
  }

  // ── Comments ──────────────────────────────────────────────────────────────

  pub async fn add_comment(
    &self,
    event_id: Uuid,
    mut input: NewComment,
  ) -> Result<NotablePersonEventComment> {
    reject_invalid("comment", before_insert(&mut input))?;

    if !self.exists("notable_person_events", event_id).await? {
      return Err(Error::EventNotFound(event_id));
    }
    self.require_user(input.owner_id).await?;

    let comment = NotablePersonEventComment {
      id: Uuid::new_v4(),
      event_id,
      owner_id: input.owner_id,
      text: input.text,
      created_at: Utc::now(),
    };

    let row = comment.clone();
    self
      .conn
      .call(move |conn| {
        insert_comment_row(conn, &row)?;
        Ok(())
      })
      .await?;

    info!(comment_id = %comment.id, event_id = %event_id, "comment added");
    Ok(comment)
  }

  /// Comments on an event, oldest first. Comments written together keep
  /// their insertion order.
  pub async fn list_comments(&self, event_id: Uuid) -> Result<Vec<NotablePersonEventComment>> {
    let id_str = encode_uuid(event_id);
    let raws: Vec<RawComment> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {COMMENT_COLUMNS} FROM notable_person_event_comments
           WHERE event_id = ?1
           ORDER BY created_at, rowid"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], RawComment::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    raws.into_iter().map(RawComment::into_comment).collect()
  }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

/// Turn a failed hook into a store error, logging the rejection.
fn reject_invalid(entity: &str, outcome: Result<(), ValidationErrors>) -> Result<()> {
  outcome.map_err(|errors| {
    warn!(entity, %errors, "write rejected by validation");
    Error::Validation(errors)
  })
}

/// Column assignments for the fields present in `patch`.
fn patch_columns(patch: EventPatch) -> Vec<(&'static str, Value)> {
  let mut columns = Vec::new();
  if let Some(quote) = patch.quote {
    columns.push(("quote", Value::Text(quote)));
  }
  if let Some(flag) = patch.is_quote_by_notable_person {
    columns.push(("is_quote_by_notable_person", Value::Integer(i64::from(flag))));
  }
  if let Some(url) = patch.source_url {
    columns.push(("source_url", Value::Text(url)));
  }
  if let Some(at) = patch.posted_at {
    columns.push(("posted_at", Value::Text(encode_dt(at))));
  }
  if let Some(on) = patch.happened_on {
    columns.push(("happened_on", on.map_or(Value::Null, |d| Value::Text(encode_date(d)))));
  }
  columns
}

/// Map a UNIQUE violation on insert to [`Error::Conflict`].
fn conflict_on_unique(e: tokio_rusqlite::Error, what: impl FnOnce() -> String) -> Error {
  match e {
    tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(failure, _))
      if failure.code == rusqlite::ErrorCode::ConstraintViolation =>
    {
      Error::Conflict(what())
    }
    other => Error::Database(other),
  }
}

fn insert_comment_row(
  conn: &rusqlite::Connection,
  c: &NotablePersonEventComment,
) -> rusqlite::Result<()> {
  conn.execute(
    "INSERT INTO notable_person_event_comments (id, text, created_at, event_id, owner_id)
     VALUES (?1, ?2, ?3, ?4, ?5)",
    rusqlite::params![
      encode_uuid(c.id),
      c.text,
      encode_dt(c.created_at),
      encode_uuid(c.event_id),
      encode_uuid(c.owner_id),
    ],
  )?;
  Ok(())
}
