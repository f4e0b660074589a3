//! GraphQL object and input types.
//!
//! Output objects wrap the core entities and resolve relations lazily
//! through the store held in the schema context.

use async_graphql::{Context, InputObject, MaybeUndefined, Object};
use chrono::{DateTime, NaiveDate, Utc};
use hollowverse_core::{
  comment::NotablePersonEventComment, event::EventPatch, event::NotablePersonEvent,
  notable_person::NotablePerson, user::User,
};
use hollowverse_store_sqlite::SqliteStore;
use uuid::Uuid;

use crate::error::{ApiError, GqlResultExt as _};

pub(crate) fn store<'a>(ctx: &Context<'a>) -> async_graphql::Result<&'a SqliteStore> {
  ctx.data::<SqliteStore>()
}

// ─── Outputs ─────────────────────────────────────────────────────────────────

pub struct UserObject(pub User);

#[Object(name = "User")]
impl UserObject {
  async fn id(&self) -> Uuid { self.0.id }

  async fn name(&self) -> &str { &self.0.name }

  async fn photo_url(&self) -> Option<&str> { self.0.photo_url.as_deref() }

  async fn signed_up_at(&self) -> DateTime<Utc> { self.0.signed_up_at }
}

pub struct NotablePersonObject(pub NotablePerson);

#[Object(name = "NotablePerson")]
impl NotablePersonObject {
  async fn id(&self) -> Uuid { self.0.id }

  async fn name(&self) -> &str { &self.0.name }

  async fn slug(&self) -> &str { &self.0.slug }

  async fn photo_url(&self) -> Option<&str> { self.0.photo_url.as_deref() }

  /// Events about this person, most recently posted first.
  async fn events(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<EventObject>> {
    let events = store(ctx)?.list_events(self.0.id).await.gql()?;
    Ok(events.into_iter().map(EventObject).collect())
  }
}

pub struct EventObject(pub NotablePersonEvent);

#[Object(name = "NotablePersonEvent")]
impl EventObject {
  async fn id(&self) -> Uuid { self.0.id }

  async fn quote(&self) -> &str { &self.0.quote }

  async fn is_quote_by_notable_person(&self) -> bool { self.0.is_quote_by_notable_person }

  async fn source_url(&self) -> &str { &self.0.source_url }

  async fn posted_at(&self) -> DateTime<Utc> { self.0.posted_at }

  async fn happened_on(&self) -> Option<NaiveDate> { self.0.happened_on }

  async fn notable_person(&self, ctx: &Context<'_>) -> async_graphql::Result<NotablePersonObject> {
    let id = self.0.notable_person_id;
    let person = store(ctx)?.get_notable_person(id).await.gql()?;
    person
      .map(NotablePersonObject)
      .ok_or_else(|| ApiError::NotFound(format!("notable person {id}")))
      .gql()
  }

  async fn owner(&self, ctx: &Context<'_>) -> async_graphql::Result<UserObject> {
    let id = self.0.owner_id;
    let user = store(ctx)?.get_user(id).await.gql()?;
    user
      .map(UserObject)
      .ok_or_else(|| ApiError::NotFound(format!("user {id}")))
      .gql()
  }

  async fn comments(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<CommentObject>> {
    let comments = store(ctx)?.list_comments(self.0.id).await.gql()?;
    Ok(comments.into_iter().map(CommentObject).collect())
  }
}

pub struct CommentObject(pub NotablePersonEventComment);

#[Object(name = "NotablePersonEventComment")]
impl CommentObject {
  async fn id(&self) -> Uuid { self.0.id }

  async fn text(&self) -> &str { &self.0.text }

  async fn created_at(&self) -> DateTime<Utc> { self.0.created_at }

  async fn owner(&self, ctx: &Context<'_>) -> async_graphql::Result<UserObject> {
    let id = self.0.owner_id;
    let user = store(ctx)?.get_user(id).await.gql()?;
    user
      .map(UserObject)
      .ok_or_else(|| ApiError::NotFound(format!("user {id}")))
      .gql()
  }
}

// ─── Inputs ──────────────────────────────────────────────────────────────────

#[derive(Debug, InputObject)]
pub struct CreateNotablePersonEventInput {
  pub notable_person_id:          Uuid,
  pub quote:                      String,
  pub is_quote_by_notable_person: bool,
  pub source_url:                 String,
  pub happened_on:                Option<NaiveDate>,
  /// Initial comments by the submitter, written with the event.
  #[graphql(default)]
  pub comments:                   Vec<String>,
}

/// Omitted fields are left unchanged; `happenedOn: null` clears the date.
#[derive(Debug, InputObject)]
pub struct UpdateNotablePersonEventInput {
  pub quote:                      Option<String>,
  pub is_quote_by_notable_person: Option<bool>,
  pub source_url:                 Option<String>,
  pub happened_on:                MaybeUndefined<NaiveDate>,
}

impl From<UpdateNotablePersonEventInput> for EventPatch {
  fn from(input: UpdateNotablePersonEventInput) -> Self {
    EventPatch {
      quote:                      input.quote,
      is_quote_by_notable_person: input.is_quote_by_notable_person,
      source_url:                 input.source_url,
      posted_at:                  None,
      happened_on:                match input.happened_on {
        MaybeUndefined::Undefined => None,
        MaybeUndefined::Null => Some(None),
        MaybeUndefined::Value(date) => Some(Some(date)),
      },
    }
  }
}
