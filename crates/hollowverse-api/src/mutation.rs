//! Mutation root.
//!
//! Every mutation that writes on behalf of a user resolves the viewer
//! through the [`AuthProvider`](hollowverse_core::auth::AuthProvider) first.
//! Sanitisation and validation happen in the store's write path.

use async_graphql::{Context, ErrorExtensions as _, Object};
use chrono::Utc;
use hollowverse_core::{
  comment::NewComment,
  event::{EventPatch, NewNotablePersonEvent, NotablePersonEvent},
  user::{NewUser, User},
};
use uuid::Uuid;

use crate::{
  auth,
  error::{ApiError, GqlResultExt as _},
  types::{
    CommentObject, CreateNotablePersonEventInput, EventObject, UpdateNotablePersonEventInput,
    UserObject, store,
  },
};

pub struct MutationRoot;

#[Object]
impl MutationRoot {
  /// Sign up the holder of the request's bearer token, using the profile the
  /// identity provider reports for it.
  async fn create_user(
    &self,
    ctx: &Context<'_>,
    email: Option<String>,
  ) -> async_graphql::Result<UserObject> {
    let token = auth::require_token(ctx)?;
    let provider = auth::provider(ctx)?;

    let profile = provider.get_profile_details_by_token(token).await.gql()?;
    let photo_url = provider.get_photo_url_by_user_id(&profile.id).await.gql()?;

    let user = store(ctx)?
      .insert_user(NewUser {
        oauth_id: profile.id,
        name: profile.name,
        email,
        photo_url,
      })
      .await
      .gql()?;
    Ok(UserObject(user))
  }

  async fn create_notable_person_event(
    &self,
    ctx: &Context<'_>,
    input: CreateNotablePersonEventInput,
  ) -> async_graphql::Result<EventObject> {
    let viewer = auth::require_viewer(ctx).await?;

    let event = store(ctx)?
      .insert_event(NewNotablePersonEvent {
        quote:                      input.quote,
        is_quote_by_notable_person: input.is_quote_by_notable_person,
        source_url:                 input.source_url,
        posted_at:                  Utc::now(),
        happened_on:                input.happened_on,
        notable_person_id:          input.notable_person_id,
        owner_id:                   viewer.id,
        comments:                   input
          .comments
          .into_iter()
          .map(|text| NewComment::new(viewer.id, text))
          .collect(),
      })
      .await
      .gql()?;
    Ok(EventObject(event))
  }

  /// Partially update an event the viewer owns.
  async fn update_notable_person_event(
    &self,
    ctx: &Context<'_>,
    id: Uuid,
    input: UpdateNotablePersonEventInput,
  ) -> async_graphql::Result<EventObject> {
    let viewer = auth::require_viewer(ctx).await?;
    owned_event(ctx, &viewer, id).await?;

    let event = store(ctx)?.update_event(id, EventPatch::from(input)).await.gql()?;
    Ok(EventObject(event))
  }

  /// Delete an event the viewer owns, along with its comments. Returns the
  /// deleted id.
  async fn delete_notable_person_event(
    &self,
    ctx: &Context<'_>,
    id: Uuid,
  ) -> async_graphql::Result<Uuid> {
    let viewer = auth::require_viewer(ctx).await?;
    owned_event(ctx, &viewer, id).await?;

    store(ctx)?.delete_event(id).await.gql()?;
    Ok(id)
  }

  async fn comment_on_notable_person_event(
    &self,
    ctx: &Context<'_>,
    event_id: Uuid,
    text: String,
  ) -> async_graphql::Result<CommentObject> {
    let viewer = auth::require_viewer(ctx).await?;

    let comment = store(ctx)?
      .add_comment(event_id, NewComment::new(viewer.id, text))
      .await
      .gql()?;
    Ok(CommentObject(comment))
  }
}

async fn owned_event(
  ctx: &Context<'_>,
  viewer: &User,
  id: Uuid,
) -> async_graphql::Result<NotablePersonEvent> {
  let event = store(ctx)?
    .get_event(id)
    .await
    .gql()?
    .ok_or_else(|| ApiError::NotFound(format!("event {id}")))
    .gql()?;
  if event.owner_id != viewer.id {
    return Err(ApiError::Forbidden("event").extend());
  }
  Ok(event)
}
