//! Query root.

use async_graphql::{Context, Object};
use uuid::Uuid;

use crate::{
  auth,
  error::GqlResultExt as _,
  types::{EventObject, NotablePersonObject, UserObject, store},
};

pub struct QueryRoot;

#[Object]
impl QueryRoot {
  /// The signed-in user, or `null` for anonymous requests.
  async fn viewer(&self, ctx: &Context<'_>) -> async_graphql::Result<Option<UserObject>> {
    Ok(auth::viewer(ctx).await?.map(UserObject))
  }

  async fn notable_person(
    &self,
    ctx: &Context<'_>,
    slug: String,
  ) -> async_graphql::Result<Option<NotablePersonObject>> {
    let person = store(ctx)?.find_notable_person_by_slug(slug.trim()).await.gql()?;
    Ok(person.map(NotablePersonObject))
  }

  async fn notable_person_event(
    &self,
    ctx: &Context<'_>,
    id: Uuid,
  ) -> async_graphql::Result<Option<EventObject>> {
    let event = store(ctx)?.get_event(id).await.gql()?;
    Ok(event.map(EventObject))
  }
}
