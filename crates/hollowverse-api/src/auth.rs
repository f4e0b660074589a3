//! Bearer-token plumbing between HTTP headers, the request context, and the
//! [`AuthProvider`].

use std::sync::Arc;

use async_graphql::Context;
use axum::http::{HeaderMap, header};
use hollowverse_core::{auth::AuthProvider, user::User};

use crate::error::{ApiError, GqlResultExt as _};

/// The raw bearer token of the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthToken(pub String);

/// Extract `Authorization: Bearer <token>`; anything else is ignored.
pub fn bearer_token(headers: &HeaderMap) -> Option<AuthToken> {
  let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
  let (scheme, token) = value.split_once(' ')?;
  let token = token.trim();
  if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
    return None;
  }
  Some(AuthToken(token.to_owned()))
}

pub(crate) fn provider<'a>(ctx: &Context<'a>) -> async_graphql::Result<&'a Arc<dyn AuthProvider>> {
  ctx.data::<Arc<dyn AuthProvider>>()
}

/// The token of the current request, or `UNAUTHENTICATED`.
pub(crate) fn require_token<'a>(ctx: &Context<'a>) -> async_graphql::Result<&'a str> {
  ctx
    .data_opt::<AuthToken>()
    .map(|t| t.0.as_str())
    .ok_or(ApiError::Unauthenticated)
    .gql()
}

/// Resolve the signed-in user, if any.
pub(crate) async fn viewer(ctx: &Context<'_>) -> async_graphql::Result<Option<User>> {
  let Some(AuthToken(token)) = ctx.data_opt::<AuthToken>() else {
    return Ok(None);
  };
  provider(ctx)?.find_user_by_token(token).await.gql()
}

/// Resolve the signed-in user, or `UNAUTHENTICATED`.
pub(crate) async fn require_viewer(ctx: &Context<'_>) -> async_graphql::Result<User> {
  viewer(ctx).await?.ok_or(ApiError::Unauthenticated).gql()
}
