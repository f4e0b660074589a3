//! GraphQL API for Hollowverse.
//!
//! Exposes an axum [`Router`] serving an async-graphql schema backed by a
//! [`SqliteStore`] and a pluggable [`AuthProvider`]. The router answers at
//! its own root; callers mount it wherever they like.
//!
//! # Mounting
//!
//! ```rust,ignore
//! Router::new().nest("/graphql", hollowverse_api::api_router(options))
//! ```

pub mod auth;
pub mod error;
pub mod mutation;
pub mod query;
pub mod types;

use std::sync::Arc;

use async_graphql::{EmptySubscription, Schema, http::GraphiQLSource};
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::{
  Router,
  extract::State,
  http::HeaderMap,
  response::{Html, IntoResponse},
  routing::get,
};
use hollowverse_core::auth::AuthProvider;
use hollowverse_store_sqlite::SqliteStore;

pub use auth::AuthToken;
pub use error::ApiError;
pub use mutation::MutationRoot;
pub use query::QueryRoot;

/// The complete GraphQL schema.
pub type ApiSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

/// Everything the API needs to serve requests.
#[derive(Clone)]
pub struct ApiOptions {
  pub store:         SqliteStore,
  pub auth_provider: Arc<dyn AuthProvider>,
  /// Path the router is mounted at; used by the GraphiQL page.
  pub endpoint:      String,
}

impl ApiOptions {
  pub fn new(store: SqliteStore, auth_provider: Arc<dyn AuthProvider>) -> Self {
    Self { store, auth_provider, endpoint: "/graphql".into() }
  }
}

/// Build the schema with the store and auth provider injected as context
/// data.
pub fn build_schema(options: &ApiOptions) -> ApiSchema {
  Schema::build(QueryRoot, MutationRoot, EmptySubscription)
    .data(options.store.clone())
    .data(options.auth_provider.clone())
    .finish()
}

/// Build the API router: `POST /` executes operations, `GET /` serves
/// GraphiQL.
pub fn api_router(options: ApiOptions) -> Router<()> {
  let schema = build_schema(&options);
  let graphiql = GraphiQLSource::build().endpoint(&options.endpoint).finish();

  Router::new()
    .route(
      "/",
      get(move || async move { Html(graphiql) }).post(graphql_handler),
    )
    .with_state(schema)
}

/// Execute one GraphQL request, forwarding any bearer token as
/// [`AuthToken`] request data.
async fn graphql_handler(
  State(schema): State<ApiSchema>,
  headers: HeaderMap,
  req: GraphQLRequest,
) -> impl IntoResponse {
  let mut request = req.into_inner();
  if let Some(token) = auth::bearer_token(&headers) {
    request = request.data(token);
  }
  GraphQLResponse::from(schema.execute(request).await)
}
