//! Minimal GraphQL-over-HTTP client.

use std::time::Duration;

use reqwest::{
  Client, StatusCode,
  header::{AUTHORIZATION, HeaderMap, HeaderValue, InvalidHeaderValue},
};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::{Value, json};
use thiserror::Error;

/// Per-client request settings.
#[derive(Debug, Clone, Default)]
pub struct ClientOptions {
  /// Sent with every request.
  pub headers: HeaderMap,
  pub timeout: Option<Duration>,
}

#[derive(Debug, Error)]
pub enum ClientError {
  #[error("HTTP request failed: {0}")]
  Http(#[from] reqwest::Error),

  #[error("invalid header value: {0}")]
  Header(#[from] InvalidHeaderValue),

  #[error("server answered {0}: {1}")]
  Status(StatusCode, String),

  #[error("GraphQL errors: {}", join(.0))]
  GraphQL(Vec<GraphQLError>),

  #[error("response carried no data")]
  MissingData,

  #[error("deserialising response data: {0}")]
  Decode(#[from] serde_json::Error),
}

impl ClientError {
  /// `extensions.code` of the first GraphQL error, if any.
  pub fn code(&self) -> Option<&str> {
    match self {
      Self::GraphQL(errors) => errors.first().and_then(GraphQLError::code),
      _ => None,
    }
  }
}

fn join(errors: &[GraphQLError]) -> String {
  errors.iter().map(|e| e.message.as_str()).collect::<Vec<_>>().join("; ")
}

/// One entry of a response's `errors` array.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphQLError {
  pub message:    String,
  #[serde(default)]
  pub path:       Option<Value>,
  #[serde(default)]
  pub extensions: Option<Value>,
}

impl GraphQLError {
  pub fn code(&self) -> Option<&str> {
    self.extensions.as_ref()?.get("code")?.as_str()
  }
}

/// A decoded response body.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphQLResponse {
  #[serde(default)]
  pub data:   Option<Value>,
  #[serde(default)]
  pub errors: Vec<GraphQLError>,
}

/// Posts GraphQL operations to a single endpoint.
///
/// Cheap to clone, the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Debug, Clone)]
pub struct GraphQLClient {
  client:   Client,
  endpoint: String,
  headers:  HeaderMap,
}

impl GraphQLClient {
  pub fn new(endpoint: impl Into<String>, options: ClientOptions) -> Result<Self, ClientError> {
    let mut builder = Client::builder();
    if let Some(timeout) = options.timeout {
      builder = builder.timeout(timeout);
    }
    Ok(Self {
      client:   builder.build()?,
      endpoint: endpoint.into(),
      headers:  options.headers,
    })
  }

  pub fn endpoint(&self) -> &str { &self.endpoint }

  /// A copy of this client that sends `Authorization: Bearer <token>`.
  pub fn with_bearer_token(&self, token: &str) -> Result<Self, ClientError> {
    let mut client = self.clone();
    client
      .headers
      .insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {token}"))?);
    Ok(client)
  }

  /// Post an operation and return the decoded body, errors included.
  pub async fn raw_request(
    &self,
    query: &str,
    variables: Value,
  ) -> Result<GraphQLResponse, ClientError> {
    let resp = self
      .client
      .post(&self.endpoint)
      .headers(self.headers.clone())
      .json(&json!({ "query": query, "variables": variables }))
      .send()
      .await?;

    let status = resp.status();
    if !status.is_success() {
      return Err(ClientError::Status(status, resp.text().await.unwrap_or_default()));
    }
    Ok(resp.json().await?)
  }

  /// Post an operation and deserialise its `data`. Any GraphQL error fails
  /// the whole request.
  pub async fn request<T: DeserializeOwned>(
    &self,
    query: &str,
    variables: Value,
  ) -> Result<T, ClientError> {
    let body = self.raw_request(query, variables).await?;
    if !body.errors.is_empty() {
      return Err(ClientError::GraphQL(body.errors));
    }
    let data = body.data.ok_or(ClientError::MissingData)?;
    Ok(serde_json::from_value(data)?)
  }
}
