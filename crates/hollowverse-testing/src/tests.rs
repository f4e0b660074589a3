//! End-to-end tests through a real listener.

use std::sync::Arc;

use async_trait::async_trait;
use hollowverse_core::{
  auth::{AuthProvider, ProfileDetails},
  notable_person::NewNotablePerson,
  user::{NewUser, User},
};
use hollowverse_store_sqlite::{DatabaseConfig, SqliteStore};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde_json::{Value, json};
use uuid::Uuid;

use crate::{
  ApiOverrides, ClientOptions, FakeAuthProvider, TestContextOptions, create_test_context,
};

/// Signs in exactly one user, with the token `"secret"`.
struct SingleUser(User);

#[async_trait]
impl AuthProvider for SingleUser {
  async fn find_user_by_token(&self, token: &str) -> hollowverse_core::Result<Option<User>> {
    Ok((token == "secret").then(|| self.0.clone()))
  }

  async fn get_profile_details_by_token(
    &self,
    _token: &str,
  ) -> hollowverse_core::Result<ProfileDetails> {
    Ok(ProfileDetails { id: self.0.oauth_id.clone(), name: self.0.name.clone() })
  }

  async fn get_photo_url_by_user_id(&self, _id: &str) -> hollowverse_core::Result<Option<String>> {
    Ok(None)
  }
}

async fn seeded_store() -> (SqliteStore, User, Uuid) {
  let store = SqliteStore::open_in_memory().await.unwrap();
  let user = store.insert_user(NewUser::new("oauth-ada", "Ada")).await.unwrap();
  let person = store
    .insert_notable_person(NewNotablePerson::new("Tom Hanks", "tom-hanks"))
    .await
    .unwrap();
  (store, user, person.id)
}

// ─── Lifecycle ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn default_context_is_reachable_on_localhost() {
  let ctx = create_test_context(TestContextOptions::default()).await.unwrap();
  assert_eq!(ctx.endpoint, format!("http://localhost:{}/graphql", ctx.addr.port()));

  let data: Value = ctx.client.request("{ viewer { id } }", json!({})).await.unwrap();
  assert_eq!(data["viewer"], Value::Null);

  ctx.teardown().await.unwrap();
}

#[tokio::test]
async fn teardown_closes_listener_and_drops_schema() {
  let path = std::env::temp_dir()
    .join(format!("hollowverse-teardown-{}.sqlite3", Uuid::new_v4().simple()));
  let options = TestContextOptions {
    database: Some(DatabaseConfig::throwaway(&path)),
    ..Default::default()
  };
  let ctx = create_test_context(options).await.unwrap();
  assert!(ctx.owned_database_file().is_none());
  let addr = ctx.addr;
  assert!(!ctx.store.table_names().await.unwrap().is_empty());

  ctx.teardown().await.unwrap();

  assert!(tokio::net::TcpStream::connect(addr).await.is_err());

  let config = DatabaseConfig { synchronize: false, ..DatabaseConfig::new(&path) };
  let reopened = SqliteStore::connect(&config).await.unwrap();
  assert!(reopened.table_names().await.unwrap().is_empty());
  reopened.close().await.unwrap();
  std::fs::remove_file(&path).unwrap();
}

#[tokio::test]
async fn generated_database_file_is_removed() {
  let ctx = create_test_context(TestContextOptions::default()).await.unwrap();
  let path = ctx.owned_database_file().unwrap().to_owned();
  assert!(path.exists());
  assert!(
    path
      .file_name()
      .unwrap()
      .to_string_lossy()
      .starts_with("hollowverse-api-test-db-")
  );

  ctx.teardown().await.unwrap();
  assert!(!path.exists());
}

#[tokio::test]
async fn supplied_store_is_reused() {
  let (store, _, _) = seeded_store().await;
  let options = TestContextOptions {
    api: ApiOverrides { store: Some(store.clone()), ..Default::default() },
    ..Default::default()
  };
  let ctx = create_test_context(options).await.unwrap();

  let data: Value = ctx
    .client
    .request("{ notablePerson(slug: \"tom-hanks\") { name } }", json!({}))
    .await
    .unwrap();
  assert_eq!(data["notablePerson"]["name"], "Tom Hanks");

  ctx.teardown().await.unwrap();
  assert!(store.find_notable_person_by_slug("tom-hanks").await.is_err());
}

// ─── Fake provider ───────────────────────────────────────────────────────────

#[tokio::test]
async fn fake_provider_finds_nobody() {
  let ctx = create_test_context(TestContextOptions::default()).await.unwrap();
  for token in ["", "secret", "some-long-opaque-token"] {
    assert!(ctx.auth_provider.find_user_by_token(token).await.unwrap().is_none());
  }

  let client = ctx.client.with_bearer_token("whatever").unwrap();
  let data: Value = client.request("{ viewer { id } }", json!({})).await.unwrap();
  assert_eq!(data["viewer"], Value::Null);

  ctx.teardown().await.unwrap();
}

#[tokio::test]
async fn create_user_with_fake_profile() {
  let ctx = create_test_context(TestContextOptions::default()).await.unwrap();
  let client = ctx.client.with_bearer_token("new-user").unwrap();

  let data: Value = client
    .request(
      "mutation { createUser(email: \"new@example.com\") { id name photoUrl } }",
      json!({}),
    )
    .await
    .unwrap();
  let created = &data["createUser"];
  assert!(!created["name"].as_str().unwrap().is_empty());
  assert!(created["photoUrl"].as_str().unwrap().starts_with("https://photos.example.com/fake-"));

  let id: Uuid = created["id"].as_str().unwrap().parse().unwrap();
  let stored = ctx.store.get_user(id).await.unwrap().unwrap();
  assert!(stored.oauth_id.starts_with("fake-"));
  assert_eq!(stored.email.as_deref(), Some("new@example.com"));

  ctx.teardown().await.unwrap();
}

// ─── Overrides ───────────────────────────────────────────────────────────────

const CREATE_EVENT: &str = "
  mutation Create($input: CreateNotablePersonEventInput!) {
    createNotablePersonEvent(input: $input) { quote sourceUrl owner { name } }
  }";

#[tokio::test]
async fn custom_provider_and_client_headers() {
  let (store, user, person_id) = seeded_store().await;
  let mut headers = HeaderMap::new();
  headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer secret"));

  let options = TestContextOptions {
    api:    ApiOverrides {
      store:         Some(store),
      auth_provider: Some(Arc::new(SingleUser(user))),
    },
    client: ClientOptions { headers, timeout: Some(std::time::Duration::from_secs(10)) },
    ..Default::default()
  };
  let ctx = create_test_context(options).await.unwrap();

  let data: Value = ctx.client.request("{ viewer { name } }", json!({})).await.unwrap();
  assert_eq!(data["viewer"]["name"], "Ada");

  let input = json!({
    "input": {
      "notablePersonId": person_id,
      "quote": "  Run, Forrest, run!  ",
      "isQuoteByNotablePerson": false,
      "sourceUrl": "https://example.com/forrest",
    }
  });
  let data: Value = ctx.client.request(CREATE_EVENT, input).await.unwrap();
  assert_eq!(data["createNotablePersonEvent"]["quote"], "Run, Forrest, run!");
  assert_eq!(data["createNotablePersonEvent"]["owner"]["name"], "Ada");

  ctx.teardown().await.unwrap();
}

#[tokio::test]
async fn validation_errors_reach_the_client() {
  let (store, user, person_id) = seeded_store().await;
  let options = TestContextOptions {
    api: ApiOverrides {
      store:         Some(store),
      auth_provider: Some(Arc::new(SingleUser(user))),
    },
    ..Default::default()
  };
  let ctx = create_test_context(options).await.unwrap();
  let client = ctx.client.with_bearer_token("secret").unwrap();

  let input = json!({
    "input": {
      "notablePersonId": person_id,
      "quote": "fine",
      "isQuoteByNotablePerson": true,
      "sourceUrl": "not a url",
    }
  });
  let err = client.request::<Value>(CREATE_EVENT, input).await.unwrap_err();
  assert_eq!(err.code(), Some("VALIDATION_FAILED"));

  let data: Value = client
    .request("{ notablePerson(slug: \"tom-hanks\") { events { id } } }", json!({}))
    .await
    .unwrap();
  assert_eq!(data["notablePerson"]["events"], json!([]));

  ctx.teardown().await.unwrap();
}

#[tokio::test]
async fn default_provider_is_fake() {
  let ctx = create_test_context(TestContextOptions::default()).await.unwrap();
  let profile = ctx.auth_provider.get_profile_details_by_token("t").await.unwrap();
  let expected = FakeAuthProvider.get_photo_url_by_user_id(&profile.id).await.unwrap();
  assert_eq!(
    ctx.auth_provider.get_photo_url_by_user_id(&profile.id).await.unwrap(),
    expected
  );
  ctx.teardown().await.unwrap();
}
