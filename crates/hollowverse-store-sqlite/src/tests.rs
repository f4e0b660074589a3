//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::{NaiveDate, TimeZone, Utc};
use hollowverse_core::{
  comment::NewComment,
  event::{EventPatch, NewNotablePersonEvent},
  notable_person::{NewNotablePerson, NotablePerson},
  user::{NewUser, User},
};
use uuid::Uuid;

use crate::{DatabaseConfig, Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

async fn seed(s: &SqliteStore) -> (NotablePerson, User) {
  let person = s
    .insert_notable_person(NewNotablePerson::new("Tom Hanks", "tom-hanks"))
    .await
    .unwrap();
  let user = s.insert_user(NewUser::new("fb-1234", "Alice")).await.unwrap();
  (person, user)
}

fn new_event(person: &NotablePerson, owner: &User, quote: &str, url: &str) -> NewNotablePersonEvent {
  NewNotablePersonEvent {
    quote:                      quote.into(),
    is_quote_by_notable_person: true,
    source_url:                 url.into(),
    posted_at:                  Utc.with_ymd_and_hms(2018, 3, 1, 12, 0, 0).unwrap(),
    happened_on:                NaiveDate::from_ymd_opt(2018, 2, 27),
    notable_person_id:          person.id,
    owner_id:                   owner.id,
    comments:                   Vec::new(),
  }
}

// ─── Schema lifecycle ────────────────────────────────────────────────────────

#[tokio::test]
async fn synchronize_creates_all_tables() {
  let s = store().await;
  assert_eq!(
    s.table_names().await.unwrap(),
    [
      "notable_people",
      "notable_person_event_comments",
      "notable_person_events",
      "users",
    ]
  );
}

#[tokio::test]
async fn drop_database_removes_every_table() {
  let s = store().await;
  seed(&s).await;
  s.drop_database().await.unwrap();
  assert!(s.table_names().await.unwrap().is_empty());
}

#[tokio::test]
async fn unsynchronized_connection_has_no_tables() {
  let config = DatabaseConfig { synchronize: false, ..DatabaseConfig::in_memory() };
  let s = SqliteStore::connect(&config).await.unwrap();
  assert!(s.table_names().await.unwrap().is_empty());
}

#[tokio::test]
async fn closed_store_rejects_further_calls() {
  let s = store().await;
  let clone = s.clone();
  s.close().await.unwrap();
  assert!(matches!(clone.get_user(Uuid::new_v4()).await, Err(Error::Database(_))));
}

// ─── Users and notable people ────────────────────────────────────────────────

#[tokio::test]
async fn insert_user_trims_and_reads_back() {
  let s = store().await;
  let mut input = NewUser::new("  fb-99 ", "  Bob ");
  input.email = Some(" bob@example.com ".into());

  let user = s.insert_user(input).await.unwrap();
  assert_eq!(user.oauth_id, "fb-99");
  assert_eq!(user.name, "Bob");
  assert_eq!(user.email.as_deref(), Some("bob@example.com"));

  let fetched = s.find_user_by_oauth_id("fb-99").await.unwrap().unwrap();
  assert_eq!(fetched, user);
}

#[tokio::test]
async fn insert_user_rejects_bad_email() {
  let s = store().await;
  let mut input = NewUser::new("fb-1", "Bob");
  input.email = Some("not-an-email".into());
  let err = s.insert_user(input).await.unwrap_err();
  assert!(matches!(err, Error::Validation(ref v) if v.has("email")));
}

#[tokio::test]
async fn concurrent_sign_ups_conflict() {
  let s = store().await;
  let (a, b) = tokio::join!(
    s.insert_user(NewUser::new("fb-race", "First")),
    s.insert_user(NewUser::new("fb-race", "Second")),
  );
  let results = [a, b];
  assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
  assert!(results.iter().any(|r| matches!(r, Err(Error::Conflict(_)))));
}

#[tokio::test]
async fn duplicate_slug_is_a_conflict() {
  let s = store().await;
  seed(&s).await;
  let err = s
    .insert_notable_person(NewNotablePerson::new("Another", " tom-hanks "))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Conflict(_)));
}

#[tokio::test]
async fn find_notable_person_by_slug() {
  let s = store().await;
  let (person, _) = seed(&s).await;
  let found = s.find_notable_person_by_slug("tom-hanks").await.unwrap();
  assert_eq!(found, Some(person.clone()));
  assert_eq!(s.get_notable_person(person.id).await.unwrap(), Some(person));
  assert!(s.find_notable_person_by_slug("nobody").await.unwrap().is_none());
}

// ─── Event inserts ───────────────────────────────────────────────────────────

#[tokio::test]
async fn insert_event_stores_trimmed_strings() {
  let s = store().await;
  let (person, owner) = seed(&s).await;

  let event = s
    .insert_event(new_event(
      &person,
      &owner,
      "   Life is like a box of chocolates.  ",
      " https://example.com/forrest\n",
    ))
    .await
    .unwrap();

  assert_eq!(event.quote, "Life is like a box of chocolates.");
  assert_eq!(event.source_url, "https://example.com/forrest");

  let fetched = s.get_event(event.id).await.unwrap().unwrap();
  assert_eq!(fetched, event);
  assert_eq!(fetched.happened_on, NaiveDate::from_ymd_opt(2018, 2, 27));
}

#[tokio::test]
async fn insert_event_rejects_blank_quote() {
  let s = store().await;
  let (person, owner) = seed(&s).await;

  for quote in ["", "   ", "\n\t"] {
    let err = s
      .insert_event(new_event(&person, &owner, quote, "https://example.com"))
      .await
      .unwrap_err();
    assert!(matches!(err, Error::Validation(ref v) if v.has("quote")), "{quote:?}");
  }
  assert!(s.list_events(person.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn insert_event_rejects_url_without_web_scheme() {
  let s = store().await;
  let (person, owner) = seed(&s).await;

  for url in ["example.com", "ftp://example.com/file", "javascript:alert(1)", "   "] {
    let err = s
      .insert_event(new_event(&person, &owner, "quote", url))
      .await
      .unwrap_err();
    assert!(matches!(err, Error::Validation(ref v) if v.has("sourceUrl")), "{url:?}");
  }
}

#[tokio::test]
async fn insert_event_requires_existing_relations() {
  let s = store().await;
  let (person, owner) = seed(&s).await;

  let mut input = new_event(&person, &owner, "quote", "https://example.com");
  input.notable_person_id = Uuid::new_v4();
  assert!(matches!(
    s.insert_event(input).await,
    Err(Error::NotablePersonNotFound(_))
  ));

  let mut input = new_event(&person, &owner, "quote", "https://example.com");
  input.owner_id = Uuid::new_v4();
  assert!(matches!(s.insert_event(input).await, Err(Error::UserNotFound(_))));
}

#[tokio::test]
async fn insert_event_cascades_comments() {
  let s = store().await;
  let (person, owner) = seed(&s).await;

  let mut input = new_event(&person, &owner, "quote", "https://example.com");
  input.comments = vec![
    NewComment::new(owner.id, "  first  "),
    NewComment::new(owner.id, "second"),
  ];
  let event = s.insert_event(input).await.unwrap();

  let comments = s.list_comments(event.id).await.unwrap();
  let texts: Vec<_> = comments.iter().map(|c| c.text.as_str()).collect();
  assert_eq!(texts, ["first", "second"]);
  assert!(comments.iter().all(|c| c.event_id == event.id));
}

#[tokio::test]
async fn cascaded_comments_keep_their_order() {
  let s = store().await;
  let (person, owner) = seed(&s).await;

  let mut input = new_event(&person, &owner, "quote", "https://example.com");
  input.comments = (0..20).map(|i| NewComment::new(owner.id, format!("comment {i}"))).collect();
  let event = s.insert_event(input).await.unwrap();
  s.add_comment(event.id, NewComment::new(owner.id, "later")).await.unwrap();

  let texts: Vec<_> = s
    .list_comments(event.id)
    .await
    .unwrap()
    .into_iter()
    .map(|c| c.text)
    .collect();
  let mut expected: Vec<_> = (0..20).map(|i| format!("comment {i}")).collect();
  expected.push("later".into());
  assert_eq!(texts, expected);
}

#[tokio::test]
async fn invalid_cascaded_comment_aborts_whole_insert() {
  let s = store().await;
  let (person, owner) = seed(&s).await;

  let mut input = new_event(&person, &owner, "quote", "https://example.com");
  input.comments = vec![NewComment::new(owner.id, "fine"), NewComment::new(owner.id, "  ")];

  let err = s.insert_event(input).await.unwrap_err();
  assert!(matches!(err, Error::Validation(ref v) if v.has("comments.1.text")));
  assert!(s.list_events(person.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn list_events_newest_first() {
  let s = store().await;
  let (person, owner) = seed(&s).await;

  let mut older = new_event(&person, &owner, "older", "https://example.com/1");
  older.posted_at = Utc.with_ymd_and_hms(2017, 1, 1, 0, 0, 0).unwrap();
  let mut newer = new_event(&person, &owner, "newer", "https://example.com/2");
  newer.posted_at = Utc.with_ymd_and_hms(2019, 1, 1, 0, 0, 0).unwrap();

  s.insert_event(older).await.unwrap();
  s.insert_event(newer).await.unwrap();

  let quotes: Vec<_> = s
    .list_events(person.id)
    .await
    .unwrap()
    .into_iter()
    .map(|e| e.quote)
    .collect();
  assert_eq!(quotes, ["newer", "older"]);
}

// ─── Event updates ───────────────────────────────────────────────────────────

#[tokio::test]
async fn partial_update_skips_absent_fields() {
  let s = store().await;
  let (person, owner) = seed(&s).await;
  let event = s
    .insert_event(new_event(&person, &owner, "quote", "https://example.com"))
    .await
    .unwrap();

  let patch = EventPatch { is_quote_by_notable_person: Some(false), ..Default::default() };
  let updated = s.update_event(event.id, patch).await.unwrap();
  assert!(!updated.is_quote_by_notable_person);
  assert_eq!(updated.quote, "quote");

  let patch = EventPatch { quote: Some("  edited  ".into()), ..Default::default() };
  let updated = s.update_event(event.id, patch).await.unwrap();
  assert_eq!(updated.quote, "edited");
  assert_eq!(s.get_event(event.id).await.unwrap().unwrap(), updated);
}

#[tokio::test]
async fn concurrent_patches_on_different_fields_both_land() {
  let s = store().await;
  let (person, owner) = seed(&s).await;
  let event = s
    .insert_event(new_event(&person, &owner, "quote", "https://example.com"))
    .await
    .unwrap();

  let edit_quote = EventPatch { quote: Some("edited quote".into()), ..Default::default() };
  let edit_url = EventPatch {
    source_url: Some("https://example.org/new".into()),
    ..Default::default()
  };
  let (quote, url) = tokio::join!(
    s.update_event(event.id, edit_quote),
    s.update_event(event.id, edit_url),
  );
  quote.unwrap();
  url.unwrap();

  let stored = s.get_event(event.id).await.unwrap().unwrap();
  assert_eq!(stored.quote, "edited quote");
  assert_eq!(stored.source_url, "https://example.org/new");
}

#[tokio::test]
async fn patch_can_clear_happened_on() {
  let s = store().await;
  let (person, owner) = seed(&s).await;
  let event = s
    .insert_event(new_event(&person, &owner, "quote", "https://example.com"))
    .await
    .unwrap();

  let patch = EventPatch { happened_on: Some(None), ..Default::default() };
  let updated = s.update_event(event.id, patch).await.unwrap();
  assert_eq!(updated.happened_on, None);
  assert_eq!(updated.quote, "quote");
  assert_eq!(s.get_event(event.id).await.unwrap().unwrap().happened_on, None);
}

#[tokio::test]
async fn update_rejects_present_invalid_fields() {
  let s = store().await;
  let (person, owner) = seed(&s).await;
  let event = s
    .insert_event(new_event(&person, &owner, "quote", "https://example.com"))
    .await
    .unwrap();

  let patch = EventPatch { quote: Some(" ".into()), ..Default::default() };
  let err = s.update_event(event.id, patch).await.unwrap_err();
  assert!(matches!(err, Error::Validation(ref v) if v.has("quote") && !v.has("sourceUrl")));
  assert_eq!(s.get_event(event.id).await.unwrap().unwrap().quote, "quote");
}

#[tokio::test]
async fn update_missing_event_is_not_found() {
  let s = store().await;
  let err = s.update_event(Uuid::new_v4(), EventPatch::default()).await.unwrap_err();
  assert!(matches!(err, Error::EventNotFound(_)));
}

// ─── Comments and deletion ───────────────────────────────────────────────────

#[tokio::test]
async fn add_comment_requires_parent_event() {
  let s = store().await;
  let (_, owner) = seed(&s).await;
  let err = s
    .add_comment(Uuid::new_v4(), NewComment::new(owner.id, "orphan"))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::EventNotFound(_)));
}

#[tokio::test]
async fn delete_event_cascades_to_comments() {
  let s = store().await;
  let (person, owner) = seed(&s).await;
  let event = s
    .insert_event(new_event(&person, &owner, "quote", "https://example.com"))
    .await
    .unwrap();
  s.add_comment(event.id, NewComment::new(owner.id, "hello")).await.unwrap();

  s.delete_event(event.id).await.unwrap();

  assert!(s.get_event(event.id).await.unwrap().is_none());
  assert!(s.list_comments(event.id).await.unwrap().is_empty());
  assert!(matches!(s.delete_event(event.id).await, Err(Error::EventNotFound(_))));
}
