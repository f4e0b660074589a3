//! SQL schema for the Hollowverse SQLite store.
//!
//! [`SCHEMA`] is idempotent and runs when a store is opened with
//! `synchronize`. [`DROP_SCHEMA`] removes every table, children first.

/// Connection-level settings, applied on every open.
pub const PRAGMAS: &str = "
PRAGMA foreign_keys = ON;
";

pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS users (
    id           TEXT PRIMARY KEY,
    oauth_id     TEXT NOT NULL UNIQUE,
    name         TEXT NOT NULL,
    email        TEXT,
    photo_url    TEXT,
    signed_up_at TEXT NOT NULL      -- RFC 3339 UTC
);

CREATE TABLE IF NOT EXISTS notable_people (
    id        TEXT PRIMARY KEY,
    name      TEXT NOT NULL,
    slug      TEXT NOT NULL UNIQUE,
    photo_url TEXT
);

CREATE TABLE IF NOT EXISTS notable_person_events (
    id                         TEXT PRIMARY KEY,
    quote                      TEXT NOT NULL,
    is_quote_by_notable_person INTEGER NOT NULL,
    source_url                 TEXT NOT NULL,
    posted_at                  TEXT NOT NULL,   -- RFC 3339 UTC
    happened_on                TEXT,            -- YYYY-MM-DD or NULL
    notable_person_id          TEXT NOT NULL REFERENCES notable_people(id),
    owner_id                   TEXT NOT NULL REFERENCES users(id)
);

CREATE TABLE IF NOT EXISTS notable_person_event_comments (
    id         TEXT PRIMARY KEY,
    text       TEXT NOT NULL,
    created_at TEXT NOT NULL,
    event_id   TEXT NOT NULL
               REFERENCES notable_person_events(id) ON DELETE CASCADE,
    owner_id   TEXT NOT NULL REFERENCES users(id)
);

CREATE INDEX IF NOT EXISTS events_notable_person_idx
    ON notable_person_events(notable_person_id);
CREATE INDEX IF NOT EXISTS events_owner_idx
    ON notable_person_events(owner_id);
CREATE INDEX IF NOT EXISTS comments_event_idx
    ON notable_person_event_comments(event_id);

PRAGMA user_version = 1;
";

pub const DROP_SCHEMA: &str = "
DROP TABLE IF EXISTS notable_person_event_comments;
DROP TABLE IF EXISTS notable_person_events;
DROP TABLE IF EXISTS notable_people;
DROP TABLE IF EXISTS users;

PRAGMA user_version = 0;
";
