//! SQLite persistence layer for the Hollowverse API.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated
//! thread without blocking the async runtime. Every write goes through the
//! sanitize-then-validate hooks from [`hollowverse_core::validation`].

mod encode;
mod schema;
mod store;

pub mod config;
pub mod error;

pub use config::DatabaseConfig;
pub use error::{Error, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
