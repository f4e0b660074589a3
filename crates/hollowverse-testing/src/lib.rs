//! Test harness for the Hollowverse API.
//!
//! [`create_test_context`] spins up the real HTTP application on a free
//! local port, backed by a throwaway SQLite database and a
//! [`FakeAuthProvider`], and hands back a [`GraphQLClient`] pointed at it.
//!
//! ```rust,ignore
//! let ctx = create_test_context(TestContextOptions::default()).await?;
//! let data: serde_json::Value = ctx.client.request("{ viewer { id } }", json!({})).await?;
//! ctx.teardown().await?;
//! ```

pub mod client;
pub mod context;
pub mod fake_auth;
pub mod settings;

pub use client::{ClientError, ClientOptions, GraphQLClient, GraphQLError, GraphQLResponse};
pub use context::{ApiOverrides, TestContext, TestContextOptions, create_test_context};
pub use fake_auth::FakeAuthProvider;
pub use settings::TestSettings;

#[cfg(test)]
mod tests;
