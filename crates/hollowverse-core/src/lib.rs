//! Core types for the Hollowverse API.
//!
//! Entities, the sanitize-then-validate write hooks, and the authentication
//! provider capability trait. This crate has no HTTP or database
//! dependencies; the store and API crates build on it.

pub mod auth;
pub mod comment;
pub mod error;
pub mod event;
pub mod notable_person;
pub mod user;
pub mod validation;

pub use error::{Error, Result};
