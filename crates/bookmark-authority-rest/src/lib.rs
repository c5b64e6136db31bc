//! REST authority adapter for the bookmark engine.
//!
//! Implements [`bookmark_engine::AuthorityClient`] against a PostgREST-style
//! backend table, translating the two-operation contract onto query, insert,
//! and delete requests with idempotency collapses for duplicate inserts and
//! empty deletes.

mod client;
mod config;

pub use client::RestAuthorityClient;
pub use config::{ConfigError, RestAuthorityConfig};
