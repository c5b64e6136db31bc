//! The authority contract.
//!
//! The authority is the durable, canonical store of the bookmark relation.
//! The engine consumes it through exactly two operations; adapters translate
//! them onto the actual backend's primitives.
//!
//! Both operations must resolve or fail, never hang; an `Err` is the only
//! failure signal. An adapter must never swallow a transport error into a
//! fabricated boolean.

use std::future::Future;

use crate::types::{OwnerId, RecipeId, RelationEntry};

/// Errors surfaced by an authority adapter.
#[derive(Debug, thiserror::Error)]
pub enum AuthorityError {
    /// The request never produced an authoritative answer (connection,
    /// timeout, decode).
    #[error("authority transport failure: {0}")]
    Transport(String),

    /// The authority answered with a non-success status.
    #[error("authority rejected request: {status} ({detail})")]
    Rejected { status: u16, detail: String },
}

/// The two-operation contract against the canonical bookmark relation.
pub trait AuthorityClient: Send + Sync {
    /// Returns the full, current entry list for an owner, newest first.
    ///
    /// An owner with no bookmarks yields an empty list, not an error.
    fn list_relation(
        &self,
        owner: &OwnerId,
    ) -> impl Future<Output = Result<Vec<RelationEntry>, AuthorityError>> + Send;

    /// Sets the presence of `(owner, item)` in the relation and returns the
    /// resulting authoritative state.
    ///
    /// Idempotent in both directions: creating an already-present entry
    /// returns `true` without duplicating it, deleting an absent entry
    /// returns `false`.
    fn set_relation(
        &self,
        item: &RecipeId,
        owner: &OwnerId,
        present: bool,
    ) -> impl Future<Output = Result<bool, AuthorityError>> + Send;
}
