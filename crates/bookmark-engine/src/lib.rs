//! # Bookmark Engine
//!
//! A client-resident mirror of the "recipe is bookmarked" relation that many
//! independent consumers read and mutate through one shared instance, kept
//! consistent with an authoritative backend despite latency and failure.
//!
//! ## Non-negotiable Principles
//!
//! - **The authority is the only source of truth** - the mirror is a cache,
//!   never a durable store
//! - **Exactly one writer** - only the sync engine mutates the store
//! - **Snapshots are immutable** - a subscriber never observes a membership
//!   set that disagrees with the entry list
//! - **Optimistic first** - toggles flip locally before the authority
//!   confirms, then reconcile against its returned state
//! - **No error escapes** - failed loads reset to empty, failed toggles
//!   revert; consumers see safe snapshots and honest booleans, never
//!   exceptions
//!
//! ## Architecture
//!
//! ```text
//! TOGGLE:
//!   flip store → fan-out → authority round-trip → reconcile → fan-out (if changed)
//!
//! LOAD:
//!   identity change → list from authority → replace store → fan-out
//!
//! FAILURE:
//!   revert / reset → fan-out → log
//! ```
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use bookmark_engine::{
//!     AuthorityClient, AuthorityError, NullNavigation, OwnerId, RecipeId,
//!     RelationEntry, SyncEngine,
//! };
//!
//! // An authority that accepts every requested state.
//! struct StaticAuthority;
//!
//! impl AuthorityClient for StaticAuthority {
//!     async fn list_relation(
//!         &self,
//!         _owner: &OwnerId,
//!     ) -> Result<Vec<RelationEntry>, AuthorityError> {
//!         Ok(Vec::new())
//!     }
//!
//!     async fn set_relation(
//!         &self,
//!         _item: &RecipeId,
//!         _owner: &OwnerId,
//!         present: bool,
//!     ) -> Result<bool, AuthorityError> {
//!         Ok(present)
//!     }
//! }
//!
//! let rt = tokio::runtime::Builder::new_current_thread()
//!     .enable_all()
//!     .build()
//!     .unwrap();
//! rt.block_on(async {
//!     let engine = SyncEngine::new(Arc::new(StaticAuthority), Arc::new(NullNavigation));
//!     engine.set_identity(Some(OwnerId::from("user-1"))).await;
//!
//!     let bookmarked = engine.toggle(&RecipeId::from("recipe-1")).await;
//!     assert!(bookmarked);
//!     assert!(engine.snapshot().contains(&RecipeId::from("recipe-1")));
//! });
//! ```
//!
//! ## Crate Structure
//!
//! - [`engine`] - The sync engine (load / refresh / toggle / reconciliation)
//! - [`store`] - The in-memory mirror, single-writer
//! - [`hub`] - Subscriber fan-out
//! - [`snapshot`] - Immutable snapshot views
//! - [`authority`] - Authority contract
//! - [`navigation`] - Redirect contract for unauthenticated mutations
//! - [`types`] - Core types

pub mod authority;
pub mod engine;
pub mod hub;
pub mod navigation;
pub mod snapshot;
pub mod store;
pub mod types;

#[cfg(test)]
mod tests;

pub use authority::{AuthorityClient, AuthorityError};
pub use engine::SyncEngine;
pub use hub::{Subscription, SubscriptionHub};
pub use navigation::{NavigationSink, NullNavigation, RecordingNavigation};
pub use snapshot::BookmarkSnapshot;
pub use store::BookmarkStore;
pub use types::{EntryId, OwnerId, RecipeId, RelationEntry};
