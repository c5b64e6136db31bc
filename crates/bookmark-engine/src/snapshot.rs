//! Snapshot views of the bookmark relation.
//!
//! Snapshots are immutable at a point in time and cheap to clone (the entry
//! list and membership set live behind `Arc`s). Subscribers only ever see
//! snapshots, never the store's interior, so a reader can never observe a
//! membership set that disagrees with the entry list.

use std::collections::HashSet;
use std::sync::Arc;

use crate::types::{RecipeId, RelationEntry};

/// An immutable view of the bookmark relation for the current owner.
#[derive(Clone, Debug)]
pub struct BookmarkSnapshot {
    entries: Arc<Vec<RelationEntry>>,
    membership: Arc<HashSet<RecipeId>>,
    is_loading: bool,
}

impl BookmarkSnapshot {
    /// Creates an empty, non-loading snapshot.
    pub fn empty() -> Self {
        Self {
            entries: Arc::new(Vec::new()),
            membership: Arc::new(HashSet::new()),
            is_loading: false,
        }
    }

    /// Creates a snapshot from an entry list, deriving the membership set.
    ///
    /// Entries are expected newest first; the membership set deduplicates any
    /// repeated `item_id`s rather than rejecting them.
    pub fn from_entries(entries: Vec<RelationEntry>, is_loading: bool) -> Self {
        let membership = entries.iter().map(|e| e.item_id.clone()).collect();
        Self {
            entries: Arc::new(entries),
            membership: Arc::new(membership),
            is_loading,
        }
    }

    /// Returns a slice of the entries, newest first.
    pub fn entries(&self) -> &[RelationEntry] {
        &self.entries
    }

    /// Checks whether a recipe is bookmarked in this snapshot.
    pub fn contains(&self, item: &RecipeId) -> bool {
        self.membership.contains(item)
    }

    /// Returns the derived membership set.
    pub fn membership(&self) -> &HashSet<RecipeId> {
        &self.membership
    }

    /// True exactly while the initial load for the current owner is in flight.
    ///
    /// Never true during a toggle.
    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// Returns the number of bookmarked entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Checks if the snapshot holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
