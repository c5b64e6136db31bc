//! The in-memory mirror of the bookmark relation.
//!
//! The store holds the current snapshot plus the identity the data belongs
//! to, and owns the subscription hub. Every mutation follows a strict order:
//!
//! 1. Derive and swap in the new snapshot under the write lock
//! 2. Fan the snapshot out to subscribers, exactly once
//!
//! A commit lock serializes the whole sequence, so concurrent mutations on
//! distinct items never derive from the same base snapshot and subscribers
//! observe snapshots in commit order. Callbacks run after the state lock is
//! released, so they may read the store freely.
//!
//! Mutators are crate-private: all mutation is mediated by the sync engine,
//! the store's one writer. Consumers get the read-only surface.

use std::sync::{Mutex, RwLock};

use crate::hub::{Subscription, SubscriptionHub};
use crate::snapshot::BookmarkSnapshot;
use crate::types::{OwnerId, RecipeId, RelationEntry};

struct StoreState {
    snapshot: BookmarkSnapshot,
    /// The identity (`Some(owner)` or `Some(None)` for "logged out") whose
    /// data the snapshot holds, or `None` before the first load completes.
    loaded_for: Option<Option<OwnerId>>,
}

/// The process-wide bookmark mirror, one instance per active session.
///
/// Constructed empty; replaced wholesale on identity change; mutated in place
/// by the sync engine within one identity.
pub struct BookmarkStore {
    state: RwLock<StoreState>,
    hub: SubscriptionHub,
    /// Serializes commit-then-fan-out sequences and initial deliveries.
    commit_lock: Mutex<()>,
}

impl BookmarkStore {
    /// Creates an empty store with no subscribers.
    pub fn new() -> Self {
        Self {
            state: RwLock::new(StoreState {
                snapshot: BookmarkSnapshot::empty(),
                loaded_for: None,
            }),
            hub: SubscriptionHub::new(),
            commit_lock: Mutex::new(()),
        }
    }

    /// Returns the current snapshot. Never fails.
    pub fn snapshot(&self) -> BookmarkSnapshot {
        self.state.read().expect("lock poisoned").snapshot.clone()
    }

    /// The identity whose data the snapshot currently holds, if any.
    pub fn loaded_for(&self) -> Option<Option<OwnerId>> {
        self.state.read().expect("lock poisoned").loaded_for.clone()
    }

    /// Registers a subscriber; it observes the current snapshot immediately
    /// and every mutation afterwards.
    pub fn subscribe(
        &self,
        callback: impl Fn(&BookmarkSnapshot) + Send + Sync + 'static,
    ) -> Subscription {
        // Taken so the initial delivery cannot interleave with a concurrent
        // commit and hand the subscriber an already-superseded snapshot.
        let _ordering = self.commit_lock.lock().expect("lock poisoned");
        let current = self.state.read().expect("lock poisoned").snapshot.clone();
        self.hub.subscribe(&current, callback)
    }

    /// Returns the count of registered subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.hub.subscriber_count()
    }

    /// Replaces the whole relation with freshly loaded entries.
    ///
    /// Recomputes membership, clears the loading flag, records which identity
    /// the data belongs to, and notifies subscribers exactly once.
    pub(crate) fn replace(&self, owner: Option<OwnerId>, entries: Vec<RelationEntry>) {
        self.commit(|state| {
            state.loaded_for = Some(owner);
            Some(BookmarkSnapshot::from_entries(entries, false))
        });
    }

    /// Marks the initial load for an owner as in flight and notifies.
    pub(crate) fn begin_loading(&self) {
        self.commit(|state| {
            Some(BookmarkSnapshot::from_entries(
                state.snapshot.entries().to_vec(),
                true,
            ))
        });
    }

    /// Optimistically adds a synthetic entry for `item`, newest first.
    ///
    /// No-op if the item is already present (membership stays deduplicated).
    pub(crate) fn insert_optimistic(&self, item: &RecipeId, owner: &OwnerId) {
        self.commit(|state| {
            if state.snapshot.contains(item) {
                return None;
            }
            let mut entries = Vec::with_capacity(state.snapshot.len() + 1);
            entries.push(RelationEntry::synthetic(item.clone(), owner.clone()));
            entries.extend_from_slice(state.snapshot.entries());
            Some(BookmarkSnapshot::from_entries(
                entries,
                state.snapshot.is_loading(),
            ))
        });
    }

    /// Restores a previously removed entry at its newest-first position.
    ///
    /// Used by the revert and correction paths of a toggle. No-op if an entry
    /// for the same item is already present.
    pub(crate) fn restore(&self, entry: RelationEntry) {
        self.commit(|state| {
            if state.snapshot.contains(&entry.item_id) {
                return None;
            }
            let mut entries = Vec::with_capacity(state.snapshot.len() + 1);
            entries.push(entry);
            entries.extend_from_slice(state.snapshot.entries());
            entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Some(BookmarkSnapshot::from_entries(
                entries,
                state.snapshot.is_loading(),
            ))
        });
    }

    /// Removes the entry for `item`, returning it for a possible revert.
    ///
    /// Returns `None` (and notifies nobody) if the item was not present.
    pub(crate) fn remove_item(&self, item: &RecipeId) -> Option<RelationEntry> {
        let mut removed = None;
        self.commit(|state| {
            let entry = state
                .snapshot
                .entries()
                .iter()
                .find(|e| &e.item_id == item)
                .cloned()?;
            let entries: Vec<RelationEntry> = state
                .snapshot
                .entries()
                .iter()
                .filter(|e| &e.item_id != item)
                .cloned()
                .collect();
            removed = Some(entry);
            Some(BookmarkSnapshot::from_entries(
                entries,
                state.snapshot.is_loading(),
            ))
        });
        removed
    }

    /// Runs one mutation: derive under the write lock, swap, fan out once.
    ///
    /// The mutate closure sees the current state and returns the snapshot to
    /// commit, or `None` for a no-op (nobody is notified). The commit lock is
    /// held across the fan-out so snapshots reach subscribers in commit
    /// order; the state lock is not, so callbacks may read the store.
    fn commit<F>(&self, mutate: F)
    where
        F: FnOnce(&mut StoreState) -> Option<BookmarkSnapshot>,
    {
        let _ordering = self.commit_lock.lock().expect("lock poisoned");
        let snapshot = {
            let mut state = self.state.write().expect("lock poisoned");
            match mutate(&mut state) {
                Some(snapshot) => {
                    state.snapshot = snapshot.clone();
                    snapshot
                }
                None => return,
            }
        };
        self.hub.fan_out(&snapshot);
    }
}

impl Default for BookmarkStore {
    fn default() -> Self {
        Self::new()
    }
}
