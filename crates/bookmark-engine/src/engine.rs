//! The sync engine - the only writer of the bookmark store.
//!
//! The engine orchestrates three flows against the authority:
//!
//! - **Load**: one network round-trip per distinct identity, guarded so that
//!   N consumers mounting concurrently trigger exactly one call
//! - **Refresh**: the same path with the already-loaded guard bypassed
//! - **Toggle**: optimistic local flip, fan-out, authority round-trip,
//!   reconciliation against the authority's returned state
//!
//! # Cancellation
//!
//! There is no cancellation token. Every load captures the identity epoch at
//! dispatch; a result arriving after the epoch has advanced is discarded so a
//! stale load can never overwrite a newer identity's snapshot.
//!
//! # Concurrency
//!
//! Toggles on distinct items interleave freely; each store mutation is
//! atomic with respect to observation. Rapid back-to-back toggles on the
//! *same* item are intentionally not serialized - each captures the presence
//! bit from whatever snapshot is current at call time, favoring
//! responsiveness over strict last-intent-wins semantics.

use std::sync::{Arc, Mutex};

use crate::authority::AuthorityClient;
use crate::hub::Subscription;
use crate::navigation::NavigationSink;
use crate::snapshot::BookmarkSnapshot;
use crate::store::BookmarkStore;
use crate::types::{OwnerId, RecipeId};

struct IdentityState {
    owner: Option<OwnerId>,
    /// Bumped on every identity change; loads resolved under an older epoch
    /// are discarded.
    epoch: u64,
    /// Owner whose load is currently in flight, if any.
    in_flight: Option<OwnerId>,
}

/// The bookmark sync engine.
///
/// Owns the store, consumes the authority, and fires the navigation sink on
/// unauthenticated mutation attempts. One instance per active session,
/// shared by handle with every consumer.
pub struct SyncEngine<A: AuthorityClient, N: NavigationSink> {
    store: BookmarkStore,
    authority: Arc<A>,
    navigation: Arc<N>,
    identity: Mutex<IdentityState>,
}

impl<A: AuthorityClient, N: NavigationSink> SyncEngine<A, N> {
    /// Creates an engine with an empty store and no identity.
    pub fn new(authority: Arc<A>, navigation: Arc<N>) -> Self {
        Self {
            store: BookmarkStore::new(),
            authority,
            navigation,
            identity: Mutex::new(IdentityState {
                owner: None,
                epoch: 0,
                in_flight: None,
            }),
        }
    }

    /// Returns the current snapshot. Never fails.
    pub fn snapshot(&self) -> BookmarkSnapshot {
        self.store.snapshot()
    }

    /// Registers a consumer; it observes the current snapshot immediately and
    /// every mutation afterwards.
    pub fn subscribe(
        &self,
        callback: impl Fn(&BookmarkSnapshot) + Send + Sync + 'static,
    ) -> Subscription {
        self.store.subscribe(callback)
    }

    /// Returns the current owner identity, if any.
    pub fn current_owner(&self) -> Option<OwnerId> {
        self.identity.lock().expect("lock poisoned").owner.clone()
    }

    /// Read access to the underlying store.
    pub fn store(&self) -> &BookmarkStore {
        &self.store
    }

    /// Switches the engine to a new identity.
    ///
    /// Logout (`None`) clears the store synchronously with no network call.
    /// Login or an identity change triggers an asynchronous load; any load
    /// still in flight for the previous identity is superseded and its
    /// result discarded on arrival.
    pub async fn set_identity(&self, owner: Option<OwnerId>) {
        {
            let mut state = self.identity.lock().expect("lock poisoned");
            if state.owner != owner {
                tracing::info!(
                    from = state.owner.as_ref().map(|o| o.as_str()).unwrap_or("<none>"),
                    to = owner.as_ref().map(|o| o.as_str()).unwrap_or("<none>"),
                    "bookmarks: identity changed"
                );
                state.owner = owner.clone();
                state.epoch += 1;
                state.in_flight = None;
            }
        }

        match owner {
            None => {
                if self.store.loaded_for() != Some(None) {
                    self.store.replace(None, Vec::new());
                }
            }
            Some(owner) => self.load_owner(owner, false).await,
        }
    }

    /// Ensures the relation is loaded for the current identity.
    ///
    /// Safe to call from every consumer on mount: a load already in flight
    /// or already completed for the same identity makes this a no-op, so the
    /// authority sees exactly one list call per identity.
    pub async fn load(&self) {
        match self.current_owner() {
            None => {
                if self.store.loaded_for() != Some(None) {
                    self.store.replace(None, Vec::new());
                }
            }
            Some(owner) => self.load_owner(owner, false).await,
        }
    }

    /// Reloads the relation for the current identity, bypassing the
    /// already-loaded guard.
    ///
    /// Used after an external event invalidates the mirror.
    pub async fn refresh(&self) {
        match self.current_owner() {
            None => {
                if self.store.loaded_for() != Some(None) {
                    self.store.replace(None, Vec::new());
                }
            }
            Some(owner) => self.load_owner(owner, true).await,
        }
    }

    async fn load_owner(&self, owner: OwnerId, force: bool) {
        let epoch = {
            let mut state = self.identity.lock().expect("lock poisoned");
            if state.owner.as_ref() != Some(&owner) {
                return;
            }
            if state.in_flight.as_ref() == Some(&owner) {
                tracing::debug!(owner = %owner, "bookmarks: load already in flight");
                return;
            }
            if !force && self.store.loaded_for() == Some(Some(owner.clone())) {
                tracing::debug!(owner = %owner, "bookmarks: already loaded");
                return;
            }
            state.in_flight = Some(owner.clone());
            state.epoch
        };

        self.store.begin_loading();
        let result = self.authority.list_relation(&owner).await;

        {
            let mut state = self.identity.lock().expect("lock poisoned");
            if state.epoch != epoch {
                tracing::debug!(owner = %owner, "bookmarks: discarding stale load result");
                return;
            }
            state.in_flight = None;
        }

        match result {
            Ok(entries) => {
                tracing::info!(owner = %owner, count = entries.len(), "bookmarks: loaded");
                self.store.replace(Some(owner), entries);
            }
            Err(err) => {
                // Fail safe to an empty, non-loading snapshot rather than
                // stale or partial data. Bookmarks are non-critical, so the
                // failure is logged instead of surfaced to consumers.
                tracing::warn!(owner = %owner, error = %err, "bookmarks: load failed");
                self.store.replace(Some(owner), Vec::new());
            }
        }
    }

    /// Toggles the bookmark for `item` and returns the resulting state.
    ///
    /// The local flip is applied and fanned out before the authority is
    /// contacted; the authority's returned boolean is then treated as ground
    /// truth. On transport failure the optimistic change is reverted and the
    /// toggle is reported as not applied (`false`).
    ///
    /// Without an identity, the navigation sink is fired exactly once and no
    /// authority call is made.
    pub async fn toggle(&self, item: &RecipeId) -> bool {
        let Some(owner) = self.current_owner() else {
            tracing::debug!(item = %item, "bookmarks: toggle without identity, redirecting");
            self.navigation.redirect_to_login();
            return false;
        };

        let was_present = self.store.snapshot().contains(item);
        let removed = if was_present {
            self.store.remove_item(item)
        } else {
            self.store.insert_optimistic(item, &owner);
            None
        };
        let assumed = !was_present;

        match self.authority.set_relation(item, &owner, assumed).await {
            Ok(actual) => {
                if actual != assumed {
                    // The authority disagrees with the optimistic guess.
                    // This is the expected self-healing path, not a failure.
                    tracing::debug!(
                        item = %item,
                        assumed,
                        actual,
                        "bookmarks: reconciled toggle against authority"
                    );
                    if actual {
                        match removed {
                            Some(entry) => self.store.restore(entry),
                            None => self.store.insert_optimistic(item, &owner),
                        }
                    } else {
                        self.store.remove_item(item);
                    }
                }
                actual
            }
            Err(err) => {
                tracing::warn!(
                    item = %item,
                    error = %err,
                    "bookmarks: toggle failed, reverting optimistic change"
                );
                if was_present {
                    if let Some(entry) = removed {
                        self.store.restore(entry);
                    }
                } else {
                    self.store.remove_item(item);
                }
                false
            }
        }
    }
}
