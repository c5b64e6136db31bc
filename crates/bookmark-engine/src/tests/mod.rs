//! Integration tests for the bookmark sync engine.
//!
//! Test organization, one file per concern:
//!
//! - `loading.rs`        - load guard, null identity, failure reset, stale discard, refresh
//! - `toggling.rs`       - optimistic flips, revert on failure, unauthenticated redirect
//! - `reconciliation.rs` - corrections when the authority disagrees
//! - `fanout.rs`         - subscriber delivery guarantees and snapshot consistency
//! - `identity.rs`       - login/logout transitions

mod identity;

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::Notify;

use crate::authority::{AuthorityClient, AuthorityError};
use crate::navigation::RecordingNavigation;
use crate::snapshot::BookmarkSnapshot;
use crate::types::{OwnerId, RecipeId, RelationEntry};
use crate::SyncEngine;

/// A scriptable in-memory authority.
///
/// Counts calls, can fail on demand, can force the returned toggle state,
/// and can hold a specific owner's list call open to create overlap.
pub(crate) struct MockAuthority {
    entries: Mutex<HashMap<OwnerId, Vec<RelationEntry>>>,
    list_calls: AtomicUsize,
    set_calls: AtomicUsize,
    fail_list: AtomicBool,
    fail_set: AtomicBool,
    forced_set_result: Mutex<Option<bool>>,
    list_gate: Mutex<Option<(OwnerId, Arc<Notify>)>>,
}

impl MockAuthority {
    pub(crate) fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            list_calls: AtomicUsize::new(0),
            set_calls: AtomicUsize::new(0),
            fail_list: AtomicBool::new(false),
            fail_set: AtomicBool::new(false),
            forced_set_result: Mutex::new(None),
            list_gate: Mutex::new(None),
        }
    }

    pub(crate) fn seed(&self, owner: &OwnerId, items: &[&str]) {
        let entries = items
            .iter()
            .map(|item| RelationEntry::synthetic(RecipeId::from(*item), owner.clone()))
            .collect();
        self.entries.lock().unwrap().insert(owner.clone(), entries);
    }

    pub(crate) fn list_call_count(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn set_call_count(&self) -> usize {
        self.set_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn fail_list(&self, fail: bool) {
        self.fail_list.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn fail_set(&self, fail: bool) {
        self.fail_set.store(fail, Ordering::SeqCst);
    }

    /// Forces `set_relation` to report this state regardless of the request.
    pub(crate) fn force_set_result(&self, state: bool) {
        *self.forced_set_result.lock().unwrap() = Some(state);
    }

    /// Holds every `list_relation` call for `owner` open until released.
    pub(crate) fn gate_list(&self, owner: &OwnerId) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.list_gate.lock().unwrap() = Some((owner.clone(), Arc::clone(&gate)));
        gate
    }
}

impl AuthorityClient for MockAuthority {
    async fn list_relation(&self, owner: &OwnerId) -> Result<Vec<RelationEntry>, AuthorityError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);

        let gate = {
            let gate = self.list_gate.lock().unwrap();
            match gate.as_ref() {
                Some((gated, notify)) if gated == owner => Some(Arc::clone(notify)),
                _ => None,
            }
        };
        if let Some(gate) = gate {
            gate.notified().await;
        }

        if self.fail_list.load(Ordering::SeqCst) {
            return Err(AuthorityError::Transport("connection reset".to_string()));
        }
        Ok(self
            .entries
            .lock()
            .unwrap()
            .get(owner)
            .cloned()
            .unwrap_or_default())
    }

    async fn set_relation(
        &self,
        _item: &RecipeId,
        _owner: &OwnerId,
        present: bool,
    ) -> Result<bool, AuthorityError> {
        self.set_calls.fetch_add(1, Ordering::SeqCst);

        if self.fail_set.load(Ordering::SeqCst) {
            return Err(AuthorityError::Transport("connection reset".to_string()));
        }
        if let Some(forced) = *self.forced_set_result.lock().unwrap() {
            return Ok(forced);
        }
        Ok(present)
    }
}

pub(crate) type TestEngine = SyncEngine<MockAuthority, RecordingNavigation>;

pub(crate) fn engine() -> (Arc<TestEngine>, Arc<MockAuthority>, Arc<RecordingNavigation>) {
    let authority = Arc::new(MockAuthority::new());
    let navigation = Arc::new(RecordingNavigation::new());
    let engine = Arc::new(SyncEngine::new(
        Arc::clone(&authority),
        Arc::clone(&navigation),
    ));
    (engine, authority, navigation)
}

/// Records every snapshot a subscriber observes.
pub(crate) fn observe(engine: &TestEngine) -> (Arc<Mutex<Vec<BookmarkSnapshot>>>, crate::hub::Subscription) {
    let seen: Arc<Mutex<Vec<BookmarkSnapshot>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let sub = engine.subscribe(move |snap| sink.lock().unwrap().push(snap.clone()));
    (seen, sub)
}

/// Basic workflow test demonstrating core functionality.
#[tokio::test]
async fn basic_workflow() {
    let (engine, authority, _) = engine();
    authority.seed(&OwnerId::from("u1"), &["r1"]);

    engine.set_identity(Some(OwnerId::from("u1"))).await;
    let snap = engine.snapshot();
    assert!(snap.contains(&RecipeId::from("r1")));
    assert!(!snap.is_loading());

    assert!(engine.toggle(&RecipeId::from("r2")).await);
    assert!(engine.snapshot().contains(&RecipeId::from("r2")));

    assert!(!engine.toggle(&RecipeId::from("r2")).await);
    assert!(!engine.snapshot().contains(&RecipeId::from("r2")));
}
