//! Subscriber fan-out for the bookmark engine.
//!
//! Many independent UI fragments observe one shared snapshot without each
//! issuing their own network call. The hub keeps an explicit, ordered list of
//! registered callbacks and invokes them synchronously.
//!
//! # Design Principles
//!
//! - Callbacks run in registration order, exactly once per mutation
//! - A new subscriber is called immediately with the current snapshot
//! - Unsubscribing is idempotent and safe from inside a callback

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

use crate::snapshot::BookmarkSnapshot;

type Callback = Box<dyn Fn(&BookmarkSnapshot) + Send + Sync + 'static>;

struct SubscriberSlot {
    id: u64,
    active: AtomicBool,
    callback: Callback,
}

type SlotList = Mutex<Vec<Arc<SubscriberSlot>>>;

/// A handle to a registered subscriber.
///
/// Dropping the handle unsubscribes. `unsubscribe` may also be called
/// explicitly, any number of times, from any context including the callback
/// itself.
pub struct Subscription {
    slot: Arc<SubscriberSlot>,
    slots: Weak<SlotList>,
}

impl Subscription {
    /// Deactivates this subscriber and removes it from the hub.
    ///
    /// Idempotent. The callback is never invoked again after this returns.
    pub fn unsubscribe(&self) {
        self.slot.active.store(false, Ordering::SeqCst);
        if let Some(slots) = self.slots.upgrade() {
            let mut slots = slots.lock().expect("lock poisoned");
            slots.retain(|s| s.id != self.slot.id);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

/// A hub that fans snapshots out to every registered subscriber.
pub struct SubscriptionHub {
    slots: Arc<SlotList>,
    next_id: AtomicU64,
}

impl SubscriptionHub {
    /// Creates a new empty hub with no subscribers.
    pub fn new() -> Self {
        Self {
            slots: Arc::new(Mutex::new(Vec::new())),
            next_id: AtomicU64::new(0),
        }
    }

    /// Registers a subscriber and delivers `current` to it immediately.
    ///
    /// The callback then fires after every store mutation until the returned
    /// handle is unsubscribed or dropped.
    pub fn subscribe(
        &self,
        current: &BookmarkSnapshot,
        callback: impl Fn(&BookmarkSnapshot) + Send + Sync + 'static,
    ) -> Subscription {
        let slot = Arc::new(SubscriberSlot {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            active: AtomicBool::new(true),
            callback: Box::new(callback),
        });

        self.slots
            .lock()
            .expect("lock poisoned")
            .push(Arc::clone(&slot));

        // Initial delivery happens outside the lock so the callback may
        // subscribe or unsubscribe re-entrantly.
        (slot.callback)(current);

        Subscription {
            slot,
            slots: Arc::downgrade(&self.slots),
        }
    }

    /// Delivers a snapshot to every active subscriber, in registration order.
    ///
    /// Each subscriber sees the snapshot at most once per call. Subscribers
    /// deactivated mid-fan-out (including by an earlier callback) are skipped.
    pub fn fan_out(&self, snapshot: &BookmarkSnapshot) {
        let slots: Vec<Arc<SubscriberSlot>> =
            self.slots.lock().expect("lock poisoned").clone();

        for slot in slots {
            if slot.active.load(Ordering::SeqCst) {
                (slot.callback)(snapshot);
            }
        }
    }

    /// Returns the count of currently registered subscribers.
    ///
    /// Useful for debugging and testing.
    pub fn subscriber_count(&self) -> usize {
        self.slots.lock().expect("lock poisoned").len()
    }
}

impl Default for SubscriptionHub {
    fn default() -> Self {
        Self::new()
    }
}
