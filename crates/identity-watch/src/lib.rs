//! Identity source glue for the bookmark sync engine.
//!
//! The identity source (the application's auth layer) publishes the current
//! owner identity over a watch channel; a watcher task drives
//! [`SyncEngine::set_identity`] once at startup and again on every change,
//! so login and logout flow into the engine without the auth layer knowing
//! anything about bookmarks.
//!
//! ```
//! use std::sync::Arc;
//! use bookmark_engine::{
//!     AuthorityClient, AuthorityError, NullNavigation, OwnerId, RecipeId,
//!     RelationEntry, SyncEngine,
//! };
//! use identity_watch::{identity_channel, watch_identity};
//!
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
//!     let engine = Arc::new(SyncEngine::new(
//!         Arc::new(StaticAuthority),
//!         Arc::new(NullNavigation),
//!     ));
//!     let (publisher, receiver) = identity_channel();
//!     let watcher = tokio::spawn(watch_identity(Arc::clone(&engine), receiver));
//!
//!     publisher.login(OwnerId::from("user-1"));
//!     tokio::task::yield_now().await;
//!
//!     publisher.logout();
//!     drop(publisher);
//!     watcher.await.unwrap();
//!
//!     assert!(engine.snapshot().is_empty());
//! });
//! ```

use std::sync::Arc;

use tokio::sync::watch;

use bookmark_engine::{AuthorityClient, NavigationSink, OwnerId, SyncEngine};

/// Publisher half of the identity channel, held by the auth layer.
#[derive(Clone)]
pub struct IdentityPublisher {
    sender: watch::Sender<Option<OwnerId>>,
}

impl IdentityPublisher {
    /// Publishes a login for `owner`.
    pub fn login(&self, owner: OwnerId) {
        let _ = self.sender.send(Some(owner));
    }

    /// Publishes a logout.
    pub fn logout(&self) {
        let _ = self.sender.send(None);
    }

    /// Publishes an arbitrary identity value.
    pub fn set(&self, owner: Option<OwnerId>) {
        let _ = self.sender.send(owner);
    }
}

/// Receiver half of the identity channel, consumed by [`watch_identity`].
pub type IdentityReceiver = watch::Receiver<Option<OwnerId>>;

/// Creates an identity channel starting with no identity.
pub fn identity_channel() -> (IdentityPublisher, IdentityReceiver) {
    let (sender, receiver) = watch::channel(None);
    (IdentityPublisher { sender }, receiver)
}

/// Drives the engine from identity changes until the publisher is dropped.
///
/// Applies the current identity once at startup, then once per observed
/// change. Intermediate values may be skipped under rapid flapping (watch
/// semantics); the engine always converges on the latest identity.
pub async fn watch_identity<A, N>(engine: Arc<SyncEngine<A, N>>, mut receiver: IdentityReceiver)
where
    A: AuthorityClient,
    N: NavigationSink,
{
    loop {
        let current = receiver.borrow_and_update().clone();
        tracing::debug!(
            owner = current.as_ref().map(|o| o.as_str()).unwrap_or("<none>"),
            "identity-watch: applying identity"
        );
        engine.set_identity(current).await;

        if receiver.changed().await.is_err() {
            tracing::debug!("identity-watch: publisher dropped, stopping");
            break;
        }
    }
}
