//! Identity transition tests: login, logout, and switching owners.

use super::{engine, observe};
use crate::types::{OwnerId, RecipeId};

#[tokio::test]
async fn login_loads_the_new_owners_relation() {
    let (engine, authority, _) = engine();
    let owner = OwnerId::from("u1");
    authority.seed(&owner, &["r1", "r2"]);

    engine.set_identity(Some(owner.clone())).await;

    assert_eq!(engine.current_owner(), Some(owner.clone()));
    assert_eq!(engine.snapshot().len(), 2);
    assert_eq!(engine.store().loaded_for(), Some(Some(owner)));
}

#[tokio::test]
async fn logout_clears_synchronously_without_network() {
    let (engine, authority, _) = engine();
    let owner = OwnerId::from("u1");
    authority.seed(&owner, &["r1"]);
    engine.set_identity(Some(owner)).await;
    let calls_after_login = authority.list_call_count();

    engine.set_identity(None).await;

    assert!(engine.snapshot().is_empty());
    assert_eq!(engine.current_owner(), None);
    assert_eq!(authority.list_call_count(), calls_after_login);
}

#[tokio::test]
async fn switching_owners_replaces_the_relation() {
    let (engine, authority, _) = engine();
    let u1 = OwnerId::from("u1");
    let u2 = OwnerId::from("u2");
    authority.seed(&u1, &["r1"]);
    authority.seed(&u2, &["r2"]);

    engine.set_identity(Some(u1)).await;
    engine.set_identity(Some(u2)).await;

    let snap = engine.snapshot();
    assert!(snap.contains(&RecipeId::from("r2")));
    assert!(!snap.contains(&RecipeId::from("r1")));
}

#[tokio::test]
async fn repeated_identity_is_a_noop() {
    let (engine, authority, _) = engine();
    let owner = OwnerId::from("u1");
    authority.seed(&owner, &["r1"]);

    engine.set_identity(Some(owner.clone())).await;
    engine.set_identity(Some(owner)).await;
    engine.set_identity(None).await;
    engine.set_identity(None).await;

    assert_eq!(authority.list_call_count(), 1);
}

#[tokio::test]
async fn logout_notifies_subscribers_with_empty_snapshot() {
    let (engine, authority, _) = engine();
    let owner = OwnerId::from("u1");
    authority.seed(&owner, &["r1"]);
    engine.set_identity(Some(owner)).await;
    let (seen, _sub) = observe(&engine);

    engine.set_identity(None).await;

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].len(), 1);
    assert!(seen[1].is_empty());
}
