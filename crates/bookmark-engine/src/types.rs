//! Core types for the bookmark engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for the user who owns a bookmark (UUID string).
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(pub String);

impl OwnerId {
    /// Creates an owner ID from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Returns the owner ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for OwnerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for OwnerId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for OwnerId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Unique identifier for a bookmarked recipe (UUID string).
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecipeId(pub String);

impl RecipeId {
    /// Creates a recipe ID from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Returns the recipe ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RecipeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for RecipeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for RecipeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Unique identifier for a relation entry, assigned by the authority (UUID string).
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(pub String);

impl EntryId {
    /// Creates a new random entry ID.
    ///
    /// Used for synthetic entries created during an optimistic toggle, before
    /// the authority has assigned a durable ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Creates an entry ID from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Returns the entry ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One bookmark fact: "`owner_id` has bookmarked `item_id`".
///
/// The authority guarantees at most one live entry per `(owner_id, item_id)`
/// pair. The engine does not re-enforce that locally beyond deduplicating the
/// derived membership set.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RelationEntry {
    /// Opaque identifier assigned by the authority.
    pub id: EntryId,
    /// The bookmarked recipe.
    pub item_id: RecipeId,
    /// The user who owns the bookmark.
    pub owner_id: OwnerId,
    /// Creation timestamp assigned by the authority.
    pub created_at: DateTime<Utc>,
}

impl RelationEntry {
    /// Creates a synthetic entry for an optimistic add.
    ///
    /// The ID and timestamp are assigned locally and stand in until the next
    /// full load replaces them with the authority's values.
    pub fn synthetic(item_id: RecipeId, owner_id: OwnerId) -> Self {
        Self {
            id: EntryId::new(),
            item_id,
            owner_id,
            created_at: Utc::now(),
        }
    }
}
