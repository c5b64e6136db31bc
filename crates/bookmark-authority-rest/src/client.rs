//! REST client implementing the `AuthorityClient` contract.
//!
//! The backend exposes the relation as a PostgREST-style table keyed by a
//! unique `(owner_id, item_id)` constraint. The adapter translates the
//! engine's two-operation contract onto query/insert/delete requests and
//! collapses the backend's idempotency signals into honest booleans:
//!
//! - inserting an already-present pair answers `409 Conflict`, which is
//!   reported as `true` (the entry exists), not as an error
//! - deleting an absent pair deletes zero rows, which is reported as `false`
//!
//! Transport failures always surface as errors; the adapter never guesses a
//! boolean the authority did not produce.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::RwLock;

use bookmark_engine::{AuthorityClient, AuthorityError, OwnerId, RecipeId, RelationEntry};

use crate::config::RestAuthorityConfig;

/// Logs must never carry raw response bodies; summarize instead.
fn summarize_response_body(body: &str) -> String {
    let mut hasher = DefaultHasher::new();
    body.hash(&mut hasher);
    format!("len={},digest={:016x}", body.len(), hasher.finish())
}

/// REST adapter for the canonical bookmark relation.
pub struct RestAuthorityClient {
    http_client: reqwest::Client,
    config: RestAuthorityConfig,
    /// Bearer token for the authenticated user; the anon key is used when
    /// absent.
    access_token: RwLock<Option<String>>,
}

impl RestAuthorityClient {
    /// Creates a client from a configuration.
    pub fn new(config: RestAuthorityConfig) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            config,
            access_token: RwLock::new(None),
        }
    }

    /// Sets the bearer token used for subsequent requests (e.g. after login
    /// or a token refresh).
    pub fn set_access_token(&self, token: impl Into<String>) {
        *self.access_token.write().expect("lock poisoned") = Some(token.into());
    }

    /// Drops the bearer token; requests fall back to the anon key.
    pub fn clear_access_token(&self) {
        *self.access_token.write().expect("lock poisoned") = None;
    }

    fn bearer(&self) -> String {
        let token = self.access_token.read().expect("lock poisoned");
        token
            .clone()
            .unwrap_or_else(|| self.config.anon_key.clone())
    }

    /// Build the REST API URL for the relation table.
    fn rest_url(&self) -> String {
        format!("{}/rest/v1/{}", self.config.api_url, self.config.table)
    }

    fn list_url(&self, owner: &OwnerId) -> String {
        format!(
            "{}?owner_id=eq.{}&select=id,item_id,owner_id,created_at&order=created_at.desc",
            self.rest_url(),
            owner
        )
    }

    fn entry_url(&self, item: &RecipeId, owner: &OwnerId) -> String {
        format!(
            "{}?owner_id=eq.{}&item_id=eq.{}",
            self.rest_url(),
            owner,
            item
        )
    }

    fn request(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .header("apikey", &self.config.anon_key)
            .header("Authorization", format!("Bearer {}", self.bearer()))
            .header("Accept", "application/json")
    }

    async fn rejected(response: reqwest::Response, context: &str) -> AuthorityError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let body_summary = summarize_response_body(&body);
        tracing::error!(status = %status, body_summary = %body_summary, "{context}");
        AuthorityError::Rejected {
            status: status.as_u16(),
            detail: body_summary,
        }
    }
}

fn transport(err: reqwest::Error) -> AuthorityError {
    AuthorityError::Transport(err.to_string())
}

/// Maps an insert response status to the resulting presence.
///
/// A uniqueness violation means the entry already exists; the requested
/// state holds, so `409 Conflict` collapses to `true` rather than erroring.
/// `None` means the status is a genuine rejection.
fn insert_state_for_status(status: reqwest::StatusCode) -> Option<bool> {
    if status == reqwest::StatusCode::CONFLICT || status.is_success() {
        Some(true)
    } else {
        None
    }
}

impl AuthorityClient for RestAuthorityClient {
    async fn list_relation(&self, owner: &OwnerId) -> Result<Vec<RelationEntry>, AuthorityError> {
        let url = self.list_url(owner);
        tracing::debug!(owner = %owner, "fetching bookmark relation");

        let response = self
            .request(self.http_client.get(&url))
            .send()
            .await
            .map_err(transport)?;

        if !response.status().is_success() {
            return Err(Self::rejected(response, "failed to list bookmark relation").await);
        }

        let entries: Vec<RelationEntry> = response.json().await.map_err(transport)?;
        tracing::debug!(owner = %owner, count = entries.len(), "fetched bookmark relation");
        Ok(entries)
    }

    async fn set_relation(
        &self,
        item: &RecipeId,
        owner: &OwnerId,
        present: bool,
    ) -> Result<bool, AuthorityError> {
        if present {
            let body = serde_json::json!({
                "item_id": item,
                "owner_id": owner,
            });
            tracing::debug!(item = %item, owner = %owner, "inserting bookmark");

            let response = self
                .request(self.http_client.post(self.rest_url()))
                .header("Content-Type", "application/json")
                .header("Prefer", "return=minimal")
                .json(&body)
                .send()
                .await
                .map_err(transport)?;

            match insert_state_for_status(response.status()) {
                Some(resulting) => {
                    if response.status() == reqwest::StatusCode::CONFLICT {
                        tracing::debug!(item = %item, owner = %owner, "bookmark already present");
                    }
                    Ok(resulting)
                }
                None => Err(Self::rejected(response, "failed to insert bookmark").await),
            }
        } else {
            let url = self.entry_url(item, owner);
            tracing::debug!(item = %item, owner = %owner, "deleting bookmark");

            let response = self
                .request(self.http_client.delete(&url))
                .header("Prefer", "return=representation")
                .send()
                .await
                .map_err(transport)?;

            if !response.status().is_success() {
                return Err(Self::rejected(response, "failed to delete bookmark").await);
            }

            // Zero deleted rows is still the requested end state.
            let deleted: Vec<RelationEntry> = response.json().await.map_err(transport)?;
            if deleted.is_empty() {
                tracing::debug!(item = %item, owner = %owner, "bookmark was already absent");
            }
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> RestAuthorityClient {
        RestAuthorityClient::new(RestAuthorityConfig::new("https://api.example.co", "anon"))
    }

    #[test]
    fn list_url_filters_by_owner_newest_first() {
        let url = client().list_url(&OwnerId::from("u1"));
        assert_eq!(
            url,
            "https://api.example.co/rest/v1/bookmarks?owner_id=eq.u1\
             &select=id,item_id,owner_id,created_at&order=created_at.desc"
        );
    }

    #[test]
    fn entry_url_filters_by_owner_and_item() {
        let url = client().entry_url(&RecipeId::from("r1"), &OwnerId::from("u1"));
        assert_eq!(
            url,
            "https://api.example.co/rest/v1/bookmarks?owner_id=eq.u1&item_id=eq.r1"
        );
    }

    #[test]
    fn bearer_falls_back_to_anon_key() {
        let client = client();
        assert_eq!(client.bearer(), "anon");

        client.set_access_token("jwt");
        assert_eq!(client.bearer(), "jwt");

        client.clear_access_token();
        assert_eq!(client.bearer(), "anon");
    }

    #[test]
    fn duplicate_insert_collapses_to_present() {
        assert_eq!(
            insert_state_for_status(reqwest::StatusCode::CREATED),
            Some(true)
        );
        assert_eq!(
            insert_state_for_status(reqwest::StatusCode::CONFLICT),
            Some(true)
        );
        assert_eq!(
            insert_state_for_status(reqwest::StatusCode::UNAUTHORIZED),
            None
        );
        assert_eq!(
            insert_state_for_status(reqwest::StatusCode::INTERNAL_SERVER_ERROR),
            None
        );
    }

    #[test]
    fn body_summary_never_echoes_the_body() {
        let summary = summarize_response_body("secret payload");
        assert!(summary.starts_with("len=14,digest="));
        assert!(!summary.contains("secret"));
    }
}
