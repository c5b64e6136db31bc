//! Configuration for the REST authority adapter.

use serde::Deserialize;

/// Default table holding the bookmark relation.
const DEFAULT_TABLE: &str = "bookmarks";

/// Errors raised while building an adapter configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required environment variable is missing or not unicode.
    #[error("missing environment variable: {0}")]
    MissingEnv(&'static str),
}

/// Connection settings for the authority's REST endpoint.
#[derive(Clone, Debug, Deserialize)]
pub struct RestAuthorityConfig {
    /// Project API base URL, e.g. `https://xyz.example.co`.
    pub api_url: String,
    /// Anonymous API key sent with every request.
    pub anon_key: String,
    /// Table holding the relation.
    #[serde(default = "default_table")]
    pub table: String,
}

fn default_table() -> String {
    DEFAULT_TABLE.to_string()
}

impl RestAuthorityConfig {
    /// Creates a configuration with the default table name.
    pub fn new(api_url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            anon_key: anon_key.into(),
            table: default_table(),
        }
    }

    /// Reads the configuration from the environment.
    ///
    /// `BOOKMARK_AUTHORITY_URL` and `BOOKMARK_AUTHORITY_ANON_KEY` are
    /// required; `BOOKMARK_AUTHORITY_TABLE` overrides the default table.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_url = std::env::var("BOOKMARK_AUTHORITY_URL")
            .map_err(|_| ConfigError::MissingEnv("BOOKMARK_AUTHORITY_URL"))?;
        let anon_key = std::env::var("BOOKMARK_AUTHORITY_ANON_KEY")
            .map_err(|_| ConfigError::MissingEnv("BOOKMARK_AUTHORITY_ANON_KEY"))?;
        let table = std::env::var("BOOKMARK_AUTHORITY_TABLE").unwrap_or_else(|_| default_table());
        Ok(Self {
            api_url,
            anon_key,
            table,
        })
    }
}
