//! Search configuration
//!
//! Loaded from environment variables with development defaults.

use crate::error::{ConfigError, SearchError, SearchResult};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Who can reach the service this layer is embedded in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Exposure {
    /// Reachable from the internet. Query-string search is refused.
    Public,
    /// Only trusted internal callers. Query-string search is allowed.
    Internal,
}

impl FromStr for Exposure {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "public" => Ok(Exposure::Public),
            "internal" => Ok(Exposure::Internal),
            other => Err(ConfigError::InvalidValue {
                field: "exposure".to_string(),
                value: other.to_string(),
                reason: "expected \"public\" or \"internal\"".to_string(),
            }),
        }
    }
}

/// Search layer configuration.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Base URL of the search engine, e.g. "http://localhost:9200".
    pub engine_url: String,

    /// Basic auth user. Requires `password`.
    pub username: Option<String>,

    /// Basic auth password.
    #[serde(skip_serializing)]
    pub password: Option<String>,

    /// Index holding post documents.
    ///
    /// Operations take the index per call; this is the default for callers to
    /// pass to `search_posts`. Not read by the query service itself.
    pub posts_index: String,

    /// Index holding profile documents. Default for callers to pass to
    /// `search_profiles` and `typeahead_profiles`.
    pub profiles_index: String,

    /// Exposure of the embedding service. Defaults to public.
    pub exposure: Exposure,

    /// Drop posts whose `created_at` is later than query time.
    pub exclude_future_posts: bool,

    /// Log full query bodies at debug level. Bodies carry user text.
    pub log_query_bodies: bool,

    /// User-Agent sent to the engine.
    pub user_agent: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            engine_url: "http://localhost:9200".to_string(),
            username: None,
            password: None,
            posts_index: "posts".to_string(),
            profiles_index: "profiles".to_string(),
            exposure: Exposure::Public,
            exclude_future_posts: false,
            log_query_bodies: false,
            user_agent: format!("athome/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl SearchConfig {
    /// Create SearchConfig from environment variables.
    ///
    /// Environment variables:
    /// - `ATHOME_SEARCH_URL`: Engine base URL (default: http://localhost:9200)
    /// - `ATHOME_SEARCH_USERNAME` / `ATHOME_SEARCH_PASSWORD`: Basic auth
    /// - `ATHOME_POSTS_INDEX`: Post index name (default: posts)
    /// - `ATHOME_PROFILES_INDEX`: Profile index name (default: profiles)
    /// - `ATHOME_SEARCH_EXPOSURE`: "public" or "internal" (default: public)
    /// - `ATHOME_EXCLUDE_FUTURE_POSTS`: "true" or "false" (default: false)
    /// - `ATHOME_LOG_QUERY_BODIES`: "true" or "false" (default: false)
    /// - `ATHOME_USER_AGENT`: User-Agent header (default: athome/<version>)
    ///
    /// An unparseable exposure falls back to public.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let engine_url = std::env::var("ATHOME_SEARCH_URL").unwrap_or(defaults.engine_url);
        let username = std::env::var("ATHOME_SEARCH_USERNAME")
            .ok()
            .filter(|s| !s.is_empty());
        let password = std::env::var("ATHOME_SEARCH_PASSWORD")
            .ok()
            .filter(|s| !s.is_empty());
        let posts_index = std::env::var("ATHOME_POSTS_INDEX").unwrap_or(defaults.posts_index);
        let profiles_index =
            std::env::var("ATHOME_PROFILES_INDEX").unwrap_or(defaults.profiles_index);

        let exposure = std::env::var("ATHOME_SEARCH_EXPOSURE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(Exposure::Public);

        let exclude_future_posts = std::env::var("ATHOME_EXCLUDE_FUTURE_POSTS")
            .map(|s| s.eq_ignore_ascii_case("true") || s == "1")
            .unwrap_or(false);

        let log_query_bodies = std::env::var("ATHOME_LOG_QUERY_BODIES")
            .map(|s| s.eq_ignore_ascii_case("true") || s == "1")
            .unwrap_or(false);

        let user_agent = std::env::var("ATHOME_USER_AGENT").unwrap_or(defaults.user_agent);

        Self {
            engine_url,
            username,
            password,
            posts_index,
            profiles_index,
            exposure,
            exclude_future_posts,
            log_query_bodies,
            user_agent,
        }
    }

    /// Validate the configuration.
    ///
    /// Validates:
    /// - engine_url is non-empty http(s)
    /// - index names are non-empty
    /// - username is paired with a password
    pub fn validate(&self) -> SearchResult<()> {
        let url = self.engine_url.trim();
        if url.is_empty() {
            return Err(SearchError::Config(ConfigError::MissingRequired {
                field: "engine_url".to_string(),
            }));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(SearchError::Config(ConfigError::InvalidValue {
                field: "engine_url".to_string(),
                value: self.engine_url.clone(),
                reason: "must start with http:// or https://".to_string(),
            }));
        }

        for (field, value) in [
            ("posts_index", &self.posts_index),
            ("profiles_index", &self.profiles_index),
        ] {
            if value.trim().is_empty() {
                return Err(SearchError::Config(ConfigError::MissingRequired {
                    field: field.to_string(),
                }));
            }
        }

        if self.username.is_some() && self.password.is_none() {
            return Err(SearchError::Config(ConfigError::MissingRequired {
                field: "password".to_string(),
            }));
        }

        Ok(())
    }

    /// Whether query-string search may be served.
    pub fn allows_generic_search(&self) -> bool {
        self.exposure == Exposure::Internal
    }
}

impl std::fmt::Debug for SearchConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchConfig")
            .field("engine_url", &self.engine_url)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("posts_index", &self.posts_index)
            .field("profiles_index", &self.profiles_index)
            .field("exposure", &self.exposure)
            .field("exclude_future_posts", &self.exclude_future_posts)
            .field("log_query_bodies", &self.log_query_bodies)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}
