//! Query Service
//!
//! Entry point for callers. Each operation validates paging, builds its query,
//! sends it through the injected transport, and decodes the reply. Nothing is
//! cached or shared between calls; dropping an operation's future cancels its
//! engine request.

use crate::builder::{
    generic_query, posts_query, profiles_query, typeahead_query, PostQueryOptions,
};
use crate::decode::decode_response;
use crate::pagination::Page;
use crate::query::SearchBody;
use athome_core::{
    EngineRequest, PolicyError, SearchConfig, SearchResponse, SearchResult, SearchTransport,
    TransportError,
};
use std::sync::Arc;
use tracing::Instrument;

/// Which public operation produced a query. Used in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Posts,
    Profiles,
    Typeahead,
    Generic,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Posts => "search_posts",
            Operation::Profiles => "search_profiles",
            Operation::Typeahead => "typeahead_profiles",
            Operation::Generic => "search_generic",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Search facade over an injected engine transport.
#[derive(Clone)]
pub struct QueryService {
    transport: Arc<dyn SearchTransport>,
    config: SearchConfig,
}

impl QueryService {
    /// Create a service over `transport`.
    ///
    /// # Arguments
    /// * `transport` - Engine transport; shared, never mutated by the service
    /// * `config` - Exposure and query policy settings
    pub fn new(transport: Arc<dyn SearchTransport>, config: SearchConfig) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Search posts, newest first.
    ///
    /// # Returns
    /// * `Err(SearchError::Validation)` - If the page is out of range; no I/O
    /// * `Err(SearchError::Transport)` - If the engine could not be reached
    /// * `Err(SearchError::Decode)` - If the engine reply is malformed
    pub async fn search_posts(
        &self,
        index: &str,
        text: &str,
        offset: i64,
        size: i64,
    ) -> SearchResult<SearchResponse> {
        let page = Page::new(offset, size)?;
        let options = PostQueryOptions {
            exclude_future: self.config.exclude_future_posts,
        };
        let body = posts_query(text, page, options);
        self.execute(Operation::Posts, index, body, Some(page)).await
    }

    /// Search profiles by text, preferring profiles with an avatar or banner.
    pub async fn search_profiles(
        &self,
        index: &str,
        text: &str,
        offset: i64,
        size: i64,
    ) -> SearchResult<SearchResponse> {
        let page = Page::new(offset, size)?;
        let body = profiles_query(text, page);
        self.execute(Operation::Profiles, index, body, Some(page))
            .await
    }

    /// Profile suggestions for partially typed input. Always one page of 30.
    pub async fn typeahead_profiles(
        &self,
        index: &str,
        text: &str,
    ) -> SearchResult<SearchResponse> {
        let body = typeahead_query(text);
        self.execute(Operation::Typeahead, index, body, None).await
    }

    /// Access operations reserved for trusted internal callers.
    ///
    /// Fails on a publicly exposed service, before any query is built.
    pub fn internal(&self) -> Result<InternalQueries<'_>, PolicyError> {
        if !self.config.allows_generic_search() {
            tracing::warn!("refused internal query access on public service");
            return Err(PolicyError::GenericSearchNotPermitted);
        }
        Ok(InternalQueries { service: self })
    }

    async fn execute(
        &self,
        operation: Operation,
        index: &str,
        body: SearchBody,
        page: Option<Page>,
    ) -> SearchResult<SearchResponse> {
        let span = tracing::info_span!(
            "search",
            operation = operation.as_str(),
            index = index,
            transport = self.transport.name()
        );

        self.dispatch(index, body, page).instrument(span).await
    }

    async fn dispatch(
        &self,
        index: &str,
        body: SearchBody,
        page: Option<Page>,
    ) -> SearchResult<SearchResponse> {
        let body = body.to_json().map_err(|e| TransportError::Unreachable {
            reason: format!("Failed to encode query: {}", e),
        })?;
        let request = EngineRequest::new(index, body);

        if self.config.log_query_bodies {
            tracing::debug!(
                offset = page.map(|p| p.offset()),
                size = page.map(|p| p.size()),
                query = %request.body,
                "sending query"
            );
        } else {
            tracing::debug!(
                offset = page.map(|p| p.offset()),
                size = page.map(|p| p.size()),
                "sending query"
            );
        }

        let raw = self.transport.search(&request).await.map_err(|e| {
            self.log_transport_failure(&e);
            e
        })?;

        let response = decode_response(&raw).map_err(|e| {
            tracing::warn!(error = %e, "search response could not be decoded");
            e
        })?;

        tracing::debug!(
            took_ms = response.took_ms,
            timed_out = response.timed_out,
            hits = response.len(),
            "search complete"
        );
        Ok(response)
    }

    /// Engine error reasons can quote the query back, so they follow the same
    /// gate as query bodies.
    fn log_transport_failure(&self, error: &TransportError) {
        match error {
            TransportError::Unreachable { reason } => {
                tracing::warn!(reason = %reason, "search request failed");
            }
            TransportError::Status {
                status,
                error_type,
                reason,
            } => {
                tracing::warn!(
                    status = *status,
                    error_type = error_type.as_deref().unwrap_or("unknown"),
                    "search request failed"
                );
                if self.config.log_query_bodies {
                    tracing::debug!(status = *status, reason = %reason, "engine error detail");
                }
            }
        }
    }
}

impl std::fmt::Debug for QueryService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryService")
            .field("transport", &self.transport.name())
            .field("config", &self.config)
            .finish()
    }
}

/// Operations only reachable through [`QueryService::internal`].
#[derive(Debug, Clone, Copy)]
pub struct InternalQueries<'a> {
    service: &'a QueryService,
}

impl InternalQueries<'_> {
    /// Run the caller's text through the engine's query-string parser.
    ///
    /// The text can use any operator, field, or wildcard the engine supports
    /// (leading wildcards excepted). Never pass text from untrusted users.
    pub async fn search_generic(&self, index: &str, text: &str) -> SearchResult<SearchResponse> {
        let body = generic_query(text);
        self.service
            .execute(Operation::Generic, index, body, None)
            .await
    }
}
