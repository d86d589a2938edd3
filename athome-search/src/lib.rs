//! athome Search - Query Service
//!
//! Translates search intents into engine queries and normalizes the replies:
//!
//! - [`QueryService::search_posts`]: posts matching text, newest first
//! - [`QueryService::search_profiles`]: profiles matching text, richer
//!   profiles ranked higher
//! - [`QueryService::typeahead_profiles`]: prefix suggestions, fixed page
//! - [`InternalQueries::search_generic`]: raw query-string search, internal
//!   callers only
//!
//! The engine is reached through an injected
//! [`SearchTransport`](athome_core::SearchTransport);
//! [`OpenSearchTransport`] is the HTTP implementation.

pub mod builder;
pub mod decode;
pub mod opensearch;
pub mod pagination;
pub mod query;
pub mod service;
pub mod telemetry;

pub use builder::{
    generic_query, posts_query, profiles_query, typeahead_query, PostQueryOptions,
    TYPEAHEAD_FIELDS, TYPEAHEAD_SIZE,
};
pub use decode::decode_response;
pub use opensearch::OpenSearchTransport;
pub use pagination::{check_params, Page, MAX_OFFSET, MAX_SIZE, MAX_WINDOW};
pub use query::SearchBody;
pub use service::{InternalQueries, Operation, QueryService};

pub use athome_core::{
    EngineRequest, Exposure, SearchConfig, SearchError, SearchErrorKind, SearchHit, SearchResponse,
    SearchResult, SearchTransport,
};
