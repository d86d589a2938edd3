//! athome Core - Search Types
//!
//! Data structures and contracts shared by the search layer and its callers:
//! engine response shapes, the error taxonomy, configuration, and the
//! transport trait. This crate performs no I/O.

pub mod config;
pub mod error;
pub mod response;
pub mod transport;

pub use config::{Exposure, SearchConfig};
pub use error::{
    ConfigError, DecodeError, PolicyError, SearchError, SearchErrorKind, SearchResult,
    TransportError, ValidationError,
};
pub use response::{
    PostSearchResult, SearchHit, SearchHits, SearchResponse, TotalHits, TotalRelation, UserResult,
};
pub use transport::{EngineRequest, SearchTransport};
