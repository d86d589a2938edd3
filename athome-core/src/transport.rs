//! Search engine transport contract
//!
//! The query layer never owns a connection. Callers inject a transport and the
//! layer hands it one fully built request per operation.

use crate::error::TransportError;
use async_trait::async_trait;
use serde::Serialize;

/// One `_search` call against a named index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineRequest {
    /// Target index name.
    pub index: String,
    /// JSON query body.
    pub body: serde_json::Value,
    /// Whether the engine should count every match. Always false from the
    /// query service; exact totals are expensive.
    pub track_total_hits: bool,
}

impl EngineRequest {
    pub fn new(index: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            index: index.into(),
            body,
            track_total_hits: false,
        }
    }
}

/// Trait for search engine transports.
/// Implementations must be thread-safe (Send + Sync).
///
/// A transport performs exactly one attempt per call. Retries, timeouts and
/// connection pooling belong to the implementation or its caller. Dropping the
/// returned future must abandon the request.
///
/// # Example
/// ```ignore
/// struct MyTransport { /* ... */ }
///
/// #[async_trait]
/// impl SearchTransport for MyTransport {
///     async fn search(&self, request: &EngineRequest) -> Result<Vec<u8>, TransportError> {
///         // POST /{index}/_search
///     }
/// }
/// ```
#[async_trait]
pub trait SearchTransport: Send + Sync {
    /// Execute a search and return the raw 2xx response body.
    ///
    /// # Returns
    /// * `Ok(Vec<u8>)` - The undecoded response body
    /// * `Err(TransportError::Unreachable)` - If the call could not complete
    /// * `Err(TransportError::Status)` - If the engine answered non-2xx
    async fn search(&self, request: &EngineRequest) -> Result<Vec<u8>, TransportError>;

    /// Short name used in logs.
    fn name(&self) -> &str {
        "engine"
    }
}

#[async_trait]
impl<T: SearchTransport + ?Sized> SearchTransport for std::sync::Arc<T> {
    async fn search(&self, request: &EngineRequest) -> Result<Vec<u8>, TransportError> {
        (**self).search(request).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
