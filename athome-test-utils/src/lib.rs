//! athome Test Utilities
//!
//! Shared test infrastructure for the athome workspace:
//! - Stub engine transport that records requests and replays canned replies
//! - JSON fixtures for engine responses
//! - Proptest generators for paging parameters and query text
//! - Log capture for asserting on emitted events

pub use athome_core::{
    DecodeError, EngineRequest, Exposure, SearchConfig, SearchError, SearchErrorKind,
    SearchResponse, SearchTransport, TransportError, ValidationError,
};

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

// ============================================================================
// STUB TRANSPORT
// ============================================================================

/// What the stub does for one call.
#[derive(Debug, Clone)]
pub enum StubReply {
    /// Return these bytes as a 2xx body.
    Body(Vec<u8>),
    /// Fail with this error.
    Fail(TransportError),
    /// Never complete. For cancellation tests.
    Hang,
}

/// Stub engine transport for testing.
///
/// Replies are consumed in order; once the queue is empty every call gets the
/// fallback reply (an empty result page unless changed).
#[derive(Debug)]
pub struct StubTransport {
    replies: Mutex<VecDeque<StubReply>>,
    fallback: StubReply,
    requests: Mutex<Vec<EngineRequest>>,
}

impl StubTransport {
    pub fn new() -> Self {
        Self::with_fallback(StubReply::Body(empty_response().to_string().into_bytes()))
    }

    /// Stub that answers every call with `reply`.
    pub fn with_fallback(reply: StubReply) -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            fallback: reply,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Stub that answers every call with `body`.
    pub fn returning(body: Value) -> Self {
        Self::with_fallback(StubReply::Body(body.to_string().into_bytes()))
    }

    /// Stub that fails every call with `error`.
    pub fn failing(error: TransportError) -> Self {
        Self::with_fallback(StubReply::Fail(error))
    }

    /// Stub whose calls never complete.
    pub fn hanging() -> Self {
        Self::with_fallback(StubReply::Hang)
    }

    /// Queue a one-off reply ahead of the fallback.
    pub fn push(&self, reply: StubReply) -> &Self {
        self.replies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(reply);
        self
    }

    pub fn push_json(&self, body: Value) -> &Self {
        self.push(StubReply::Body(body.to_string().into_bytes()))
    }

    /// Requests received so far, in call order.
    pub fn requests(&self) -> Vec<EngineRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    pub fn last_request(&self) -> Option<EngineRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .last()
            .cloned()
    }

    fn next_reply(&self) -> StubReply {
        self.replies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone())
    }
}

impl Default for StubTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SearchTransport for StubTransport {
    async fn search(&self, request: &EngineRequest) -> Result<Vec<u8>, TransportError> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request.clone());

        match self.next_reply() {
            StubReply::Body(body) => Ok(body),
            StubReply::Fail(error) => Err(error),
            StubReply::Hang => std::future::pending().await,
        }
    }

    fn name(&self) -> &str {
        "stub"
    }
}

// ============================================================================
// FIXTURES
// ============================================================================

/// A successful response with no hits.
pub fn empty_response() -> Value {
    json!({
        "took": 1,
        "timed_out": false,
        "_shards": {"total": 1, "successful": 1, "skipped": 0, "failed": 0},
        "hits": {"max_score": null, "hits": []}
    })
}

/// One hit with a small document source.
pub fn hit(index: &str, id: &str, score: f64) -> Value {
    json!({
        "_index": index,
        "_id": id,
        "_score": score,
        "_source": {"id": id, "text": format!("document {}", id)}
    })
}

/// A successful response whose hits carry `scores`, in the given order.
/// Hit ids are "doc-0", "doc-1", ...
pub fn scored_response(index: &str, scores: &[f64]) -> Value {
    let hits: Vec<Value> = scores
        .iter()
        .enumerate()
        .map(|(i, score)| hit(index, &format!("doc-{}", i), *score))
        .collect();
    let max_score = scores.iter().copied().fold(None, |acc: Option<f64>, s| {
        Some(acc.map_or(s, |a| a.max(s)))
    });

    json!({
        "took": 4,
        "timed_out": false,
        "hits": {"max_score": max_score, "hits": hits}
    })
}

/// An engine error body as returned with a non-2xx status.
pub fn engine_error(kind: &str, reason: &str, status: u16) -> Value {
    json!({
        "error": {"root_cause": [{"type": kind, "reason": reason}], "type": kind, "reason": reason},
        "status": status
    })
}

/// Default config with query-string search allowed.
pub fn internal_config() -> SearchConfig {
    SearchConfig {
        exposure: Exposure::Internal,
        ..SearchConfig::default()
    }
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod strategies {
    use proptest::prelude::*;

    /// Paging pairs the service must accept.
    pub fn valid_page() -> impl Strategy<Value = (i64, i64)> {
        (0i64..=1000, 0i64..=1000)
    }

    /// Any paging pair, biased towards the limits.
    pub fn any_page() -> impl Strategy<Value = (i64, i64)> {
        let edge = prop_oneof![
            Just(-1i64),
            Just(0i64),
            Just(999i64),
            Just(1000i64),
            Just(1001i64),
            Just(4000i64),
            Just(4001i64),
            Just(5000i64),
        ];
        let value = prop_oneof![edge, -10_000i64..10_000, any::<i64>()];
        (value.clone(), value)
    }

    /// Query text as users type it, including syntax characters.
    pub fn query_text() -> impl Strategy<Value = String> {
        prop_oneof![
            "[a-z]{1,12}",
            "[a-z]{1,8} [a-z]{1,8}",
            "[a-zA-Z0-9 *?:\"()-]{0,24}",
        ]
    }
}

// ============================================================================
// LOG CAPTURE
// ============================================================================

/// In-memory log sink for asserting on emitted events.
#[derive(Debug, Clone, Default)]
pub struct LogCapture {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl LogCapture {
    pub fn new() -> Self {
        Self::default()
    }

    /// A plain-text subscriber writing into this capture.
    pub fn subscriber(&self, filter: &str) -> impl tracing::Subscriber + Send + Sync {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new(filter))
            .with_writer(self.clone())
            .with_ansi(false)
            .finish()
    }

    pub fn contents(&self) -> String {
        let buf = self.buf.lock().unwrap_or_else(|e| e.into_inner());
        String::from_utf8_lossy(&buf).into_owned()
    }
}

impl std::io::Write for LogCapture {
    fn write(&mut self, data: &[u8]) -> std::io::Result<usize> {
        self.buf
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = LogCapture;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
