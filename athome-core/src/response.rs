//! Engine response types and caller-facing projections

use crate::error::DecodeError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::value::RawValue;

// ============================================================================
// ENGINE RESPONSE
// ============================================================================

/// Normalized search response.
///
/// Mirrors the engine's `_search` body: `took`, `timed_out`, and `hits`.
/// Shard statistics and aggregations are not decoded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Engine-side execution time in milliseconds.
    #[serde(rename = "took")]
    pub took_ms: u64,

    /// Whether the engine gave up before all shards answered.
    pub timed_out: bool,

    pub hits: SearchHits,
}

/// Hit list plus ranking metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchHits {
    /// Total hit count.
    ///
    /// Requests are sent with total tracking disabled, so this is usually
    /// absent and never reliable. Do not page or display counts off it.
    #[serde(
        default,
        deserialize_with = "deserialize_total",
        skip_serializing_if = "Option::is_none"
    )]
    pub total: Option<TotalHits>,

    /// Best score in the page. Null when results are sorted by a field.
    #[serde(default)]
    pub max_score: Option<f64>,

    /// Hits in engine order.
    #[serde(default)]
    pub hits: Vec<SearchHit>,
}

/// Total hit count as reported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TotalHits {
    pub value: u64,
    pub relation: TotalRelation,
}

/// Whether [`TotalHits::value`] is exact or a lower bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TotalRelation {
    Eq,
    Gte,
}

/// Older engines report `total` as a bare number.
fn deserialize_total<'de, D>(deserializer: D) -> Result<Option<TotalHits>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Object(TotalHits),
        Count(u64),
    }

    Ok(
        Option::<Repr>::deserialize(deserializer)?.map(|repr| match repr {
            Repr::Object(total) => total,
            Repr::Count(value) => TotalHits {
                value,
                relation: TotalRelation::Eq,
            },
        }),
    )
}

/// One matched document.
///
/// The document body is kept as raw JSON; its schema belongs to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    #[serde(rename = "_index")]
    pub index: String,

    #[serde(rename = "_id")]
    pub id: String,

    /// Relevance score. Null when the query sorts by a field.
    #[serde(rename = "_score", default)]
    pub score: Option<f64>,

    /// Undecoded `_source` payload. Absent when source is disabled.
    #[serde(rename = "_source", default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Box<RawValue>>,
}

impl SearchHit {
    /// Raw bytes of the document source, if any.
    pub fn raw_source(&self) -> Option<&[u8]> {
        self.source.as_deref().map(|raw| raw.get().as_bytes())
    }

    /// Decode the document source into a caller-owned schema.
    pub fn source_as<T: DeserializeOwned>(&self) -> Result<T, DecodeError> {
        let raw = self
            .source
            .as_deref()
            .ok_or_else(|| DecodeError::MalformedResponse {
                reason: format!("hit {} has no _source", self.id),
            })?;
        serde_json::from_str(raw.get()).map_err(|e| DecodeError::MalformedResponse {
            reason: format!("hit {} _source: {}", self.id, e),
        })
    }
}

impl SearchResponse {
    /// Number of hits in this page.
    pub fn len(&self) -> usize {
        self.hits.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.hits.is_empty()
    }
}

// ============================================================================
// CALLER-FACING PROJECTIONS
// ============================================================================

/// Account reference attached to a post result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserResult {
    pub did: String,
    pub handle: String,
}

/// Post result as served to clients.
///
/// Assembled outside this layer from a [`SearchHit`]; resolving `tid`, `cid`
/// and the author's handle is the caller's job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostSearchResult {
    pub tid: String,
    pub cid: String,
    pub user: UserResult,
    pub post: serde_json::Value,
}
