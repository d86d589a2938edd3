//! OpenSearch / Elasticsearch HTTP transport

use async_trait::async_trait;
use athome_core::{
    ConfigError, EngineRequest, SearchConfig, SearchResult, SearchTransport, TransportError,
};
use reqwest::{Client, Url};
use serde::Deserialize;

/// Longest engine error reason kept, in bytes.
pub const MAX_REASON_LEN: usize = 512;

/// reqwest-backed transport for the engine's `_search` endpoint.
///
/// One attempt per call; no timeout or retry is added here. Callers bound the
/// call by dropping the future.
#[derive(Clone)]
pub struct OpenSearchTransport {
    client: Client,
    base_url: Url,
    username: Option<String>,
    password: Option<String>,
}

impl OpenSearchTransport {
    /// Create a transport from validated configuration.
    pub fn new(config: &SearchConfig) -> SearchResult<Self> {
        config.validate()?;
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| ConfigError::InvalidValue {
                field: "user_agent".to_string(),
                value: config.user_agent.clone(),
                reason: e.to_string(),
            })?;
        Self::with_client(client, config)
    }

    /// Create a transport around an existing client, e.g. one with custom TLS
    /// or pooling settings.
    pub fn with_client(client: Client, config: &SearchConfig) -> SearchResult<Self> {
        let base_url = Url::parse(config.engine_url.trim()).map_err(|e| {
            ConfigError::InvalidValue {
                field: "engine_url".to_string(),
                value: config.engine_url.clone(),
                reason: e.to_string(),
            }
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ConfigError::InvalidValue {
                field: "engine_url".to_string(),
                value: config.engine_url.clone(),
                reason: "not a base URL".to_string(),
            }
            .into());
        }

        Ok(Self {
            client,
            base_url,
            username: config.username.clone(),
            password: config.password.clone(),
        })
    }

    /// `{base}/{index}/_search`, with the index as one percent-encoded path
    /// segment.
    fn search_url(&self, index: &str) -> Result<Url, TransportError> {
        check_index_name(index)?;

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| TransportError::Unreachable {
                reason: format!("engine URL {} cannot take a path", self.base_url),
            })?
            .pop_if_empty()
            .push(index)
            .push("_search");
        Ok(url)
    }
}

/// Index names are single path segments. Dot segments and separators would
/// retarget the request.
fn check_index_name(index: &str) -> Result<(), TransportError> {
    let invalid = index.is_empty()
        || index == "."
        || index == ".."
        || index.contains(['/', '\\']);
    if invalid {
        return Err(TransportError::Unreachable {
            reason: format!("invalid index name {:?}", index),
        });
    }
    Ok(())
}

#[async_trait]
impl SearchTransport for OpenSearchTransport {
    async fn search(&self, request: &EngineRequest) -> Result<Vec<u8>, TransportError> {
        let url = self.search_url(&request.index)?;

        let mut builder = self
            .client
            .post(url)
            .query(&[("track_total_hits", request.track_total_hits)])
            .json(&request.body);

        if let Some(username) = &self.username {
            builder = builder.basic_auth(username, self.password.as_ref());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::Unreachable {
                reason: format!("HTTP request failed: {}", e),
            })?;

        let status = response.status();
        if status.is_success() {
            let body = response
                .bytes()
                .await
                .map_err(|e| TransportError::Unreachable {
                    reason: format!("Failed to read response body: {}", e),
                })?;
            return Ok(body.to_vec());
        }

        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        let (error_type, reason) = engine_error(&error_text);

        Err(TransportError::Status {
            status: status.as_u16(),
            error_type,
            reason,
        })
    }

    fn name(&self) -> &str {
        "opensearch"
    }
}

/// Engine error envelope: `{"error": {"type": ..., "reason": ...}, "status": N}`.
/// Some proxies and older versions send `"error"` as a plain string.
#[derive(Debug, Deserialize)]
struct EngineErrorBody {
    error: EngineErrorDetail,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum EngineErrorDetail {
    Structured {
        #[serde(rename = "type")]
        kind: String,
        #[serde(default)]
        reason: Option<String>,
    },
    Plain(String),
}

/// Split an error body into the engine's error type and a bounded reason.
fn engine_error(text: &str) -> (Option<String>, String) {
    let (error_type, reason) = match serde_json::from_str::<EngineErrorBody>(text) {
        Ok(EngineErrorBody {
            error: EngineErrorDetail::Structured { kind, reason },
        }) => {
            let reason = reason.unwrap_or_else(|| kind.clone());
            (Some(kind), reason)
        }
        Ok(EngineErrorBody {
            error: EngineErrorDetail::Plain(message),
        }) => (None, message),
        Err(_) => (None, text.to_string()),
    };
    (error_type, truncate_reason(reason))
}

fn truncate_reason(mut reason: String) -> String {
    if reason.len() > MAX_REASON_LEN {
        let mut end = MAX_REASON_LEN;
        while !reason.is_char_boundary(end) {
            end -= 1;
        }
        reason.truncate(end);
        reason.push_str("...");
    }
    reason
}

impl std::fmt::Debug for OpenSearchTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenSearchTransport")
            .field("base_url", &self.base_url.as_str())
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}
