//! Response decoding

use athome_core::{DecodeError, SearchResponse};
use serde_json::error::Category;

/// Decode a 2xx `_search` body.
///
/// The error carries the parser's position and the body length, not the body
/// itself, since bodies contain indexed user content.
pub fn decode_response(body: &[u8]) -> Result<SearchResponse, DecodeError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(DecodeError::MalformedResponse {
            reason: "empty response body".to_string(),
        });
    }

    serde_json::from_slice(body).map_err(|e| {
        let kind = match e.classify() {
            Category::Syntax => "invalid JSON",
            Category::Data => "unexpected response shape",
            Category::Eof => "truncated JSON",
            Category::Io => "read failure",
        };
        DecodeError::MalformedResponse {
            reason: format!(
                "{} at line {} column {} ({} bytes)",
                kind,
                e.line(),
                e.column(),
                body.len()
            ),
        }
    })
}
