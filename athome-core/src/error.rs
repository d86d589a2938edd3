//! Error types for athome search operations

use thiserror::Error;

/// Request parameter errors. Raised before any engine I/O.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// The requested page is too large or too deep to serve.
    #[error("Requested page is too large or too deep (offset {offset}, size {size})")]
    PaginationOutOfRange { offset: i64, size: i64 },
}

/// Errors reaching the search engine.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The request could not be completed (connect, send, or encode failure).
    #[error("Search engine unreachable: {reason}")]
    Unreachable { reason: String },

    /// The engine answered with a non-success status.
    #[error("Search engine returned status {status}: {reason}")]
    Status {
        status: u16,
        /// Engine error type, e.g. `index_not_found_exception`, when the body
        /// carried one.
        error_type: Option<String>,
        /// Engine error reason or raw body text. Parse errors echo the query
        /// text back, so treat this as user content.
        reason: String,
    },
}

/// Errors decoding a successful engine response.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Malformed search response: {reason}")]
    MalformedResponse { reason: String },
}

/// Errors from the exposure policy around query-string search.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PolicyError {
    /// Query-string search was requested on a publicly exposed service.
    #[error("Generic query-string search is only available to internal callers")]
    GenericSearchNotPermitted,
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required configuration field: {field}")]
    MissingRequired { field: String },

    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Coarse classification of a [`SearchError`].
///
/// Lets a caller tell "bad request" from "engine unavailable" from
/// "unexpected response shape" without matching nested enums.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchErrorKind {
    Validation,
    Transport,
    Decode,
    Policy,
    Config,
}

/// Master error type for all search operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SearchError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Policy error: {0}")]
    Policy(#[from] PolicyError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

impl SearchError {
    pub fn kind(&self) -> SearchErrorKind {
        match self {
            SearchError::Validation(_) => SearchErrorKind::Validation,
            SearchError::Transport(_) => SearchErrorKind::Transport,
            SearchError::Decode(_) => SearchErrorKind::Decode,
            SearchError::Policy(_) => SearchErrorKind::Policy,
            SearchError::Config(_) => SearchErrorKind::Config,
        }
    }

    /// True when the caller sent a request this layer refuses to run.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self.kind(),
            SearchErrorKind::Validation | SearchErrorKind::Policy
        )
    }
}

/// Result type alias for search operations.
pub type SearchResult<T> = Result<T, SearchError>;

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display_mentions_page() {
        let err = ValidationError::PaginationOutOfRange {
            offset: 1001,
            size: 10,
        };
        let msg = format!("{}", err);
        assert!(msg.contains("too large or too deep"));
        assert!(msg.contains("1001"));
    }

    #[test]
    fn test_transport_error_display_status() {
        let err = TransportError::Status {
            status: 503,
            error_type: Some("search_phase_execution_exception".to_string()),
            reason: "no shards available".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("503"));
        assert!(msg.contains("no shards available"));
    }

    #[test]
    fn test_config_error_display_invalid_value() {
        let err = ConfigError::InvalidValue {
            field: "engine_url".to_string(),
            value: "ftp://x".to_string(),
            reason: "must be http or https".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("engine_url"));
        assert!(msg.contains("ftp://x"));
        assert!(msg.contains("must be http or https"));
    }

    #[test]
    fn test_search_error_from_variants() {
        let validation = SearchError::from(ValidationError::PaginationOutOfRange {
            offset: -1,
            size: 0,
        });
        assert_eq!(validation.kind(), SearchErrorKind::Validation);
        assert!(validation.is_client_error());

        let transport = SearchError::from(TransportError::Unreachable {
            reason: "connection refused".to_string(),
        });
        assert_eq!(transport.kind(), SearchErrorKind::Transport);
        assert!(!transport.is_client_error());

        let decode = SearchError::from(DecodeError::MalformedResponse {
            reason: "missing field `hits`".to_string(),
        });
        assert_eq!(decode.kind(), SearchErrorKind::Decode);

        let policy = SearchError::from(PolicyError::GenericSearchNotPermitted);
        assert_eq!(policy.kind(), SearchErrorKind::Policy);
        assert!(policy.is_client_error());

        let config = SearchError::from(ConfigError::MissingRequired {
            field: "password".to_string(),
        });
        assert_eq!(config.kind(), SearchErrorKind::Config);
    }
}
