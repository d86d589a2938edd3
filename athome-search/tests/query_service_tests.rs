//! Query Service integration tests
//!
//! Drives every public operation through a stub engine and checks the query
//! that reached the engine plus the decoded result.

use athome_search::{
    Exposure, QueryService, SearchConfig, SearchError, SearchErrorKind, TYPEAHEAD_SIZE,
};
use athome_test_utils::{
    empty_response, internal_config, scored_response, StubReply, StubTransport, TransportError,
    ValidationError,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// TEST CONFIGURATION
// ============================================================================

fn service_with(stub: &Arc<StubTransport>, config: SearchConfig) -> QueryService {
    QueryService::new(stub.clone(), config)
}

fn public_service(stub: &Arc<StubTransport>) -> QueryService {
    service_with(stub, SearchConfig::default())
}

// ============================================================================
// POST SEARCH
// ============================================================================

#[tokio::test]
async fn test_post_search_end_to_end() {
    let stub = Arc::new(StubTransport::returning(scored_response(
        "posts",
        &[1.0, 0.5],
    )));
    let service = public_service(&stub);

    let resp = service.search_posts("posts", "cat", 0, 20).await.unwrap();

    let request = stub.last_request().unwrap();
    assert_eq!(request.index, "posts");
    assert!(!request.track_total_hits);
    assert_eq!(request.body["query"]["match"]["everything"]["query"], "cat");
    assert_eq!(request.body["sort"]["created_at"]["order"], "desc");
    assert_eq!(request.body["size"], 20);
    assert_eq!(request.body["from"], 0);

    let scores: Vec<Option<f64>> = resp.hits.hits.iter().map(|h| h.score).collect();
    assert_eq!(scores, vec![Some(1.0), Some(0.5)]);
    let ids: Vec<&str> = resp.hits.hits.iter().map(|h| h.id.as_str()).collect();
    assert_eq!(ids, vec!["doc-0", "doc-1"]);
    assert_eq!(resp.hits.max_score, Some(1.0));
}

#[tokio::test]
async fn test_post_search_keeps_engine_order() {
    // Sorted by date, so scores need not descend.
    let stub = Arc::new(StubTransport::returning(scored_response(
        "posts",
        &[0.1, 3.0, 0.7],
    )));
    let service = public_service(&stub);

    let resp = service.search_posts("posts", "cat", 0, 3).await.unwrap();
    let ids: Vec<&str> = resp.hits.hits.iter().map(|h| h.id.as_str()).collect();
    assert_eq!(ids, vec!["doc-0", "doc-1", "doc-2"]);
}

#[tokio::test]
async fn test_post_search_future_filter_from_config() {
    let stub = Arc::new(StubTransport::new());
    let config = SearchConfig {
        exclude_future_posts: true,
        ..SearchConfig::default()
    };
    let service = service_with(&stub, config);

    service.search_posts("posts", "cat", 0, 10).await.unwrap();

    let body = stub.last_request().unwrap().body;
    assert_eq!(
        body["query"]["bool"]["filter"][0],
        json!({"range": {"created_at": {"lte": "now"}}})
    );
    assert_eq!(body["sort"]["created_at"]["order"], "desc");
}

#[tokio::test]
async fn test_index_argument_wins_over_config_defaults() {
    let stub = Arc::new(StubTransport::new());
    let config = SearchConfig {
        posts_index: "posts-v2".to_string(),
        profiles_index: "profiles-v2".to_string(),
        ..SearchConfig::default()
    };
    let service = service_with(&stub, config);

    service.search_posts("posts-archive", "cat", 0, 10).await.unwrap();
    let profiles_index = service.config().profiles_index.clone();
    service.typeahead_profiles(&profiles_index, "al").await.unwrap();

    let indexes: Vec<String> = stub.requests().into_iter().map(|r| r.index).collect();
    assert_eq!(indexes, vec!["posts-archive", "profiles-v2"]);
}

// ============================================================================
// VALIDATION
// ============================================================================

#[tokio::test]
async fn test_out_of_range_paging_fails_before_io() {
    let stub = Arc::new(StubTransport::new());
    let service = public_service(&stub);

    for (offset, size) in [(1001, 10), (0, 1001), (-1, 10), (10, -1), (1000, 4001)] {
        let err = service
            .search_posts("posts", "cat", offset, size)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            SearchError::Validation(ValidationError::PaginationOutOfRange { offset, size })
        );

        let err = service
            .search_profiles("profiles", "cat", offset, size)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), SearchErrorKind::Validation);
    }

    assert_eq!(stub.call_count(), 0);
}

#[tokio::test]
async fn test_boundary_paging_is_sent() {
    let stub = Arc::new(StubTransport::new());
    let service = public_service(&stub);

    service.search_posts("posts", "cat", 1000, 0).await.unwrap();
    service.search_posts("posts", "cat", 0, 1000).await.unwrap();
    service.search_profiles("profiles", "cat", 1000, 1000).await.unwrap();

    let requests = stub.requests();
    assert_eq!(requests.len(), 3);
    assert_eq!(requests[0].body["from"], 1000);
    assert_eq!(requests[0].body["size"], 0);
    assert_eq!(requests[2].body["size"], 1000);
}

// ============================================================================
// PROFILE SEARCH
// ============================================================================

#[tokio::test]
async fn test_profile_search_boosts_without_filtering() {
    let stub = Arc::new(StubTransport::new());
    let service = public_service(&stub);

    service
        .search_profiles("profiles", "alice", 20, 10)
        .await
        .unwrap();

    let body = stub.last_request().unwrap().body;
    let bool_query = &body["query"]["bool"];
    assert_eq!(bool_query["must"][0]["match"]["everything"]["query"], "alice");
    assert_eq!(
        bool_query["should"],
        json!([{"term": {"has_avatar": true}}, {"term": {"has_banner": true}}])
    );
    assert_eq!(bool_query["boost"], 1.0);
    assert!(bool_query.get("filter").is_none());
    assert!(bool_query.get("minimum_should_match").is_none());
    assert_eq!(body["from"], 20);
    assert_eq!(body["size"], 10);
    assert!(body.get("sort").is_none());
}

// ============================================================================
// TYPEAHEAD
// ============================================================================

#[tokio::test]
async fn test_typeahead_fixed_size_and_fields() {
    let stub = Arc::new(StubTransport::new());
    let service = public_service(&stub);

    service.typeahead_profiles("profiles", "al").await.unwrap();

    let body = stub.last_request().unwrap().body;
    assert_eq!(body["size"], TYPEAHEAD_SIZE);
    assert!(body.get("from").is_none());
    assert_eq!(body["query"]["multi_match"]["type"], "bool_prefix");
    assert_eq!(
        body["query"]["multi_match"]["fields"],
        json!(["typeahead", "typeahead._2gram", "typeahead._3gram"])
    );
}

// ============================================================================
// GENERIC SEARCH POLICY
// ============================================================================

#[tokio::test]
async fn test_generic_search_refused_on_public_service() {
    let stub = Arc::new(StubTransport::new());
    let service = public_service(&stub);

    let err = service.internal().unwrap_err();
    assert_eq!(SearchError::from(err).kind(), SearchErrorKind::Policy);
    assert_eq!(stub.call_count(), 0);
}

#[tokio::test]
async fn test_generic_search_on_internal_service() {
    let stub = Arc::new(StubTransport::new());
    let service = service_with(&stub, internal_config());
    assert_eq!(service.config().exposure, Exposure::Internal);

    service
        .internal()
        .unwrap()
        .search_generic("posts", "text:cat AND lang:en")
        .await
        .unwrap();

    let body = stub.last_request().unwrap().body;
    let qs = &body["query"]["query_string"];
    assert_eq!(qs["query"], "text:cat AND lang:en");
    assert_eq!(qs["default_operator"], "and");
    assert_eq!(qs["allow_leading_wildcard"], false);
    assert_eq!(qs["lenient"], true);
}

// ============================================================================
// ERROR PROPAGATION
// ============================================================================

#[tokio::test]
async fn test_transport_failure_is_returned() {
    let stub = Arc::new(StubTransport::failing(TransportError::Unreachable {
        reason: "connection refused".to_string(),
    }));
    let service = public_service(&stub);

    let err = service.search_posts("posts", "cat", 0, 10).await.unwrap_err();
    assert_eq!(err.kind(), SearchErrorKind::Transport);
    assert!(!err.is_client_error());

    // One attempt, no retry.
    assert_eq!(stub.call_count(), 1);

    // The service stays usable after a failure.
    stub.push_json(empty_response());
    let resp = service.search_posts("posts", "cat", 0, 10).await.unwrap();
    assert!(resp.is_empty());
}

#[tokio::test]
async fn test_status_failure_is_transport_error() {
    let stub = Arc::new(StubTransport::failing(TransportError::Status {
        status: 503,
        error_type: Some("cluster_block_exception".to_string()),
        reason: "index [posts] blocked by: [FORBIDDEN/8/index write]".to_string(),
    }));
    let service = public_service(&stub);

    let err = service
        .typeahead_profiles("profiles", "al")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SearchError::Transport(TransportError::Status { status: 503, .. })
    ));
}

#[tokio::test]
async fn test_malformed_body_is_decode_error() {
    let stub = Arc::new(StubTransport::with_fallback(StubReply::Body(
        br#"{"acknowledged": true}"#.to_vec(),
    )));
    let service = public_service(&stub);

    let err = service
        .search_profiles("profiles", "alice", 0, 10)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), SearchErrorKind::Decode);
}

#[tokio::test]
async fn test_error_kinds_are_distinct() {
    let stub = Arc::new(StubTransport::new());
    stub.push(StubReply::Fail(TransportError::Unreachable {
        reason: "reset".to_string(),
    }));
    stub.push(StubReply::Body(b"not json".to_vec()));
    let service = public_service(&stub);

    let validation = service.search_posts("posts", "x", -5, 1).await.unwrap_err();
    let transport = service.search_posts("posts", "x", 0, 1).await.unwrap_err();
    let decode = service.search_posts("posts", "x", 0, 1).await.unwrap_err();
    let ok = service.search_posts("posts", "x", 0, 1).await;

    assert_eq!(validation.kind(), SearchErrorKind::Validation);
    assert_eq!(transport.kind(), SearchErrorKind::Transport);
    assert_eq!(decode.kind(), SearchErrorKind::Decode);
    assert!(ok.is_ok());
}

// ============================================================================
// CANCELLATION AND CONCURRENCY
// ============================================================================

#[tokio::test]
async fn test_caller_timeout_cancels_engine_call() {
    let stub = Arc::new(StubTransport::hanging());
    let service = public_service(&stub);

    let result = tokio::time::timeout(
        Duration::from_millis(50),
        service.search_posts("posts", "cat", 0, 10),
    )
    .await;

    assert!(result.is_err());
    assert_eq!(stub.call_count(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_calls_share_nothing() {
    let stub = Arc::new(StubTransport::new());
    let service = public_service(&stub);

    let mut handles = Vec::new();
    for i in 0..16i64 {
        let service = service.clone();
        handles.push(tokio::spawn(async move {
            let text = format!("query-{}", i);
            service.search_posts("posts", &text, i, 10).await
        }));
    }
    for handle in handles {
        assert!(handle.await.unwrap().is_ok());
    }

    let mut texts: Vec<String> = stub
        .requests()
        .iter()
        .map(|r| {
            let text = r.body["query"]["match"]["everything"]["query"]
                .as_str()
                .unwrap()
                .to_string();
            let from = r.body["from"].as_i64().unwrap();
            assert_eq!(text, format!("query-{}", from));
            text
        })
        .collect();
    texts.sort();
    texts.dedup();
    assert_eq!(texts.len(), 16);
}
