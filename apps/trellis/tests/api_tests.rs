//! Integration tests for the Trellis HTTP API.
//!
//! Uses axum-test to drive the router without binding a socket.

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{Value, json};
use trellis::api::{
    AppState, ErrorResponse, HealthResponse, IngestRequest, StatusResponse, create_router,
};
use trellis_core::{
    CreatedStatement, DeleteOutcome, IngestReport, MemoryGraph, Statement, StatementPage,
    StatementStore, SteppingClock,
};

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

fn create_test_server() -> TestServer {
    let store = StatementStore::with_clock(MemoryGraph::new(), SteppingClock::from_epoch());
    TestServer::new(create_router(AppState::new(store))).expect("test server")
}

/// Server preloaded with four statements over three subjects.
async fn create_populated_test_server() -> TestServer {
    let server = create_test_server();
    let request = IngestRequest {
        data: "alice,knows,bob\nalice,likes,tea\nbob,knows,carol\ncarol,likes,Alice's tea".into(),
        source_name: Some("fixture".into()),
    };
    server.post("/ingest").json(&request).await.assert_status_ok();
    server
}

async fn create(server: &TestServer, body: Value) -> CreatedStatement {
    let response = server.post("/statements").json(&body).await;
    response.assert_status_ok();
    response.json()
}

// =============================================================================
// HEALTH / STATUS
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let server = create_test_server();

    let response = server.get("/health").await;

    response.assert_status_ok();
    let health: HealthResponse = response.json();
    assert_eq!(health.status, "ok");
    assert_eq!(health.version, env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_status_counts() {
    let server = create_populated_test_server().await;

    let status: StatusResponse = server.get("/status").await.json();
    assert_eq!(status.backend, "memory");
    assert_eq!(status.statement_count, 4);
    // alice, bob, tea, carol, "Alice's tea"
    assert_eq!(status.identifier_count, 5);
}

// =============================================================================
// CREATE / GET / DELETE
// =============================================================================

#[tokio::test]
async fn test_create_then_get_round_trip() {
    let server = create_test_server();

    let created = create(
        &server,
        json!({"subject_identifier": "alice", "predicate": "knows", "object_value": "bob"}),
    )
    .await;
    assert_eq!(created.object_value, json!("bob"));
    assert!(created.source_id.is_none());

    let response = server.get(&format!("/statements/{}", created.id)).await;
    response.assert_status_ok();
    let statement: Statement = response.json();
    assert_eq!(statement.subject_identifier, "alice");
    assert_eq!(statement.predicate, "knows");
    assert_eq!(statement.object_json(), Some(json!("bob")));
}

#[tokio::test]
async fn test_create_echoes_structured_object() {
    let server = create_test_server();

    let created = create(
        &server,
        json!({
            "subject_identifier": "alice",
            "predicate": "profile",
            "object_value": {"age": 30, "tags": ["a", "b"]},
            "source_id": "hr",
            "statement_timestamp": "2024-02-29T12:00:00Z"
        }),
    )
    .await;
    assert_eq!(created.object_value, json!({"age": 30, "tags": ["a", "b"]}));
    assert_eq!(created.statement_timestamp, "2024-02-29T12:00:00Z");

    let statement: Statement = server
        .get(&format!("/statements/{}", created.id))
        .await
        .json();
    assert_eq!(statement.object_value, r#"{"age":30,"tags":["a","b"]}"#);
    assert_eq!(statement.source_id.as_deref(), Some("hr"));
}

#[tokio::test]
async fn test_create_with_bad_timestamp_is_400() {
    let server = create_test_server();

    let response = server
        .post("/statements")
        .json(&json!({
            "subject_identifier": "alice",
            "predicate": "born",
            "object_value": 1990,
            "statement_timestamp": "soon"
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let error: ErrorResponse = response.json();
    assert!(error.error.contains("RFC 3339"));
}

#[tokio::test]
async fn test_missing_statement_is_404() {
    let server = create_test_server();

    let response = server.get("/statements/01ARZ3NDEKTSV4RRFFQ69G5FAV").await;

    response.assert_status(StatusCode::NOT_FOUND);
    let error: ErrorResponse = response.json();
    assert_eq!(error.error, "Statement not found");
}

#[tokio::test]
async fn test_delete_twice() {
    let server = create_test_server();
    let created = create(
        &server,
        json!({"subject_identifier": "a", "predicate": "p", "object_value": "b"}),
    )
    .await;
    let path = format!("/statements/{}", created.id);

    let first: DeleteOutcome = server.delete(&path).await.json();
    assert!(first.success);
    assert_eq!(first.message, "Statement deleted");

    let second = server.delete(&path).await;
    second.assert_status_ok();
    let second: DeleteOutcome = second.json();
    assert!(!second.success);
    assert_eq!(second.message, "Statement not found");
    assert_eq!(second.id, created.id);

    server.get(&path).await.assert_status(StatusCode::NOT_FOUND);
}

// =============================================================================
// PAGINATION
// =============================================================================

#[tokio::test]
async fn test_statements_default_page() {
    let server = create_test_server();
    for i in 0..12 {
        create(
            &server,
            json!({"subject_identifier": "s", "predicate": "p", "object_value": i}),
        )
        .await;
    }

    let page: StatementPage = server.get("/statements").await.json();
    assert_eq!(page.statements.len(), 10);
    assert_eq!(page.total_count, 12);
    assert!(page.has_more);
    assert_eq!(page.statements[0].object_value, "11");

    let rest: StatementPage = server
        .get("/statements")
        .add_query_param("offset", 10)
        .await
        .json();
    assert_eq!(rest.statements.len(), 2);
    assert!(!rest.has_more);
}

#[tokio::test]
async fn test_negative_offset_is_400() {
    let server = create_test_server();

    let response = server
        .get("/statements")
        .add_query_param("limit", 5)
        .add_query_param("offset", -1)
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_non_numeric_limit_is_json_400() {
    let server = create_test_server();

    let response = server
        .get("/statements")
        .add_query_param("limit", "abc")
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let error: ErrorResponse = response.json();
    assert!(!error.error.is_empty());
}

#[tokio::test]
async fn test_create_missing_field_is_json_error() {
    let server = create_test_server();

    let response = server
        .post("/statements")
        .json(&json!({"predicate": "knows", "object_value": "bob"}))
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let error: ErrorResponse = response.json();
    assert!(error.error.contains("subject_identifier"));
}

#[tokio::test]
async fn test_ingest_malformed_json_is_json_400() {
    let server = create_test_server();

    let response = server
        .post("/ingest")
        .content_type("application/json")
        .bytes("{\"data\": ".into())
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let error: ErrorResponse = response.json();
    assert!(!error.error.is_empty());
}

#[tokio::test]
async fn test_statements_by_subject() {
    let server = create_populated_test_server().await;

    let response = server
        .get("/statements/by-subject")
        .add_query_param("identifier", "alice")
        .add_query_param("limit", 1)
        .await;
    response.assert_status_ok();
    let page: StatementPage = response.json();
    assert_eq!(page.total_count, 2);
    assert_eq!(page.statements.len(), 1);
    assert!(page.has_more);

    let nobody: StatementPage = server
        .get("/statements/by-subject")
        .add_query_param("identifier", "dave")
        .await
        .json();
    assert_eq!(nobody, StatementPage::empty());
}

#[tokio::test]
async fn test_statements_by_subject_requires_identifier() {
    let server = create_test_server();

    let response = server.get("/statements/by-subject").await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_statements_by_predicate() {
    let server = create_populated_test_server().await;

    let page: StatementPage = server
        .get("/statements/by-predicate")
        .add_query_param("predicate", "likes")
        .await
        .json();
    assert_eq!(page.total_count, 2);
    assert!(!page.has_more);
    assert!(page.statements.iter().all(|s| s.predicate == "likes"));
}

// =============================================================================
// SEARCH / SUBJECTS
// =============================================================================

#[tokio::test]
async fn test_search_is_case_insensitive() {
    let server = create_populated_test_server().await;

    let found: Vec<Statement> = server
        .get("/statements/search")
        .add_query_param("q", "ALICE")
        .await
        .json();
    // two statements with subject alice, one with object "Alice's tea"
    assert_eq!(found.len(), 3);
}

#[tokio::test]
async fn test_search_empty_query_matches_all() {
    let server = create_populated_test_server().await;

    let found: Vec<Statement> = server
        .get("/statements/search")
        .add_query_param("q", "")
        .await
        .json();
    assert_eq!(found.len(), 4);
}

#[tokio::test]
async fn test_search_requires_q() {
    let server = create_test_server();

    let response = server.get("/statements/search").await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let error: ErrorResponse = response.json();
    assert!(error.error.contains("'q'"));
}

#[tokio::test]
async fn test_subjects_sorted() {
    let server = create_populated_test_server().await;

    let subjects: Vec<String> = server.get("/subjects").await.json();
    assert_eq!(subjects, vec!["alice", "bob", "carol"]);
}

// =============================================================================
// INGEST
// =============================================================================

#[tokio::test]
async fn test_ingest_example_payload() {
    let server = create_test_server();

    let response = server
        .post("/ingest")
        .json(&json!({"data": "a,likes,b\nbadline\nc, knows , d", "source_name": "upload"}))
        .await;

    response.assert_status_ok();
    let report: IngestReport = response.json();
    assert!(report.success);
    assert_eq!(report.message, "Ingested 2 statements");
    assert_eq!(report.entities_created, 2);
    assert_eq!(report.statements_created, 2);

    let page: StatementPage = server.get("/statements").await.json();
    assert!(
        page.statements
            .iter()
            .all(|s| s.source_id.as_deref() == Some("upload"))
    );
}

#[tokio::test]
async fn test_ingest_without_source_name() {
    let server = create_test_server();

    let report: IngestReport = server
        .post("/ingest")
        .json(&json!({"data": "x,y,z"}))
        .await
        .json();
    assert_eq!(report.statements_created, 1);

    let page: StatementPage = server.get("/statements").await.json();
    assert_eq!(page.statements[0].source_id, None);
}
