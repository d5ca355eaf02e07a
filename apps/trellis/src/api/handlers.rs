//! # API Endpoint Handlers
//!
//! Every handler moves its store call onto the blocking pool; the store and
//! its executors are synchronous.

use super::{
    AppState,
    types::{
        ErrorResponse, HealthResponse, IngestRequest, PageParams, PredicateParams, SearchParams,
        StatusResponse, SubjectParams, required,
    },
};
use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use trellis_core::primitives::MSG_STATEMENT_NOT_FOUND;
use trellis_core::{
    CreatedStatement, DeleteOutcome, IngestReport, NewStatement, Statement, StatementPage,
    StatementStore, StoreError,
};

// =============================================================================
// ERROR MAPPING
// =============================================================================

/// A failed request: status plus `{"error": ...}` body.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        let status = match &e {
            StoreError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            StoreError::Backend(_) | StoreError::IngestInterrupted { .. } => {
                StatusCode::BAD_GATEWAY
            }
            StoreError::MalformedRecord(_)
            | StoreError::Serialization(_)
            | StoreError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!(error = %e, "request failed");
        }
        Self::new(status, e.to_string())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::new(rejection.status(), rejection.body_text())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(rejection.status(), rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorResponse::new(self.message))).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

/// Run a store operation on the blocking pool.
async fn with_store<T, F>(state: &AppState, op: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&StatementStore) -> Result<T, StoreError> + Send + 'static,
{
    let store = Arc::clone(&state.store);
    tokio::task::spawn_blocking(move || op(store.as_ref()))
        .await
        .map_err(|e| {
            tracing::error!("store task failed: {}", e);
            ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "store task failed")
        })?
        .map_err(ApiError::from)
}

// =============================================================================
// HEALTH / STATUS
// =============================================================================

/// Liveness check.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::default())
}

/// Backend name and counts.
pub async fn status_handler(State(state): State<AppState>) -> ApiResult<StatusResponse> {
    let status = with_store(&state, |store| {
        Ok(StatusResponse {
            backend: store.backend_name().to_string(),
            statement_count: store.statement_count()?,
            identifier_count: store.identifier_count(None)?,
        })
    })
    .await?;
    Ok(Json(status))
}

// =============================================================================
// READS
// =============================================================================

pub async fn subjects_handler(State(state): State<AppState>) -> ApiResult<Vec<String>> {
    Ok(Json(with_store(&state, StatementStore::list_subjects).await?))
}

pub async fn statements_handler(
    State(state): State<AppState>,
    params: Result<Query<PageParams>, QueryRejection>,
) -> ApiResult<StatementPage> {
    let Query(params) = params?;
    let page = params.page()?;
    let result = with_store(&state, move |store| store.paginated_statements(page)).await?;
    Ok(Json(result))
}

pub async fn by_subject_handler(
    State(state): State<AppState>,
    params: Result<Query<SubjectParams>, QueryRejection>,
) -> ApiResult<StatementPage> {
    let Query(params) = params?;
    let page = params.page()?;
    let identifier = required(params.identifier, "identifier")?;
    let result = with_store(&state, move |store| {
        store.statements_by_subject(&identifier, page)
    })
    .await?;
    Ok(Json(result))
}

pub async fn by_predicate_handler(
    State(state): State<AppState>,
    params: Result<Query<PredicateParams>, QueryRejection>,
) -> ApiResult<StatementPage> {
    let Query(params) = params?;
    let page = params.page()?;
    let predicate = required(params.predicate, "predicate")?;
    let result = with_store(&state, move |store| {
        store.statements_by_predicate(&predicate, page)
    })
    .await?;
    Ok(Json(result))
}

pub async fn search_handler(
    State(state): State<AppState>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> ApiResult<Vec<Statement>> {
    let Query(params) = params?;
    let q = required(params.q, "q")?;
    Ok(Json(
        with_store(&state, move |store| store.search_statements(&q)).await?,
    ))
}

/// Fetch one statement; 404 when absent.
pub async fn statement_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Statement> {
    match with_store(&state, move |store| store.statement(&id)).await? {
        Some(statement) => Ok(Json(statement)),
        None => Err(ApiError::new(StatusCode::NOT_FOUND, MSG_STATEMENT_NOT_FOUND)),
    }
}

// =============================================================================
// WRITES
// =============================================================================

pub async fn create_handler(
    State(state): State<AppState>,
    input: Result<Json<NewStatement>, JsonRejection>,
) -> ApiResult<CreatedStatement> {
    let Json(input) = input?;
    Ok(Json(
        with_store(&state, move |store| store.create_statement(input)).await?,
    ))
}

/// Delete one statement. A missing id is `success: false` with 200.
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<DeleteOutcome> {
    Ok(Json(
        with_store(&state, move |store| store.delete_statement(&id)).await?,
    ))
}

pub async fn ingest_handler(
    State(state): State<AppState>,
    request: Result<Json<IngestRequest>, JsonRejection>,
) -> ApiResult<IngestReport> {
    let Json(request) = request?;
    let report = with_store(&state, move |store| {
        store.ingest(&request.data, request.source_name.as_deref())
    })
    .await?;
    Ok(Json(report))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_map_to_statuses() {
        let cases = [
            (StoreError::InvalidArgument("x".into()), StatusCode::BAD_REQUEST),
            (StoreError::Backend("x".into()), StatusCode::BAD_GATEWAY),
            (
                StoreError::IngestInterrupted {
                    committed: 1,
                    reason: "x".into(),
                },
                StatusCode::BAD_GATEWAY,
            ),
            (
                StoreError::MalformedRecord("x".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                StoreError::Serialization("x".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                StoreError::Config("x".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (error, status) in cases {
            assert_eq!(ApiError::from(error).status, status);
        }
    }
}
