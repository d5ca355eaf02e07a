//! # Trellis HTTP API Module
//!
//! The Query Facade: an axum REST API over the statement store.
//!
//! ## Endpoints
//!
//! - `GET /health` - Health check
//! - `GET /status` - Backend and counts
//! - `GET /subjects` - Distinct subjects, ascending
//! - `GET /statements?limit&offset` - Newest-first page of all statements
//! - `GET /statements/by-subject?identifier&limit&offset` - Page for one subject
//! - `GET /statements/by-predicate?predicate&limit&offset` - Page for one predicate
//! - `GET /statements/search?q` - Containment search (max 100)
//! - `GET /statements/{id}` - One statement
//! - `POST /statements` - Create a statement
//! - `DELETE /statements/{id}` - Delete a statement
//! - `POST /ingest` - Bulk `subject,predicate,object` ingest
//!
//! ## Server Configuration (Environment Variables)
//!
//! - `TRELLIS_CORS_ORIGINS`: Comma-separated list of allowed origins, or "*" for all (default: localhost only)
//! - `TRELLIS_RATE_LIMIT`: Requests per second (default: 100, 0 to disable)

mod handlers;
mod middleware;
mod types;

pub use handlers::ApiError;
pub use middleware::{create_rate_limiter, get_rate_limit_from_env};
pub use types::{
    ErrorResponse, HealthResponse, IngestRequest, PageParams, PredicateParams, SearchParams,
    StatusResponse, SubjectParams,
};

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware as axum_middleware,
    routing::get,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use trellis_core::{StatementStore, StoreError};

/// Request body cap for create and ingest.
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

const ENV_CORS_ORIGINS: &str = "TRELLIS_CORS_ORIGINS";

// =============================================================================
// SERVER STATE
// =============================================================================

/// Shared server state. The store is internally synchronized.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<StatementStore>,
}

impl AppState {
    #[must_use]
    pub fn new(store: StatementStore) -> Self {
        Self {
            store: Arc::new(store),
        }
    }
}

// =============================================================================
// CORS CONFIGURATION
// =============================================================================

/// Build the CORS layer from `TRELLIS_CORS_ORIGINS`.
///
/// - `*`: any origin
/// - unset: localhost only
/// - otherwise: the comma-separated origins that parse
fn build_cors_layer() -> CorsLayer {
    match std::env::var(ENV_CORS_ORIGINS).ok().as_deref() {
        Some("*") => {
            tracing::warn!("CORS: Allowing ALL origins ({}=*)", ENV_CORS_ORIGINS);
            CorsLayer::permissive()
        }
        Some(origins) => {
            let allowed: Vec<HeaderValue> = origins
                .split(',')
                .filter_map(|s| {
                    let trimmed = s.trim();
                    match trimmed.parse::<HeaderValue>() {
                        Ok(hv) => Some(hv),
                        Err(e) => {
                            tracing::warn!("CORS: Invalid origin '{}': {}", trimmed, e);
                            None
                        }
                    }
                })
                .collect();

            if allowed.is_empty() {
                tracing::warn!("CORS: No valid origins in {}, using localhost", ENV_CORS_ORIGINS);
                build_localhost_cors()
            } else {
                tracing::info!("CORS: Allowing {} origin(s)", allowed.len());
                cors_for(allowed)
            }
        }
        None => build_localhost_cors(),
    }
}

fn build_localhost_cors() -> CorsLayer {
    let origins: Vec<HeaderValue> = [
        "http://localhost:3000",
        "http://localhost:8080",
        "http://127.0.0.1:3000",
        "http://127.0.0.1:8080",
    ]
    .into_iter()
    .filter_map(|origin| origin.parse::<HeaderValue>().ok())
    .collect();
    cors_for(origins)
}

fn cors_for(origins: Vec<HeaderValue>) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

/// Create the router with every endpoint and middleware.
///
/// Middleware stack (outer to inner): tracing, CORS, body limit, rate limit.
pub fn create_router(state: AppState) -> Router {
    let rate_limit = get_rate_limit_from_env();
    let limiter = create_rate_limiter(rate_limit);
    match &limiter {
        Some(_) => tracing::info!("Rate limiting enabled: {} requests/second", rate_limit),
        None => tracing::info!("Rate limiting disabled"),
    }

    let mut router = Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/status", get(handlers::status_handler))
        .route("/subjects", get(handlers::subjects_handler))
        .route(
            "/statements",
            get(handlers::statements_handler).post(handlers::create_handler),
        )
        .route("/statements/by-subject", get(handlers::by_subject_handler))
        .route(
            "/statements/by-predicate",
            get(handlers::by_predicate_handler),
        )
        .route("/statements/search", get(handlers::search_handler))
        .route(
            "/statements/{id}",
            get(handlers::statement_handler).delete(handlers::delete_handler),
        )
        .route("/ingest", axum::routing::post(handlers::ingest_handler));

    if let Some(limiter) = limiter {
        router = router.layer(axum_middleware::from_fn_with_state(
            limiter,
            middleware::rate_limit_middleware,
        ));
    }

    router
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors_layer())
                .layer(axum::extract::DefaultBodyLimit::max(MAX_BODY_BYTES)),
        )
        .with_state(state)
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

/// Bind and serve until ctrl-c.
pub async fn run_server(addr: &str, store: StatementStore) -> Result<(), StoreError> {
    let backend = store.backend_name();
    let router = create_router(AppState::new(store));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| StoreError::Config(format!("Bind failed on {}: {}", addr, e)))?;

    tracing::info!(backend, "Trellis listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| StoreError::Config(format!("Server error: {}", e)))
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received"),
        Err(e) => {
            tracing::error!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
