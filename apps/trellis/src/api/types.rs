//! # API Request/Response Types
//!
//! JSON structures of the Query Facade that are not core types. Statements,
//! pages, delete outcomes and ingest reports are serialized straight from
//! `trellis_core`.

use serde::{Deserialize, Serialize};
use trellis_core::primitives::DEFAULT_PAGE_LIMIT;
use trellis_core::{Page, StoreError};

// =============================================================================
// HEALTH / STATUS
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Store status response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub backend: String,
    pub statement_count: u64,
    pub identifier_count: u64,
}

// =============================================================================
// QUERY PARAMETERS
// =============================================================================

/// `?limit&offset`, signed so negative values reach validation.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PageParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl PageParams {
    /// Apply defaults (`limit = 10`, `offset = 0`) and validate.
    pub fn page(&self) -> Result<Page, StoreError> {
        page(self.limit, self.offset)
    }
}

/// `GET /statements/by-subject`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubjectParams {
    pub identifier: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl SubjectParams {
    pub fn page(&self) -> Result<Page, StoreError> {
        page(self.limit, self.offset)
    }
}

/// `GET /statements/by-predicate`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PredicateParams {
    pub predicate: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl PredicateParams {
    pub fn page(&self) -> Result<Page, StoreError> {
        page(self.limit, self.offset)
    }
}

fn page(limit: Option<i64>, offset: Option<i64>) -> Result<Page, StoreError> {
    Page::new(
        limit.unwrap_or(DEFAULT_PAGE_LIMIT as i64),
        offset.unwrap_or(0),
    )
}

/// `GET /statements/search`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

/// Reject a missing required query parameter.
pub fn required(value: Option<String>, name: &str) -> Result<String, StoreError> {
    value.ok_or_else(|| StoreError::InvalidArgument(format!("missing query parameter '{}'", name)))
}

// =============================================================================
// INGEST REQUEST
// =============================================================================

/// Bulk ingest request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestRequest {
    /// Newline-delimited `subject,predicate,object` lines.
    pub data: String,
    /// Provenance tag applied to every ingested statement.
    #[serde(default)]
    pub source_name: Option<String>,
}

// =============================================================================
// ERROR RESPONSE
// =============================================================================

/// Body of every non-2xx response produced by a handler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_params_default_to_first_ten() {
        let page = PageParams::default().page().expect("page");
        assert_eq!(page, Page::at(10, 0));
    }

    #[test]
    fn negative_page_params_are_invalid() {
        let params = PageParams {
            limit: Some(5),
            offset: Some(-1),
        };
        assert!(matches!(params.page(), Err(StoreError::InvalidArgument(_))));
    }

    #[test]
    fn missing_required_parameter_is_invalid() {
        assert!(matches!(
            required(None, "q"),
            Err(StoreError::InvalidArgument(msg)) if msg.contains("'q'")
        ));
        assert_eq!(required(Some(String::new()), "q").expect("present"), "");
    }
}
