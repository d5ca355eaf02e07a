//! # Core Type Definitions
//!
//! This module contains the data model and the request/response shapes of
//! the statement store:
//! - Statements as returned to callers (`Statement`, `CreatedStatement`)
//! - Write input (`NewStatement`)
//! - Pagination (`Page`, `StatementPage`)
//! - Operation outcomes (`DeleteOutcome`, `IngestReport`)
//! - Error types (`StoreError`)
//!
//! ## Object Encoding
//!
//! `object_value` is always a string once stored. Statements created through
//! `create_statement` store the JSON serialization of the caller's value;
//! statements created through ingest store the raw trimmed text.

use crate::primitives::{MSG_STATEMENT_DELETED, MSG_STATEMENT_NOT_FOUND};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// STATEMENT
// =============================================================================

/// A statement in its external shape.
///
/// This field set is fixed regardless of the column names the backend
/// returns; see the `row` module for the mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statement {
    /// Globally unique, immutable handle.
    pub id: String,
    /// Value of the subject Identifier.
    pub subject_identifier: String,
    /// Relation name.
    pub predicate: String,
    /// Stored object text (JSON for created statements, raw for ingested ones).
    pub object_value: String,
    /// Provenance tag.
    pub source_id: Option<String>,
    /// Caller-supplied logical time of the fact.
    pub statement_timestamp: String,
    /// System-assigned wall time.
    pub created_at: String,
}

impl Statement {
    /// Decode `object_value` as JSON.
    ///
    /// Returns `None` for ingested statements whose object is plain text.
    #[must_use]
    pub fn object_json(&self) -> Option<serde_json::Value> {
        serde_json::from_str(&self.object_value).ok()
    }
}

// =============================================================================
// CREATE INPUT / OUTPUT
// =============================================================================

/// Input of `create_statement`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewStatement {
    pub subject_identifier: String,
    pub predicate: String,
    /// Arbitrary scalar or structured value; stored as its JSON serialization.
    pub object_value: serde_json::Value,
    #[serde(default)]
    pub source_id: Option<String>,
    /// RFC 3339 timestamp; defaults to the creation time.
    #[serde(default)]
    pub statement_timestamp: Option<String>,
}

impl NewStatement {
    /// Create an input with no provenance and no explicit timestamp.
    pub fn new(
        subject_identifier: impl Into<String>,
        predicate: impl Into<String>,
        object_value: impl Into<serde_json::Value>,
    ) -> Self {
        Self {
            subject_identifier: subject_identifier.into(),
            predicate: predicate.into(),
            object_value: object_value.into(),
            source_id: None,
            statement_timestamp: None,
        }
    }

    /// Attach a provenance tag.
    #[must_use]
    pub fn with_source(mut self, source_id: impl Into<String>) -> Self {
        self.source_id = Some(source_id.into());
        self
    }

    /// Attach a logical timestamp.
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.statement_timestamp = Some(timestamp.into());
        self
    }
}

/// Result of `create_statement`.
///
/// Echoes the caller's original `object_value` shape, while the persisted
/// edge holds its JSON serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatedStatement {
    pub id: String,
    pub subject_identifier: String,
    pub predicate: String,
    pub object_value: serde_json::Value,
    pub source_id: Option<String>,
    pub statement_timestamp: String,
    pub created_at: String,
}

// =============================================================================
// PAGINATION
// =============================================================================

/// Validated pagination window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Page {
    pub limit: u64,
    pub offset: u64,
}

impl Page {
    /// Validate signed bounds coming from a facade.
    ///
    /// Returns `StoreError::InvalidArgument` if either bound is negative.
    pub fn new(limit: i64, offset: i64) -> Result<Self, StoreError> {
        let limit = u64::try_from(limit).map_err(|_| {
            StoreError::InvalidArgument(format!("limit must be >= 0, got {}", limit))
        })?;
        let offset = u64::try_from(offset).map_err(|_| {
            StoreError::InvalidArgument(format!("offset must be >= 0, got {}", offset))
        })?;
        Ok(Self { limit, offset })
    }

    /// Build a page from bounds that are already non-negative.
    #[must_use]
    pub const fn at(limit: u64, offset: u64) -> Self {
        Self { limit, offset }
    }
}

/// One page of statements plus the independently counted total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementPage {
    pub statements: Vec<Statement>,
    pub total_count: u64,
    pub has_more: bool,
}

impl StatementPage {
    /// Assemble a page; `has_more = offset + len(statements) < total_count`.
    #[must_use]
    pub fn new(statements: Vec<Statement>, total_count: u64, offset: u64) -> Self {
        let seen = offset.saturating_add(statements.len() as u64);
        Self {
            has_more: seen < total_count,
            statements,
            total_count,
        }
    }

    /// The page returned for a filter with no matches.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            statements: Vec::new(),
            total_count: 0,
            has_more: false,
        }
    }
}

// =============================================================================
// OUTCOMES
// =============================================================================

/// Result of `delete_statement`. A missing id is a normal negative result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteOutcome {
    pub success: bool,
    pub message: String,
    pub id: String,
}

impl DeleteOutcome {
    pub fn deleted(id: impl Into<String>) -> Self {
        Self {
            success: true,
            message: MSG_STATEMENT_DELETED.to_string(),
            id: id.into(),
        }
    }

    pub fn not_found(id: impl Into<String>) -> Self {
        Self {
            success: false,
            message: MSG_STATEMENT_NOT_FOUND.to_string(),
            id: id.into(),
        }
    }
}

/// Result of a bulk ingest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestReport {
    pub success: bool,
    pub message: String,
    /// Distinct subject values across accepted lines.
    pub entities_created: usize,
    /// Accepted lines, one statement each.
    pub statements_created: usize,
}

impl IngestReport {
    #[must_use]
    pub fn new(entities_created: usize, statements_created: usize) -> Self {
        Self {
            success: true,
            message: format!("Ingested {} statements", statements_created),
            entities_created,
            statements_created,
        }
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the statement store.
///
/// Absent statements and deletes of unknown ids are NOT errors; they are
/// expressed through `Option` and `DeleteOutcome`.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing store failed or reported an error.
    #[error("Backend error: {0}")]
    Backend(String),

    /// A request argument was rejected before any backend call.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A backend record lacked a column or had the wrong type.
    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    /// Encoding or decoding of a stored value failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A backend failure stopped an ingest after some lines were committed.
    #[error("Ingest interrupted after {committed} statements: {reason}")]
    IngestInterrupted { committed: usize, reason: String },

    /// The store configuration could not be used.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl StoreError {
    /// Whether the error originated in the backing store.
    #[must_use]
    pub fn is_backend(&self) -> bool {
        matches!(self, Self::Backend(_) | Self::IngestInterrupted { .. })
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample(id: &str) -> Statement {
        Statement {
            id: id.to_string(),
            subject_identifier: "alice".to_string(),
            predicate: "knows".to_string(),
            object_value: "\"bob\"".to_string(),
            source_id: None,
            statement_timestamp: "2026-01-01T00:00:00.000Z".to_string(),
            created_at: "2026-01-01T00:00:00.000Z".to_string(),
        }
    }

    #[test]
    fn page_rejects_negative_bounds() {
        assert!(matches!(
            Page::new(-1, 0),
            Err(StoreError::InvalidArgument(_))
        ));
        assert!(matches!(
            Page::new(10, -5),
            Err(StoreError::InvalidArgument(_))
        ));
        assert_eq!(Page::new(0, 0).expect("zero is valid"), Page::at(0, 0));
    }

    #[test]
    fn has_more_is_false_on_last_page() {
        let page = StatementPage::new(vec![sample("a"), sample("b")], 4, 2);
        assert!(!page.has_more);

        let page = StatementPage::new(vec![sample("a")], 4, 2);
        assert!(page.has_more);
    }

    #[test]
    fn empty_page_has_no_more() {
        let page = StatementPage::empty();
        assert_eq!(page.total_count, 0);
        assert!(!page.has_more);
        assert!(page.statements.is_empty());
    }

    #[test]
    fn offset_past_end_has_no_more() {
        let page = StatementPage::new(Vec::new(), 3, 50);
        assert!(!page.has_more);
    }

    #[test]
    fn delete_outcome_messages() {
        let ok = DeleteOutcome::deleted("x");
        assert!(ok.success);
        assert_eq!(ok.message, "Statement deleted");

        let missing = DeleteOutcome::not_found("y");
        assert!(!missing.success);
        assert_eq!(missing.message, "Statement not found");
        assert_eq!(missing.id, "y");
    }

    #[test]
    fn ingest_report_message() {
        let report = IngestReport::new(2, 3);
        assert!(report.success);
        assert_eq!(report.message, "Ingested 3 statements");
    }

    #[test]
    fn object_json_decodes_created_values() {
        assert_eq!(sample("a").object_json(), Some(json!("bob")));

        let mut ingested = sample("b");
        ingested.object_value = "plain text".to_string();
        assert_eq!(ingested.object_json(), None);
    }

    #[test]
    fn new_statement_deserializes_without_optional_fields() {
        let input: NewStatement = serde_json::from_value(json!({
            "subject_identifier": "alice",
            "predicate": "age",
            "object_value": 42
        }))
        .expect("deserialize");
        assert_eq!(input.object_value, json!(42));
        assert!(input.source_id.is_none());
        assert!(input.statement_timestamp.is_none());
    }
}
