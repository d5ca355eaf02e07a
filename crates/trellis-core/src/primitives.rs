//! # Store Primitives
//!
//! Fixed constants of the statement store. These are compiled in and are not
//! configurable at runtime.

/// Maximum number of statements returned by a containment search.
///
/// Search has no pagination wrapper; an empty query matches everything,
/// so every search is bounded by this cap.
pub const SEARCH_RESULT_CAP: u64 = 100;

/// Page size used by the facade when the caller omits `limit`.
pub const DEFAULT_PAGE_LIMIT: u64 = 10;

/// Field separator of the bulk ingest line format (`subject,predicate,object`).
pub const INGEST_FIELD_DELIMITER: char = ',';

/// Number of fields in one ingest line.
pub const INGEST_FIELD_COUNT: usize = 3;

/// Graph label of Identifier nodes.
pub const IDENTIFIER_LABEL: &str = "Identifier";

/// Graph type of Statement edges.
pub const STATEMENT_EDGE_TYPE: &str = "STATEMENT";

/// Message returned when a delete removed an edge.
pub const MSG_STATEMENT_DELETED: &str = "Statement deleted";

/// Message returned when a delete found no edge (soft failure, not an error).
pub const MSG_STATEMENT_NOT_FOUND: &str = "Statement not found";
