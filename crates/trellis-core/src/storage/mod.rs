//! # Storage Module
//!
//! Executors that back the statement store.
//!
//! - `MemoryGraph`: in-process graph behind a `RwLock` (volatile)
//! - `RedbGraph`: disk-backed graph in a redb database (ACID, persistent)
//! - `CypherHttp`: remote Neo4j-compatible endpoint (feature `remote`)
//!
//! The embedded executors share the read-side evaluation in this module so
//! both produce identical records, ordering and caps.

#[cfg(feature = "remote")]
mod cypher_http;
mod memory;
mod redb_graph;

#[cfg(feature = "remote")]
pub use cypher_http::CypherHttp;
pub use memory::MemoryGraph;
pub use redb_graph::RedbGraph;

use crate::StoreError;
use crate::executor::Record;
use crate::query::{StatementFilter, StatementWrite, columns};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::cmp::Ordering;
use std::collections::BTreeSet;

// =============================================================================
// STORED STATEMENT
// =============================================================================

/// A Statement edge as the embedded executors persist it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct StoredStatement {
    pub id: String,
    pub subject: String,
    pub predicate: String,
    pub object_value: String,
    pub source_id: Option<String>,
    pub statement_timestamp: String,
    pub created_at: String,
}

impl From<&StatementWrite> for StoredStatement {
    fn from(write: &StatementWrite) -> Self {
        Self {
            id: write.id.clone(),
            subject: write.subject.clone(),
            predicate: write.predicate.clone(),
            object_value: write.object_value.clone(),
            source_id: write.source_id.clone(),
            statement_timestamp: write.statement_timestamp.clone(),
            created_at: write.created_at.clone(),
        }
    }
}

impl StoredStatement {
    fn matches(&self, filter: &StatementFilter) -> bool {
        match filter {
            StatementFilter::All => true,
            StatementFilter::Subject(identifier) => self.subject == *identifier,
            StatementFilter::Predicate(predicate) => self.predicate == *predicate,
        }
    }

    /// `folded_needle` must already be lowercase.
    fn contains(&self, folded_needle: &str) -> bool {
        self.object_value.to_lowercase().contains(folded_needle)
            || self.subject.to_lowercase().contains(folded_needle)
    }

    /// Render with the same column names as the Cypher projection.
    fn to_record(&self) -> Record {
        let mut record = Record::new();
        record.insert(columns::ID.to_string(), json!(self.id));
        record.insert(columns::SUBJECT.to_string(), json!(self.subject));
        record.insert(columns::PREDICATE.to_string(), json!(self.predicate));
        record.insert(columns::OBJECT.to_string(), json!(self.object_value));
        record.insert(columns::SOURCE.to_string(), json!(self.source_id));
        record.insert(
            columns::TIMESTAMP.to_string(),
            json!(self.statement_timestamp),
        );
        record.insert(columns::CREATED.to_string(), json!(self.created_at));
        record
    }
}

/// Newest `created_at` first; id descending breaks ties.
fn newest_first(a: &StoredStatement, b: &StoredStatement) -> Ordering {
    b.created_at
        .cmp(&a.created_at)
        .then_with(|| b.id.cmp(&a.id))
}

// =============================================================================
// SHARED READ EVALUATION
// =============================================================================

/// Single-column record.
pub(crate) fn scalar(column: &str, value: impl Into<Value>) -> Record {
    let mut record = Record::new();
    record.insert(column.to_string(), value.into());
    record
}

pub(crate) fn list_subjects<'a>(
    statements: impl Iterator<Item = &'a StoredStatement>,
) -> Vec<Record> {
    statements
        .map(|s| s.subject.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(|subject| scalar(columns::VALUE, subject))
        .collect()
}

pub(crate) fn count<'a>(
    statements: impl Iterator<Item = &'a StoredStatement>,
    filter: &StatementFilter,
) -> Vec<Record> {
    let total = statements.filter(|s| s.matches(filter)).count() as u64;
    vec![scalar(columns::TOTAL, total)]
}

pub(crate) fn page<'a>(
    statements: impl Iterator<Item = &'a StoredStatement>,
    filter: &StatementFilter,
    limit: u64,
    offset: u64,
) -> Vec<Record> {
    let mut matching: Vec<&StoredStatement> = statements.filter(|s| s.matches(filter)).collect();
    matching.sort_by(|a, b| newest_first(a, b));
    matching
        .into_iter()
        .skip(usize::try_from(offset).unwrap_or(usize::MAX))
        .take(usize::try_from(limit).unwrap_or(usize::MAX))
        .map(StoredStatement::to_record)
        .collect()
}

pub(crate) fn search<'a>(
    statements: impl Iterator<Item = &'a StoredStatement>,
    needle: &str,
    cap: u64,
) -> Vec<Record> {
    let folded = needle.to_lowercase();
    statements
        .filter(|s| s.contains(&folded))
        .take(usize::try_from(cap).unwrap_or(usize::MAX))
        .map(StoredStatement::to_record)
        .collect()
}

pub(crate) fn by_id(statement: Option<&StoredStatement>) -> Vec<Record> {
    statement.map(StoredStatement::to_record).into_iter().collect()
}

/// Map any storage-layer error into a backend error.
pub(crate) fn backend_err(e: impl std::fmt::Display) -> StoreError {
    StoreError::Backend(e.to_string())
}

// =============================================================================
// TESTS
// =============================================================================
