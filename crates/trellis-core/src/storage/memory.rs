//! # In-Memory Graph
//!
//! A volatile executor. Identifiers live in a map keyed by their value, so a
//! merge can never produce a second node for the same value. Statements are
//! keyed by id.
//!
//! Reads take the read lock, writes take the write lock; each guard lives for
//! exactly one `execute` call.

use super::{StoredStatement, backend_err, by_id, count, list_subjects, page, scalar, search};
use crate::StoreError;
use crate::executor::{QueryExecutor, Record};
use crate::query::{Query, StatementWrite, columns};
use std::collections::BTreeMap;
use std::sync::RwLock;

#[derive(Debug, Default)]
struct GraphState {
    /// Identifier value -> node sequence number (insertion order).
    identifiers: BTreeMap<String, u64>,
    /// Statement id -> edge.
    statements: BTreeMap<String, StoredStatement>,
    next_identifier: u64,
}

impl GraphState {
    /// Get-or-insert by unique key. Returns the node's sequence number.
    fn merge_identifier(&mut self, value: &str) -> u64 {
        if let Some(&seq) = self.identifiers.get(value) {
            return seq;
        }
        let seq = self.next_identifier;
        self.next_identifier = self.next_identifier.saturating_add(1);
        self.identifiers.insert(value.to_string(), seq);
        seq
    }

    fn create(&mut self, write: &StatementWrite) -> Record {
        self.merge_identifier(&write.subject);
        self.merge_identifier(&write.object_value);
        self.statements
            .insert(write.id.clone(), StoredStatement::from(write));
        scalar(columns::ID, write.id.as_str())
    }

    fn delete(&mut self, id: &str) -> Record {
        let removed = self.statements.remove(id).is_some();
        scalar(columns::DELETED, u64::from(removed))
    }

    fn read(&self, query: &Query) -> Vec<Record> {
        let statements = self.statements.values();
        match query {
            Query::ListSubjects => list_subjects(statements),
            Query::CountStatements { filter } => count(statements, filter),
            Query::PageStatements {
                filter,
                limit,
                offset,
            } => page(statements, filter, *limit, *offset),
            Query::SearchStatements { needle, cap } => search(statements, needle, *cap),
            Query::StatementById { id } => by_id(self.statements.get(id)),
            Query::CountIdentifiers { value: None } => {
                vec![scalar(columns::TOTAL, self.identifiers.len() as u64)]
            }
            Query::CountIdentifiers { value: Some(value) } => vec![scalar(
                columns::TOTAL,
                u64::from(self.identifiers.contains_key(value)),
            )],
            Query::CreateStatement(_) | Query::DeleteStatement { .. } => Vec::new(),
        }
    }
}

/// Volatile in-process graph.
#[derive(Debug, Default)]
pub struct MemoryGraph {
    state: RwLock<GraphState>,
}

impl MemoryGraph {
    /// Create an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl QueryExecutor for MemoryGraph {
    fn execute(&self, query: &Query) -> Result<Vec<Record>, StoreError> {
        match query {
            Query::CreateStatement(write) => {
                let mut state = self.state.write().map_err(backend_err)?;
                Ok(vec![state.create(write)])
            }
            Query::DeleteStatement { id } => {
                let mut state = self.state.write().map_err(backend_err)?;
                Ok(vec![state.delete(id)])
            }
            _ => {
                let state = self.state.read().map_err(backend_err)?;
                Ok(state.read(query))
            }
        }
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

// =============================================================================
// TESTS
// =============================================================================
