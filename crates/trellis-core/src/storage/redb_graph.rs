//! # redb-backed Graph Storage
//!
//! A disk-backed executor using the redb embedded database, providing:
//! - ACID transactions (one write transaction per mutating query)
//! - Crash safety (copy-on-write B-trees)
//! - MVCC (concurrent readers, single writer)
//!
//! ## Layout
//!
//! - `identifiers`: Identifier value -> node sequence number (the unique key)
//! - `statements`: statement id -> postcard-encoded edge
//! - `metadata`: counters
//!
//! Transactions are scoped to a single `execute` call and released on every
//! exit path; an uncommitted write transaction is aborted on drop.

use super::{StoredStatement, backend_err, by_id, count, list_subjects, page, scalar, search};
use crate::StoreError;
use crate::executor::{QueryExecutor, Record};
use crate::query::{Query, StatementWrite, columns};
use redb::{
    Database, ReadableDatabase, ReadableTable, ReadableTableMetadata, Table, TableDefinition,
};
use std::path::Path;

/// Table for identifiers: value -> node sequence number
const IDENTIFIERS: TableDefinition<&str, u64> = TableDefinition::new("identifiers");

/// Table for statements: id -> postcard-encoded `StoredStatement`
const STATEMENTS: TableDefinition<&str, &[u8]> = TableDefinition::new("statements");

/// Table for metadata: key string -> value u64
const METADATA: TableDefinition<&str, u64> = TableDefinition::new("metadata");

const NEXT_IDENTIFIER: &str = "next_identifier";

/// A disk-backed statement graph.
pub struct RedbGraph {
    db: Database,
}

impl std::fmt::Debug for RedbGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbGraph").finish_non_exhaustive()
    }
}

impl RedbGraph {
    /// Open or create a statement database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let db = Database::create(path.as_ref()).map_err(backend_err)?;

        // Initialize tables if they don't exist
        let write_txn = db.begin_write().map_err(backend_err)?;
        write_txn.open_table(IDENTIFIERS).map_err(backend_err)?;
        write_txn.open_table(STATEMENTS).map_err(backend_err)?;
        write_txn.open_table(METADATA).map_err(backend_err)?;
        write_txn.commit().map_err(backend_err)?;

        Ok(Self { db })
    }

    /// Read every stored statement, in id order.
    fn load_statements(&self) -> Result<Vec<StoredStatement>, StoreError> {
        let read_txn = self.db.begin_read().map_err(backend_err)?;
        let table = read_txn.open_table(STATEMENTS).map_err(backend_err)?;

        let mut statements = Vec::new();
        for entry in table.iter().map_err(backend_err)? {
            let (_, value) = entry.map_err(backend_err)?;
            statements.push(decode(value.value())?);
        }
        Ok(statements)
    }

    fn statement_by_id(&self, id: &str) -> Result<Option<StoredStatement>, StoreError> {
        let read_txn = self.db.begin_read().map_err(backend_err)?;
        let table = read_txn.open_table(STATEMENTS).map_err(backend_err)?;
        match table.get(id).map_err(backend_err)? {
            Some(data) => Ok(Some(decode(data.value())?)),
            None => Ok(None),
        }
    }

    fn count_identifiers(&self, value: Option<&str>) -> Result<u64, StoreError> {
        let read_txn = self.db.begin_read().map_err(backend_err)?;
        let table = read_txn.open_table(IDENTIFIERS).map_err(backend_err)?;
        match value {
            None => table.len().map_err(backend_err),
            Some(value) => Ok(u64::from(table.get(value).map_err(backend_err)?.is_some())),
        }
    }

    /// Merge both Identifiers and insert the edge in one transaction.
    fn create(&self, write: &StatementWrite) -> Result<Record, StoreError> {
        let bytes = postcard::to_allocvec(&StoredStatement::from(write))
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        let write_txn = self.db.begin_write().map_err(backend_err)?;
        {
            let mut identifiers = write_txn.open_table(IDENTIFIERS).map_err(backend_err)?;
            let mut metadata = write_txn.open_table(METADATA).map_err(backend_err)?;
            merge_identifier(&mut identifiers, &mut metadata, &write.subject)?;
            merge_identifier(&mut identifiers, &mut metadata, &write.object_value)?;

            let mut statements = write_txn.open_table(STATEMENTS).map_err(backend_err)?;
            statements
                .insert(write.id.as_str(), bytes.as_slice())
                .map_err(backend_err)?;
        }
        write_txn.commit().map_err(backend_err)?;

        Ok(scalar(columns::ID, write.id.as_str()))
    }

    fn delete(&self, id: &str) -> Result<Record, StoreError> {
        let write_txn = self.db.begin_write().map_err(backend_err)?;
        let removed = {
            let mut statements = write_txn.open_table(STATEMENTS).map_err(backend_err)?;
            statements.remove(id).map_err(backend_err)?.is_some()
        };
        write_txn.commit().map_err(backend_err)?;

        Ok(scalar(columns::DELETED, u64::from(removed)))
    }
}

/// Get-or-insert an Identifier by its unique value.
fn merge_identifier(
    identifiers: &mut Table<'_, &'static str, u64>,
    metadata: &mut Table<'_, &'static str, u64>,
    value: &str,
) -> Result<(), StoreError> {
    if identifiers.get(value).map_err(backend_err)?.is_some() {
        return Ok(());
    }
    let seq = metadata
        .get(NEXT_IDENTIFIER)
        .map_err(backend_err)?
        .map(|v| v.value())
        .unwrap_or(0);
    identifiers.insert(value, seq).map_err(backend_err)?;
    metadata
        .insert(NEXT_IDENTIFIER, seq.saturating_add(1))
        .map_err(backend_err)?;
    Ok(())
}

fn decode(bytes: &[u8]) -> Result<StoredStatement, StoreError> {
    postcard::from_bytes(bytes).map_err(|e| StoreError::Serialization(e.to_string()))
}

// =============================================================================
// QUERY EXECUTOR IMPLEMENTATION
// =============================================================================

impl QueryExecutor for RedbGraph {
    fn execute(&self, query: &Query) -> Result<Vec<Record>, StoreError> {
        match query {
            Query::CreateStatement(write) => Ok(vec![self.create(write)?]),
            Query::DeleteStatement { id } => Ok(vec![self.delete(id)?]),
            Query::StatementById { id } => Ok(by_id(self.statement_by_id(id)?.as_ref())),
            Query::CountIdentifiers { value } => Ok(vec![scalar(
                columns::TOTAL,
                self.count_identifiers(value.as_deref())?,
            )]),
            Query::ListSubjects => Ok(list_subjects(self.load_statements()?.iter())),
            Query::CountStatements { filter } => Ok(count(self.load_statements()?.iter(), filter)),
            Query::PageStatements {
                filter,
                limit,
                offset,
            } => Ok(page(
                self.load_statements()?.iter(),
                filter,
                *limit,
                *offset,
            )),
            Query::SearchStatements { needle, cap } => {
                Ok(search(self.load_statements()?.iter(), needle, *cap))
            }
        }
    }

    fn backend_name(&self) -> &'static str {
        "redb"
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::StatementFilter;
    use crate::row;
    use tempfile::tempdir;

    fn write(id: &str, subject: &str, object: &str) -> StatementWrite {
        StatementWrite {
            id: id.to_string(),
            subject: subject.to_string(),
            predicate: "knows".to_string(),
            object_value: object.to_string(),
            source_id: Some("unit".to_string()),
            statement_timestamp: "2026-01-01T00:00:00.000Z".to_string(),
            created_at: format!("2026-01-01T00:00:0{}.000Z", id),
        }
    }

    #[test]
    fn statements_survive_reopen() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("graph.redb");

        {
            let graph = RedbGraph::open(&path).expect("open");
            graph
                .execute(&Query::CreateStatement(write("1", "alice", "bob")))
                .expect("create");
        }

        let graph = RedbGraph::open(&path).expect("reopen");
        let records = graph
            .execute(&Query::StatementById { id: "1".into() })
            .expect("get");
        let statement = row::statement(&records[0]).expect("row");
        assert_eq!(statement.subject_identifier, "alice");
        assert_eq!(statement.source_id.as_deref(), Some("unit"));
    }

    #[test]
    fn identifiers_are_merged_across_transactions() {
        let dir = tempdir().expect("tempdir");
        let graph = RedbGraph::open(dir.path().join("graph.redb")).expect("open");

        for (id, object) in [("1", "bob"), ("2", "carol"), ("3", "bob")] {
            graph
                .execute(&Query::CreateStatement(write(id, "alice", object)))
                .expect("create");
        }

        let all = graph
            .execute(&Query::CountIdentifiers { value: None })
            .expect("count");
        assert_eq!(row::total(&all).expect("total"), 3);

        let alice = graph
            .execute(&Query::CountIdentifiers {
                value: Some("alice".into()),
            })
            .expect("count");
        assert_eq!(row::total(&alice).expect("total"), 1);
    }

    #[test]
    fn page_and_delete_round_trip() {
        let dir = tempdir().expect("tempdir");
        let graph = RedbGraph::open(dir.path().join("graph.redb")).expect("open");
        for id in ["1", "2", "3"] {
            graph
                .execute(&Query::CreateStatement(write(id, "alice", "bob")))
                .expect("create");
        }

        let first = graph
            .execute(&Query::PageStatements {
                filter: StatementFilter::All,
                limit: 2,
                offset: 0,
            })
            .expect("page");
        let ids: Vec<_> = row::statements(&first)
            .expect("rows")
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(ids, vec!["3", "2"]);

        let deleted = graph
            .execute(&Query::DeleteStatement { id: "3".into() })
            .expect("delete");
        assert_eq!(row::deleted(&deleted).expect("deleted"), 1);

        let remaining = graph
            .execute(&Query::CountStatements {
                filter: StatementFilter::All,
            })
            .expect("count");
        assert_eq!(row::total(&remaining).expect("total"), 2);
    }
}
