//! # Row Mapping
//!
//! Converts backend records into typed values immediately after each call.
//! This is the only module that reads record fields by name; everything
//! above it works with `Statement`, counts and plain strings.

use crate::executor::Record;
use crate::query::columns;
use crate::{Statement, StoreError};
use serde_json::Value;

/// Reshape one statement record into the external field set.
pub fn statement(record: &Record) -> Result<Statement, StoreError> {
    Ok(Statement {
        id: required_str(record, columns::ID)?,
        subject_identifier: required_str(record, columns::SUBJECT)?,
        predicate: required_str(record, columns::PREDICATE)?,
        object_value: required_str(record, columns::OBJECT)?,
        source_id: optional_str(record, columns::SOURCE)?,
        statement_timestamp: required_str(record, columns::TIMESTAMP)?,
        created_at: required_str(record, columns::CREATED)?,
    })
}

/// Reshape every record of a statement-returning query.
pub fn statements(records: &[Record]) -> Result<Vec<Statement>, StoreError> {
    records.iter().map(statement).collect()
}

/// Read a single `total` column. No rows counts as zero.
pub fn total(records: &[Record]) -> Result<u64, StoreError> {
    match records.first() {
        Some(record) => required_u64(record, columns::TOTAL),
        None => Ok(0),
    }
}

/// Read the `deleted` column of a delete. No rows counts as zero.
pub fn deleted(records: &[Record]) -> Result<u64, StoreError> {
    match records.first() {
        Some(record) => required_u64(record, columns::DELETED),
        None => Ok(0),
    }
}

/// Read the `value` column of every record.
pub fn values(records: &[Record]) -> Result<Vec<String>, StoreError> {
    records
        .iter()
        .map(|record| required_str(record, columns::VALUE))
        .collect()
}

/// Read the `id` returned by a create. A create that returns no row did not happen.
pub fn created_id(records: &[Record]) -> Result<String, StoreError> {
    let record = records.first().ok_or_else(|| {
        StoreError::Backend("create returned no statement; nothing was written".to_string())
    })?;
    required_str(record, columns::ID)
}

// =============================================================================
// FIELD ACCESS
// =============================================================================

fn required_str(record: &Record, column: &str) -> Result<String, StoreError> {
    match record.get(column) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(StoreError::MalformedRecord(format!(
            "column '{}' should be a string, got {}",
            column, other
        ))),
        None => Err(StoreError::MalformedRecord(format!(
            "missing column '{}'",
            column
        ))),
    }
}

fn optional_str(record: &Record, column: &str) -> Result<Option<String>, StoreError> {
    match record.get(column) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(StoreError::MalformedRecord(format!(
            "column '{}' should be a string or null, got {}",
            column, other
        ))),
    }
}

fn required_u64(record: &Record, column: &str) -> Result<u64, StoreError> {
    record
        .get(column)
        .and_then(Value::as_u64)
        .ok_or_else(|| {
            StoreError::MalformedRecord(format!(
                "column '{}' should be a non-negative integer",
                column
            ))
        })
}

// =============================================================================
// TESTS
// =============================================================================
