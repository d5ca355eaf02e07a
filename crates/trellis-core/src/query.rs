//! # Query Vocabulary
//!
//! Every backend round trip the store issues is one `Query`.
//!
//! A `Query` renders to Cypher text plus named parameters, which is what a
//! remote graph engine executes. Embedded executors match on the variant
//! directly and produce records with the same column names as the Cypher
//! `RETURN` aliases in [`columns`].

use crate::executor::Record;
use crate::primitives::{IDENTIFIER_LABEL, STATEMENT_EDGE_TYPE};
use serde_json::{Value, json};

/// Column names of backend records.
///
/// These are backend names, not the external field names; the `row` module
/// maps them onto `Statement`.
pub mod columns {
    pub const ID: &str = "id";
    pub const SUBJECT: &str = "subject";
    pub const PREDICATE: &str = "predicate";
    pub const OBJECT: &str = "object";
    pub const SOURCE: &str = "source";
    pub const TIMESTAMP: &str = "timestamp";
    pub const CREATED: &str = "created";
    pub const TOTAL: &str = "total";
    pub const VALUE: &str = "value";
    pub const DELETED: &str = "deleted";
}

/// Which statements a count or page applies to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StatementFilter {
    All,
    /// Exact subject Identifier value.
    Subject(String),
    /// Exact predicate string.
    Predicate(String),
}

/// Attributes of a Statement edge to create.
///
/// The object Identifier is merged on `object_value`, so the object node's
/// value always equals the edge's stored object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementWrite {
    pub id: String,
    pub subject: String,
    pub predicate: String,
    pub object_value: String,
    pub source_id: Option<String>,
    pub statement_timestamp: String,
    pub created_at: String,
}

/// One backend round trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    /// Distinct subjects with at least one outgoing statement, ascending.
    ListSubjects,
    /// Number of statements matching a filter. One record: `total`.
    CountStatements { filter: StatementFilter },
    /// Newest-first window of statements matching a filter.
    PageStatements {
        filter: StatementFilter,
        limit: u64,
        offset: u64,
    },
    /// Case-insensitive containment on object value or subject value.
    SearchStatements { needle: String, cap: u64 },
    /// Exact lookup by statement id.
    StatementById { id: String },
    /// Merge both Identifiers, then create the edge. One record: `id`.
    CreateStatement(StatementWrite),
    /// Delete an edge by id. One record: `deleted` (0 or 1).
    DeleteStatement { id: String },
    /// Number of Identifier nodes, optionally restricted to one value.
    CountIdentifiers { value: Option<String> },
}

/// Projection shared by every query that returns statements.
const STATEMENT_PROJECTION: &str = "r.id AS id, s.value AS subject, r.predicate AS predicate, \
     r.object_value AS object, r.source_id AS source, \
     r.statement_timestamp AS timestamp, r.created_at AS created";

/// Total order for paged reads: newest first, id breaks ties.
const NEWEST_FIRST: &str = "ORDER BY r.created_at DESC, r.id DESC";

impl Query {
    /// Short name for logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::ListSubjects => "list_subjects",
            Self::CountStatements { .. } => "count_statements",
            Self::PageStatements { .. } => "page_statements",
            Self::SearchStatements { .. } => "search_statements",
            Self::StatementById { .. } => "statement_by_id",
            Self::CreateStatement(_) => "create_statement",
            Self::DeleteStatement { .. } => "delete_statement",
            Self::CountIdentifiers { .. } => "count_identifiers",
        }
    }

    /// Whether executing this query changes the graph.
    #[must_use]
    pub fn is_write(&self) -> bool {
        matches!(self, Self::CreateStatement(_) | Self::DeleteStatement { .. })
    }

    /// Cypher statement text.
    #[must_use]
    pub fn text(&self) -> String {
        let node = IDENTIFIER_LABEL;
        let edge = STATEMENT_EDGE_TYPE;
        match self {
            Self::ListSubjects => format!(
                "MATCH (s:{node})-[:{edge}]->() RETURN DISTINCT s.value AS value ORDER BY value"
            ),
            Self::CountStatements { filter } => format!(
                "MATCH (s:{node})-[r:{edge}]->(:{node}){} RETURN count(r) AS total",
                where_clause(filter)
            ),
            Self::PageStatements { filter, .. } => format!(
                "MATCH (s:{node})-[r:{edge}]->(:{node}){} RETURN {STATEMENT_PROJECTION} \
                 {NEWEST_FIRST} SKIP $offset LIMIT $limit",
                where_clause(filter)
            ),
            Self::SearchStatements { .. } => format!(
                "MATCH (s:{node})-[r:{edge}]->(:{node}) \
                 WHERE toLower(r.object_value) CONTAINS toLower($needle) \
                 OR toLower(s.value) CONTAINS toLower($needle) \
                 RETURN {STATEMENT_PROJECTION} LIMIT $cap"
            ),
            Self::StatementById { .. } => format!(
                "MATCH (s:{node})-[r:{edge} {{id: $id}}]->(:{node}) RETURN {STATEMENT_PROJECTION}"
            ),
            Self::CreateStatement(_) => format!(
                "MERGE (s:{node} {{value: $subject}}) \
                 MERGE (o:{node} {{value: $object_value}}) \
                 CREATE (s)-[r:{edge} {{id: $id, predicate: $predicate, \
                 object_value: $object_value, source_id: $source_id, \
                 statement_timestamp: $statement_timestamp, created_at: $created_at}}]->(o) \
                 RETURN r.id AS id"
            ),
            Self::DeleteStatement { .. } => format!(
                "MATCH ()-[r:{edge} {{id: $id}}]->() DELETE r RETURN count(*) AS deleted"
            ),
            Self::CountIdentifiers { value: None } => {
                format!("MATCH (n:{node}) RETURN count(n) AS total")
            }
            Self::CountIdentifiers { value: Some(_) } => {
                format!("MATCH (n:{node} {{value: $value}}) RETURN count(n) AS total")
            }
        }
    }

    /// Named parameters referenced by [`Query::text`].
    #[must_use]
    pub fn parameters(&self) -> Record {
        let params = match self {
            Self::ListSubjects | Self::CountIdentifiers { value: None } => json!({}),
            Self::CountStatements { filter } => filter_parameters(filter),
            Self::PageStatements {
                filter,
                limit,
                offset,
            } => {
                let mut params = filter_parameters(filter);
                params["limit"] = json!(limit);
                params["offset"] = json!(offset);
                params
            }
            Self::SearchStatements { needle, cap } => json!({ "needle": needle, "cap": cap }),
            Self::StatementById { id } | Self::DeleteStatement { id } => json!({ "id": id }),
            Self::CreateStatement(write) => json!({
                "id": write.id,
                "subject": write.subject,
                "predicate": write.predicate,
                "object_value": write.object_value,
                "source_id": write.source_id,
                "statement_timestamp": write.statement_timestamp,
                "created_at": write.created_at,
            }),
            Self::CountIdentifiers { value: Some(value) } => json!({ "value": value }),
        };
        match params {
            Value::Object(map) => map,
            _ => Record::new(),
        }
    }
}

fn where_clause(filter: &StatementFilter) -> &'static str {
    match filter {
        StatementFilter::All => "",
        StatementFilter::Subject(_) => " WHERE s.value = $identifier",
        StatementFilter::Predicate(_) => " WHERE r.predicate = $predicate",
    }
}

fn filter_parameters(filter: &StatementFilter) -> Value {
    match filter {
        StatementFilter::All => json!({}),
        StatementFilter::Subject(identifier) => json!({ "identifier": identifier }),
        StatementFilter::Predicate(predicate) => json!({ "predicate": predicate }),
    }
}

// =============================================================================
// TESTS
// =============================================================================
