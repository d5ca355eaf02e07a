//! # Statement Store
//!
//! The operations the Query Facade exposes. The store owns an executor and a
//! clock and nothing else: every operation is a short, strictly ordered
//! sequence of executor round trips, and all graph state lives behind the
//! executor.
//!
//! Multi-step operations (count then page, per-line ingest) are not wrapped
//! in a transaction. A concurrent writer can land between the two reads of a
//! paged operation, so `has_more` is only exact for a quiescent store.

use crate::config::{Endpoint, StoreConfig};
use crate::executor::{QueryExecutor, Record};
use crate::identity::{Clock, SystemClock, format_timestamp, new_statement_id, validate_timestamp};
use crate::ingest;
use crate::primitives::SEARCH_RESULT_CAP;
use crate::query::{Query, StatementFilter, StatementWrite};
use crate::row;
use crate::storage::{MemoryGraph, RedbGraph};
use crate::{
    CreatedStatement, DeleteOutcome, IngestReport, NewStatement, Page, Statement, StatementPage,
    StoreError,
};
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

/// Subject-predicate-object statement store.
pub struct StatementStore {
    executor: Box<dyn QueryExecutor>,
    clock: Box<dyn Clock>,
}

impl std::fmt::Debug for StatementStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatementStore")
            .field("backend", &self.executor.backend_name())
            .finish_non_exhaustive()
    }
}

impl StatementStore {
    // =========================================================================
    // CONSTRUCTION
    // =========================================================================

    /// Create a store over an executor, using the system clock.
    pub fn new(executor: impl QueryExecutor + 'static) -> Self {
        Self::with_clock(executor, SystemClock)
    }

    /// Create a store with an explicit clock for `created_at`.
    pub fn with_clock(executor: impl QueryExecutor + 'static, clock: impl Clock + 'static) -> Self {
        Self {
            executor: Box::new(executor),
            clock: Box::new(clock),
        }
    }

    /// Create a store over a fresh in-memory graph.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(MemoryGraph::new())
    }

    /// Open the backend a configuration names.
    ///
    /// Remote endpoints need the `remote` feature; without it they are a
    /// `StoreError::Config`.
    pub fn connect(config: &StoreConfig) -> Result<Self, StoreError> {
        match &config.endpoint {
            Endpoint::Memory => Ok(Self::in_memory()),
            Endpoint::Redb(path) => Ok(Self::new(RedbGraph::open(path)?)),
            #[cfg(feature = "remote")]
            Endpoint::Remote(url) => Ok(Self::new(crate::storage::CypherHttp::new(
                url,
                config.credentials.as_ref(),
            )?)),
            #[cfg(not(feature = "remote"))]
            Endpoint::Remote(url) => Err(StoreError::Config(format!(
                "remote endpoint '{}' requires the 'remote' feature",
                url
            ))),
        }
    }

    /// Short name of the backing executor.
    #[must_use]
    pub fn backend_name(&self) -> &'static str {
        self.executor.backend_name()
    }

    /// One backend round trip.
    fn run(&self, query: &Query) -> Result<Vec<Record>, StoreError> {
        debug!(
            query = query.name(),
            backend = self.executor.backend_name(),
            "executing"
        );
        let records = self.executor.execute(query)?;
        debug!(query = query.name(), rows = records.len(), "executed");
        Ok(records)
    }

    // =========================================================================
    // READ OPERATIONS
    // =========================================================================

    /// Distinct subjects with at least one outgoing statement, ascending.
    pub fn list_subjects(&self) -> Result<Vec<String>, StoreError> {
        let records = self.run(&Query::ListSubjects)?;
        row::values(&records)
    }

    /// Newest-first page of one subject's statements.
    pub fn statements_by_subject(
        &self,
        identifier: &str,
        page: Page,
    ) -> Result<StatementPage, StoreError> {
        self.paged(StatementFilter::Subject(identifier.to_string()), page)
    }

    /// Newest-first page of the statements carrying one predicate.
    pub fn statements_by_predicate(
        &self,
        predicate: &str,
        page: Page,
    ) -> Result<StatementPage, StoreError> {
        self.paged(StatementFilter::Predicate(predicate.to_string()), page)
    }

    /// Newest-first page of all statements.
    pub fn paginated_statements(&self, page: Page) -> Result<StatementPage, StoreError> {
        self.paged(StatementFilter::All, page)
    }

    /// Count, then fetch the window. Two independent reads.
    fn paged(&self, filter: StatementFilter, page: Page) -> Result<StatementPage, StoreError> {
        let total_count = row::total(&self.run(&Query::CountStatements {
            filter: filter.clone(),
        })?)?;

        let records = self.run(&Query::PageStatements {
            filter,
            limit: page.limit,
            offset: page.offset,
        })?;
        let statements = row::statements(&records)?;

        Ok(StatementPage::new(statements, total_count, page.offset))
    }

    /// Case-insensitive containment search on object value or subject.
    ///
    /// A blank query matches every statement. At most `SEARCH_RESULT_CAP`
    /// statements are returned, in backend order.
    pub fn search_statements(&self, query: &str) -> Result<Vec<Statement>, StoreError> {
        let needle = if query.trim().is_empty() { "" } else { query };
        let records = self.run(&Query::SearchStatements {
            needle: needle.to_string(),
            cap: SEARCH_RESULT_CAP,
        })?;
        row::statements(&records)
    }

    /// Exact lookup by id.
    pub fn statement(&self, id: &str) -> Result<Option<Statement>, StoreError> {
        let records = self.run(&Query::StatementById { id: id.to_string() })?;
        records.first().map(row::statement).transpose()
    }

    /// Total number of statements.
    pub fn statement_count(&self) -> Result<u64, StoreError> {
        row::total(&self.run(&Query::CountStatements {
            filter: StatementFilter::All,
        })?)
    }

    /// Number of Identifier nodes; with a value, 0 or 1.
    pub fn identifier_count(&self, value: Option<&str>) -> Result<u64, StoreError> {
        row::total(&self.run(&Query::CountIdentifiers {
            value: value.map(str::to_string),
        })?)
    }

    // =========================================================================
    // WRITE OPERATIONS
    // =========================================================================

    /// Create one statement.
    ///
    /// The edge stores the JSON serialization of `object_value`; the returned
    /// value echoes the caller's original value.
    pub fn create_statement(&self, input: NewStatement) -> Result<CreatedStatement, StoreError> {
        if input.subject_identifier.is_empty() {
            return Err(StoreError::InvalidArgument(
                "subject_identifier must not be empty".to_string(),
            ));
        }
        if input.predicate.is_empty() {
            return Err(StoreError::InvalidArgument(
                "predicate must not be empty".to_string(),
            ));
        }
        if let Some(raw) = &input.statement_timestamp {
            validate_timestamp(raw)?;
        }
        let object_text = serde_json::to_string(&input.object_value)?;

        let created_at = format_timestamp(self.clock.now());
        let statement_timestamp = input
            .statement_timestamp
            .clone()
            .unwrap_or_else(|| created_at.clone());

        let write = StatementWrite {
            id: new_statement_id(),
            subject: input.subject_identifier.clone(),
            predicate: input.predicate.clone(),
            object_value: object_text,
            source_id: input.source_id.clone(),
            statement_timestamp: statement_timestamp.clone(),
            created_at: created_at.clone(),
        };
        let id = row::created_id(&self.run(&Query::CreateStatement(write))?)?;

        Ok(CreatedStatement {
            id,
            subject_identifier: input.subject_identifier,
            predicate: input.predicate,
            object_value: input.object_value,
            source_id: input.source_id,
            statement_timestamp,
            created_at,
        })
    }

    /// Delete by id. A missing id is a negative outcome, not an error.
    pub fn delete_statement(&self, id: &str) -> Result<DeleteOutcome, StoreError> {
        let removed = row::deleted(&self.run(&Query::DeleteStatement { id: id.to_string() })?)?;
        if removed > 0 {
            Ok(DeleteOutcome::deleted(id))
        } else {
            Ok(DeleteOutcome::not_found(id))
        }
    }

    /// Bulk ingest of `subject,predicate,object` lines.
    ///
    /// Every accepted line becomes one statement with the raw object text,
    /// `source_id = source_name` and one timestamp shared by the whole batch.
    /// Lines are written one at a time; if the backend fails a write, earlier
    /// lines stay committed and `StoreError::IngestInterrupted` reports how
    /// many. Other errors are returned unchanged.
    pub fn ingest(&self, data: &str, source_name: Option<&str>) -> Result<IngestReport, StoreError> {
        let now = format_timestamp(self.clock.now());
        let source_id = source_name.map(str::to_string);

        let mut subjects = BTreeSet::new();
        let mut committed = 0usize;

        for triple in ingest::parse(data) {
            let write = StatementWrite {
                id: new_statement_id(),
                subject: triple.subject,
                predicate: triple.predicate,
                object_value: triple.object,
                source_id: source_id.clone(),
                statement_timestamp: now.clone(),
                created_at: now.clone(),
            };
            let subject = write.subject.clone();

            let written = self
                .run(&Query::CreateStatement(write))
                .and_then(|records| row::created_id(&records));
            match written {
                Ok(_) => {}
                Err(StoreError::Backend(reason)) => {
                    warn!(committed, error = %reason, "ingest interrupted");
                    return Err(StoreError::IngestInterrupted { committed, reason });
                }
                Err(e) => {
                    warn!(committed, error = %e, "ingest stopped");
                    return Err(e);
                }
            }

            committed += 1;
            subjects.insert(subject);
        }

        info!(
            statements = committed,
            entities = subjects.len(),
            source = source_name.unwrap_or("-"),
            "ingest complete"
        );
        Ok(IngestReport::new(subjects.len(), committed))
    }
}

// =============================================================================
// TESTS
// =============================================================================
