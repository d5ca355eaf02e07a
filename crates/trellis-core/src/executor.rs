//! # Query Execution Interface
//!
//! The seam between the statement store and whatever graph engine backs it.

use crate::StoreError;
use crate::query::Query;

/// One result row: an ordered mapping from column name to value.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// Executes store queries against a backing graph.
///
/// Implementations must acquire whatever session, lock, or transaction they
/// need inside `execute` and release it on every exit path. A failure,
/// including an error reported inside an otherwise successful response, is
/// returned as `StoreError::Backend`.
///
/// Executors must be `Send + Sync`: requests from different callers run
/// concurrently against the same executor.
pub trait QueryExecutor: Send + Sync {
    /// Run one query and return its records in backend order.
    fn execute(&self, query: &Query) -> Result<Vec<Record>, StoreError>;

    /// Short backend name for logs and status output.
    fn backend_name(&self) -> &'static str;
}

impl<E: QueryExecutor + ?Sized> QueryExecutor for Box<E> {
    fn execute(&self, query: &Query) -> Result<Vec<Record>, StoreError> {
        (**self).execute(query)
    }

    fn backend_name(&self) -> &'static str {
        (**self).backend_name()
    }
}

impl<E: QueryExecutor + ?Sized> QueryExecutor for std::sync::Arc<E> {
    fn execute(&self, query: &Query) -> Result<Vec<Record>, StoreError> {
        (**self).execute(query)
    }

    fn backend_name(&self) -> &'static str {
        (**self).backend_name()
    }
}
