//! # trellis-core
//!
//! The Statement Store for Trellis - THE STORE.
//!
//! This crate implements a subject-predicate-object statement store with
//! provenance and timestamps. Every statement is a directed, labelled edge
//! between two deduplicated Identifier nodes.
//!
//! ## Layers
//!
//! - `types` → data model, request/response shapes, `StoreError`
//! - `query` → the closed vocabulary of backend round trips (Cypher text + parameters)
//! - `executor` → the `QueryExecutor` trait every backend implements
//! - `row` → the single place where backend records are read by field name
//! - `store` → `StatementStore`, the operations exposed to the facade
//! - `storage` → embedded (`MemoryGraph`, `RedbGraph`) and remote executors
//!
//! ## Architectural Constraints
//!
//! - The store holds no mutable state; the executor owns the graph
//! - Synchronous: NO async runtime in this crate
//! - Multi-step operations are NOT wrapped in a transaction (read-committed at best)

// =============================================================================
// MODULES
// =============================================================================

pub mod config;
pub mod executor;
pub mod identity;
pub mod ingest;
pub mod primitives;
pub mod query;
pub mod row;
pub mod storage;
pub mod store;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{
    CreatedStatement, DeleteOutcome, IngestReport, NewStatement, Page, Statement, StatementPage,
    StoreError,
};

// =============================================================================
// RE-EXPORTS: Store & Backends
// =============================================================================

pub use config::{Credentials, Endpoint, StoreConfig};
pub use executor::{QueryExecutor, Record};
pub use identity::{Clock, SteppingClock, SystemClock};
pub use ingest::Triple;
pub use query::{Query, StatementFilter, StatementWrite};
#[cfg(feature = "remote")]
pub use storage::CypherHttp;
pub use storage::{MemoryGraph, RedbGraph};
pub use store::StatementStore;
