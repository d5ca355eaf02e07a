//! # Trellis
//!
//! Query Facade and command line for the trellis statement store.
//!
//! - `api` → axum router, handlers and server startup
//! - `cli` → clap command tree and command implementations
//! - `config` → TOML / environment / flag layering into a `StoreConfig`

pub mod api;
pub mod cli;
pub mod config;
