//! # Trellis CLI Module
//!
//! ## Available Commands
//!
//! - `server` - Start the HTTP server
//! - `status` - Show store status (default)
//! - `subjects` - List distinct subjects
//! - `list` - Page through all statements, newest first
//! - `get` - Show one statement
//! - `search` - Containment search over objects and subjects
//! - `create` - Create one statement
//! - `delete` - Delete one statement
//! - `ingest` - Bulk ingest `subject,predicate,object` lines from a file

mod commands;

use crate::config::{self, Settings};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use trellis_core::StoreError;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Trellis - statement store with provenance
///
/// Stores subject-predicate-object statements with source and time, and
/// serves them over HTTP.
#[derive(Parser, Debug)]
#[command(name = "trellis")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Store endpoint: "memory", "redb:<path>", a file path, or an http(s) URL
    #[arg(short = 'E', long, global = true)]
    pub endpoint: Option<String>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start HTTP server
    Server {
        /// Host to bind to [default: 127.0.0.1]
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to bind to [default: 8080]
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Show store status
    Status,

    /// List distinct subjects
    Subjects,

    /// List statements, newest first
    List {
        #[arg(short, long, default_value = "10", allow_hyphen_values = true)]
        limit: i64,

        #[arg(short, long, default_value = "0", allow_hyphen_values = true)]
        offset: i64,
    },

    /// Show one statement by id
    Get { id: String },

    /// Search objects and subjects (case-insensitive)
    Search { query: String },

    /// Create a statement
    Create {
        subject: String,
        predicate: String,
        /// Object as JSON; text that is not valid JSON is stored as a JSON string
        object: String,

        /// Provenance tag
        #[arg(short, long)]
        source: Option<String>,

        /// RFC 3339 timestamp of the fact [default: now]
        #[arg(short, long)]
        timestamp: Option<String>,
    },

    /// Delete a statement by id
    Delete { id: String },

    /// Ingest `subject,predicate,object` lines from a file
    Ingest {
        /// Path to the input file
        #[arg(short, long)]
        file: PathBuf,

        /// Provenance tag [default: the file name]
        #[arg(short, long)]
        source: Option<String>,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), StoreError> {
    let json_mode = cli.json_mode;
    let settings = config::resolve(cli.config.as_deref())?;

    match cli.command {
        Some(Commands::Server { host, port }) => {
            cmd_server(settings.with_flags(cli.endpoint, host, port)).await
        }
        Some(command) => {
            let settings = settings.with_flags(cli.endpoint, None, None);
            run_local(command, &settings, json_mode)
        }
        // No subcommand - show status by default
        None => run_local(
            Commands::Status,
            &settings.with_flags(cli.endpoint, None, None),
            json_mode,
        ),
    }
}

fn run_local(command: Commands, settings: &Settings, json_mode: bool) -> Result<(), StoreError> {
    let store = open_store(settings)?;
    match command {
        Commands::Status => cmd_status(&store, json_mode),
        Commands::Subjects => cmd_subjects(&store, json_mode),
        Commands::List { limit, offset } => cmd_list(&store, json_mode, limit, offset),
        Commands::Get { id } => cmd_get(&store, json_mode, &id),
        Commands::Search { query } => cmd_search(&store, json_mode, &query),
        Commands::Create {
            subject,
            predicate,
            object,
            source,
            timestamp,
        } => cmd_create(
            &store,
            json_mode,
            CreateArgs {
                subject,
                predicate,
                object,
                source,
                timestamp,
            },
        ),
        Commands::Delete { id } => cmd_delete(&store, json_mode, &id),
        Commands::Ingest { file, source } => cmd_ingest(&store, json_mode, &file, source),
        Commands::Server { .. } => Err(StoreError::Config(
            "server runs on the async runtime".to_string(),
        )),
    }
}
