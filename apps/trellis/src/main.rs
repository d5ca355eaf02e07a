//! # Trellis - Statement Store Server
//!
//! The main binary for the trellis statement store.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                  apps/trellis (THE BINARY)               │
//! │                                                          │
//! │   ┌─────────────┐   ┌──────────────┐   ┌─────────────┐   │
//! │   │    CLI      │   │ Query Facade │   │   Config    │   │
//! │   │   (clap)    │   │    (axum)    │   │ (toml/env)  │   │
//! │   └──────┬──────┘   └──────┬───────┘   └──────┬──────┘   │
//! │          └─────────────────┼──────────────────┘          │
//! │                            ▼                             │
//! │                    ┌───────────────┐                     │
//! │                    │ trellis-core  │                     │
//! │                    │  (THE STORE)  │                     │
//! │                    └───────┬───────┘                     │
//! │                            ▼                             │
//! │            memory  |  redb  |  Cypher over HTTP          │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Start the HTTP server on a redb file
//! trellis --endpoint redb:facts.redb server --port 8080
//!
//! # CLI operations
//! trellis status
//! trellis ingest -f facts.csv --source crm
//! trellis search alice
//! ```

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use trellis::cli;

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    // TRELLIS_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("TRELLIS_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "trellis=info,trellis_core=info,tower_http=debug".into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    let cli = cli::Cli::parse();

    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

fn print_banner() {
    println!(
        r#"
  ╔╦╗╦═╗╔═╗╦  ╦  ╦╔═╗
   ║ ╠╦╝║╣ ║  ║  ║╚═╗
   ╩ ╩╚═╚═╝╩═╝╩═╝╩╚═╝

  Statement Store v{}
"#,
        env!("CARGO_PKG_VERSION")
    );
}
