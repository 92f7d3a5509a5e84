//! # kvgraph
//!
//! The main binary for the kvgraph graph database.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                apps/kvgraph (THE BINARY)             │
//! │                                                      │
//! │   ┌─────────────┐          ┌──────────────────┐      │
//! │   │    CLI      │          │     Config       │      │
//! │   │   (clap)    │          │ (kvgraph.toml)   │      │
//! │   └──────┬──────┘          └────────┬─────────┘      │
//! │          └──────────────┬───────────┘                │
//! │                         ▼                            │
//! │                 ┌───────────────┐                    │
//! │                 │ kvgraph-core  │                    │
//! │                 │ (THE ENGINE)  │                    │
//! │                 └───────┬───────┘                    │
//! │                         ▼                            │
//! │              redb database / JSON file               │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! kvgraph init --undirected --weighted
//! kvgraph node add A --data '{"label": "Start"}'
//! kvgraph edge add A B --weight 2.5
//! kvgraph shortest A B
//! kvgraph export -t adjacency
//! ```

use clap::Parser;
use kvgraph::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

fn main() {
    let cli = cli::Cli::parse();

    // KVGRAPH_LOG_FORMAT=json switches to machine-parseable output.
    // Logs go to stderr so command output can be piped.
    let log_format = std::env::var("KVGRAPH_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let default_filter = if cli.verbose {
        "kvgraph=debug,kvgraph_core=debug"
    } else if cli.quiet {
        "kvgraph=warn,kvgraph_core=warn"
    } else {
        "kvgraph=info,kvgraph_core=info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

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

    // Execute command
    if let Err(e) = cli::execute(cli) {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}
