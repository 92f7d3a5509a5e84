//! # kvgraph CLI Module
//!
//! This module implements the CLI interface for kvgraph.
//!
//! ## Available Commands
//!
//! - `init` - Create a new empty graph
//! - `status` - Show graph counters and flags
//! - `node` - Add, inspect, update, delete, list and search nodes
//! - `edge` - Add, inspect, delete and list edges
//! - `neighbors` - Show a node's adjacency list
//! - `bfs` / `dfs` - Breadth-/depth-first search
//! - `paths` - Enumerate simple paths between two nodes
//! - `shortest` - Shortest path (hops or weights)
//! - `neighborhood` - Nodes within a hop radius, grouped by distance
//! - `import` / `export` - JSON or adjacency-list documents

mod commands;

use crate::config::{Backend, Config, Settings};
use clap::{Parser, Subcommand};
use kvgraph_core::{Format, Graph, GraphError, KvStore};
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// kvgraph - graph database on a key-value store
///
/// Nodes, edges and adjacency lists stored as records in redb (or a JSON
/// file), with BFS, DFS, path enumeration and Dijkstra on top.
#[derive(Parser, Debug)]
#[command(name = "kvgraph")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print results and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the graph database [default: kvgraph.redb]
    #[arg(short = 'D', long, global = true)]
    pub database: Option<PathBuf>,

    /// Storage backend [default: redb]
    #[arg(short = 'B', long, global = true, value_enum)]
    pub backend: Option<Backend>,

    /// Path to a kvgraph.toml config file
    #[arg(short = 'c', long, global = true)]
    pub config: Option<PathBuf>,

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
    /// Initialize a new empty graph
    Init {
        /// Overwrite an existing database
        #[arg(short, long)]
        force: bool,

        /// Mirror every edge in both directions
        #[arg(long)]
        undirected: bool,

        /// Record edge weights
        #[arg(long)]
        weighted: bool,
    },

    /// Show graph status
    Status,

    /// Node operations
    #[command(subcommand)]
    Node(NodeCommand),

    /// Edge operations
    #[command(subcommand)]
    Edge(EdgeCommand),

    /// Show the adjacency list of a node
    Neighbors {
        /// Node ID
        id: String,
    },

    /// Breadth-first search
    Bfs {
        /// Start node ID
        start: String,

        /// Stop when this node is reached
        #[arg(short, long)]
        target: Option<String>,
    },

    /// Depth-first search
    Dfs {
        /// Start node ID
        start: String,

        /// Stop when this node is reached
        #[arg(short, long)]
        target: Option<String>,
    },

    /// Enumerate all simple paths between two nodes
    Paths {
        /// Start node ID
        start: String,

        /// End node ID
        end: String,

        /// Maximum number of nodes on a path
        #[arg(short, long)]
        max_length: Option<usize>,

        /// Stop after this many paths
        #[arg(long, default_value_t = kvgraph_core::primitives::DEFAULT_MAX_PATHS)]
        max_paths: usize,
    },

    /// Shortest path between two nodes
    Shortest {
        /// Start node ID
        start: String,

        /// End node ID
        end: String,
    },

    /// Nodes within a hop radius of a center, edges followed both ways
    Neighborhood {
        /// Center node ID
        center: String,

        /// Number of hops to expand
        #[arg(short, long, default_value = "1")]
        radius: usize,

        /// Maximum number of nodes, center included
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Replace the graph with the contents of a file
    Import {
        /// Input file path
        #[arg(short, long)]
        input: PathBuf,

        /// Input format (json, adjacency); guessed from the extension if omitted
        #[arg(short = 't', long)]
        format: Option<Format>,
    },

    /// Export the graph
    Export {
        /// Output file path (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Export format (json, adjacency)
        #[arg(short = 't', long, default_value = "json")]
        format: Format,

        /// Single-line JSON
        #[arg(long)]
        compact: bool,
    },
}

/// `kvgraph node ...`
#[derive(Subcommand, Debug)]
pub enum NodeCommand {
    /// Add a node
    Add {
        id: String,

        /// Attributes as a JSON object
        #[arg(short, long)]
        data: Option<String>,
    },

    /// Show a node and its attributes
    Get { id: String },

    /// Replace a node's attributes
    Update {
        id: String,

        /// Attributes as a JSON object
        #[arg(short, long)]
        data: String,
    },

    /// Delete a node and its edges
    Delete { id: String },

    /// List all node IDs
    List,

    /// Show in/out degree
    Degree { id: String },

    /// Substring search over node IDs
    Search {
        pattern: String,

        /// Match case exactly
        #[arg(long)]
        case_sensitive: bool,

        /// Number of matches to skip
        #[arg(long, default_value = "0")]
        offset: usize,

        /// Page size
        #[arg(long, default_value_t = kvgraph_core::primitives::DEFAULT_SEARCH_LIMIT)]
        limit: usize,
    },
}

/// `kvgraph edge ...`
#[derive(Subcommand, Debug)]
pub enum EdgeCommand {
    /// Add or overwrite an edge
    Add {
        from: String,
        to: String,

        /// Edge weight (kept on weighted graphs)
        #[arg(short, long)]
        weight: Option<f64>,

        /// Edge label
        #[arg(short, long)]
        label: Option<String>,
    },

    /// Show an edge
    Get { from: String, to: String },

    /// Delete an edge
    Delete { from: String, to: String },

    /// List all edges
    List,
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub fn execute(cli: Cli) -> Result<(), GraphError> {
    let config = Config::discover(cli.config.as_deref())?;
    let settings = Settings::resolve(&config, cli.database, cli.backend);
    let json_mode = cli.json_mode;
    let command = cli.command.unwrap_or(Commands::Status);

    tracing::debug!(
        database = %settings.database.display(),
        backend = %settings.backend,
        "resolved settings"
    );

    if let Commands::Init {
        force,
        undirected,
        weighted,
    } = command
    {
        let mut options = settings.options;
        if undirected {
            options.directed = false;
        }
        if weighted {
            options.weighted = true;
        }
        return cmd_init(&settings, options, force, json_mode);
    }

    match settings.backend {
        Backend::Redb => {
            let mut graph = open_redb_graph(&settings)?;
            run(&mut graph, &settings, command, json_mode, cli.quiet)?;
        }
        Backend::File => {
            let mut graph = load_file_graph(&settings)?;
            if run(&mut graph, &settings, command, json_mode, cli.quiet)? {
                save_file_graph(&graph, &settings.database)?;
            }
        }
    }
    Ok(())
}

/// Dispatch a graph command. Returns `true` if the graph was modified.
fn run<S: KvStore>(
    graph: &mut Graph<S>,
    settings: &Settings,
    command: Commands,
    json_mode: bool,
    quiet: bool,
) -> Result<bool, GraphError> {
    match command {
        Commands::Init { .. } | Commands::Status => {
            cmd_status(graph, settings, json_mode, quiet)?;
            Ok(false)
        }
        Commands::Node(node) => cmd_node(graph, node, json_mode),
        Commands::Edge(edge) => cmd_edge(graph, edge, json_mode),
        Commands::Neighbors { id } => {
            cmd_neighbors(graph, &id, json_mode)?;
            Ok(false)
        }
        Commands::Bfs { start, target } => {
            cmd_bfs(graph, &start, target.as_deref(), json_mode)?;
            Ok(false)
        }
        Commands::Dfs { start, target } => {
            cmd_dfs(graph, &start, target.as_deref(), json_mode)?;
            Ok(false)
        }
        Commands::Paths {
            start,
            end,
            max_length,
            max_paths,
        } => {
            cmd_paths(graph, &start, &end, max_length, max_paths, json_mode)?;
            Ok(false)
        }
        Commands::Shortest { start, end } => {
            cmd_shortest(graph, &start, &end, json_mode)?;
            Ok(false)
        }
        Commands::Neighborhood {
            center,
            radius,
            limit,
        } => {
            cmd_neighborhood(graph, &center, radius, limit, json_mode)?;
            Ok(false)
        }
        Commands::Import { input, format } => {
            cmd_import(graph, &input, format, json_mode)?;
            Ok(true)
        }
        Commands::Export {
            output,
            format,
            compact,
        } => {
            cmd_export(graph, output.as_deref(), format, compact)?;
            Ok(false)
        }
    }
}
