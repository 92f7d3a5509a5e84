//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use super::{EdgeCommand, NodeCommand};
use crate::config::{Backend, Settings};
use kvgraph_core::codec::json;
use kvgraph_core::traversal::{all_simple_paths, bfs, dfs, neighborhood, shortest_path};
use kvgraph_core::{
    Attributes, Edge, Format, Graph, GraphError, GraphOptions, KvStore, MemoryStore, NodeId,
    RedbStore, SearchCriteria,
};
use serde::Serialize;
use std::path::{Path, PathBuf};

// =============================================================================
// FILE SIZE LIMITS
// =============================================================================

/// Maximum file size for import (500 MB).
///
/// This prevents memory exhaustion from malicious or accidental large files.
const MAX_IMPORT_FILE_SIZE: u64 = 500 * 1024 * 1024;

/// Validate file size before reading.
fn validate_file_size(path: &Path, max_size: u64) -> Result<(), GraphError> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| GraphError::Io(format!("Cannot read file metadata: {}", e)))?;

    if metadata.len() > max_size {
        return Err(GraphError::Io(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            max_size
        )));
    }
    Ok(())
}

/// Resolve an input path and make sure it names a regular file.
fn validate_file_path(path: &Path) -> Result<PathBuf, GraphError> {
    let canonical = path.canonicalize().map_err(|e| {
        GraphError::Io(format!("Invalid file path '{}': {}", path.display(), e))
    })?;

    if !canonical.is_file() {
        return Err(GraphError::Io(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }

    Ok(canonical)
}

/// Resolve an output path against its (existing) parent directory.
fn validate_output_path(path: &Path) -> Result<PathBuf, GraphError> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let canonical_parent = parent.canonicalize().map_err(|e| {
        GraphError::Io(format!(
            "Invalid output directory '{}': {}",
            parent.display(),
            e
        ))
    })?;

    if !canonical_parent.is_dir() {
        return Err(GraphError::Io(format!(
            "Output directory '{}' is not a valid directory",
            parent.display()
        )));
    }

    let filename = path
        .file_name()
        .ok_or_else(|| GraphError::Io("Output path has no filename".to_string()))?;

    Ok(canonical_parent.join(filename))
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    println!(
        "{}",
        serde_json::to_string_pretty(value).unwrap_or_default()
    );
}

fn parse_attributes(raw: &str) -> Result<Attributes, GraphError> {
    serde_json::from_str(raw)
        .map_err(|e| GraphError::Json(format!("node data must be a JSON object: {}", e)))
}

fn join_ids(ids: &[NodeId]) -> String {
    ids.iter()
        .map(NodeId::as_str)
        .collect::<Vec<_>>()
        .join(" -> ")
}

// =============================================================================
// STORAGE
// =============================================================================

/// Open (or create) the redb database named by the settings.
pub fn open_redb_graph(settings: &Settings) -> Result<Graph<RedbStore>, GraphError> {
    let store = RedbStore::open(&settings.database)?;
    Graph::open(store, settings.options)
}

/// Load the JSON document named by the settings, or start empty.
pub fn load_file_graph(settings: &Settings) -> Result<Graph<MemoryStore>, GraphError> {
    let mut graph = Graph::in_memory(settings.options);
    if settings.database.exists() {
        let path = validate_file_path(&settings.database)?;
        validate_file_size(&path, MAX_IMPORT_FILE_SIZE)?;
        let text = std::fs::read_to_string(&path)
            .map_err(|e| GraphError::Io(format!("Read db: {}", e)))?;
        json::import_json(&mut graph, &text)?;
    }
    Ok(graph)
}

/// Write the graph back as a JSON document.
pub fn save_file_graph(graph: &Graph<MemoryStore>, path: &Path) -> Result<(), GraphError> {
    let text = json::export_json(graph, true)?;
    std::fs::write(path, text).map_err(|e| GraphError::Io(format!("Write db: {}", e)))?;
    tracing::debug!(path = %path.display(), "saved graph document");
    Ok(())
}

// =============================================================================
// INIT COMMAND
// =============================================================================

/// Create a new empty graph.
pub fn cmd_init(
    settings: &Settings,
    options: GraphOptions,
    force: bool,
    json_mode: bool,
) -> Result<(), GraphError> {
    let db_path = &settings.database;
    if db_path.exists() && !force {
        return Err(GraphError::Config(format!(
            "Database {} already exists. Use --force to overwrite.",
            db_path.display()
        )));
    }

    match settings.backend {
        Backend::Redb => {
            let store = RedbStore::open(db_path)?;
            Graph::create(store, options)?;
        }
        Backend::File => {
            save_file_graph(&Graph::in_memory(options), db_path)?;
        }
    }
    tracing::info!(database = %db_path.display(), backend = %settings.backend, "initialized graph");

    if json_mode {
        print_json(&serde_json::json!({
            "database": db_path.to_string_lossy(),
            "backend": settings.backend,
            "directed": options.directed,
            "weighted": options.weighted,
        }));
    } else {
        println!("Initialized new graph at {}", db_path.display());
        println!(
            "  {}, {}",
            if options.directed { "directed" } else { "undirected" },
            if options.weighted { "weighted" } else { "unweighted" }
        );
    }
    Ok(())
}

// =============================================================================
// STATUS COMMAND
// =============================================================================

/// Show graph status.
pub fn cmd_status<S: KvStore>(
    graph: &Graph<S>,
    settings: &Settings,
    json_mode: bool,
    quiet: bool,
) -> Result<(), GraphError> {
    let stats = graph.stats()?;

    if json_mode {
        print_json(&serde_json::json!({
            "database": settings.database.to_string_lossy(),
            "backend": settings.backend,
            "nodes": stats.nodes,
            "edges": stats.edges,
            "directed": stats.directed,
            "weighted": stats.weighted,
            "avg_degree": stats.avg_degree,
            "db_entries": stats.db_entries,
        }));
        return Ok(());
    }

    if !quiet {
        println!("kvgraph v{}", env!("CARGO_PKG_VERSION"));
        println!();
    }
    println!("Graph Status");
    println!("============");
    println!("Database:   {}", settings.database.display());
    println!("Backend:    {}", settings.backend);
    println!(
        "Type:       {}, {}",
        if stats.directed { "directed" } else { "undirected" },
        if stats.weighted { "weighted" } else { "unweighted" }
    );
    println!();
    println!("Nodes:      {}", stats.nodes);
    println!("Edges:      {}", stats.edges);
    println!("Avg Degree: {:.2}", stats.avg_degree);
    println!("DB Entries: {}", stats.db_entries);

    Ok(())
}

// =============================================================================
// NODE COMMANDS
// =============================================================================

/// Run a node subcommand. Returns `true` if the graph was modified.
pub fn cmd_node<S: KvStore>(
    graph: &mut Graph<S>,
    command: NodeCommand,
    json_mode: bool,
) -> Result<bool, GraphError> {
    match command {
        NodeCommand::Add { id, data } => {
            let data = data.as_deref().map(parse_attributes).transpose()?;
            let created = graph.add_node(&id, data)?;
            report_change(json_mode, "added", created, &format!("node {}", id));
            Ok(created)
        }
        NodeCommand::Update { id, data } => {
            let updated = graph.update_node(&id, parse_attributes(&data)?)?;
            report_change(json_mode, "updated", updated, &format!("node {}", id));
            Ok(updated)
        }
        NodeCommand::Delete { id } => {
            let deleted = graph.delete_node(&id)?;
            report_change(json_mode, "deleted", deleted, &format!("node {}", id));
            Ok(deleted)
        }
        NodeCommand::Get { id } => {
            let node = graph.get_node(&id)?;
            if json_mode {
                print_json(&node);
            } else {
                match node {
                    Some(node) => {
                        println!("{}", node.id);
                        for (key, value) in &node.data {
                            println!("  {}: {}", key, value);
                        }
                    }
                    None => println!("Node {} not found", id),
                }
            }
            Ok(false)
        }
        NodeCommand::List => {
            let nodes = graph.list_nodes()?;
            if json_mode {
                print_json(&nodes);
            } else {
                for node in &nodes {
                    println!("{}", node);
                }
            }
            Ok(false)
        }
        NodeCommand::Degree { id } => {
            let degree = graph.get_degree(&id)?;
            if json_mode {
                print_json(&degree);
            } else {
                println!(
                    "{}: in {}, out {}, total {}",
                    id, degree.in_degree, degree.out_degree, degree.total
                );
            }
            Ok(false)
        }
        NodeCommand::Search {
            pattern,
            case_sensitive,
            offset,
            limit,
        } => {
            let mut criteria = SearchCriteria::new(pattern).page(offset, limit);
            if case_sensitive {
                criteria = criteria.case_sensitive();
            }
            let result = graph.search_nodes(&criteria)?;
            if json_mode {
                print_json(&result);
            } else {
                println!(
                    "{} match(es), showing {} from offset {}",
                    result.total,
                    result.nodes.len(),
                    result.offset
                );
                for node in &result.nodes {
                    println!("  {}", node.id);
                }
            }
            Ok(false)
        }
    }
}

/// Print the outcome of a mutation.
fn report_change(json_mode: bool, action: &str, changed: bool, what: &str) {
    if json_mode {
        print_json(&serde_json::json!({ "action": action, "success": changed }));
    } else if changed {
        println!("{} {}", capitalize(action), what);
    } else {
        println!("Nothing {}: {} rejected or not found", action, what);
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// =============================================================================
// EDGE COMMANDS
// =============================================================================

/// Run an edge subcommand. Returns `true` if the graph was modified.
pub fn cmd_edge<S: KvStore>(
    graph: &mut Graph<S>,
    command: EdgeCommand,
    json_mode: bool,
) -> Result<bool, GraphError> {
    match command {
        EdgeCommand::Add {
            from,
            to,
            weight,
            label,
        } => {
            let mut edge = Edge::new(from.as_str(), to.as_str());
            edge.weight = weight;
            edge.label = label;
            let written = graph.insert_edge(edge)?;
            report_change(json_mode, "added", written, &format!("edge {} -> {}", from, to));
            Ok(written)
        }
        EdgeCommand::Delete { from, to } => {
            let deleted = graph.delete_edge(&from, &to)?;
            report_change(json_mode, "deleted", deleted, &format!("edge {} -> {}", from, to));
            Ok(deleted)
        }
        EdgeCommand::Get { from, to } => {
            let edge = graph.get_edge(&from, &to)?;
            if json_mode {
                print_json(&edge);
            } else {
                match edge {
                    Some(edge) => println!("{}", describe_edge(&edge)),
                    None => println!("Edge {} -> {} not found", from, to),
                }
            }
            Ok(false)
        }
        EdgeCommand::List => {
            let edges = graph.get_all_edges()?;
            if json_mode {
                print_json(&edges);
            } else {
                for edge in &edges {
                    println!("{}", describe_edge(edge));
                }
            }
            Ok(false)
        }
    }
}

fn describe_edge(edge: &Edge) -> String {
    let mut line = format!("{} -> {}", edge.from, edge.to);
    if let Some(weight) = edge.weight {
        line.push_str(&format!(" ({})", weight));
    }
    if let Some(label) = &edge.label {
        line.push_str(&format!(" [{}]", label));
    }
    line
}

// =============================================================================
// TRAVERSAL COMMANDS
// =============================================================================

/// Show the adjacency list of a node.
pub fn cmd_neighbors<S: KvStore>(
    graph: &Graph<S>,
    id: &str,
    json_mode: bool,
) -> Result<(), GraphError> {
    let neighbors = graph.get_neighbors(id)?;
    if json_mode {
        print_json(&neighbors);
        return Ok(());
    }

    if neighbors.is_empty() {
        println!("{} has no neighbors", id);
    }
    for entry in &neighbors {
        match entry.weight {
            Some(weight) => println!("{} ({})", entry.to, weight),
            None => println!("{}", entry.to),
        }
    }
    Ok(())
}

/// Breadth-first search.
pub fn cmd_bfs<S: KvStore>(
    graph: &Graph<S>,
    start: &str,
    target: Option<&str>,
    json_mode: bool,
) -> Result<(), GraphError> {
    let result = bfs(graph, start, target)?;
    if json_mode {
        print_json(&result);
        return Ok(());
    }

    println!("Visited: {}", join_ids(&result.visited));
    if let Some(target) = target {
        if result.found {
            println!(
                "Found {} at distance {}: {}",
                target,
                result.distances.get(target).copied().unwrap_or_default(),
                join_ids(&result.path)
            );
        } else {
            println!("{} not reachable from {}", target, start);
        }
    }
    Ok(())
}

/// Depth-first search.
pub fn cmd_dfs<S: KvStore>(
    graph: &Graph<S>,
    start: &str,
    target: Option<&str>,
    json_mode: bool,
) -> Result<(), GraphError> {
    let result = dfs(graph, start, target)?;
    if json_mode {
        print_json(&result);
        return Ok(());
    }

    println!("Visited: {}", join_ids(&result.visited));
    if let Some(target) = target {
        if result.found {
            println!("Found {}: {}", target, join_ids(&result.path));
        } else {
            println!("{} not reachable from {}", target, start);
        }
    }
    Ok(())
}

/// Enumerate simple paths.
pub fn cmd_paths<S: KvStore>(
    graph: &Graph<S>,
    start: &str,
    end: &str,
    max_length: Option<usize>,
    max_paths: usize,
    json_mode: bool,
) -> Result<(), GraphError> {
    let paths = all_simple_paths(graph, start, end, max_length, Some(max_paths))?;
    if json_mode {
        print_json(&paths);
        return Ok(());
    }

    println!("{} path(s) from {} to {}", paths.len(), start, end);
    for path in &paths {
        println!("  {}", join_ids(path));
    }
    if paths.len() == max_paths {
        println!("(stopped at {}; raise --max-paths for more)", max_paths);
    }
    Ok(())
}

/// Shortest path.
pub fn cmd_shortest<S: KvStore>(
    graph: &Graph<S>,
    start: &str,
    end: &str,
    json_mode: bool,
) -> Result<(), GraphError> {
    let result = shortest_path(graph, start, end)?;
    if json_mode {
        // JSON has no infinity; unreachable targets report a null distance.
        print_json(&serde_json::json!({
            "path": result.path,
            "distance": result.is_reachable().then_some(result.distance),
        }));
        return Ok(());
    }

    if result.is_reachable() {
        println!("{} (distance {})", join_ids(&result.path), result.distance);
    } else {
        println!("No path from {} to {}", start, end);
    }
    Ok(())
}

/// Hop-bounded neighborhood.
pub fn cmd_neighborhood<S: KvStore>(
    graph: &Graph<S>,
    center: &str,
    radius: usize,
    limit: Option<usize>,
    json_mode: bool,
) -> Result<(), GraphError> {
    let hood = neighborhood(graph, center, radius, limit)?;
    if json_mode {
        print_json(&hood);
        return Ok(());
    }

    if hood.center.is_none() {
        println!("Node {} not found", center);
        return Ok(());
    }
    for (distance, level) in hood.levels.iter().enumerate() {
        println!("{}: {}", distance, join_ids(level));
    }
    println!("{} edge(s) inside", hood.edges.len());
    Ok(())
}

// =============================================================================
// IMPORT / EXPORT COMMANDS
// =============================================================================

/// Replace the graph with a document read from `input`.
pub fn cmd_import<S: KvStore>(
    graph: &mut Graph<S>,
    input: &Path,
    format: Option<Format>,
    json_mode: bool,
) -> Result<(), GraphError> {
    let path = validate_file_path(input)?;
    validate_file_size(&path, MAX_IMPORT_FILE_SIZE)?;

    let format = format.or_else(|| Format::from_path(&path)).ok_or_else(|| {
        GraphError::Config(format!(
            "Cannot guess format of '{}'; pass --format",
            input.display()
        ))
    })?;

    let text = std::fs::read_to_string(&path)
        .map_err(|e| GraphError::Io(format!("Read input: {}", e)))?;
    let report = format.import(graph, &text)?;

    if json_mode {
        print_json(&report);
    } else {
        println!(
            "Imported {} nodes, {} edges from {}",
            report.nodes_created,
            report.edges_created,
            input.display()
        );
    }
    Ok(())
}

/// Write the graph to `output`, or stdout.
pub fn cmd_export<S: KvStore>(
    graph: &Graph<S>,
    output: Option<&Path>,
    format: Format,
    compact: bool,
) -> Result<(), GraphError> {
    let text = format.export(graph, !compact)?;

    match output {
        Some(output) => {
            let path = validate_output_path(output)?;
            std::fs::write(&path, &text)
                .map_err(|e| GraphError::Io(format!("Write output: {}", e)))?;
            tracing::info!(path = %path.display(), %format, bytes = text.len(), "exported graph");
        }
        None => println!("{}", text),
    }
    Ok(())
}
