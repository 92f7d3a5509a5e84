//! End-to-end tests for the kvgraph CLI.
//!
//! Each test drives `cli::execute` against a database inside a temporary
//! directory, then reopens the stored graph to check what was written.

#![allow(clippy::unwrap_used, clippy::panic)]

use clap::Parser;
use kvgraph::cli::{self, Cli};
use kvgraph::config::{Backend, Settings};
use kvgraph_core::{Graph, GraphError, GraphOptions, RedbStore};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn run(args: &[&str]) -> Result<(), GraphError> {
    let cli = Cli::try_parse_from(std::iter::once("kvgraph").chain(args.iter().copied()))
        .expect("arguments should parse");
    cli::execute(cli)
}

fn run_on(db: &Path, backend: &str, args: &[&str]) -> Result<(), GraphError> {
    let db = db.to_string_lossy().into_owned();
    let mut full = vec!["-q", "-D", db.as_str(), "-B", backend];
    full.extend_from_slice(args);
    run(&full)
}

fn reopen_redb(db: &Path) -> Graph<RedbStore> {
    let store = RedbStore::open(db).expect("open redb");
    Graph::open(store, GraphOptions::default()).expect("open graph")
}

fn file_settings(db: &Path) -> Settings {
    Settings {
        database: db.to_path_buf(),
        backend: Backend::File,
        options: GraphOptions::default(),
    }
}

fn db_path(dir: &TempDir, name: &str) -> PathBuf {
    dir.path().join(name)
}

// =============================================================================
// ARGUMENT PARSING
// =============================================================================

#[test]
fn test_parse_global_flags() {
    let cli = Cli::try_parse_from([
        "kvgraph", "node", "add", "A", "-D", "g.redb", "-B", "file", "--json-mode",
    ])
    .unwrap();

    assert_eq!(cli.database, Some(PathBuf::from("g.redb")));
    assert_eq!(cli.backend, Some(Backend::File));
    assert!(cli.json_mode);
    assert!(matches!(
        cli.command,
        Some(cli::Commands::Node(cli::NodeCommand::Add { ref id, data: None })) if id == "A"
    ));
}

#[test]
fn test_parse_rejects_unknown_backend() {
    assert!(Cli::try_parse_from(["kvgraph", "-B", "memory", "status"]).is_err());
}

#[test]
fn test_parse_traversal_limits() {
    let cli = Cli::try_parse_from(["kvgraph", "paths", "A", "B"]).unwrap();
    match cli.command {
        Some(cli::Commands::Paths {
            max_length,
            max_paths,
            ..
        }) => {
            assert_eq!(max_length, None);
            assert_eq!(max_paths, kvgraph_core::primitives::DEFAULT_MAX_PATHS);
        }
        other => panic!("unexpected command: {:?}", other),
    }

    let cli = Cli::try_parse_from(["kvgraph", "paths", "A", "B", "--max-paths", "3"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(cli::Commands::Paths { max_paths: 3, .. })
    ));

    let cli = Cli::try_parse_from(["kvgraph", "neighborhood", "A"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(cli::Commands::Neighborhood {
            radius: 1,
            limit: None,
            ..
        })
    ));
}

#[test]
fn test_parse_export_format() {
    let cli = Cli::try_parse_from(["kvgraph", "export", "-t", "adj"]).unwrap();
    match cli.command {
        Some(cli::Commands::Export { format, .. }) => {
            assert_eq!(format, kvgraph_core::Format::Adjacency);
        }
        other => panic!("unexpected command: {:?}", other),
    }
}

// =============================================================================
// REDB BACKEND
// =============================================================================

#[test]
fn test_init_and_mutate_redb() {
    let dir = TempDir::new().unwrap();
    let db = db_path(&dir, "graph.redb");

    run_on(&db, "redb", &["init", "--weighted"]).unwrap();
    run_on(&db, "redb", &["node", "add", "A", "--data", r#"{"label":"Start"}"#]).unwrap();
    run_on(&db, "redb", &["node", "add", "B"]).unwrap();
    run_on(&db, "redb", &["edge", "add", "A", "B", "--weight", "2.5"]).unwrap();

    let graph = reopen_redb(&db);
    assert!(graph.is_directed());
    assert!(graph.is_weighted());
    assert_eq!(graph.node_count().unwrap(), 2);
    assert_eq!(graph.edge_count().unwrap(), 1);

    let node = graph.get_node("A").unwrap().unwrap();
    assert_eq!(node.data.get("label"), Some(&serde_json::json!("Start")));

    let edge = graph.get_edge("A", "B").unwrap().unwrap();
    assert_eq!(edge.weight, Some(2.5));
}

#[test]
fn test_init_refuses_existing_database() {
    let dir = TempDir::new().unwrap();
    let db = db_path(&dir, "graph.redb");

    run_on(&db, "redb", &["init"]).unwrap();
    let err = run_on(&db, "redb", &["init"]).unwrap_err();
    assert!(matches!(err, GraphError::Config(_)));

    run_on(&db, "redb", &["init", "--force", "--undirected"]).unwrap();
    assert!(!reopen_redb(&db).is_directed());
}

#[test]
fn test_node_delete_cascades_redb() {
    let dir = TempDir::new().unwrap();
    let db = db_path(&dir, "graph.redb");

    run_on(&db, "redb", &["init"]).unwrap();
    for id in ["A", "B", "C"] {
        run_on(&db, "redb", &["node", "add", id]).unwrap();
    }
    run_on(&db, "redb", &["edge", "add", "A", "B"]).unwrap();
    run_on(&db, "redb", &["edge", "add", "B", "C"]).unwrap();
    run_on(&db, "redb", &["node", "delete", "B"]).unwrap();

    let graph = reopen_redb(&db);
    assert_eq!(graph.node_count().unwrap(), 2);
    assert_eq!(graph.edge_count().unwrap(), 0);
    assert!(graph.get_neighbors("A").unwrap().is_empty());
}

#[test]
fn test_read_commands_succeed_redb() {
    let dir = TempDir::new().unwrap();
    let db = db_path(&dir, "graph.redb");

    run_on(&db, "redb", &["init"]).unwrap();
    run_on(&db, "redb", &["node", "add", "A"]).unwrap();
    run_on(&db, "redb", &["node", "add", "B"]).unwrap();
    run_on(&db, "redb", &["edge", "add", "A", "B"]).unwrap();

    for args in [
        vec!["status"],
        vec!["node", "list"],
        vec!["node", "get", "A"],
        vec!["node", "degree", "B"],
        vec!["node", "search", "a", "--limit", "1"],
        vec!["edge", "list"],
        vec!["edge", "get", "A", "B"],
        vec!["neighbors", "A"],
        vec!["bfs", "A", "--target", "B"],
        vec!["dfs", "A"],
        vec!["paths", "A", "B", "--max-length", "2"],
        vec!["paths", "A", "B", "--max-paths", "1"],
        vec!["shortest", "B", "A"],
        vec!["--json-mode", "shortest", "B", "A"],
        vec!["neighborhood", "B", "--radius", "2"],
        vec!["--json-mode", "neighborhood", "A", "-l", "1"],
        vec!["neighborhood", "ghost"],
    ] {
        run_on(&db, "redb", &args).unwrap_or_else(|e| panic!("{:?} failed: {}", args, e));
    }
}

#[test]
fn test_non_finite_weight_is_rejected_redb() {
    let dir = TempDir::new().unwrap();
    let db = db_path(&dir, "graph.redb");

    run_on(&db, "redb", &["init", "--weighted"]).unwrap();
    run_on(&db, "redb", &["node", "add", "A"]).unwrap();
    run_on(&db, "redb", &["node", "add", "B"]).unwrap();

    for weight in ["inf", "infinity", "NaN"] {
        let err = run_on(&db, "redb", &["edge", "add", "A", "B", "--weight", weight]).unwrap_err();
        assert!(
            matches!(err, GraphError::InvalidWeight { .. }),
            "{} gave {:?}",
            weight,
            err
        );
    }

    let graph = reopen_redb(&db);
    assert_eq!(graph.edge_count().unwrap(), 0);
    assert!(graph.get_edge("A", "B").unwrap().is_none());
}

#[test]
fn test_invalid_node_data_is_rejected() {
    let dir = TempDir::new().unwrap();
    let db = db_path(&dir, "graph.redb");

    run_on(&db, "redb", &["init"]).unwrap();
    let err = run_on(&db, "redb", &["node", "add", "A", "--data", "[1, 2]"]).unwrap_err();
    assert!(matches!(err, GraphError::Json(_)));
    assert_eq!(reopen_redb(&db).node_count().unwrap(), 0);
}

// =============================================================================
// FILE BACKEND
// =============================================================================

#[test]
fn test_file_backend_saves_mutations() {
    let dir = TempDir::new().unwrap();
    let db = db_path(&dir, "graph.json");

    run_on(&db, "file", &["init", "--undirected"]).unwrap();
    run_on(&db, "file", &["node", "add", "A"]).unwrap();
    run_on(&db, "file", &["node", "add", "B"]).unwrap();
    run_on(&db, "file", &["edge", "add", "A", "B"]).unwrap();

    let text = std::fs::read_to_string(&db).unwrap();
    let document: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(document["directed"], serde_json::json!(false));

    let graph = cli::load_file_graph(&file_settings(&db)).unwrap();
    assert!(!graph.is_directed());
    assert_eq!(graph.node_count().unwrap(), 2);
    assert_eq!(graph.edge_count().unwrap(), 1);
    assert!(graph.edge_exists("B", "A").unwrap());
}

#[test]
fn test_file_backend_missing_document_is_empty() {
    let dir = TempDir::new().unwrap();
    let db = db_path(&dir, "absent.json");

    run_on(&db, "file", &["status"]).unwrap();
    assert!(!db.exists());
}

// =============================================================================
// IMPORT / EXPORT
// =============================================================================

#[test]
fn test_import_adjacency_then_export_json() {
    let dir = TempDir::new().unwrap();
    let db = db_path(&dir, "graph.redb");
    let input = db_path(&dir, "cities.adj");
    let output = db_path(&dir, "cities.json");
    std::fs::write(&input, "A -> B(1.0), C(4.0)\nB -> C(2.0)\nC ->\n").unwrap();

    run_on(&db, "redb", &["init", "--weighted"]).unwrap();
    run_on(&db, "redb", &["import", "-i", input.to_str().unwrap()]).unwrap();
    run_on(
        &db,
        "redb",
        &["export", "-o", output.to_str().unwrap(), "-t", "json"],
    )
    .unwrap();

    let graph = reopen_redb(&db);
    assert_eq!(graph.node_count().unwrap(), 3);
    assert_eq!(graph.edge_count().unwrap(), 3);

    let document: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(document["weighted"], serde_json::json!(true));
    assert_eq!(document["nodes"].as_array().unwrap().len(), 3);
    assert_eq!(document["edges"].as_array().unwrap().len(), 3);
}

#[test]
fn test_import_json_moves_between_backends() {
    let dir = TempDir::new().unwrap();
    let file_db = db_path(&dir, "graph.json");
    let redb_db = db_path(&dir, "graph.redb");

    run_on(&file_db, "file", &["init", "--weighted"]).unwrap();
    run_on(&file_db, "file", &["node", "add", "X"]).unwrap();
    run_on(&file_db, "file", &["node", "add", "Y"]).unwrap();
    run_on(&file_db, "file", &["edge", "add", "X", "Y", "-w", "3.0", "-l", "road"]).unwrap();

    run_on(&redb_db, "redb", &["init"]).unwrap();
    run_on(&redb_db, "redb", &["import", "-i", file_db.to_str().unwrap()]).unwrap();

    let graph = reopen_redb(&redb_db);
    assert!(graph.is_weighted());
    let edge = graph.get_edge("X", "Y").unwrap().unwrap();
    assert_eq!(edge.weight, Some(3.0));
    assert_eq!(edge.label.as_deref(), Some("road"));
}

#[test]
fn test_import_failure_keeps_graph() {
    let dir = TempDir::new().unwrap();
    let db = db_path(&dir, "graph.redb");
    let input = db_path(&dir, "broken.json");
    std::fs::write(&input, "{ not json").unwrap();

    run_on(&db, "redb", &["init"]).unwrap();
    run_on(&db, "redb", &["node", "add", "keep"]).unwrap();
    assert!(run_on(&db, "redb", &["import", "-i", input.to_str().unwrap()]).is_err());

    assert!(reopen_redb(&db).node_exists("keep").unwrap());
}

#[test]
fn test_import_unknown_extension_needs_format() {
    let dir = TempDir::new().unwrap();
    let db = db_path(&dir, "graph.redb");
    let input = db_path(&dir, "graph.data");
    std::fs::write(&input, "A -> B\n").unwrap();

    run_on(&db, "redb", &["init"]).unwrap();
    let err = run_on(&db, "redb", &["import", "-i", input.to_str().unwrap()]).unwrap_err();
    assert!(matches!(err, GraphError::Config(_)));

    run_on(
        &db,
        "redb",
        &["import", "-i", input.to_str().unwrap(), "-t", "adjacency"],
    )
    .unwrap();
    assert!(reopen_redb(&db).edge_exists("A", "B").unwrap());
}

#[test]
fn test_import_missing_file_fails() {
    let dir = TempDir::new().unwrap();
    let db = db_path(&dir, "graph.redb");
    let missing = db_path(&dir, "nope.json");

    run_on(&db, "redb", &["init"]).unwrap();
    let err = run_on(&db, "redb", &["import", "-i", missing.to_str().unwrap()]).unwrap_err();
    assert!(matches!(err, GraphError::Io(_)));
}

// =============================================================================
// CONFIG FILE
// =============================================================================

#[test]
fn test_config_file_supplies_defaults() {
    let dir = TempDir::new().unwrap();
    let db = db_path(&dir, "from-config.json");
    let config = db_path(&dir, "kvgraph.toml");
    std::fs::write(
        &config,
        format!(
            "[storage]\ndatabase = {:?}\nbackend = \"file\"\n\n[graph]\ndirected = false\nweighted = true\n",
            db.to_string_lossy()
        ),
    )
    .unwrap();
    let config = config.to_string_lossy().into_owned();

    run(&["-q", "--config", &config, "init"]).unwrap();
    run(&["-q", "--config", &config, "node", "add", "A"]).unwrap();

    let graph = cli::load_file_graph(&file_settings(&db)).unwrap();
    assert!(!graph.is_directed());
    assert!(graph.is_weighted());
    assert!(graph.node_exists("A").unwrap());
}

#[test]
fn test_bad_config_file_fails() {
    let dir = TempDir::new().unwrap();
    let config = db_path(&dir, "kvgraph.toml");
    std::fs::write(&config, "[storage]\nunknown = 1\n").unwrap();

    let err = run(&["--config", config.to_str().unwrap(), "status"]).unwrap_err();
    assert!(matches!(err, GraphError::Config(_)));
}
