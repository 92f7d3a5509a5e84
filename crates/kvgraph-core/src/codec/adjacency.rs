//! Adjacency-list text.
//!
//! ```text
//! # comment
//! A -> B, C(1.5), D
//! B -> D
//! E ->
//! ```
//!
//! Blank lines, `#` comments and lines without `->` are ignored. Names that
//! appear only as destinations are created on the fly. `Name(weight)` attaches
//! a weight, which only weighted graphs keep. The graph's flags are not part
//! of the text and stay as they are.
//!
//! Node ids are written verbatim, so ids containing `,`, `(`, `)`, `->`, a
//! line break, surrounding whitespace or a leading `#` cannot be exported;
//! use the JSON document for those graphs.

use super::ImportReport;
use crate::kv::KvStore;
use crate::primitives::{DEFAULT_EDGE_WEIGHT, MAX_NODE_ID_LENGTH, is_valid_node_id};
use crate::{Edge, Graph, GraphError};

/// One `source -> destinations` line.
#[derive(Debug, Clone, PartialEq)]
struct Line {
    number: usize,
    source: String,
    targets: Vec<(String, f64)>,
}

fn parse_error(line: usize, message: impl Into<String>) -> GraphError {
    GraphError::Parse {
        line,
        message: message.into(),
    }
}

/// Split `Name(weight)` into its parts. Plain names get the default weight.
fn parse_target(token: &str, line: usize) -> Result<(String, f64), GraphError> {
    let Some(open) = token.find('(') else {
        return Ok((token.to_string(), DEFAULT_EDGE_WEIGHT));
    };
    let Some(close) = token[open..].find(')').map(|offset| open + offset) else {
        return Err(parse_error(line, format!("unclosed '(' in '{}'", token)));
    };

    let name = token[..open].trim();
    let raw = token[open + 1..close].trim();
    let weight: f64 = raw
        .parse()
        .map_err(|_| parse_error(line, format!("invalid weight '{}' for '{}'", raw, name)))?;
    if !weight.is_finite() {
        return Err(parse_error(
            line,
            format!("weight of '{}' must be finite, got '{}'", name, raw),
        ));
    }
    Ok((name.to_string(), weight))
}

fn check_node_id(id: &str, line: usize) -> Result<(), GraphError> {
    if is_valid_node_id(id) {
        Ok(())
    } else {
        Err(parse_error(
            line,
            format!("node id longer than {} bytes", MAX_NODE_ID_LENGTH),
        ))
    }
}

/// Parse the whole text without touching any graph.
fn parse(text: &str) -> Result<Vec<Line>, GraphError> {
    let mut lines = Vec::new();

    for (index, raw) in text.lines().enumerate() {
        let number = index + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let mut parts = trimmed.split("->");
        let (Some(source), Some(rest)) = (parts.next(), parts.next()) else {
            continue;
        };
        let source = source.trim();
        if source.is_empty() {
            return Err(parse_error(number, "missing source node before '->'"));
        }
        check_node_id(source, number)?;

        let mut targets = Vec::new();
        for token in rest.split(',') {
            let token = token.trim();
            if token.is_empty() {
                continue;
            }
            let (name, weight) = parse_target(token, number)?;
            if name.is_empty() {
                return Err(parse_error(number, format!("missing node name in '{}'", token)));
            }
            check_node_id(&name, number)?;
            targets.push((name, weight));
        }

        lines.push(Line {
            number,
            source: source.to_string(),
            targets,
        });
    }

    Ok(lines)
}

/// Replace the contents of `graph` with the adjacency list in `text`.
///
/// The directed/weighted flags are kept. The text is parsed before anything
/// is cleared; a [`GraphError::Parse`] names the offending line.
pub fn import_adjacency<S: KvStore>(
    graph: &mut Graph<S>,
    text: &str,
) -> Result<ImportReport, GraphError> {
    let lines = parse(text).inspect_err(|e| {
        tracing::warn!(error = %e, "rejected adjacency list");
    })?;

    graph.clear()?;

    for line in lines {
        ensure_node(graph, &line.source, line.number)?;
        for (target, weight) in line.targets {
            ensure_node(graph, &target, line.number)?;
            let edge = Edge::new(line.source.as_str(), target.as_str()).with_weight(weight);
            if !graph.insert_edge(edge)? {
                tracing::warn!(line = line.number, from = %line.source, to = %target, "skipped edge");
            }
        }
    }

    let report = ImportReport::of(graph)?;
    tracing::info!(
        nodes = report.nodes_created,
        edges = report.edges_created,
        "imported adjacency list"
    );
    Ok(report)
}

fn ensure_node<S: KvStore>(graph: &mut Graph<S>, id: &str, line: usize) -> Result<(), GraphError> {
    if !graph.node_exists(id)? && !graph.add_node(id, None)? {
        tracing::warn!(line, node = id, "skipped node");
    }
    Ok(())
}

/// Check if `id` reads back as the same single name.
fn is_writable(id: &str) -> bool {
    id.trim() == id
        && !id.starts_with('#')
        && !id.contains("->")
        && !id.contains([',', '(', ')', '\n', '\r'])
}

/// Render `graph` as one `Node -> ...` line per node, sorted by id.
///
/// Weighted graphs print every weight as `B(1.5)`. Fails with
/// [`GraphError::Encoding`] when a node id cannot be written in this notation.
pub fn export_adjacency<S: KvStore>(graph: &Graph<S>) -> Result<String, GraphError> {
    let weighted = graph.is_weighted();
    let nodes = graph.list_nodes()?;
    if let Some(bad) = nodes.iter().find(|id| !is_writable(id.as_str())) {
        return Err(GraphError::Encoding(format!(
            "node id {:?} cannot be written as an adjacency list",
            bad.as_str()
        )));
    }

    let mut lines = Vec::new();
    for node in nodes {
        let targets: Vec<String> = graph
            .get_neighbors(node.as_str())?
            .into_iter()
            .map(|entry| match entry.weight {
                Some(weight) if weighted => format!("{}({:?})", entry.to, weight),
                _ => entry.to.to_string(),
            })
            .collect();

        if targets.is_empty() {
            lines.push(format!("{} ->", node));
        } else {
            lines.push(format!("{} -> {}", node, targets.join(", ")));
        }
    }

    Ok(lines.join("\n"))
}
