//! JSON graph documents.
//!
//! ```json
//! {
//!   "directed": true,
//!   "weighted": false,
//!   "nodes": [{"id": "A", "data": {"label": "Start"}}],
//!   "edges": [{"from": "A", "to": "B", "weight": 1.0, "label": "road"}]
//! }
//! ```
//!
//! Missing flags default to directed and unweighted; a missing edge weight
//! defaults to 1.0 and a missing or `null` node `data` to an empty bag.
//! `weight` is only written for weighted graphs.

use super::ImportReport;
use crate::kv::KvStore;
use crate::{Edge, Graph, GraphError, GraphOptions, Node};
use serde::{Deserialize, Serialize};

/// The serialized form of a whole graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphDocument {
    #[serde(default = "default_directed")]
    pub directed: bool,
    #[serde(default)]
    pub weighted: bool,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

fn default_directed() -> bool {
    true
}

impl GraphDocument {
    /// Snapshot a graph: nodes sorted by id, edges as `get_all_edges` lists them.
    pub fn from_graph<S: KvStore>(graph: &Graph<S>) -> Result<Self, GraphError> {
        let mut nodes = Vec::new();
        for id in graph.list_nodes()? {
            if let Some(node) = graph.get_node(id.as_str())? {
                nodes.push(node);
            }
        }

        let weighted = graph.is_weighted();
        let edges = graph
            .get_all_edges()?
            .into_iter()
            .map(|edge| Edge {
                weight: if weighted { edge.weight } else { None },
                ..edge
            })
            .collect();

        Ok(Self {
            directed: graph.is_directed(),
            weighted,
            nodes,
            edges,
        })
    }
}

/// Render `graph` as a JSON document, indented when `pretty`.
pub fn export_json<S: KvStore>(graph: &Graph<S>, pretty: bool) -> Result<String, GraphError> {
    let document = GraphDocument::from_graph(graph)?;
    let rendered = if pretty {
        serde_json::to_string_pretty(&document)
    } else {
        serde_json::to_string(&document)
    };
    rendered.map_err(|e| GraphError::Encoding(e.to_string()))
}

/// Replace the contents of `graph` with the document in `text`.
///
/// The graph adopts the document's flags. Nodes are added before edges, both
/// in document order; edges whose endpoints are not declared are skipped.
pub fn import_json<S: KvStore>(graph: &mut Graph<S>, text: &str) -> Result<ImportReport, GraphError> {
    let document: GraphDocument = serde_json::from_str(text).map_err(|e| {
        tracing::warn!(error = %e, "rejected JSON graph document");
        GraphError::Json(e.to_string())
    })?;

    graph.reset(GraphOptions::new(document.directed, document.weighted))?;

    for node in document.nodes {
        if !graph.add_node(node.id.as_str(), Some(node.data))? {
            tracing::warn!(node = %node.id, "skipped duplicate or invalid node");
        }
    }

    for edge in document.edges {
        let from = edge.from.clone();
        let to = edge.to.clone();
        if !graph.insert_edge(edge)? {
            tracing::warn!(%from, %to, "skipped edge with undeclared endpoint");
        }
    }

    let report = ImportReport::of(graph)?;
    tracing::info!(
        nodes = report.nodes_created,
        edges = report.edges_created,
        "imported JSON graph"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Graph {
        let mut graph = Graph::in_memory(GraphOptions::directed().weighted(true));
        let mut data = crate::Attributes::new();
        data.insert("label".to_string(), json!("Start"));
        graph.add_node("A", Some(data)).expect("add");
        graph.add_node("B", None).expect("add");
        graph
            .insert_edge(Edge::new("A", "B").with_weight(2.5).with_label("road"))
            .expect("edge");
        graph
    }

    #[test]
    fn export_writes_attributes_directly() {
        let text = export_json(&sample(), false).expect("export");
        let value: serde_json::Value = serde_json::from_str(&text).expect("valid json");

        assert_eq!(value["directed"], json!(true));
        assert_eq!(value["weighted"], json!(true));
        assert_eq!(value["nodes"][0], json!({"id": "A", "data": {"label": "Start"}}));
        assert_eq!(value["nodes"][1], json!({"id": "B", "data": {}}));
        assert_eq!(
            value["edges"][0],
            json!({"from": "A", "to": "B", "weight": 2.5, "label": "road"})
        );
    }

    #[test]
    fn unweighted_export_omits_weight() {
        let mut graph = Graph::in_memory(GraphOptions::directed());
        graph.add_node("A", None).expect("add");
        graph.add_node("B", None).expect("add");
        graph.add_edge("A", "B").expect("edge");

        let text = export_json(&graph, true).expect("export");
        let value: serde_json::Value = serde_json::from_str(&text).expect("valid json");
        assert_eq!(value["edges"][0], json!({"from": "A", "to": "B"}));
        assert!(text.contains("\n  \"directed\": true"));
    }

    #[test]
    fn round_trip_preserves_graph() {
        let original = sample();
        let text = export_json(&original, true).expect("export");

        let mut copy = Graph::in_memory(GraphOptions::undirected());
        let report = import_json(&mut copy, &text).expect("import");

        assert_eq!(report.nodes_created, 2);
        assert_eq!(report.edges_created, 1);
        assert_eq!(copy.options(), original.options());
        assert_eq!(
            GraphDocument::from_graph(&copy).expect("doc"),
            GraphDocument::from_graph(&original).expect("doc")
        );
    }

    #[test]
    fn import_applies_defaults() {
        let text = r#"{
            "nodes": [{"id": "A"}, {"id": "B"}],
            "edges": [{"from": "A", "to": "B"}]
        }"#;
        let mut graph = Graph::in_memory(GraphOptions::undirected().weighted(true));
        import_json(&mut graph, text).expect("import");

        assert!(graph.is_directed());
        assert!(!graph.is_weighted());
        assert!(graph.edge_exists("A", "B").expect("exists"));
        assert!(!graph.edge_exists("B", "A").expect("exists"));
    }

    #[test]
    fn weighted_import_defaults_missing_weight() {
        let text = r#"{
            "directed": false,
            "weighted": true,
            "nodes": [{"id": "A"}, {"id": "B"}, {"id": "C"}],
            "edges": [{"from": "A", "to": "B"}, {"from": "B", "to": "C", "weight": 4.0}]
        }"#;
        let mut graph = Graph::default();
        import_json(&mut graph, text).expect("import");

        let ab = graph.get_edge("B", "A").expect("get").expect("mirrored");
        assert_eq!(ab.weight, Some(1.0));
        let bc = graph.get_edge("C", "B").expect("get").expect("mirrored");
        assert_eq!(bc.weight, Some(4.0));
    }

    #[test]
    fn null_node_data_imports_as_empty() {
        let text = r#"{"nodes": [{"id": "A", "data": null}, {"id": "B", "data": {"k": 1}}]}"#;
        let mut graph = Graph::default();
        let report = import_json(&mut graph, text).expect("import");

        assert_eq!(report.nodes_created, 2);
        let node = graph.get_node("A").expect("get").expect("present");
        assert!(node.data.is_empty());
    }

    #[test]
    fn edges_to_undeclared_nodes_are_skipped() {
        let text = r#"{"nodes": [{"id": "A"}], "edges": [{"from": "A", "to": "X"}]}"#;
        let mut graph = Graph::default();
        let report = import_json(&mut graph, text).expect("import");
        assert_eq!(report.edges_created, 0);
        assert!(!graph.node_exists("X").expect("exists"));
    }

    #[test]
    fn malformed_document_leaves_graph_untouched() {
        let mut graph = sample();
        let result = import_json(&mut graph, "{\"nodes\": [");
        assert!(matches!(result, Err(GraphError::Json(_))));
        assert_eq!(graph.node_count().expect("count"), 2);
        assert!(graph.edge_exists("A", "B").expect("exists"));
    }
}
