//! # Codec
//!
//! Text formats a graph can be exported to and rebuilt from:
//! - [`json`]: a self-describing document carrying flags, attributes and labels
//! - [`adjacency`]: the line-oriented `A -> B, C(1.5)` notation
//!
//! Imports are never incremental. The input is parsed completely first, and
//! only a well-formed document replaces the graph, so a syntax error leaves
//! the existing graph untouched.

pub mod adjacency;
pub mod json;

use crate::kv::KvStore;
use crate::{Graph, GraphError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Summary of a successful import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ImportReport {
    pub nodes_created: usize,
    pub edges_created: usize,
}

impl ImportReport {
    fn of<S: KvStore>(graph: &Graph<S>) -> Result<Self, GraphError> {
        Ok(Self {
            nodes_created: graph.node_count()?,
            edges_created: graph.edge_count()?,
        })
    }
}

/// Supported text formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Json,
    Adjacency,
}

impl Format {
    /// Guess the format from a file extension (`.json`, `.adj`, `.txt`).
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(Self::Json),
            "adj" | "txt" => Some(Self::Adjacency),
            _ => None,
        }
    }

    /// Replace the contents of `graph` with the document in `text`.
    pub fn import<S: KvStore>(
        self,
        graph: &mut Graph<S>,
        text: &str,
    ) -> Result<ImportReport, GraphError> {
        match self {
            Self::Json => json::import_json(graph, text),
            Self::Adjacency => adjacency::import_adjacency(graph, text),
        }
    }

    /// Render `graph` in this format. `pretty` only affects JSON.
    pub fn export<S: KvStore>(self, graph: &Graph<S>, pretty: bool) -> Result<String, GraphError> {
        match self {
            Self::Json => json::export_json(graph, pretty),
            Self::Adjacency => adjacency::export_adjacency(graph),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => write!(f, "json"),
            Self::Adjacency => write!(f, "adjacency"),
        }
    }
}

impl FromStr for Format {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "adjacency" | "adj" => Ok(Self::Adjacency),
            other => Err(GraphError::Config(format!(
                "unknown format '{}' (expected json or adjacency)",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GraphOptions;

    #[test]
    fn format_from_str_and_path() {
        assert_eq!("JSON".parse::<Format>().expect("parse"), Format::Json);
        assert_eq!("adj".parse::<Format>().expect("parse"), Format::Adjacency);
        assert!("xml".parse::<Format>().is_err());

        assert_eq!(Format::from_path(Path::new("g.json")), Some(Format::Json));
        assert_eq!(Format::from_path(Path::new("g.TXT")), Some(Format::Adjacency));
        assert_eq!(Format::from_path(Path::new("g")), None);
    }

    #[test]
    fn format_dispatches_to_codecs() {
        let mut graph = Graph::in_memory(GraphOptions::directed());
        let report = Format::Adjacency
            .import(&mut graph, "A -> B")
            .expect("import");
        assert_eq!(
            report,
            ImportReport {
                nodes_created: 2,
                edges_created: 1
            }
        );

        let text = Format::Adjacency.export(&graph, false).expect("export");
        assert_eq!(text, "A -> B\nB ->");
    }
}
