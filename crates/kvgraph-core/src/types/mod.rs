//! # Core Type Definitions
//!
//! This module contains the typed records the engine stores in the KV store,
//! the result shapes handed back to callers, and the error type:
//! - Identifiers and attribute bags (`NodeId`, `Attributes`)
//! - Stored records (`Node`, `Edge`, `AdjacencyEntry`)
//! - Query shapes (`Degree`, `GraphStats`, `SearchCriteria`, `SearchResult`)
//! - Graph flavour (`GraphOptions`)
//! - Error types (`GraphError`)
//!
//! ## Absence Is Not An Error
//!
//! Lookups of missing nodes or edges answer with `false`, `None` or an empty
//! collection. `GraphError` is reserved for failures of the backing store,
//! corrupted records and malformed import documents.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use thiserror::Error;

// =============================================================================
// IDENTIFIERS & ATTRIBUTES
// =============================================================================

/// Arbitrary JSON-like attribute bag attached to a node.
pub type Attributes = serde_json::Map<String, serde_json::Value>;

/// Unique, opaque identifier of a node.
///
/// Ordered lexicographically, which is the order `list_nodes` reports and the
/// tie-break Dijkstra applies between equally distant nodes.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    /// Create a node identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for NodeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for NodeId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for NodeId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

// =============================================================================
// STORED RECORDS
// =============================================================================

/// A node together with its attribute bag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// The node identifier.
    pub id: NodeId,
    /// Attribute bag, replaced wholesale by `update_node`.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub data: Attributes,
}

/// Read `null` (or a missing field) as an empty bag.
fn null_as_empty<'de, D>(deserializer: D) -> Result<Attributes, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Attributes>::deserialize(deserializer)?.unwrap_or_default())
}

impl Node {
    /// Create a node record.
    #[must_use]
    pub fn new(id: impl Into<NodeId>, data: Attributes) -> Self {
        Self {
            id: id.into(),
            data,
        }
    }
}

/// A directed edge record.
///
/// Undirected graphs store every logical edge as two of these, one per
/// direction, always with identical weight and label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// Source node.
    pub from: NodeId,
    /// Destination node.
    pub to: NodeId,
    /// Weight, present only on weighted graphs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    /// Optional edge label / relationship type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Edge {
    /// Create an unweighted, unlabeled edge.
    #[must_use]
    pub fn new(from: impl Into<NodeId>, to: impl Into<NodeId>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            weight: None,
            label: None,
        }
    }

    /// Builder: attach a weight.
    #[must_use]
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }

    /// Builder: attach a label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// The same edge pointing the other way (used to mirror undirected edges).
    #[must_use]
    pub fn reversed(&self) -> Self {
        Self {
            from: self.to.clone(),
            to: self.from.clone(),
            weight: self.weight,
            label: self.label.clone(),
        }
    }

    /// The (min, max) ordering of the endpoints.
    #[must_use]
    pub fn canonical_pair(&self) -> (&NodeId, &NodeId) {
        if self.from <= self.to {
            (&self.from, &self.to)
        } else {
            (&self.to, &self.from)
        }
    }
}

/// One entry of a node's adjacency list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjacencyEntry {
    /// The neighbor this entry points at.
    pub to: NodeId,
    /// Weight, present only on weighted graphs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

impl AdjacencyEntry {
    /// Weight used for path costs; absent weights count as the default.
    #[must_use]
    pub fn cost(&self) -> f64 {
        self.weight.unwrap_or(crate::primitives::DEFAULT_EDGE_WEIGHT)
    }
}

// =============================================================================
// GRAPH FLAVOUR
// =============================================================================

/// Directedness and weightedness of a graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphOptions {
    /// `false` mirrors every edge in both directions.
    pub directed: bool,
    /// `true` records weights on edges and adjacency entries.
    pub weighted: bool,
}

impl GraphOptions {
    /// Create options from flags.
    #[must_use]
    pub const fn new(directed: bool, weighted: bool) -> Self {
        Self { directed, weighted }
    }

    /// Directed, unweighted.
    #[must_use]
    pub const fn directed() -> Self {
        Self::new(true, false)
    }

    /// Undirected, unweighted.
    #[must_use]
    pub const fn undirected() -> Self {
        Self::new(false, false)
    }

    /// Builder: toggle weights.
    #[must_use]
    pub const fn weighted(mut self, weighted: bool) -> Self {
        self.weighted = weighted;
        self
    }
}

impl Default for GraphOptions {
    fn default() -> Self {
        Self::directed()
    }
}

// =============================================================================
// QUERY SHAPES
// =============================================================================

/// In/out degree of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Degree {
    pub in_degree: usize,
    pub out_degree: usize,
    pub total: usize,
}

/// Summary counters of a graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphStats {
    /// Maintained node counter.
    pub nodes: usize,
    /// Maintained logical edge counter.
    pub edges: usize,
    pub directed: bool,
    pub weighted: bool,
    /// Mean adjacency-list length (0.0 for an empty graph).
    pub avg_degree: f64,
    /// Raw number of entries in the backing KV store.
    pub db_entries: usize,
}

/// Substring search over node identifiers with pagination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchCriteria {
    pub pattern: String,
    #[serde(default)]
    pub case_sensitive: bool,
    #[serde(default)]
    pub offset: usize,
    #[serde(default = "default_search_limit")]
    pub limit: usize,
}

const fn default_search_limit() -> usize {
    crate::primitives::DEFAULT_SEARCH_LIMIT
}

impl SearchCriteria {
    /// Case-insensitive search with the default page.
    #[must_use]
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            case_sensitive: false,
            offset: 0,
            limit: default_search_limit(),
        }
    }

    /// Builder: match case exactly.
    #[must_use]
    pub fn case_sensitive(mut self) -> Self {
        self.case_sensitive = true;
        self
    }

    /// Builder: select a page.
    #[must_use]
    pub fn page(mut self, offset: usize, limit: usize) -> Self {
        self.offset = offset;
        self.limit = limit;
        self
    }
}

/// One page of search matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub nodes: Vec<Node>,
    /// Number of matches before pagination.
    pub total: usize,
    pub offset: usize,
    pub limit: usize,
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the engine.
///
/// - Missing nodes/edges are NOT errors; they surface as `false`/`None`
/// - Use `Result<T, GraphError>` for fallible operations
/// - The engine never panics; all errors are recoverable
#[derive(Debug, Error)]
pub enum GraphError {
    /// The backing key-value store failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// A stored record could not be encoded or decoded.
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// A JSON graph document is malformed.
    #[error("Invalid JSON graph document: {0}")]
    Json(String),

    /// An edge weight is NaN or infinite.
    #[error("Invalid weight {weight} on edge {from} -> {to}: weights must be finite")]
    InvalidWeight { from: NodeId, to: NodeId, weight: f64 },

    /// An adjacency-list document is malformed.
    #[error("Invalid adjacency list at line {line}: {message}")]
    Parse { line: usize, message: String },

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(String),

    /// Configuration could not be loaded or is inconsistent.
    #[error("Configuration error: {0}")]
    Config(String),
}

// =============================================================================
// TESTS
// =============================================================================
