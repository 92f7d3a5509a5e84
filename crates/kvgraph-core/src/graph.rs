//! # Graph Store
//!
//! Node table, edge table and per-node adjacency lists kept as records in a
//! [`KvStore`], plus the counters that summarise them.
//!
//! [`Graph`] is the only code that writes those records. Every mutation reads
//! what it needs first, then stages all of its writes (structure and counters)
//! into one [`WriteBatch`], so the views cannot drift apart:
//!
//! 1. every adjacency entry `X -> Y` has exactly one edge record `(X, Y)`
//! 2. `node_count` / `edge_count` match the live records (one per undirected pair)
//! 3. undirected graphs hold `(X, Y)` iff `(Y, X)`, with identical payload
//! 4. deleting a node removes its record, its list, every incident edge and
//!    every mention of it in other lists
//! 5. re-adding an edge replaces the old adjacency entry (no parallel edges)
//!
//! Traversals read the graph through the narrower [`GraphView`] trait.

use crate::kv::{KvStore, MemoryStore, WriteBatch};
use crate::primitives::{
    ADJ_PREFIX, DEFAULT_EDGE_WEIGHT, EDGE_PREFIX, META_DIRECTED, META_EDGE_COUNT,
    META_NODE_COUNT, META_WEIGHTED, NODE_PREFIX, adj_key, edge_key, is_valid_node_id, node_key,
};
use crate::{
    AdjacencyEntry, Attributes, Degree, Edge, GraphError, GraphOptions, GraphStats, Node, NodeId,
    SearchCriteria, SearchResult,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeSet;

// =============================================================================
// GRAPHVIEW TRAIT
// =============================================================================

/// Read-only access used by the traversal engine.
///
/// Algorithms only ever ask whether a node exists and what its adjacency list
/// is, so anything that can answer those questions can be traversed.
pub trait GraphView {
    /// Check if a node exists.
    fn node_exists(&self, id: &str) -> Result<bool, GraphError>;

    /// Outgoing adjacency list, in stored order. Empty for unknown nodes.
    fn neighbors(&self, id: &str) -> Result<Vec<AdjacencyEntry>, GraphError>;

    /// Whether shortest paths should use edge weights.
    fn is_weighted(&self) -> bool;

    /// All node identifiers, sorted.
    fn list_nodes(&self) -> Result<Vec<NodeId>, GraphError>;
}

// =============================================================================
// GRAPH IMPLEMENTATION
// =============================================================================

/// A graph stored as records in a key-value store.
#[derive(Debug, Clone)]
pub struct Graph<S: KvStore = MemoryStore> {
    /// The backing store; only this type writes to it.
    store: S,
    /// Cached copy of the directed/weighted metadata.
    options: GraphOptions,
}

fn encode<T: Serialize + ?Sized>(value: &T) -> Result<String, GraphError> {
    serde_json::to_string(value).map_err(|e| GraphError::Encoding(e.to_string()))
}

fn decode<T: DeserializeOwned>(key: &str, raw: &str) -> Result<T, GraphError> {
    serde_json::from_str(raw).map_err(|e| GraphError::Encoding(format!("{}: {}", key, e)))
}

/// Metadata entries for a fresh graph.
fn meta_entries(options: GraphOptions, nodes: usize, edges: usize) -> [(&'static str, String); 4] {
    [
        (META_DIRECTED, options.directed.to_string()),
        (META_WEIGHTED, options.weighted.to_string()),
        (META_NODE_COUNT, nodes.to_string()),
        (META_EDGE_COUNT, edges.to_string()),
    ]
}

impl Graph<MemoryStore> {
    /// Create an empty graph backed by a fresh [`MemoryStore`].
    #[must_use]
    pub fn in_memory(options: GraphOptions) -> Self {
        let store = MemoryStore::from_entries(meta_entries(options, 0, 0));
        Self { store, options }
    }
}

impl Default for Graph<MemoryStore> {
    fn default() -> Self {
        Self::in_memory(GraphOptions::default())
    }
}

impl<S: KvStore> Graph<S> {
    /// Start a new, empty graph in `store`, discarding anything it held.
    pub fn create(store: S, options: GraphOptions) -> Result<Self, GraphError> {
        let mut graph = Self { store, options };
        graph.reset(options)?;
        Ok(graph)
    }

    /// Resume the graph held in `store`.
    ///
    /// When the store carries no graph metadata yet, it is initialised with
    /// `default_options` and empty counters; existing records are kept.
    pub fn open(mut store: S, default_options: GraphOptions) -> Result<Self, GraphError> {
        let directed = store.get(META_DIRECTED)?;
        let weighted = store.get(META_WEIGHTED)?;

        let options = match (directed, weighted) {
            (Some(directed), Some(weighted)) => GraphOptions::new(
                parse_flag(META_DIRECTED, &directed)?,
                parse_flag(META_WEIGHTED, &weighted)?,
            ),
            _ => {
                let mut batch = WriteBatch::new();
                for (key, value) in meta_entries(default_options, 0, 0) {
                    if !store.exists(key)? {
                        batch.set(key, value);
                    }
                }
                // Flags are always rewritten so a half-initialised store is repaired.
                batch.set(META_DIRECTED, default_options.directed.to_string());
                batch.set(META_WEIGHTED, default_options.weighted.to_string());
                store.apply(batch)?;
                default_options
            }
        };

        tracing::debug!(
            directed = options.directed,
            weighted = options.weighted,
            "graph opened"
        );
        Ok(Self { store, options })
    }

    /// Drop every record and restart empty with the given flavour.
    ///
    /// Used by the codecs, whose imports always replace the whole graph.
    pub fn reset(&mut self, options: GraphOptions) -> Result<(), GraphError> {
        // Removal and fresh metadata go out as one batch.
        let mut batch = WriteBatch::new();
        for key in self.store.keys()? {
            batch.delete(key);
        }
        for (key, value) in meta_entries(options, 0, 0) {
            batch.set(key, value);
        }
        self.store.apply(batch)?;
        self.options = options;
        Ok(())
    }

    /// Drop every node and edge, keeping the directed/weighted flags.
    pub fn clear(&mut self) -> Result<(), GraphError> {
        self.reset(self.options)
    }

    /// Directed/weighted flags of this graph.
    #[must_use]
    pub fn options(&self) -> GraphOptions {
        self.options
    }

    #[must_use]
    pub fn is_directed(&self) -> bool {
        self.options.directed
    }

    #[must_use]
    pub fn is_weighted(&self) -> bool {
        self.options.weighted
    }

    /// Borrow the backing store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Give back the backing store.
    #[must_use]
    pub fn into_store(self) -> S {
        self.store
    }

    // -------------------------------------------------------------------------
    // record helpers
    // -------------------------------------------------------------------------

    fn read_record<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, GraphError> {
        match self.store.get(key)? {
            Some(raw) => decode(key, &raw).map(Some),
            None => Ok(None),
        }
    }

    fn read_adjacency(&self, id: &str) -> Result<Vec<AdjacencyEntry>, GraphError> {
        Ok(self.read_record(&adj_key(id))?.unwrap_or_default())
    }

    fn read_counter(&self, key: &str) -> Result<usize, GraphError> {
        match self.store.get(key)? {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| GraphError::Encoding(format!("{}: not a count: {:?}", key, raw))),
            None => Ok(0),
        }
    }

    /// Stage the edge record and the matching adjacency upsert for `edge.from`.
    fn stage_edge(&self, batch: &mut WriteBatch, edge: &Edge) -> Result<(), GraphError> {
        batch.set(edge_key(edge.from.as_str(), edge.to.as_str()), encode(edge)?);

        let mut adjacency = self.read_adjacency(edge.from.as_str())?;
        adjacency.retain(|entry| entry.to != edge.to);
        adjacency.push(AdjacencyEntry {
            to: edge.to.clone(),
            weight: edge.weight,
        });
        batch.set(adj_key(edge.from.as_str()), encode(&adjacency)?);
        Ok(())
    }

    /// Stage removal of the edge record `(from, to)` and its adjacency entry.
    fn stage_edge_removal(
        &self,
        batch: &mut WriteBatch,
        from: &str,
        to: &str,
    ) -> Result<(), GraphError> {
        batch.delete(edge_key(from, to));

        let mut adjacency = self.read_adjacency(from)?;
        adjacency.retain(|entry| entry.to != to);
        batch.set(adj_key(from), encode(&adjacency)?);
        Ok(())
    }

    // =========================================================================
    // NODE OPERATIONS
    // =========================================================================

    /// Add a node with an optional attribute bag.
    ///
    /// Returns `false` if the id is already taken, empty, or longer than
    /// [`crate::primitives::MAX_NODE_ID_LENGTH`].
    pub fn add_node(&mut self, id: &str, data: Option<Attributes>) -> Result<bool, GraphError> {
        if !is_valid_node_id(id) {
            tracing::debug!(len = id.len(), "rejected invalid node id");
            return Ok(false);
        }

        let key = node_key(id);
        if self.store.exists(&key)? {
            return Ok(false);
        }

        let mut batch = WriteBatch::new();
        batch.set(key, encode(&data.unwrap_or_default())?);
        batch.set(adj_key(id), "[]");
        batch.set(META_NODE_COUNT, (self.node_count()? + 1).to_string());
        self.store.apply(batch)?;

        tracing::debug!(node = id, "node added");
        Ok(true)
    }

    /// Delete a node together with every edge touching it.
    ///
    /// Returns `false` if the node does not exist.
    pub fn delete_node(&mut self, id: &str) -> Result<bool, GraphError> {
        let key = node_key(id);
        if !self.store.exists(&key)? {
            return Ok(false);
        }

        let mut batch = WriteBatch::new();
        let own_adj_key = adj_key(id);

        // Outgoing edges (for undirected graphs these are all incident edges).
        let outgoing = self.read_adjacency(id)?;
        for entry in &outgoing {
            batch.delete(edge_key(id, entry.to.as_str()));
        }
        let mut removed_edges = outgoing.len();

        // Incoming edges: scrub this node from every other adjacency list.
        for list_key in self.store.keys_with_prefix(ADJ_PREFIX)? {
            if list_key == own_adj_key {
                continue;
            }
            let Some(mut adjacency) = self.read_record::<Vec<AdjacencyEntry>>(&list_key)? else {
                continue;
            };
            let before = adjacency.len();
            adjacency.retain(|entry| entry.to != id);
            if adjacency.len() == before {
                continue;
            }

            let owner = &list_key[ADJ_PREFIX.len()..];
            batch.delete(edge_key(owner, id));
            batch.set(list_key.as_str(), encode(&adjacency)?);
            if self.options.directed {
                removed_edges += before - adjacency.len();
            }
        }

        batch.delete(key);
        batch.delete(own_adj_key);
        batch.set(
            META_NODE_COUNT,
            self.node_count()?.saturating_sub(1).to_string(),
        );
        batch.set(
            META_EDGE_COUNT,
            self.edge_count()?.saturating_sub(removed_edges).to_string(),
        );
        self.store.apply(batch)?;

        tracing::debug!(node = id, removed_edges, "node deleted");
        Ok(true)
    }

    /// Replace a node's attribute bag wholesale (no merge).
    ///
    /// Returns `false` if the node does not exist.
    pub fn update_node(&mut self, id: &str, data: Attributes) -> Result<bool, GraphError> {
        let key = node_key(id);
        if !self.store.exists(&key)? {
            return Ok(false);
        }
        self.store.set(&key, &encode(&data)?)?;
        Ok(true)
    }

    /// Get a node and its attribute bag.
    pub fn get_node(&self, id: &str) -> Result<Option<Node>, GraphError> {
        Ok(self
            .read_record::<Attributes>(&node_key(id))?
            .map(|data| Node::new(id, data)))
    }

    /// Check if a node exists.
    pub fn node_exists(&self, id: &str) -> Result<bool, GraphError> {
        self.store.exists(&node_key(id))
    }

    /// All node identifiers, sorted.
    pub fn list_nodes(&self) -> Result<Vec<NodeId>, GraphError> {
        let mut ids: Vec<NodeId> = self
            .store
            .keys_with_prefix(NODE_PREFIX)?
            .into_iter()
            .map(|key| NodeId(key[NODE_PREFIX.len()..].to_string()))
            .collect();
        ids.sort();
        Ok(ids)
    }

    /// Nodes (in id order) whose record satisfies `predicate`.
    pub fn find_nodes<F>(&self, predicate: F) -> Result<Vec<NodeId>, GraphError>
    where
        F: Fn(&Node) -> bool,
    {
        let mut matching = Vec::new();
        for id in self.list_nodes()? {
            if let Some(node) = self.get_node(id.as_str())? {
                if predicate(&node) {
                    matching.push(id);
                }
            }
        }
        Ok(matching)
    }

    /// Substring search on node ids, one page at a time.
    pub fn search_nodes(&self, criteria: &SearchCriteria) -> Result<SearchResult, GraphError> {
        let pattern = if criteria.case_sensitive {
            criteria.pattern.clone()
        } else {
            criteria.pattern.to_lowercase()
        };

        let matching: Vec<NodeId> = self
            .list_nodes()?
            .into_iter()
            .filter(|id| {
                if criteria.case_sensitive {
                    id.as_str().contains(&pattern)
                } else {
                    id.as_str().to_lowercase().contains(&pattern)
                }
            })
            .collect();

        let total = matching.len();
        let mut nodes = Vec::new();
        for id in matching.iter().skip(criteria.offset).take(criteria.limit) {
            if let Some(node) = self.get_node(id.as_str())? {
                nodes.push(node);
            }
        }

        Ok(SearchResult {
            nodes,
            total,
            offset: criteria.offset,
            limit: criteria.limit,
        })
    }

    // =========================================================================
    // EDGE OPERATIONS
    // =========================================================================

    /// Add an edge of weight 1.0 without a label.
    pub fn add_edge(&mut self, from: &str, to: &str) -> Result<bool, GraphError> {
        self.insert_edge(Edge::new(from, to))
    }

    /// Add an edge with an explicit weight.
    pub fn add_weighted_edge(&mut self, from: &str, to: &str, weight: f64) -> Result<bool, GraphError> {
        self.insert_edge(Edge::new(from, to).with_weight(weight))
    }

    /// Insert or overwrite an edge.
    ///
    /// Returns `false` unless both endpoints exist. The weight (default 1.0)
    /// is recorded only on weighted graphs; an empty label counts as none.
    /// The adjacency entry for `to` is removed and re-appended, so re-adding
    /// an edge moves it to the end of `from`'s neighbor order. Undirected
    /// graphs get the mirrored record and entry in the same batch.
    ///
    /// `edge_count` grows only when the edge is new; overwriting an existing
    /// edge leaves it unchanged.
    ///
    /// A NaN or infinite weight is an [`GraphError::InvalidWeight`]; JSON
    /// records cannot hold it.
    pub fn insert_edge(&mut self, edge: Edge) -> Result<bool, GraphError> {
        if let Some(weight) = edge.weight.filter(|weight| !weight.is_finite()) {
            return Err(GraphError::InvalidWeight {
                from: edge.from,
                to: edge.to,
                weight,
            });
        }
        if !self.node_exists(edge.from.as_str())? || !self.node_exists(edge.to.as_str())? {
            return Ok(false);
        }

        let weight = edge.weight.unwrap_or(DEFAULT_EDGE_WEIGHT);
        let record = Edge {
            weight: self.options.weighted.then_some(weight),
            label: edge.label.filter(|label| !label.is_empty()),
            ..edge
        };

        let existed = self.edge_exists(record.from.as_str(), record.to.as_str())?;

        let mut batch = WriteBatch::new();
        self.stage_edge(&mut batch, &record)?;
        if !self.options.directed && record.from != record.to {
            self.stage_edge(&mut batch, &record.reversed())?;
        }
        if !existed {
            batch.set(META_EDGE_COUNT, (self.edge_count()? + 1).to_string());
        }
        self.store.apply(batch)?;

        tracing::debug!(from = %record.from, to = %record.to, existed, "edge written");
        Ok(true)
    }

    /// Delete an edge (both directions on undirected graphs).
    ///
    /// Returns `false` if the directed record `(from, to)` does not exist.
    pub fn delete_edge(&mut self, from: &str, to: &str) -> Result<bool, GraphError> {
        if !self.edge_exists(from, to)? {
            return Ok(false);
        }

        let mut batch = WriteBatch::new();
        self.stage_edge_removal(&mut batch, from, to)?;
        if !self.options.directed && from != to {
            self.stage_edge_removal(&mut batch, to, from)?;
        }
        batch.set(
            META_EDGE_COUNT,
            self.edge_count()?.saturating_sub(1).to_string(),
        );
        self.store.apply(batch)?;

        tracing::debug!(from, to, "edge deleted");
        Ok(true)
    }

    /// Get the directed edge record `(from, to)`.
    pub fn get_edge(&self, from: &str, to: &str) -> Result<Option<Edge>, GraphError> {
        self.read_record(&edge_key(from, to))
    }

    /// Check if the directed edge record `(from, to)` exists.
    pub fn edge_exists(&self, from: &str, to: &str) -> Result<bool, GraphError> {
        self.store.exists(&edge_key(from, to))
    }

    /// Outgoing adjacency list of a node, in stored order.
    pub fn get_neighbors(&self, id: &str) -> Result<Vec<AdjacencyEntry>, GraphError> {
        self.read_adjacency(id)
    }

    /// Every logical edge, in edge-table order.
    ///
    /// Undirected graphs report each mirrored pair once, keyed by its
    /// canonical (min, max) endpoints.
    pub fn get_all_edges(&self) -> Result<Vec<Edge>, GraphError> {
        let mut edges = Vec::new();
        let mut seen: BTreeSet<(NodeId, NodeId)> = BTreeSet::new();

        for key in self.store.keys_with_prefix(EDGE_PREFIX)? {
            let Some(edge) = self.read_record::<Edge>(&key)? else {
                continue;
            };
            if !self.options.directed {
                let (lo, hi) = edge.canonical_pair();
                if !seen.insert((lo.clone(), hi.clone())) {
                    continue;
                }
            }
            edges.push(edge);
        }
        Ok(edges)
    }

    // =========================================================================
    // COUNTERS & STATISTICS
    // =========================================================================

    /// Maintained node counter.
    pub fn node_count(&self) -> Result<usize, GraphError> {
        self.read_counter(META_NODE_COUNT)
    }

    /// Maintained logical edge counter.
    pub fn edge_count(&self) -> Result<usize, GraphError> {
        self.read_counter(META_EDGE_COUNT)
    }

    /// In/out degree of a node.
    ///
    /// In-degree scans every adjacency list, so this is O(V) per call.
    /// Undirected edges are mirrored and therefore count in both directions.
    pub fn get_degree(&self, id: &str) -> Result<Degree, GraphError> {
        let out_degree = self.read_adjacency(id)?.len();

        let mut in_degree = 0;
        for node in self.list_nodes()? {
            if self
                .read_adjacency(node.as_str())?
                .iter()
                .any(|entry| entry.to == id)
            {
                in_degree += 1;
            }
        }

        Ok(Degree {
            in_degree,
            out_degree,
            total: in_degree + out_degree,
        })
    }

    /// Summary counters.
    pub fn stats(&self) -> Result<GraphStats, GraphError> {
        let nodes = self.list_nodes()?;
        let mut total_degree = 0usize;
        for node in &nodes {
            total_degree += self.read_adjacency(node.as_str())?.len();
        }
        let avg_degree = if nodes.is_empty() {
            0.0
        } else {
            total_degree as f64 / nodes.len() as f64
        };

        Ok(GraphStats {
            nodes: self.node_count()?,
            edges: self.edge_count()?,
            directed: self.options.directed,
            weighted: self.options.weighted,
            avg_degree,
            db_entries: self.store.count()?,
        })
    }
}

fn parse_flag(key: &str, raw: &str) -> Result<bool, GraphError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(GraphError::Encoding(format!("{}: not a flag: {:?}", key, other))),
    }
}

impl<S: KvStore> GraphView for Graph<S> {
    fn node_exists(&self, id: &str) -> Result<bool, GraphError> {
        Graph::node_exists(self, id)
    }

    fn neighbors(&self, id: &str) -> Result<Vec<AdjacencyEntry>, GraphError> {
        self.read_adjacency(id)
    }

    fn is_weighted(&self) -> bool {
        self.options.weighted
    }

    fn list_nodes(&self) -> Result<Vec<NodeId>, GraphError> {
        Graph::list_nodes(self)
    }
}

// =============================================================================
// TESTS
// =============================================================================
