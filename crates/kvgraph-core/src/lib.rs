//! # kvgraph-core
//!
//! Graph storage and traversal engine layered on a key-value store.
//!
//! A graph is kept as plain records in any [`KvStore`]: one record per node,
//! one per directed edge, one adjacency list per node and four metadata
//! entries. [`Graph`] is the single writer of those records and keeps them
//! mutually consistent; the [`traversal`] functions read them back through the
//! [`GraphView`] trait; the [`codec`] module moves whole graphs in and out of
//! JSON and adjacency-list text.
//!
//! ## Example
//!
//! ```
//! use kvgraph_core::{Graph, GraphOptions, traversal};
//!
//! let mut graph = Graph::in_memory(GraphOptions::directed().weighted(true));
//! for id in ["A", "B", "C"] {
//!     graph.add_node(id, None)?;
//! }
//! graph.add_weighted_edge("A", "B", 4.0)?;
//! graph.add_weighted_edge("A", "C", 1.0)?;
//! graph.add_weighted_edge("C", "B", 1.0)?;
//!
//! let best = traversal::shortest_path(&graph, "A", "B")?;
//! assert_eq!(best.path, vec!["A", "C", "B"]);
//! assert_eq!(best.distance, 2.0);
//! # Ok::<(), kvgraph_core::GraphError>(())
//! ```
//!
//! ## Architectural Constraints
//!
//! - Synchronous and single-threaded: mutations take `&mut self`
//! - One [`WriteBatch`] per logical mutation, counters included
//! - Missing nodes and unreachable targets are answers, not errors
//! - Deterministic enumeration (`BTreeMap`/`BTreeSet` wherever order shows)

// =============================================================================
// MODULES
// =============================================================================

pub mod codec;
pub mod graph;
pub mod kv;
pub mod primitives;
pub mod storage;
pub mod traversal;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{
    AdjacencyEntry, Attributes, Degree, Edge, GraphError, GraphOptions, GraphStats, Node, NodeId,
    SearchCriteria, SearchResult,
};

// =============================================================================
// RE-EXPORTS: Storage
// =============================================================================

pub use graph::{Graph, GraphView};
pub use kv::{KvStore, MemoryStore, WriteBatch, WriteOp};
pub use storage::RedbStore;

// =============================================================================
// RE-EXPORTS: Algorithms & Formats
// =============================================================================

pub use codec::{Format, ImportReport};
pub use traversal::{BfsResult, DfsResult, Neighborhood, ShortestPath};
