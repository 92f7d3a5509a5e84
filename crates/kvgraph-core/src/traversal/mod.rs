//! # Traversal Engine
//!
//! Read-only graph algorithms over any [`GraphView`]:
//! - [`bfs`]: breadth-first order, hop distances, early exit on the target
//! - [`dfs`]: depth-first preorder, early exit on the target
//! - [`all_simple_paths`]: every cycle-free path between two nodes
//! - [`dijkstra`] / [`shortest_path`]: cheapest path, by hops or by weight
//! - [`neighborhood`]: nodes within a hop radius, following edges both ways
//!
//! None of these functions mutate the graph, and none of them treat a missing
//! node or an unreachable target as an error: they return empty results.
//!
//! DFS and path enumeration walk explicit frame stacks instead of recursing,
//! so a long chain costs heap memory rather than call-stack depth.

mod dijkstra;
mod neighborhood;
mod paths;
mod search;

pub use dijkstra::dijkstra;
pub use neighborhood::neighborhood;
pub use paths::all_simple_paths;
pub use search::{bfs, dfs};

use crate::graph::GraphView;
use crate::{Edge, GraphError, NodeId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

// =============================================================================
// RESULT TYPES
// =============================================================================

/// Outcome of a breadth-first search.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BfsResult {
    /// Nodes in dequeue order.
    pub visited: Vec<NodeId>,
    /// Target reached, or `true` when no target was given.
    pub found: bool,
    /// Start-to-target path; empty without a reachable target.
    pub path: Vec<NodeId>,
    /// Hop distance from the start for every node discovered so far.
    pub distances: BTreeMap<NodeId, usize>,
}

/// Outcome of a depth-first search.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DfsResult {
    /// Nodes in preorder.
    pub visited: Vec<NodeId>,
    /// Target reached, or `true` when no target was given.
    pub found: bool,
    /// Start-to-target path; empty without a reachable target.
    pub path: Vec<NodeId>,
}

/// Cheapest path between two nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShortestPath {
    /// Node sequence from start to end; empty when unreachable.
    pub path: Vec<NodeId>,
    /// Hop count or weight sum; `f64::INFINITY` when unreachable.
    pub distance: f64,
}

impl ShortestPath {
    /// The "no path" answer.
    #[must_use]
    pub fn unreachable() -> Self {
        Self {
            path: Vec::new(),
            distance: f64::INFINITY,
        }
    }

    /// Check if a path was found.
    #[must_use]
    pub fn is_reachable(&self) -> bool {
        !self.path.is_empty()
    }
}

/// Nodes around a center, grouped by hop distance.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Neighborhood {
    /// The focus node; `None` when it does not exist.
    pub center: Option<NodeId>,
    /// `levels[d]` holds the nodes first reached after `d` hops.
    pub levels: Vec<Vec<NodeId>>,
    /// Stored edges whose endpoints are both in the neighborhood.
    pub edges: Vec<Edge>,
}

impl Neighborhood {
    /// Every included node, nearest first.
    #[must_use]
    pub fn nodes(&self) -> Vec<NodeId> {
        self.levels.iter().flatten().cloned().collect()
    }

    /// Hop distance of `id` from the center, if it was included.
    #[must_use]
    pub fn distance_of(&self, id: &str) -> Option<usize> {
        self.levels
            .iter()
            .position(|level| level.iter().any(|node| node == id))
    }
}

// =============================================================================
// SHORTEST PATH DISPATCH
// =============================================================================

/// Shortest path from `start` to `end`.
///
/// Unweighted graphs use [`bfs`] and report the hop count; weighted graphs
/// use [`dijkstra`] and report the weight sum.
pub fn shortest_path<G>(graph: &G, start: &str, end: &str) -> Result<ShortestPath, GraphError>
where
    G: GraphView + ?Sized,
{
    if graph.is_weighted() {
        return dijkstra(graph, start, end);
    }

    let result = bfs(graph, start, Some(end))?;
    if result.path.is_empty() {
        return Ok(ShortestPath::unreachable());
    }
    let distance = (result.path.len() - 1) as f64;
    Ok(ShortestPath {
        path: result.path,
        distance,
    })
}

/// Walk the parent links back from `end`.
///
/// Returns an empty path unless the chain ends at `start`. A chain that
/// revisits a node is treated the same way.
pub(crate) fn reconstruct_path(
    parents: &BTreeMap<NodeId, NodeId>,
    start: &str,
    end: &str,
) -> Vec<NodeId> {
    let mut path = vec![NodeId::from(end)];
    let mut seen: BTreeSet<&str> = BTreeSet::from([end]);

    let mut current = end;
    while let Some(parent) = parents.get(current) {
        if !seen.insert(parent.as_str()) {
            return Vec::new();
        }
        path.push(parent.clone());
        current = parent.as_str();
    }

    path.reverse();
    if path.first().is_some_and(|first| first == start) {
        path
    } else {
        Vec::new()
    }
}
