//! Breadth-first and depth-first search.

use super::{BfsResult, DfsResult, reconstruct_path};
use crate::graph::GraphView;
use crate::{AdjacencyEntry, GraphError, NodeId};
use std::collections::{BTreeMap, BTreeSet, VecDeque};

/// Breadth-first search from `start`, optionally stopping at `target`.
///
/// A node is marked seen when it is enqueued, but the target is only checked
/// when it is dequeued. The search then returns at once with the distances
/// gathered so far, which may already include nodes one level deeper.
///
/// An unknown `start` yields an empty result with `found == false`.
pub fn bfs<G>(graph: &G, start: &str, target: Option<&str>) -> Result<BfsResult, GraphError>
where
    G: GraphView + ?Sized,
{
    if !graph.node_exists(start)? {
        return Ok(BfsResult::default());
    }

    let start_id = NodeId::from(start);
    let mut visited = Vec::new();
    let mut seen = BTreeSet::from([start_id.clone()]);
    let mut distances = BTreeMap::from([(start_id.clone(), 0usize)]);
    let mut parents: BTreeMap<NodeId, NodeId> = BTreeMap::new();
    let mut queue = VecDeque::from([start_id]);

    while let Some(current) = queue.pop_front() {
        visited.push(current.clone());

        if target == Some(current.as_str()) {
            let path = reconstruct_path(&parents, start, current.as_str());
            tracing::trace!(start, visited = visited.len(), "bfs reached target");
            return Ok(BfsResult {
                visited,
                found: true,
                path,
                distances,
            });
        }

        let depth = distances.get(&current).copied().unwrap_or_default();
        for entry in graph.neighbors(current.as_str())? {
            if seen.insert(entry.to.clone()) {
                distances.insert(entry.to.clone(), depth + 1);
                parents.insert(entry.to.clone(), current.clone());
                queue.push_back(entry.to);
            }
        }
    }

    Ok(BfsResult {
        visited,
        found: target.is_none(),
        path: Vec::new(),
        distances,
    })
}

/// A node whose neighbors are still being explored.
struct Frame {
    node: NodeId,
    neighbors: Vec<AdjacencyEntry>,
    next: usize,
}

/// Depth-first search from `start`, optionally stopping at `target`.
///
/// Visits nodes in the same preorder as the textbook recursive version:
/// neighbors are tried in adjacency order and a neighbor is skipped only if it
/// was already visited when its turn comes. The search stops as soon as the
/// target is visited.
///
/// An unknown `start` yields an empty result with `found == false`.
pub fn dfs<G>(graph: &G, start: &str, target: Option<&str>) -> Result<DfsResult, GraphError>
where
    G: GraphView + ?Sized,
{
    if !graph.node_exists(start)? {
        return Ok(DfsResult::default());
    }

    let start_id = NodeId::from(start);
    let mut visited = vec![start_id.clone()];
    let mut seen = BTreeSet::from([start_id.clone()]);
    let mut parents: BTreeMap<NodeId, NodeId> = BTreeMap::new();
    let mut found = target == Some(start);

    let mut stack = Vec::new();
    if !found {
        stack.push(Frame {
            neighbors: graph.neighbors(start)?,
            node: start_id,
            next: 0,
        });
    }

    while let Some(frame) = stack.last_mut() {
        let Some(entry) = frame.neighbors.get(frame.next) else {
            stack.pop();
            continue;
        };
        let neighbor = entry.to.clone();
        frame.next += 1;

        if !seen.insert(neighbor.clone()) {
            continue;
        }
        parents.insert(neighbor.clone(), frame.node.clone());
        visited.push(neighbor.clone());

        if target == Some(neighbor.as_str()) {
            found = true;
            break;
        }

        let neighbors = graph.neighbors(neighbor.as_str())?;
        stack.push(Frame {
            node: neighbor,
            neighbors,
            next: 0,
        });
    }

    let path = match target {
        Some(target) if found => reconstruct_path(&parents, start, target),
        _ => Vec::new(),
    };

    Ok(DfsResult {
        visited,
        found: found || target.is_none(),
        path,
    })
}
