//! Enumeration of simple paths.

use crate::graph::GraphView;
use crate::{AdjacencyEntry, GraphError, NodeId};
use std::collections::BTreeSet;

/// Neighbors of the last node on the current path that are still untried.
struct Branch {
    neighbors: Vec<AdjacencyEntry>,
    next: usize,
}

/// Every simple (cycle-free) path from `start` to `end`.
///
/// `max_length` caps the number of nodes on a path; longer branches are cut
/// before they are expanded. `max_paths` stops the search once that many
/// paths are found, so the result is the first `max_paths` paths in
/// discovery order. `start == end` yields the single path `[start]`.
/// Empty unless both endpoints exist.
///
/// The number of simple paths grows exponentially on dense or cyclic graphs;
/// bound the search with `max_length` or `max_paths` there.
pub fn all_simple_paths<G>(
    graph: &G,
    start: &str,
    end: &str,
    max_length: Option<usize>,
    max_paths: Option<usize>,
) -> Result<Vec<Vec<NodeId>>, GraphError>
where
    G: GraphView + ?Sized,
{
    let mut found = Vec::new();
    let enough = |found: &Vec<Vec<NodeId>>| max_paths.is_some_and(|cap| found.len() >= cap);
    if enough(&found) || !graph.node_exists(start)? || !graph.node_exists(end)? {
        return Ok(found);
    }

    let mut path = vec![NodeId::from(start)];
    let mut on_path = BTreeSet::from([NodeId::from(start)]);
    let mut stack = Vec::new();

    if let Some(branch) = expand(graph, &path, end, max_length, &mut found)? {
        stack.push(branch);
    }

    while let Some(branch) = stack.last_mut() {
        if enough(&found) {
            break;
        }
        let Some(entry) = branch.neighbors.get(branch.next) else {
            stack.pop();
            if let Some(done) = path.pop() {
                on_path.remove(&done);
            }
            continue;
        };
        let neighbor = entry.to.clone();
        branch.next += 1;

        if on_path.contains(&neighbor) {
            continue;
        }
        on_path.insert(neighbor.clone());
        path.push(neighbor);

        match expand(graph, &path, end, max_length, &mut found)? {
            Some(branch) => stack.push(branch),
            None => {
                if let Some(done) = path.pop() {
                    on_path.remove(&done);
                }
            }
        }
    }

    tracing::trace!(start, end, paths = found.len(), "path enumeration finished");
    Ok(found)
}

/// Handle the node just appended to `path`.
///
/// Records a complete path or prunes an over-long one (both return `None`),
/// otherwise returns the node's neighbors to explore.
fn expand<G>(
    graph: &G,
    path: &[NodeId],
    end: &str,
    max_length: Option<usize>,
    found: &mut Vec<Vec<NodeId>>,
) -> Result<Option<Branch>, GraphError>
where
    G: GraphView + ?Sized,
{
    if max_length.is_some_and(|limit| path.len() > limit) {
        return Ok(None);
    }

    let Some(current) = path.last() else {
        return Ok(None);
    };
    if current == end {
        found.push(path.to_vec());
        return Ok(None);
    }

    Ok(Some(Branch {
        neighbors: graph.neighbors(current.as_str())?,
        next: 0,
    }))
}
