//! Dijkstra's algorithm over adjacency weights.

use super::{ShortestPath, reconstruct_path};
use crate::graph::GraphView;
use crate::{GraphError, NodeId};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, BinaryHeap};

/// Entry in the priority queue.
#[derive(Debug, Clone)]
struct DijkstraEntry {
    distance: f64,
    node: NodeId,
}

impl PartialEq for DijkstraEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for DijkstraEntry {}

impl PartialOrd for DijkstraEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DijkstraEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: BinaryHeap is a max-heap, we want the smallest distance,
        // then the smallest node id.
        other
            .distance
            .total_cmp(&self.distance)
            .then_with(|| other.node.cmp(&self.node))
    }
}

/// Cheapest path from `start` to `end` by summed adjacency weights.
///
/// Missing weights count as 1.0. A node is finalised when it is popped, and
/// the search stops as soon as `end` is finalised. Among equally distant
/// frontier nodes the smaller id is expanded first.
///
/// Negative weights are not rejected but void the optimality guarantee.
/// Returns [`ShortestPath::unreachable`] if either endpoint is missing or no
/// path exists.
pub fn dijkstra<G>(graph: &G, start: &str, end: &str) -> Result<ShortestPath, GraphError>
where
    G: GraphView + ?Sized,
{
    if !graph.node_exists(start)? || !graph.node_exists(end)? {
        return Ok(ShortestPath::unreachable());
    }

    let start_id = NodeId::from(start);
    let mut distances: BTreeMap<NodeId, f64> = BTreeMap::from([(start_id.clone(), 0.0)]);
    let mut parents: BTreeMap<NodeId, NodeId> = BTreeMap::new();
    let mut finalized: BTreeSet<NodeId> = BTreeSet::new();
    let mut heap = BinaryHeap::from([DijkstraEntry {
        distance: 0.0,
        node: start_id,
    }]);

    while let Some(DijkstraEntry { distance, node }) = heap.pop() {
        if !finalized.insert(node.clone()) {
            continue;
        }
        if node == end {
            break;
        }

        for entry in graph.neighbors(node.as_str())? {
            let candidate = distance + entry.cost();
            let known = distances.get(&entry.to).copied().unwrap_or(f64::INFINITY);
            if candidate < known {
                distances.insert(entry.to.clone(), candidate);
                parents.insert(entry.to.clone(), node.clone());
                heap.push(DijkstraEntry {
                    distance: candidate,
                    node: entry.to,
                });
            }
        }
    }

    let Some(&distance) = distances.get(end) else {
        return Ok(ShortestPath::unreachable());
    };
    let path = reconstruct_path(&parents, start, end);
    if path.is_empty() {
        return Ok(ShortestPath::unreachable());
    }

    tracing::trace!(start, end, distance, hops = path.len(), "dijkstra finished");
    Ok(ShortestPath { path, distance })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traversal::shortest_path;
    use crate::{Graph, GraphOptions};

    fn weighted(nodes: &[&str], edges: &[(&str, &str, f64)]) -> Graph {
        let mut graph = Graph::in_memory(GraphOptions::directed().weighted(true));
        for id in nodes {
            graph.add_node(id, None).expect("add node");
        }
        for (from, to, weight) in edges {
            assert!(graph.add_weighted_edge(from, to, *weight).expect("add edge"));
        }
        graph
    }

    #[test]
    fn heap_pops_smallest_distance_then_smallest_id() {
        let mut heap = BinaryHeap::new();
        for (distance, node) in [(2.0, "A"), (1.0, "C"), (1.0, "B")] {
            heap.push(DijkstraEntry {
                distance,
                node: NodeId::from(node),
            });
        }
        let order: Vec<NodeId> = std::iter::from_fn(|| heap.pop().map(|e| e.node)).collect();
        assert_eq!(order, vec!["B", "C", "A"]);
    }

    #[test]
    fn picks_cheapest_route() {
        let graph = weighted(
            &["A", "B", "C", "D", "E"],
            &[
                ("A", "B", 4.0),
                ("A", "C", 2.0),
                ("B", "D", 5.0),
                ("C", "D", 1.0),
                ("D", "E", 3.0),
            ],
        );

        let result = dijkstra(&graph, "A", "E").expect("dijkstra");
        assert_eq!(result.path, vec!["A", "C", "D", "E"]);
        assert_eq!(result.distance, 6.0);

        let dispatched = shortest_path(&graph, "A", "E").expect("shortest");
        assert_eq!(dispatched, result);
    }

    #[test]
    fn prefers_light_long_route_over_heavy_short_one() {
        let graph = weighted(
            &["A", "B", "C"],
            &[("A", "C", 10.0), ("A", "B", 1.0), ("B", "C", 1.0)],
        );
        let result = dijkstra(&graph, "A", "C").expect("dijkstra");
        assert_eq!(result.path, vec!["A", "B", "C"]);
        assert_eq!(result.distance, 2.0);
    }

    #[test]
    fn equal_cost_ties_go_to_smaller_id() {
        let graph = weighted(
            &["S", "X", "Y", "T"],
            &[("S", "Y", 1.0), ("S", "X", 1.0), ("Y", "T", 1.0), ("X", "T", 1.0)],
        );
        let result = dijkstra(&graph, "S", "T").expect("dijkstra");
        assert_eq!(result.path, vec!["S", "X", "T"]);
        assert_eq!(result.distance, 2.0);
    }

    #[test]
    fn start_equal_to_end_costs_nothing() {
        let graph = weighted(&["A"], &[]);
        let result = dijkstra(&graph, "A", "A").expect("dijkstra");
        assert_eq!(result.path, vec!["A"]);
        assert_eq!(result.distance, 0.0);
    }

    #[test]
    fn unreachable_and_missing_are_infinite() {
        let graph = weighted(&["A", "Z"], &[]);

        let unreachable = dijkstra(&graph, "A", "Z").expect("dijkstra");
        assert!(unreachable.path.is_empty());
        assert_eq!(unreachable.distance, f64::INFINITY);

        let missing = dijkstra(&graph, "A", "ghost").expect("dijkstra");
        assert_eq!(missing, ShortestPath::unreachable());
    }
}
