//! Hop-bounded neighborhood around a focus node.

use super::Neighborhood;
use crate::graph::GraphView;
use crate::{Edge, GraphError, NodeId};
use std::collections::{BTreeMap, BTreeSet};

/// Nodes within `radius` hops of `center`, grouped by hop distance.
///
/// Edges are followed in both directions, so on a directed graph the
/// predecessors of a node count as neighbors too. Within a level, nodes keep
/// discovery order: outgoing neighbors in adjacency order, then incoming ones
/// in id order. `limit` caps the total number of nodes, center included.
/// The result also lists every stored edge between two included nodes.
///
/// An unknown center yields an empty neighborhood.
pub fn neighborhood<G>(
    graph: &G,
    center: &str,
    radius: usize,
    limit: Option<usize>,
) -> Result<Neighborhood, GraphError>
where
    G: GraphView + ?Sized,
{
    let cap = limit.unwrap_or(usize::MAX);
    if cap == 0 || !graph.node_exists(center)? {
        return Ok(Neighborhood::default());
    }

    let incoming = if radius > 0 {
        incoming_index(graph)?
    } else {
        BTreeMap::new()
    };

    let mut included = BTreeSet::from([NodeId::from(center)]);
    let mut levels = vec![vec![NodeId::from(center)]];
    let mut frontier = vec![NodeId::from(center)];

    for _ in 0..radius {
        let mut next = Vec::new();

        'level: for node in &frontier {
            let outgoing = graph.neighbors(node.as_str())?.into_iter().map(|entry| entry.to);
            let predecessors = incoming.get(node).into_iter().flatten().cloned();
            for neighbor in outgoing.chain(predecessors) {
                if included.len() >= cap {
                    break 'level;
                }
                if included.insert(neighbor.clone()) {
                    next.push(neighbor);
                }
            }
        }

        if next.is_empty() {
            break;
        }
        levels.push(next.clone());
        frontier = next;
    }

    let mut edges = Vec::new();
    for node in levels.iter().flatten() {
        for entry in graph.neighbors(node.as_str())? {
            if included.contains(&entry.to) {
                edges.push(Edge {
                    from: node.clone(),
                    to: entry.to,
                    weight: entry.weight,
                    label: None,
                });
            }
        }
    }

    tracing::trace!(center, radius, nodes = included.len(), "neighborhood collected");
    Ok(Neighborhood {
        center: Some(NodeId::from(center)),
        levels,
        edges,
    })
}

/// Owners of every adjacency entry, keyed by the node the entry points at.
fn incoming_index<G>(graph: &G) -> Result<BTreeMap<NodeId, Vec<NodeId>>, GraphError>
where
    G: GraphView + ?Sized,
{
    let mut index: BTreeMap<NodeId, Vec<NodeId>> = BTreeMap::new();
    for owner in graph.list_nodes()? {
        for entry in graph.neighbors(owner.as_str())? {
            index.entry(entry.to).or_default().push(owner.clone());
        }
    }
    Ok(index)
}
