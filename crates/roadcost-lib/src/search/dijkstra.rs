//! Single-source, multi-target Dijkstra over the queue abstraction.

use std::collections::{HashMap, HashSet};

use crate::error::Result;
use crate::graph::{NodeId, RoadNetwork};
use crate::queue::{BinaryQueue, DecreaseKeyQueue, FibonacciQueue, QueueKind};

use super::{reconstruct_path, Route};

/// Shortest paths from `source` to every node in `targets`.
///
/// Label-correcting Dijkstra seeded at `source`, stopping as soon as every
/// requested target has been settled (early exit is an optimization only;
/// settled distances are final under non-negative weights). The returned map
/// has one entry per distinct target: its path and total cost, or
/// [`Route::unreachable`] if no path exists. A target equal to the source
/// yields the trivial single-node route without touching the queue. Unknown
/// source or target ids are not-found errors.
pub fn shortest_paths(
    network: &RoadNetwork,
    source: NodeId,
    targets: &[NodeId],
    queue: QueueKind,
) -> Result<HashMap<NodeId, Route>> {
    network.node(source)?;
    for &target in targets {
        network.node(target)?;
    }
    match queue {
        QueueKind::Binary => run::<BinaryQueue<NodeId>>(network, source, targets),
        QueueKind::Fibonacci => run::<FibonacciQueue<NodeId>>(network, source, targets),
    }
}

/// Point-to-point convenience wrapper over [`shortest_paths`].
pub fn find_route_dijkstra(
    network: &RoadNetwork,
    start: NodeId,
    goal: NodeId,
    queue: QueueKind,
) -> Result<Route> {
    let mut results = shortest_paths(network, start, &[goal], queue)?;
    Ok(results.remove(&goal).unwrap_or_else(Route::unreachable))
}

fn run<Q: DecreaseKeyQueue<NodeId>>(
    network: &RoadNetwork,
    source: NodeId,
    targets: &[NodeId],
) -> Result<HashMap<NodeId, Route>> {
    let mut pending: HashSet<NodeId> = targets.iter().copied().collect();
    let mut results: HashMap<NodeId, Route> = HashMap::new();

    if pending.remove(&source) {
        results.insert(
            source,
            Route {
                nodes: vec![source],
                cost: 0.0,
            },
        );
    }

    let mut dist: HashMap<NodeId, f64> = HashMap::new();
    let mut parents: HashMap<NodeId, NodeId> = HashMap::new();

    if !pending.is_empty() {
        let mut queue = Q::new();
        let mut handles: HashMap<NodeId, Q::Handle> = HashMap::new();
        dist.insert(source, 0.0);
        handles.insert(source, queue.insert(source, 0.0));

        while let Some((node, node_dist)) = queue.extract_min() {
            handles.remove(&node);
            if pending.remove(&node) && pending.is_empty() {
                break;
            }
            for edge in network.edges(node) {
                if edge.target == node {
                    continue;
                }
                let tentative = node_dist + edge.length;
                let improved = match dist.get(&edge.target) {
                    Some(&best) => tentative < best,
                    None => true,
                };
                if !improved {
                    continue;
                }
                dist.insert(edge.target, tentative);
                parents.insert(edge.target, node);
                match handles.get(&edge.target) {
                    Some(&handle) => queue.decrease_key(handle, tentative),
                    None => {
                        let handle = queue.insert(edge.target, tentative);
                        handles.insert(edge.target, handle);
                    }
                }
            }
        }
    }

    for &target in targets {
        if results.contains_key(&target) {
            continue;
        }
        let route = if pending.contains(&target) {
            Route::unreachable()
        } else {
            match (reconstruct_path(&parents, source, target), dist.get(&target)) {
                (Some(nodes), Some(&cost)) => Route { nodes, cost },
                _ => Route::unreachable(),
            }
        };
        results.insert(target, route);
    }
    Ok(results)
}
