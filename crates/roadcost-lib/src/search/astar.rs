//! Point-to-point heuristic searches: A*, iterative-deepening A*, and a
//! memory-bounded SMA*-style variant.
//!
//! All three use the haversine distance to the goal as the heuristic. It is
//! admissible (a great-circle distance never exceeds a road distance) and
//! consistent, which is what lets A* stop the moment the goal is extracted
//! from the queue.

use std::collections::{HashMap, HashSet};

use crate::error::{Error, Result};
use crate::geo::Coordinates;
use crate::graph::{NodeId, RoadNetwork};
use crate::queue::{
    BinaryQueue, DecreaseKeyQueue, FibonacciHandle, FibonacciQueue, QueueKind,
};

use super::{reconstruct_path, Route};

/// A* from `start` to `goal`, keyed by g + haversine-to-goal.
///
/// Terminates when the goal is extracted from the queue, which yields the
/// optimal path because the heuristic is admissible. Returns
/// [`Route::unreachable`] if the frontier empties first.
pub fn find_route_a_star(
    network: &RoadNetwork,
    start: NodeId,
    goal: NodeId,
    queue: QueueKind,
) -> Result<Route> {
    network.node(start)?;
    network.node(goal)?;
    match queue {
        QueueKind::Binary => run_a_star::<BinaryQueue<NodeId>>(network, start, goal),
        QueueKind::Fibonacci => run_a_star::<FibonacciQueue<NodeId>>(network, start, goal),
    }
}

fn run_a_star<Q: DecreaseKeyQueue<NodeId>>(
    network: &RoadNetwork,
    start: NodeId,
    goal: NodeId,
) -> Result<Route> {
    if start == goal {
        return Ok(Route {
            nodes: vec![start],
            cost: 0.0,
        });
    }
    let goal_position = network.node(goal)?.position;

    let mut g: HashMap<NodeId, f64> = HashMap::new();
    let mut parents: HashMap<NodeId, NodeId> = HashMap::new();
    let mut handles: HashMap<NodeId, Q::Handle> = HashMap::new();
    let mut queue = Q::new();

    let start_h = network.node(start)?.position.haversine_to(&goal_position);
    g.insert(start, 0.0);
    handles.insert(start, queue.insert(start, start_h));

    while let Some((node, _)) = queue.extract_min() {
        handles.remove(&node);
        if node == goal {
            let cost = g.get(&node).copied().unwrap_or(f64::INFINITY);
            return Ok(match reconstruct_path(&parents, start, goal) {
                Some(nodes) => Route { nodes, cost },
                None => Route::unreachable(),
            });
        }
        let node_g = g.get(&node).copied().unwrap_or(f64::INFINITY);
        for edge in network.edges(node) {
            if edge.target == node {
                continue;
            }
            let tentative = node_g + edge.length;
            let best = g.get(&edge.target).copied().unwrap_or(f64::INFINITY);
            if tentative >= best {
                continue;
            }
            g.insert(edge.target, tentative);
            parents.insert(edge.target, node);
            let f = tentative
                + network.node(edge.target)?.position.haversine_to(&goal_position);
            match handles.get(&edge.target) {
                Some(&handle) => queue.decrease_key(handle, f),
                None => {
                    let handle = queue.insert(edge.target, f);
                    handles.insert(edge.target, handle);
                }
            }
        }
    }
    Ok(Route::unreachable())
}

/// Iterative-deepening A*: depth-first probes bounded by an f-cost
/// threshold, restarting with the smallest f that exceeded the last bound.
///
/// Only the current path is held in memory. Nodes already on the path are
/// excluded from expansion, so cyclic detours are never explored; the search
/// finds the same optimal cost as A* on finite graphs, at the price of
/// revisiting work on every restart.
pub fn find_route_ida_star(network: &RoadNetwork, start: NodeId, goal: NodeId) -> Result<Route> {
    network.node(start)?;
    let goal_position = network.node(goal)?.position;
    if start == goal {
        return Ok(Route {
            nodes: vec![start],
            cost: 0.0,
        });
    }

    let mut bound = network.node(start)?.position.haversine_to(&goal_position);
    let mut path = vec![start];
    let mut on_path = HashSet::from([start]);

    loop {
        let probe = bounded_probe(
            network,
            goal,
            &goal_position,
            start,
            0.0,
            bound,
            &mut path,
            &mut on_path,
        )?;
        match probe {
            Probe::Found(cost) => {
                return Ok(Route { nodes: path, cost });
            }
            Probe::Exceeded(next) => bound = next,
            Probe::Exhausted => return Ok(Route::unreachable()),
        }
    }
}

enum Probe {
    /// Goal reached at this total cost; the shared path holds the route.
    Found(f64),
    /// Nothing under the bound; the smallest f seen above it.
    Exceeded(f64),
    /// Every reachable node was tried and no f exceeded the bound.
    Exhausted,
}

#[allow(clippy::too_many_arguments)]
fn bounded_probe(
    network: &RoadNetwork,
    goal: NodeId,
    goal_position: &Coordinates,
    node: NodeId,
    cost: f64,
    bound: f64,
    path: &mut Vec<NodeId>,
    on_path: &mut HashSet<NodeId>,
) -> Result<Probe> {
    let f = cost + network.node(node)?.position.haversine_to(goal_position);
    if f > bound {
        return Ok(Probe::Exceeded(f));
    }
    if node == goal {
        return Ok(Probe::Found(cost));
    }

    let mut next_bound = f64::INFINITY;
    for edge in network.edges(node) {
        if edge.target == node || on_path.contains(&edge.target) {
            continue;
        }
        path.push(edge.target);
        on_path.insert(edge.target);
        let probe = bounded_probe(
            network,
            goal,
            goal_position,
            edge.target,
            cost + edge.length,
            bound,
            path,
            on_path,
        )?;
        match probe {
            // Leave the path intact; it now spells out the full route.
            found @ Probe::Found(_) => return Ok(found),
            Probe::Exceeded(value) => next_bound = next_bound.min(value),
            Probe::Exhausted => {}
        }
        path.pop();
        on_path.remove(&edge.target);
    }

    if next_bound.is_finite() {
        Ok(Probe::Exceeded(next_bound))
    } else {
        Ok(Probe::Exhausted)
    }
}

/// Memory-bounded A* in the SMA* spirit: the frontier never exceeds
/// `capacity` entries.
///
/// When a newly generated node would overflow the cap, the worst frontier
/// entry (highest f) is evicted through the Fibonacci heap's `extract_max`;
/// if the new node is itself the worst, it is dropped and the old entry is
/// reinserted. Evicted nodes forget their tentative cost so later paths can
/// regenerate them. With tight caps the result may be suboptimal, or
/// unreachable even though a path exists: this is an approximate method, not
/// an exact one, and it is pinned to the Fibonacci queue because only that
/// variant offers `extract_max`.
pub fn find_route_sma_star(
    network: &RoadNetwork,
    start: NodeId,
    goal: NodeId,
    capacity: usize,
) -> Result<Route> {
    if capacity == 0 {
        return Err(Error::InvalidFrontierCapacity);
    }
    network.node(start)?;
    let goal_position = network.node(goal)?.position;
    if start == goal {
        return Ok(Route {
            nodes: vec![start],
            cost: 0.0,
        });
    }

    let mut g: HashMap<NodeId, f64> = HashMap::new();
    let mut parents: HashMap<NodeId, NodeId> = HashMap::new();
    let mut handles: HashMap<NodeId, FibonacciHandle> = HashMap::new();
    let mut queue: FibonacciQueue<NodeId> = FibonacciQueue::new();

    let start_h = network.node(start)?.position.haversine_to(&goal_position);
    g.insert(start, 0.0);
    handles.insert(start, queue.insert(start, start_h));

    while let Some((node, _)) = queue.extract_min() {
        handles.remove(&node);
        if node == goal {
            let cost = g.get(&node).copied().unwrap_or(f64::INFINITY);
            return Ok(match reconstruct_path(&parents, start, goal) {
                Some(nodes) => Route { nodes, cost },
                None => Route::unreachable(),
            });
        }
        let node_g = g.get(&node).copied().unwrap_or(f64::INFINITY);
        for edge in network.edges(node) {
            if edge.target == node {
                continue;
            }
            let tentative = node_g + edge.length;
            let best = g.get(&edge.target).copied().unwrap_or(f64::INFINITY);
            if tentative >= best {
                continue;
            }
            let f = tentative
                + network.node(edge.target)?.position.haversine_to(&goal_position);

            if let Some(&handle) = handles.get(&edge.target) {
                g.insert(edge.target, tentative);
                parents.insert(edge.target, node);
                queue.decrease_key(handle, f);
                continue;
            }

            if queue.len() >= capacity {
                match queue.extract_max() {
                    Some((worst, worst_key)) if f > worst_key => {
                        // The newcomer is the worst of all; keep the old
                        // entry and skip the newcomer.
                        let handle = queue.insert(worst, worst_key);
                        handles.insert(worst, handle);
                        continue;
                    }
                    Some((worst, _)) => {
                        handles.remove(&worst);
                        g.remove(&worst);
                    }
                    None => {}
                }
            }
            g.insert(edge.target, tentative);
            parents.insert(edge.target, node);
            let handle = queue.insert(edge.target, f);
            handles.insert(edge.target, handle);
        }
    }
    Ok(Route::unreachable())
}
