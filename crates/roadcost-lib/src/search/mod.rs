//! Shortest-path searches over a [`RoadNetwork`](crate::graph::RoadNetwork).
//!
//! [`dijkstra`] computes single-source results for a whole target set at
//! once; [`astar`] holds the point-to-point family (A*, iterative-deepening
//! A*, and the memory-bounded variant). All of them report missing paths
//! through [`Route::unreachable`] rather than errors; only unknown node ids
//! fail.

use std::collections::HashMap;

use crate::graph::NodeId;

pub mod astar;
pub mod dijkstra;

pub use astar::{find_route_a_star, find_route_ida_star, find_route_sma_star};
pub use dijkstra::{find_route_dijkstra, shortest_paths};

/// Cost reported for a target no path reaches.
pub const UNREACHABLE: f64 = f64::INFINITY;

/// Result of one search: the node sequence from source to destination plus
/// its total cost in meters.
///
/// An empty sequence together with the [`UNREACHABLE`] cost encodes "no path
/// found"; the sentinel is infinite precisely so it can never collide with a
/// real sum of non-negative edge lengths.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub nodes: Vec<NodeId>,
    pub cost: f64,
}

impl Route {
    /// The "no path found" result.
    pub fn unreachable() -> Self {
        Self {
            nodes: Vec::new(),
            cost: UNREACHABLE,
        }
    }

    /// Whether the search found a path.
    pub fn is_found(&self) -> bool {
        !self.nodes.is_empty()
    }
}

/// Walk predecessor links backward from `goal` to `source`.
///
/// Returns `None` if the chain is broken, which callers translate into an
/// unreachable result.
pub(crate) fn reconstruct_path(
    parents: &HashMap<NodeId, NodeId>,
    source: NodeId,
    goal: NodeId,
) -> Option<Vec<NodeId>> {
    let mut path = vec![goal];
    let mut current = goal;
    while current != source {
        current = *parents.get(&current)?;
        path.push(current);
    }
    path.reverse();
    Some(path)
}
