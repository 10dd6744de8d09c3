//! Directed, geographically weighted road-network graph.
//!
//! The network is built once (by [`crate::osm`] or by hand in tests) and then
//! borrowed read-only by every search, so none of the accessors take locks.

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::geo::Coordinates;

/// Opaque graph node identifier. Ingested networks reuse OSM node ids.
pub type NodeId = i64;

/// A graph vertex: id plus its geographic position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoadNode {
    pub id: NodeId,
    pub position: Coordinates,
}

/// Directed weighted edge. Lengths are non-negative meters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoadEdge {
    pub target: NodeId,
    pub length: f64,
}

/// Graph structure used by the shortest-path algorithms.
///
/// Parallel edges between the same pair of nodes are kept as-is; self-loops
/// may be stored but are never traversed by a search.
#[derive(Debug, Clone, Default)]
pub struct RoadNetwork {
    nodes: HashMap<NodeId, RoadNode>,
    adjacency: HashMap<NodeId, Vec<RoadEdge>>,
}

impl RoadNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node, replacing any previous node with the same id.
    pub fn insert_node(&mut self, id: NodeId, position: Coordinates) {
        self.nodes.insert(id, RoadNode { id, position });
        self.adjacency.entry(id).or_default();
    }

    /// Insert a directed edge of the given length in meters.
    ///
    /// Edges whose endpoints are not both present are dropped, so callers can
    /// stream edges without pre-filtering against the node set. Lengths must
    /// be non-negative.
    pub fn insert_edge(&mut self, from: NodeId, to: NodeId, length: f64) {
        if self.nodes.contains_key(&from) && self.nodes.contains_key(&to) {
            self.adjacency
                .entry(from)
                .or_default()
                .push(RoadEdge { target: to, length });
        }
    }

    /// Look up a node by id.
    pub fn node(&self, id: NodeId) -> Result<&RoadNode> {
        self.nodes.get(&id).ok_or(Error::UnknownNode { id })
    }

    /// Whether the given id names a node in this network.
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Return the outgoing edges for a node.
    ///
    /// Unknown ids and dead ends both yield an empty slice.
    pub fn edges(&self, id: NodeId) -> &[RoadEdge] {
        self.adjacency.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Iterate over all nodes in no particular order.
    pub fn nodes(&self) -> impl Iterator<Item = &RoadNode> {
        self.nodes.values()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
