//! Map matching: nearest road-network node for every instance location.
//!
//! Positions are projected onto 3-D Earth-centered coordinates before going
//! into the KD-tree, so chord distance orders candidates the same way the
//! great-circle distance does and no query ever wraps around the antimeridian.

use kiddo::float::kdtree::KdTree;
use kiddo::SquaredEuclidean;
use tracing::{debug, info};

use crate::cvrp::CvrpInstance;
use crate::error::{Error, Result};
use crate::geo::{Coordinates, EARTH_RADIUS_M};
use crate::graph::{NodeId, RoadNetwork};

/// KD-tree bucket size (kiddo default).
const BUCKET_SIZE: usize = 32;

/// Matched node ids for one routing instance, aligned with matrix indices:
/// index 0 is the depot, index i >= 1 the i-th delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedLocations {
    depot: NodeId,
    deliveries: Vec<NodeId>,
}

impl MatchedLocations {
    pub fn new(depot: NodeId, deliveries: Vec<NodeId>) -> Self {
        Self { depot, deliveries }
    }

    pub fn depot(&self) -> NodeId {
        self.depot
    }

    pub fn deliveries(&self) -> &[NodeId] {
        &self.deliveries
    }

    /// Depot plus deliveries, in matrix-index order.
    pub fn node_ids(&self) -> Vec<NodeId> {
        let mut ids = Vec::with_capacity(self.location_count());
        ids.push(self.depot);
        ids.extend_from_slice(&self.deliveries);
        ids
    }

    /// Number of locations including the depot; always at least 1.
    pub fn location_count(&self) -> usize {
        self.deliveries.len() + 1
    }
}

/// Spatial index over every node of a road network.
pub struct NodeLocator {
    tree: KdTree<f64, usize, 3, BUCKET_SIZE, u32>,
    ids: Vec<NodeId>,
}

impl NodeLocator {
    /// Index every node of `network`. Fails on an empty network.
    pub fn build(network: &RoadNetwork) -> Result<Self> {
        if network.is_empty() {
            return Err(Error::EmptyNetwork);
        }
        let mut tree: KdTree<f64, usize, 3, BUCKET_SIZE, u32> = KdTree::new();
        let mut ids = Vec::with_capacity(network.node_count());
        for node in network.nodes() {
            let index = ids.len();
            tree.add(&to_cartesian(&node.position), index);
            ids.push(node.id);
        }
        debug!(nodes = ids.len(), "built node locator");
        Ok(Self { tree, ids })
    }

    /// The node nearest to `position` by straight-line distance, or `None`
    /// only if the index is somehow empty (construction forbids that).
    pub fn nearest(&self, position: &Coordinates) -> Option<NodeId> {
        let neighbors = self
            .tree
            .nearest_n::<SquaredEuclidean>(&to_cartesian(position), 1);
        neighbors.first().map(|neighbor| self.ids[neighbor.item])
    }
}

/// Match the instance's depot and every delivery to its nearest road node.
pub fn match_locations(
    network: &RoadNetwork,
    instance: &CvrpInstance,
) -> Result<MatchedLocations> {
    let locator = NodeLocator::build(network)?;
    let depot = locator
        .nearest(instance.origin())
        .ok_or(Error::EmptyNetwork)?;
    let mut deliveries = Vec::with_capacity(instance.deliveries().len());
    for delivery in instance.deliveries() {
        let node = locator
            .nearest(&delivery.location)
            .ok_or(Error::EmptyNetwork)?;
        deliveries.push(node);
    }
    info!(
        depot,
        deliveries = deliveries.len(),
        "matched instance locations to road nodes"
    );
    Ok(MatchedLocations::new(depot, deliveries))
}

fn to_cartesian(position: &Coordinates) -> [f64; 3] {
    let lat = position.latitude.to_radians();
    let lon = position.longitude.to_radians();
    [
        EARTH_RADIUS_M * lat.cos() * lon.cos(),
        EARTH_RADIUS_M * lat.cos() * lon.sin(),
        EARTH_RADIUS_M * lat.sin(),
    ]
}
