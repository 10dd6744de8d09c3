//! Shared fixtures for the integration tests.

use roadcost_lib::{Coordinates, NodeId, RoadNetwork};

/// Node id for a grid cell; row and column stay readable in failures.
pub fn grid_id(row: usize, column: usize) -> NodeId {
    (row * 1000 + column) as NodeId
}

/// Rectangular street grid with bidirectional segments between 4-neighbors.
/// Edge lengths are true great-circle distances, so heuristics derived from
/// node positions stay consistent with the edge weights.
pub fn grid_network(rows: usize, columns: usize, spacing: f64) -> RoadNetwork {
    let mut network = RoadNetwork::new();
    for row in 0..rows {
        for column in 0..columns {
            network.insert_node(
                grid_id(row, column),
                Coordinates::new(row as f64 * spacing, column as f64 * spacing),
            );
        }
    }
    for row in 0..rows {
        for column in 0..columns {
            if column + 1 < columns {
                connect(&mut network, grid_id(row, column), grid_id(row, column + 1));
            }
            if row + 1 < rows {
                connect(&mut network, grid_id(row, column), grid_id(row + 1, column));
            }
        }
    }
    network
}

fn connect(network: &mut RoadNetwork, a: NodeId, b: NodeId) {
    let from = network.node(a).expect("grid node exists").position;
    let to = network.node(b).expect("grid node exists").position;
    let length = from.haversine_to(&to);
    network.insert_edge(a, b, length);
    network.insert_edge(b, a, length);
}
