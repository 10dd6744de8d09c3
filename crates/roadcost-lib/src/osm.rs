//! Road-network extraction from OpenStreetMap PBF extracts.
//!
//! Only ways carrying a `highway` tag contribute to the network, and only
//! nodes referenced by such ways are kept, so every indexed node can carry
//! traffic. Way segments are directed in declaration order; a way tagged
//! `oneway=no` also gets the reverse direction. Segment lengths are
//! great-circle distances between consecutive way nodes.

use std::collections::HashMap;
use std::path::Path;

use osmpbf::{Element, ElementReader};
use tracing::info;

use crate::error::Result;
use crate::geo::Coordinates;
use crate::graph::{NodeId, RoadNetwork};

struct ParsedWay {
    refs: Vec<NodeId>,
    both_directions: bool,
}

/// Read a `.osm.pbf` file into a routable road network.
pub fn read_road_network(path: &Path) -> Result<RoadNetwork> {
    let reader = ElementReader::from_path(path)?;
    let mut nodes: HashMap<NodeId, Coordinates> = HashMap::new();
    let mut ways: Vec<ParsedWay> = Vec::new();

    reader.for_each(|element| match element {
        Element::Node(node) => {
            nodes.insert(node.id(), Coordinates::new(node.lat(), node.lon()));
        }
        Element::DenseNode(node) => {
            nodes.insert(node.id(), Coordinates::new(node.lat(), node.lon()));
        }
        Element::Way(way) => {
            if way.tags().any(|t| t.0 == "highway") {
                let both_directions = way
                    .tags()
                    .find(|t| t.0 == "oneway")
                    .map(|t| t.1 == "no")
                    .unwrap_or(false);
                ways.push(ParsedWay {
                    refs: way.refs().collect(),
                    both_directions,
                });
            }
        }
        _ => {}
    })?;

    let network = assemble(&nodes, &ways);
    info!(
        path = %path.display(),
        ways = ways.len(),
        nodes = network.node_count(),
        edges = network.edge_count(),
        "read road network"
    );
    Ok(network)
}

fn assemble(nodes: &HashMap<NodeId, Coordinates>, ways: &[ParsedWay]) -> RoadNetwork {
    let mut network = RoadNetwork::new();
    for way in ways {
        for &node_id in &way.refs {
            if let Some(&position) = nodes.get(&node_id) {
                if !network.contains(node_id) {
                    network.insert_node(node_id, position);
                }
            }
        }
    }
    for way in ways {
        for pair in way.refs.windows(2) {
            let (from_id, to_id) = (pair[0], pair[1]);
            let (Some(from), Some(to)) = (nodes.get(&from_id), nodes.get(&to_id)) else {
                // way references a node missing from the extract
                continue;
            };
            let length = from.haversine_to(to);
            network.insert_edge(from_id, to_id, length);
            if way.both_directions {
                network.insert_edge(to_id, from_id, length);
            }
        }
    }
    network
}
