//! Road-network routing and capacitated delivery optimization.
//!
//! This crate reads an OpenStreetMap extract into a directed road graph,
//! matches delivery instances onto it, fills a travel-cost matrix in
//! parallel with single-source shortest-path searches, and optimizes the
//! resulting vehicle routes. Higher-level consumers (the CLI) should only
//! depend on the functions exported here instead of reimplementing behavior.
//!

#![deny(warnings)]

pub mod cvrp;
pub mod error;
pub mod geo;
pub mod graph;
pub mod matching;
pub mod matrix;
pub mod osm;
pub mod queue;
pub mod search;
pub mod solver;

pub use cvrp::{CvrpInstance, Delivery};
pub use error::{Error, Result};
pub use geo::{Coordinates, EARTH_RADIUS_M};
pub use graph::{NodeId, RoadEdge, RoadNetwork, RoadNode};
pub use matching::{match_locations, MatchedLocations, NodeLocator};
pub use matrix::{populate_cost_matrix, CostMatrix, MatrixBuildOptions};
pub use osm::read_road_network;
pub use queue::{BinaryQueue, DecreaseKeyQueue, FibonacciQueue, QueueKind};
pub use search::{
    find_route_a_star, find_route_dijkstra, find_route_ida_star, find_route_sma_star,
    shortest_paths, Route, UNREACHABLE,
};
pub use solver::{solve, AnnealingConfig, Solution, SolverKind};
