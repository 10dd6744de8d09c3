//! Delivery instances: a depot, a set of sized deliveries, a vehicle
//! capacity, and the travel-cost matrix that routing runs against.
//!
//! Instances arrive as JSON with `lat`/`lng` coordinate pairs. The matrix is
//! allocated at load time, one row per location with the depot at index 0,
//! and starts out all-unreachable until [`CvrpInstance::build_matrix`] or
//! [`CvrpInstance::set_matrix`] fills it.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::Deserialize;
use tracing::info;

use crate::error::{Error, Result};
use crate::geo::Coordinates;
use crate::graph::RoadNetwork;
use crate::matching::{match_locations, MatchedLocations};
use crate::matrix::{populate_cost_matrix, CostMatrix, MatrixBuildOptions};

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

impl From<LatLng> for Coordinates {
    fn from(value: LatLng) -> Self {
        Coordinates::new(value.lat, value.lng)
    }
}

#[derive(Debug, Deserialize)]
struct DeliveryFile {
    id: String,
    point: LatLng,
    size: u32,
}

#[derive(Debug, Deserialize)]
struct InstanceFile {
    name: String,
    origin: LatLng,
    vehicle_capacity: u32,
    deliveries: Vec<DeliveryFile>,
}

/// One delivery: an opaque id, a drop-off position, and a demand size.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    pub id: String,
    pub location: Coordinates,
    pub size: u32,
}

/// A capacitated delivery instance together with its cost matrix.
#[derive(Debug, Clone)]
pub struct CvrpInstance {
    name: String,
    origin: Coordinates,
    vehicle_capacity: u32,
    deliveries: Vec<Delivery>,
    matrix: CostMatrix,
}

impl CvrpInstance {
    /// Parse an instance from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let file: InstanceFile = serde_json::from_str(json)?;
        Ok(Self::from_file_repr(file))
    }

    /// Parse an instance from any JSON reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let file: InstanceFile = serde_json::from_reader(reader)?;
        Ok(Self::from_file_repr(file))
    }

    /// Load an instance from a JSON file on disk.
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let instance = Self::from_reader(BufReader::new(file))?;
        info!(
            name = %instance.name,
            deliveries = instance.deliveries.len(),
            capacity = instance.vehicle_capacity,
            "loaded delivery instance"
        );
        Ok(instance)
    }

    fn from_file_repr(file: InstanceFile) -> Self {
        let deliveries: Vec<Delivery> = file
            .deliveries
            .into_iter()
            .map(|delivery| Delivery {
                id: delivery.id,
                location: delivery.point.into(),
                size: delivery.size,
            })
            .collect();
        let matrix = CostMatrix::unreachable(deliveries.len() + 1);
        Self {
            name: file.name,
            origin: file.origin.into(),
            vehicle_capacity: file.vehicle_capacity,
            deliveries,
            matrix,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn origin(&self) -> &Coordinates {
        &self.origin
    }

    pub fn vehicle_capacity(&self) -> u32 {
        self.vehicle_capacity
    }

    pub fn deliveries(&self) -> &[Delivery] {
        &self.deliveries
    }

    /// Number of matrix rows this instance needs: deliveries plus the depot.
    pub fn location_count(&self) -> usize {
        self.deliveries.len() + 1
    }

    pub fn matrix(&self) -> &CostMatrix {
        &self.matrix
    }

    pub fn matrix_mut(&mut self) -> &mut CostMatrix {
        &mut self.matrix
    }

    /// Replace the matrix, rejecting one whose size does not fit.
    pub fn set_matrix(&mut self, matrix: CostMatrix) -> Result<()> {
        if matrix.size() != self.location_count() {
            return Err(Error::MatrixSizeMismatch {
                size: matrix.size(),
                expected: self.location_count(),
            });
        }
        self.matrix = matrix;
        Ok(())
    }

    /// Match every location to the road network and fill the cost matrix in
    /// one step. Returns the matched node ids for callers that want them.
    pub fn build_matrix(
        &mut self,
        network: &RoadNetwork,
        options: &MatrixBuildOptions,
    ) -> Result<MatchedLocations> {
        let matched = match_locations(network, self)?;
        populate_cost_matrix(network, &matched, &mut self.matrix, options)?;
        Ok(matched)
    }

    /// Travel cost between two matrix indices; 0 is the depot.
    pub fn distance(&self, from: usize, to: usize) -> f64 {
        self.matrix.get(from, to)
    }

    /// Demand size of one delivery, addressed by matrix index (at least 1).
    pub fn delivery_size(&self, index: usize) -> u32 {
        self.deliveries[index - 1].size
    }

    /// Cost of one vehicle route: depot, the listed stops in order, then
    /// back to the depot. Stops are matrix indices (each at least 1). Any
    /// unreachable leg makes the whole route cost infinite. An empty route
    /// costs nothing.
    pub fn route_cost(&self, route: &[usize]) -> f64 {
        if route.is_empty() {
            return 0.0;
        }
        let mut cost = 0.0;
        let mut previous = 0;
        for &stop in route {
            cost += self.matrix.get(previous, stop);
            previous = stop;
        }
        cost + self.matrix.get(previous, 0)
    }

    /// Total demand carried on one route.
    pub fn route_demand(&self, route: &[usize]) -> u32 {
        route.iter().map(|&stop| self.delivery_size(stop)).sum()
    }

    /// Delivery matrix indices ordered by increasing distance from the
    /// depot. Unreachable deliveries sort last.
    pub fn deliveries_by_distance(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (1..=self.deliveries.len()).collect();
        order.sort_by(|&a, &b| self.matrix.get(0, a).total_cmp(&self.matrix.get(0, b)));
        order
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "name": "rio-mini",
        "origin": {"lat": -22.9, "lng": -43.2},
        "vehicle_capacity": 120,
        "deliveries": [
            {"id": "a", "point": {"lat": -22.91, "lng": -43.21}, "size": 40},
            {"id": "b", "point": {"lat": -22.92, "lng": -43.19}, "size": 30},
            {"id": "c", "point": {"lat": -22.89, "lng": -43.18}, "size": 50}
        ]
    }"#;

    fn sample_instance() -> CvrpInstance {
        CvrpInstance::from_json_str(SAMPLE).unwrap()
    }

    #[test]
    fn parses_every_field() {
        let instance = sample_instance();
        assert_eq!(instance.name(), "rio-mini");
        assert_eq!(instance.vehicle_capacity(), 120);
        assert_eq!(instance.origin().latitude, -22.9);
        assert_eq!(instance.origin().longitude, -43.2);
        assert_eq!(instance.deliveries().len(), 3);
        assert_eq!(instance.deliveries()[1].id, "b");
        assert_eq!(instance.deliveries()[1].size, 30);
        assert_eq!(instance.deliveries()[2].location.latitude, -22.89);
    }

    #[test]
    fn matrix_is_allocated_at_load_time() {
        let instance = sample_instance();
        assert_eq!(instance.location_count(), 4);
        assert_eq!(instance.matrix().size(), 4);
        assert!(instance.distance(0, 1).is_infinite());
        assert_eq!(instance.distance(2, 2), 0.0);
    }

    #[test]
    fn rejects_malformed_json() {
        let result = CvrpInstance::from_json_str("{\"name\": \"broken\"");
        assert!(matches!(result, Err(Error::Json(_))));
    }

    #[test]
    fn loads_from_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("instance.json");
        std::fs::write(&path, SAMPLE).unwrap();
        let instance = CvrpInstance::load(&path).unwrap();
        assert_eq!(instance.name(), "rio-mini");
        assert_eq!(instance.location_count(), 4);
    }

    #[test]
    fn route_cost_includes_the_return_leg() {
        let mut instance = sample_instance();
        let matrix = instance.matrix_mut();
        matrix.set(0, 1, 10.0);
        matrix.set(1, 2, 5.0);
        matrix.set(2, 0, 7.0);
        assert_eq!(instance.route_cost(&[1, 2]), 22.0);
        assert_eq!(instance.route_cost(&[]), 0.0);
    }

    #[test]
    fn route_cost_is_infinite_when_a_leg_is_unreachable() {
        let mut instance = sample_instance();
        instance.matrix_mut().set(0, 3, 4.0);
        // 3 -> 0 still at the sentinel
        assert!(instance.route_cost(&[3]).is_infinite());
    }

    #[test]
    fn route_demand_sums_delivery_sizes() {
        let instance = sample_instance();
        assert_eq!(instance.route_demand(&[1, 3]), 90);
        assert_eq!(instance.route_demand(&[2]), 30);
        assert_eq!(instance.route_demand(&[]), 0);
    }

    #[test]
    fn deliveries_sort_by_depot_distance() {
        let mut instance = sample_instance();
        let matrix = instance.matrix_mut();
        matrix.set(0, 1, 50.0);
        matrix.set(0, 2, 10.0);
        matrix.set(0, 3, 30.0);
        assert_eq!(instance.deliveries_by_distance(), vec![2, 3, 1]);
    }

    #[test]
    fn set_matrix_rejects_the_wrong_size() {
        let mut instance = sample_instance();
        assert!(matches!(
            instance.set_matrix(CostMatrix::unreachable(3)),
            Err(Error::MatrixSizeMismatch {
                size: 3,
                expected: 4
            })
        ));
        assert!(instance.set_matrix(CostMatrix::unreachable(4)).is_ok());
    }
}
