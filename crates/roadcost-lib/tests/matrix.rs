//! Matrix pipeline over a real grid: matching, parallel build, persistence.

mod common;

use common::{grid_id, grid_network};
use roadcost_lib::{
    find_route_dijkstra, match_locations, populate_cost_matrix, CostMatrix, CvrpInstance,
    MatrixBuildOptions, QueueKind,
};

const INSTANCE: &str = r#"{
    "name": "grid-sample",
    "origin": {"lat": 0.0, "lng": 0.0},
    "vehicle_capacity": 10,
    "deliveries": [
        {"id": "north-east", "point": {"lat": 0.01, "lng": 0.02}, "size": 3},
        {"id": "far-corner", "point": {"lat": 0.03, "lng": 0.03}, "size": 4},
        {"id": "south", "point": {"lat": 0.02, "lng": 0.0}, "size": 2}
    ]
}"#;

#[test]
fn instance_locations_snap_to_the_nearest_grid_nodes() {
    let network = grid_network(4, 4, 0.01);
    let instance = CvrpInstance::from_json_str(INSTANCE).expect("instance parses");

    let matched = match_locations(&network, &instance).expect("matching succeeds");
    assert_eq!(matched.depot(), grid_id(0, 0));
    assert_eq!(
        matched.deliveries(),
        &[grid_id(1, 2), grid_id(3, 3), grid_id(2, 0)]
    );
}

#[test]
fn worker_count_and_queue_kind_never_change_the_matrix() {
    let network = grid_network(4, 4, 0.01);
    let instance = CvrpInstance::from_json_str(INSTANCE).expect("instance parses");
    let matched = match_locations(&network, &instance).expect("matching succeeds");

    let mut reference = CostMatrix::unreachable(matched.location_count());
    populate_cost_matrix(&network, &matched, &mut reference, &MatrixBuildOptions::default())
        .expect("build succeeds");

    for workers in [2, 8] {
        for queue in [QueueKind::Binary, QueueKind::Fibonacci] {
            let mut matrix = CostMatrix::unreachable(matched.location_count());
            let options = MatrixBuildOptions {
                queue,
                workers,
                timing_log: None,
            };
            populate_cost_matrix(&network, &matched, &mut matrix, &options)
                .expect("build succeeds");
            assert_eq!(matrix, reference, "workers={workers} queue={queue}");
        }
    }
}

#[test]
fn matrix_cells_match_point_to_point_searches() {
    let network = grid_network(4, 4, 0.01);
    let instance = CvrpInstance::from_json_str(INSTANCE).expect("instance parses");
    let matched = match_locations(&network, &instance).expect("matching succeeds");

    let options = MatrixBuildOptions {
        queue: QueueKind::Binary,
        ..MatrixBuildOptions::default()
    };
    let mut matrix = CostMatrix::unreachable(matched.location_count());
    populate_cost_matrix(&network, &matched, &mut matrix, &options).expect("build succeeds");

    let ids = matched.node_ids();
    for (i, &from) in ids.iter().enumerate() {
        for (j, &to) in ids.iter().enumerate() {
            let route = find_route_dijkstra(&network, from, to, QueueKind::Binary)
                .expect("search runs");
            assert_eq!(matrix.get(i, j), route.cost, "cell ({i}, {j})");
        }
    }
}

#[test]
fn built_matrix_round_trips_through_disk_into_an_instance() {
    let network = grid_network(4, 4, 0.01);
    let mut built = CvrpInstance::from_json_str(INSTANCE).expect("instance parses");
    built
        .build_matrix(&network, &MatrixBuildOptions::default())
        .expect("build succeeds");

    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("grid.matrix");
    built.matrix().save(&path).expect("save succeeds");

    let mut reloaded = CvrpInstance::from_json_str(INSTANCE).expect("instance parses");
    let matrix = CostMatrix::load(&path).expect("load succeeds");
    reloaded.set_matrix(matrix).expect("sizes line up");

    for from in 0..built.location_count() {
        for to in 0..built.location_count() {
            assert_eq!(reloaded.distance(from, to), built.distance(from, to));
            assert!(built.distance(from, to).is_finite(), "grid is connected");
        }
    }
}
