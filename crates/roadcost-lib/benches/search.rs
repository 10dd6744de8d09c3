use criterion::{criterion_group, criterion_main, Criterion};
use once_cell::sync::Lazy;
use roadcost_lib::{
    find_route_a_star, find_route_dijkstra, populate_cost_matrix, CostMatrix, Coordinates,
    MatchedLocations, MatrixBuildOptions, NodeId, QueueKind, RoadNetwork,
};
use std::hint::black_box;

const ROWS: usize = 20;
const COLUMNS: usize = 20;
const SPACING: f64 = 0.001;

fn grid_id(row: usize, column: usize) -> NodeId {
    (row * 1000 + column) as NodeId
}

fn grid_network() -> RoadNetwork {
    let mut network = RoadNetwork::new();
    for row in 0..ROWS {
        for column in 0..COLUMNS {
            network.insert_node(
                grid_id(row, column),
                Coordinates::new(row as f64 * SPACING, column as f64 * SPACING),
            );
        }
    }
    let mut connect = |network: &mut RoadNetwork, a: NodeId, b: NodeId| {
        let from = network.node(a).expect("grid node exists").position;
        let to = network.node(b).expect("grid node exists").position;
        let length = from.haversine_to(&to);
        network.insert_edge(a, b, length);
        network.insert_edge(b, a, length);
    };
    for row in 0..ROWS {
        for column in 0..COLUMNS {
            if column + 1 < COLUMNS {
                connect(&mut network, grid_id(row, column), grid_id(row, column + 1));
            }
            if row + 1 < ROWS {
                connect(&mut network, grid_id(row, column), grid_id(row + 1, column));
            }
        }
    }
    network
}

static NETWORK: Lazy<RoadNetwork> = Lazy::new(grid_network);
static MATCHED: Lazy<MatchedLocations> = Lazy::new(|| {
    MatchedLocations::new(
        grid_id(0, 0),
        vec![
            grid_id(4, 17),
            grid_id(9, 3),
            grid_id(12, 12),
            grid_id(19, 1),
            grid_id(19, 19),
            grid_id(2, 8),
            grid_id(15, 6),
            grid_id(7, 14),
        ],
    )
});

fn benchmark_searches(c: &mut Criterion) {
    let network = &*NETWORK;
    let start = grid_id(0, 0);
    let goal = grid_id(ROWS - 1, COLUMNS - 1);

    c.bench_function("dijkstra_binary_grid", |b| {
        b.iter(|| {
            let route = find_route_dijkstra(network, start, goal, QueueKind::Binary)
                .expect("route exists");
            black_box(route.cost)
        });
    });

    c.bench_function("dijkstra_fibonacci_grid", |b| {
        b.iter(|| {
            let route = find_route_dijkstra(network, start, goal, QueueKind::Fibonacci)
                .expect("route exists");
            black_box(route.cost)
        });
    });

    c.bench_function("a_star_fibonacci_grid", |b| {
        b.iter(|| {
            let route = find_route_a_star(network, start, goal, QueueKind::Fibonacci)
                .expect("route exists");
            black_box(route.nodes.len())
        });
    });
}

fn benchmark_matrix_build(c: &mut Criterion) {
    let network = &*NETWORK;
    let matched = &*MATCHED;

    for workers in [1usize, 4] {
        let options = MatrixBuildOptions {
            workers,
            ..MatrixBuildOptions::default()
        };
        c.bench_function(&format!("matrix_build_{workers}_workers"), |b| {
            b.iter(|| {
                let mut matrix = CostMatrix::unreachable(matched.location_count());
                populate_cost_matrix(network, matched, &mut matrix, &options)
                    .expect("matrix builds");
                black_box(matrix.get(0, 1))
            });
        });
    }
}

criterion_group!(benches, benchmark_searches, benchmark_matrix_build);
criterion_main!(benches);
