use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use rand::Rng;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use roadcost_lib::{
    find_route_a_star, find_route_dijkstra, find_route_ida_star, find_route_sma_star,
    read_road_network, solve, AnnealingConfig, Coordinates, CostMatrix, CvrpInstance,
    MatrixBuildOptions, NodeLocator, QueueKind, SolverKind,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Road-network travel costs and delivery routing")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build the travel-cost matrix for a delivery instance and save it.
    Matrix {
        /// OpenStreetMap extract (.osm.pbf) holding the road network.
        #[arg(long)]
        map: PathBuf,
        /// Delivery instance JSON file.
        #[arg(long)]
        instance: PathBuf,
        /// Destination file for the plain-text matrix.
        #[arg(long)]
        output: PathBuf,
        /// Priority queue driving the searches.
        #[arg(long, default_value_t = QueueKind::Fibonacci)]
        queue: QueueKind,
        /// Worker threads; defaults to the available parallelism.
        #[arg(long)]
        workers: Option<usize>,
        /// Optional file receiving one timing line per search.
        #[arg(long)]
        timing_log: Option<PathBuf>,
    },
    /// Find one route between two coordinates on the road network.
    Route {
        /// OpenStreetMap extract (.osm.pbf) holding the road network.
        #[arg(long)]
        map: PathBuf,
        /// Start position as "lat,lon".
        #[arg(long, value_parser = parse_coordinates)]
        from: Coordinates,
        /// Destination position as "lat,lon".
        #[arg(long, value_parser = parse_coordinates)]
        to: Coordinates,
        /// Search algorithm.
        #[arg(long, default_value_t = Algorithm::Dijkstra)]
        algorithm: Algorithm,
        /// Priority queue, for the algorithms that take one.
        #[arg(long, default_value_t = QueueKind::Fibonacci)]
        queue: QueueKind,
        /// Frontier capacity, only used by smastar.
        #[arg(long, default_value_t = 1024)]
        frontier: usize,
    },
    /// Optimize vehicle routes for an instance with a prebuilt matrix.
    Solve {
        /// Delivery instance JSON file.
        #[arg(long)]
        instance: PathBuf,
        /// Matrix file previously written by the matrix command.
        #[arg(long)]
        matrix: PathBuf,
        /// Optimizer to run.
        #[arg(long, default_value_t = SolverKind::Savings)]
        algorithm: SolverKind,
        /// Annealing seed; drawn at random and logged when omitted.
        #[arg(long)]
        seed: Option<u64>,
        /// Annealing start temperature.
        #[arg(long, default_value_t = 5000.0)]
        temperature: f64,
        /// Annealing cooling rate per step.
        #[arg(long, default_value_t = 0.005)]
        cooling: f64,
        /// Print the solution as JSON instead of text.
        #[arg(long)]
        json: bool,
    },
}

/// Point-to-point search algorithm selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Algorithm {
    Dijkstra,
    AStar,
    IdaStar,
    SmaStar,
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Algorithm::Dijkstra => write!(f, "dijkstra"),
            Algorithm::AStar => write!(f, "astar"),
            Algorithm::IdaStar => write!(f, "idastar"),
            Algorithm::SmaStar => write!(f, "smastar"),
        }
    }
}

impl FromStr for Algorithm {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "dijkstra" => Ok(Algorithm::Dijkstra),
            "astar" => Ok(Algorithm::AStar),
            "idastar" => Ok(Algorithm::IdaStar),
            "smastar" => Ok(Algorithm::SmaStar),
            other => Err(format!(
                "unknown algorithm '{other}', expected 'dijkstra', 'astar', 'idastar' or 'smastar'"
            )),
        }
    }
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Matrix {
            map,
            instance,
            output,
            queue,
            workers,
            timing_log,
        } => handle_matrix(&map, &instance, &output, queue, workers, timing_log),
        Command::Route {
            map,
            from,
            to,
            algorithm,
            queue,
            frontier,
        } => handle_route(&map, from, to, algorithm, queue, frontier),
        Command::Solve {
            instance,
            matrix,
            algorithm,
            seed,
            temperature,
            cooling,
            json,
        } => handle_solve(&instance, &matrix, algorithm, seed, temperature, cooling, json),
    }
}

fn handle_matrix(
    map: &Path,
    instance_path: &Path,
    output: &Path,
    queue: QueueKind,
    workers: Option<usize>,
    timing_log: Option<PathBuf>,
) -> Result<()> {
    let network = read_road_network(map)
        .with_context(|| format!("failed to read road network from {}", map.display()))?;
    let mut instance = CvrpInstance::load(instance_path)
        .with_context(|| format!("failed to load instance from {}", instance_path.display()))?;

    let options = MatrixBuildOptions {
        queue,
        workers: workers.unwrap_or_else(default_workers),
        timing_log,
    };
    let matched = instance
        .build_matrix(&network, &options)
        .context("failed to build the travel-cost matrix")?;
    instance
        .matrix()
        .save(output)
        .with_context(|| format!("failed to write matrix to {}", output.display()))?;

    println!(
        "Matrix for {} locations written to {}",
        matched.location_count(),
        output.display()
    );
    Ok(())
}

fn handle_route(
    map: &Path,
    from: Coordinates,
    to: Coordinates,
    algorithm: Algorithm,
    queue: QueueKind,
    frontier: usize,
) -> Result<()> {
    let network = read_road_network(map)
        .with_context(|| format!("failed to read road network from {}", map.display()))?;
    let locator = NodeLocator::build(&network)?;
    let start = locator.nearest(&from).context("road network has no nodes")?;
    let goal = locator.nearest(&to).context("road network has no nodes")?;
    info!(start, goal, %algorithm, "matched coordinates to road nodes");

    let route = match algorithm {
        Algorithm::Dijkstra => find_route_dijkstra(&network, start, goal, queue)?,
        Algorithm::AStar => find_route_a_star(&network, start, goal, queue)?,
        Algorithm::IdaStar => find_route_ida_star(&network, start, goal)?,
        Algorithm::SmaStar => find_route_sma_star(&network, start, goal, frontier)?,
    };
    if !route.is_found() {
        bail!("no route from node {start} to node {goal}");
    }

    println!("Route ({} nodes, {:.1} m):", route.nodes.len(), route.cost);
    for node_id in &route.nodes {
        println!("- {node_id}");
    }
    Ok(())
}

fn handle_solve(
    instance_path: &Path,
    matrix_path: &Path,
    algorithm: SolverKind,
    seed: Option<u64>,
    temperature: f64,
    cooling: f64,
    json: bool,
) -> Result<()> {
    let mut instance = CvrpInstance::load(instance_path)
        .with_context(|| format!("failed to load instance from {}", instance_path.display()))?;
    let matrix = CostMatrix::load(matrix_path)
        .with_context(|| format!("failed to load matrix from {}", matrix_path.display()))?;
    instance.set_matrix(matrix)?;

    let seed = seed.unwrap_or_else(|| rand::thread_rng().gen());
    info!(seed, %algorithm, "running solver");
    let config = AnnealingConfig {
        initial_temperature: temperature,
        cooling_rate: cooling,
        seed,
    };
    let solution = solve(&instance, algorithm, &config)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&solution)?);
    } else {
        println!(
            "Solution for {}: {} vehicles, {:.1} m total",
            instance.name(),
            solution.vehicle_count(),
            solution.total_cost
        );
        for (index, route) in solution.routes.iter().enumerate() {
            let stops: Vec<&str> = route
                .iter()
                .map(|&stop| instance.deliveries()[stop - 1].id.as_str())
                .collect();
            println!(
                "- vehicle {}: {} ({} load, {:.1} m)",
                index + 1,
                stops.join(" -> "),
                instance.route_demand(route),
                instance.route_cost(route)
            );
        }
    }
    Ok(())
}

fn parse_coordinates(value: &str) -> std::result::Result<Coordinates, String> {
    let (lat, lon) = value
        .split_once(',')
        .ok_or_else(|| format!("expected 'lat,lon', got '{value}'"))?;
    let latitude: f64 = lat
        .trim()
        .parse()
        .map_err(|_| format!("invalid latitude '{lat}'"))?;
    let longitude: f64 = lon
        .trim()
        .parse()
        .map_err(|_| format!("invalid longitude '{lon}'"))?;
    if !(-90.0..=90.0).contains(&latitude) {
        return Err(format!("latitude {latitude} out of range"));
    }
    if !(-180.0..=180.0).contains(&longitude) {
        return Err(format!("longitude {longitude} out of range"));
    }
    Ok(Coordinates::new(latitude, longitude))
}

fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // Logs go to stderr so stdout stays parseable command output.
    let subscriber = FmtSubscriber::builder()
        .with_writer(std::io::stderr)
        .with_env_filter(env_filter)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
