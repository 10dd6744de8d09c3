//! Simulated annealing over a giant-tour encoding.
//!
//! The tour is every route concatenated with a 0 separator between
//! consecutive vehicles. Moves permute the tour; a candidate that overloads
//! a vehicle or crosses an unreachable leg is discarded before the
//! acceptance test. The best feasible tour ever seen is returned, so the
//! result is never worse than the input.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::cvrp::CvrpInstance;
use crate::solver::Solution;

/// Cooling schedule and seed for [`improve`].
#[derive(Debug, Clone)]
pub struct AnnealingConfig {
    /// Starting temperature; the walk stops once it decays below 1.
    pub initial_temperature: f64,
    /// Fraction of the temperature shed after every step.
    pub cooling_rate: f64,
    /// Seed for the private random generator, making runs reproducible.
    pub seed: u64,
}

impl Default for AnnealingConfig {
    fn default() -> Self {
        Self {
            initial_temperature: 5000.0,
            cooling_rate: 0.005,
            seed: 42,
        }
    }
}

/// Anneal an existing feasible solution.
pub fn improve(instance: &CvrpInstance, initial: Solution, config: &AnnealingConfig) -> Solution {
    let mut tour = encode(&initial);
    if tour.len() < 2 {
        return initial;
    }
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut current_cost = initial.total_cost;
    let mut best = initial;
    let mut temperature = config.initial_temperature;

    while temperature > 1.0 {
        let mut candidate = tour.clone();
        mutate(&mut candidate, &mut rng);
        if let Some(solution) = decode(&candidate, instance) {
            let cost = solution.total_cost;
            if acceptance(current_cost, cost, temperature) > rng.gen::<f64>() {
                tour = candidate;
                current_cost = cost;
                if cost < best.total_cost {
                    best = solution;
                }
            }
        }
        temperature *= 1.0 - config.cooling_rate;
    }

    debug!(
        cost = best.total_cost,
        vehicles = best.vehicle_count(),
        "annealing finished"
    );
    best
}

fn acceptance(current: f64, candidate: f64, temperature: f64) -> f64 {
    if candidate < current {
        1.0
    } else {
        ((current - candidate) / temperature).exp()
    }
}

fn encode(solution: &Solution) -> Vec<usize> {
    let mut tour = Vec::new();
    for (index, route) in solution.routes.iter().enumerate() {
        if index > 0 {
            tour.push(0);
        }
        tour.extend_from_slice(route);
    }
    tour
}

fn decode(tour: &[usize], instance: &CvrpInstance) -> Option<Solution> {
    let mut routes = Vec::new();
    for segment in tour.split(|&stop| stop == 0) {
        if segment.is_empty() {
            continue;
        }
        if instance.route_demand(segment) > instance.vehicle_capacity() {
            return None;
        }
        routes.push(segment.to_vec());
    }
    let solution = Solution::from_routes(routes, instance);
    solution.total_cost.is_finite().then_some(solution)
}

fn mutate(tour: &mut Vec<usize>, rng: &mut StdRng) {
    match rng.gen_range(0..4) {
        0 => {
            let a = rng.gen_range(0..tour.len());
            let b = rng.gen_range(0..tour.len());
            tour.swap(a, b);
        }
        1 => {
            let (a, b) = span(tour.len(), rng);
            tour[a..b].reverse();
        }
        2 => {
            let (a, b) = span(tour.len(), rng);
            tour[a..b].shuffle(rng);
        }
        _ => {
            let from = rng.gen_range(0..tour.len());
            let stop = tour.remove(from);
            let to = rng.gen_range(0..=tour.len());
            tour.insert(to, stop);
        }
    }
}

/// Random non-empty half-open index range within `0..len`.
fn span(len: usize, rng: &mut StdRng) -> (usize, usize) {
    let a = rng.gen_range(0..len);
    let b = rng.gen_range(0..len);
    if a <= b {
        (a, b + 1)
    } else {
        (b, a + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::savings;
    use crate::solver::tests::ring_instance;

    #[test]
    fn giant_tour_round_trips_through_encode_and_decode() {
        let instance = ring_instance(7);
        let solution = Solution::from_routes(vec![vec![1, 2], vec![3, 4]], &instance);
        let tour = encode(&solution);
        assert_eq!(tour, vec![1, 2, 0, 3, 4]);
        let decoded = decode(&tour, &instance).unwrap();
        assert_eq!(decoded, solution);
    }

    #[test]
    fn decode_rejects_overloaded_segments() {
        let instance = ring_instance(7);
        assert!(decode(&[1, 2, 3, 4], &instance).is_none());
    }

    #[test]
    fn decode_rejects_unreachable_legs() {
        let mut instance = ring_instance(14);
        instance.matrix_mut().set(1, 2, f64::INFINITY);
        assert!(decode(&[1, 2, 0, 3, 4], &instance).is_none());
    }

    #[test]
    fn decode_ignores_empty_segments() {
        let instance = ring_instance(14);
        let solution = decode(&[0, 1, 2, 0, 0, 3, 4, 0], &instance).unwrap();
        assert_eq!(solution.routes, vec![vec![1, 2], vec![3, 4]]);
    }

    #[test]
    fn never_returns_worse_than_the_input() {
        let instance = ring_instance(7);
        let initial = savings::solve(&instance).unwrap();
        let initial_cost = initial.total_cost;
        let improved = improve(&instance, initial, &AnnealingConfig::default());
        assert!(improved.total_cost <= initial_cost);
        assert!(improved.is_feasible(&instance));
    }

    #[test]
    fn same_seed_means_same_answer() {
        let instance = ring_instance(9);
        let config = AnnealingConfig {
            seed: 7,
            ..AnnealingConfig::default()
        };
        let first = improve(&instance, savings::solve(&instance).unwrap(), &config);
        let second = improve(&instance, savings::solve(&instance).unwrap(), &config);
        assert_eq!(first, second);
    }

    #[test]
    fn single_stop_tours_are_returned_untouched() {
        let mut instance = crate::cvrp::CvrpInstance::from_json_str(
            r#"{
                "name": "solo",
                "origin": {"lat": 0.0, "lng": 0.0},
                "vehicle_capacity": 5,
                "deliveries": [
                    {"id": "only", "point": {"lat": 0.1, "lng": 0.0}, "size": 1}
                ]
            }"#,
        )
        .unwrap();
        instance.matrix_mut().set(0, 1, 3.0);
        instance.matrix_mut().set(1, 0, 4.0);
        let initial = Solution::from_routes(vec![vec![1]], &instance);
        let improved = improve(&instance, initial.clone(), &AnnealingConfig::default());
        assert_eq!(improved, initial);
    }
}
