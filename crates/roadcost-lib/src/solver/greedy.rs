//! Nearest-feasible-neighbor route construction.

use tracing::debug;

use crate::cvrp::CvrpInstance;
use crate::error::Result;
use crate::solver::{validate_instance, Solution};

/// Build routes one vehicle at a time. Each vehicle starts at the depot on
/// the closest unserved delivery, then repeatedly drives to the nearest
/// unserved delivery that still fits and is reachable; when none qualifies
/// it returns to the depot and the next vehicle starts.
pub fn solve(instance: &CvrpInstance) -> Result<Solution> {
    validate_instance(instance)?;
    let mut unserved = instance.deliveries_by_distance();
    let mut routes: Vec<Vec<usize>> = Vec::new();

    while !unserved.is_empty() {
        // validation guarantees the closest remaining delivery fits a
        // fresh vehicle, so every outer pass serves at least one stop
        let first = unserved.remove(0);
        let mut route = vec![first];
        let mut load = instance.delivery_size(first);
        let mut position = first;

        while let Some(slot) = nearest_feasible(instance, &unserved, position, load) {
            let next = unserved.remove(slot);
            load += instance.delivery_size(next);
            route.push(next);
            position = next;
        }
        routes.push(route);
    }

    let solution = Solution::from_routes(routes, instance);
    debug!(
        vehicles = solution.vehicle_count(),
        cost = solution.total_cost,
        "greedy construction finished"
    );
    Ok(solution)
}

fn nearest_feasible(
    instance: &CvrpInstance,
    unserved: &[usize],
    position: usize,
    load: u32,
) -> Option<usize> {
    let capacity = instance.vehicle_capacity();
    let mut best: Option<(usize, f64)> = None;
    for (slot, &candidate) in unserved.iter().enumerate() {
        if load + instance.delivery_size(candidate) > capacity {
            continue;
        }
        let distance = instance.distance(position, candidate);
        if !distance.is_finite() {
            continue;
        }
        if best.map_or(true, |(_, best_distance)| distance < best_distance) {
            best = Some((slot, distance));
        }
    }
    best.map(|(slot, _)| slot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::solver::tests::ring_instance;

    #[test]
    fn fills_one_vehicle_when_everything_fits() {
        let instance = ring_instance(14);
        let solution = solve(&instance).unwrap();
        assert_eq!(solution.routes, vec![vec![1, 2, 3, 4]]);
        assert_eq!(solution.total_cost, 42.0);
    }

    #[test]
    fn opens_a_new_vehicle_when_capacity_runs_out() {
        let instance = ring_instance(7);
        let solution = solve(&instance).unwrap();
        assert!(solution.is_feasible(&instance));
        assert!(solution.vehicle_count() >= 2);
        // first vehicle starts on the closest delivery and walks the ring
        assert_eq!(solution.routes[0], vec![1, 2]);
    }

    #[test]
    fn detours_around_an_unreachable_leg() {
        let mut instance = ring_instance(14);
        // 1 -> 2 becomes impossible mid-route; the vehicle must jump
        instance.matrix_mut().set(1, 2, f64::INFINITY);
        let solution = solve(&instance).unwrap();
        assert!(solution.is_feasible(&instance));
    }

    #[test]
    fn reports_a_delivery_cut_off_from_the_depot() {
        let mut instance = ring_instance(14);
        instance.matrix_mut().set(0, 2, f64::INFINITY);
        assert!(matches!(
            solve(&instance),
            Err(Error::UnreachableDelivery { index: 2 })
        ));
    }

    #[test]
    fn single_delivery_instance_gets_a_single_route() {
        let mut instance = crate::cvrp::CvrpInstance::from_json_str(
            r#"{
                "name": "solo",
                "origin": {"lat": 0.0, "lng": 0.0},
                "vehicle_capacity": 5,
                "deliveries": [
                    {"id": "only", "point": {"lat": 0.1, "lng": 0.0}, "size": 5}
                ]
            }"#,
        )
        .unwrap();
        instance.matrix_mut().set(0, 1, 3.0);
        instance.matrix_mut().set(1, 0, 4.0);
        let solution = solve(&instance).unwrap();
        assert_eq!(solution.routes, vec![vec![1]]);
        assert_eq!(solution.total_cost, 7.0);
    }
}
