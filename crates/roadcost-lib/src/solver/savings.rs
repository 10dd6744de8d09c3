//! Clarke-Wright savings construction.
//!
//! Starts with one singleton route per delivery and greedily applies the
//! largest savings first. The matrix is directed, so a merge only joins the
//! tail of one route to the head of another; routes are never reversed.

use tracing::debug;

use crate::cvrp::CvrpInstance;
use crate::error::Result;
use crate::solver::{validate_instance, Solution};

/// Solve by savings merges: s(i, j) = d(i, 0) + d(0, j) - d(i, j), applied
/// in descending order while capacity allows. Pairs with an unreachable
/// direct leg or a negative savings are never merged.
pub fn solve(instance: &CvrpInstance) -> Result<Solution> {
    validate_instance(instance)?;
    let n = instance.deliveries().len();

    let mut savings: Vec<(f64, usize, usize)> = Vec::with_capacity(n.saturating_mul(n));
    for i in 1..=n {
        for j in 1..=n {
            if i == j {
                continue;
            }
            let direct = instance.distance(i, j);
            if !direct.is_finite() {
                continue;
            }
            let saving = instance.distance(i, 0) + instance.distance(0, j) - direct;
            savings.push((saving, i, j));
        }
    }
    savings.sort_by(|a, b| b.0.total_cmp(&a.0));

    // routes indexed by route id; each delivery starts alone. route_of maps
    // a delivery index to the id of the route currently holding it.
    let mut routes: Vec<Vec<usize>> = (0..=n)
        .map(|i| if i == 0 { vec![] } else { vec![i] })
        .collect();
    let mut demands: Vec<u32> = (0..=n)
        .map(|i| if i == 0 { 0 } else { instance.delivery_size(i) })
        .collect();
    let mut route_of: Vec<usize> = (0..=n).collect();
    let capacity = instance.vehicle_capacity();

    for (saving, i, j) in savings {
        if saving < 0.0 {
            break;
        }
        let from = route_of[i];
        let to = route_of[j];
        if from == to {
            continue;
        }
        // i must end its route and j must start its own
        if routes[from].last() != Some(&i) || routes[to].first() != Some(&j) {
            continue;
        }
        if demands[from] + demands[to] > capacity {
            continue;
        }
        let absorbed = std::mem::take(&mut routes[to]);
        for &stop in &absorbed {
            route_of[stop] = from;
        }
        routes[from].extend(absorbed);
        demands[from] += demands[to];
        demands[to] = 0;
    }

    let merged: Vec<Vec<usize>> = routes
        .into_iter()
        .filter(|route| !route.is_empty())
        .collect();
    let solution = Solution::from_routes(merged, instance);
    debug!(
        vehicles = solution.vehicle_count(),
        cost = solution.total_cost,
        "savings construction finished"
    );
    Ok(solution)
}
