//! Route optimizers for capacitated delivery instances.
//!
//! All three solvers consume a frozen cost matrix and never touch the road
//! network. Routes hold delivery matrix indices only; the depot bracket is
//! implicit and priced by [`CvrpInstance::route_cost`]. Which solver runs is
//! entirely the caller's choice via [`SolverKind`].

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::cvrp::CvrpInstance;
use crate::error::{Error, Result};

pub mod annealing;
pub mod greedy;
pub mod savings;

pub use annealing::AnnealingConfig;

/// One complete set of vehicle routes with its total cost in meters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Solution {
    /// One vector of delivery matrix indices per vehicle, in visit order.
    pub routes: Vec<Vec<usize>>,
    /// Sum of every route's cost, including depot legs.
    pub total_cost: f64,
}

impl Solution {
    /// Price `routes` against the instance's matrix.
    pub fn from_routes(routes: Vec<Vec<usize>>, instance: &CvrpInstance) -> Self {
        let total_cost = routes.iter().map(|route| instance.route_cost(route)).sum();
        Self { routes, total_cost }
    }

    pub fn vehicle_count(&self) -> usize {
        self.routes.len()
    }

    /// True when every delivery is served exactly once, no route exceeds the
    /// vehicle capacity, and every leg is reachable.
    pub fn is_feasible(&self, instance: &CvrpInstance) -> bool {
        let mut served = vec![false; instance.location_count()];
        for route in &self.routes {
            if instance.route_demand(route) > instance.vehicle_capacity() {
                return false;
            }
            for &stop in route {
                if stop == 0 || stop >= instance.location_count() || served[stop] {
                    return false;
                }
                served[stop] = true;
            }
        }
        served.iter().skip(1).all(|&s| s) && self.total_cost.is_finite()
    }
}

/// Selects the optimizer for a solve call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SolverKind {
    /// Nearest-feasible-neighbor construction.
    Greedy,
    /// Clarke-Wright savings merges.
    #[default]
    Savings,
    /// Simulated annealing over a savings starting point.
    Annealing,
}

impl fmt::Display for SolverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolverKind::Greedy => write!(f, "greedy"),
            SolverKind::Savings => write!(f, "savings"),
            SolverKind::Annealing => write!(f, "annealing"),
        }
    }
}

impl FromStr for SolverKind {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "greedy" => Ok(SolverKind::Greedy),
            "savings" => Ok(SolverKind::Savings),
            "annealing" => Ok(SolverKind::Annealing),
            other => Err(format!(
                "unknown solver '{other}', expected 'greedy', 'savings' or 'annealing'"
            )),
        }
    }
}

/// Run the selected solver against a fully built instance.
pub fn solve(
    instance: &CvrpInstance,
    kind: SolverKind,
    annealing: &AnnealingConfig,
) -> Result<Solution> {
    match kind {
        SolverKind::Greedy => greedy::solve(instance),
        SolverKind::Savings => savings::solve(instance),
        SolverKind::Annealing => {
            let initial = savings::solve(instance)?;
            Ok(annealing::improve(instance, initial, annealing))
        }
    }
}

/// Every solver needs each delivery to fit an empty vehicle and to have
/// finite depot legs in both directions; anything else has no feasible
/// solution in this model.
pub(crate) fn validate_instance(instance: &CvrpInstance) -> Result<()> {
    let capacity = instance.vehicle_capacity();
    for index in 1..=instance.deliveries().len() {
        if instance.delivery_size(index) > capacity {
            return Err(Error::DeliveryTooLarge { index });
        }
        if !instance.distance(0, index).is_finite() || !instance.distance(index, 0).is_finite() {
            return Err(Error::UnreachableDelivery { index });
        }
    }
    Ok(())
}
