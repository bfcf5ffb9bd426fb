// Copyright (c) 2025 Junior Sundar
//
// SPDX-License-Identifier: BSD-3-Clause

use rand::Rng;

use crate::base::{error::StateSamplingError, space::StateSpace, state::State};

/// The pluggable cost functional a planner optimizes against.
///
/// An `OptimizationObjective` decouples "what does a path cost" from the planner that grows the
/// tree. A planner never inspects a `Cost` value directly beyond what this trait exposes: it adds
/// costs together with `combine_costs`, compares them with `is_cost_better_than`, and asks
/// whether a cost is good enough with `is_satisfied`. This keeps the planner core correct for any
/// cost representation, not just `f64` path length, as long as the implementor's
/// `is_cost_better_than` defines a strict weak order.
pub trait OptimizationObjective<S: State, SP: StateSpace<StateType = S>> {
    /// The type used to represent cost. Most objectives will use `f64`, but a multi-objective
    /// cost vector or a saturating fixed-point type are equally valid.
    type Cost: Clone;

    /// The cost of occupying a single state, independent of how it was reached.
    fn state_cost(&self, state: &S) -> Self::Cost;

    /// The cost of the edge connecting `from` to `to`.
    fn motion_cost(&self, space: &SP, from: &S, to: &S) -> Self::Cost;

    /// Combines an accumulated cost with an additional edge cost.
    ///
    /// Must be associative: `combine(combine(a, b), c) == combine(a, combine(b, c))`.
    fn combine_costs(&self, a: &Self::Cost, b: &Self::Cost) -> Self::Cost;

    /// The cost of a zero-length path, the identity element of `combine_costs`.
    fn identity_cost(&self) -> Self::Cost;

    /// A cost no real path can exceed, used to seed "best cost so far" accumulators.
    fn infinite_cost(&self) -> Self::Cost;

    /// Returns `true` if `a` is strictly better than `b`.
    ///
    /// Must define a strict weak order over `Self::Cost`; this is the only place the planner
    /// core ever decides "is this cost an improvement".
    fn is_cost_better_than(&self, a: &Self::Cost, b: &Self::Cost) -> bool;

    /// Returns `true` if `cost` is good enough to stop searching for a better solution.
    fn is_satisfied(&self, cost: &Self::Cost) -> bool;

    /// Estimates the average per-state cost by sampling the space uniformly.
    ///
    /// Used to auto-configure heuristic constants (e.g. `k_constant` in the transition test)
    /// when the caller hasn't supplied one explicitly.
    fn average_state_cost(&self, space: &SP, rng: &mut impl Rng, sample_count: usize) -> f64 {
        if sample_count == 0 {
            return 0.0;
        }
        let mut total = 0.0;
        let mut sampled = 0usize;
        for _ in 0..sample_count {
            match space.sample_uniform(rng) {
                Ok(state) => {
                    total += self.cost_value(&self.state_cost(&state));
                    sampled += 1;
                }
                Err(_) => continue,
            }
        }
        if sampled == 0 {
            0.0
        } else {
            total / sampled as f64
        }
    }

    /// Scalarizes a cost to a single `f64`.
    ///
    /// The transition test's Metropolis arithmetic (subtraction, division, `exp`) needs a
    /// real-valued cost regardless of how `Self::Cost` is represented internally; this method is
    /// the seam that provides it. For a scalar cost type this is simply a cast/identity.
    fn cost_value(&self, cost: &Self::Cost) -> f64;

    /// Whether `motion_cost(space, a, b) == motion_cost(space, b, a)` for all `a`, `b`.
    ///
    /// Defaults to `true`. An asymmetric objective (e.g. one that penalizes climbing more than
    /// descending) would override this.
    fn is_symmetric(&self) -> bool {
        true
    }
}

/// The straightforward path-length objective: the cost of a state is always zero, and the cost
/// of an edge is the state space's own distance function. Minimizing this objective is equivalent
/// to the cost functional the teacher's plain `RRTStar` hard-codes, now expressed through
/// `OptimizationObjective` instead of being baked into the planner loop.
pub struct PathLengthObjective;

impl<S: State, SP: StateSpace<StateType = S>> OptimizationObjective<S, SP> for PathLengthObjective {
    type Cost = f64;

    fn state_cost(&self, _state: &S) -> f64 {
        0.0
    }

    fn motion_cost(&self, space: &SP, from: &S, to: &S) -> f64 {
        space.distance(from, to)
    }

    fn combine_costs(&self, a: &f64, b: &f64) -> f64 {
        a + b
    }

    fn identity_cost(&self) -> f64 {
        0.0
    }

    fn infinite_cost(&self) -> f64 {
        f64::INFINITY
    }

    fn is_cost_better_than(&self, a: &f64, b: &f64) -> bool {
        a < b
    }

    fn is_satisfied(&self, _cost: &f64) -> bool {
        // Path length alone has no natural stopping threshold; the planner relies on its
        // termination condition rather than this predicate for PathLengthObjective.
        false
    }

    fn cost_value(&self, cost: &f64) -> f64 {
        *cost
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::{space::RealVectorStateSpace, state::RealVectorState};

    #[test]
    fn path_length_motion_cost_is_euclidean_distance() {
        let space = RealVectorStateSpace::new(2, None).unwrap();
        let objective = PathLengthObjective;
        let a = RealVectorState {
            values: vec![0.0, 0.0],
        };
        let b = RealVectorState {
            values: vec![3.0, 4.0],
        };
        let cost = objective.motion_cost(&space, &a, &b);
        assert!((cost - 5.0).abs() < 1e-9);
    }

    #[test]
    fn combine_costs_is_additive_and_identity_holds() {
        let objective = PathLengthObjective;
        let id = objective.identity_cost();
        assert_eq!(objective.combine_costs(&id, &2.5), 2.5);
        assert_eq!(objective.combine_costs(&1.0, &2.0), 3.0);
    }

    #[test]
    fn is_cost_better_than_is_strict_less_than() {
        let objective = PathLengthObjective;
        assert!(objective.is_cost_better_than(&1.0, &2.0));
        assert!(!objective.is_cost_better_than(&2.0, &2.0));
        assert!(!objective.is_cost_better_than(&3.0, &2.0));
    }
}
