//! Admissible-region geometry for weighted-formula satisfaction counts.
//!
//! Each axis of the count box is one weighted formula; a lattice point is a
//! vector of per-formula satisfaction counts. The admissible region is the
//! convex set of counts some possible world realizes, and this crate
//! approximates it from both sides:
//! - outer: half-spaces priced with a partition-function oracle
//!   ([`outer::OuterSolver`] accumulating into [`hrep::HRep`]), seeded by
//!   the direction enumerators in [`enumerate`];
//! - inner: incremental hull growth around feasible lattice points
//!   confirmed by a decision oracle ([`engine::HullGrowthEngine`] over
//!   [`hull::PointHull`]).
//!
//! The oracles are consumed by contract only ([`oracle`]); formula parsing,
//! solver processes, and plotting live outside this crate.

pub mod boxgraph;
pub mod engine;
pub mod enumerate;
pub mod error;
pub mod hrep;
pub mod hull;
pub mod lattice;
pub mod oracle;
pub mod outer;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Per-formula satisfaction-count limits over a domain of `domain_size`
/// elements: `n^k` for a formula with `k` distinct variables, or the falling
/// factorial `n (n-1) .. (n-k+1)` when variable bindings must be pairwise
/// distinct.
pub fn limits_from_arities(domain_size: i64, arities: &[usize], reflexive: bool) -> Vec<i64> {
    arities
        .iter()
        .map(|&k| {
            if reflexive {
                domain_size.pow(k as u32)
            } else {
                (domain_size - k as i64 + 1..=domain_size).product()
            }
        })
        .collect()
}

/// Common exports for quick imports in callers.
pub mod prelude {
    pub use crate::boxgraph::{BoxGraph, BoxVertex};
    pub use crate::engine::{GrowthCfg, GrowthError, HullGrowthEngine, Phase};
    pub use crate::enumerate::{PointEnumerator, Strategy};
    pub use crate::error::GeomError;
    pub use crate::hrep::HRep;
    pub use crate::hull::{Facet, PointHull};
    pub use crate::lattice::{affinely_independent, normal_vector, primitivize};
    pub use crate::limits_from_arities;
    pub use crate::oracle::{
        CountConstraint, DecisionOracle, Feasibility, FurthestPoint, OracleError,
        PartitionOracle, Relation, Sense,
    };
    pub use crate::outer::{OuterCfg, OuterSolver};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limits_follow_formula_arity() {
        assert_eq!(limits_from_arities(3, &[1, 2, 0], true), vec![3, 9, 1]);
        // Distinct bindings: 3 * 2 pairs instead of 9.
        assert_eq!(limits_from_arities(3, &[1, 2, 0], false), vec![3, 6, 1]);
    }
}
