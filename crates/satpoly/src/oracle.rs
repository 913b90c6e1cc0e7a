//! Oracle capability boundary.
//!
//! The core consumes two external capabilities purely by contract: a
//! partition-function oracle pricing weighted directions, and a decision
//! oracle answering combinatorial feasibility and furthest-point queries.
//! Wire formats, solver processes, and timeouts all live outside this crate;
//! every call here is one blocking request/response with no implicit retry.

use nalgebra::DVector;
use thiserror::Error;

use crate::hull::Facet;

/// Failures at the oracle boundary. Always locally recoverable: the caller
/// drops the affected probe direction or facet and continues.
#[derive(Error, Debug)]
pub enum OracleError {
    /// External computation failed, timed out, or returned an unparsable
    /// result.
    #[error("oracle call failed: {0}")]
    Call(String),

    /// NaN or infinite partition value; the probe direction must be skipped.
    #[error("degenerate partition value {0}")]
    Degenerate(f64),
}

/// Relation of one satisfaction-count constraint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Relation {
    Le,
    Ge,
    Eq,
}

/// Objective sense for a decision query.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sense {
    Minimize,
    Maximize,
}

/// One per-formula satisfaction-count constraint.
#[derive(Clone, Debug)]
pub struct CountConstraint {
    pub formula: usize,
    pub bound: i64,
    pub relation: Relation,
}

/// Outcome of a feasibility/optimization query. Infeasibility is a valid
/// negative answer, not an error.
#[derive(Clone, Debug)]
pub enum Feasibility {
    /// A consistent assignment exists; the witness is the optimal
    /// satisfaction-count vector under the requested objective.
    Feasible(DVector<i64>),
    Infeasible,
}

impl Feasibility {
    #[inline]
    pub fn is_feasible(&self) -> bool {
        matches!(self, Feasibility::Feasible(_))
    }
}

/// Answer to a furthest-point query against one hull facet.
#[derive(Clone, Debug)]
pub struct FurthestPoint {
    /// Feasible lattice point strictly outside the facet, if any.
    pub point: Option<DVector<i64>>,
    /// Euclidean distance of that point from the facet hyperplane.
    pub distance: f64,
}

/// Weighted model counting capability.
pub trait PartitionOracle {
    /// Natural logarithm of the weighted model count under the given
    /// per-formula weights. The domain size and formula set are fixed when
    /// the oracle is constructed.
    fn log_partition(&mut self, weights: &[f64]) -> Result<f64, OracleError>;
}

/// Combinatorial feasibility capability over possible worlds.
pub trait DecisionOracle {
    /// Feasibility of the count constraints; when feasible, the returned
    /// witness optimizes the named formula's count in the given sense.
    fn solve_linear_objective(
        &mut self,
        constraints: &[CountConstraint],
        objective: usize,
        sense: Sense,
    ) -> Result<Feasibility, OracleError>;

    /// Feasible lattice point inside the box strictly outside `facet`,
    /// maximizing distance to its hyperplane.
    fn furthest_feasible_point(
        &mut self,
        facet: &Facet,
        limits: &[i64],
    ) -> Result<FurthestPoint, OracleError>;
}
