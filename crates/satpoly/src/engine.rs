//! Incremental hull growth driven by the decision oracle.
//!
//! Phases
//! - Seeding: classify box corners by feasibility; when the confirmed points
//!   do not span a full-dimensional hull yet, sweep lattice cuts with the
//!   oracle to find more extreme points.
//! - Growing: a work queue of facets; each facet is either pushed outward by
//!   the furthest feasible point beyond it (re-queueing only the facets the
//!   insertion created) or retired as tight.
//! - Converged: empty queue; the hull's points are the vertex representation
//!   of the admissible region to oracle precision.
//!
//! An oracle failure drops the single affected facet or cut and the loop
//! continues; the run is never restarted.

use std::collections::VecDeque;

use log::{debug, info, warn};
use nalgebra::DVector;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

use crate::boxgraph::BoxGraph;
use crate::enumerate::Odometer;
use crate::hull::PointHull;
use crate::oracle::{CountConstraint, DecisionOracle, Feasibility, OracleError, Relation, Sense};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Seeding,
    Growing,
    Converged,
}

#[derive(Clone, Copy, Debug)]
pub struct GrowthCfg {
    /// Minimum outward distance for a furthest-point answer to grow the hull.
    pub distance_eps: f64,
    /// Probability of skipping a seeding cut; zero disables relaxation.
    pub relaxation: f64,
    /// Seed for the relaxation sampling.
    pub seed: u64,
}

impl Default for GrowthCfg {
    fn default() -> Self {
        Self { distance_eps: 1e-6, relaxation: 0.0, seed: 0 }
    }
}

#[derive(Error, Debug)]
pub enum GrowthError {
    /// Seeding found fewer than `d + 1` affinely independent feasible
    /// points, so no full-dimensional hull exists to grow.
    #[error("feasible points do not span a full-dimensional hull")]
    InsufficientPoints,
}

/// State machine growing the inner approximation around feasible points.
pub struct HullGrowthEngine<O> {
    graph: BoxGraph,
    oracle: O,
    cfg: GrowthCfg,
    phase: Phase,
    hull: Option<PointHull>,
    feasible_corners: Vec<usize>,
}

impl<O: DecisionOracle> HullGrowthEngine<O> {
    pub fn new(limits: &[i64], oracle: O, cfg: GrowthCfg) -> Self {
        Self {
            graph: BoxGraph::new(limits),
            oracle,
            cfg,
            phase: Phase::Seeding,
            hull: None,
            feasible_corners: Vec::new(),
        }
    }

    #[inline]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[inline]
    pub fn hull(&self) -> Option<&PointHull> {
        self.hull.as_ref()
    }

    /// Arena indices of box corners confirmed feasible during seeding.
    #[inline]
    pub fn feasible_corners(&self) -> &[usize] {
        &self.feasible_corners
    }

    #[inline]
    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    /// Drive the state machine to convergence.
    pub fn run(&mut self) -> Result<&PointHull, GrowthError> {
        self.seed()?;
        self.grow();
        self.phase = Phase::Converged;
        self.hull.as_ref().ok_or(GrowthError::InsufficientPoints)
    }

    /// Corner classification plus, when needed, the cut sweep.
    fn seed(&mut self) -> Result<(), GrowthError> {
        self.phase = Phase::Seeding;
        let mut points: Vec<DVector<i64>> = Vec::new();
        for ix in 0..self.graph.vertices().len() {
            let corner = self.graph.vertex(ix).position.clone();
            match self.corner_feasible(&corner) {
                Ok(true) => {
                    self.feasible_corners.push(ix);
                    points.push(corner);
                }
                Ok(false) => debug!("corner {corner:?} is infeasible"),
                Err(err) => {
                    warn!("corner query for {corner:?} failed: {err}; treated as infeasible");
                }
            }
        }
        let d = self.graph.dimensions();
        info!("{} of {} corners are feasible", points.len(), self.graph.vertices().len());
        let mut hull = PointHull::from_points(points.clone(), d);
        if hull.is_none() {
            hull = self.cut_sweep(&mut points);
        }
        match hull {
            Some(h) => {
                self.hull = Some(h);
                Ok(())
            }
            None => Err(GrowthError::InsufficientPoints),
        }
    }

    /// One feasibility query pinning every coordinate of a corner.
    fn corner_feasible(&mut self, corner: &DVector<i64>) -> Result<bool, OracleError> {
        let constraints: Vec<CountConstraint> = corner
            .iter()
            .enumerate()
            .map(|(i, &v)| CountConstraint { formula: i, bound: v, relation: Relation::Eq })
            .collect();
        Ok(self
            .oracle
            .solve_linear_objective(&constraints, 0, Sense::Minimize)?
            .is_feasible())
    }

    /// Sweep lattice cuts, minimizing then maximizing the trailing axis per
    /// cut, until the collected points span a full-dimensional hull.
    ///
    /// Axes are ordered by ascending limit so the sweep space is as small as
    /// possible; the largest axis is the optimized one.
    fn cut_sweep(&mut self, points: &mut Vec<DVector<i64>>) -> Option<PointHull> {
        let d = self.graph.dimensions();
        let limits = self.graph.limits().to_vec();
        let mut order: Vec<usize> = (0..d).collect();
        order.sort_by_key(|&i| limits[i]);
        let trailing = order[d - 1];
        let lead = &order[..d - 1];
        let windows: Vec<(i64, i64)> = lead.iter().map(|&i| (0, limits[i])).collect();
        let mut rng = StdRng::seed_from_u64(self.cfg.seed);

        for cut in Odometer::new(&windows) {
            if self.cfg.relaxation > 0.0 && rng.gen::<f64>() < self.cfg.relaxation {
                debug!("relaxation skipped cut {cut:?}");
                continue;
            }
            let mut constraints: Vec<CountConstraint> = lead
                .iter()
                .zip(cut.iter())
                .map(|(&axis, &v)| CountConstraint {
                    formula: axis,
                    bound: v,
                    relation: Relation::Eq,
                })
                .collect();
            constraints.push(CountConstraint {
                formula: trailing,
                bound: 0,
                relation: Relation::Ge,
            });
            let floor = match self.oracle.solve_linear_objective(
                &constraints,
                trailing,
                Sense::Minimize,
            ) {
                Ok(f) => f,
                Err(err) => {
                    warn!("cut {cut:?} minimize failed: {err}; cut skipped");
                    continue;
                }
            };
            let Feasibility::Feasible(low) = floor else { continue };
            let tail = constraints.len() - 1;
            constraints[tail].bound = low[trailing];
            push_new_point(points, low);
            match self.oracle.solve_linear_objective(&constraints, trailing, Sense::Maximize) {
                Ok(Feasibility::Feasible(high)) => push_new_point(points, high),
                Ok(Feasibility::Infeasible) => {}
                Err(err) => warn!("cut {cut:?} maximize failed: {err}; half skipped"),
            }
            if points.len() > d {
                if let Some(h) = PointHull::from_points(points.clone(), d) {
                    debug!("initial hull found after sweeping to cut {cut:?}");
                    return Some(h);
                }
            }
        }
        None
    }

    /// Queue-driven facet refinement. Only facets created by the most recent
    /// insertion are re-examined, which keeps the growth incremental.
    fn grow(&mut self) {
        self.phase = Phase::Growing;
        let Some(hull) = self.hull.as_mut() else { return };
        let limits = self.graph.limits().to_vec();
        let mut queue: VecDeque<_> = hull.facets().iter().cloned().collect();
        let mut grown = 0usize;
        while let Some(facet) = queue.pop_front() {
            let answer = match self.oracle.furthest_feasible_point(&facet, &limits) {
                Ok(a) => a,
                Err(err) => {
                    warn!("furthest-point query failed: {err}; facet dropped");
                    continue;
                }
            };
            match answer.point {
                Some(p) if answer.distance > self.cfg.distance_eps => {
                    let fresh = hull.add_point(p);
                    grown += 1;
                    debug!(
                        "hull grew to {} points; {} new facets queued (distance {:.3e})",
                        hull.points().len(),
                        fresh.len(),
                        answer.distance
                    );
                    queue.extend(fresh);
                }
                _ => {} // tight or infeasible: facet retired
            }
        }
        info!(
            "hull growth converged after {grown} insertions; {} points, {} facets",
            hull.points().len(),
            hull.facets().len()
        );
    }
}

fn push_new_point(points: &mut Vec<DVector<i64>>, p: DVector<i64>) {
    if !points.contains(&p) {
        points.push(p);
    }
}
