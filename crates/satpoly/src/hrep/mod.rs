//! Outer approximation as a mutable H-representation `A x <= b`.
//!
//! Purpose
//! - Accumulate the half-space constraints discovered during a solve,
//!   starting from the bounding box itself.
//! - Keep the system minimal: `reduce` drops any row already implied by the
//!   rest, via one small LP per row.
//!
//! `reduce` is idempotent and safe to call whenever the row set is
//! well-formed; batching constraints between calls is purely an optimization.

mod simplex;

#[cfg(test)]
mod tests;

use log::debug;
use nalgebra::{DMatrix, DVector};

use simplex::{maximize, LpOutcome};

/// Slack when comparing an LP optimum against a row's bound.
const REDUCE_EPS: f64 = 1e-7;

/// Half-space system `A x <= b`.
#[derive(Clone, Debug)]
pub struct HRep {
    pub a: DMatrix<f64>,
    pub b: DVector<f64>,
}

impl HRep {
    /// The bounding box itself: `x_i <= limit_i` and `-x_i <= 0` per axis.
    pub fn from_box(limits: &[i64]) -> Self {
        let d = limits.len();
        let mut a = DMatrix::zeros(2 * d, d);
        let mut b = DVector::zeros(2 * d);
        for i in 0..d {
            a[(i, i)] = 1.0;
            b[i] = limits[i] as f64;
            a[(d + i, i)] = -1.0;
        }
        Self { a, b }
    }

    #[inline]
    pub fn dimensions(&self) -> usize {
        self.a.ncols()
    }

    #[inline]
    pub fn num_rows(&self) -> usize {
        self.a.nrows()
    }

    /// Stack a batch of integer rows onto the system.
    pub fn add_rows(&mut self, rows: &[(DVector<i64>, i64)]) {
        if rows.is_empty() {
            return;
        }
        let d = self.dimensions();
        let old = self.num_rows();
        let a = std::mem::replace(&mut self.a, DMatrix::zeros(0, 0));
        let b = std::mem::replace(&mut self.b, DVector::zeros(0));
        let mut a = a.resize_vertically(old + rows.len(), 0.0);
        let mut b = b.resize_vertically(old + rows.len(), 0.0);
        for (k, (normal, offset)) in rows.iter().enumerate() {
            for c in 0..d {
                a[(old + k, c)] = normal[c] as f64;
            }
            b[old + k] = *offset as f64;
        }
        self.a = a;
        self.b = b;
    }

    /// Membership with slack `eps`.
    pub fn contains(&self, x: &DVector<f64>, eps: f64) -> bool {
        let lhs = &self.a * x;
        lhs.iter().zip(self.b.iter()).all(|(&ax, &bi)| ax <= bi + eps)
    }

    /// Drop every row implied by the remaining rows.
    ///
    /// A row is redundant when maximizing its normal subject to the system
    /// without it already satisfies its bound. Unbounded or infeasible
    /// relaxations keep the row. Idempotent.
    pub fn reduce(&mut self) {
        let mut keep: Vec<usize> = (0..self.num_rows()).collect();
        let mut i = 0;
        while i < keep.len() {
            if keep.len() == 1 {
                break;
            }
            let row_ix = keep[i];
            let others: Vec<usize> =
                keep.iter().copied().filter(|&r| r != row_ix).collect();
            let sub_a = self.a.select_rows(others.iter());
            let sub_b = self.b.select_rows(others.iter());
            let c = self.a.row(row_ix).transpose();
            match maximize(&c, &sub_a, &sub_b) {
                LpOutcome::Optimal { value, .. } if value <= self.b[row_ix] + REDUCE_EPS => {
                    keep.remove(i);
                }
                _ => i += 1,
            }
        }
        if keep.len() != self.num_rows() {
            debug!("reduce dropped {} of {} rows", self.num_rows() - keep.len(), self.num_rows());
            self.a = self.a.select_rows(keep.iter());
            self.b = self.b.select_rows(keep.iter());
        }
    }

    /// Per-axis extent of the feasible region, or `None` when the region is
    /// empty or unbounded along some axis.
    pub fn bounding_box(&self) -> Option<(DVector<f64>, DVector<f64>)> {
        let d = self.dimensions();
        let mut lo = DVector::zeros(d);
        let mut hi = DVector::zeros(d);
        for i in 0..d {
            let mut c = DVector::zeros(d);
            c[i] = 1.0;
            match maximize(&c, &self.a, &self.b) {
                LpOutcome::Optimal { value, .. } => hi[i] = value,
                _ => return None,
            }
            c[i] = -1.0;
            match maximize(&c, &self.a, &self.b) {
                LpOutcome::Optimal { value, .. } => lo[i] = -value,
                _ => return None,
            }
        }
        Some((lo, hi))
    }
}
