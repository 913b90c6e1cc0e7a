//! Shape and dimensionality errors for the geometric core.
//!
//! These indicate a programming or input-limit mismatch: the affected call
//! aborts and is never retried. Recoverable failures at the oracle boundary
//! live in `crate::oracle` instead.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GeomError {
    /// Input does not match the `(d-1) x d` point-matrix contract (d >= 2).
    #[error("expected a (d-1) x d point matrix with d >= 2, got {rows} x {cols}")]
    Dimension { rows: usize, cols: usize },

    /// Enumerator constructed outside the dimensionality it supports.
    #[error("enumerator supports dimension {supported}, got {got}")]
    UnsupportedDimension { supported: usize, got: usize },
}
