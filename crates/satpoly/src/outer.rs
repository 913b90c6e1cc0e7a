//! Cutting-plane construction of the outer approximation.
//!
//! Walks the enumerator's candidate normals, prices each direction (and its
//! negation) with the partition-function oracle, turns the log partition
//! value into an integer-tight offset, and folds constraint batches into the
//! reduced H-representation. A failed or degenerate probe is skipped; the
//! accepted system is never corrupted by a skipped direction.

use std::collections::HashSet;

use log::{debug, warn};
use nalgebra::DVector;

use crate::enumerate::PointEnumerator;
use crate::hrep::HRep;
use crate::oracle::{OracleError, PartitionOracle};

#[derive(Clone, Copy, Debug)]
pub struct OuterCfg {
    /// Fractional-part tolerance: offsets with `frac(b) <= tolerance` round
    /// down instead of up. Zero keeps the strict ceiling.
    pub tolerance: f64,
    /// Constraints accumulated between reduction passes.
    pub batch_size: usize,
}

impl Default for OuterCfg {
    fn default() -> Self {
        Self { tolerance: 0.0, batch_size: 10 }
    }
}

/// Outer-approximation solver over a partition-function oracle.
pub struct OuterSolver<O> {
    limits: Vec<i64>,
    omega_log: f64,
    enumerator: PointEnumerator,
    oracle: O,
    cfg: OuterCfg,
    hrep: HRep,
}

impl<O: PartitionOracle> OuterSolver<O> {
    pub fn new(enumerator: PointEnumerator, oracle: O, cfg: OuterCfg) -> Self {
        let limits = enumerator.limits().to_vec();
        let omega_log = limits.iter().map(|&l| (l as f64).ln()).sum();
        let hrep = HRep::from_box(&limits);
        Self { limits, omega_log, enumerator, oracle, cfg, hrep }
    }

    #[inline]
    pub fn omega_log(&self) -> f64 {
        self.omega_log
    }

    #[inline]
    pub fn limits(&self) -> &[i64] {
        &self.limits
    }

    #[inline]
    pub fn hrep(&self) -> &HRep {
        &self.hrep
    }

    #[inline]
    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    pub fn into_hrep(self) -> HRep {
        self.hrep
    }

    /// Probe every inequivalent direction once and return the reduced
    /// system. Skipped probes leave a completed-but-partial approximation.
    pub fn solve(&mut self) -> &HRep {
        let mut seen: HashSet<Vec<i64>> = HashSet::new();
        let mut batch: Vec<(DVector<i64>, i64)> = Vec::new();
        let enumerator = self.enumerator.clone();
        for normal in enumerator.normals() {
            let key: Vec<i64> = normal.iter().copied().collect();
            if !seen.insert(key) {
                continue;
            }
            seen.insert(normal.iter().map(|&x| -x).collect());
            for signed in [normal.clone(), -normal] {
                let Some(z) = self.probe(&signed) else { continue };
                let offset =
                    offset_from_log_partition(z, self.omega_log, self.cfg.tolerance);
                batch.push((signed, offset));
            }
            if batch.len() > self.cfg.batch_size {
                debug!("folding {} constraints into the outer system", batch.len());
                self.hrep.add_rows(&batch);
                self.hrep.reduce();
                batch.clear();
            }
        }
        self.hrep.add_rows(&batch);
        self.hrep.reduce();
        &self.hrep
    }

    /// One partition-oracle call for a signed direction; `None` skips it.
    fn probe(&mut self, normal: &DVector<i64>) -> Option<f64> {
        let weights: Vec<f64> = normal
            .iter()
            .map(|&n| 2.0 * n as f64 * self.omega_log)
            .collect();
        match self.oracle.log_partition(&weights) {
            Ok(z) if z.is_finite() => Some(z),
            Ok(z) => {
                warn!("degenerate partition value {z} for direction {normal:?}; probe skipped");
                None
            }
            Err(OracleError::Degenerate(z)) => {
                warn!("degenerate partition value {z} for direction {normal:?}; probe skipped");
                None
            }
            Err(err) => {
                warn!("partition oracle failed for direction {normal:?}: {err}; probe skipped");
                None
            }
        }
    }
}

/// Offset policy: `b = z / (2 omega) - 1/2`, rounded up unless its
/// fractional part sits within the configured tolerance. Trades a small
/// feasibility slack for stability against oracle noise.
fn offset_from_log_partition(z: f64, omega_log: f64, tolerance: f64) -> i64 {
    let b = 0.5 * z / omega_log - 0.5;
    let rounded = if tolerance == 0.0 || b - b.floor() > tolerance {
        b.ceil()
    } else {
        b.floor()
    };
    rounded as i64
}
