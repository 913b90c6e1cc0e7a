//! Candidate separating-direction enumeration over the count box.
//!
//! Purpose
//! - Produce lazy, finite, restartable streams of `(d-1) x d` direction
//!   matrices; each matrix goes through `lattice::normal_vector` to become a
//!   half-space normal candidate.
//! - One tagged type covers the closed set of strategies; selection is a
//!   constructor argument, not a trait object.
//!
//! Strategies
//! - `Exhaustive`: all d-combinations of flattened box indices, mixed-radix
//!   unranking, independence filter. Complete, combinatorial cost.
//! - `Directional`: depth-first direction construction with shrinking
//!   per-axis windows and rank pruning. Much cheaper for large limits.
//! - `Centered`: corner-reflected combinations. Correct in 2D only; kept as
//!   an experimental comparison strategy, not a default.
//! - `Planar2d`: exhaustive 2D direction scan, `d == 2` required.

mod directional;


use nalgebra::{DMatrix, DVector};

use crate::error::GeomError;
use crate::lattice::{affinely_independent, normal_vector, primitivize};
use directional::DirectionalIter;

pub(crate) use directional::Odometer;

/// Enumeration strategy tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Strategy {
    Exhaustive,
    Directional,
    Centered,
    Planar2d,
}

/// Direction-set enumerator over the box `[0, limit_i]` per axis.
#[derive(Clone, Debug)]
pub struct PointEnumerator {
    limits: Vec<i64>,
    divisors: Vec<i64>,
    strategy: Strategy,
}

impl PointEnumerator {
    pub fn new(strategy: Strategy, limits: Vec<i64>) -> Result<Self, GeomError> {
        let d = limits.len();
        if d < 2 {
            return Err(GeomError::UnsupportedDimension { supported: 2, got: d });
        }
        if strategy == Strategy::Planar2d && d != 2 {
            return Err(GeomError::UnsupportedDimension { supported: 2, got: d });
        }
        let divisors = calculate_divisors(&limits);
        Ok(Self { limits, divisors, strategy })
    }

    #[inline]
    pub fn dimensions(&self) -> usize {
        self.limits.len()
    }

    #[inline]
    pub fn limits(&self) -> &[i64] {
        &self.limits
    }

    #[inline]
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Flattened index space size: one slot per lattice point of the box.
    #[inline]
    fn flat_size(&self) -> i64 {
        self.limits.iter().map(|&l| l + 1).product()
    }

    /// Decode a flattened index into a lattice point (mixed radix, most
    /// significant axis first in the divisor table).
    fn unrank(&self, mut index: i64) -> DVector<f64> {
        let d = self.limits.len();
        let mut out = DVector::zeros(d);
        for (dim, &div) in self.divisors.iter().enumerate() {
            out[d - 1 - dim] = (index / div) as f64;
            index %= div;
        }
        out
    }

    /// Fresh pass over all direction sets of the configured strategy.
    pub fn point_sets(&self) -> PointSets<'_> {
        match self.strategy {
            Strategy::Exhaustive => PointSets::Exhaustive(ExhaustiveIter {
                en: self,
                combos: Combinations::new(self.flat_size() as usize, self.dimensions()),
            }),
            Strategy::Directional => PointSets::Directional(DirectionalIter::new(self)),
            Strategy::Centered => PointSets::Centered(CenteredIter::new(self)),
            Strategy::Planar2d => PointSets::Planar2d(PlanarIter { en: self, x: 0, y: 0, mirror: None }),
        }
    }

    /// Primitive integer normals of all direction sets, in stream order.
    /// Parallel duplicates are not removed here; callers dedup by equality.
    pub fn normals(&self) -> impl Iterator<Item = DVector<i64>> + '_ {
        self.point_sets()
            .filter_map(|m| normal_vector(&m).ok())
            .map(|n| primitivize(&n))
    }
}

fn calculate_divisors(limits: &[i64]) -> Vec<i64> {
    let mut out = vec![1i64];
    for &l in &limits[..limits.len() - 1] {
        let last = *out.last().unwrap_or(&1);
        out.push(last * (l + 1));
    }
    out.reverse();
    out
}

/// Lazy stream of direction matrices for one strategy.
pub enum PointSets<'a> {
    Exhaustive(ExhaustiveIter<'a>),
    Directional(DirectionalIter<'a>),
    Centered(CenteredIter<'a>),
    Planar2d(PlanarIter<'a>),
}

impl Iterator for PointSets<'_> {
    type Item = DMatrix<f64>;

    fn next(&mut self) -> Option<DMatrix<f64>> {
        match self {
            PointSets::Exhaustive(it) => it.next(),
            PointSets::Directional(it) => it.next(),
            PointSets::Centered(it) => it.next(),
            PointSets::Planar2d(it) => it.next(),
        }
    }
}

/// All d-combinations of flattened lattice indices, independence-filtered.
pub struct ExhaustiveIter<'a> {
    en: &'a PointEnumerator,
    combos: Combinations,
}

impl Iterator for ExhaustiveIter<'_> {
    type Item = DMatrix<f64>;

    fn next(&mut self) -> Option<DMatrix<f64>> {
        let d = self.en.dimensions();
        for combo in self.combos.by_ref() {
            let mut pts = DMatrix::zeros(d, d);
            for (r, &ci) in combo.iter().enumerate() {
                pts.set_row(r, &self.en.unrank(ci as i64).transpose());
            }
            let (diff, ok) = affinely_independent(&pts);
            if ok {
                return Some(diff);
            }
        }
        None
    }
}

/// Corner-reflected combinations: the seed corner is row 0 and the remaining
/// rows are unranked points mirrored through it by a per-axis sign vector.
pub struct CenteredIter<'a> {
    en: &'a PointEnumerator,
    corner: usize,
    combos: Combinations,
}

impl<'a> CenteredIter<'a> {
    fn new(en: &'a PointEnumerator) -> Self {
        let d = en.dimensions();
        let inner = (en.flat_size() - 1) as usize;
        Self { en, corner: 0, combos: Combinations::new(inner, d - 1) }
    }

    fn corner_point(&self, corner: usize) -> DVector<f64> {
        let d = self.en.dimensions();
        DVector::from_iterator(
            d,
            (0..d).map(|i| if corner >> i & 1 == 1 { self.en.limits[i] as f64 } else { 0.0 }),
        )
    }
}

impl Iterator for CenteredIter<'_> {
    type Item = DMatrix<f64>;

    fn next(&mut self) -> Option<DMatrix<f64>> {
        let d = self.en.dimensions();
        let corners = 1usize << d;
        loop {
            if self.corner >= corners {
                return None;
            }
            let bp = self.corner_point(self.corner);
            // +1 where the corner sits at 0, -1 where it sits at the limit.
            let signs = bp.map(|x| if x > 0.0 { -1.0 } else { 1.0 });
            for combo in self.combos.by_ref() {
                let mut pts = DMatrix::zeros(d, d);
                pts.set_row(0, &bp.transpose());
                for (r, &ci) in combo.iter().enumerate() {
                    let reflected = self.en.unrank(ci as i64 + 1).component_mul(&signs) + &bp;
                    pts.set_row(r + 1, &reflected.transpose());
                }
                let (diff, ok) = affinely_independent(&pts);
                if ok {
                    return Some(diff);
                }
            }
            self.corner += 1;
            let inner = (self.en.flat_size() - 1) as usize;
            self.combos = Combinations::new(inner, d - 1);
        }
    }
}

/// Exhaustive 2D direction scan: `(x, y)` and `(-x, y)` over the box.
pub struct PlanarIter<'a> {
    en: &'a PointEnumerator,
    x: i64,
    y: i64,
    mirror: Option<DMatrix<f64>>,
}

impl Iterator for PlanarIter<'_> {
    type Item = DMatrix<f64>;

    fn next(&mut self) -> Option<DMatrix<f64>> {
        if let Some(m) = self.mirror.take() {
            return Some(m);
        }
        loop {
            if self.x > self.en.limits[0] {
                return None;
            }
            if self.y > self.en.limits[1] {
                self.y = 0;
                self.x += 1;
                continue;
            }
            let (x, y) = (self.x, self.y);
            self.y += 1;
            if x == 0 && y == 0 {
                continue;
            }
            let out = DMatrix::from_row_slice(1, 2, &[x as f64, y as f64]);
            self.mirror = Some(DMatrix::from_row_slice(1, 2, &[-x as f64, y as f64]));
            return Some(out);
        }
    }
}

/// Lazy lexicographic k-combinations of `0..n`.
#[derive(Clone, Debug)]
pub(crate) struct Combinations {
    n: usize,
    k: usize,
    idxs: Vec<usize>,
    started: bool,
    done: bool,
}

impl Combinations {
    pub(crate) fn new(n: usize, k: usize) -> Self {
        Self { n, k, idxs: (0..k).collect(), started: false, done: k == 0 || k > n }
    }
}

impl Iterator for Combinations {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Vec<usize>> {
        if self.done {
            return None;
        }
        if !self.started {
            self.started = true;
            return Some(self.idxs.clone());
        }
        // Rightmost index that can still move.
        let mut i = self.k;
        loop {
            if i == 0 {
                self.done = true;
                return None;
            }
            i -= 1;
            if self.idxs[i] != i + self.n - self.k {
                break;
            }
        }
        self.idxs[i] += 1;
        for j in i + 1..self.k {
            self.idxs[j] = self.idxs[j - 1] + 1;
        }
        Some(self.idxs.clone())
    }
}
