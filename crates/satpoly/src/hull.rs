//! Inner approximation: incremental convex hull of discovered lattice points.
//!
//! Purpose
//! - Hold the feasible lattice points confirmed so far and the facets of
//!   their convex hull.
//! - On insertion, regenerate the facet set and report exactly the facets
//!   that are new, so the growth loop re-examines only fresh work.
//!
//! Facets come from enumerating d-subsets of points and keeping supporting
//! hyperplanes (both orientations tried, quantized dedup). That is O(V^d),
//! acceptable here because admissible regions keep vertex counts small and
//! insertions are driven by oracle round-trips that dominate the cost.

use std::collections::HashSet;

use nalgebra::{DMatrix, DVector};

use crate::enumerate::Combinations;
use crate::lattice::{affinely_independent, normal_vector};

const FEAS_EPS: f64 = 1e-9;
/// Quantization grid for facet identity across regenerations.
const KEY_EPS: f64 = 1e-6;

/// One hull facet `normal . x <= offset`, with a unit normal so signed
/// distances are Euclidean.
#[derive(Clone, Debug)]
pub struct Facet {
    pub normal: DVector<f64>,
    pub offset: f64,
}

impl Facet {
    /// Signed distance of `p` from the facet hyperplane; positive outside.
    #[inline]
    pub fn signed_distance(&self, p: &DVector<f64>) -> f64 {
        self.normal.dot(p) - self.offset
    }

    fn key(&self) -> Vec<i64> {
        let mut key: Vec<i64> = self
            .normal
            .iter()
            .map(|&x| (x / KEY_EPS).round() as i64)
            .collect();
        key.push((self.offset / KEY_EPS).round() as i64);
        key
    }
}

/// Convex hull of lattice points with regenerated facets.
#[derive(Clone, Debug)]
pub struct PointHull {
    dim: usize,
    points: Vec<DVector<i64>>,
    facets: Vec<Facet>,
}

impl PointHull {
    /// Build a hull once at least `d + 1` affinely independent points exist;
    /// `None` until then.
    pub fn from_points(points: Vec<DVector<i64>>, dim: usize) -> Option<Self> {
        if points.len() < dim + 1 || !full_dimensional(&points, dim) {
            return None;
        }
        let mut hull = Self { dim, points, facets: Vec::new() };
        hull.facets = hull.derive_facets();
        if hull.facets.is_empty() {
            return None;
        }
        Some(hull)
    }

    #[inline]
    pub fn dimensions(&self) -> usize {
        self.dim
    }

    #[inline]
    pub fn points(&self) -> &[DVector<i64>] {
        &self.points
    }

    #[inline]
    pub fn facets(&self) -> &[Facet] {
        &self.facets
    }

    /// Membership with slack `eps`.
    pub fn contains(&self, p: &DVector<f64>, eps: f64) -> bool {
        self.facets.iter().all(|f| f.signed_distance(p) <= eps)
    }

    /// Insert a point and regenerate facets; returns only the facets that
    /// did not exist before the insertion. A duplicate or interior point
    /// produces no new facets.
    pub fn add_point(&mut self, p: DVector<i64>) -> Vec<Facet> {
        if self.points.contains(&p) {
            return Vec::new();
        }
        let before: HashSet<Vec<i64>> = self.facets.iter().map(Facet::key).collect();
        self.points.push(p);
        self.facets = self.derive_facets();
        self.facets
            .iter()
            .filter(|f| !before.contains(&f.key()))
            .cloned()
            .collect()
    }

    /// Supporting hyperplanes through d-subsets of the point set.
    fn derive_facets(&self) -> Vec<Facet> {
        let d = self.dim;
        let mut out: Vec<Facet> = Vec::new();
        let mut seen: HashSet<Vec<i64>> = HashSet::new();
        for comb in Combinations::new(self.points.len(), d) {
            let mut pts = DMatrix::zeros(d, d);
            for (r, &ix) in comb.iter().enumerate() {
                for c in 0..d {
                    pts[(r, c)] = self.points[ix][c] as f64;
                }
            }
            let (diff, ok) = affinely_independent(&pts);
            if !ok {
                continue;
            }
            let Ok(normal) = normal_vector(&diff) else { continue };
            let norm = normal.norm();
            if norm <= FEAS_EPS {
                continue;
            }
            let n = normal / norm;
            let c = n.dot(&pts.row(0).transpose());
            let facet = if self.all_inside(&n, c) {
                Facet { normal: n, offset: c }
            } else if self.all_inside(&(-&n), -c) {
                Facet { normal: -n, offset: -c }
            } else {
                continue;
            };
            if seen.insert(facet.key()) {
                out.push(facet);
            }
        }
        out
    }

    fn all_inside(&self, n: &DVector<f64>, c: f64) -> bool {
        self.points.iter().all(|p| {
            let dot: f64 = p.iter().zip(n.iter()).map(|(&pi, &ni)| pi as f64 * ni).sum();
            dot <= c + FEAS_EPS
        })
    }
}

fn full_dimensional(points: &[DVector<i64>], dim: usize) -> bool {
    if points.len() < dim + 1 {
        return false;
    }
    let mut diff = DMatrix::zeros(points.len() - 1, dim);
    for (r, p) in points[1..].iter().enumerate() {
        for c in 0..dim {
            diff[(r, c)] = (p[c] - points[0][c]) as f64;
        }
    }
    diff.rank(1e-9) == dim
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(coords: &[i64]) -> DVector<i64> {
        DVector::from_vec(coords.to_vec())
    }

    fn fpt(coords: &[f64]) -> DVector<f64> {
        DVector::from_vec(coords.to_vec())
    }

    #[test]
    fn square_has_four_facets() {
        let hull = PointHull::from_points(
            vec![pt(&[0, 0]), pt(&[2, 0]), pt(&[0, 2]), pt(&[2, 2])],
            2,
        )
        .expect("full-dimensional");
        assert_eq!(hull.facets().len(), 4);
        assert!(hull.contains(&fpt(&[1.0, 1.0]), 1e-9));
        assert!(!hull.contains(&fpt(&[3.0, 1.0]), 1e-9));
    }

    #[test]
    fn degenerate_point_sets_build_no_hull() {
        // Too few points.
        assert!(PointHull::from_points(vec![pt(&[0, 0]), pt(&[1, 0])], 2).is_none());
        // Collinear points.
        assert!(PointHull::from_points(
            vec![pt(&[0, 0]), pt(&[1, 0]), pt(&[2, 0])],
            2
        )
        .is_none());
    }

    #[test]
    fn insertion_reports_only_fresh_facets() {
        let mut hull = PointHull::from_points(
            vec![pt(&[0, 0]), pt(&[2, 0]), pt(&[0, 2])],
            2,
        )
        .expect("triangle");
        assert_eq!(hull.facets().len(), 3);
        // Push the hypotenuse outward: the two axis facets survive, the two
        // edges through the new point are fresh.
        let fresh = hull.add_point(pt(&[2, 2]));
        assert_eq!(hull.facets().len(), 4);
        assert_eq!(fresh.len(), 2);
        // An interior point changes nothing.
        let none = hull.add_point(pt(&[1, 1]));
        assert!(none.is_empty());
        assert_eq!(hull.facets().len(), 4);
        // A duplicate changes nothing.
        let dup = hull.add_point(pt(&[2, 2]));
        assert!(dup.is_empty());
    }

    #[test]
    fn tetrahedron_in_3d() {
        let hull = PointHull::from_points(
            vec![pt(&[0, 0, 0]), pt(&[2, 0, 0]), pt(&[0, 2, 0]), pt(&[0, 0, 2])],
            3,
        )
        .expect("tetrahedron");
        assert_eq!(hull.facets().len(), 4);
        assert!(hull.contains(&fpt(&[0.3, 0.3, 0.3]), 1e-9));
        assert!(!hull.contains(&fpt(&[1.0, 1.0, 1.0]), 1e-9));
    }
}
