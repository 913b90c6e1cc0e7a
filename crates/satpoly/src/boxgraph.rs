//! Corner adjacency graph of the count box.
//!
//! The `2^d` corners of the box `[0, limit_i]` per axis live in a flat arena
//! indexed by bitmask rank: bit `i` set means axis `i` sits at its upper
//! limit. Neighbour lists hold arena indices, one per axis in axis order, so
//! flipping the same axis twice returns to the original corner by
//! construction. The topology is read-only after construction.

use nalgebra::{DMatrix, DVector};

use crate::error::GeomError;
use crate::lattice::{normal_vector, primitivize};

/// One box corner: its lattice position and its `d` adjacent corners.
#[derive(Clone, Debug)]
pub struct BoxVertex {
    pub position: DVector<i64>,
    pub neighbours: Vec<usize>,
}

/// Corner/edge model of the bounding box.
#[derive(Clone, Debug)]
pub struct BoxGraph {
    limits: Vec<i64>,
    vertices: Vec<BoxVertex>,
}

impl BoxGraph {
    pub fn new(limits: &[i64]) -> Self {
        let d = limits.len();
        let count = 1usize << d;
        let mut vertices = Vec::with_capacity(count);
        for rank in 0..count {
            let position = DVector::from_iterator(
                d,
                (0..d).map(|i| if rank >> i & 1 == 1 { limits[i] } else { 0 }),
            );
            let neighbours = (0..d).map(|i| rank ^ (1 << i)).collect();
            vertices.push(BoxVertex { position, neighbours });
        }
        Self { limits: limits.to_vec(), vertices }
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
    pub fn vertices(&self) -> &[BoxVertex] {
        &self.vertices
    }

    #[inline]
    pub fn vertex(&self, ix: usize) -> &BoxVertex {
        &self.vertices[ix]
    }

    /// Arena index of a corner given its coordinate tuple, if it is one.
    pub fn index_of(&self, position: &[i64]) -> Option<usize> {
        if position.len() != self.limits.len() {
            return None;
        }
        let mut rank = 0usize;
        for (i, (&p, &l)) in position.iter().zip(&self.limits).enumerate() {
            if p == l {
                rank |= 1 << i;
            } else if p != 0 {
                return None;
            }
        }
        Some(rank)
    }

    /// Box centre, strictly interior to the full-dimensional box.
    pub fn inner_point(&self) -> DVector<f64> {
        DVector::from_iterator(self.limits.len(), self.limits.iter().map(|&l| l as f64 * 0.5))
    }

    /// Corner normal: differences of the corner's neighbours spanned into a
    /// hyperplane and reduced to primitive form. Seeds the initial
    /// constraint directions, one per corner.
    pub fn neighbour_normal(&self, ix: usize) -> Result<DVector<i64>, GeomError> {
        let d = self.dimensions();
        let v = &self.vertices[ix];
        let first = &self.vertices[v.neighbours[0]].position;
        let mut m = DMatrix::zeros(d - 1, d);
        for (r, &nix) in v.neighbours[1..].iter().enumerate() {
            let row = &self.vertices[nix].position - first;
            for c in 0..d {
                m[(r, c)] = row[c] as f64;
            }
        }
        Ok(primitivize(&normal_vector(&m)?))
    }
}
