//! Integer-exact hyperplane normals for lattice directions.
//!
//! Purpose
//! - Turn `d-1` direction rows into a vector orthogonal to all of them:
//!   a 90-degree rotation in 2D, the cross product in 3D, and cofactor
//!   expansion beyond.
//! - Reduce floating normals to primitive integer form so parallel
//!   hyperplanes compare equal.
//!
//! Conventions
//! - Point matrices are `(d-1) x d` with `d >= 2`; anything else is a
//!   `GeomError::Dimension`.
//! - Primitive form: gcd of the entries is 1 and the first nonzero entry is
//!   positive, so `v` and `k v` (k != 0) share one canonical representative.

use nalgebra::{DMatrix, DVector};

use crate::error::GeomError;

/// Rank tolerance for the affine-independence check.
const RANK_EPS: f64 = 1e-9;

/// Vector orthogonal to every row of a `(d-1) x d` matrix.
///
/// For `d >= 4`, output coordinate `i` is `(-1)^i` times the determinant of
/// the matrix with column `i` removed; at `d = 3` this cofactor rule is the
/// standard cross product, which fixes the sign convention.
pub fn normal_vector(points: &DMatrix<f64>) -> Result<DVector<f64>, GeomError> {
    let (rows, cols) = points.shape();
    if cols < 2 || rows + 1 != cols {
        return Err(GeomError::Dimension { rows, cols });
    }
    match cols {
        2 => Ok(DVector::from_vec(vec![points[(0, 1)], -points[(0, 0)]])),
        3 => {
            let a = points.row(0);
            let b = points.row(1);
            Ok(DVector::from_vec(vec![
                a[1] * b[2] - a[2] * b[1],
                a[2] * b[0] - a[0] * b[2],
                a[0] * b[1] - a[1] * b[0],
            ]))
        }
        _ => Ok(generalized_cross(points)),
    }
}

/// Generalized cross product via cofactor expansion over deleted columns.
fn generalized_cross(points: &DMatrix<f64>) -> DVector<f64> {
    let d = points.ncols();
    let mut out = DVector::zeros(d);
    for i in 0..d {
        let minor = points.clone().remove_column(i);
        let sign = if i % 2 == 0 { 1.0 } else { -1.0 };
        out[i] = sign * minor.determinant();
    }
    out
}

/// Primitive integer form of a (nearly integral) vector.
///
/// Rounds per component, divides by the gcd of the entries, and fixes the
/// sign so the first nonzero entry is positive. The all-zero vector is
/// returned unchanged. Idempotent, and invariant under nonzero integer
/// scaling of the input.
pub fn primitivize(v: &DVector<f64>) -> DVector<i64> {
    let rounded: DVector<i64> = v.map(|x| x.round() as i64);
    let g = rounded.iter().fold(0u64, |acc, &x| gcd(acc, x.unsigned_abs()));
    if g == 0 {
        return rounded;
    }
    let first = rounded.iter().copied().find(|&x| x != 0).unwrap_or(1);
    let div = first.signum() * g as i64;
    rounded.map(|x| x / div)
}

/// Affine-independence filter used by the enumerators.
///
/// Subtracts row 0 from rows 1.. and reports whether the `(d-1) x d`
/// difference matrix has full rank `d - 1`. The difference matrix is what
/// gets fed to [`normal_vector`].
pub fn affinely_independent(points: &DMatrix<f64>) -> (DMatrix<f64>, bool) {
    let (rows, cols) = points.shape();
    debug_assert!(rows >= 2);
    let mut diff = DMatrix::zeros(rows - 1, cols);
    for r in 1..rows {
        diff.set_row(r - 1, &(points.row(r) - points.row(0)));
    }
    let ok = diff.rank(RANK_EPS) == cols - 1;
    (diff, ok)
}

fn gcd(a: u64, b: u64) -> u64 {
    if b == 0 {
        a
    } else {
        gcd(b, a % b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::dmatrix;
    use proptest::prelude::*;

    fn iv(entries: &[i64]) -> DVector<f64> {
        DVector::from_iterator(entries.len(), entries.iter().map(|&x| x as f64))
    }

    #[test]
    fn rotation_in_2d() {
        let m = dmatrix![3.0, 2.0];
        let n = normal_vector(&m).unwrap();
        assert_eq!(n, DVector::from_vec(vec![2.0, -3.0]));
    }

    #[test]
    fn cross_product_of_basis_rows() {
        let m = dmatrix![1.0, 0.0, 0.0; 0.0, 1.0, 0.0];
        let n = normal_vector(&m).unwrap();
        assert!(n == iv(&[0, 0, 1]) || n == iv(&[0, 0, -1]));
    }

    #[test]
    fn shape_mismatch_is_an_error() {
        let square = DMatrix::<f64>::identity(3, 3);
        assert!(matches!(
            normal_vector(&square),
            Err(GeomError::Dimension { rows: 3, cols: 3 })
        ));
        let skinny = DMatrix::<f64>::zeros(1, 4);
        assert!(normal_vector(&skinny).is_err());
    }

    #[test]
    fn primitivize_known_vector() {
        let v = iv(&[0, 0, -2, 0, -4, 10]);
        let p = primitivize(&v);
        assert_eq!(p.iter().copied().collect::<Vec<_>>(), vec![0, 0, 1, 0, 2, -5]);
    }

    #[test]
    fn primitivize_zero_vector_unchanged() {
        let z = iv(&[0, 0, 0]);
        assert_eq!(primitivize(&z).iter().copied().collect::<Vec<_>>(), vec![0, 0, 0]);
    }

    #[test]
    fn repeated_row_is_dependent() {
        let m = dmatrix![0.0, 0.0, 0.0; 1.0, 2.0, 3.0; 1.0, 2.0, 3.0];
        let (_, ok) = affinely_independent(&m);
        assert!(!ok);
        let m2 = dmatrix![0.0, 0.0, 0.0; 1.0, 0.0, 0.0; 0.0, 1.0, 0.0];
        let (_, ok2) = affinely_independent(&m2);
        assert!(ok2);
    }

    proptest! {
        #[test]
        fn primitivize_is_idempotent(entries in prop::collection::vec(-40i64..=40, 2..6)) {
            let once = primitivize(&iv(&entries));
            let twice = primitivize(&once.map(|x| x as f64));
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn primitive_form_has_unit_gcd_and_positive_lead(
            entries in prop::collection::vec(-40i64..=40, 2..6),
        ) {
            let p = primitivize(&iv(&entries));
            if let Some(first) = p.iter().copied().find(|&x| x != 0) {
                prop_assert!(first > 0);
                let g = p.iter().fold(0u64, |acc, &x| super::gcd(acc, x.unsigned_abs()));
                prop_assert_eq!(g, 1);
            }
        }

        #[test]
        fn primitivize_ignores_positive_scaling(
            entries in prop::collection::vec(-20i64..=20, 2..6),
            k in 1i64..=5,
        ) {
            let base = primitivize(&iv(&entries));
            let scaled: Vec<i64> = entries.iter().map(|&x| k * x).collect();
            prop_assert_eq!(base.clone(), primitivize(&iv(&scaled)));
            // Parallel vectors share one canonical representative.
            let negated: Vec<i64> = entries.iter().map(|&x| -x).collect();
            prop_assert_eq!(base, primitivize(&iv(&negated)));
        }

        #[test]
        fn normal_is_orthogonal_to_all_rows(
            d in 2usize..=5,
            seed in prop::collection::vec(-6i64..=6, 25),
        ) {
            let pts = DMatrix::from_fn(d, d, |r, c| seed[r * d + c] as f64);
            let (diff, ok) = affinely_independent(&pts);
            prop_assume!(ok);
            let n = normal_vector(&diff).unwrap();
            for r in 0..diff.nrows() {
                let dot: f64 = (0..d).map(|c| diff[(r, c)] * n[c]).sum();
                prop_assert!(dot.abs() < 1e-6, "row {} not orthogonal: {}", r, dot);
            }
        }
    }
}
