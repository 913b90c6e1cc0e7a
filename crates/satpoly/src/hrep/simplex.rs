//! Dense two-phase primal simplex used by constraint reduction.
//!
//! Solves `maximize c.x  subject to  A x <= b` with free variables via the
//! `x = u - v` split. Tableaus here are tiny (tens of rows), so a dense
//! tableau with Bland's rule is enough; Bland also rules out cycling.

use nalgebra::{DMatrix, DVector};

const PIVOT_EPS: f64 = 1e-9;
/// Hard cap on pivots; reduction tableaus never get close.
const MAX_PIVOTS: usize = 10_000;

#[derive(Clone, Debug)]
pub(crate) enum LpOutcome {
    Optimal { x: DVector<f64>, value: f64 },
    Unbounded,
    Infeasible,
}

/// Maximize `c.x` over `{x : a x <= b}` with `x` free.
pub(crate) fn maximize(c: &DVector<f64>, a: &DMatrix<f64>, b: &DVector<f64>) -> LpOutcome {
    let m = a.nrows();
    let n = a.ncols();
    if m == 0 {
        // No constraints: optimum exists only for the zero objective.
        return if c.iter().all(|&x| x.abs() <= PIVOT_EPS) {
            LpOutcome::Optimal { x: DVector::zeros(n), value: 0.0 }
        } else {
            LpOutcome::Unbounded
        };
    }

    // Columns: u (n), v (n), slack (m), then one artificial per negative-rhs
    // row. Rows are normalized to nonnegative rhs first.
    let structural = 2 * n + m;
    let mut art_rows: Vec<usize> = Vec::new();
    for i in 0..m {
        if b[i] < 0.0 {
            art_rows.push(i);
        }
    }
    let ncols = structural + art_rows.len();

    let mut t = DMatrix::<f64>::zeros(m, ncols + 1);
    let mut basis = vec![0usize; m];
    let mut next_art = structural;
    for i in 0..m {
        let sign = if b[i] < 0.0 { -1.0 } else { 1.0 };
        for j in 0..n {
            t[(i, j)] = sign * a[(i, j)];
            t[(i, n + j)] = -sign * a[(i, j)];
        }
        t[(i, 2 * n + i)] = sign;
        t[(i, ncols)] = sign * b[i];
        if sign < 0.0 {
            t[(i, next_art)] = 1.0;
            basis[i] = next_art;
            next_art += 1;
        } else {
            basis[i] = 2 * n + i;
        }
    }

    if !art_rows.is_empty() {
        // Phase 1: drive the artificials to zero.
        let mut obj = vec![0.0; ncols];
        for j in structural..ncols {
            obj[j] = -1.0;
        }
        match run_simplex(&mut t, &mut basis, &obj, ncols) {
            SimplexEnd::Optimal => {}
            SimplexEnd::Unbounded => return LpOutcome::Infeasible,
        }
        let infeas: f64 = basis
            .iter()
            .enumerate()
            .filter(|&(_, &bj)| bj >= structural)
            .map(|(i, _)| t[(i, ncols)])
            .sum();
        if infeas > 1e-7 {
            return LpOutcome::Infeasible;
        }
        // Pivot any remaining zero-level artificials out of the basis.
        for i in 0..m {
            if basis[i] >= structural {
                if let Some(j) = (0..structural).find(|&j| t[(i, j)].abs() > PIVOT_EPS) {
                    pivot(&mut t, &mut basis, i, j);
                }
            }
        }
    }

    // Phase 2: the real objective over structural columns only.
    let mut obj = vec![0.0; ncols];
    for j in 0..n {
        obj[j] = c[j];
        obj[n + j] = -c[j];
    }
    match run_simplex(&mut t, &mut basis, &obj, structural) {
        SimplexEnd::Unbounded => LpOutcome::Unbounded,
        SimplexEnd::Optimal => {
            let mut x = DVector::zeros(n);
            for (i, &bj) in basis.iter().enumerate() {
                if bj < n {
                    x[bj] += t[(i, ncols)];
                } else if bj < 2 * n {
                    x[bj - n] -= t[(i, ncols)];
                }
            }
            let value = c.dot(&x);
            LpOutcome::Optimal { x, value }
        }
    }
}

enum SimplexEnd {
    Optimal,
    Unbounded,
}

/// Bland-rule simplex on the tableau; only columns below `enter_limit` may
/// enter the basis (phase 2 passes the structural count to freeze any
/// leftover artificial columns).
fn run_simplex(t: &mut DMatrix<f64>, basis: &mut [usize], obj: &[f64], enter_limit: usize) -> SimplexEnd {
    let m = t.nrows();
    let rhs = t.ncols() - 1;
    for _ in 0..MAX_PIVOTS {
        // Reduced costs from the basic objective coefficients.
        let entering = (0..enter_limit).find(|&j| {
            let reduced: f64 =
                obj[j] - (0..m).map(|i| obj[basis[i]] * t[(i, j)]).sum::<f64>();
            reduced > PIVOT_EPS
        });
        let Some(j) = entering else {
            return SimplexEnd::Optimal;
        };
        // Ratio test; ties broken by smallest basis index (Bland).
        let mut leave: Option<(usize, f64)> = None;
        for i in 0..m {
            if t[(i, j)] > PIVOT_EPS {
                let ratio = t[(i, rhs)] / t[(i, j)];
                let better = match leave {
                    None => true,
                    Some((li, lr)) => {
                        ratio < lr - PIVOT_EPS
                            || (ratio < lr + PIVOT_EPS && basis[i] < basis[li])
                    }
                };
                if better {
                    leave = Some((i, ratio));
                }
            }
        }
        let Some((i, _)) = leave else {
            return SimplexEnd::Unbounded;
        };
        pivot(t, basis, i, j);
    }
    // Bland's rule terminates; the cap is a defect guard only.
    SimplexEnd::Optimal
}

fn pivot(t: &mut DMatrix<f64>, basis: &mut [usize], r: usize, c: usize) {
    let m = t.nrows();
    let w = t.ncols();
    let p = t[(r, c)];
    for j in 0..w {
        t[(r, j)] /= p;
    }
    for i in 0..m {
        if i != r {
            let f = t[(i, c)];
            if f != 0.0 {
                for j in 0..w {
                    t[(i, j)] -= f * t[(r, j)];
                }
            }
        }
    }
    basis[r] = c;
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{dmatrix, dvector};

    #[test]
    fn bounded_maximum_on_a_triangle() {
        // max x + 2y  s.t.  x + y <= 4, x <= 2, y <= 3, x >= 0, y >= 0
        let a = dmatrix![
            1.0, 1.0;
            1.0, 0.0;
            0.0, 1.0;
            -1.0, 0.0;
            0.0, -1.0
        ];
        let b = dvector![4.0, 2.0, 3.0, 0.0, 0.0];
        let c = dvector![1.0, 2.0];
        match maximize(&c, &a, &b) {
            LpOutcome::Optimal { x, value } => {
                assert!((value - 7.0).abs() < 1e-7);
                assert!((x[0] - 1.0).abs() < 1e-7 && (x[1] - 3.0).abs() < 1e-7);
            }
            other => panic!("expected optimum, got {other:?}"),
        }
    }

    #[test]
    fn negative_rhs_needs_phase_one() {
        // max -x  s.t.  x >= 2, x <= 5  ->  optimum -2 at x = 2.
        let a = dmatrix![-1.0; 1.0];
        let b = dvector![-2.0, 5.0];
        let c = dvector![-1.0];
        match maximize(&c, &a, &b) {
            LpOutcome::Optimal { x, value } => {
                assert!((value + 2.0).abs() < 1e-7);
                assert!((x[0] - 2.0).abs() < 1e-7);
            }
            other => panic!("expected optimum, got {other:?}"),
        }
    }

    #[test]
    fn contradictory_rows_are_infeasible() {
        // x <= 0 and x >= 1.
        let a = dmatrix![1.0; -1.0];
        let b = dvector![0.0, -1.0];
        let c = dvector![1.0];
        assert!(matches!(maximize(&c, &a, &b), LpOutcome::Infeasible));
    }

    #[test]
    fn open_direction_is_unbounded() {
        // max x  s.t.  x >= 0 only.
        let a = dmatrix![-1.0];
        let b = dvector![0.0];
        let c = dvector![1.0];
        assert!(matches!(maximize(&c, &a, &b), LpOutcome::Unbounded));
    }

    #[test]
    fn free_variables_reach_negative_coordinates() {
        // max -x - y  s.t.  -x <= 3, -y <= 3  ->  optimum 6 at (-3, -3).
        let a = dmatrix![-1.0, 0.0; 0.0, -1.0];
        let b = dvector![3.0, 3.0];
        let c = dvector![-1.0, -1.0];
        match maximize(&c, &a, &b) {
            LpOutcome::Optimal { x, value } => {
                assert!((value - 6.0).abs() < 1e-7);
                assert!((x[0] + 3.0).abs() < 1e-7 && (x[1] + 3.0).abs() < 1e-7);
            }
            other => panic!("expected optimum, got {other:?}"),
        }
    }
}
