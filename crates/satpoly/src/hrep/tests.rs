use nalgebra::{dvector, DVector};

use super::*;

fn row(entries: &[i64], offset: i64) -> (DVector<i64>, i64) {
    (DVector::from_vec(entries.to_vec()), offset)
}

#[test]
fn box_system_has_its_own_bounding_box() {
    let h = HRep::from_box(&[2, 3]);
    assert_eq!(h.num_rows(), 4);
    let (lo, hi) = h.bounding_box().expect("bounded");
    assert!((lo - dvector![0.0, 0.0]).norm() < 1e-7);
    assert!((hi - dvector![2.0, 3.0]).norm() < 1e-7);
    assert!(h.contains(&dvector![1.0, 1.5], 1e-9));
    assert!(!h.contains(&dvector![2.5, 0.0], 1e-9));
}

#[test]
fn reduce_drops_dominated_rows_only() {
    let mut h = HRep::from_box(&[2, 2]);
    // x + y <= 3 cuts a corner; x + 2y <= 7 is implied by the rest.
    h.add_rows(&[row(&[1, 1], 3), row(&[1, 2], 7)]);
    h.reduce();
    assert_eq!(h.num_rows(), 5);
    // The binding cut survived.
    assert!(!h.contains(&dvector![2.0, 2.0], 1e-9));
    assert!(h.contains(&dvector![2.0, 1.0], 1e-9));
    assert!(h.contains(&dvector![1.0, 2.0], 1e-9));
}

#[test]
fn reduce_is_idempotent() {
    let mut h = HRep::from_box(&[2, 2]);
    h.add_rows(&[row(&[1, 1], 3), row(&[1, 1], 5), row(&[0, 1], 2)]);
    h.reduce();
    let rows_after_first = h.num_rows();
    let a_snapshot = h.a.clone();
    let b_snapshot = h.b.clone();
    h.reduce();
    assert_eq!(h.num_rows(), rows_after_first);
    assert_eq!(h.a, a_snapshot);
    assert_eq!(h.b, b_snapshot);
}

#[test]
fn reduce_keeps_every_nonimplied_row() {
    // Box plus one genuine corner cut: all five rows are facets, and probe
    // points just outside each facet certify none was dropped.
    let mut h = HRep::from_box(&[2, 2]);
    h.add_rows(&[row(&[1, 1], 3)]);
    h.reduce();
    assert_eq!(h.num_rows(), 5);
    for probe in [
        dvector![2.2, 0.5],
        dvector![0.5, 2.2],
        dvector![-0.2, 0.5],
        dvector![0.5, -0.2],
        dvector![1.8, 1.8],
    ] {
        assert!(!h.contains(&probe, 1e-9), "probe {probe:?} should be cut off");
    }
}

#[test]
fn bounding_box_tightens_with_cuts() {
    let mut h = HRep::from_box(&[4, 4]);
    h.add_rows(&[row(&[1, 0], 1)]);
    h.reduce();
    let (lo, hi) = h.bounding_box().expect("bounded");
    assert!((hi[0] - 1.0).abs() < 1e-7);
    assert!((hi[1] - 4.0).abs() < 1e-7);
    assert!(lo.norm() < 1e-7);
}
