//! Depth-first direction construction with shrinking per-axis windows.
//!
//! Rows of the direction matrix are chosen one at a time. Each row is a step
//! inside the current window re-centred on the previous step; after a choice
//! the window shrinks so later steps stay inside `[-limit_i, limit_i]` per
//! axis. A branch dies as soon as the partial matrix loses rank, which is
//! what makes this strategy viable for large limits.

use nalgebra::{DMatrix, DVector};

use super::PointEnumerator;

/// One open search level: its window and the cursor walking it.
struct Frame {
    window: Vec<(i64, i64)>,
    odo: Odometer,
}

impl Frame {
    fn new(window: Vec<(i64, i64)>) -> Self {
        let odo = Odometer::new(&window);
        Self { window, odo }
    }
}

pub struct DirectionalIter<'a> {
    en: &'a PointEnumerator,
    rows: Vec<DVector<f64>>,
    centers: Vec<DVector<i64>>,
    frames: Vec<Frame>,
    done: bool,
}

impl<'a> DirectionalIter<'a> {
    pub(super) fn new(en: &'a PointEnumerator) -> Self {
        let d = en.dimensions();
        let base: Vec<(i64, i64)> = en.limits().iter().map(|&l| (-l, l)).collect();
        Self {
            en,
            rows: Vec::with_capacity(d - 1),
            centers: vec![DVector::zeros(d)],
            frames: vec![Frame::new(base)],
            done: false,
        }
    }

    fn partial_rank_ok(&self) -> bool {
        let rows: Vec<_> = self.rows.iter().map(|r| r.transpose()).collect();
        let m = DMatrix::from_rows(&rows);
        m.rank(1e-9) == self.rows.len()
    }

    fn to_matrix(&self) -> DMatrix<f64> {
        let rows: Vec<_> = self.rows.iter().map(|r| r.transpose()).collect();
        DMatrix::from_rows(&rows)
    }
}

impl Iterator for DirectionalIter<'_> {
    type Item = DMatrix<f64>;

    fn next(&mut self) -> Option<DMatrix<f64>> {
        let d = self.en.dimensions();
        loop {
            if self.done {
                return None;
            }
            let depth = self.rows.len();
            let step = match self.frames[depth].odo.next() {
                Some(step) => step,
                None => {
                    // Window exhausted: close this level and undo the parent
                    // choice that opened it.
                    self.frames.pop();
                    if self.frames.is_empty() {
                        self.done = true;
                        return None;
                    }
                    self.rows.pop();
                    self.centers.pop();
                    continue;
                }
            };
            let center = &self.centers[depth];
            let row = DVector::from_iterator(d, (0..d).map(|i| (step[i] + center[i]) as f64));
            self.rows.push(row);
            if !self.partial_rank_ok() {
                self.rows.pop();
                continue;
            }
            if self.rows.len() == d - 1 {
                let out = self.to_matrix();
                self.rows.pop();
                return Some(out);
            }
            // Shrink the window around this step and descend.
            let window = &self.frames[depth].window;
            let next_window: Vec<(i64, i64)> = window
                .iter()
                .zip(self.en.limits())
                .zip(step.iter())
                .map(|((&(lo, hi), &l), &s)| ((-l).max(lo - s), l.min(hi - s)))
                .collect();
            self.centers.push(step);
            self.frames.push(Frame::new(next_window));
        }
    }
}

/// Cartesian-product cursor over closed integer ranges.
#[derive(Clone, Debug)]
pub(crate) struct Odometer {
    lo: Vec<i64>,
    hi: Vec<i64>,
    cur: Vec<i64>,
    started: bool,
    empty: bool,
}

impl Odometer {
    pub(crate) fn new(ranges: &[(i64, i64)]) -> Self {
        let lo: Vec<i64> = ranges.iter().map(|&(lo, _)| lo).collect();
        let hi: Vec<i64> = ranges.iter().map(|&(_, hi)| hi).collect();
        let empty = ranges.is_empty() || lo.iter().zip(&hi).any(|(l, h)| l > h);
        let cur = lo.clone();
        Self { lo, hi, cur, started: false, empty }
    }
}

impl Iterator for Odometer {
    type Item = DVector<i64>;

    fn next(&mut self) -> Option<DVector<i64>> {
        if self.empty {
            return None;
        }
        if !self.started {
            self.started = true;
            return Some(DVector::from_vec(self.cur.clone()));
        }
        let d = self.cur.len();
        for i in (0..d).rev() {
            if self.cur[i] < self.hi[i] {
                self.cur[i] += 1;
                for j in i + 1..d {
                    self.cur[j] = self.lo[j];
                }
                return Some(DVector::from_vec(self.cur.clone()));
            }
        }
        None
    }
}
