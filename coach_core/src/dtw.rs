//! Elastic distance between two multi-series angle trajectories.
//!
//! Classic dynamic time warping with pointwise Euclidean cost and a
//! rolling two-row cost matrix; tolerant of reps performed at different
//! speeds than the reference.

use crate::model::SERIES_PER_GROUP;

#[inline]
fn euclidean(a: &[f32; SERIES_PER_GROUP], b: &[f32; SERIES_PER_GROUP]) -> f64 {
    let mut acc = 0.0f64;
    for i in 0..SERIES_PER_GROUP {
        let d = f64::from(a[i]) - f64::from(b[i]);
        acc += d * d;
    }
    acc.sqrt()
}

/// Warped alignment distance between two trajectories (rows are samples).
///
/// Returns 0.0 when either trajectory is empty; references are validated
/// non-empty at load, so that case only arises from degenerate rep slices.
pub fn dtw_distance(a: &[[f32; SERIES_PER_GROUP]], b: &[[f32; SERIES_PER_GROUP]]) -> f64 {
    let (n, m) = (a.len(), b.len());
    if n == 0 || m == 0 {
        return 0.0;
    }

    let mut prev = vec![f64::INFINITY; m + 1];
    let mut curr = vec![f64::INFINITY; m + 1];
    prev[0] = 0.0;

    for row in a {
        curr[0] = f64::INFINITY;
        for (j, col) in b.iter().enumerate() {
            let cost = euclidean(row, col);
            let best = prev[j].min(prev[j + 1]).min(curr[j]);
            curr[j + 1] = cost + best;
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[m]
}
