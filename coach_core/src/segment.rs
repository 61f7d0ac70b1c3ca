//! Peak detection over the trailing buffer window.
//!
//! Gradients are computed for every tracked series; repetition boundary
//! candidates are local maxima of the segmenting series' gradients passing
//! height, separation, and prominence thresholds.

use crate::buffer::AngleBuffer;
use crate::model::SeriesRef;
use coach_config::DetectionCfg;

/// Central-difference gradient with one-sided differences at the edges,
/// unit sample spacing.
pub fn gradient(x: &[f32]) -> Vec<f32> {
    let n = x.len();
    match n {
        0 => Vec::new(),
        1 => vec![0.0],
        _ => {
            let mut g = Vec::with_capacity(n);
            g.push(x[1] - x[0]);
            for i in 1..n - 1 {
                g.push((x[i + 1] - x[i - 1]) / 2.0);
            }
            g.push(x[n - 1] - x[n - 2]);
            g
        }
    }
}

/// Local maxima of `x` (plateaus resolve to their midpoint) filtered by
/// minimum height, then minimum separation (higher peaks win), then
/// minimum prominence.
pub fn find_gradient_peaks(
    x: &[f32],
    height: f32,
    distance: usize,
    prominence: f32,
) -> Vec<usize> {
    let n = x.len();
    if n < 3 {
        return Vec::new();
    }

    // Strict maxima with plateau handling.
    let mut peaks: Vec<usize> = Vec::new();
    let mut i = 1usize;
    while i < n - 1 {
        if x[i - 1] < x[i] {
            let mut ahead = i;
            while ahead < n - 1 && x[ahead + 1] == x[i] {
                ahead += 1;
            }
            if ahead < n - 1 && x[ahead + 1] < x[i] {
                peaks.push((i + ahead) / 2);
            }
            i = ahead + 1;
        } else {
            i += 1;
        }
    }

    peaks.retain(|&p| x[p] >= height);

    // Separation: process by descending height, suppress close neighbours.
    if distance > 1 && peaks.len() > 1 {
        let mut order: Vec<usize> = (0..peaks.len()).collect();
        order.sort_by(|&a, &b| x[peaks[b]].total_cmp(&x[peaks[a]]));
        let mut keep = vec![true; peaks.len()];
        for &k in &order {
            if !keep[k] {
                continue;
            }
            for (j, keep_j) in keep.iter_mut().enumerate() {
                if j != k && *keep_j && peaks[j].abs_diff(peaks[k]) < distance {
                    *keep_j = false;
                }
            }
        }
        peaks = peaks
            .into_iter()
            .zip(keep)
            .filter_map(|(p, k)| k.then_some(p))
            .collect();
    }

    peaks.retain(|&p| peak_prominence(x, p) >= prominence);
    peaks
}

/// Topographic prominence of the peak at `p`: height above the higher of
/// the two valley minima reached before a taller sample (or the edge).
fn peak_prominence(x: &[f32], p: usize) -> f32 {
    let mut left_min = x[p];
    for i in (0..p).rev() {
        if x[i] > x[p] {
            break;
        }
        left_min = left_min.min(x[i]);
    }
    let mut right_min = x[p];
    for &v in &x[p + 1..] {
        if v > x[p] {
            break;
        }
        right_min = right_min.min(v);
    }
    x[p] - left_min.max(right_min)
}

/// One scan over the trailing window: candidate boundary indices plus the
/// per-series angle and gradient columns the validator reuses.
#[derive(Debug)]
pub struct ScanOutput {
    /// Absolute buffer index of the first sample in the window.
    pub start: usize,
    /// Candidate indices, window-relative, ascending, deduplicated.
    pub candidates: Vec<usize>,
    /// Per-series angle columns over the window (flattened series layout).
    pub angles: Vec<Vec<f32>>,
    /// Per-series gradients over the window (flattened series layout).
    pub grads: Vec<Vec<f32>>,
}

/// Scan the trailing `detection.window` samples of `buffer`, extracting
/// boundary candidates from the exercise's segmenting series.
pub fn scan_window(
    buffer: &AngleBuffer,
    detection: &DetectionCfg,
    segmenting: &[SeriesRef],
) -> ScanOutput {
    let (start, angles) = buffer.series_window(detection.window);
    let grads: Vec<Vec<f32>> = angles.iter().map(|col| gradient(col)).collect();

    let mut candidates: Vec<usize> = Vec::new();
    for series in segmenting {
        let g = &grads[series.flat_index()];
        candidates.extend(find_gradient_peaks(
            g,
            detection.peak_height,
            detection.peak_distance,
            detection.peak_prominence,
        ));
    }
    candidates.sort_unstable();
    candidates.dedup();

    ScanOutput {
        start,
        candidates,
        angles,
        grads,
    }
}
