//! Candidate peak validation: decides which gradient peaks are genuine
//! repetition boundaries.
//!
//! A rejected candidate is ordinary control flow; only accepted peaks are
//! reported back to the engine.

use crate::model::SeriesRef;
use crate::segment::ScanOutput;
use coach_config::DetectionCfg;

/// Validate one candidate (window-relative) against an optional previously
/// accepted peak (absolute). Returns the refined absolute peak index when
/// all gates pass.
///
/// `amplitude_span` holds indices into `segmenting` selecting the series
/// the excursion-ordering and amplitude gates inspect.
pub fn refine_candidate(
    scan: &ScanOutput,
    detection: &DetectionCfg,
    segmenting: &[SeriesRef],
    amplitude_span: &[usize],
    candidate: usize,
    last_peak: Option<usize>,
) -> Option<usize> {
    let window_len = scan.angles.first().map_or(0, Vec::len);
    if candidate >= window_len || segmenting.is_empty() {
        return None;
    }
    let absolute = scan.start + candidate;

    // 1. Spacing against the previous accepted peak, or against the set
    //    start when there is none yet. Both compare absolute indices; the
    //    scan window offset never tightens the gate.
    let spaced = match last_peak {
        None => absolute > detection.min_peak_spacing,
        Some(last) => absolute > last + detection.min_peak_spacing,
    };
    if !spaced {
        return None;
    }

    // 2. Local refinement window, clipped to the scan window.
    let lo = candidate.saturating_sub(detection.refine_half_width);
    let hi = (candidate + detection.refine_half_width).min(window_len);
    if lo >= hi {
        return None;
    }

    // 3. Refined location: rounded mean of each segmenting series' argmax
    //    gradient inside the local window.
    let mut argmax_sum = 0usize;
    for series in segmenting {
        let g = &scan.grads[series.flat_index()][lo..hi];
        let mut best = 0usize;
        for (i, &v) in g.iter().enumerate() {
            if v > g[best] {
                best = i;
            }
        }
        argmax_sum += best;
    }
    let refined_local = (argmax_sum as f32 / segmenting.len() as f32).round() as usize;
    let refined = lo + refined_local.min(hi - lo - 1);

    // 4. Gradient excursion gate over the local window.
    let mut grad_max = f32::NEG_INFINITY;
    let mut grad_min = f32::INFINITY;
    for series in segmenting {
        for &v in &scan.grads[series.flat_index()][lo..hi] {
            grad_max = grad_max.max(v);
            grad_min = grad_min.min(v);
        }
    }
    if !(grad_max > detection.gradient_gate || grad_min < -detection.gradient_gate) {
        return None;
    }

    // 5. Angle excursion ordering over window start..=candidate, restricted
    //    to the amplitude-span series: the swing must go up after it went
    //    down, so the (first) maximum location must follow the minimum's.
    let mut max_val = f32::NEG_INFINITY;
    let mut min_val = f32::INFINITY;
    let mut max_loc = 0usize;
    let mut min_loc = 0usize;
    for row in 0..=candidate {
        for &span_idx in amplitude_span {
            let series = segmenting[span_idx];
            let v = scan.angles[series.flat_index()][row];
            if v > max_val {
                max_val = v;
                max_loc = row;
            }
            if v < min_val {
                min_val = v;
                min_loc = row;
            }
        }
    }
    if max_loc <= min_loc {
        return None;
    }

    // 6. Exercise amplitude gate.
    if !(min_val < detection.amplitude_low && max_val > detection.amplitude_high) {
        return None;
    }

    // 7. Accepted.
    Some(scan.start + refined)
}
