//! Property tests over segmentation primitives.

use coach_config::DetectionCfg;
use coach_core::buffer::AngleBuffer;
use coach_core::model::{JointGroup, Plane, SeriesRef};
use coach_core::segment::{find_gradient_peaks, gradient, scan_window};
use coach_traits::RawSample;
use proptest::prelude::*;

fn sample(v: f32) -> RawSample {
    RawSample {
        right_shoulder: vec![v; 3],
        left_shoulder: vec![v; 3],
        right_elbow: vec![v; 3],
        left_elbow: vec![v; 3],
    }
}

fn angles_strategy() -> impl Strategy<Value = Vec<f32>> {
    prop::collection::vec(0.0f32..180.0, 20..200)
}

proptest! {
    #[test]
    fn gradient_is_length_preserving(xs in angles_strategy()) {
        prop_assert_eq!(gradient(&xs).len(), xs.len());
    }

    #[test]
    fn gradient_of_constant_signal_is_zero(v in 0.0f32..180.0, n in 2usize..100) {
        let xs = vec![v; n];
        for g in gradient(&xs) {
            prop_assert_eq!(g, 0.0);
        }
    }

    #[test]
    fn peaks_are_strictly_increasing_and_in_range(xs in angles_strategy()) {
        let g = gradient(&xs);
        let peaks = find_gradient_peaks(&g, 1.5, 20, 0.5);
        for w in peaks.windows(2) {
            prop_assert!(w[0] < w[1]);
            prop_assert!(w[1] - w[0] >= 20);
        }
        for &p in &peaks {
            prop_assert!(p < g.len());
            prop_assert!(g[p] >= 1.5);
        }
    }

    #[test]
    fn scan_is_deterministic(xs in angles_strategy()) {
        let detection = DetectionCfg::default();
        let segmenting: Vec<SeriesRef> = JointGroup::ALL
            .into_iter()
            .map(|group| SeriesRef { group, plane: Plane::Xz })
            .collect();
        let mut buffer = AngleBuffer::new();
        for &v in &xs {
            buffer.append(&sample(v)).expect("lockstep sample");
        }
        let a = scan_window(&buffer, &detection, &segmenting);
        let b = scan_window(&buffer, &detection, &segmenting);
        prop_assert_eq!(a.start, b.start);
        prop_assert_eq!(a.candidates, b.candidates);
        prop_assert_eq!(a.angles, b.angles);
        prop_assert_eq!(a.grads, b.grads);
    }

    #[test]
    fn scan_window_is_bounded(xs in prop::collection::vec(0.0f32..180.0, 501..600)) {
        let detection = DetectionCfg::default();
        let segmenting = vec![SeriesRef { group: JointGroup::RightShoulder, plane: Plane::Xz }];
        let mut buffer = AngleBuffer::new();
        for &v in &xs {
            buffer.append(&sample(v)).expect("lockstep sample");
        }
        let scan = scan_window(&buffer, &detection, &segmenting);
        prop_assert_eq!(scan.start, xs.len() - 500);
        for col in &scan.angles {
            prop_assert_eq!(col.len(), 500);
        }
    }
}
