//! Tempo band selection and distance threshold classification.

use coach_config::SpeedCfg;
use coach_core::Speed;
use coach_core::evaluator::{classify_distance, classify_speed};
use rstest::rstest;

#[rstest]
#[case(1.0, Speed::Fast)]
#[case(1.9, Speed::Fast)]
#[case(2.0, Speed::Good)]
#[case(5.0, Speed::Good)]
#[case(8.0, Speed::Good)]
// Above the tolerance band yet past the slow cutoff: still "good".
#[case(9.0, Speed::Good)]
fn bands_around_a_five_second_mean(#[case] duration: f64, #[case] want: Speed) {
    let speed = SpeedCfg::default();
    assert_eq!(classify_speed(duration, 5.0, &speed), want);
}

#[test]
fn slow_band_needs_room_below_the_cutoff() {
    let speed = SpeedCfg::default();
    // Mean of 1s: 5s exceeds the tolerance band and sits below the 7s
    // cutoff, so it classifies as slow.
    assert_eq!(classify_speed(5.0, 1.0, &speed), Speed::Slow);
    assert_eq!(classify_speed(6.9, 1.0, &speed), Speed::Slow);
    assert_eq!(classify_speed(7.0, 1.0, &speed), Speed::Good);
}

#[rstest]
#[case(0.0, "Good 1", "Good 1", 1)]
#[case(1499.9, "Good 1", "Good 1", 1)]
#[case(1499.9, "low_range 2", "low_range 2", -1)]
// Exactly at threshold1 lands in the borderline band.
#[case(1500.0, "Good 1", "ok", 0)]
#[case(1999.9, "Good 1", "ok", 0)]
#[case(1999.9, "low_range 2", "bad", -1)]
#[case(2000.0, "Good 1", "bad", -1)]
#[case(5000.0, "low_range 2", "bad", -1)]
fn distance_thresholds(
    #[case] distance: f64,
    #[case] label: &str,
    #[case] want_correction: &str,
    #[case] want_score: i8,
) {
    let verdict = classify_distance(distance, label, 1500.0, 2000.0);
    assert_eq!(verdict.correction, want_correction);
    assert_eq!(verdict.score, want_score);
}
