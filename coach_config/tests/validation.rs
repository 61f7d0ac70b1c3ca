use coach_config::{Config, load_toml};
use rstest::rstest;

const EXERCISE_TABLE: &str = r#"
[exercises.bicep_curls]
segmenting = [
    { group = "right_shoulder", plane = "xz" },
    { group = "left_elbow", plane = "xz" },
]
amplitude_span = [0, 1]
threshold1 = 1500.0
threshold2 = 2000.0
"#;

#[test]
fn builtin_config_validates() {
    Config::builtin().validate().expect("builtin is valid");
}

#[test]
fn defaults_fill_missing_sections() {
    let cfg = load_toml(EXERCISE_TABLE).expect("parse TOML");
    cfg.validate().expect("defaults are valid");
    assert_eq!(cfg.detection.scan_stride, 10);
    assert_eq!(cfg.detection.window, 500);
    assert_eq!(cfg.evaluation.task_timeout_ms, 5_000);
    assert_eq!(cfg.exercises.len(), 1);
}

#[rstest]
#[case::zero_scan_stride("scan_stride = 0", "scan_stride must be >= 1")]
#[case::window_not_exceeding_min_samples("window = 15\nmin_samples = 15", "window must exceed")]
fn rejects_bad_detection_values(#[case] overrides: &str, #[case] expected: &str) {
    let toml = format!("[detection]\n{overrides}\n{EXERCISE_TABLE}");
    let cfg = load_toml(&toml).expect("parse TOML");
    let err = cfg.validate().expect_err("invalid detection section");
    assert!(
        format!("{err}").contains(expected),
        "missing {expected:?} in {err}"
    );
}

#[test]
fn rejects_missing_exercises() {
    let cfg = load_toml("").expect("parse TOML");
    let err = cfg.validate().expect_err("no exercises");
    assert!(format!("{err}").contains("at least one [exercises"));
}

#[test]
fn rejects_threshold_inversion() {
    let toml = r#"
[exercises.bicep_curls]
segmenting = [{ group = "right_shoulder", plane = "xz" }]
threshold1 = 2000.0
threshold2 = 1500.0
"#;
    let cfg = load_toml(toml).expect("parse TOML");
    let err = cfg.validate().expect_err("threshold order");
    assert!(format!("{err}").contains("threshold1 must be below threshold2"));
}

#[test]
fn rejects_amplitude_span_out_of_range() {
    let toml = r#"
[exercises.bicep_curls]
segmenting = [{ group = "right_shoulder", plane = "xz" }]
amplitude_span = [2]
threshold1 = 1500.0
threshold2 = 2000.0
"#;
    let cfg = load_toml(toml).expect("parse TOML");
    let err = cfg.validate().expect_err("span index out of range");
    assert!(format!("{err}").contains("amplitude_span index 2 out of range"));
}

#[test]
fn rejects_unknown_plane_name() {
    let toml = r#"
[exercises.bicep_curls]
segmenting = [{ group = "right_shoulder", plane = "zz" }]
threshold1 = 1500.0
threshold2 = 2000.0
"#;
    assert!(load_toml(toml).is_err());
}
