use assert_cmd::prelude::*;
use predicates::prelude::*;
use rstest::rstest;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use tempfile::tempdir;

// One synthetic repetition cycle at 20 Hz: rest, steep lift, hold, slow
// return. Matches the built-in bicep_curls detection tuning.
fn cycle_wave() -> Vec<f32> {
    let mut v = Vec::with_capacity(100);
    v.extend(std::iter::repeat_n(30.0f32, 20));
    for step in 1..=6 {
        v.push(30.0 + 15.0 * step as f32);
    }
    v.extend(std::iter::repeat_n(120.0f32, 30));
    for step in 1..=44 {
        v.push(120.0 - 90.0 * step as f32 / 44.0);
    }
    v
}

fn write_recording(dir: &tempfile::TempDir, cycles: usize) -> PathBuf {
    let wave = cycle_wave();
    let mut lines = String::new();
    for _ in 0..cycles {
        for &v in &wave {
            let row = serde_json::json!({
                "right_shoulder": [v, v, v],
                "left_shoulder": [v, v, v],
                "right_elbow": [v, v, v],
                "left_elbow": [v, v, v],
            });
            lines.push_str(&row.to_string());
            lines.push('\n');
        }
    }
    let path = dir.path().join("recording.jsonl");
    fs::write(&path, lines).unwrap();
    path
}

fn write_archive(dir: &tempfile::TempDir) -> PathBuf {
    // Expert trajectory aligned with refined boundaries: the cycle rotated
    // to start at the rise.
    let wave = cycle_wave();
    let rotated: Vec<Vec<f32>> = wave
        .iter()
        .cycle()
        .skip(20)
        .take(wave.len())
        .map(|&v| vec![v, v, v])
        .collect();
    let groups = serde_json::json!({
        "right_shoulder": rotated,
        "left_shoulder": rotated,
        "right_elbow": rotated,
        "left_elbow": rotated,
    });
    let archive = serde_json::json!({
        "bicep_curls": [
            { "label": "Good 1", "duration": 5.0, "trajectories": groups },
        ],
    });
    let path = dir.path().join("experts.json");
    fs::write(&path, archive.to_string()).unwrap();
    path
}

#[rstest]
#[case(&["--help"], 0, "Usage:", "stdout")]
#[case(&["run", "--experts", "X"], 2, "required", "stderr")]
fn cli_table_cases(
    #[case] args: &[&str],
    #[case] exit_code: i32,
    #[case] needle: &str,
    #[case] stream: &str,
) {
    let mut cmd = Command::cargo_bin("coach_cli").unwrap();
    for a in args {
        cmd.arg(a);
    }
    let assert = cmd.assert().code(exit_code);
    let pred = predicate::str::contains(needle);
    if stream == "stdout" {
        assert.stdout(pred);
    } else {
        assert.stderr(pred);
    }
}

#[test]
fn run_evaluates_a_recording() {
    let dir = tempdir().unwrap();
    let recording = write_recording(&dir, 3);
    let experts = write_archive(&dir);

    let mut cmd = Command::cargo_bin("coach_cli").unwrap();
    cmd.args(["run", "--exercise", "bicep_curls"])
        .arg("--experts")
        .arg(&experts)
        .arg("--input")
        .arg(&recording);

    let output = cmd.assert().success().get_output().stdout.clone();
    let text = String::from_utf8(output).unwrap();
    let summary: serde_json::Value =
        serde_json::from_str(text.lines().last().unwrap()).unwrap();
    assert_eq!(summary["event"], "summary");
    assert_eq!(summary["exercise"], "bicep_curls");
    assert_eq!(summary["samples"], 300);
    assert_eq!(summary["reps"], 2);
    assert_eq!(summary["skipped_reps"], 0);
}

#[test]
fn unknown_exercise_fails_with_guidance() {
    let dir = tempdir().unwrap();
    let recording = write_recording(&dir, 1);
    let experts = write_archive(&dir);

    let mut cmd = Command::cargo_bin("coach_cli").unwrap();
    cmd.args(["run", "--exercise", "jumping_jacks"])
        .arg("--experts")
        .arg(&experts)
        .arg("--input")
        .arg(&recording);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("jumping_jacks"));
}

#[test]
fn check_validates_config_and_archive() {
    let dir = tempdir().unwrap();
    let experts = write_archive(&dir);

    let mut cmd = Command::cargo_bin("coach_cli").unwrap();
    cmd.arg("check").arg("--experts").arg(&experts);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("config ok"))
        .stdout(predicate::str::contains("bicep_curls: 1 expert reps"));
}

#[test]
fn check_rejects_archive_without_good_rep() {
    let dir = tempdir().unwrap();
    let wave: Vec<Vec<f32>> = cycle_wave().iter().map(|&v| vec![v, v, v]).collect();
    let groups = serde_json::json!({
        "right_shoulder": wave,
        "left_shoulder": wave,
        "right_elbow": wave,
        "left_elbow": wave,
    });
    let archive = serde_json::json!({
        "bicep_curls": [
            { "label": "low_range 2", "duration": 5.0, "trajectories": groups },
        ],
    });
    let path = dir.path().join("experts.json");
    fs::write(&path, archive.to_string()).unwrap();

    let mut cmd = Command::cargo_bin("coach_cli").unwrap();
    cmd.arg("check").arg("--experts").arg(&path);
    cmd.assert().failure();
}

#[test]
fn custom_config_overrides_builtin() {
    let dir = tempdir().unwrap();
    let toml = r#"
[detection]
scan_stride = 10
min_samples = 15
window = 500
peak_height = 1.5
peak_distance = 20
peak_prominence = 0.5
refine_half_width = 4
min_peak_spacing = 15
gradient_gate = 5.0
amplitude_low = 50.0
amplitude_high = 100.0

[exercises.bicep_curls]
segmenting = [
    { group = "right_shoulder", plane = "xz" },
    { group = "left_shoulder", plane = "xz" },
    { group = "right_elbow", plane = "xz" },
    { group = "left_elbow", plane = "xz" },
]
amplitude_span = [0, 3]
threshold1 = 1500.0
threshold2 = 2000.0
"#;
    let cfg = dir.path().join("coach.toml");
    fs::write(&cfg, toml).unwrap();

    let mut cmd = Command::cargo_bin("coach_cli").unwrap();
    cmd.arg("--config").arg(&cfg).arg("check");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("config ok: 1 exercises"));
}
