//! Schema of the machine-readable stdout stream.

use assert_cmd::prelude::*;
use rstest::rstest;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use tempfile::tempdir;

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

fn write_fixture(dir: &tempfile::TempDir) -> (PathBuf, PathBuf) {
    let wave = cycle_wave();
    let mut lines = String::new();
    for _ in 0..3 {
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
    let recording = dir.path().join("recording.jsonl");
    fs::write(&recording, lines).unwrap();

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
    let experts = dir.path().join("experts.json");
    fs::write(&experts, archive.to_string()).unwrap();
    (recording, experts)
}

const GROUPS: [&str; 4] = [
    "right_shoulder",
    "left_shoulder",
    "right_elbow",
    "left_elbow",
];

/// Every stdout line is JSON: feedback records followed by one summary.
#[rstest]
fn feedback_stream_schema() {
    let dir = tempdir().unwrap();
    let (recording, experts) = write_fixture(&dir);

    let mut cmd = Command::cargo_bin("coach_cli").unwrap();
    cmd.arg("--json")
        .args(["--log-level", "warn"])
        .args(["run", "--exercise", "bicep_curls", "--emit-feedback"])
        .arg("--experts")
        .arg(&experts)
        .arg("--input")
        .arg(&recording);

    let output = cmd.assert().success().get_output().stdout.clone();
    let text = String::from_utf8(output).unwrap();
    let lines: Vec<serde_json::Value> = text
        .lines()
        .map(|l| serde_json::from_str(l).expect("stdout line is JSON"))
        .collect();
    assert!(lines.len() >= 2, "feedback lines plus a summary");

    let (summary, feedback) = lines.split_last().unwrap();
    assert_eq!(summary["event"], "summary");
    assert!(summary["reps"].as_u64().unwrap() >= 1);

    for fb in feedback {
        assert!(matches!(
            fb["speed"].as_str().unwrap(),
            "fast" | "slow" | "good"
        ));
        for key in GROUPS {
            let score = fb["evaluation"][key].as_i64().unwrap();
            assert!((-1..=1).contains(&score));
            let correction = fb["correction"][key].as_str().unwrap();
            assert!(correction.ends_with(key));
        }
    }
}
