#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Expert archive JSON: arbitrary input must yield Ok or a clean error,
    // never a panic, and the shape checks must hold on every Ok.
    if let Ok(archive) = coach_config::parse_archive_json(data) {
        for reps in archive.values() {
            assert!(!reps.is_empty());
            for rep in reps {
                assert!(rep.duration > 0.0);
                for rows in rep.trajectories.values() {
                    assert!(rows.iter().all(|row| row.len() == 3));
                }
            }
        }
    }
});
