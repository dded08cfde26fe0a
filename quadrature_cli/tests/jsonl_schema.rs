use assert_cmd::Command;
use rstest::rstest;
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

fn write_valid_config(dir: &tempfile::TempDir) -> PathBuf {
    let toml = r#"
[pins]
phase_a = 18
phase_b = 19
index = 21

[encoder]
pulses_per_rev = 1024
use_index = true
"#;
    let path = dir.path().join("cfg.toml");
    fs::write(&path, toml).unwrap();
    path
}

/// Run `simulate --json` and parse every stdout line.
fn simulate_json(extra: &[&str]) -> Vec<serde_json::Value> {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);
    let mut cmd = Command::cargo_bin("quadrature").unwrap();
    cmd.arg("--json")
        .arg("--log-level")
        .arg("error")
        .arg("--config")
        .arg(&cfg)
        .arg("simulate");
    for a in extra {
        cmd.arg(a);
    }
    let out = cmd.assert().success().get_output().stdout.clone();
    let stdout = String::from_utf8_lossy(&out);
    stdout
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| {
            serde_json::from_str(l).unwrap_or_else(|e| panic!("bad JSON line {l:?}: {e}"))
        })
        .collect()
}

#[rstest]
fn status_lines_have_stable_schema() {
    let lines = simulate_json(&["--cps", "4096", "--seconds", "0.2"]);
    assert_eq!(lines.len(), 20);
    for v in &lines {
        let obj = v.as_object().expect("object");
        for key in [
            "t_us",
            "position",
            "cps",
            "rpm",
            "index",
            "window_cps",
            "edge_cps",
            "stalled",
        ] {
            assert!(obj.contains_key(key), "missing {key} in {v}");
        }
    }
    assert_eq!(lines[0]["t_us"], 10_000);
}

#[rstest]
fn one_rev_per_second_reads_60_rpm() {
    let lines = simulate_json(&["--cps", "4096", "--seconds", "2"]);
    let last = lines.last().expect("at least one tick");
    let rpm = last["rpm"].as_f64().unwrap();
    assert!((rpm - 60.0).abs() < 1.5, "rpm = {rpm}");
    let pos = last["position"].as_i64().unwrap();
    assert!((8190..=8192).contains(&pos), "position = {pos}");
    assert!(lines.iter().any(|v| v["index"] == true));
    assert!(lines.iter().all(|v| v["stalled"] == false));
}

#[rstest]
#[case("software")]
#[case("hardware")]
fn reverse_rate_is_negative(#[case] mode: &str) {
    let lines = simulate_json(&["--cps=-2048", "--seconds", "1", "--mode", mode]);
    let last = lines.last().expect("at least one tick");
    assert!(last["position"].as_i64().unwrap() < -2000);
    let rpm = last["rpm"].as_f64().unwrap();
    assert!((rpm + 30.0).abs() < 3.0, "rpm = {rpm}");
}

#[rstest]
fn hardware_path_reports_no_edge_rate() {
    let lines = simulate_json(&["--cps", "4096", "--seconds", "0.5", "--mode", "hardware"]);
    assert!(lines.iter().all(|v| v["edge_cps"].is_null()));
    let pos = lines.last().unwrap()["position"].as_i64().unwrap();
    assert_eq!(pos % 4, 0);
}

#[rstest]
fn no_motion_reads_stalled_zero() {
    let lines = simulate_json(&["--cps", "0", "--seconds", "0.1"]);
    assert!(!lines.is_empty());
    for v in &lines {
        assert_eq!(v["stalled"], true);
        assert_eq!(v["cps"].as_f64().unwrap(), 0.0);
        assert_eq!(v["position"], 0);
    }
}
