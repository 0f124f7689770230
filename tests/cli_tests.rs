//! CLI integration tests
//!
//! Exercises the headless commands through the compiled binary.

use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn check_cmd() -> Command {
    Command::cargo_bin("gpu-p2p-check").unwrap()
}

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

// ─────────────────────────────────────────────────────────────────
// Help
// ─────────────────────────────────────────────────────────────────

#[test]
fn help_lists_commands() {
    check_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("analyze"))
        .stdout(predicate::str::contains("uuids"))
        .stdout(predicate::str::contains("tui"));
}

// ─────────────────────────────────────────────────────────────────
// Analyze
// ─────────────────────────────────────────────────────────────────

#[test]
fn analyze_passing_report() {
    check_cmd()
        .arg("analyze")
        .arg("--input")
        .arg(fixture("p2p_report_ok.txt"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Warning").not())
        .stdout(predicate::str::contains(
            "All GPUs are operating within expected bandwidth levels.",
        ));
}

#[test]
fn analyze_degraded_report() {
    check_cmd()
        .arg("analyze")
        .arg("--input")
        .arg(fixture("p2p_report_degraded.txt"))
        .assert()
        .code(3)
        .stdout(predicate::str::contains(
            "Warning: Low bandwidth between GPU 0 and GPU 2: 6.12 GB/s",
        ))
        .stdout(predicate::str::contains(
            "Warning: GPU 1 on-chip bandwidth is low: 887.5 GB/s",
        ))
        .stdout(predicate::str::contains(
            "Skipping line due to invalid data: 2  24.59  24.62 913.87  n/a",
        ))
        .stdout(predicate::str::contains(
            "Issues detected with GPU bandwidth. Check warnings in output.",
        ));
}

#[test]
fn analyze_report_without_matrix() {
    check_cmd()
        .arg("analyze")
        .arg("--input")
        .arg(fixture("p2p_report_no_matrix.txt"))
        .assert()
        .code(4)
        .stdout(predicate::str::contains(
            "Failed to find Unidirectional P2P matrix in output.",
        ));
}

#[test]
fn analyze_reads_stdin() {
    let report = fs::read_to_string(fixture("p2p_report_ok.txt")).unwrap();
    check_cmd()
        .arg("analyze")
        .write_stdin(report)
        .assert()
        .success();
}

#[test]
fn analyze_uses_configured_thresholds() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("strict.toml");
    fs::write(&config, "[thresholds]\non_chip_min = 1000.0\n").unwrap();

    check_cmd()
        .arg("--config")
        .arg(&config)
        .arg("analyze")
        .arg("--input")
        .arg(fixture("p2p_report_ok.txt"))
        .assert()
        .code(3)
        .stdout(predicate::str::contains(
            "Warning: GPU 0 on-chip bandwidth is low: 912.44 GB/s",
        ));
}

#[test]
fn analyze_missing_file_fails() {
    check_cmd()
        .arg("analyze")
        .arg("--input")
        .arg("/nonexistent/report.txt")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("/nonexistent/report.txt"));
}

// ─────────────────────────────────────────────────────────────────
// Run
// ─────────────────────────────────────────────────────────────────

#[test]
fn run_with_missing_benchmark_fails() {
    check_cmd()
        .arg("run")
        .arg("--benchmark")
        .arg("/nonexistent/p2pBandwidthLatencyTest")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("failed to launch"));
}

#[cfg(unix)]
#[test]
fn run_with_silent_benchmark_reports_missing_matrix() {
    check_cmd()
        .arg("run")
        .arg("--benchmark")
        .arg("true")
        .assert()
        .code(4);
}

// ─────────────────────────────────────────────────────────────────
// Config
// ─────────────────────────────────────────────────────────────────

#[test]
fn missing_config_file_exits_with_two() {
    check_cmd()
        .arg("--config")
        .arg("/nonexistent/gpu-p2p-check.toml")
        .arg("analyze")
        .write_stdin("")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("configuration file not found"));
}

#[test]
fn invalid_threshold_exits_with_two() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("bad.toml");
    fs::write(&config, "[thresholds]\nlow_link_min = -4.0\n").unwrap();

    check_cmd()
        .arg("--config")
        .arg(&config)
        .arg("analyze")
        .write_stdin("")
        .assert()
        .code(2);
}

// ─────────────────────────────────────────────────────────────────
// UUIDs
// ─────────────────────────────────────────────────────────────────

#[cfg(unix)]
#[test]
fn uuids_are_saved_as_json() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("uuid.toml");
    fs::write(
        &config,
        "[uuid]\ncommand = \"echo\"\nargs = [\"GPU 0: NVIDIA A100 (UUID: GPU-1234-5678)\"]\n",
    )
    .unwrap();
    let output = dir.path().join("gpu_uuids.json");

    check_cmd()
        .arg("--config")
        .arg(&config)
        .arg("uuids")
        .arg("--output")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("GPU 0: NVIDIA A100 (UUID: GPU-1234-5678)"))
        .stdout(predicate::str::contains("GPU UUIDs saved to"));

    let saved = fs::read_to_string(&output).unwrap();
    assert_eq!(
        saved,
        "[\n    {\n        \"gpu_name\": \"GPU 0: NVIDIA A100 (\",\n        \"uuid\": \"GPU-1234-5678)\"\n    }\n]"
    );
}

#[cfg(unix)]
#[test]
fn uuids_default_output_is_in_working_directory() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("gpu-p2p-check.toml"),
        "[uuid]\ncommand = \"echo\"\nargs = [\"GPU 3: H100 (UUID: GPU-ffff)\"]\n",
    )
    .unwrap();

    check_cmd()
        .current_dir(dir.path())
        .arg("uuids")
        .assert()
        .success();

    let saved = fs::read_to_string(dir.path().join("gpu_uuids.json")).unwrap();
    assert!(saved.contains("\"uuid\": \"GPU-ffff)\""));
}

#[test]
fn uuids_with_missing_command_fails() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("uuid.toml");
    fs::write(&config, "[uuid]\ncommand = \"definitely-not-nvidia-smi\"\n").unwrap();

    check_cmd()
        .arg("--config")
        .arg(&config)
        .arg("uuids")
        .arg("--output")
        .arg(dir.path().join("gpu_uuids.json"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error"));
}
