//! Integration tests for the rackforge binary.
//!
//! These tests run the compiled binary on the demo system description and
//! inspect the files it writes.

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn binary_path() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_rackforge"))
}

fn demo_config() -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("demos");
    path.push("system.yaml");
    path
}

fn run_binary(args: &[&OsStr]) -> Output {
    Command::new(binary_path())
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to run binary")
}

fn run_on(config: &Path, out_dir: &Path, extra: &[&str]) -> Output {
    let mut args = vec![config.as_os_str(), OsStr::new("-o"), out_dir.as_os_str()];
    args.extend(extra.iter().copied().map(OsStr::new));
    run_binary(&args)
}

fn listing(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .flatten()
        .filter(|e| e.path().is_file())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

// ─── Demo system ──────────────────────────────────────────────────────────────

#[test]
fn test_demo_writes_every_artifact() {
    let tmp = tempfile::tempdir().unwrap();
    let out_dir = tmp.path().join("output");
    let output = run_on(&demo_config(), &out_dir, &[]);
    assert!(
        output.status.success(),
        "Binary exited with {:?}:\nstderr: {}",
        output.status.code(),
        String::from_utf8_lossy(&output.stderr)
    );
    assert_eq!(
        listing(&out_dir),
        vec![
            "cable_lengths.csv",
            "cable_lengths.html",
            "computer_info.csv",
            "computer_info.html",
            "data_network.dot",
            "power_ups.dot",
            "rack_layout.dot",
            "video.dot",
        ]
    );
}

#[test]
fn test_demo_artifact_contents() {
    let tmp = tempfile::tempdir().unwrap();
    let output = run_on(&demo_config(), tmp.path(), &["--strict", "-q"]);
    assert!(output.status.success());

    let rack = fs::read_to_string(tmp.path().join("rack_layout.dot")).unwrap();
    assert!(rack.contains("\"rack1_front\" ["));
    assert!(rack.contains("\"rack2_front\" ["));
    assert!(rack.contains("spacer_0"));

    let inventory = fs::read_to_string(tmp.path().join("computer_info.csv")).unwrap();
    assert!(inventory.contains("IG 3,902-00011,1,Simulation,00:1B:21:3A:4F:10,192.168.2.13"));
    assert!(inventory.contains("IG 3,902-00011,2,Management,,10.0.0.103"));
    assert!(inventory.contains("Operator PC,901-00001,,,,"));

    let power = fs::read_to_string(tmp.path().join("power_ups.dot")).unwrap();
    assert!(power.starts_with("graph \"Power/UPS\" {"));
    assert!(!power.contains("subgraph"));
}

// ─── Failures ─────────────────────────────────────────────────────────────────

const BROKEN: &str = "\
racks:
  - rack: {id: r1, total_u: 10}
    front:
      - {name: A, start_u: 10, units: 1}
      - {name: B, start_u: 9, units: 1}
wiring_layers:
  - name: Good
    connections:
      - {from: A, to: B}
  - name: Bad
    connections:
      - {from: A, to: Nowhere}
";

#[test]
fn test_lenient_skips_broken_layer() {
    let tmp = tempfile::tempdir().unwrap();
    let config = tmp.path().join("system.yaml");
    fs::write(&config, BROKEN).unwrap();
    let out_dir = tmp.path().join("out");
    let output = run_on(&config, &out_dir, &[]);
    assert!(output.status.success());
    let files = listing(&out_dir);
    assert!(files.contains(&"good.dot".to_string()));
    assert!(!files.contains(&"bad.dot".to_string()));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Nowhere"), "stderr: {stderr}");
}

#[test]
fn test_strict_writes_nothing() {
    let tmp = tempfile::tempdir().unwrap();
    let config = tmp.path().join("system.yaml");
    fs::write(&config, BROKEN).unwrap();
    let out_dir = tmp.path().join("out");
    let output = run_on(&config, &out_dir, &["--strict"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(!out_dir.exists());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error: wiring layer 'Bad'"), "stderr: {stderr}");
}

#[test]
fn test_missing_config_fails() {
    let tmp = tempfile::tempdir().unwrap();
    let output = run_on(&tmp.path().join("absent.yaml"), tmp.path(), &[]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("absent.yaml"));
}

#[test]
fn test_version_flag() {
    let output = run_binary(&[OsStr::new("--version")]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).starts_with("rackforge "));
}
