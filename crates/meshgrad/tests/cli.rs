use std::fs;
use std::process::{Command, Output};

use serde_json::Value;
use tempfile::TempDir;

const PALETTE: &str = r##"colors = ["#ff0000", "#00ff00", "#0000ff", "#ffff00"]"##;

fn meshgrad(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_meshgrad"))
        .env("RUST_LOG", "warn")
        .env_remove("MESHGRAD_CONFIG")
        .args(args)
        .output()
        .expect("failed to run meshgrad")
}

fn json_report(output: &Output) -> Value {
    assert!(
        output.status.success(),
        "meshgrad failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout is a JSON report")
}

fn write_config(dir: &TempDir, body: &str) -> String {
    let path = dir.path().join("meshgrad.toml");
    fs::write(&path, format!("version = 1\n{PALETTE}\n{body}")).unwrap();
    path.display().to_string()
}

#[test]
fn animated_run_ticks_once_per_frame() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, "fps = 500\nphase_step = 0.5\n");

    let output = meshgrad(&["--config", &config, "--frames", "5", "--report", "json"]);
    let report = json_report(&output);

    assert_eq!(report["mode"], "animate");
    assert_eq!(report["ownership"], "self_owned");
    assert_eq!(report["stop"], "frame_budget");
    assert_eq!(report["frames"], 5);
    assert_eq!(report["ticks"], 5);
    assert_eq!(report["redraws"], 6);
    assert_eq!(report["surface_requests"], 6);
    assert_eq!(report["final_phase"].as_f64(), Some(2.5));
    assert_eq!(report["pending_after_teardown"], 0);
}

#[test]
fn seed_renders_a_single_still_frame() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, "seed = 0.75\n");

    let output = meshgrad(&["--config", &config, "--frames", "10", "--report", "json"]);
    let report = json_report(&output);

    assert_eq!(report["mode"], "still");
    assert!(report["ownership"].is_null());
    assert_eq!(report["stop"], "idle");
    assert_eq!(report["frames"], 0);
    assert_eq!(report["ticks"], 0);
    assert_eq!(report["redraws"], 1);
    assert_eq!(report["final_phase"].as_f64(), Some(0.75));
}

#[test]
fn command_line_colors_and_defaults_run_without_config() {
    let output = meshgrad(&[
        "--color", "#101010", "--color", "#202020", "--color", "#303030", "--color", "#404040",
        "--fps", "1000", "--frames", "2",
    ]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("mode:        animate"));
    assert!(stdout.contains("stopped: frame budget"));
}

#[test]
fn rejects_wrong_color_count() {
    let output = meshgrad(&[
        "--color", "#101010", "--color", "#202020", "--color", "#303030", "--frames", "1",
    ]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("exactly 4 colors, got 3"), "stderr: {stderr}");
}

#[test]
fn rejects_unsupported_config_version() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("meshgrad.toml");
    fs::write(&path, "version = 7\n").unwrap();

    let output = meshgrad(&["--config", &path.display().to_string(), "--frames", "1"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unsupported config version 7"), "stderr: {stderr}");
}

#[test]
fn reports_precached_effect() {
    let dir = TempDir::new().unwrap();
    let shader = dir.path().join("gradient.wgsl");
    fs::write(&shader, "@fragment fn main() {}").unwrap();
    let config = write_config(&dir, "fps = 50\n");

    let output = meshgrad(&[
        "--config",
        &config,
        "--shader",
        &shader.display().to_string(),
        "--duration",
        "200ms",
        "--report",
        "json",
    ]);
    let report = json_report(&output);

    assert_eq!(report["stop"], "duration_budget");
    let effect = report["effect"].as_str().expect("effect status");
    assert!(
        effect.starts_with("ready") || effect == "pending",
        "unexpected effect status {effect}"
    );
}
