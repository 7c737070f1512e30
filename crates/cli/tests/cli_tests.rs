//! CLI integration tests

use std::process::{Command, Output};

fn hitp(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_hitp"))
        .args(args)
        .env_remove("HITP_API_URL")
        .output()
        .expect("Failed to execute command")
}

/// Test that the CLI shows help
#[test]
fn test_cli_help() {
    let output = hitp(&["--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI help should succeed");
    assert!(stdout.contains("Spotify Hit Predictor"), "Should show app name");
    assert!(stdout.contains("predict"), "Should show predict command");
    assert!(stdout.contains("schema"), "Should show schema command");
    assert!(stdout.contains("model"), "Should show model command");
    assert!(stdout.contains("--api-url"), "Should show api-url option");
}

/// Test that the CLI shows version
#[test]
fn test_cli_version() {
    let output = hitp(&["--version"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI version should succeed");
    assert!(stdout.contains("hitp"), "Should show binary name");
}

/// Test that every feature has a flag
#[test]
fn test_predict_help() {
    let output = hitp(&["predict", "--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Predict help should succeed");
    for flag in [
        "--danceability",
        "--energy",
        "--key",
        "--loudness",
        "--mode",
        "--acousticness",
        "--instrumentalness",
        "--valence",
        "--duration-ms",
        "--time-signature",
        "--chorus-hit",
        "--sections",
        "--is-vocal-track",
        "--local",
        "--model",
    ] {
        assert!(stdout.contains(flag), "Should show {} option", flag);
    }
}

/// --model only makes sense with --local
#[test]
fn test_model_requires_local() {
    let output = hitp(&["predict", "--model", "model.onnx"]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success());
    assert!(stderr.contains("--local"), "Should name the missing flag");
}

/// A local prediction against a missing artifact fails with a warning
#[test]
fn test_local_predict_missing_model() {
    let dir = tempfile::tempdir().unwrap();
    let model = dir.path().join("spotify_model_pipeline.onnx");
    let output = hitp(&[
        "predict",
        "--local",
        "--model",
        model.to_str().unwrap(),
        "--loudness",
        "-7.5",
    ]);

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success());
    assert!(stdout.is_empty(), "Warnings must not reach stdout: {}", stdout);
    assert!(stderr.contains("Model not loaded"));
    assert!(stderr.contains("not found"));
}

/// JSON output stays machine-readable when the model is missing
#[test]
fn test_local_predict_json_keeps_stdout_clean() {
    let dir = tempfile::tempdir().unwrap();
    let model = dir.path().join("spotify_model_pipeline.onnx");
    let output = hitp(&[
        "--format",
        "json",
        "predict",
        "--local",
        "--model",
        model.to_str().unwrap(),
    ]);

    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    assert!(stderr.contains("Model not loaded"));
}

/// Invalid values are reported per field before any model is touched
#[test]
fn test_local_predict_invalid_value() {
    let output = hitp(&["predict", "--local", "--energy", "1.5"]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success());
    assert!(stderr.contains("energy must be between 0 and 1"));
}

/// Test format option
#[test]
fn test_format_option() {
    let output = hitp(&["--format", "yaml", "schema"]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success(), "Unknown format should be rejected");
    assert!(stderr.contains("invalid value"));
}

/// Test invalid command
#[test]
fn test_invalid_command() {
    let output = hitp(&["invalid-command"]);

    assert!(!output.status.success(), "Invalid command should fail");
}

/// Unreachable server is a clean error
#[test]
fn test_unreachable_server() {
    let output = hitp(&["--api-url", "http://127.0.0.1:1", "model"]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success());
    assert!(stderr.contains("Failed to send request"));
}
