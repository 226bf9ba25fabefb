//! Integration tests for the offline commands
//!
//! convert and inspect work without a service, so they can be driven
//! end to end through the real binary.

use std::path::PathBuf;
use std::process::Command;

fn splatgen_bin() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // Remove test binary name
    path.pop(); // Remove 'deps' directory
    path.push("splatgen");
    path
}

/// Minimal binary splat artifact: two vertices with SH color channels.
fn write_artifact(dir: &std::path::Path) -> PathBuf {
    let header = "ply\nformat binary_little_endian 1.0\nelement vertex 2\n\
                  property float x\nproperty float y\nproperty float z\n\
                  property float f_dc_0\nproperty float f_dc_1\nproperty float f_dc_2\n\
                  end_header\n";
    let mut data = header.as_bytes().to_vec();
    for record in [[0.0f32, 0.0, 0.0, 0.0, 0.0, 0.0], [2.0, 2.0, 2.0, 0.5, 0.5, 0.5]] {
        for value in record {
            data.extend_from_slice(&value.to_le_bytes());
        }
    }
    let path = dir.join("splat.ply");
    std::fs::write(&path, data).unwrap();
    path
}

#[test]
fn test_inspect_reports_header() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_artifact(dir.path());

    let output = Command::new(splatgen_bin())
        .args(["inspect", "--header-only"])
        .arg(&input)
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("vertices"), "stdout: {}", stdout);
    assert!(stdout.contains("2"), "stdout: {}", stdout);
    assert!(stdout.contains("f_dc_0"), "stdout: {}", stdout);
}

#[test]
fn test_convert_writes_obj() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_artifact(dir.path());
    let out = dir.path().join("points.obj");

    let output = Command::new(splatgen_bin())
        .arg("convert")
        .arg(&input)
        .arg("-o")
        .arg(&out)
        .args(["--format", "obj"])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let text = std::fs::read_to_string(&out).unwrap();
    assert_eq!(text.lines().filter(|l| l.starts_with("v ")).count(), 2);
}

#[test]
fn test_convert_json_output_is_valid() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_artifact(dir.path());
    let out = dir.path().join("points.ply");

    let output = Command::new(splatgen_bin())
        .arg("convert")
        .arg(&input)
        .arg("-o")
        .arg(&out)
        .args(["--format", "ply", "--json"])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let parsed: serde_json::Value =
        serde_json::from_str(&stdout).expect("Output should be valid JSON");
    assert_eq!(parsed["status"], "success");
    assert_eq!(parsed["data"]["points"], 2);
}

#[test]
fn test_unknown_format_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_artifact(dir.path());

    let output = Command::new(splatgen_bin())
        .arg("convert")
        .arg(&input)
        .args(["--format", "stl"])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
}
