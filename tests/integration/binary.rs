//! The compiled `find-templates` binary.

use std::process::Command;
use tempfile::TempDir;

fn find_templates() -> Command {
    Command::new(env!("CARGO_BIN_EXE_find-templates"))
}

#[test]
fn test_missing_config_fails_before_touching_output() {
    let temp = TempDir::new().unwrap();
    let out = temp.path().join("out");

    let output = find_templates()
        .current_dir(temp.path())
        .args(["--targets", "actives.smi", "--output"])
        .arg(&out)
        .output()
        .expect("Failed to run find-templates");

    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("--config"));
    assert!(!out.exists());
}

#[test]
fn test_missing_targets_fails_before_reading_config() {
    let temp = TempDir::new().unwrap();
    let out = temp.path().join("out");

    let output = find_templates()
        .current_dir(temp.path())
        .args(["--config", "does-not-exist.yml", "--output"])
        .arg(&out)
        .output()
        .expect("Failed to run find-templates");

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--targets"));
    assert!(!stderr.contains("does-not-exist.yml"));
    assert!(!out.exists());
}

#[test]
fn test_missing_config_file_is_reported() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join("actives.smi"), "CCO\n").unwrap();

    let output = find_templates()
        .current_dir(temp.path())
        .args([
            "--targets",
            "actives.smi",
            "--config",
            "missing.yml",
            "--output",
            "out",
        ])
        .output()
        .expect("Failed to run find-templates");

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("missing.yml"));
}
