use std::fs;
use std::process::Command;

#[test]
fn test_cli_derives_output_path() {
    let temp_dir = tempfile::tempdir().unwrap();
    let input = temp_dir.path().join("urls.txt");
    fs::write(&input, "b\na\nb\nc\na\n").unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_linefold"))
        .arg(&input)
        .arg("--memory-budget")
        .arg("2")
        .arg("--temp-dir")
        .arg(temp_dir.path().join("scratch"))
        .output()
        .expect("Failed to run linefold");

    assert!(
        output.status.success(),
        "linefold failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let result = fs::read_to_string(temp_dir.path().join("urls_deduplicated.txt")).unwrap();
    assert_eq!(result.lines().collect::<Vec<_>>(), vec!["b", "a", "c"]);
}

#[test]
fn test_cli_report_json() {
    let temp_dir = tempfile::tempdir().unwrap();
    let input = temp_dir.path().join("data.log");
    let out = temp_dir.path().join("unique.log");
    fs::write(&input, "x\ny\nx\n").unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_linefold"))
        .arg(&input)
        .arg("-o")
        .arg(&out)
        .arg("--report-json")
        .arg("--temp-dir")
        .arg(temp_dir.path().join("scratch"))
        .output()
        .expect("Failed to run linefold");

    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["output_lines"], 2);
    assert_eq!(report["direct_copy"], true);
    assert_eq!(report["chunks"].as_array().unwrap().len(), 1);
}

#[test]
fn test_cli_missing_input_fails() {
    let temp_dir = tempfile::tempdir().unwrap();
    let status = Command::new(env!("CARGO_BIN_EXE_linefold"))
        .arg(temp_dir.path().join("nothing.txt"))
        .arg("--temp-dir")
        .arg(temp_dir.path().join("scratch"))
        .status()
        .expect("Failed to run linefold");

    assert!(!status.success());
}
