use std::process::Command;

const USAGE_LINE: &str = "Usage: usage-report-refresh <excel> <public/INDEX.html>";

#[test]
fn wrong_argument_count_prints_usage_and_exits_1() {
    let output = Command::new(env!("CARGO_BIN_EXE_usage-report-refresh"))
        .arg("only-one.xlsx")
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(USAGE_LINE), "stdout was {stdout:?}");
}

#[test]
fn no_arguments_also_prints_usage() {
    let output = Command::new(env!("CARGO_BIN_EXE_usage-report-refresh"))
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stdout).contains(USAGE_LINE));
}

#[test]
fn unreadable_workbook_fails_without_touching_report() {
    let dir = tempfile::tempdir().unwrap();
    let html = dir.path().join("INDEX.html");
    std::fs::write(&html, "<div id=\"overview\"></div>").unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_usage-report-refresh"))
        .arg(dir.path().join("missing.xlsx"))
        .arg(&html)
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert_eq!(std::fs::read_to_string(&html).unwrap(), "<div id=\"overview\"></div>");
    assert!(!dir.path().join("data").exists());
}
