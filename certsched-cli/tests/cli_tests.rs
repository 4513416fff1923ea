//! CLI integration tests

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Build command for the certsched-cli binary (finds it in target/debug when run via cargo test).
fn certsched_cli() -> Command {
    cargo_bin_cmd!("certsched-cli")
}

fn write_schedule(dir: &Path) -> std::path::PathBuf {
    let form = r#"{
        "dbReference": "DB0",
        "zdb": "0.21",
        "ipf": "2.3",
        "scheduleOfTests": [
            {
                "id": "c1", "boardId": "main",
                "circuitNumber": "1", "circuitDesignation": "C1"
            },
            {
                "id": "c2", "boardId": "main",
                "circuitNumber": "2", "circuitDesignation": "C2",
                "circuitDescription": "Cooker",
                "protectiveDeviceType": "MCB", "protectiveDeviceRating": "32",
                "liveSize": "6.0", "polarity": "Correct"
            }
        ]
    }"#;
    let path = dir.join("schedule.json");
    fs::write(&path, form).unwrap();
    path
}

fn write_proposals(dir: &Path) -> std::path::PathBuf {
    let proposals = r#"[
        {
            "label": "Kitchen Sockets",
            "protectiveDeviceType": "MCB",
            "protectiveDeviceCurve": "B",
            "protectiveDeviceRating": "32A",
            "liveSize": "4.0mm",
            "confidence": "high"
        },
        {
            "label": "Upstairs Lights",
            "protectiveDeviceType": "MCB",
            "protectiveDeviceCurve": "B",
            "protectiveDeviceRating": "6A",
            "liveSize": "1.0",
            "confidence": "medium"
        }
    ]"#;
    let path = dir.join("proposals.json");
    fs::write(&path, proposals).unwrap();
    path
}

#[test]
fn test_cli_help() {
    let mut cmd = certsched_cli();

    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Schedule of Test Results"));
}

#[test]
fn test_cli_version() {
    let mut cmd = certsched_cli();

    cmd.arg("--version");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_status_human() {
    let dir = TempDir::new().unwrap();
    let schedule = write_schedule(dir.path());

    let mut cmd = certsched_cli();
    cmd.arg("status").arg(&schedule);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Main CU (2 circuits)"))
        .stdout(predicate::str::contains("Cooker"))
        .stdout(predicate::str::contains("0 of 2 complete (0%)"));
}

#[test]
fn test_status_json() {
    let dir = TempDir::new().unwrap();
    let schedule = write_schedule(dir.path());

    let mut cmd = certsched_cli();
    cmd.arg("status").arg(&schedule).arg("--format").arg("json");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"total\": 2"))
        .stdout(predicate::str::contains("\"completed\": 0"));
}

#[test]
fn test_status_missing_file_fails() {
    let mut cmd = certsched_cli();
    cmd.arg("status").arg("does-not-exist.json");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn test_ingest_fills_blank_then_appends() {
    let dir = TempDir::new().unwrap();
    let schedule = write_schedule(dir.path());
    let proposals = write_proposals(dir.path());
    let output = dir.path().join("out.json");

    let mut cmd = certsched_cli();
    cmd.arg("ingest")
        .arg(&schedule)
        .arg(&proposals)
        .arg("--write")
        .arg("--output")
        .arg(&output);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("1 blank rows filled"))
        .stdout(predicate::str::contains("1 circuits appended"));

    let written = fs::read_to_string(&output).unwrap();
    let form: serde_json::Value = serde_json::from_str(&written).unwrap();
    let circuits = form["scheduleOfTests"].as_array().unwrap();
    assert_eq!(circuits.len(), 3);
    // The blank C1 was filled in place.
    assert_eq!(circuits[0]["circuitDescription"], "Kitchen Sockets");
    assert_eq!(circuits[0]["cpcSize"], "1.5");
    assert_eq!(circuits[0]["autoFilled"], true);
    // The non-blank C2 was untouched.
    assert_eq!(circuits[1]["circuitDescription"], "Cooker");
}

#[test]
fn test_ingest_unknown_board_fails() {
    let dir = TempDir::new().unwrap();
    let schedule = write_schedule(dir.path());
    let proposals = write_proposals(dir.path());

    let mut cmd = certsched_cli();
    cmd.arg("ingest")
        .arg(&schedule)
        .arg(&proposals)
        .arg("--board")
        .arg("garage");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("board 'garage' not found"));
}

#[test]
fn test_infill_empty_mode_preserves_values() {
    let dir = TempDir::new().unwrap();
    let schedule = write_schedule(dir.path());
    let output = dir.path().join("out.json");

    let mut cmd = certsched_cli();
    cmd.arg("infill")
        .arg(&schedule)
        .arg("N/A")
        .arg("--mode")
        .arg("empty")
        .arg("--write")
        .arg("--output")
        .arg(&output);
    cmd.assert().success();

    let written = fs::read_to_string(&output).unwrap();
    let form: serde_json::Value = serde_json::from_str(&written).unwrap();
    let circuits = form["scheduleOfTests"].as_array().unwrap();
    assert_eq!(circuits[0]["polarity"], "N/A");
    assert_eq!(circuits[1]["polarity"], "Correct");
}

#[test]
fn test_balance_reports_imbalance() {
    let dir = TempDir::new().unwrap();
    // Circuits 1/2/3 -> phases L1/L2/L3 at half rating: 10/10/5.
    let form = r#"{
        "scheduleOfTests": [
            {"id": "a", "circuitNumber": "1", "circuitDesignation": "C1", "protectiveDeviceRating": "20"},
            {"id": "b", "circuitNumber": "2", "circuitDesignation": "C2", "protectiveDeviceRating": "20"},
            {"id": "c", "circuitNumber": "3", "circuitDesignation": "C3", "protectiveDeviceRating": "10"}
        ]
    }"#;
    let path = dir.path().join("schedule.json");
    fs::write(&path, form).unwrap();

    let mut cmd = certsched_cli();
    cmd.arg("balance").arg(&path);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Imbalance: 40.0%"))
        .stdout(predicate::str::contains("exceeds 10% threshold"));

    let mut cmd = certsched_cli();
    cmd.arg("balance").arg(&path).arg("--fail-on-imbalance");
    cmd.assert().failure();
}
