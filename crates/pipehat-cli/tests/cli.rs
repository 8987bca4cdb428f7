//! End-to-end CLI tests against temporary message files.

use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const ADT: &str =
    "MSH|^~\\&|A|B|C|D|20230101||ADT^A01|MSG1|P|2.3\rPID|1||12345^^^MRN||DOE^JOHN\r";

fn write_message(dir: &TempDir, name: &str, text: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, text).unwrap();
    path
}

fn pipehat() -> Command {
    let mut cmd = Command::cargo_bin("pipehat").unwrap();
    cmd.arg("--no-color");
    cmd
}

#[test]
fn query_reads_component_values() {
    let dir = TempDir::new().unwrap();
    let file = write_message(&dir, "adt.hl7", ADT);

    pipehat()
        .args(["query", "PID-5.1"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("PID-5.1 = DOE"));
}

#[test]
fn query_emits_json_reports() {
    let dir = TempDir::new().unwrap();
    let file = write_message(&dir, "adt.hl7", ADT);

    let output = pipehat()
        .args(["query", "PID-3.4", "--format", "json"])
        .arg(&file)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let reports: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(reports[0]["address"], "PID-3.4");
    assert_eq!(reports[0]["values"][0], "MRN");
}

#[test]
fn invalid_address_fails_before_reading_files() {
    pipehat()
        .args(["query", "PID-0", "no-such-file.hl7"])
        .assert()
        .failure();
}

#[test]
fn mask_write_rewrites_the_file() {
    let dir = TempDir::new().unwrap();
    let file = write_message(&dir, "adt.hl7", ADT);

    pipehat()
        .args(["mask", "PID-5", "--write"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("'DOE^JOHN' -> '***^****'"));

    let rewritten = fs::read_to_string(&file).unwrap();
    assert!(rewritten.contains("***^****"));
    assert!(rewritten.starts_with("MSH|^~\\&|A|B"));
}

#[test]
fn set_without_write_prints_transformed_message() {
    let dir = TempDir::new().unwrap();
    let file = write_message(&dir, "adt.hl7", ADT);

    pipehat()
        .args(["set", "PID-5", "ROE^JANE"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("ROE^JANE"));

    // source untouched
    assert_eq!(fs::read_to_string(&file).unwrap(), ADT);
}

#[test]
fn deidentify_out_dir_writes_a_copy() {
    let dir = TempDir::new().unwrap();
    let file = write_message(&dir, "adt.hl7", ADT);
    let out = dir.path().join("safe");

    pipehat()
        .args(["deidentify"])
        .arg(&file)
        .arg("--out-dir")
        .arg(&out)
        .assert()
        .success();

    let copy = fs::read_to_string(out.join("adt.hl7")).unwrap();
    assert!(copy.contains("PID|1||12345^^^MRN||***^****"));
    assert_eq!(fs::read_to_string(&file).unwrap(), ADT);
}

#[test]
fn filter_skips_non_matching_messages() {
    let dir = TempDir::new().unwrap();
    let file = write_message(&dir, "adt.hl7", ADT);

    pipehat()
        .args(["query", "PID-5.1", "--filter", "MSH-9.1=ORU"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn bad_file_does_not_stop_the_batch() {
    let dir = TempDir::new().unwrap();
    write_message(&dir, "bad.hl7", "no header here\r");
    write_message(&dir, "good.hl7", ADT);

    pipehat()
        .args(["query", "PID-5.1"])
        .arg(dir.path())
        .assert()
        .failure()
        .stdout(predicate::str::contains("= DOE"));
}
