use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

const REPORT: &str = "תוכן העניינים
פרק ראשון
1. נושא ראשון.....5

פרק ראשון
רשות המסים
ליקוי
1. הועלה כי
הדיווח חלקי
תגובה
1-2. הרשות מסרה כי";

const PREFACE: &str = r#"{"id": "67a", "offices_to_defects": {"רשות המסים": []}}"#;

#[allow(deprecated)]
fn cli(workdir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("report-tagger").expect("binary");
    cmd.current_dir(workdir).arg("--quiet");
    cmd
}

fn setup() -> tempfile::TempDir {
    let temp = tempdir().unwrap();
    fs::write(temp.path().join("report.txt"), REPORT).unwrap();
    fs::write(temp.path().join("preface.json"), PREFACE).unwrap();
    fs::write(temp.path().join("aliases.yaml"), "רשות המסים:\n  - רשות המיסים\n").unwrap();
    temp
}

fn stdout_json(cmd: &mut Command) -> Value {
    let output = cmd.output().expect("command run");
    assert!(
        output.status.success(),
        "stdout: {}\nstderr: {}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("valid json")
}

#[test]
fn tag_prints_every_nonblank_line() {
    let temp = setup();
    let lines = stdout_json(cli(temp.path()).args([
        "tag",
        "report.txt",
        "--preface",
        "preface.json",
        "--aliases",
        "aliases.yaml",
    ]));

    let lines = lines.as_array().unwrap();
    assert_eq!(lines.len(), 10);
    assert_eq!(lines[0]["tag"], "toc_header");
    assert_eq!(lines[3]["line"], 3);
    assert_eq!(lines[3]["tag"], "chapter_header");
    assert_eq!(lines[4]["tag"], "chapter_office_name");
    assert_eq!(lines[7]["tag"], "finding_body_continue");
}

#[test]
fn records_carry_typed_fields() {
    let temp = setup();
    let records = stdout_json(cli(temp.path()).args([
        "records",
        "report.txt",
        "--preface",
        "preface.json",
        "--format",
        "pretty",
    ]));

    let reply = records
        .as_array()
        .unwrap()
        .iter()
        .find(|record| record["kind"] == "reply_body_start")
        .unwrap();
    assert_eq!(reply["fields"]["type"], "reply");
    assert_eq!(reply["fields"]["numbers"], serde_json::json!([1, 2]));
    assert_eq!(reply["fields"]["body"], "הרשות מסרה כי");
}

#[test]
fn documents_are_json_lines() {
    let temp = setup();
    let output = cli(temp.path())
        .args(["documents", "report.txt", "--preface", "preface.json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let documents: Vec<Value> = String::from_utf8(output.stdout)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(documents.len(), 2);
    assert_eq!(documents[0]["report_id"], "67a");
    assert_eq!(documents[0]["kind"], "finding");
    assert_eq!(documents[0]["office"], "רשות המסים");
    assert_eq!(documents[0]["body"], "הועלה כי\nהדיווח חלקי");
    assert_eq!(documents[1]["kind"], "reply");
}

#[test]
fn report_id_flag_overrides_preface() {
    let temp = setup();
    cli(temp.path())
        .args([
            "documents",
            "report.txt",
            "--preface",
            "preface.json",
            "--report-id",
            "override",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"report_id\":\"override\""));
}

#[test]
fn missing_toc_fails_with_message() {
    let temp = tempdir().unwrap();
    fs::write(temp.path().join("broken.txt"), "ליקוי\n1. טקסט\n").unwrap();

    cli(temp.path())
        .args(["records", "broken.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("boundary not found"));
}

#[test]
fn invalid_config_is_rejected() {
    let temp = setup();
    fs::write(temp.path().join("tagger.toml"), "min_topic_title_tokens = 0\n").unwrap();

    cli(temp.path())
        .args(["--config", "tagger.toml", "tag", "report.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("min_topic_title_tokens"));
}

#[test]
fn batch_reports_each_file() {
    let temp = setup();
    let reports = temp.path().join("reports");
    fs::create_dir_all(&reports).unwrap();
    fs::write(reports.join("a.txt"), REPORT).unwrap();
    fs::write(reports.join("a.json"), PREFACE).unwrap();
    fs::write(reports.join("b.txt"), REPORT).unwrap();

    let output = cli(temp.path()).args(["batch", "reports"]).output().unwrap();
    assert!(output.status.success());

    let lines: Vec<Value> = String::from_utf8(output.stdout)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["id"], "67a");
    assert_eq!(lines[0]["status"], "ok");
    assert_eq!(lines[1]["id"], "b");
    assert_eq!(lines[1]["documents"], 2);
}

#[test]
fn batch_fails_when_a_report_fails() {
    let temp = tempdir().unwrap();
    fs::write(temp.path().join("good.txt"), REPORT).unwrap();
    fs::write(temp.path().join("bad.txt"), "אין תוכן עניינים").unwrap();

    cli(temp.path())
        .args(["batch", "."])
        .assert()
        .failure()
        .stdout(predicate::str::contains("\"status\":\"error\""))
        .stdout(predicate::str::contains("\"id\":\"good\""))
        .stderr(predicate::str::contains("1 of 2 reports failed"));
}
