//! End-to-end analysis over local log fixtures -- the full `logs` path:
//! gzipped files on disk, ingestion, sort barrier, detection, report.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use assert_cmd::Command;
use flate2::write::GzEncoder;
use flate2::Compression;

use trailhound::detect::engine::{Analyzer, AnalyzerOptions};
use trailhound::events::EventBatch;
use trailhound::ingest::logs::load_folder;

fn write_gz(path: &Path, json: &str) {
    let file = File::create(path).unwrap();
    let mut encoder = GzEncoder::new(file, Compression::default());
    encoder.write_all(json.as_bytes()).unwrap();
    encoder.finish().unwrap();
}

/// A role assumption from 10.0.0.1, then a call by the assumed identity
/// from 203.0.113.9. Files are written so the suspicious call is ingested
/// first, exercising the sort barrier.
fn write_hijack_fixture(folder: &Path) {
    write_gz(
        &folder.join("later.json.gz"),
        r#"{"Records": [{
            "eventSource": "ec2.amazonaws.com",
            "eventName": "DescribeInstances",
            "eventTime": "2020-06-01T12:10:00Z",
            "sourceIPAddress": "203.0.113.9",
            "userAgent": "aws-cli/1.16.190",
            "userIdentity": {
                "type": "AssumedRole",
                "arn": "arn:aws:sts::111111111111:assumed-role/Ops/sess1",
                "userName": "Ops"
            }
        }]}"#,
    );
    write_gz(
        &folder.join("earlier.json.gz"),
        r#"{"Records": [{
            "eventSource": "sts.amazonaws.com",
            "eventName": "AssumeRole",
            "eventTime": "2020-06-01T12:00:00Z",
            "sourceIPAddress": "10.0.0.1",
            "userAgent": "aws-cli/1.16.190",
            "userIdentity": {
                "type": "IAMUser",
                "arn": "arn:aws:iam::111111111111:user/alice",
                "userName": "alice"
            },
            "requestParameters": {
                "roleArn": "arn:aws:iam::111111111111:role/Ops",
                "roleSessionName": "sess1"
            },
            "responseElements": {
                "assumedRoleUser": {
                    "arn": "arn:aws:sts::111111111111:assumed-role/Ops/sess1"
                }
            }
        }]}"#,
    );
}

#[test]
fn test_library_pass_over_fixture_logs() {
    let dir = tempfile::TempDir::new().unwrap();
    write_hijack_fixture(dir.path());

    let mut batch = EventBatch::new();
    let files = load_folder(dir.path(), &mut batch).unwrap();
    assert_eq!(files, 2);
    assert_eq!(batch.len(), 2);

    let report = Analyzer::new(AnalyzerOptions::default()).analyze(batch);
    assert_eq!(report.total, 2);
    assert_eq!(report.skipped, 0);
    assert_eq!(report.assume_role, 1);
    assert_eq!(report.suspicious, 1);

    let finding = &report.findings[0];
    assert_eq!(
        finding.record.canonical_arn,
        "arn:aws:sts::111111111111:assumed-role/Ops/sess1"
    );
    assert!(finding.record.known_addresses.contains("10.0.0.1"));
    assert_eq!(finding.event.source_ip_address, "203.0.113.9");
}

#[test]
fn test_logs_command_reports_suspicious_event() {
    let dir = tempfile::TempDir::new().unwrap();
    write_hijack_fixture(dir.path());

    Command::cargo_bin("trailhound")
        .unwrap()
        .args(["logs", "--folder"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicates::str::contains("1 suspicious"))
        .stdout(predicates::str::contains(
            "used from '203.0.113.9' user: 'Ops'",
        ));
}

#[test]
fn test_logs_command_clean_batch_reports_nothing() {
    let dir = tempfile::TempDir::new().unwrap();
    write_gz(
        &dir.path().join("clean.json.gz"),
        r#"{"Records": [{
            "eventName": "AssumeRole",
            "eventTime": "2020-06-01T12:00:00Z",
            "sourceIPAddress": "10.0.0.1",
            "requestParameters": {
                "roleArn": "arn:aws:iam::111111111111:role/Ops",
                "roleSessionName": "sess1"
            }
        }]}"#,
    );

    Command::cargo_bin("trailhound")
        .unwrap()
        .args(["logs", "--folder"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicates::str::contains("0 suspicious"));
}
