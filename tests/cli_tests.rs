//! CLI smoke tests for the `rcap` binary

#![cfg(feature = "cli")]

mod common;

use assert_cmd::Command;
use common::TestEnvironment;
use predicates::prelude::*;

const NESTED_FIXTURE: &str = r#"{
  "subject": "ab",
  "match_end": 2,
  "ktable": ["pair", "L", "R"],
  "captures": [
    {"start": 0, "siz": 0, "idx": 1, "kind": "rosie"},
    {"start": 0, "siz": 2, "idx": 2, "kind": "rosie"},
    {"start": 1, "siz": 2, "idx": 3, "kind": "rosie"},
    {"start": 2, "siz": 1, "idx": 0, "kind": "close"},
    {"start": 2, "siz": 1, "idx": 0, "kind": "close"}
  ]
}"#;

#[test]
fn encode_fixture_to_json() {
    let env = TestEnvironment::new();
    let fixture = env.write_text_file("nested.json", NESTED_FIXTURE);

    Command::cargo_bin("rcap")
        .unwrap()
        .arg("encode")
        .arg(&fixture)
        .args(["--encoding", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""type":"pair""#))
        .stdout(predicate::str::contains(r#""subs":["#));
}

#[test]
fn encode_then_decode_round_trips() {
    let env = TestEnvironment::new();
    let fixture = env.write_text_file("nested.json", NESTED_FIXTURE);
    let buffer = env.temp_path().join("match.bin");

    Command::cargo_bin("rcap")
        .unwrap()
        .arg("encode")
        .arg(&fixture)
        .args(["--encoding", "byte"])
        .arg("--output")
        .arg(&buffer)
        .assert()
        .success();

    Command::cargo_bin("rcap")
        .unwrap()
        .arg("decode")
        .arg(&buffer)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""type":"pair""#))
        .stdout(predicate::str::contains(r#""type":"L""#));
}

#[test]
fn decode_rejects_garbage() {
    let env = TestEnvironment::new();
    let path = env.write_file("garbage.bin", &[0x01, 0x02, 0x03]);

    Command::cargo_bin("rcap")
        .unwrap()
        .arg("decode")
        .arg(&path)
        .assert()
        .failure();
}

#[test]
fn missing_fixture_fails_with_context() {
    Command::cargo_bin("rcap")
        .unwrap()
        .arg("encode")
        .arg("no-such-file.json")
        .assert()
        .failure();
}
