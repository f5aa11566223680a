//! Integration tests for the CLI interface
//!
//! Runs the `bigram-reduce` binary end to end on small corpora

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;
use tempfile::TempDir;

const LINES_A: &str = "the cat sat on the mat every day\nthe cat ate a mouse every day\n";
const LINES_B: &str = "the cat and the man became friends\nI eat pizza every day\n";

fn bin(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("bigram-reduce").unwrap();
    cmd.current_dir(dir.path())
        .env_remove("BIGRAM_REDUCE_PARTITIONS")
        .env_remove("BIGRAM_REDUCE_TOPOLOGY")
        .env_remove("BIGRAM_REDUCE_MAX_PARALLEL")
        .env_remove("BIGRAM_REDUCE_MAX_RETRIES")
        .env_remove("BIGRAM_REDUCE_TOP_K")
        .env_remove("BIGRAM_REDUCE_LOWERCASE")
        .env_remove("BIGRAM_REDUCE_MAX_RECORD_BYTES")
        .env_remove("BIGRAM_REDUCE_FORMAT")
        .env_remove("BIGRAM_REDUCE_LOG_LEVEL");
    cmd
}

fn write_corpus(dir: &TempDir) -> (PathBuf, PathBuf) {
    let a = dir.path().join("a.txt");
    let b = dir.path().join("b.txt");
    std::fs::write(&a, LINES_A).unwrap();
    std::fs::write(&b, LINES_B).unwrap();
    (a, b)
}

#[test]
fn test_cli_help_flag() {
    let dir = TempDir::new().unwrap();
    bin(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("count"))
        .stdout(predicate::str::contains("demo"));
}

#[test]
fn test_invalid_command() {
    let dir = TempDir::new().unwrap();
    bin(&dir)
        .arg("invalid-command")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));
}

#[test]
fn test_demo_prints_histogram() {
    let dir = TempDir::new().unwrap();
    bin(&dir)
        .arg("demo")
        .assert()
        .success()
        .stdout(predicate::str::contains("=== Bigram Results ==="))
        .stdout(predicate::str::contains("Records: 6"))
        .stdout(predicate::str::contains("count      1: 31 bigram(s)"))
        .stdout(predicate::str::contains("count      4: 1 bigram(s)"));
}

#[test]
fn test_count_top_bigram_across_files() {
    let dir = TempDir::new().unwrap();
    let (a, b) = write_corpus(&dir);

    bin(&dir)
        .arg("count")
        .arg(&a)
        .arg(&b)
        .args(["--top", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Partitions: 2"))
        .stdout(predicate::str::contains("Top 1 bigrams:"))
        .stdout(predicate::str::contains("3  every day"));
}

#[test]
fn test_count_json_output_is_parseable() {
    let dir = TempDir::new().unwrap();
    let (a, b) = write_corpus(&dir);

    let output = bin(&dir)
        .arg("count")
        .arg(&a)
        .arg(&b)
        .args(["--partitions", "4", "--topology", "streaming"])
        .args(["--top", "2", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["stats"]["partitions"], 4);
    assert_eq!(report["stats"]["records"], 4);
    assert_eq!(report["result"]["mode"], "top_k");
    assert_eq!(report["result"]["bigrams"][0]["bigram"], "every day");
    assert_eq!(report["result"]["bigrams"][0]["count"], 3);
    assert_eq!(report["result"]["bigrams"][1]["bigram"], "the cat");
    assert_eq!(report["result"]["bigrams"][1]["count"], 3);
}

#[test]
fn test_count_reads_stdin() {
    let dir = TempDir::new().unwrap();
    bin(&dir)
        .args(["count", "--full", "--format", "csv"])
        .write_stdin("a b a b\n")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("bigram,count\n"))
        .stdout(predicate::str::contains("a b,2"))
        .stdout(predicate::str::contains("b a,1"));
}

#[test]
fn test_count_distinct() {
    let dir = TempDir::new().unwrap();
    bin(&dir)
        .args(["count", "--distinct"])
        .write_stdin("x y x y\ny x\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Distinct bigrams (2):"))
        .stdout(predicate::str::contains("  x y\n  y x\n"));
}

#[test]
fn test_modes_are_mutually_exclusive() {
    let dir = TempDir::new().unwrap();
    bin(&dir)
        .args(["count", "--full", "--histogram"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn test_no_valid_records_exit_code() {
    let dir = TempDir::new().unwrap();
    let empty = dir.path().join("empty.txt");
    std::fs::write(&empty, "single\n\nwords\n").unwrap();

    bin(&dir)
        .arg("count")
        .arg(&empty)
        .assert()
        .code(6)
        .stderr(predicate::str::contains("No valid records"));
}

#[test]
fn test_missing_input_file_exit_code() {
    let dir = TempDir::new().unwrap();
    bin(&dir)
        .args(["count", "does-not-exist.txt"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("Partition 0 failed"));
}

#[test]
fn test_missing_input_file_with_explicit_split_exit_code() {
    let dir = TempDir::new().unwrap();
    bin(&dir)
        .args(["count", "does-not-exist.txt", "--partitions", "2"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("Input not found"))
        .stderr(predicate::str::contains("does-not-exist.txt"));
}

#[test]
fn test_config_file_is_honored() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("bigram-reduce.toml"),
        "top_k = 1\nformat = \"csv\"\n",
    )
    .unwrap();

    bin(&dir)
        .arg("count")
        .write_stdin("the cat the cat\n")
        .assert()
        .success()
        .stdout("bigram,count\nthe cat,2\n");
}

#[test]
fn test_invalid_config_exit_code() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("bigram-reduce.toml"), "partitions = 0\n").unwrap();

    bin(&dir).arg("demo").assert().code(2);
}
