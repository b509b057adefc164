//! End-to-end tests for the `fdns` binary.

use assert_cmd::Command;
use flate2::write::GzEncoder;
use flate2::Compression;
use predicates::prelude::*;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const DATASET: &str = r#"{"timestamp":"1540428511","name":"www.example.com","type":"a","value":"93.184.216.34"}
{"timestamp":"1540428511","name":"mail.example.com","type":"cname","value":"mx.provider.net"}
{"timestamp":"1540428511","name":"dev.internal.example.org","type":"a","value":"10.0.0.1"}
{"timestamp":"1540428511","name":"example.com","type":"a","value":"93.184.216.34"}
"#;

fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    fn write(&self, name: &str, contents: &[u8]) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    fn dataset(&self, data: &str) -> PathBuf {
        self.write("fdns_a.json.gz", &gzip(data.as_bytes()))
    }

    /// The binary, isolated from the user's configuration and environment
    fn fdns(&self) -> Command {
        let mut cmd = Command::cargo_bin("fdns").unwrap();
        cmd.env("HOME", self.dir.path())
            .env("XDG_CONFIG_HOME", self.dir.path().join("config"))
            .env_remove("RUST_LOG")
            .env_remove("FDNS_WORKERS");
        cmd
    }

    fn fdns_file(&self, path: &Path) -> Command {
        let mut cmd = self.fdns();
        cmd.arg("--file").arg(path);
        cmd
    }
}

fn sorted_lines(output: &[u8]) -> Vec<String> {
    let mut lines: Vec<String> = String::from_utf8_lossy(output)
        .lines()
        .map(str::to_string)
        .collect();
    lines.sort();
    lines
}

#[test]
fn source_is_required() {
    let fx = Fixture::new();
    fx.fdns()
        .args(["--substrings", "dev"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--file"));
}

#[test]
fn file_and_url_conflict() {
    let fx = Fixture::new();
    let path = fx.dataset(DATASET);
    fx.fdns_file(&path)
        .args(["--url", "https://example.com/fdns_a.json.gz", "-s", "dev"])
        .assert()
        .failure();
}

#[test]
fn reports_domain_and_substring_matches() {
    let fx = Fixture::new();
    let path = fx.dataset(DATASET);

    let output = fx
        .fdns_file(&path)
        .args(["-r", "a", "-d", "example.com", "-s", "internal", "-w", "3"])
        .output()
        .unwrap();

    assert!(output.status.success());
    assert_eq!(
        sorted_lines(&output.stdout),
        ["dev.internal.example.org", "www.example.com"]
    );
}

#[test]
fn json_output_quotes_each_match() {
    let fx = Fixture::new();
    let path = fx.dataset(DATASET);

    fx.fdns_file(&path)
        .args(["-s", "mail", "--output", "json"])
        .assert()
        .success()
        .stdout("\"mail.example.com\"\n");
}

#[test]
fn emit_value_reports_the_target() {
    let fx = Fixture::new();
    let path = fx.dataset(DATASET);

    fx.fdns_file(&path)
        .args(["-r", "cname", "-d", "example.com", "--emit", "value"])
        .assert()
        .success()
        .stdout("mx.provider.net\n");
}

#[test]
fn plain_file_is_rejected() {
    let fx = Fixture::new();
    let path = fx.write("fdns_a.json", DATASET.as_bytes());

    fx.fdns_file(&path)
        .args(["-s", "dev"])
        .assert()
        .code(1)
        .stdout("")
        .stderr(predicate::str::contains("invalid gzip stream"));
}

#[test]
fn missing_file_fails() {
    let fx = Fixture::new();
    fx.fdns_file(&fx.dir.path().join("missing.json.gz"))
        .args(["-s", "dev"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("could not open file"));
}

#[test]
fn malformed_line_fails_the_run_but_keeps_matches() {
    let fx = Fixture::new();
    let path = fx.dataset(
        "{\"name\":\"a.example.com\",\"type\":\"a\"}\n\
         {\"name\":\n\
         {\"name\":\"b.example.com\",\"type\":\"a\"}\n",
    );

    let output = fx
        .fdns_file(&path)
        .args(["-r", "a", "-d", "example.com"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(
        sorted_lines(&output.stdout),
        ["a.example.com", "b.example.com"]
    );
    assert!(!String::from_utf8_lossy(&output.stderr).contains("could not decode"));

    fx.fdns_file(&path)
        .args(["-r", "a", "-d", "example.com", "--verbose"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("could not decode line 2"));
}

#[test]
fn empty_filters_are_rejected() {
    let fx = Fixture::new();
    let path = fx.dataset(DATASET);

    fx.fdns_file(&path)
        .args(["--domains", "example.com"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("nothing to match"));
}

#[test]
fn unknown_record_type_is_a_usage_error() {
    let fx = Fixture::new();
    let path = fx.dataset(DATASET);

    fx.fdns_file(&path)
        .args(["-r", "soa", "-d", "example.com"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("soa"));
}

#[test]
fn config_file_sets_defaults() {
    let fx = Fixture::new();
    let path = fx.dataset(DATASET);
    let config = fx.write("fdns.toml", b"report = \"value\"\nworkers = 2\n");

    fx.fdns_file(&path)
        .arg("--config")
        .arg(&config)
        .args(["-s", "mail"])
        .assert()
        .success()
        .stdout("mx.provider.net\n");

    // flags win over the file
    fx.fdns_file(&path)
        .arg("--config")
        .arg(&config)
        .args(["-s", "mail", "--emit", "name"])
        .assert()
        .success()
        .stdout("mail.example.com\n");
}

#[test]
fn invalid_config_file_is_reported() {
    let fx = Fixture::new();
    let path = fx.dataset(DATASET);
    let config = fx.write("fdns.toml", b"goroutines = 2\n");

    fx.fdns_file(&path)
        .arg("--config")
        .arg(&config)
        .args(["-s", "mail"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("invalid config file"));
}
