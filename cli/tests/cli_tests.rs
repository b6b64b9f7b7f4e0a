use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Points every lookup at a port nothing listens on, so a test that expects
/// no request would fail loudly with a connection error if one were sent.
fn threatlens(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("threatlens").unwrap();
    cmd.current_dir(dir.path())
        .env("THREATLENS_BACKEND_URL", "http://127.0.0.1:1")
        .env_remove("THREATLENS_OSV_MODE")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_blank_virustotal_query_is_rejected_locally() {
    let dir = TempDir::new().unwrap();
    threatlens(&dir)
        .args(["virustotal", "   ", "--type", "domain"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Please enter a query."));
}

#[test]
fn test_blank_ecosystem_is_rejected_locally() {
    let dir = TempDir::new().unwrap();
    threatlens(&dir)
        .args(["osv", "--package", "requests", "--ecosystem", " "])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Please enter both package name and ecosystem.",
        ));
}

#[test]
fn test_unreachable_backend_is_a_query_failure() {
    let dir = TempDir::new().unwrap();
    threatlens(&dir)
        .args(["otx", "8.8.8.8"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("error sending request"))
        .stderr(predicate::str::contains("127.0.0.1:1/api/alienvault"))
        .stderr(predicate::str::contains("Usage:").not())
        .stderr(predicate::str::contains("Please enter").not());
}

#[test]
fn test_unknown_type_is_a_usage_error() {
    let dir = TempDir::new().unwrap();
    threatlens(&dir)
        .args(["alienvault", "8.8.8.8", "--type", "file"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid check type 'file'"));
}

#[test]
fn test_sources_lists_query_types() {
    let dir = TempDir::new().unwrap();
    threatlens(&dir)
        .arg("sources")
        .assert()
        .success()
        .stdout(predicate::str::contains("virustotal"))
        .stdout(predicate::str::contains("IP address (e.g., 8.8.8.8)"));
}

#[test]
fn test_invalid_config_file_is_reported() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("threatlens.yaml"), "backend_url: localhost\n").unwrap();

    threatlens(&dir)
        .env_remove("THREATLENS_BACKEND_URL")
        .args(["vt", "abc"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("backend_url must be an http(s) URL"));
}
