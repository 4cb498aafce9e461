// promptclean/tests/cli_integration_tests.rs
//! Command-line integration tests for the `promptclean` binary.
//!
//! The binary is run with `assert_cmd`; stdin carries the prompt, stdout the
//! sanitized text and stderr the summary and logs. `mockito` stands in for
//! the classifier endpoint and `tempfile` holds input, output and rule files.

use anyhow::Result;
use assert_cmd::Command;
#[allow(unused_imports)]
use predicates::prelude::*;
use std::fs;
use std::io::Write;
use tempfile::NamedTempFile;

use strip_ansi_escapes::strip as strip_ansi_escapes_fn;

const PROMPT: &str = "Contact: john.doe@example.com, 555-123-4567. Run this: exec('x')";
const CLEANED: &str = "Contact: [REDACTED_EMAIL], [REDACTED_PHONE]. Run this: [REDACTED_CODE]'x')";

fn promptclean() -> Command {
    let mut cmd = Command::cargo_bin("promptclean").unwrap();
    cmd.env_remove("PROMPTCLEAN_CLASSIFIER_URL")
        .env_remove("PROMPTCLEAN_CLASSIFIER_TOKEN")
        .env_remove("RUST_LOG");
    cmd
}

fn run_sanitize(input: &str, args: &[&str]) -> assert_cmd::assert::Assert {
    let mut cmd = promptclean();
    cmd.arg("sanitize").args(args);
    cmd.write_stdin(input.as_bytes());
    cmd.assert()
}

fn strip_ansi(s: &[u8]) -> String {
    String::from_utf8_lossy(&strip_ansi_escapes_fn(s)).to_string()
}

fn mock_classifier(server: &mut mockito::Server, status: usize, body: &str) -> mockito::Mock {
    server
        .mock("POST", "/classify")
        .with_status(status)
        .with_header("content-type", "application/json")
        .with_body(body)
        .create()
}

#[test]
fn test_sanitize_stdin_without_classifier() {
    let assert = run_sanitize(PROMPT, &["--on-classifier-error", "fail-open", "--skip-classifier"]).success();
    let output = assert.get_output();

    assert_eq!(String::from_utf8_lossy(&output.stdout), format!("{}\n", CLEANED));
    let stderr = strip_ansi(&output.stderr);
    assert!(stderr.contains("Redaction Summary:"), "{}", stderr);
    assert!(stderr.contains("email (pii) -> [REDACTED_EMAIL]: 1 occurrence"), "{}", stderr);
    assert!(stderr.contains("Gate: skipped"), "{}", stderr);
    assert!(!stderr.contains("john.doe@example.com"));
}

#[test]
fn test_failure_policy_is_required() {
    run_sanitize(PROMPT, &["--skip-classifier"])
        .failure()
        .stderr(predicate::str::contains("--on-classifier-error is required"));
}

#[test]
fn test_classifier_or_explicit_skip_is_required() {
    run_sanitize(PROMPT, &["--on-classifier-error", "fail-closed"])
        .failure()
        .stderr(predicate::str::contains("--skip-classifier"));
}

#[test]
fn test_unknown_policy_is_rejected_by_clap() {
    run_sanitize(PROMPT, &["--on-classifier-error", "maybe", "--skip-classifier"]).failure();
}

#[test]
fn test_sensitive_verdict_prints_sentinel() {
    let mut server = mockito::Server::new();
    let mock = mock_classifier(&mut server, 200, r#"[[{"label":"NEGATIVE","score":0.99}]]"#);
    let url = format!("{}/classify", server.url());

    run_sanitize(PROMPT, &["--on-classifier-error", "fail-open", "--classifier-url", &url])
        .success()
        .stdout("[FLAGGED_SENSITIVE_CONTENT]\n");
    mock.assert();
}

#[test]
fn test_classifier_url_from_environment() {
    let mut server = mockito::Server::new();
    let _mock = mock_classifier(&mut server, 200, r#"[{"label":"POSITIVE","score":0.99}]"#);

    let mut cmd = promptclean();
    cmd.env("PROMPTCLEAN_CLASSIFIER_URL", format!("{}/classify", server.url()))
        .args(["sanitize", "--on-classifier-error", "fail-closed", "--no-redaction-summary"])
        .write_stdin("ping 10.0.0.1");
    cmd.assert().success().stdout("ping [REDACTED_IP_ADDRESS]\n");
}

#[test]
fn test_custom_label_and_threshold() {
    let mut server = mockito::Server::new();
    let _mock = mock_classifier(&mut server, 200, r#"[{"label":"TOXIC","score":0.6}]"#);
    let url = format!("{}/classify", server.url());

    run_sanitize(
        "hello",
        &["--on-classifier-error", "fail-open", "--classifier-url", &url, "--sensitive-label", "TOXIC", "--threshold", "0.5"],
    )
    .success()
    .stdout("[FLAGGED_SENSITIVE_CONTENT]\n");

    run_sanitize(
        "hello",
        &["--on-classifier-error", "fail-open", "--classifier-url", &url, "--sensitive-label", "TOXIC", "--threshold", "0.6"],
    )
    .success()
    .stdout("hello\n");
}

#[test]
fn test_classifier_outage_follows_policy() {
    let mut server = mockito::Server::new();
    let _mock = mock_classifier(&mut server, 500, "{}");
    let url = format!("{}/classify", server.url());

    run_sanitize(PROMPT, &["--on-classifier-error", "fail-open", "--classifier-url", &url])
        .success()
        .stdout(format!("{}\n", CLEANED))
        .stderr(predicate::str::contains("classifier failed, forwarded"));

    run_sanitize(PROMPT, &["--on-classifier-error", "fail-closed", "--classifier-url", &url])
        .success()
        .stdout("[FLAGGED_SENSITIVE_CONTENT]\n");
}

#[test]
fn test_json_report() -> Result<()> {
    let assert = run_sanitize(
        "a@b.io badword1",
        &["--on-classifier-error", "fail-open", "--skip-classifier", "--json", "--no-redaction-summary"],
    )
    .success();
    let report: serde_json::Value = serde_json::from_slice(&assert.get_output().stdout)?;

    assert_eq!(report["output"], "[REDACTED_EMAIL] ***");
    assert_eq!(report["gate"]["outcome"], "skipped");
    assert_eq!(report["truncated"], false);
    assert_eq!(report["redactions"].as_array().map(|a| a.len()), Some(2));
    assert_eq!(report["rules_fingerprint"].as_str().map(str::len), Some(64));
    Ok(())
}

#[test]
fn test_input_and_output_files() -> Result<()> {
    let mut input = NamedTempFile::new()?;
    writeln!(input, "card 4111 1111 1111 1111\nssn 123-45-6789")?;
    let output = NamedTempFile::new()?;

    let mut cmd = promptclean();
    cmd.args([
        "sanitize",
        "--on-classifier-error",
        "fail-open",
        "--skip-classifier",
        "-i",
        input.path().to_str().unwrap(),
        "-o",
        output.path().to_str().unwrap(),
    ]);
    cmd.assert()
        .success()
        .stdout("")
        .stderr(predicate::str::contains("Wrote sanitized output to"));

    assert_eq!(fs::read_to_string(output.path())?, "card [REDACTED_CREDIT_CARD] ssn [REDACTED_SSN]\n");
    Ok(())
}

#[test]
fn test_max_length_flag() {
    let long = "word ".repeat(100);
    let assert = run_sanitize(
        &long,
        &["--on-classifier-error", "fail-open", "--skip-classifier", "--max-length", "30", "-q"],
    )
    .success();
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
    assert_eq!(stdout, "word word word word word word\n");
}

#[test]
fn test_max_length_below_sentinel_is_rejected() {
    run_sanitize("x", &["--on-classifier-error", "fail-open", "--skip-classifier", "--max-length", "5"])
        .failure()
        .stderr(predicate::str::contains("cannot hold"));
}

#[test]
fn test_quiet_suppresses_summary_and_logs() {
    run_sanitize(PROMPT, &["--on-classifier-error", "fail-open", "--skip-classifier", "--quiet"])
        .success()
        .stdout(format!("{}\n", CLEANED))
        .stderr("");
}

#[test]
fn test_custom_rules_file_and_disable() -> Result<()> {
    let mut rules = NamedTempFile::new()?;
    writeln!(
        rules,
        r#"
pii_rules:
  - name: employee_id
    category: EMPLOYEE_ID
    pattern: '\bEMP-\d{{5}}\b'
denylist:
  - darn
"#
    )?;
    let path = rules.path().to_str().unwrap().to_string();

    run_sanitize(
        "EMP-12345 says darn, mail x@y.org",
        &["--on-classifier-error", "fail-open", "--skip-classifier", "--rules", &path, "--disable", "email", "-q"],
    )
    .success()
    .stdout("[REDACTED_EMPLOYEE_ID] says ***, mail x@y.org\n");
    Ok(())
}

#[test]
fn test_config_file_sets_policy() -> Result<()> {
    let mut config = NamedTempFile::new()?;
    writeln!(
        config,
        "gate:\n  failure_policy: fail_closed\nnormalizer:\n  max_length: 40\nrules:\n  denylist: [heck]"
    )?;
    let path = config.path().to_str().unwrap().to_string();

    run_sanitize(
        "oh heck, what the heck is this very long sentence about",
        &["--config", &path, "--skip-classifier", "-q"],
    )
    .success()
    .stdout("oh ***, what the *** is this very long\n");
    Ok(())
}

#[test]
fn test_rules_command_lists_rules_and_fingerprint() -> Result<()> {
    let assert = promptclean().arg("rules").assert().success();
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();

    for expected in ["email", "[REDACTED_EMAIL]", "ipv4_address", "html_script", "[REDACTED_CODE]", "denylist (2 terms)"] {
        assert!(stdout.contains(expected), "missing {} in\n{}", expected, stdout);
    }
    let fingerprint = stdout
        .lines()
        .find_map(|l| l.strip_prefix("Fingerprint: "))
        .expect("fingerprint line")
        .to_string();

    let json = run_sanitize("x", &["--on-classifier-error", "fail-open", "--skip-classifier", "--json", "-q"]).success();
    let report: serde_json::Value = serde_json::from_slice(&json.get_output().stdout)?;
    assert_eq!(report["rules_fingerprint"], fingerprint.as_str());
    Ok(())
}

#[test]
fn test_rules_command_rejects_bad_rules_file() -> Result<()> {
    let mut rules = NamedTempFile::new()?;
    writeln!(rules, "pii_rules:\n  - name: bad\n    category: BAD\n    pattern: '(open'")?;

    promptclean()
        .args(["rules", "--rules", rules.path().to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid regex"));
    Ok(())
}
