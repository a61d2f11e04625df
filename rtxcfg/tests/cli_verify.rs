use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn fixture(path: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join(path)
}

#[test]
fn verify_passes_for_real_fixture() {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("rtxcfg"));
    cmd.arg("verify")
        .arg(fixture("fixtures/show-config.txt"))
        .arg("--model")
        .arg("RTX1210")
        .assert()
        .success()
        .stdout(predicate::str::contains("result errors=0"));
}

#[test]
fn verify_fails_on_invalid_records() {
    let dir = tempdir().expect("tempdir");
    let input = dir.path().join("broken.txt");
    fs::write(
        &input,
        "dhcp scope 300 192.168.1.2-192.168.1.100/24\nbridge member bridge1 eth0\n",
    )
    .expect("write");

    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("rtxcfg"));
    cmd.arg("verify")
        .arg(&input)
        .arg("--model")
        .arg("RTX1210")
        .assert()
        .failure()
        .stderr(predicate::str::contains("verify failed"))
        .stdout(predicate::str::contains("scope ID must be between 1 and 255"));
}

#[test]
fn verify_unknown_model_fails_with_parser_misses() {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("rtxcfg"));
    cmd.arg("verify")
        .arg(fixture("fixtures/show-config.txt"))
        .arg("--model")
        .arg("NVR500")
        .assert()
        .failure()
        .stdout(predicate::str::contains("unsupported_model"))
        .stdout(predicate::str::contains("no_parser"));
}

#[test]
fn strict_mode_turns_warnings_into_failures() {
    let dir = tempdir().expect("tempdir");
    fs::write(
        dir.path().join("models.toml"),
        r#"
supported = ["RTX1210"]
known = []

[domain_support]
ospf = []
"#,
    )
    .expect("write models");

    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("rtxcfg"));
    cmd.arg("verify")
        .arg(fixture("fixtures/show-config.txt"))
        .arg("--model")
        .arg("RTX1210")
        .arg("--models-dir")
        .arg(dir.path())
        .arg("--strict")
        .arg("--verbose")
        .assert()
        .failure()
        .stderr(predicate::str::contains("strict mode"))
        .stdout(predicate::str::contains("domain_unsupported"))
        .stdout(predicate::str::contains("Using models: file:"));
}
