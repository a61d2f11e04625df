use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;

fn fixture(path: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join(path)
}

#[test]
fn parse_summarizes_every_domain() {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("rtxcfg"));
    cmd.arg("parse")
        .arg(fixture("fixtures/show-config.txt"))
        .arg("--model")
        .arg("RTX1210")
        .assert()
        .success()
        .stdout(predicate::str::contains("static_routes records=3"))
        .stdout(predicate::str::contains("dhcp_scope records=1"))
        .stdout(predicate::str::contains("nat_static records=1"));
}

#[test]
fn parse_single_domain_as_json() {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("rtxcfg"));
    cmd.arg("parse")
        .arg(fixture("fixtures/show-config.txt"))
        .arg("--model")
        .arg("RTX1210")
        .arg("--domain")
        .arg("dhcp_scope")
        .arg("--format")
        .arg("json")
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""domain": "dhcp_scope""#))
        .stdout(predicate::str::contains(r#""range_start": "192.168.100.2""#));
}

#[test]
fn parse_rejects_unknown_domain() {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("rtxcfg"));
    cmd.arg("parse")
        .arg(fixture("fixtures/show-config.txt"))
        .arg("--model")
        .arg("RTX1210")
        .arg("--domain")
        .arg("firewall")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown domain 'firewall'"));
}

#[test]
fn commands_round_trip_route_lines() {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("rtxcfg"));
    cmd.arg("commands")
        .arg(fixture("fixtures/show-config.txt"))
        .arg("--model")
        .arg("RTX1210")
        .arg("--domain")
        .arg("static_routes")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "ip route default gateway 192.168.100.1",
        ))
        .stdout(predicate::str::contains(
            "ip route 10.1.0.0/16 gateway 192.168.100.2",
        ))
        .stdout(predicate::str::contains(
            "ip route 10.1.0.0/16 gateway 192.168.100.3 weight 2",
        ))
        .stdout(predicate::str::contains(
            "ip route 172.16.0.0/16 gateway tunnel 1 hide",
        ));
}

#[test]
fn commands_include_delete_then_recreate_material() {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("rtxcfg"));
    cmd.arg("commands")
        .arg(fixture("fixtures/show-config.txt"))
        .arg("--model")
        .arg("RTX1210")
        .arg("--domain")
        .arg("dhcp_scope")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "dhcp scope 1 192.168.100.2-192.168.100.191/24 gateway 192.168.100.1 dns 192.168.100.1 lease 43200",
        ));
}

#[test]
fn models_lists_supported_table() {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("rtxcfg"));
    cmd.arg("models")
        .arg("--verbose")
        .assert()
        .success()
        .stdout(predicate::str::contains("Using models: embedded"))
        .stdout(predicate::str::contains("- RTX1220"))
        .stdout(predicate::str::contains("- NVR510"));
}
