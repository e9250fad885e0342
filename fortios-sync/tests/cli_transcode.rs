use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tempfile::tempdir;

fn bin(cwd: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("fortios-sync"));
    cmd.current_dir(cwd)
        .env("NO_COLOR", "1")
        .env_remove("FORTIOS_SYNC_LOG");
    cmd
}

fn fixture(path: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join(path)
}

fn stdout_json(cmd: &mut Command) -> Value {
    let output = cmd.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&output).expect("stdout is JSON")
}

#[test]
fn disassemble_sorts_keyed_tables_and_truncates_numbers() {
    let dir = tempdir().expect("tempdir");
    let record = stdout_json(
        bin(dir.path())
            .arg("disassemble")
            .arg("system_ddns")
            .arg(fixture("fixtures/wire/system_ddns.json"))
            .arg("--sort")
            .arg("lexical"),
    );

    assert_eq!(record["ddnsid"], json!(1));
    assert_eq!(record["ddns_ttl"], json!(300));
    assert_eq!(
        record["monitor_interface"],
        json!([{"interface_name": "wan1"}, {"interface_name": "wan2"}])
    );
    assert_eq!(record["ddns_sn"], json!("FGT60F0000000001"));
    assert!(record.get("q_origin_key").is_none());
}

#[test]
fn disassemble_unwraps_api_response() {
    let dir = tempdir().expect("tempdir");
    let record = stdout_json(
        bin(dir.path())
            .arg("disassemble")
            .arg("user_local")
            .arg(fixture("fixtures/wire/user_local_response.json")),
    );

    assert_eq!(record["name"], json!("test1"));
    assert_eq!(record["id"], json!(3));
    assert_eq!(record["two_factor"], json!("disable"));
    assert_eq!(record["authtimeout"], json!(0));
}

#[test]
fn disassemble_block_fills_defaults() {
    let dir = tempdir().expect("tempdir");
    let record = stdout_json(
        bin(dir.path())
            .arg("disassemble")
            .arg("switch_controller_fortilink_settings")
            .arg(fixture("fixtures/wire/fortilink_settings.json"))
            .arg("--sort")
            .arg("natural"),
    );

    assert_eq!(
        record["nac_ports"],
        json!([{
            "onboarding_vlan": "vlan1",
            "lan_segment": "disabled",
            "nac_lan_interface": "",
            "nac_segment_vlans": [
                {"vlan_name": "vlan2"},
                {"vlan_name": "vlan10"}
            ],
            "parent_key": "",
            "member_change": 0,
            "bounce_nac_port": "disable"
        }])
    );
}

#[test]
fn assemble_writes_wire_names_and_block_object() {
    let dir = tempdir().expect("tempdir");
    let wire = stdout_json(
        bin(dir.path())
            .arg("assemble")
            .arg("switch_controller_fortilink_settings")
            .arg(fixture("fixtures/records/fortilink_settings.json")),
    );

    assert_eq!(
        wire,
        json!({
            "name": "fl1",
            "fortilink": "fortilink",
            "nac-ports": {"onboarding-vlan": "vlan1"}
        })
    );
}

#[test]
fn assemble_with_prior_clears_removed_fields() {
    let dir = tempdir().expect("tempdir");
    let wire = stdout_json(
        bin(dir.path())
            .arg("assemble")
            .arg("user_local")
            .arg(fixture("fixtures/records/user_local_updated.json"))
            .arg("--prior")
            .arg(fixture("fixtures/records/user_local.json")),
    );

    assert_eq!(wire["email-to"], Value::Null);
    assert_eq!(wire["status"], json!("disable"));
}

#[test]
fn assemble_clear_respects_firmware() {
    let dir = tempdir().expect("tempdir");
    let wire = stdout_json(
        bin(dir.path())
            .arg("assemble")
            .arg("system_password_policy")
            .arg(fixture("fixtures/records/password_policy.json"))
            .arg("--clear")
            .arg("--firmware")
            .arg("7.4.1"),
    );

    let object = wire.as_object().expect("object");
    assert!(object.values().all(Value::is_null));
    assert!(object.contains_key("min-change-characters"));
    assert!(!object.contains_key("change-4-characters"));
}

#[test]
fn assemble_rejects_field_missing_on_firmware() {
    let dir = tempdir().expect("tempdir");
    let record = dir.path().join("user.json");
    fs::write(
        &record,
        r#"{"name": "u1", "username_sensitivity": "enable"}"#,
    )
    .expect("write record");

    bin(dir.path())
        .arg("assemble")
        .arg("user_local")
        .arg(&record)
        .arg("--firmware")
        .arg("6.4.9")
        .assert()
        .failure()
        .stderr(predicate::str::contains("username_sensitivity"));
}

#[test]
fn validate_accepts_good_record() {
    let dir = tempdir().expect("tempdir");
    bin(dir.path())
        .arg("validate")
        .arg("user_local")
        .arg(fixture("fixtures/records/user_local.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("valid"));
}

#[test]
fn validate_reports_every_problem() {
    let dir = tempdir().expect("tempdir");
    bin(dir.path())
        .arg("validate")
        .arg("user_local")
        .arg(fixture("fixtures/records/user_local_invalid.json"))
        .assert()
        .failure()
        .stdout(predicate::str::contains("ERROR colour [unknown_field]"))
        .stdout(predicate::str::contains("ERROR name [missing_required_field]"))
        .stdout(predicate::str::contains("ERROR status [invalid_option]"))
        .stderr(predicate::str::contains("validate failed: 3 problem(s)"));
}

#[test]
fn validate_json_lists_findings() {
    let dir = tempdir().expect("tempdir");
    let output = bin(dir.path())
        .arg("validate")
        .arg("user_local")
        .arg(fixture("fixtures/records/user_local_invalid.json"))
        .arg("--format")
        .arg("json")
        .assert()
        .failure()
        .get_output()
        .stdout
        .clone();
    let findings: Value = serde_json::from_slice(&output).expect("json");
    let codes: Vec<_> = findings
        .as_array()
        .expect("array")
        .iter()
        .map(|finding| finding["code"].as_str().expect("code").to_string())
        .collect();
    assert_eq!(
        codes,
        vec!["unknown_field", "missing_required_field", "invalid_option"]
    );
}
