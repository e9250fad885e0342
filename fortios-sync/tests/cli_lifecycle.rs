use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tempfile::{tempdir, TempDir};

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

fn read_json(path: &Path) -> Value {
    let raw = fs::read(path).expect("read json");
    serde_json::from_slice(&raw).expect("parse json")
}

/// Working directory with a settings file pointing the store at `device/`.
fn workspace() -> TempDir {
    let dir = tempdir().expect("tempdir");
    fs::write(
        dir.path().join("fortios-sync.toml"),
        "[device]\nretries = 2\n\n[store]\ndir = \"device\"\n",
    )
    .expect("write settings");
    fs::create_dir(dir.path().join("device")).expect("mkdir");
    fs::write(dir.path().join("device/VERSION"), "v7.2.5 build1517\n").expect("write version");
    dir
}

fn apply(dir: &Path, resource: &str, record: &str, state: &str) -> assert_cmd::assert::Assert {
    bin(dir)
        .arg("apply")
        .arg(resource)
        .arg(fixture(record))
        .arg("--state")
        .arg(state)
        .assert()
}

#[test]
fn apply_creates_then_updates() {
    let dir = workspace();
    apply(dir.path(), "user_local", "fixtures/records/user_local.json", "user.json")
        .success()
        .stdout(predicate::str::contains("created user_local test1"));

    let stored = dir.path().join("device/root/user/local/test1.json");
    assert_eq!(read_json(&stored)["email-to"], json!("ops@example.com"));
    let state = read_json(&dir.path().join("user.json"));
    assert_eq!(state["id"], json!("test1"));
    assert_eq!(state["state"]["status"], json!("enable"));

    apply(
        dir.path(),
        "user_local",
        "fixtures/records/user_local_updated.json",
        "user.json",
    )
    .success()
    .stdout(predicate::str::contains("updated user_local test1"));

    let stored = read_json(&stored);
    assert!(stored.get("email-to").is_none());
    assert_eq!(stored["status"], json!("disable"));
}

#[test]
fn plan_reports_changes_against_observed_state() {
    let dir = workspace();
    bin(dir.path())
        .arg("plan")
        .arg("user_local")
        .arg(fixture("fixtures/records/user_local.json"))
        .arg("--state")
        .arg("user.json")
        .assert()
        .success()
        .stdout(predicate::str::contains("user_local (new): create"))
        .stdout(predicate::str::contains("+ passwd = \"(sensitive)\""));

    apply(dir.path(), "user_local", "fixtures/records/user_local.json", "user.json").success();

    bin(dir.path())
        .arg("plan")
        .arg("user_local")
        .arg(fixture("fixtures/records/user_local.json"))
        .arg("--state")
        .arg("user.json")
        .arg("--summary")
        .assert()
        .success()
        .stdout(predicate::str::contains("action=noop"));

    let output = bin(dir.path())
        .arg("plan")
        .arg("user_local")
        .arg(fixture("fixtures/records/user_local_updated.json"))
        .arg("--state")
        .arg("user.json")
        .arg("--format")
        .arg("json")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let plan: Value = serde_json::from_slice(&output).expect("json");
    assert_eq!(plan["action"], json!("update"));
    assert_eq!(plan["payload"]["email-to"], Value::Null);
    assert_eq!(plan["diff"]["counts"]["removed"], json!(1));
    let paths: Vec<_> = plan["diff"]["entries"]
        .as_array()
        .expect("entries")
        .iter()
        .map(|entry| entry["path"].as_str().expect("path").to_string())
        .collect();
    assert_eq!(paths, vec!["status", "email_to"]);
}

#[test]
fn plan_after_remote_deletion_recreates() {
    let dir = workspace();
    apply(dir.path(), "user_local", "fixtures/records/user_local.json", "user.json").success();
    fs::remove_file(dir.path().join("device/root/user/local/test1.json")).expect("remove");

    bin(dir.path())
        .arg("plan")
        .arg("user_local")
        .arg(fixture("fixtures/records/user_local.json"))
        .arg("--state")
        .arg("user.json")
        .assert()
        .success()
        .stdout(predicate::str::contains("user_local (new): create"));
}

#[test]
fn read_and_destroy_table_object() {
    let dir = workspace();
    apply(dir.path(), "user_local", "fixtures/records/user_local.json", "user.json").success();

    bin(dir.path())
        .arg("read")
        .arg("user_local")
        .arg("test1")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"email_to\": \"ops@example.com\""));

    bin(dir.path())
        .arg("destroy")
        .arg("user_local")
        .arg("--state")
        .arg("user.json")
        .assert()
        .success()
        .stdout(predicate::str::contains("destroyed user_local"));
    assert!(!dir.path().join("user.json").exists());
    assert!(!dir.path().join("device/root/user/local/test1.json").exists());

    bin(dir.path())
        .arg("read")
        .arg("user_local")
        .arg("test1")
        .assert()
        .failure()
        .stderr(predicate::str::contains("user_local resource 'test1' not found"));
}

#[test]
fn import_writes_state_for_existing_object() {
    let dir = workspace();
    let table = dir.path().join("device/root/user/local");
    fs::create_dir_all(&table).expect("mkdir");
    fs::write(
        table.join("admin2.json"),
        r#"{"name": "admin2", "id": 7, "status": "enable", "two-factor": "email"}"#,
    )
    .expect("seed object");

    bin(dir.path())
        .arg("import")
        .arg("user_local")
        .arg("admin2")
        .arg("--state")
        .arg("admin2.json")
        .assert()
        .success()
        .stdout(predicate::str::contains("imported user_local admin2"));

    let state = read_json(&dir.path().join("admin2.json"));
    assert_eq!(state["id"], json!("admin2"));
    assert_eq!(state["state"]["id"], json!(7));
    assert!(state["config"].get("id").is_none());
    assert_eq!(state["config"]["two_factor"], json!("email"));
    assert_eq!(state["applied"], state["config"]);

    bin(dir.path())
        .arg("import")
        .arg("user_local")
        .arg("admin2")
        .arg("--state")
        .arg("admin2.json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("refusing to overwrite"));
}

#[test]
fn settings_object_lifecycle() {
    let dir = workspace();
    apply(
        dir.path(),
        "system_password_policy",
        "fixtures/records/password_policy.json",
        "policy.json",
    )
    .success()
    .stdout(predicate::str::contains(
        "created system_password_policy system_password_policy",
    ));

    let stored = dir
        .path()
        .join("device/root/system/password-policy/settings.json");
    assert_eq!(read_json(&stored)["minimum-length"], json!(12));

    bin(dir.path())
        .arg("destroy")
        .arg("system_password_policy")
        .arg("--state")
        .arg("policy.json")
        .assert()
        .success();
    assert_eq!(read_json(&stored), json!({}));
}

#[test]
fn vdom_flag_selects_device_subtree() {
    let dir = workspace();
    bin(dir.path())
        .arg("apply")
        .arg("switch_controller_fortilink_settings")
        .arg(fixture("fixtures/records/fortilink_settings.json"))
        .arg("--state")
        .arg("fl.json")
        .arg("--vdom")
        .arg("branch")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "created switch_controller_fortilink_settings fl1",
        ));

    let stored = dir
        .path()
        .join("device/branch/switch-controller/fortilink-settings/fl1.json");
    assert_eq!(
        read_json(&stored)["nac-ports"],
        json!({"onboarding-vlan": "vlan1"})
    );
}

#[test]
fn invalid_record_is_not_applied() {
    let dir = workspace();
    apply(
        dir.path(),
        "user_local",
        "fixtures/records/user_local_invalid.json",
        "user.json",
    )
    .failure()
    .stderr(predicate::str::contains("invalid user_local configuration"));
    assert!(!dir.path().join("user.json").exists());
}

#[test]
fn unsupported_firmware_field_fails_apply() {
    let dir = workspace();
    let record = dir.path().join("user.json");
    fs::write(
        &record,
        r#"{"name": "u1", "username_sensitivity": "enable"}"#,
    )
    .expect("write record");

    bin(dir.path())
        .arg("apply")
        .arg("user_local")
        .arg(&record)
        .arg("--state")
        .arg("state.json")
        .arg("--firmware")
        .arg("6.4.9")
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Error creating user_local resource: argument 'username_sensitivity'",
        ));
}
