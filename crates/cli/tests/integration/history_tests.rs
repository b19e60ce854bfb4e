use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn test_update_backs_up_previous_metadata() {
  let env = TestEnv::from_fixture("web.yml");
  env.update_json(&[]);
  env.use_fixture("web_and_db.yml");

  let outcome = env.update_json(&[]);

  assert!(outcome["backup_key"].is_string());
  let output = env.casagen_cmd().args(["history", "list", "-o", "json"]).output().unwrap();
  assert!(output.status.success());
  let entries: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(entries.as_array().unwrap().len(), 1);
  assert_eq!(entries[0]["key"], outcome["backup_key"]);
}

#[test]
fn test_rollback_restores_backup() {
  let env = TestEnv::from_fixture("web.yml");
  let before = env.update_json(&[]);
  env.use_fixture("web_and_db.yml");
  let outcome = env.update_json(&[]);
  let key = outcome["backup_key"].as_str().unwrap().to_string();

  env
    .casagen_cmd()
    .args(["rollback", &key])
    .assert()
    .success()
    .stdout(predicate::str::contains("Rolled back"));

  assert_eq!(env.show_json(), before["metadata"]);
}

#[test]
fn test_rollback_unknown_key_lists_available() {
  let env = TestEnv::from_fixture("web.yml");
  env.update_json(&[]);
  env.use_fixture("web_and_db.yml");
  let outcome = env.update_json(&[]);
  let key = outcome["backup_key"].as_str().unwrap().to_string();

  env
    .casagen_cmd()
    .args(["rollback", "19990101T000000000Z"])
    .assert()
    .failure()
    .stderr(predicate::str::contains(key));
}

#[test]
fn test_history_respects_max_versions() {
  let env = TestEnv::from_fixture("web.yml");
  env.update_json(&[]);
  env
    .casagen_cmd()
    .args(["config", "--max-history", "2"])
    .assert()
    .success();

  for _ in 0..4 {
    env.casagen_cmd().args(["history", "backup"]).assert().success();
  }

  let output = env.casagen_cmd().args(["history", "list", "-o", "json"]).output().unwrap();
  let entries: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(entries.as_array().unwrap().len(), 2);
}

#[test]
fn test_disabled_auto_backup_skips_history() {
  let env = TestEnv::from_fixture("web.yml");
  env.update_json(&[]);
  env
    .casagen_cmd()
    .args(["config", "--auto-backup", "false"])
    .assert()
    .success();
  env.use_fixture("web_and_db.yml");

  let outcome = env.update_json(&[]);

  assert!(outcome["backup_key"].is_null());
  env
    .casagen_cmd()
    .args(["history", "list"])
    .assert()
    .success()
    .stdout(predicate::str::contains("No history entries"));
}

#[test]
fn test_history_backup_without_current_warns() {
  let env = TestEnv::empty();

  env
    .casagen_cmd()
    .args(["history", "backup"])
    .assert()
    .success()
    .stderr(predicate::str::contains("No current metadata"));
}
