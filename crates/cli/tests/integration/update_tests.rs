use predicates::prelude::*;

use super::common::{TestEnv, fixture_path};

#[test]
fn test_first_update_generates_metadata() {
  let env = TestEnv::from_fixture("web.yml");

  let outcome = env.update_json(&[]);

  assert_eq!(outcome["mode"], "full");
  let web = &outcome["metadata"]["services"]["web"];
  assert_eq!(web["ports"][0]["identifier"], "80");
  assert_eq!(web["ports"][0]["text"], "");
  assert_eq!(web["envs"][0]["identifier"], "TZ");
  assert_eq!(outcome["metadata"]["app"]["port_map"], "8080");
  assert!(env.work_dir().join("meta.current.json").exists());
  assert!(env.work_dir().join("descriptor.sha256").exists());
}

#[test]
fn test_second_update_is_cached() {
  let env = TestEnv::from_fixture("web.yml");
  env.update_json(&[]);

  env
    .casagen_cmd()
    .args(["update", env.descriptor()])
    .assert()
    .success()
    .stdout(predicate::str::contains("up to date"));
}

#[test]
fn test_force_regenerates() {
  let env = TestEnv::from_fixture("web.yml");
  env.update_json(&[]);

  let outcome = env.update_json(&["--force"]);

  assert_eq!(outcome["mode"], "full");
}

#[test]
fn test_added_service_is_reported_and_text_kept() {
  let env = TestEnv::from_fixture("web.yml");
  env.update_json(&[]);
  env
    .casagen_cmd()
    .args(["edit", "services.web.ports.80", "Web UI"])
    .assert()
    .success();

  env.use_fixture("web_and_db.yml");
  env
    .casagen_cmd()
    .args(["diff", env.descriptor()])
    .assert()
    .success()
    .stdout(predicate::str::contains("service db"))
    .stdout(predicate::str::contains("services.db.ports.5432"));

  let outcome = env.update_json(&[]);

  assert_eq!(outcome["mode"], "incremental");
  assert_eq!(outcome["diff"]["added_services"][0], "db");
  assert_eq!(outcome["metadata"]["services"]["web"]["ports"][0]["text"], "Web UI");
  assert_eq!(outcome["metadata"]["services"]["db"]["ports"][0]["text"], "");
}

#[test]
fn test_diff_without_history_reports_nothing_recorded() {
  let env = TestEnv::from_fixture("web.yml");

  env
    .casagen_cmd()
    .args(["diff", env.descriptor()])
    .assert()
    .success()
    .stdout(predicate::str::contains("No previous descriptor"));
  assert!(!env.work_dir().join("meta.current.json").exists());
}

#[test]
fn test_params_override_text() {
  let env = TestEnv::from_fixture("web.yml");
  let params = fixture_path("params.yml");

  let outcome = env.update_json(&["--params", params.to_str().unwrap()]);

  assert_eq!(outcome["metadata"]["app"]["title"], "My Web Stack");
  assert_eq!(outcome["metadata"]["services"]["web"]["ports"][0]["text"], "Web UI");
}

#[test]
fn test_out_writes_metadata_file() {
  let env = TestEnv::from_fixture("web.yml");
  let out = env.temp.path().join("casaos-meta.json");

  env
    .casagen_cmd()
    .args(["update", env.descriptor(), "--out", out.to_str().unwrap()])
    .assert()
    .success();

  let written: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
  assert_eq!(written, env.show_json());
}

#[cfg(unix)]
#[test]
fn test_fill_command_fills_empty_fields() {
  let env = TestEnv::from_fixture("web.yml");

  let outcome = env.update_json(&["--fill-command", r#"sed 's/"text": ""/"text": "filled"/g'"#]);

  let web = &outcome["metadata"]["services"]["web"];
  assert_eq!(web["ports"][0]["text"], "filled");
  assert_eq!(web["envs"][0]["text"], "filled");
}

#[cfg(unix)]
#[test]
fn test_failing_fill_command_is_a_warning() {
  let env = TestEnv::from_fixture("web.yml");

  env
    .casagen_cmd()
    .args(["update", env.descriptor(), "--fill-command", "exit 3"])
    .assert()
    .success()
    .stderr(predicate::str::contains("fill"));

  assert_eq!(env.show_json()["services"]["web"]["ports"][0]["text"], "");
}
