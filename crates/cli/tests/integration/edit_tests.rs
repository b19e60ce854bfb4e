use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn test_edit_sets_field_text() {
  let env = TestEnv::from_fixture("web.yml");
  env.update_json(&[]);

  env
    .casagen_cmd()
    .args(["edit", "services.web.envs.TZ", "Time zone"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Updated services.web.envs.TZ"));

  let env_field = &env.show_json()["services"]["web"]["envs"][0];
  assert_eq!(env_field["text"], "Time zone");
  assert_eq!(env_field["is_user_authored"], true);
}

#[test]
fn test_edit_app_tagline() {
  let env = TestEnv::from_fixture("web.yml");
  env.update_json(&[]);

  env
    .casagen_cmd()
    .args(["edit", "app.tagline", "Serve static files"])
    .assert()
    .success();

  assert_eq!(env.show_json()["app"]["tagline"], "Serve static files");
}

#[test]
fn test_edit_unknown_field_fails() {
  let env = TestEnv::from_fixture("web.yml");
  env.update_json(&[]);

  env
    .casagen_cmd()
    .args(["edit", "services.web.ports.9999", "nope"])
    .assert()
    .failure();
}

#[test]
fn test_edit_survives_cached_update() {
  let env = TestEnv::from_fixture("web.yml");
  env.update_json(&[]);
  env
    .casagen_cmd()
    .args(["edit", "services.web.ports.80", "Web UI"])
    .assert()
    .success();

  let outcome = env.update_json(&[]);

  assert_eq!(outcome["mode"], "cached");
  assert_eq!(outcome["metadata"]["services"]["web"]["ports"][0]["text"], "Web UI");
}
