use std::collections::BTreeSet;

use casagen_lib::diff::ChangeKind;
use casagen_lib::update::{UpdateMode, UpdateOptions, run_update};

use super::common::{CountingFiller, WEB, WEB_AND_DB, temp_store};

#[test]
fn fresh_generation_has_one_service_with_empty_fields() {
  let (_temp, store) = temp_store();

  let outcome = run_update(&store, WEB.as_bytes(), &UpdateOptions::default(), None).unwrap();

  assert_eq!(outcome.mode, UpdateMode::Full);
  let metadata = &outcome.metadata;
  assert_eq!(metadata.services.len(), 1);
  let web = &metadata.services["web"];
  assert_eq!(web.ports.len(), 1);
  assert_eq!(web.ports[0].identifier, "80");
  assert_eq!(web.ports[0].text, "");
  assert_eq!(web.envs.len(), 1);
  assert_eq!(web.envs[0].identifier, "TZ");
  assert_eq!(web.envs[0].text, "");
  assert_eq!(metadata.app.port_map, "8080");
}

#[test]
fn adding_a_service_keeps_existing_text() {
  let (_temp, store) = temp_store();
  let filler = CountingFiller::default();
  let first = run_update(&store, WEB.as_bytes(), &UpdateOptions::default(), Some(&filler)).unwrap();
  assert_eq!(first.metadata.services["web"].ports[0].text, "web/80");

  let outcome = run_update(&store, WEB_AND_DB.as_bytes(), &UpdateOptions::default(), None).unwrap();

  assert_eq!(outcome.mode, UpdateMode::Incremental);
  let diff = outcome.diff.as_ref().unwrap();
  assert_eq!(diff.added_services, BTreeSet::from(["db".to_string()]));
  assert!(diff.added_fields.iter().all(|c| c.kind == ChangeKind::Added));
  assert_eq!(
    diff.added_fields.iter().map(|c| c.path()).collect::<Vec<_>>(),
    vec!["services.db.ports.5432"]
  );

  assert_eq!(outcome.metadata.services["web"], first.metadata.services["web"]);
  let db = &outcome.metadata.services["db"];
  assert_eq!(db.ports.len(), 1);
  assert_eq!(db.ports[0].identifier, "5432");
  assert_eq!(db.ports[0].text, "");
}

#[test]
fn removing_a_service_drops_its_metadata() {
  let (_temp, store) = temp_store();
  run_update(&store, WEB.as_bytes(), &UpdateOptions::default(), None).unwrap();
  run_update(&store, WEB_AND_DB.as_bytes(), &UpdateOptions::default(), None).unwrap();

  let outcome = run_update(&store, WEB.as_bytes(), &UpdateOptions::default(), None).unwrap();

  let diff = outcome.diff.unwrap();
  assert_eq!(diff.removed_services, BTreeSet::from(["db".to_string()]));
  assert!(!outcome.metadata.services.contains_key("db"));
  assert!(!store.load_current().unwrap().services.contains_key("db"));
}

#[test]
fn second_run_is_idempotent_without_fill() {
  let (_temp, store) = temp_store();
  let filler = CountingFiller::default();

  let first = run_update(&store, WEB_AND_DB.as_bytes(), &UpdateOptions::default(), Some(&filler)).unwrap();
  let second = run_update(&store, WEB_AND_DB.as_bytes(), &UpdateOptions::default(), Some(&filler)).unwrap();

  assert_eq!(filler.calls.get(), 1);
  assert_eq!(second.mode, UpdateMode::Cached);
  assert_eq!(first.metadata, second.metadata);
}

#[test]
fn state_survives_reopening_the_store() {
  let (temp, store) = temp_store();
  let filler = CountingFiller::default();
  run_update(&store, WEB.as_bytes(), &UpdateOptions::default(), Some(&filler)).unwrap();
  drop(store);

  let reopened = casagen_lib::snapshot::SnapshotStore::open(temp.path().join(".casagen"));
  let outcome = run_update(&reopened, WEB.as_bytes(), &UpdateOptions::default(), Some(&filler)).unwrap();

  assert_eq!(outcome.mode, UpdateMode::Cached);
  assert_eq!(filler.calls.get(), 1);
}
