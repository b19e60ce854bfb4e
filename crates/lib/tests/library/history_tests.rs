use casagen_lib::snapshot::{HistoryKey, SnapshotError, StoreConfig};
use casagen_lib::update::{UpdateMode, UpdateOptions, run_update};

use super::common::{CountingFiller, WEB, WEB_AND_DB, temp_store};

#[test]
fn rollback_restores_previous_metadata() {
  let (_temp, store) = temp_store();
  let a = run_update(&store, WEB.as_bytes(), &UpdateOptions::default(), None).unwrap();
  let b = run_update(&store, WEB_AND_DB.as_bytes(), &UpdateOptions::default(), None).unwrap();
  let key_of_a = b.backup_key.clone().unwrap();

  let backup_of_b = store.rollback(&key_of_a).unwrap().unwrap();

  assert_eq!(store.load_current(), Some(a.metadata));
  assert_eq!(store.load_history(&backup_of_b).unwrap().metadata, b.metadata);
}

#[test]
fn rollback_to_missing_key_is_not_found() {
  let (_temp, store) = temp_store();
  run_update(&store, WEB.as_bytes(), &UpdateOptions::default(), None).unwrap();
  let before = store.load_current();

  let err = store.rollback(&HistoryKey::new("missing-key")).unwrap_err();

  assert!(matches!(err, SnapshotError::NotFound { .. }));
  assert_eq!(store.load_current(), before);
}

#[test]
fn update_after_rollback_is_served_from_cache() {
  let (_temp, store) = temp_store();
  let filler = CountingFiller::default();
  let a = run_update(&store, WEB.as_bytes(), &UpdateOptions::default(), Some(&filler)).unwrap();
  let b = run_update(&store, WEB_AND_DB.as_bytes(), &UpdateOptions::default(), Some(&filler)).unwrap();
  store.rollback(&b.backup_key.unwrap()).unwrap();
  let calls = filler.calls.get();
  let history = store.list_history().len();

  let outcome = run_update(&store, WEB_AND_DB.as_bytes(), &UpdateOptions::default(), Some(&filler)).unwrap();

  assert_eq!(outcome.mode, UpdateMode::Cached);
  assert!(outcome.warnings.is_empty());
  assert_eq!(outcome.metadata, a.metadata);
  assert_eq!(filler.calls.get(), calls);
  assert_eq!(store.list_history().len(), history);
  assert_eq!(store.load_current(), Some(a.metadata));
}

#[test]
fn zero_history_limit_is_honoured() {
  let (_temp, store) = temp_store();
  store
    .save_config(&StoreConfig {
      max_history_versions: 0,
      auto_backup_before_update: true,
    })
    .unwrap();

  run_update(&store, WEB.as_bytes(), &UpdateOptions::default(), None).unwrap();
  let outcome = run_update(&store, WEB_AND_DB.as_bytes(), &UpdateOptions::default(), None).unwrap();

  assert!(outcome.backup_key.is_none());
  assert!(store.list_history().is_empty());
}

#[test]
fn history_is_bounded_by_config() {
  let (_temp, store) = temp_store();
  store
    .save_config(&StoreConfig {
      max_history_versions: 2,
      auto_backup_before_update: true,
    })
    .unwrap();

  for i in 0..5 {
    let descriptor = format!("services:\n  web:\n    image: nginx\n    ports: ['{}:80']\n    environment: [V{i}]\n", 8080 + i);
    run_update(&store, descriptor.as_bytes(), &UpdateOptions::default(), None).unwrap();
  }

  let history = store.list_history();
  assert_eq!(history.len(), 2);
  assert!(history[0].key > history[1].key);
  assert!(history.iter().all(|entry| entry.created_at > 0 && entry.size_bytes > 0));
}
