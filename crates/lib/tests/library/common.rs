//! Shared helpers for library integration tests.

use std::cell::Cell;

use casagen_lib::fill::{FillError, MetadataFiller};
use casagen_lib::metadata::{FieldKind, MetadataTree};
use casagen_lib::snapshot::SnapshotStore;
use tempfile::TempDir;

/// One service `web` publishing 8080→80 with `TZ`.
pub const WEB: &str = r#"
services:
  web:
    image: nginx:latest
    ports:
      - "8080:80"
    environment:
      - TZ=Europe/Berlin
"#;

/// `WEB` plus a `db` service publishing 5432.
pub const WEB_AND_DB: &str = r#"
services:
  web:
    image: nginx:latest
    ports:
      - "8080:80"
    environment:
      - TZ=Europe/Berlin
  db:
    image: postgres:16
    ports:
      - "5432:5432"
"#;

/// A filesystem store in its own temp directory.
pub fn temp_store() -> (TempDir, SnapshotStore) {
  let temp = TempDir::new().unwrap();
  let store = SnapshotStore::open(temp.path().join(".casagen"));
  (temp, store)
}

/// Fills empty fields with `"<service>/<identifier>"` and counts calls.
#[derive(Default)]
pub struct CountingFiller {
  pub calls: Cell<usize>,
}

impl MetadataFiller for CountingFiller {
  fn fill(&self, tree: &MetadataTree, only_empty: bool) -> Result<MetadataTree, FillError> {
    self.calls.set(self.calls.get() + 1);
    let mut out = tree.clone();
    for (name, service) in out.services.iter_mut() {
      for kind in FieldKind::ALL {
        for field in service.fields_mut(kind) {
          if !only_empty || !field.has_text() {
            field.text = format!("{name}/{}", field.identifier);
          }
        }
      }
    }
    Ok(out)
  }
}
