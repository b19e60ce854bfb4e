use anyhow::{Context, Result};

use casagen_lib::metadata::FieldLocator;
use casagen_lib::snapshot::SnapshotStore;

use crate::output::{print_info, print_success};

pub fn cmd_edit(store: &SnapshotStore, locator: &str, text: &str) -> Result<()> {
  let locator: FieldLocator = locator.parse()?;
  let mut metadata = store
    .load_current()
    .context("No metadata recorded yet; run `casagen update <descriptor>` first")?;

  metadata.set_text(&locator, text, true)?;
  let backup = store.amend_current(&metadata)?;

  print_success(&format!("Updated {locator}"));
  if let Some(key) = backup {
    print_info(&format!("Previous metadata saved as {key}"));
  }
  Ok(())
}
