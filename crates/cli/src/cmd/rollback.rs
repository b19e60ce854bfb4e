use anyhow::{Context, Result, bail};

use casagen_lib::snapshot::{HistoryKey, SnapshotError, SnapshotStore};

use crate::output::{print_info, print_success};

pub fn cmd_rollback(store: &SnapshotStore, key: &str) -> Result<()> {
  match store.rollback(&HistoryKey::new(key)) {
    Ok(backup) => {
      print_success(&format!("Rolled back to {key}"));
      if let Some(backup) = backup {
        print_info(&format!("Previous metadata saved as {backup}"));
      }
      Ok(())
    }
    Err(SnapshotError::NotFound { available, .. }) if available.is_empty() => {
      bail!("History entry '{key}' not found; history is empty")
    }
    Err(SnapshotError::NotFound { available, .. }) => {
      bail!(
        "History entry '{key}' not found. Available entries:\n  {}",
        available.join("\n  ")
      )
    }
    Err(e) => Err(e).context("Rollback failed"),
  }
}
