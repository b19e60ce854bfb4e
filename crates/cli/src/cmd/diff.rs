//! Diff command implementation.
//!
//! Compares a compose file against the last committed one without touching
//! the store.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use casagen_lib::diff::DiffReport;
use casagen_lib::snapshot::SnapshotStore;
use casagen_lib::update::preview_diff;

use crate::output::{OutputFormat, print_added, print_info, print_json, print_removed};

pub fn cmd_diff(store: &SnapshotStore, descriptor: &Path, output: OutputFormat) -> Result<()> {
  let bytes = fs::read(descriptor).with_context(|| format!("Failed to read descriptor: {}", descriptor.display()))?;
  let diff = preview_diff(store, &bytes)?;

  if output.is_json() {
    return print_json(&serde_json::json!({ "diff": diff }));
  }

  match diff {
    None => print_info("No previous descriptor recorded; the next update will generate from scratch"),
    Some(diff) if !diff.has_changes() => print_info("No structural changes"),
    Some(diff) => print_diff(&diff),
  }

  Ok(())
}

/// Human-readable diff listing, services first.
pub fn print_diff(diff: &DiffReport) {
  if !diff.has_changes() {
    return;
  }

  for service in &diff.added_services {
    print_added(&format!("service {service}"));
  }
  for service in &diff.removed_services {
    print_removed(&format!("service {service}"));
  }
  for change in &diff.added_fields {
    print_added(&change.path());
  }
  for change in &diff.removed_fields {
    print_removed(&change.path());
  }

  print_info(&format!("{} change(s)", diff.change_count()));
}
