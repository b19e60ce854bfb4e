use anyhow::Result;

use casagen_lib::snapshot::{SnapshotStore, StoreConfig};

use crate::output::{OutputFormat, print_json, print_stat, print_success};

pub fn cmd_config(
  store: &SnapshotStore,
  max_history: Option<u64>,
  auto_backup: Option<bool>,
  output: OutputFormat,
) -> Result<()> {
  let mut config = store.config();

  if max_history.is_some() || auto_backup.is_some() {
    if let Some(max) = max_history {
      config.max_history_versions = usize::try_from(max)?;
    }
    if let Some(enabled) = auto_backup {
      config.auto_backup_before_update = enabled;
    }
    store.save_config(&config)?;
    if !output.is_json() {
      print_success("Saved config");
    }
  }

  if output.is_json() {
    return print_json(&config);
  }
  print_config(&config);
  Ok(())
}

fn print_config(config: &StoreConfig) {
  print_stat("max_history_versions", &config.max_history_versions.to_string());
  print_stat("auto_backup_before_update", &config.auto_backup_before_update.to_string());
}
