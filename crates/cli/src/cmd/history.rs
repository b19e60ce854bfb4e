use anyhow::Result;
use clap::Subcommand;

use casagen_lib::snapshot::SnapshotStore;

use crate::output::{
  OutputFormat, format_bytes, format_timestamp, print_info, print_json, print_success, print_warning,
};

#[derive(Subcommand, Debug)]
pub enum HistoryCommand {
  /// List metadata backups, newest first
  List {
    /// Output format
    #[arg(short = 'o', long, value_enum, default_value = "text")]
    output: OutputFormat,
  },

  /// Back up the current metadata now
  Backup,
}

pub fn cmd_history(store: &SnapshotStore, command: HistoryCommand) -> Result<()> {
  match command {
    HistoryCommand::List { output } => cmd_list(store, output),
    HistoryCommand::Backup => cmd_backup(store),
  }
}

fn cmd_list(store: &SnapshotStore, output: OutputFormat) -> Result<()> {
  let entries = store.list_history();

  if output.is_json() {
    return print_json(&entries);
  }

  if entries.is_empty() {
    print_info("No history entries found");
    return Ok(());
  }

  for entry in &entries {
    println!(
      "{} - {} ({})",
      entry.key,
      format_timestamp(entry.created_at),
      format_bytes(entry.size_bytes)
    );
  }
  print_info(&format!("{} history entr(ies) total", entries.len()));

  Ok(())
}

fn cmd_backup(store: &SnapshotStore) -> Result<()> {
  match store.push_history()? {
    Some(key) => print_success(&format!("Backed up current metadata as {key}")),
    None => print_warning("No current metadata to back up"),
  }
  Ok(())
}
