//! Update command implementation.
//!
//! Runs one orchestrated update for a compose file and reports how the
//! metadata was produced.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use tracing::debug;

use casagen_lib::fill::{CommandFiller, MetadataFiller};
use casagen_lib::metadata::Params;
use casagen_lib::snapshot::SnapshotStore;
use casagen_lib::update::{UpdateMode, UpdateOptions, run_update};

use crate::cmd::diff::print_diff;
use crate::output::{OutputFormat, print_info, print_json, print_success, print_warning};

#[derive(Args, Debug)]
pub struct UpdateArgs {
  /// Path to the compose file
  pub descriptor: PathBuf,

  /// Regenerate from scratch, ignoring cached and previous metadata
  #[arg(long)]
  pub force: bool,

  /// YAML file with app and field overrides
  #[arg(long, value_name = "FILE")]
  pub params: Option<PathBuf>,

  /// Shell command that fills empty text (metadata JSON on stdin and stdout)
  #[arg(long, value_name = "CMD")]
  pub fill_command: Option<String>,

  /// Also write the metadata JSON to this file
  #[arg(long, value_name = "FILE")]
  pub out: Option<PathBuf>,

  /// Output format
  #[arg(short = 'o', long, value_enum, default_value = "text")]
  pub output: OutputFormat,
}

fn load_params(path: &Path) -> Result<Params> {
  let content = fs::read(path).with_context(|| format!("Failed to read params file: {}", path.display()))?;
  Params::from_yaml(&content).with_context(|| format!("Invalid params file: {}", path.display()))
}

pub fn cmd_update(store: &SnapshotStore, args: UpdateArgs) -> Result<()> {
  let descriptor = fs::read(&args.descriptor)
    .with_context(|| format!("Failed to read descriptor: {}", args.descriptor.display()))?;
  debug!(path = %args.descriptor.display(), bytes = descriptor.len(), "read descriptor");

  let options = UpdateOptions {
    force_regenerate: args.force,
    params: args.params.as_deref().map(load_params).transpose()?,
  };
  let filler = args.fill_command.as_deref().map(CommandFiller::new);
  if let Some(filler) = &filler {
    debug!(cmd = filler.command(), "using fill command");
  }

  let outcome = run_update(
    store,
    &descriptor,
    &options,
    filler.as_ref().map(|f| f as &dyn MetadataFiller),
  )
  .with_context(|| format!("Update failed for {}", args.descriptor.display()))?;

  if let Some(path) = &args.out {
    let json = serde_json::to_string_pretty(&outcome.metadata).context("Failed to serialize metadata")?;
    fs::write(path, json + "\n").with_context(|| format!("Failed to write metadata: {}", path.display()))?;
  }

  if args.output.is_json() {
    return print_json(&outcome);
  }

  for warning in &outcome.warnings {
    print_warning(&warning.to_string());
  }

  match outcome.mode {
    UpdateMode::Cached => print_success("Descriptor unchanged, metadata is up to date"),
    UpdateMode::Full => print_success(&format!(
      "Generated metadata for {} service(s), {} field(s)",
      outcome.metadata.services.len(),
      outcome.metadata.field_count()
    )),
    UpdateMode::Incremental => print_success("Updated metadata incrementally"),
  }

  if let Some(diff) = &outcome.diff {
    print_diff(diff);
  }

  let empty = outcome.metadata.empty_fields().len();
  if empty > 0 {
    print_info(&format!("{empty} field(s) still without text"));
  }
  if let Some(key) = &outcome.backup_key {
    print_info(&format!("Previous metadata saved as {key}"));
  }
  if let Some(path) = &args.out {
    print_info(&format!("Wrote {}", path.display()));
  }

  Ok(())
}
