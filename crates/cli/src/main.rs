mod cmd;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use casagen_lib::paths::work_dir;
use casagen_lib::snapshot::SnapshotStore;

use cmd::{HistoryCommand, UpdateArgs};
use output::{OutputFormat, print_error};

/// casagen - keep app-store metadata in step with a compose stack
#[derive(Parser)]
#[command(name = "casagen")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Directory holding metadata snapshots (default: $CASAGEN_WORK_DIR or ./.casagen)
  #[arg(long, global = true, value_name = "DIR")]
  work_dir: Option<PathBuf>,

  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Generate or refresh metadata for a compose file
  Update(UpdateArgs),

  /// Show what changed since the last update without recording anything
  Diff {
    /// Path to the compose file
    descriptor: PathBuf,

    /// Output format
    #[arg(short = 'o', long, value_enum, default_value = "text")]
    output: OutputFormat,
  },

  /// List or create metadata backups
  History {
    #[command(subcommand)]
    command: HistoryCommand,
  },

  /// Restore a metadata backup as current
  Rollback {
    /// History key, as printed by `history list`
    key: String,
  },

  /// Show the current metadata
  Show {
    /// Output format
    #[arg(short = 'o', long, value_enum, default_value = "text")]
    output: OutputFormat,
  },

  /// Set one text field of the current metadata
  Edit {
    /// Field to edit, e.g. `app.tagline` or `services.web.ports.80`
    locator: String,

    /// New text
    text: String,
  },

  /// Show or change store settings
  Config {
    /// Number of history entries to keep (0 disables history)
    #[arg(long)]
    max_history: Option<u64>,

    /// Back up current metadata before each update
    #[arg(long)]
    auto_backup: Option<bool>,

    /// Output format
    #[arg(short = 'o', long, value_enum, default_value = "text")]
    output: OutputFormat,
  },
}

fn init_tracing(verbose: bool) {
  let default_level = if verbose { "debug" } else { "warn" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();
}

fn main() -> ExitCode {
  let cli = Cli::parse();
  init_tracing(cli.verbose);

  let store = SnapshotStore::open(work_dir(cli.work_dir.as_deref()));

  let result = match cli.command {
    Commands::Update(args) => cmd::cmd_update(&store, args),
    Commands::Diff { descriptor, output } => cmd::cmd_diff(&store, &descriptor, output),
    Commands::History { command } => cmd::cmd_history(&store, command),
    Commands::Rollback { key } => cmd::cmd_rollback(&store, &key),
    Commands::Show { output } => cmd::cmd_show(&store, output),
    Commands::Edit { locator, text } => cmd::cmd_edit(&store, &locator, &text),
    Commands::Config {
      max_history,
      auto_backup,
      output,
    } => cmd::cmd_config(&store, max_history, auto_backup, output),
  };

  match result {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      print_error(&format!("{e:#}"));
      ExitCode::FAILURE
    }
  }
}
