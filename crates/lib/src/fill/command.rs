//! Fill by running a shell command.

use std::io::Write;
use std::process::{Command, Stdio};
use std::thread;

use tracing::{debug, info};

use crate::consts::FILL_MODE_ENV;
use crate::metadata::MetadataTree;

use super::{FillError, MetadataFiller};

/// Runs a shell command as the fill service.
///
/// The command reads the metadata tree as JSON on stdin, sees
/// `CASAGEN_FILL_MODE=only-empty|all` in its environment, and prints the
/// filled tree as JSON on stdout.
#[derive(Debug, Clone)]
pub struct CommandFiller {
  command: String,
}

impl CommandFiller {
  pub fn new(command: impl Into<String>) -> Self {
    Self { command: command.into() }
  }

  pub fn command(&self) -> &str {
    &self.command
  }
}

/// Value of the fill-mode environment variable.
pub fn fill_mode_name(only_empty: bool) -> &'static str {
  if only_empty { "only-empty" } else { "all" }
}

impl MetadataFiller for CommandFiller {
  fn fill(&self, tree: &MetadataTree, only_empty: bool) -> Result<MetadataTree, FillError> {
    info!(cmd = %self.command, mode = fill_mode_name(only_empty), "running fill command");

    let input = serde_json::to_vec_pretty(tree).map_err(FillError::Encode)?;
    let spawn_error = |source| FillError::Spawn {
      command: self.command.clone(),
      source,
    };

    let (shell, flag) = shell();
    let mut child = Command::new(shell)
      .arg(flag)
      .arg(&self.command)
      .env(FILL_MODE_ENV, fill_mode_name(only_empty))
      .stdin(Stdio::piped())
      .stdout(Stdio::piped())
      .stderr(Stdio::piped())
      .spawn()
      .map_err(spawn_error)?;

    // Feed stdin from another thread so a command that writes before reading
    // everything cannot deadlock against us.
    let writer = child.stdin.take().map(|mut stdin| {
      thread::spawn(move || {
        // A command that exits without reading its input closes the pipe early.
        let _ = stdin.write_all(&input);
      })
    });

    let output = child.wait_with_output().map_err(spawn_error)?;
    if let Some(writer) = writer {
      let _ = writer.join();
    }

    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    if !stderr.is_empty() {
      debug!(stderr = %stderr, "fill command stderr");
    }

    if !output.status.success() {
      return Err(FillError::CommandFailed {
        command: self.command.clone(),
        code: output.status.code(),
        stderr,
      });
    }

    serde_json::from_slice(&output.stdout).map_err(FillError::InvalidResponse)
  }
}

#[cfg(unix)]
fn shell() -> (&'static str, &'static str) {
  ("/bin/sh", "-c")
}

#[cfg(windows)]
fn shell() -> (&'static str, &'static str) {
  ("cmd.exe", "/C")
}
