//! Work directory resolution.

use std::path::{Path, PathBuf};

use crate::consts::{WORK_DIR_ENV, WORK_DIR_NAME};

/// Returns the work directory holding the snapshot store.
///
/// Priority order:
/// 1. Explicit path (from `--work-dir`)
/// 2. `CASAGEN_WORK_DIR` environment variable
/// 3. `./.casagen`
pub fn work_dir(explicit: Option<&Path>) -> PathBuf {
  if let Some(path) = explicit {
    return path.to_path_buf();
  }

  match std::env::var(WORK_DIR_ENV) {
    Ok(dir) if !dir.trim().is_empty() => PathBuf::from(dir),
    _ => PathBuf::from(".").join(WORK_DIR_NAME),
  }
}
