//! Key-value blob backends for the snapshot store.
//!
//! Keys are `/`-separated relative names such as `meta.current.json` or
//! `history/meta.20250101T120000000Z.json`.

use std::collections::BTreeMap;
use std::fmt::Debug;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// A stored blob's key and size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobInfo {
  pub key: String,
  pub size_bytes: u64,
}

/// Minimal storage contract the snapshot store needs.
pub trait BlobStore: Debug + Send + Sync {
  /// Returns `Ok(None)` if the key does not exist.
  fn read(&self, key: &str) -> io::Result<Option<Vec<u8>>>;

  /// Replace the blob at `key`. Readers never observe a partial write.
  fn write(&self, key: &str, bytes: &[u8]) -> io::Result<()>;

  /// All blobs whose key starts with `prefix`, in no particular order.
  fn list(&self, prefix: &str) -> io::Result<Vec<BlobInfo>>;

  /// Remove a blob. Deleting a missing key succeeds.
  fn delete(&self, key: &str) -> io::Result<()>;
}

/// Blobs stored as files under a root directory.
#[derive(Debug, Clone)]
pub struct FsBlobStore {
  root: PathBuf,
}

impl FsBlobStore {
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self { root: root.into() }
  }

  fn path(&self, key: &str) -> PathBuf {
    self.root.join(key)
  }
}

impl BlobStore for FsBlobStore {
  fn read(&self, key: &str) -> io::Result<Option<Vec<u8>>> {
    match fs::read(self.path(key)) {
      Ok(bytes) => Ok(Some(bytes)),
      Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
      Err(e) => Err(e),
    }
  }

  fn write(&self, key: &str, bytes: &[u8]) -> io::Result<()> {
    let path = self.path(key);
    if let Some(parent) = path.parent() {
      fs::create_dir_all(parent)?;
    }

    let mut temp_name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    temp_name.push(".tmp");
    let temp_path = path.with_file_name(temp_name);

    fs::write(&temp_path, bytes)?;
    fs::rename(&temp_path, &path)
  }

  fn list(&self, prefix: &str) -> io::Result<Vec<BlobInfo>> {
    let (dir, name_prefix) = match prefix.rsplit_once('/') {
      Some((dir, name)) => (self.root.join(dir), name),
      None => (self.root.clone(), prefix),
    };
    let key_dir = prefix.rsplit_once('/').map(|(dir, _)| format!("{dir}/")).unwrap_or_default();

    let entries = match fs::read_dir(&dir) {
      Ok(entries) => entries,
      Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
      Err(e) => return Err(e),
    };

    let mut blobs = Vec::new();
    for entry in entries {
      let entry = entry?;
      let metadata = entry.metadata()?;
      if !metadata.is_file() {
        continue;
      }
      let Some(name) = entry.file_name().to_str().map(str::to_string) else {
        continue;
      };
      if name.starts_with(name_prefix) && !name.ends_with(".tmp") {
        blobs.push(BlobInfo {
          key: format!("{key_dir}{name}"),
          size_bytes: metadata.len(),
        });
      }
    }
    Ok(blobs)
  }

  fn delete(&self, key: &str) -> io::Result<()> {
    match fs::remove_file(self.path(key)) {
      Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
      _ => Ok(()),
    }
  }
}

/// In-memory blobs, shared between clones.
///
/// Writes can be made to fail on demand to exercise error paths.
#[derive(Debug, Clone, Default)]
pub struct MemoryBlobStore {
  blobs: Arc<Mutex<BTreeMap<String, Vec<u8>>>>,
  fail_writes: Arc<AtomicBool>,
}

impl MemoryBlobStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Make every subsequent `write` and `delete` fail until reset.
  pub fn set_fail_writes(&self, fail: bool) {
    self.fail_writes.store(fail, Ordering::SeqCst);
  }

  /// Insert raw bytes, bypassing the failure toggle.
  pub fn insert(&self, key: &str, bytes: impl Into<Vec<u8>>) {
    self.lock().insert(key.to_string(), bytes.into());
  }

  pub fn keys(&self) -> Vec<String> {
    self.lock().keys().cloned().collect()
  }

  fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, Vec<u8>>> {
    self.blobs.lock().unwrap_or_else(PoisonError::into_inner)
  }

  fn check_writable(&self, key: &str) -> io::Result<()> {
    if self.fail_writes.load(Ordering::SeqCst) {
      return Err(io::Error::other(format!("writes disabled for '{key}'")));
    }
    Ok(())
  }
}

impl BlobStore for MemoryBlobStore {
  fn read(&self, key: &str) -> io::Result<Option<Vec<u8>>> {
    Ok(self.lock().get(key).cloned())
  }

  fn write(&self, key: &str, bytes: &[u8]) -> io::Result<()> {
    self.check_writable(key)?;
    self.lock().insert(key.to_string(), bytes.to_vec());
    Ok(())
  }

  fn list(&self, prefix: &str) -> io::Result<Vec<BlobInfo>> {
    Ok(
      self
        .lock()
        .iter()
        .filter(|(key, _)| key.starts_with(prefix))
        .map(|(key, bytes)| BlobInfo {
          key: key.clone(),
          size_bytes: bytes.len() as u64,
        })
        .collect(),
    )
  }

  fn delete(&self, key: &str) -> io::Result<()> {
    self.check_writable(key)?;
    self.lock().remove(key);
    Ok(())
  }
}
