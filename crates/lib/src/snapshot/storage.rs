//! Snapshot storage.
//!
//! # Storage Layout
//!
//! ```text
//! {work_dir}/
//! ├── config.json            # StoreConfig
//! ├── meta.current.json      # current Snapshot
//! ├── descriptor.sha256      # fingerprint of the last committed descriptor
//! ├── descriptor.prev        # raw bytes of the last committed descriptor
//! └── history/
//!     └── meta.<key>.json    # previous snapshots
//! ```
//!
//! Reads never fail: missing or unreadable blobs are logged and treated as
//! absent. Writes return [`SnapshotError::Write`].

use std::path::PathBuf;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::metadata::MetadataTree;
use crate::util::hash::Fingerprint;

use super::backend::{BlobStore, FsBlobStore};
use super::types::{HistoryEntry, HistoryKey, Snapshot, SnapshotError, StoreConfig};

const CONFIG_KEY: &str = "config.json";
const CURRENT_KEY: &str = "meta.current.json";
const FINGERPRINT_KEY: &str = "descriptor.sha256";
const DESCRIPTOR_KEY: &str = "descriptor.prev";
const HISTORY_PREFIX: &str = "history/meta.";
const HISTORY_SUFFIX: &str = ".json";

/// Name used for the current snapshot in errors.
pub const CURRENT_SNAPSHOT_NAME: &str = "current";

/// Persists metadata snapshots, descriptor fingerprints and history.
///
/// The store holds no locks; one writer per work directory.
#[derive(Debug)]
pub struct SnapshotStore {
  blobs: Box<dyn BlobStore>,
}

impl SnapshotStore {
  /// Create a store over any blob backend.
  pub fn new(blobs: impl BlobStore + 'static) -> Self {
    Self { blobs: Box::new(blobs) }
  }

  /// Open the filesystem store rooted at `work_dir`. Nothing is created until the first write.
  pub fn open(work_dir: impl Into<PathBuf>) -> Self {
    Self::new(FsBlobStore::new(work_dir))
  }

  fn history_blob_key(key: &HistoryKey) -> String {
    format!("{HISTORY_PREFIX}{key}{HISTORY_SUFFIX}")
  }

  fn read_blob(&self, key: &str) -> Option<Vec<u8>> {
    match self.blobs.read(key) {
      Ok(bytes) => bytes,
      Err(e) => {
        warn!(key, error = %e, "failed to read blob, treating as absent");
        None
      }
    }
  }

  fn write_blob(&self, key: &str, bytes: &[u8]) -> Result<(), SnapshotError> {
    self.blobs.write(key, bytes).map_err(|source| SnapshotError::Write {
      key: key.to_string(),
      source,
    })
  }

  fn write_snapshot(&self, snapshot: &Snapshot) -> Result<(), SnapshotError> {
    let content = serde_json::to_vec_pretty(snapshot).map_err(SnapshotError::Serialize)?;
    self.write_blob(CURRENT_KEY, &content)
  }

  // Config

  /// Store-wide config. Missing or corrupt config yields defaults.
  pub fn config(&self) -> StoreConfig {
    let Some(bytes) = self.read_blob(CONFIG_KEY) else {
      return StoreConfig::default();
    };
    serde_json::from_slice(&bytes).unwrap_or_else(|e| {
      warn!(error = %e, "config is corrupt, using defaults");
      StoreConfig::default()
    })
  }

  pub fn save_config(&self, config: &StoreConfig) -> Result<(), SnapshotError> {
    let content = serde_json::to_vec_pretty(config).map_err(SnapshotError::Serialize)?;
    self.write_blob(CONFIG_KEY, &content)
  }

  // Descriptor tracking

  /// Fingerprint recorded by the last commit.
  pub fn stored_fingerprint(&self) -> Option<Fingerprint> {
    let bytes = self.read_blob(FINGERPRINT_KEY)?;
    let parsed = std::str::from_utf8(&bytes).ok().and_then(Fingerprint::parse);
    if parsed.is_none() {
      warn!("stored fingerprint is corrupt, treating as absent");
    }
    parsed
  }

  /// True unless the recorded fingerprint equals the fingerprint of `descriptor_bytes`.
  pub fn has_descriptor_changed(&self, descriptor_bytes: &[u8]) -> bool {
    self.stored_fingerprint() != Some(Fingerprint::of(descriptor_bytes))
  }

  /// Raw bytes of the descriptor from the last commit.
  pub fn previous_descriptor(&self) -> Option<Vec<u8>> {
    self.read_blob(DESCRIPTOR_KEY)
  }

  // Current snapshot

  /// The current snapshot, or `None` if never committed or corrupt.
  pub fn load_current_snapshot(&self) -> Option<Snapshot> {
    let bytes = self.read_blob(CURRENT_KEY)?;
    match serde_json::from_slice(&bytes) {
      Ok(snapshot) => Some(snapshot),
      Err(e) => {
        warn!(error = %e, "current snapshot is corrupt, treating as absent");
        None
      }
    }
  }

  /// Metadata of the current snapshot.
  pub fn load_current(&self) -> Option<MetadataTree> {
    self.load_current_snapshot().map(|s| s.metadata)
  }

  /// Record `metadata` as current for `descriptor_bytes`.
  ///
  /// Write order: history backup (if enabled), descriptor backup, fingerprint,
  /// then the current snapshot. A failure at any step leaves the previous
  /// current snapshot readable.
  ///
  /// Returns the history key of the backed-up previous snapshot, if any.
  pub fn commit(&self, metadata: &MetadataTree, descriptor_bytes: &[u8]) -> Result<Option<HistoryKey>, SnapshotError> {
    let backup = self.backup_if_enabled()?;

    let fingerprint = Fingerprint::of(descriptor_bytes);
    self.write_blob(DESCRIPTOR_KEY, descriptor_bytes)?;
    self.write_blob(FINGERPRINT_KEY, fingerprint.0.as_bytes())?;
    self.write_snapshot(&Snapshot::new(metadata.clone(), fingerprint.clone()))?;

    info!(fingerprint = %fingerprint.short(), "committed metadata");
    Ok(backup)
  }

  /// Replace the current metadata, keeping the recorded descriptor.
  pub fn amend_current(&self, metadata: &MetadataTree) -> Result<Option<HistoryKey>, SnapshotError> {
    let Some(current) = self.load_current_snapshot() else {
      return Err(SnapshotError::NotFound {
        key: CURRENT_SNAPSHOT_NAME.to_string(),
        available: self.history_keys(),
      });
    };

    let backup = self.backup_if_enabled()?;
    self.write_snapshot(&Snapshot::new(metadata.clone(), current.source_fingerprint))?;

    info!("amended current metadata");
    Ok(backup)
  }

  fn backup_if_enabled(&self) -> Result<Option<HistoryKey>, SnapshotError> {
    if self.config().auto_backup_before_update {
      self.push_history()
    } else {
      Ok(None)
    }
  }

  // History

  /// Copy the current snapshot into history and rotate.
  ///
  /// Returns `None` when there is no current snapshot, or when
  /// `max_history_versions` is 0 and nothing is kept.
  pub fn push_history(&self) -> Result<Option<HistoryKey>, SnapshotError> {
    let Some(current) = self.read_blob(CURRENT_KEY) else {
      return Ok(None);
    };

    let max = self.config().max_history_versions;
    if max == 0 {
      debug!("history retention is 0, not backing up");
      self.rotate(0);
      return Ok(None);
    }

    let key = HistoryKey::unique_at(Utc::now(), &self.history_keys_raw());
    self.write_blob(&Self::history_blob_key(&key), &current)?;
    info!(key = %key, "backed up current metadata");

    self.rotate(max);
    Ok(Some(key))
  }

  /// Delete the oldest entries beyond `max`.
  fn rotate(&self, max: usize) {
    let keys = self.history_keys_raw();
    for key in keys.iter().skip(max) {
      match self.blobs.delete(&Self::history_blob_key(key)) {
        Ok(()) => debug!(key = %key, "rotated out history entry"),
        Err(e) => warn!(key = %key, error = %e, "failed to delete history entry"),
      }
    }
  }

  /// History keys with blob sizes, newest first. Blobs that are not history
  /// entries are skipped.
  fn history_blobs(&self) -> Vec<(HistoryKey, u64)> {
    let listed = match self.blobs.list(HISTORY_PREFIX) {
      Ok(listed) => listed,
      Err(e) => {
        warn!(error = %e, "failed to list history, treating as empty");
        return Vec::new();
      }
    };

    let mut entries: Vec<(HistoryKey, u64)> = listed
      .into_iter()
      .filter_map(|blob| {
        let key = blob
          .key
          .strip_prefix(HISTORY_PREFIX)
          .and_then(|rest| rest.strip_suffix(HISTORY_SUFFIX))
          .filter(|rest| !rest.is_empty())
          .map(HistoryKey::new)?;
        Some((key, blob.size_bytes))
      })
      .collect();
    entries.sort_by(|a, b| b.0.cmp(&a.0));
    entries
  }

  fn history_keys_raw(&self) -> Vec<HistoryKey> {
    self.history_blobs().into_iter().map(|(key, _)| key).collect()
  }

  fn history_keys(&self) -> Vec<String> {
    self.history_keys_raw().into_iter().map(|k| k.to_string()).collect()
  }

  /// History entries, newest first.
  pub fn list_history(&self) -> Vec<HistoryEntry> {
    self
      .history_blobs()
      .into_iter()
      .map(|(key, size_bytes)| HistoryEntry {
        created_at: key.created_at().unwrap_or_default(),
        size_bytes,
        key,
      })
      .collect()
  }

  fn read_history_bytes(&self, key: &HistoryKey) -> Result<Vec<u8>, SnapshotError> {
    self
      .read_blob(&Self::history_blob_key(key))
      .ok_or_else(|| SnapshotError::NotFound {
        key: key.to_string(),
        available: self.history_keys(),
      })
  }

  /// Load one history entry.
  pub fn load_history(&self, key: &HistoryKey) -> Result<Snapshot, SnapshotError> {
    let bytes = self.read_history_bytes(key)?;
    serde_json::from_slice(&bytes).map_err(|source| SnapshotError::Corrupt {
      key: key.to_string(),
      source,
    })
  }

  /// Restore the history entry `key` as current.
  ///
  /// The target is read and validated first; then the existing current
  /// snapshot is backed up (regardless of the auto-backup setting) and
  /// replaced. The restored snapshot is stamped with the recorded
  /// fingerprint, so an update with an unchanged descriptor serves it from
  /// cache.
  ///
  /// Returns the history key of the backup, if one was kept.
  pub fn rollback(&self, key: &HistoryKey) -> Result<Option<HistoryKey>, SnapshotError> {
    let bytes = self.read_history_bytes(key)?;
    let mut restored: Snapshot = serde_json::from_slice(&bytes).map_err(|source| SnapshotError::Corrupt {
      key: key.to_string(),
      source,
    })?;
    if let Some(fingerprint) = self.stored_fingerprint() {
      restored.source_fingerprint = fingerprint;
    }

    let backup = self.push_history()?;
    self.write_snapshot(&restored)?;

    info!(key = %key, "rolled back current metadata");
    Ok(backup)
  }
}
