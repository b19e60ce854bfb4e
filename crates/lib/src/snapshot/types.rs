use std::fmt;
use std::io;

use chrono::{DateTime, NaiveDateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::DEFAULT_MAX_HISTORY_VERSIONS;
use crate::metadata::MetadataTree;
use crate::util::hash::Fingerprint;

/// Key format of history entries: UTC time with milliseconds.
const HISTORY_KEY_FORMAT: &str = "%Y%m%dT%H%M%S%3fZ";

/// Errors raised by [`SnapshotStore`](super::SnapshotStore) operations that must not fail silently.
#[derive(Debug, Error)]
pub enum SnapshotError {
  #[error("snapshot '{key}' not found ({})", describe_available(.available))]
  NotFound { key: String, available: Vec<String> },

  #[error("failed to write '{key}': {source}")]
  Write {
    key: String,
    #[source]
    source: io::Error,
  },

  #[error("failed to serialize snapshot: {0}")]
  Serialize(#[source] serde_json::Error),

  #[error("snapshot '{key}' is corrupt: {source}")]
  Corrupt {
    key: String,
    #[source]
    source: serde_json::Error,
  },
}

fn describe_available(available: &[String]) -> String {
  if available.is_empty() {
    "history is empty".to_string()
  } else {
    format!("available: {}", available.join(", "))
  }
}

/// A committed metadata tree plus the fingerprint of the descriptor it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
  pub metadata: MetadataTree,
  pub source_fingerprint: Fingerprint,
  /// Unix seconds.
  pub created_at: u64,
}

impl Snapshot {
  pub fn new(metadata: MetadataTree, source_fingerprint: Fingerprint) -> Self {
    Self {
      metadata,
      source_fingerprint,
      created_at: u64::try_from(Utc::now().timestamp()).unwrap_or_default(),
    }
  }
}

/// Sortable identifier of a history entry, e.g. `20250101T120000123Z`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HistoryKey(String);

impl HistoryKey {
  pub fn new(key: impl Into<String>) -> Self {
    Self(key.into())
  }

  /// Key for a point in time.
  pub fn at(time: DateTime<Utc>) -> Self {
    Self(time.format(HISTORY_KEY_FORMAT).to_string())
  }

  /// Key for `time`, moved past the newest of `taken` so keys keep sorting by creation order.
  pub fn unique_at(time: DateTime<Utc>, taken: &[HistoryKey]) -> Self {
    let mut time = match taken.iter().filter_map(HistoryKey::time).max() {
      Some(newest) if newest >= time => newest + TimeDelta::milliseconds(1),
      _ => time,
    };
    loop {
      let key = Self::at(time);
      if !taken.contains(&key) {
        return key;
      }
      time += TimeDelta::milliseconds(1);
    }
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }

  /// Creation time encoded in the key.
  pub fn time(&self) -> Option<DateTime<Utc>> {
    let seconds = NaiveDateTime::parse_from_str(self.0.get(..15)?, "%Y%m%dT%H%M%S").ok()?;
    let millis: i64 = self.0.get(15..18)?.parse().ok()?;
    Some(seconds.and_utc() + TimeDelta::milliseconds(millis))
  }

  /// Creation time encoded in the key, in unix seconds.
  pub fn created_at(&self) -> Option<u64> {
    self.time().and_then(|t| u64::try_from(t.timestamp()).ok())
  }
}

impl fmt::Display for HistoryKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

/// One row of [`SnapshotStore::list_history`](super::SnapshotStore::list_history).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
  pub key: HistoryKey,
  /// Unix seconds, 0 when the key does not encode a time.
  pub created_at: u64,
  pub size_bytes: u64,
}

/// Store-wide settings persisted next to the snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
  pub max_history_versions: usize,
  pub auto_backup_before_update: bool,
}

impl Default for StoreConfig {
  fn default() -> Self {
    Self {
      max_history_versions: DEFAULT_MAX_HISTORY_VERSIONS,
      auto_backup_before_update: true,
    }
  }
}
