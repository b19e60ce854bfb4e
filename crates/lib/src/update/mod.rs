//! Update orchestration.
//!
//! One [`run_update`] call takes a descriptor through the full cycle:
//! fingerprint check, skeleton derivation, diff and merge against the previous
//! run, fill of still-empty text, and commit.

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::descriptor::{Descriptor, DescriptorError, parse_descriptor};
use crate::diff::{DiffReport, compute_diff};
use crate::fill::{MetadataFiller, fill_checked, pending_fields};
use crate::merge::merge;
use crate::metadata::{AppField, FieldLocator, MetadataTree, Params, build_skeleton};
use crate::snapshot::{HistoryKey, SnapshotError, SnapshotStore};
use crate::util::hash::Fingerprint;

/// Options for one update.
#[derive(Debug, Clone, Default)]
pub struct UpdateOptions {
  /// Ignore the cache and any previous metadata.
  pub force_regenerate: bool,
  /// Overrides applied on top of generated metadata.
  pub params: Option<Params>,
}

/// How the metadata of an update was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateMode {
  /// Descriptor unchanged; stored metadata returned as-is.
  Cached,
  /// Built from a fresh skeleton.
  Full,
  /// Previous metadata merged into a fresh skeleton.
  Incremental,
}

impl fmt::Display for UpdateMode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      UpdateMode::Cached => "cached",
      UpdateMode::Full => "full",
      UpdateMode::Incremental => "incremental",
    })
  }
}

/// A degraded path taken during an update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum UpdateWarning {
  /// The descriptor is unchanged but no current metadata is stored.
  CurrentMissing,
  /// The descriptor is unchanged but the current metadata was recorded for
  /// another descriptor, e.g. after an interrupted commit.
  CurrentStale,
  /// Previous metadata exists but the previous descriptor does not.
  MissingDescriptorBackup,
  /// The previous descriptor could not be parsed.
  PriorDescriptorUnreadable(String),
  /// Fill failed; whatever text was available was committed.
  FillFailed(String),
}

impl fmt::Display for UpdateWarning {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      UpdateWarning::CurrentMissing => write!(f, "descriptor unchanged but stored metadata was missing, regenerated"),
      UpdateWarning::CurrentStale => {
        write!(f, "stored metadata belongs to another descriptor (interrupted update?), regenerated")
      }
      UpdateWarning::MissingDescriptorBackup => {
        write!(f, "no previous descriptor to diff against, regenerated from scratch")
      }
      UpdateWarning::PriorDescriptorUnreadable(e) => {
        write!(f, "previous descriptor is unreadable ({e}), regenerated from scratch")
      }
      UpdateWarning::FillFailed(e) => write!(f, "fill failed: {e}"),
    }
  }
}

/// Result of a successful update.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateOutcome {
  pub metadata: MetadataTree,
  /// Present for incremental updates only.
  pub diff: Option<DiffReport>,
  pub mode: UpdateMode,
  pub warnings: Vec<UpdateWarning>,
  /// History key of the metadata replaced by this update.
  pub backup_key: Option<HistoryKey>,
}

#[derive(Debug, Error)]
pub enum UpdateError {
  #[error("invalid descriptor: {0}")]
  Descriptor(#[from] DescriptorError),

  #[error("failed to record metadata: {0}")]
  Snapshot(#[from] SnapshotError),
}

/// Run one update cycle for `descriptor_bytes`.
///
/// Only descriptor parse errors and storage write errors fail the update.
/// Everything else, including fill failures, is reported in
/// [`UpdateOutcome::warnings`].
pub fn run_update(
  store: &SnapshotStore,
  descriptor_bytes: &[u8],
  options: &UpdateOptions,
  filler: Option<&dyn MetadataFiller>,
) -> Result<UpdateOutcome, UpdateError> {
  let mut warnings = Vec::new();
  let current = store.load_current_snapshot();

  if !options.force_regenerate && !store.has_descriptor_changed(descriptor_bytes) {
    let fingerprint = Fingerprint::of(descriptor_bytes);
    if let Some(snapshot) = current.as_ref().filter(|s| s.source_fingerprint == fingerprint) {
      info!(fingerprint = %fingerprint.short(), "descriptor unchanged, using stored metadata");
      return Ok(UpdateOutcome {
        metadata: snapshot.metadata.clone(),
        diff: None,
        mode: UpdateMode::Cached,
        warnings,
        backup_key: None,
      });
    }
    if current.is_some() {
      warn!("descriptor unchanged but stored metadata belongs to another descriptor, regenerating");
      warnings.push(UpdateWarning::CurrentStale);
    } else {
      warn!("descriptor unchanged but stored metadata is missing, regenerating");
      warnings.push(UpdateWarning::CurrentMissing);
    }
  }

  let descriptor = parse_descriptor(descriptor_bytes)?;
  let skeleton = build_skeleton(&descriptor);
  let previous = if options.force_regenerate {
    None
  } else {
    current.map(|snapshot| snapshot.metadata)
  };

  let (mode, mut metadata, diff) = match previous {
    None => {
      info!(force = options.force_regenerate, "full generation");
      (UpdateMode::Full, skeleton.clone(), None)
    }
    Some(old) => match previous_descriptor(store, &mut warnings) {
      Some(old_descriptor) => {
        let diff = compute_diff(&old_descriptor, &descriptor);
        info!(changes = diff.change_count(), "incremental update");
        (UpdateMode::Incremental, merge(&old, &skeleton, &diff), Some(diff))
      }
      None => (UpdateMode::Full, skeleton.clone(), None),
    },
  };

  if let Some(params) = &options.params {
    params.apply(&mut metadata);
  }

  if let Some(filler) = filler {
    if let Some(only_empty) = fill_request(mode, &metadata, diff.as_ref()) {
      match fill_checked(filler, &metadata, only_empty) {
        Ok(filled) => metadata = filled,
        Err(e) => {
          warn!(error = %e, "fill failed, committing unfilled metadata");
          warnings.push(UpdateWarning::FillFailed(e.to_string()));
        }
      }
    }
    if let Some(params) = &options.params {
      params.apply(&mut metadata);
    }
  }

  for field in AppField::ALL {
    if metadata.app.text(field).trim().is_empty() {
      *metadata.app.text_mut(field) = skeleton.app.text(field).to_string();
    }
  }

  let backup_key = store.commit(&metadata, descriptor_bytes)?;
  info!(mode = %mode, warnings = warnings.len(), "update complete");

  Ok(UpdateOutcome {
    metadata,
    diff,
    mode,
    warnings,
    backup_key,
  })
}

/// `Some(only_empty)` when a fill call is needed.
fn fill_request(mode: UpdateMode, metadata: &MetadataTree, diff: Option<&DiffReport>) -> Option<bool> {
  match mode {
    UpdateMode::Cached => None,
    UpdateMode::Full => Some(false),
    UpdateMode::Incremental => {
      let mut pending: BTreeSet<FieldLocator> = diff
        .map(|diff| diff.added_locators().cloned().collect())
        .unwrap_or_default();
      pending.extend(pending_fields(metadata));
      (!pending.is_empty()).then_some(true)
    }
  }
}

fn previous_descriptor(store: &SnapshotStore, warnings: &mut Vec<UpdateWarning>) -> Option<Descriptor> {
  let Some(bytes) = store.previous_descriptor() else {
    warn!("previous metadata exists without a descriptor backup, regenerating from scratch");
    warnings.push(UpdateWarning::MissingDescriptorBackup);
    return None;
  };

  match parse_descriptor(&bytes) {
    Ok(descriptor) => Some(descriptor),
    Err(e) => {
      warn!(error = %e, "previous descriptor is unreadable, regenerating from scratch");
      warnings.push(UpdateWarning::PriorDescriptorUnreadable(e.to_string()));
      None
    }
  }
}

/// Diff `descriptor_bytes` against the last committed descriptor without writing anything.
///
/// Returns `None` when there is no usable previous descriptor.
pub fn preview_diff(store: &SnapshotStore, descriptor_bytes: &[u8]) -> Result<Option<DiffReport>, UpdateError> {
  let descriptor = parse_descriptor(descriptor_bytes)?;
  let Some(previous) = store.previous_descriptor() else {
    return Ok(None);
  };

  match parse_descriptor(&previous) {
    Ok(old) => Ok(Some(compute_diff(&old, &descriptor))),
    Err(e) => {
      warn!(error = %e, "previous descriptor is unreadable");
      Ok(None)
    }
  }
}
