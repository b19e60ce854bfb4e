//! External fill of empty metadata text.
//!
//! A [`MetadataFiller`] takes a tree and returns a tree of the same shape with
//! text filled in. Fillers may fail; callers treat that as a degraded result,
//! never as fatal.

mod command;

pub use command::*;

use std::io;

use thiserror::Error;
use tracing::debug;

use crate::metadata::{AppField, FieldKind, FieldLocator, MetadataTree};

#[derive(Debug, Error)]
pub enum FillError {
  #[error("failed to run fill command '{command}': {source}")]
  Spawn {
    command: String,
    #[source]
    source: io::Error,
  },

  #[error("fill command '{command}' failed with exit code {}", code.map_or("none".to_string(), |c| c.to_string()))]
  CommandFailed {
    command: String,
    code: Option<i32>,
    stderr: String,
  },

  #[error("failed to encode metadata for fill: {0}")]
  Encode(#[source] serde_json::Error),

  #[error("fill returned invalid metadata: {0}")]
  InvalidResponse(#[source] serde_json::Error),

  #[error("fill returned metadata with a different shape")]
  ShapeChanged,

  #[error("fill service unavailable: {0}")]
  Unavailable(String),
}

/// Text-generation collaborator.
pub trait MetadataFiller {
  /// Return `tree` with text filled in.
  ///
  /// With `only_empty`, text that is already present must be passed through.
  fn fill(&self, tree: &MetadataTree, only_empty: bool) -> Result<MetadataTree, FillError>;
}

/// Locators of all required text that is still empty.
pub fn pending_fields(tree: &MetadataTree) -> Vec<FieldLocator> {
  tree.empty_fields()
}

/// Copy every non-empty text of `original` back onto `filled`.
///
/// Enforces the only-empty contract on fillers that ignore it.
pub fn restore_authored(filled: &mut MetadataTree, original: &MetadataTree) {
  for field in AppField::ALL {
    let text = original.app.text(field);
    if !text.trim().is_empty() {
      *filled.app.text_mut(field) = text.to_string();
    }
  }

  for (name, original_service) in &original.services {
    let Some(service) = filled.services.get_mut(name) else {
      continue;
    };
    for kind in FieldKind::ALL {
      for original_field in original_service.fields(kind).iter().filter(|f| f.has_text()) {
        if let Some(field) = service.find_mut(kind, &original_field.identifier) {
          field.text.clone_from(&original_field.text);
          field.is_user_authored = original_field.is_user_authored;
        }
      }
    }
  }
}

/// Run `filler` and verify its result keeps the shape of `tree`.
///
/// In only-empty mode, existing text is restored afterwards.
pub fn fill_checked(
  filler: &dyn MetadataFiller,
  tree: &MetadataTree,
  only_empty: bool,
) -> Result<MetadataTree, FillError> {
  debug!(only_empty, pending = pending_fields(tree).len(), "requesting fill");
  let mut filled = filler.fill(tree, only_empty)?;

  if filled.shape() != tree.shape() {
    return Err(FillError::ShapeChanged);
  }
  if only_empty {
    restore_authored(&mut filled, tree);
  }
  Ok(filled)
}
