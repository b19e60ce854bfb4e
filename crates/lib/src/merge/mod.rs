//! Carry previously written text into a freshly built skeleton.
//!
//! The skeleton decides the shape; merging only copies text across matching
//! identifiers. Fields the old metadata never described stay empty so they
//! can be routed to fill.

use std::collections::HashMap;

use tracing::{debug, info};

use crate::consts::AUTHORED_DESCRIPTION_MIN_CHARS;
use crate::diff::DiffReport;
use crate::metadata::{
  AppMetadata, FieldDescription, FieldKind, FieldLocator, MetadataTree, default_description, default_tagline,
};

/// Merge `old` text into `skeleton`.
///
/// # Panics
///
/// Panics if a field named in `diff.added_fields` is missing from the
/// skeleton, or if the result would not have the skeleton's shape. Either
/// means the skeleton and diff were derived from different descriptors.
pub fn merge(old: &MetadataTree, skeleton: &MetadataTree, diff: &DiffReport) -> MetadataTree {
  for locator in diff.added_locators() {
    assert!(
      skeleton.text(locator).is_some(),
      "shape mismatch: diff adds {locator} but the skeleton has no such field"
    );
  }

  let mut merged = skeleton.clone();
  merge_app(&old.app, &mut merged.app);

  for (name, service) in merged.services.iter_mut() {
    let Some(old_service) = old.services.get(name) else {
      debug!(service = %name, "new service, leaving fields for fill");
      continue;
    };

    for kind in FieldKind::ALL {
      let previous: HashMap<&str, &FieldDescription> = old_service
        .fields(kind)
        .iter()
        .map(|field| (field.identifier.as_str(), field))
        .collect();

      for field in service.fields_mut(kind) {
        let Some(prev) = previous.get(field.identifier.as_str()).filter(|prev| prev.has_text()) else {
          continue;
        };
        debug!(field = %FieldLocator::service(name, kind, &field.identifier), "kept existing text");
        field.text.clone_from(&prev.text);
        field.is_user_authored = prev.is_user_authored;
      }
    }
  }

  assert_eq!(
    merged.shape(),
    skeleton.shape(),
    "shape mismatch: merged metadata no longer matches the skeleton"
  );

  info!(
    services = merged.services.len(),
    added_services = diff.added_services.len(),
    "merged metadata"
  );
  merged
}

/// Keep old app text that does not look like a generated default.
fn merge_app(old: &AppMetadata, merged: &mut AppMetadata) {
  let skeleton_title = merged.title.clone();

  if is_customized(&old.title, &[&skeleton_title]) {
    debug!(title = %old.title, "kept existing title");
    merged.title.clone_from(&old.title);
  }

  let tagline_defaults = [
    default_tagline(&skeleton_title),
    default_tagline(&old.title),
    default_tagline(&merged.title),
  ];
  if is_customized(&old.tagline, &tagline_defaults) {
    debug!("kept existing tagline");
    merged.tagline.clone_from(&old.tagline);
  }

  let description_defaults = [
    default_description(&skeleton_title),
    default_description(&old.title),
    default_description(&merged.title),
  ];
  if is_customized(&old.description, &description_defaults)
    && old.description.chars().count() > AUTHORED_DESCRIPTION_MIN_CHARS
  {
    debug!("kept existing description");
    merged.description.clone_from(&old.description);
  } else if merged.title != skeleton_title {
    merged.description = default_description(&merged.title);
  }

  if merged.title != skeleton_title && merged.tagline == default_tagline(&skeleton_title) {
    merged.tagline = default_tagline(&merged.title);
  }
}

fn is_customized<S: AsRef<str>>(value: &str, defaults: &[S]) -> bool {
  let value = value.trim();
  !value.is_empty() && defaults.iter().all(|default| default.as_ref().trim() != value)
}
