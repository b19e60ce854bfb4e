use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::metadata::FieldLocator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
  Added,
  Removed,
  Modified,
}

/// One field-level change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldChange {
  #[serde(rename = "path")]
  pub locator: FieldLocator,
  pub kind: ChangeKind,
  pub old_value: Option<String>,
  pub new_value: Option<String>,
}

impl FieldChange {
  pub fn added(locator: FieldLocator) -> Self {
    let value = identifier_of(&locator);
    Self {
      locator,
      kind: ChangeKind::Added,
      old_value: None,
      new_value: value,
    }
  }

  pub fn removed(locator: FieldLocator) -> Self {
    let value = identifier_of(&locator);
    Self {
      locator,
      kind: ChangeKind::Removed,
      old_value: value,
      new_value: None,
    }
  }

  /// Dotted path, e.g. `services.web.ports.80`.
  pub fn path(&self) -> String {
    self.locator.to_string()
  }
}

fn identifier_of(locator: &FieldLocator) -> Option<String> {
  match locator {
    FieldLocator::Service { identifier, .. } => Some(identifier.clone()),
    FieldLocator::App(_) => None,
  }
}

/// Result of comparing two descriptors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffReport {
  pub added_services: BTreeSet<String>,
  pub removed_services: BTreeSet<String>,
  pub added_fields: Vec<FieldChange>,
  pub removed_fields: Vec<FieldChange>,
  /// Always empty: only identifier presence is compared.
  pub modified_fields: Vec<FieldChange>,
}

impl DiffReport {
  pub fn has_changes(&self) -> bool {
    self.change_count() > 0
  }

  /// Services added or removed plus field changes.
  pub fn change_count(&self) -> usize {
    self.added_services.len()
      + self.removed_services.len()
      + self.added_fields.len()
      + self.removed_fields.len()
      + self.modified_fields.len()
  }

  /// Locators of added fields.
  pub fn added_locators(&self) -> impl Iterator<Item = &FieldLocator> {
    self.added_fields.iter().map(|change| &change.locator)
  }
}
