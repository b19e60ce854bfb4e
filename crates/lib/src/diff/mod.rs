//! Structural diff between two descriptors.
//!
//! Only the presence of services and of port/env/volume identifiers is
//! compared. The diff answers "which fields need a fresh description", not
//! "what changed about the infrastructure".

mod types;

pub use types::*;

use std::collections::BTreeSet;

use tracing::debug;

use crate::descriptor::{Descriptor, ServiceSpec};
use crate::metadata::{FieldKind, FieldLocator};

/// Compute the structural diff from `old` to `new`.
///
/// Output lists are ordered by service name, then kind, then identifier.
pub fn compute_diff(old: &Descriptor, new: &Descriptor) -> DiffReport {
  let old_services = old.service_names();
  let new_services = new.service_names();

  let mut report = DiffReport {
    added_services: owned(new_services.difference(&old_services)),
    removed_services: owned(old_services.difference(&new_services)),
    ..DiffReport::default()
  };

  for (name, new_spec) in &new.services {
    match old.services.get(name) {
      Some(old_spec) => diff_service(name, old_spec, new_spec, &mut report),
      None => {
        for kind in FieldKind::ALL {
          for identifier in new_spec.identifiers(kind) {
            report.added_fields.push(FieldChange::added(FieldLocator::service(name, kind, identifier)));
          }
        }
      }
    }
  }

  debug!(
    added_services = report.added_services.len(),
    removed_services = report.removed_services.len(),
    added_fields = report.added_fields.len(),
    removed_fields = report.removed_fields.len(),
    "computed descriptor diff"
  );

  report
}

fn diff_service(name: &str, old: &ServiceSpec, new: &ServiceSpec, report: &mut DiffReport) {
  for kind in FieldKind::ALL {
    let old_ids = old.identifier_set(kind);
    let new_ids = new.identifier_set(kind);

    for identifier in new_ids.difference(&old_ids) {
      report.added_fields.push(FieldChange::added(FieldLocator::service(name, kind, *identifier)));
    }
    for identifier in old_ids.difference(&new_ids) {
      report.removed_fields.push(FieldChange::removed(FieldLocator::service(name, kind, *identifier)));
    }
  }
}

fn owned<S: ToString>(names: impl Iterator<Item = S>) -> BTreeSet<String> {
  names.map(|name| name.to_string()).collect()
}
