use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::metadata::FieldKind;

/// An application stack: service name → service spec.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Descriptor {
  /// Top-level project name, if the document declares one.
  pub name: Option<String>,
  pub services: BTreeMap<String, ServiceSpec>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceSpec {
  pub image: Option<String>,
  pub ports: Vec<PortRule>,
  /// Environment variable names, in declaration order.
  pub environment: Vec<String>,
  pub mounts: Vec<Mount>,
}

/// A port-forwarding rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortRule {
  /// Container-side port; the identifier used by metadata.
  pub container: String,
  pub host: Option<String>,
  pub protocol: Option<String>,
}

/// A mount specification, reduced to its container-side path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mount {
  pub source: Option<String>,
  pub target: String,
}

impl Descriptor {
  /// Service names as a set.
  pub fn service_names(&self) -> BTreeSet<&str> {
    self.services.keys().map(String::as_str).collect()
  }
}

impl ServiceSpec {
  /// Identifiers of one field collection in first-occurrence order, without duplicates.
  pub fn identifiers(&self, kind: FieldKind) -> Vec<&str> {
    let all: Vec<&str> = match kind {
      FieldKind::Port => self.ports.iter().map(|p| p.container.as_str()).collect(),
      FieldKind::Env => self.environment.iter().map(String::as_str).collect(),
      FieldKind::Volume => self.mounts.iter().map(|m| m.target.as_str()).collect(),
    };

    let mut seen = BTreeSet::new();
    all.into_iter().filter(|id| seen.insert(*id)).collect()
  }

  /// Identifiers of one field collection as a set.
  pub fn identifier_set(&self, kind: FieldKind) -> BTreeSet<&str> {
    self.identifiers(kind).into_iter().collect()
  }
}
