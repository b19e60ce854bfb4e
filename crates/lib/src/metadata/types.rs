use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::locator::FieldLocator;

/// Errors raised when addressing or overriding metadata fields.
#[derive(Debug, Error)]
pub enum MetadataError {
  #[error(
    "invalid field locator '{0}': expected app.<title|tagline|description>, \
     services.<name>.<ports|envs|volumes>.<id> or service:<name>:<port|env|volume>:<id>"
  )]
  InvalidLocator(String),

  #[error("field {0} does not exist in the current metadata")]
  UnknownField(String),

  #[error("failed to parse params: {0}")]
  Params(#[source] serde_yaml::Error),
}

/// One of the three per-service field collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
  Port,
  Env,
  Volume,
}

impl FieldKind {
  pub const ALL: [FieldKind; 3] = [FieldKind::Port, FieldKind::Env, FieldKind::Volume];

  /// Collection name used in dotted paths (`ports`, `envs`, `volumes`).
  pub fn plural(self) -> &'static str {
    match self {
      FieldKind::Port => "ports",
      FieldKind::Env => "envs",
      FieldKind::Volume => "volumes",
    }
  }

  /// Item name used in `service:` targets (`port`, `env`, `volume`).
  pub fn singular(self) -> &'static str {
    match self {
      FieldKind::Port => "port",
      FieldKind::Env => "env",
      FieldKind::Volume => "volume",
    }
  }

  /// Accepts either the singular or plural name.
  pub fn from_segment(segment: &str) -> Option<Self> {
    FieldKind::ALL
      .into_iter()
      .find(|kind| kind.plural() == segment || kind.singular() == segment)
  }
}

impl std::fmt::Display for FieldKind {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.plural())
  }
}

/// Description of a single port, environment variable or volume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescription {
  /// Container-side port, env var name or container-side mount path.
  pub identifier: String,
  #[serde(default)]
  pub text: String,
  #[serde(default)]
  pub is_user_authored: bool,
  #[serde(default = "default_true")]
  pub is_multi_locale: bool,
}

fn default_true() -> bool {
  true
}

impl FieldDescription {
  /// An entry with empty text, as produced by the skeleton builder.
  pub fn blank(identifier: impl Into<String>) -> Self {
    Self {
      identifier: identifier.into(),
      text: String::new(),
      is_user_authored: false,
      is_multi_locale: true,
    }
  }

  pub fn has_text(&self) -> bool {
    !self.text.trim().is_empty()
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceMetadata {
  pub ports: Vec<FieldDescription>,
  pub envs: Vec<FieldDescription>,
  pub volumes: Vec<FieldDescription>,
}

impl ServiceMetadata {
  pub fn fields(&self, kind: FieldKind) -> &[FieldDescription] {
    match kind {
      FieldKind::Port => &self.ports,
      FieldKind::Env => &self.envs,
      FieldKind::Volume => &self.volumes,
    }
  }

  pub fn fields_mut(&mut self, kind: FieldKind) -> &mut Vec<FieldDescription> {
    match kind {
      FieldKind::Port => &mut self.ports,
      FieldKind::Env => &mut self.envs,
      FieldKind::Volume => &mut self.volumes,
    }
  }

  pub fn find(&self, kind: FieldKind, identifier: &str) -> Option<&FieldDescription> {
    self.fields(kind).iter().find(|f| f.identifier == identifier)
  }

  pub fn find_mut(&mut self, kind: FieldKind, identifier: &str) -> Option<&mut FieldDescription> {
    self.fields_mut(kind).iter_mut().find(|f| f.identifier == identifier)
  }
}

/// App-level text fields that are generated rather than inferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AppField {
  Title,
  Tagline,
  Description,
}

impl AppField {
  pub const ALL: [AppField; 3] = [AppField::Title, AppField::Tagline, AppField::Description];

  pub fn name(self) -> &'static str {
    match self {
      AppField::Title => "title",
      AppField::Tagline => "tagline",
      AppField::Description => "description",
    }
  }

  pub fn from_name(name: &str) -> Option<Self> {
    AppField::ALL.into_iter().find(|field| field.name() == name)
  }
}

/// App-level metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppMetadata {
  #[serde(default)]
  pub title: String,
  #[serde(default)]
  pub tagline: String,
  #[serde(default)]
  pub description: String,
  pub category: String,
  pub author: String,
  pub developer: String,
  /// Name of the main service.
  pub main: String,
  /// Host port of the main web entry point.
  pub port_map: String,
  pub architectures: Vec<String>,
  #[serde(default)]
  pub icon: String,
  #[serde(default)]
  pub thumbnail: String,
  #[serde(default)]
  pub screenshot_link: Vec<String>,
  pub index: String,
  pub scheme: String,
}

impl AppMetadata {
  pub fn text(&self, field: AppField) -> &str {
    match field {
      AppField::Title => &self.title,
      AppField::Tagline => &self.tagline,
      AppField::Description => &self.description,
    }
  }

  pub fn text_mut(&mut self, field: AppField) -> &mut String {
    match field {
      AppField::Title => &mut self.title,
      AppField::Tagline => &mut self.tagline,
      AppField::Description => &mut self.description,
    }
  }
}

/// Identifier layout of a metadata tree: service → kind → identifiers in order.
pub type Shape = BTreeMap<String, BTreeMap<FieldKind, Vec<String>>>;

/// Complete metadata for one stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataTree {
  pub app: AppMetadata,
  #[serde(default)]
  pub services: BTreeMap<String, ServiceMetadata>,
}

impl MetadataTree {
  /// The identifiers present in this tree, ignoring all text.
  pub fn shape(&self) -> Shape {
    self
      .services
      .iter()
      .map(|(name, service)| {
        let kinds = FieldKind::ALL
          .into_iter()
          .map(|kind| {
            let ids = service.fields(kind).iter().map(|f| f.identifier.clone()).collect();
            (kind, ids)
          })
          .collect();
        (name.clone(), kinds)
      })
      .collect()
  }

  /// Text stored at a locator, if the field exists.
  pub fn text(&self, locator: &FieldLocator) -> Option<&str> {
    match locator {
      FieldLocator::App(field) => Some(self.app.text(*field)),
      FieldLocator::Service {
        service,
        kind,
        identifier,
      } => self
        .services
        .get(service)
        .and_then(|s| s.find(*kind, identifier))
        .map(|f| f.text.as_str()),
    }
  }

  /// Replace the text at a locator.
  ///
  /// `user_authored` is recorded on service fields; app fields carry no flag.
  pub fn set_text(&mut self, locator: &FieldLocator, text: &str, user_authored: bool) -> Result<(), MetadataError> {
    match locator {
      FieldLocator::App(field) => {
        *self.app.text_mut(*field) = text.to_string();
        Ok(())
      }
      FieldLocator::Service {
        service,
        kind,
        identifier,
      } => {
        let entry = self
          .services
          .get_mut(service)
          .and_then(|s| s.find_mut(*kind, identifier))
          .ok_or_else(|| MetadataError::UnknownField(locator.to_string()))?;
        entry.text = text.to_string();
        entry.is_user_authored = user_authored;
        Ok(())
      }
    }
  }

  /// Locators of every required text field that is still blank.
  ///
  /// App fields come first, then service fields in tree order.
  pub fn empty_fields(&self) -> Vec<FieldLocator> {
    let mut empty: Vec<FieldLocator> = AppField::ALL
      .into_iter()
      .filter(|field| self.app.text(*field).trim().is_empty())
      .map(FieldLocator::App)
      .collect();

    for (name, service) in &self.services {
      for kind in FieldKind::ALL {
        for field in service.fields(kind) {
          if !field.has_text() {
            empty.push(FieldLocator::service(name, kind, &field.identifier));
          }
        }
      }
    }

    empty
  }

  /// Total number of field descriptions across all services.
  pub fn field_count(&self) -> usize {
    self
      .services
      .values()
      .map(|s| s.ports.len() + s.envs.len() + s.volumes.len())
      .sum()
  }
}
