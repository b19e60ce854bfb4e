//! User-supplied overrides applied on top of generated metadata.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer};
use tracing::debug;

use super::types::{FieldKind, MetadataError, MetadataTree};

/// Parsed params file.
///
/// ```yaml
/// app:
///   title: Photos
///   tagline: Your photos, at home
/// services:
///   web:
///     ports:
///       - container: 80
///         description: Web interface
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Params {
  pub app: AppParams,
  pub services: BTreeMap<String, ServiceParams>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppParams {
  pub title: Option<String>,
  pub tagline: Option<String>,
  pub description: Option<String>,
  pub category: Option<String>,
  pub author: Option<String>,
  pub developer: Option<String>,
  pub icon: Option<String>,
  pub thumbnail: Option<String>,
  pub screenshot_link: Option<Vec<String>>,
  pub index: Option<String>,
  pub scheme: Option<String>,
  pub architectures: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServiceParams {
  pub ports: Vec<FieldParam>,
  pub envs: Vec<FieldParam>,
  pub volumes: Vec<FieldParam>,
}

impl ServiceParams {
  fn fields(&self, kind: FieldKind) -> &[FieldParam] {
    match kind {
      FieldKind::Port => &self.ports,
      FieldKind::Env => &self.envs,
      FieldKind::Volume => &self.volumes,
    }
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FieldParam {
  /// Identifier of the field; ports may be written as numbers.
  #[serde(deserialize_with = "string_or_number")]
  pub container: String,
  #[serde(default)]
  pub description: Option<String>,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
  D: Deserializer<'de>,
{
  #[derive(Deserialize)]
  #[serde(untagged)]
  enum Raw {
    Str(String),
    Int(i64),
  }

  Ok(match Raw::deserialize(deserializer)? {
    Raw::Str(s) => s,
    Raw::Int(n) => n.to_string(),
  })
}

impl Params {
  /// Parse a params YAML document. An empty document yields no overrides.
  pub fn from_yaml(bytes: &[u8]) -> Result<Self, MetadataError> {
    let value: serde_yaml::Value = serde_yaml::from_slice(bytes).map_err(MetadataError::Params)?;
    if value.is_null() {
      return Ok(Self::default());
    }
    serde_yaml::from_value(value).map_err(MetadataError::Params)
  }

  /// Apply every non-empty override to `tree`.
  ///
  /// Field text set here is marked user-authored. Overrides naming services or
  /// identifiers absent from the tree are skipped.
  pub fn apply(&self, tree: &mut MetadataTree) {
    let app = &mut tree.app;
    let text_overrides = [
      (&self.app.title, &mut app.title),
      (&self.app.tagline, &mut app.tagline),
      (&self.app.description, &mut app.description),
      (&self.app.category, &mut app.category),
      (&self.app.author, &mut app.author),
      (&self.app.developer, &mut app.developer),
      (&self.app.icon, &mut app.icon),
      (&self.app.thumbnail, &mut app.thumbnail),
      (&self.app.index, &mut app.index),
      (&self.app.scheme, &mut app.scheme),
    ];
    for (value, target) in text_overrides {
      if let Some(value) = non_blank(value) {
        *target = value.to_string();
      }
    }
    for (value, target) in [
      (&self.app.architectures, &mut app.architectures),
      (&self.app.screenshot_link, &mut app.screenshot_link),
    ] {
      if let Some(list) = value.as_ref().filter(|list| !list.is_empty()) {
        target.clone_from(list);
      }
    }

    for (name, overrides) in &self.services {
      let Some(service) = tree.services.get_mut(name) else {
        debug!(service = %name, "params name an unknown service, skipping");
        continue;
      };
      for kind in FieldKind::ALL {
        for param in overrides.fields(kind) {
          let Some(text) = non_blank(&param.description) else {
            continue;
          };
          match service.find_mut(kind, &param.container) {
            Some(field) => {
              field.text = text.to_string();
              field.is_user_authored = true;
            }
            None => debug!(
              service = %name,
              kind = %kind,
              identifier = %param.container,
              "params name an unknown field, skipping"
            ),
          }
        }
      }
    }
  }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
  value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
