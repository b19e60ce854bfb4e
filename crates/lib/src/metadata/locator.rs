use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::types::{AppField, FieldKind, MetadataError};

/// Address of one text field in a [`MetadataTree`](super::MetadataTree).
///
/// Displays as `app.<field>` or `services.<service>.<ports|envs|volumes>.<identifier>`.
/// Parsing additionally accepts `service:<service>:<port|env|volume>:<identifier>`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum FieldLocator {
  App(AppField),
  Service {
    service: String,
    kind: FieldKind,
    identifier: String,
  },
}

impl FieldLocator {
  pub fn service(service: impl Into<String>, kind: FieldKind, identifier: impl Into<String>) -> Self {
    FieldLocator::Service {
      service: service.into(),
      kind,
      identifier: identifier.into(),
    }
  }
}

impl fmt::Display for FieldLocator {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      FieldLocator::App(field) => write!(f, "app.{}", field.name()),
      FieldLocator::Service {
        service,
        kind,
        identifier,
      } => write!(f, "services.{service}.{}.{identifier}", kind.plural()),
    }
  }
}

impl FromStr for FieldLocator {
  type Err = MetadataError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let input = s.trim();
    let invalid = || MetadataError::InvalidLocator(s.to_string());

    if let Some(name) = input.strip_prefix("app.") {
      return AppField::from_name(name).map(FieldLocator::App).ok_or_else(invalid);
    }
    if let Some(rest) = input.strip_prefix("services.") {
      return parse_dotted(rest).ok_or_else(invalid);
    }
    if let Some(rest) = input.strip_prefix("service:") {
      // Identifiers may contain colons, so only split off the first two parts.
      let mut parts = rest.splitn(3, ':');
      let (Some(service), Some(kind), Some(identifier)) = (parts.next(), parts.next(), parts.next()) else {
        return Err(invalid());
      };
      let kind = FieldKind::from_segment(kind).ok_or_else(invalid)?;
      if service.is_empty() || identifier.is_empty() {
        return Err(invalid());
      }
      return Ok(FieldLocator::service(service, kind, identifier));
    }

    Err(invalid())
  }
}

/// `<service>.<ports|envs|volumes>.<identifier>`, where the identifier may contain dots or slashes.
fn parse_dotted(rest: &str) -> Option<FieldLocator> {
  let (pos, kind) = FieldKind::ALL
    .into_iter()
    .filter_map(|kind| {
      let needle = format!(".{}.", kind.plural());
      rest.find(&needle).map(|pos| (pos, kind))
    })
    .filter(|(pos, _)| *pos > 0)
    .min_by_key(|(pos, _)| *pos)?;

  let service = &rest[..pos];
  let identifier = &rest[pos + kind.plural().len() + 2..];
  if identifier.is_empty() {
    return None;
  }
  Some(FieldLocator::service(service, kind, identifier))
}

impl From<FieldLocator> for String {
  fn from(locator: FieldLocator) -> Self {
    locator.to_string()
  }
}

impl TryFrom<String> for FieldLocator {
  type Error = MetadataError;

  fn try_from(value: String) -> Result<Self, Self::Error> {
    value.parse()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_app_fields() {
    assert_eq!(
      "app.tagline".parse::<FieldLocator>().unwrap(),
      FieldLocator::App(AppField::Tagline)
    );
    assert!("app.icon".parse::<FieldLocator>().is_err());
  }

  #[test]
  fn parses_dotted_service_fields() {
    let locator: FieldLocator = "services.web.volumes./var/lib/app.d".parse().unwrap();
    assert_eq!(locator, FieldLocator::service("web", FieldKind::Volume, "/var/lib/app.d"));
    assert_eq!(locator.to_string(), "services.web.volumes./var/lib/app.d");
  }

  #[test]
  fn dotted_service_named_like_a_kind() {
    let locator: FieldLocator = "services.ports.ports.80".parse().unwrap();
    assert_eq!(locator, FieldLocator::service("ports", FieldKind::Port, "80"));
  }

  #[test]
  fn parses_colon_form() {
    let locator: FieldLocator = "service:db:env:POSTGRES_PASSWORD".parse().unwrap();
    assert_eq!(locator, FieldLocator::service("db", FieldKind::Env, "POSTGRES_PASSWORD"));
    assert_eq!(locator.to_string(), "services.db.envs.POSTGRES_PASSWORD");
  }

  #[test]
  fn rejects_malformed_locators() {
    for input in ["", "web.ports.80", "services.web.ports.", "services..ports.80", "service:web:port", "service:web:disk:1"] {
      assert!(input.parse::<FieldLocator>().is_err(), "{input} should not parse");
    }
  }

  #[test]
  fn serializes_as_string() {
    let locator = FieldLocator::service("web", FieldKind::Port, "80");
    let json = serde_json::to_string(&locator).unwrap();
    assert_eq!(json, "\"services.web.ports.80\"");
    let back: FieldLocator = serde_json::from_str(&json).unwrap();
    assert_eq!(back, locator);
  }
}
