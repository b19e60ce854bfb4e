//! docker-compose parsing.
//!
//! Only the parts of a compose document that shape metadata are read; every
//! other key is ignored.

use serde_yaml::{Mapping, Value};
use thiserror::Error;
use tracing::debug;

use super::types::{Descriptor, Mount, PortRule, ServiceSpec};

/// Errors that can occur while parsing a descriptor.
#[derive(Debug, Error)]
pub enum DescriptorError {
  /// The document is not valid YAML.
  #[error("failed to parse descriptor YAML: {0}")]
  Yaml(#[source] serde_yaml::Error),

  /// The document root is not a mapping.
  #[error("descriptor root must be a mapping")]
  NotAMapping,

  /// The document declares no services.
  #[error("descriptor must include at least one service")]
  NoServices,

  /// A service entry is neither a mapping nor empty.
  #[error("service '{service}' must be a mapping")]
  InvalidService { service: String },
}

/// Parse a compose document into a [`Descriptor`].
pub fn parse_descriptor(bytes: &[u8]) -> Result<Descriptor, DescriptorError> {
  let root: Value = serde_yaml::from_slice(bytes).map_err(DescriptorError::Yaml)?;

  let root = match root {
    Value::Null => return Err(DescriptorError::NoServices),
    Value::Mapping(map) => map,
    _ => return Err(DescriptorError::NotAMapping),
  };

  let name = root
    .get("name")
    .and_then(scalar_to_string)
    .map(|s| s.trim().to_string())
    .filter(|s| !s.is_empty());

  let services = match root.get("services") {
    Some(Value::Mapping(services)) if !services.is_empty() => services,
    _ => return Err(DescriptorError::NoServices),
  };

  let mut descriptor = Descriptor {
    name,
    ..Default::default()
  };

  for (key, value) in services {
    let Some(service_name) = scalar_to_string(key) else {
      continue;
    };

    let spec = match value {
      Value::Null => ServiceSpec::default(),
      Value::Mapping(map) => parse_service(map),
      _ => return Err(DescriptorError::InvalidService { service: service_name }),
    };

    debug!(
      service = %service_name,
      ports = spec.ports.len(),
      envs = spec.environment.len(),
      mounts = spec.mounts.len(),
      "parsed service"
    );
    descriptor.services.insert(service_name, spec);
  }

  Ok(descriptor)
}

fn parse_service(service: &Mapping) -> ServiceSpec {
  ServiceSpec {
    image: service.get("image").and_then(scalar_to_string),
    ports: sequence(service.get("ports")).filter_map(parse_port_entry).collect(),
    environment: parse_environment(service.get("environment")),
    mounts: sequence(service.get("volumes")).filter_map(parse_volume_entry).collect(),
  }
}

fn sequence(value: Option<&Value>) -> impl Iterator<Item = &Value> {
  value.and_then(Value::as_sequence).into_iter().flatten()
}

fn scalar_to_string(value: &Value) -> Option<String> {
  match value {
    Value::String(s) => Some(s.clone()),
    Value::Number(n) => Some(n.to_string()),
    Value::Bool(b) => Some(b.to_string()),
    _ => None,
  }
}

fn non_empty(value: Option<String>) -> Option<String> {
  value.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Parse a single `ports` entry.
///
/// Entries without a container-side port are dropped.
pub fn parse_port_entry(entry: &Value) -> Option<PortRule> {
  match entry {
    Value::Number(n) => {
      let port = n.to_string();
      Some(PortRule {
        container: port.clone(),
        host: Some(port),
        protocol: None,
      })
    }
    Value::String(text) => {
      let cleaned = text.trim();
      let (mapping, protocol) = match cleaned.split_once('/') {
        Some((mapping, protocol)) => (mapping, non_empty(Some(protocol.to_string()))),
        None => (cleaned, None),
      };
      let (host, container) = split_port_mapping(mapping);
      Some(PortRule {
        container: non_empty(Some(container.to_string()))?,
        host: non_empty(host.map(str::to_string)),
        protocol,
      })
    }
    Value::Mapping(map) => {
      let container = map
        .get("target")
        .or_else(|| map.get("containerPort"))
        .and_then(scalar_to_string);
      let host = map
        .get("published")
        .or_else(|| map.get("host"))
        .and_then(scalar_to_string);
      Some(PortRule {
        container: non_empty(container)?,
        host: non_empty(host),
        protocol: non_empty(map.get("protocol").and_then(scalar_to_string)),
      })
    }
    _ => None,
  }
}

/// Split a short-syntax port mapping into `(host, container)`.
///
/// Colons inside `${...}` and `[...]` do not separate fields. With more than
/// one separator (`ip:host:container`) the last two segments are kept.
fn split_port_mapping(value: &str) -> (Option<&str>, &str) {
  let bytes = value.as_bytes();
  let mut colons = Vec::new();
  let mut brace_depth = 0usize;
  let mut bracket_depth = 0usize;
  let mut i = 0;

  while i < bytes.len() {
    match bytes[i] {
      b'$' if bytes.get(i + 1) == Some(&b'{') => {
        brace_depth += 1;
        i += 2;
        continue;
      }
      b'}' if brace_depth > 0 => brace_depth -= 1,
      b'[' => bracket_depth += 1,
      b']' if bracket_depth > 0 => bracket_depth -= 1,
      b':' if brace_depth == 0 && bracket_depth == 0 => colons.push(i),
      _ => {}
    }
    i += 1;
  }

  match colons.as_slice() {
    [] => (None, value),
    [pos] => (Some(&value[..*pos]), &value[pos + 1..]),
    [.., second_last, last] => (Some(&value[second_last + 1..*last]), &value[last + 1..]),
  }
}

fn parse_environment(value: Option<&Value>) -> Vec<String> {
  let mut names = Vec::new();

  match value {
    Some(Value::Mapping(map)) => {
      names.extend(map.keys().filter_map(scalar_to_string));
    }
    Some(Value::Sequence(entries)) => {
      for entry in entries {
        match entry {
          Value::String(text) => {
            let key = text.split_once('=').map(|(k, _)| k).unwrap_or(text);
            names.push(key.to_string());
          }
          Value::Mapping(map) => names.extend(map.keys().filter_map(scalar_to_string)),
          _ => {}
        }
      }
    }
    _ => {}
  }

  names
    .into_iter()
    .map(|name| name.trim().to_string())
    .filter(|name| !name.is_empty())
    .collect()
}

/// Parse a single `volumes` entry into a mount.
pub fn parse_volume_entry(entry: &Value) -> Option<Mount> {
  match entry {
    Value::String(text) => {
      let cleaned = text.trim();
      if cleaned.is_empty() {
        return None;
      }
      let parts: Vec<&str> = cleaned.split(':').collect();
      if parts.len() >= 2 {
        Some(Mount {
          source: non_empty(Some(parts[0].to_string())),
          target: non_empty(Some(parts[1].to_string()))?,
        })
      } else {
        Some(Mount {
          source: None,
          target: parts[0].to_string(),
        })
      }
    }
    Value::Mapping(map) => {
      let target = map
        .get("target")
        .or_else(|| map.get("container"))
        .and_then(scalar_to_string);
      Some(Mount {
        source: non_empty(map.get("source").and_then(scalar_to_string)),
        target: non_empty(target)?,
      })
    }
    _ => None,
  }
}
