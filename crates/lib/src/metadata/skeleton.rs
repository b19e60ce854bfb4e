//! Deterministic metadata skeletons derived from a descriptor.

use std::collections::BTreeMap;

use crate::consts::{HTTP_FRIENDLY_PORTS, PLATFORM_NAME, PREFERRED_SERVICE_NAMES};
use crate::descriptor::{Descriptor, ServiceSpec};

use super::types::{AppMetadata, FieldDescription, FieldKind, MetadataTree, ServiceMetadata};

const DEFAULT_CATEGORY: &str = "Utilities";
const DEFAULT_AUTHOR: &str = "CasaOS User";
const DEFAULT_DEVELOPER: &str = "fromxiaobai";
const DEFAULT_ARCHITECTURES: &[&str] = &["amd64", "arm64"];

/// Image keyword → category. First match wins.
const CATEGORY_RULES: &[(&str, &str)] = &[
  ("mysql", "Database"),
  ("mariadb", "Database"),
  ("postgres", "Database"),
  ("redis", "Database"),
  ("mongo", "Database"),
  ("nginx", "Web Server"),
  ("apache", "Web Server"),
  ("caddy", "Web Server"),
  ("wordpress", "Web Server"),
  ("ollama", "AI"),
  ("open-webui", "AI"),
  ("openwebui", "AI"),
  ("nextcloud", "Productivity"),
  ("immich", "Photos"),
];

/// Default tagline for a title.
pub fn default_tagline(title: &str) -> String {
  format!("{title} on {PLATFORM_NAME}")
}

/// Default long-form description for a title.
pub fn default_description(title: &str) -> String {
  format!(
    "{title} is a self-hosted application stack deployed via Docker Compose.\n\n\
     Key Features:\n\
     - Runs multiple services as a single stack.\n\
     - Supports persistent storage and environment configuration.\n\
     - Ready to be imported and managed in {PLATFORM_NAME}.\n"
  )
}

/// Build a metadata tree with the descriptor's shape and empty field text.
pub fn build_skeleton(descriptor: &Descriptor) -> MetadataTree {
  let main = main_service(descriptor).unwrap_or_default();
  let title = descriptor
    .name
    .as_deref()
    .map(str::trim)
    .filter(|name| !name.is_empty())
    .unwrap_or(main)
    .to_string();

  let app = AppMetadata {
    tagline: default_tagline(&title),
    description: default_description(&title),
    category: infer_category(descriptor, main),
    author: infer_author(descriptor, main),
    developer: DEFAULT_DEVELOPER.to_string(),
    main: main.to_string(),
    port_map: descriptor.services.get(main).and_then(main_port).unwrap_or_default(),
    architectures: DEFAULT_ARCHITECTURES.iter().map(|a| a.to_string()).collect(),
    icon: String::new(),
    thumbnail: String::new(),
    screenshot_link: Vec::new(),
    index: "/".to_string(),
    scheme: "http".to_string(),
    title,
  };

  let services = descriptor
    .services
    .iter()
    .map(|(name, spec)| (name.clone(), service_skeleton(spec)))
    .collect::<BTreeMap<_, _>>();

  MetadataTree { app, services }
}

fn service_skeleton(spec: &ServiceSpec) -> ServiceMetadata {
  let mut service = ServiceMetadata::default();
  for kind in FieldKind::ALL {
    *service.fields_mut(kind) = spec.identifiers(kind).into_iter().map(FieldDescription::blank).collect();
  }
  service
}

fn is_http_friendly(port: Option<&str>) -> bool {
  port
    .and_then(normalize_port)
    .is_some_and(|p| HTTP_FRIENDLY_PORTS.contains(&p.as_str()))
}

fn main_service(descriptor: &Descriptor) -> Option<&str> {
  let mut names = descriptor.services.keys().map(String::as_str);
  if descriptor.services.len() == 1 {
    return names.next();
  }

  let by_port = descriptor.services.iter().find(|(_, spec)| {
    spec
      .ports
      .iter()
      .any(|rule| is_http_friendly(rule.host.as_deref()) || is_http_friendly(Some(rule.container.as_str())))
  });
  if let Some((name, _)) = by_port {
    return Some(name.as_str());
  }

  PREFERRED_SERVICE_NAMES
    .iter()
    .copied()
    .find(|name| descriptor.services.contains_key(*name))
    .or_else(|| names.next())
}

/// Host port of the web entry point, falling back to the first concrete port.
fn main_port(spec: &ServiceSpec) -> Option<String> {
  let resolved = |rule: &crate::descriptor::PortRule| {
    rule
      .host
      .as_deref()
      .and_then(normalize_port)
      .or_else(|| normalize_port(&rule.container))
  };

  spec
    .ports
    .iter()
    .filter(|rule| is_http_friendly(rule.host.as_deref()) || is_http_friendly(Some(rule.container.as_str())))
    .find_map(resolved)
    .or_else(|| spec.ports.iter().find_map(resolved))
}

/// Digits as-is; `${VAR:-N}` or `${VAR-N}` resolves to `N`.
fn normalize_port(value: &str) -> Option<String> {
  let value = value.trim();
  let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
  if all_digits(value) {
    return Some(value.to_string());
  }

  let inner = value.strip_prefix("${")?.strip_suffix('}')?;
  let (var, default) = inner.split_once(":-").or_else(|| inner.split_once('-'))?;
  (!var.is_empty() && !var.contains(':') && all_digits(default)).then(|| default.to_string())
}

/// Services to consult for image-based inference, main service first.
fn services_by_priority<'a>(descriptor: &'a Descriptor, main: &'a str) -> impl Iterator<Item = &'a ServiceSpec> {
  descriptor
    .services
    .get(main)
    .into_iter()
    .chain(descriptor.services.iter().filter(move |(name, _)| *name != main).map(|(_, spec)| spec))
}

fn infer_category(descriptor: &Descriptor, main: &str) -> String {
  services_by_priority(descriptor, main)
    .filter_map(|spec| spec.image.as_deref())
    .find_map(|image| {
      let image = image.to_lowercase();
      CATEGORY_RULES
        .iter()
        .find(|(keyword, _)| image.contains(keyword))
        .map(|(_, category)| category.to_string())
    })
    .unwrap_or_else(|| DEFAULT_CATEGORY.to_string())
}

fn infer_author(descriptor: &Descriptor, main: &str) -> String {
  services_by_priority(descriptor, main)
    .filter_map(|spec| spec.image.as_deref())
    .find_map(|image| {
      image
        .split_once('/')
        .map(|(namespace, _)| namespace.trim())
        .filter(|namespace| !namespace.is_empty())
        .map(str::to_string)
    })
    .unwrap_or_else(|| DEFAULT_AUTHOR.to_string())
}
