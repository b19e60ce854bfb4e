//! Content fingerprints for change detection.
//!
//! A [`Fingerprint`] is the full 64-character SHA-256 of a serialized stack
//! descriptor. Equality of two fingerprints is the only signal used to decide
//! whether a regeneration is needed.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Hex-encoded SHA-256 digest of a descriptor's bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(pub String);

impl Fingerprint {
  /// Fingerprint arbitrary bytes.
  pub fn of(data: &[u8]) -> Self {
    let mut hasher = Sha256::new();
    hasher.update(data);
    Fingerprint(hex::encode(hasher.finalize()))
  }

  /// Short prefix for log output.
  pub fn short(&self) -> &str {
    let len = self.0.len().min(8);
    &self.0[..len]
  }

  /// Parse a stored fingerprint, rejecting anything that is not 64 hex chars.
  pub fn parse(text: &str) -> Option<Self> {
    let trimmed = text.trim();
    if trimmed.len() == 64 && trimmed.chars().all(|c| c.is_ascii_hexdigit()) {
      Some(Fingerprint(trimmed.to_ascii_lowercase()))
    } else {
      None
    }
  }
}

impl std::fmt::Display for Fingerprint {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.0)
  }
}
