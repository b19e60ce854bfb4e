//! Shared test helpers for CLI integration tests.

use std::path::PathBuf;

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

/// Get path to a fixture file.
pub fn fixture_path(name: &str) -> PathBuf {
  PathBuf::from(env!("CARGO_MANIFEST_DIR"))
    .join("tests")
    .join("fixtures")
    .join(name)
}

/// Read fixture content.
pub fn fixture_content(name: &str) -> String {
  std::fs::read_to_string(fixture_path(name)).unwrap_or_else(|e| panic!("Failed to load fixture {}: {}", name, e))
}

/// Isolated test environment.
///
/// Each test gets its own temporary directory holding the compose file and the
/// work directory.
pub struct TestEnv {
  pub temp: TempDir,
  pub descriptor_path: PathBuf,
}

impl TestEnv {
  /// Create from a fixture file copied to `docker-compose.yml`.
  pub fn from_fixture(name: &str) -> Self {
    let env = Self::empty();
    env.use_fixture(name);
    env
  }

  /// Create an environment without a compose file.
  pub fn empty() -> Self {
    let temp = TempDir::new().unwrap();
    let descriptor_path = temp.path().join("docker-compose.yml");
    Self { temp, descriptor_path }
  }

  /// Replace the compose file with another fixture.
  pub fn use_fixture(&self, name: &str) {
    std::fs::write(&self.descriptor_path, fixture_content(name)).unwrap();
  }

  /// Write a file relative to the temp directory and return its path.
  pub fn write_file(&self, relative_path: &str, content: &str) -> PathBuf {
    let path = self.temp.path().join(relative_path);
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
    path
  }

  /// Work directory (isolated per test).
  pub fn work_dir(&self) -> PathBuf {
    let p = self.temp.path().join(".casagen");
    std::fs::create_dir_all(&p).unwrap();
    dunce::canonicalize(&p).unwrap_or(p)
  }

  pub fn descriptor(&self) -> &str {
    self.descriptor_path.to_str().unwrap()
  }

  /// Get a Command for the casagen binary pointed at this environment.
  ///
  /// The work directory is passed through `CASAGEN_WORK_DIR`.
  pub fn casagen_cmd(&self) -> Command {
    let mut cmd: Command = cargo_bin_cmd!("casagen");
    cmd.env("CASAGEN_WORK_DIR", self.work_dir());
    cmd.env_remove("RUST_LOG");
    cmd
  }

  /// Run `update` on the compose file and return parsed JSON output.
  pub fn update_json(&self, extra: &[&str]) -> serde_json::Value {
    let output = self
      .casagen_cmd()
      .args(["update", self.descriptor(), "-o", "json"])
      .args(extra)
      .output()
      .unwrap();
    assert!(
      output.status.success(),
      "update failed: {}",
      String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
  }

  /// Run `show -o json` and return the current metadata.
  pub fn show_json(&self) -> serde_json::Value {
    let output = self.casagen_cmd().args(["show", "-o", "json"]).output().unwrap();
    assert!(
      output.status.success(),
      "show failed: {}",
      String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
  }
}
