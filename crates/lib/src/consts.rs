//! Shared constants.

/// Application name, used for env var prefixes and log messages.
pub const APP_NAME: &str = "casagen";

/// Default work directory, relative to the current directory.
pub const WORK_DIR_NAME: &str = ".casagen";

/// Environment variable overriding the work directory.
pub const WORK_DIR_ENV: &str = "CASAGEN_WORK_DIR";

/// Environment variable telling a fill command which fill mode is requested.
pub const FILL_MODE_ENV: &str = "CASAGEN_FILL_MODE";

/// Platform name used in the default tagline.
pub const PLATFORM_NAME: &str = "CasaOS";

/// History entries kept when the store has no config.
pub const DEFAULT_MAX_HISTORY_VERSIONS: usize = 3;

/// An old app description must be longer than this (in chars) to be treated as authored.
pub const AUTHORED_DESCRIPTION_MIN_CHARS: usize = 100;

/// Ports that mark a service as the web entry point.
pub const HTTP_FRIENDLY_PORTS: &[&str] = &["80", "443", "8080", "8000", "3000", "5000"];

/// Service names preferred as the main service when no HTTP port decides it.
pub const PREFERRED_SERVICE_NAMES: &[&str] = &["web", "frontend", "app", "server", "service"];
