// ============================================================
// Layer 6 — Service Configuration
// ============================================================
// The three process-wide settings, read once and then passed
// explicitly into the service and pipeline constructors:
//
//   MODEL_PATH → where the artifact lives
//   VERSION    → version tag reported by describe/home
//   PORT       → port a transport layer should listen on
//
// Values are passed through as given; nothing here checks that
// the path is writable or the port is free.

use std::env;
use std::path::PathBuf;

pub const DEFAULT_MODEL_PATH: &str = "models/iris_model.json";
pub const DEFAULT_VERSION:    &str = "v1.0.0";
pub const DEFAULT_PORT:       u16  = 5000;

/// Snapshot of the service configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub artifact_location: PathBuf,
    pub version:           String,
    pub port:              u16,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            artifact_location: PathBuf::from(DEFAULT_MODEL_PATH),
            version:           DEFAULT_VERSION.to_string(),
            port:              DEFAULT_PORT,
        }
    }
}

impl ServiceConfig {
    /// Read `MODEL_PATH`, `VERSION` and `PORT`, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` uses the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        Self {
            artifact_location: lookup("MODEL_PATH").map(PathBuf::from).unwrap_or(defaults.artifact_location),
            version:           lookup("VERSION").unwrap_or(defaults.version),
            port:              lookup("PORT").map_or(defaults.port, |raw| parse_port(&raw)),
        }
    }
}

/// Parse a port value, falling back to the default with a warning.
pub fn parse_port(raw: &str) -> u16 {
    raw.trim().parse().unwrap_or_else(|_| {
        tracing::warn!("Ignoring unparsable PORT '{}', using {}", raw, DEFAULT_PORT);
        DEFAULT_PORT
    })
}
