//! # Application Configuration
//!
//! Plain settings struct read from environment variables at startup, with
//! builder-style overrides for embedding and tests.
//!
//! ## Environment Variables
//!
//! | Variable | Default | Meaning |
//! |---|---|---|
//! | `SWITCHYARD_TEMPLATES_DIR` | `templates` | directory searched by [`App::template`](crate::app::App::template) |
//! | `SWITCHYARD_STATIC_DIR` | `static` | directory served for static asset requests |
//! | `SWITCHYARD_STATIC_PREFIX` | `/static` | URL prefix routed to the static directory |
//! | `SWITCHYARD_LOG_LEVEL` | `info` | see [`LogConfig`] |
//! | `SWITCHYARD_LOG_FORMAT` | `pretty` | `pretty` or `json` |
//!
//! ```rust
//! use switchyard::config::AppConfig;
//!
//! let config = AppConfig::default()
//!     .with_templates_dir("tests/templates")
//!     .with_static_dir("tests/staticdata");
//! assert_eq!(config.static_prefix, "/static");
//! ```

use crate::logging::LogConfig;
use std::env;
use std::path::PathBuf;

pub const DEFAULT_TEMPLATES_DIR: &str = "templates";
pub const DEFAULT_STATIC_DIR: &str = "static";
pub const DEFAULT_STATIC_PREFIX: &str = "/static";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub templates_dir: PathBuf,
    pub static_dir: PathBuf,
    pub static_prefix: String,
    pub log: LogConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            templates_dir: PathBuf::from(DEFAULT_TEMPLATES_DIR),
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
            static_prefix: DEFAULT_STATIC_PREFIX.to_string(),
            log: LogConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            templates_dir: env::var_os("SWITCHYARD_TEMPLATES_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.templates_dir),
            static_dir: env::var_os("SWITCHYARD_STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.static_dir),
            static_prefix: env::var("SWITCHYARD_STATIC_PREFIX")
                .ok()
                .filter(|p| !p.trim_matches('/').is_empty())
                .unwrap_or(defaults.static_prefix),
            log: LogConfig::from_env(),
        }
    }

    #[must_use]
    pub fn with_templates_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.templates_dir = dir.into();
        self
    }

    #[must_use]
    pub fn with_static_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.static_dir = dir.into();
        self
    }

    #[must_use]
    pub fn with_static_prefix(mut self, prefix: &str) -> Self {
        self.static_prefix = prefix.to_string();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.templates_dir, PathBuf::from("templates"));
        assert_eq!(config.static_dir, PathBuf::from("static"));
        assert_eq!(config.static_prefix, "/static");
    }

    #[test]
    fn test_builders_override() {
        let config = AppConfig::default()
            .with_templates_dir("t")
            .with_static_dir("s")
            .with_static_prefix("/assets");
        assert_eq!(config.templates_dir, PathBuf::from("t"));
        assert_eq!(config.static_dir, PathBuf::from("s"));
        assert_eq!(config.static_prefix, "/assets");
    }
}
