//! Application configuration.
//!
//! [`AppConfig`] is loaded once at startup and passed down by value. The
//! core crate never sees it; its values reach the services as
//! `DiscoveryOptions` and request parameters.
//!
//! # Resolution order (highest priority first)
//!
//! 1. CLI flags (applied at the call-site, not here)
//! 2. Environment variables prefixed `EMBGEN_` (`EMBGEN_DOMAINS_DIR`, ...)
//! 3. Config file: `--config FILE`, else `config.toml` in the platform
//!    config directory
//! 4. Built-in defaults

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Extra directory of user domains.
    pub domains_dir: Option<PathBuf>,
    /// Where outputs go when `-o` is not given.
    pub output_dir: PathBuf,
    pub no_color: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            domains_dir: None,
            output_dir: PathBuf::from("generated"),
            no_color: false,
        }
    }
}

impl AppConfig {
    /// Load configuration, starting from defaults.
    ///
    /// An explicit `config_file` must exist; the default location is
    /// optional.
    pub fn load(config_file: Option<&Path>) -> anyhow::Result<Self> {
        Self::load_from(config_file, Environment::with_prefix("EMBGEN"))
    }

    fn load_from(config_file: Option<&Path>, env: Environment) -> anyhow::Result<Self> {
        let defaults = Self::default();
        let mut builder = Config::builder()
            .set_default("output_dir", defaults.output_dir.to_string_lossy().into_owned())?
            .set_default("no_color", defaults.no_color)?;

        builder = match config_file {
            Some(path) => {
                debug!(path = %path.display(), "using config file");
                builder.add_source(File::from(path).required(true))
            }
            None => match Self::config_path() {
                Some(path) => builder.add_source(File::from(path).required(false)),
                None => builder,
            },
        };

        builder
            .add_source(env.try_parsing(true))
            .build()
            .and_then(Config::try_deserialize::<Self>)
            .context("Failed to load configuration")
    }

    /// Path to the default configuration file, if the platform has a
    /// config directory.
    pub fn config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "embgen").map(|d| d.config_dir().join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::fs;
    use tempfile::TempDir;

    fn env(vars: &[(&str, &str)]) -> Environment {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Environment::with_prefix("EMBGEN").source(Some(map))
    }

    fn write_config(dir: &TempDir, body: &str) -> PathBuf {
        let path = dir.path().join("embgen.toml");
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn defaults_without_sources() {
        let temp = TempDir::new().unwrap();
        let path = write_config(&temp, "");
        let cfg = AppConfig::load_from(Some(&path), env(&[])).unwrap();
        assert_eq!(cfg, AppConfig::default());
        assert_eq!(cfg.output_dir, PathBuf::from("generated"));
    }

    #[test]
    fn file_values_override_defaults() {
        let temp = TempDir::new().unwrap();
        let path = write_config(&temp, "domains_dir = \"/opt/domains\"\noutput_dir = \"out\"\n");
        let cfg = AppConfig::load_from(Some(&path), env(&[])).unwrap();
        assert_eq!(cfg.domains_dir, Some(PathBuf::from("/opt/domains")));
        assert_eq!(cfg.output_dir, PathBuf::from("out"));
    }

    #[test]
    fn environment_overrides_file() {
        let temp = TempDir::new().unwrap();
        let path = write_config(&temp, "domains_dir = \"/from/file\"\n");
        let cfg = AppConfig::load_from(
            Some(&path),
            env(&[("EMBGEN_DOMAINS_DIR", "/from/env"), ("EMBGEN_NO_COLOR", "true")]),
        )
        .unwrap();
        assert_eq!(cfg.domains_dir, Some(PathBuf::from("/from/env")));
        assert!(cfg.no_color);
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nope.toml");
        assert!(AppConfig::load_from(Some(&missing), env(&[])).is_err());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = write_config(&temp, "output_dir = [");
        assert!(AppConfig::load_from(Some(&path), env(&[])).is_err());
    }
}
