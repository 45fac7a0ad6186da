//! Reading and first-run creation of `config.toml`.
//!
//! Loading happens before the subscriber is installed, so nothing here logs.
//! [`LoadedConfig::source`] records what happened and the caller reports it
//! once logging is up.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::app_config::AppConfig;

const CONFIG_FILE_NAME: &str = "config.toml";

/// Failures while locating, reading or writing the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform exposes no per-user configuration directory.
    #[error("failed to determine config directory")]
    ConfigDirNotFound,
    /// Filesystem access to the configuration file or directory failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// The existing file is not a valid configuration.
    #[error("invalid config file {path}: {source}")]
    Parse {
        /// File that failed to parse.
        path: PathBuf,
        /// Underlying TOML error.
        #[source]
        source: toml::de::Error,
    },
    /// The default configuration could not be serialized.
    #[error("toml serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),
}

/// Where a loaded configuration came from.
#[derive(Debug)]
pub enum ConfigSource {
    /// Parsed from an existing file.
    File(PathBuf),
    /// No file existed; the defaults were written to this path.
    Created(PathBuf),
    /// The file could not be parsed and was left untouched. Defaults are in use.
    Defaults(ConfigError),
}

impl ConfigSource {
    /// Returns true when defaults replaced an unreadable file.
    #[must_use]
    pub const fn is_fallback(&self) -> bool {
        matches!(self, Self::Defaults(_))
    }
}

/// A configuration together with how it was obtained.
#[derive(Debug)]
pub struct LoadedConfig {
    /// The parsed or default configuration.
    pub config: AppConfig,
    /// How `config` was obtained.
    pub source: ConfigSource,
}

/// Owns the configuration directory and the `config.toml` inside it.
pub struct StorageManager {
    config_dir: PathBuf,
}

impl StorageManager {
    /// Uses the platform configuration directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ConfigDirNotFound`] if the platform has none.
    pub fn new() -> Result<Self, ConfigError> {
        AppConfig::default_config_dir()
            .map(Self::with_dir)
            .ok_or(ConfigError::ConfigDirNotFound)
    }

    /// Uses `path` as the configuration directory.
    #[must_use]
    pub const fn with_dir(path: PathBuf) -> Self {
        Self { config_dir: path }
    }

    /// Loads the configuration from `path_override` or the default file,
    /// writing defaults on first run.
    ///
    /// A malformed file does not fail the load: defaults are returned with
    /// [`ConfigSource::Defaults`] carrying the parse error.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or the defaults
    /// cannot be written.
    pub fn load_config(&self, path_override: Option<&Path>) -> Result<LoadedConfig, ConfigError> {
        let path = path_override.map_or_else(
            || self.config_dir.join(CONFIG_FILE_NAME),
            Path::to_path_buf,
        );

        if !path.exists() {
            let config = AppConfig::default();
            write_atomically(&path, &toml::to_string_pretty(&config)?)?;
            return Ok(LoadedConfig {
                config,
                source: ConfigSource::Created(path),
            });
        }

        match read_config(&path) {
            Ok(config) => Ok(LoadedConfig {
                config,
                source: ConfigSource::File(path),
            }),
            Err(e @ ConfigError::Parse { .. }) => Ok(LoadedConfig {
                config: AppConfig::default(),
                source: ConfigSource::Defaults(e),
            }),
            Err(e) => Err(e),
        }
    }
}

fn read_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn write_atomically(path: &Path, content: &str) -> Result<(), ConfigError> {
    let parent = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent)?;

    let mut temp_file = tempfile::NamedTempFile::new_in(parent)?;
    temp_file.write_all(content.as_bytes())?;
    temp_file.persist(path).map_err(|e| e.error)?;
    Ok(())
}
