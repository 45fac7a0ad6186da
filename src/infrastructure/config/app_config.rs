//! Application configuration.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::args::CliArgs;
use crate::infrastructure::image::disk_cache::{DEFAULT_MAX_CACHE_SIZE, default_cache_dir};
use crate::infrastructure::image::memory_cache::DEFAULT_MAX_MEMORY_BYTES;
use crate::infrastructure::image::transport::DEFAULT_TIMEOUT_SECS;
use crate::infrastructure::image::ImageLoaderConfig;

pub(crate) const APP_NAME: &str = "shelfcache";
pub(crate) const APP_QUALIFIER: &str = "org";
pub(crate) const APP_ORGANIZATION: &str = "shelfcache";

/// Log level configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level.
    Trace,
    /// Debug level.
    Debug,
    /// Info level.
    #[default]
    Info,
    /// Warning level.
    Warn,
    /// Error level.
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Trace => write!(f, "trace"),
            Self::Debug => write!(f, "debug"),
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Application configuration, read from `config.toml` and overridden by CLI flags.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Configuration file path.
    #[serde(skip)]
    pub config: Option<PathBuf>,

    /// Log file path.
    #[serde(default)]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Cache tiers.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Request scheduling and transport.
    #[serde(default)]
    pub loader: LoaderConfig,
}

/// Cache tier configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Disk cache directory. Defaults to the platform cache directory.
    #[serde(default)]
    pub directory: Option<PathBuf>,

    /// Disk cache budget in bytes.
    #[serde(default = "default_disk_max_bytes")]
    pub disk_max_bytes: u64,

    /// Memory cache budget in decoded bytes.
    #[serde(default = "default_memory_max_bytes")]
    pub memory_max_bytes: usize,
}

impl CacheConfig {
    /// Returns the configured directory or the platform default.
    #[must_use]
    pub fn effective_directory(&self) -> PathBuf {
        self.directory.clone().unwrap_or_else(default_cache_dir)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            directory: None,
            disk_max_bytes: default_disk_max_bytes(),
            memory_max_bytes: default_memory_max_bytes(),
        }
    }
}

/// Loader and transport configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// Maximum concurrent cover requests.
    #[serde(default = "default_max_concurrent_covers")]
    pub max_concurrent_covers: usize,

    /// Maximum concurrent thumbnail requests.
    #[serde(default = "default_max_concurrent_thumbnails")]
    pub max_concurrent_thumbnails: usize,

    /// HTTP request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// HTTP user agent.
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl LoaderConfig {
    /// Scheduling limits for the image loader.
    #[must_use]
    pub const fn loader_config(&self) -> ImageLoaderConfig {
        ImageLoaderConfig {
            max_concurrent_covers: self.max_concurrent_covers,
            max_concurrent_thumbnails: self.max_concurrent_thumbnails,
        }
    }
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            max_concurrent_covers: default_max_concurrent_covers(),
            max_concurrent_thumbnails: default_max_concurrent_thumbnails(),
            timeout_secs: default_timeout_secs(),
            user_agent: None,
        }
    }
}

const fn default_disk_max_bytes() -> u64 {
    DEFAULT_MAX_CACHE_SIZE
}

const fn default_memory_max_bytes() -> usize {
    DEFAULT_MAX_MEMORY_BYTES
}

const fn default_max_concurrent_covers() -> usize {
    4
}

const fn default_max_concurrent_thumbnails() -> usize {
    2
}

const fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl AppConfig {
    /// Merges CLI arguments into the configuration.
    pub fn merge_with_args(&mut self, args: &CliArgs) {
        if let Some(config_path) = &args.config {
            self.config = Some(config_path.clone());
        }
        if let Some(log_path) = &args.log_path {
            self.log_path = Some(log_path.clone());
        }
        if let Some(log_level) = args.log_level {
            self.log_level = log_level;
        }
        if let Some(directory) = &args.cache_dir {
            self.cache.directory = Some(directory.clone());
        }
        if let Some(disk_max_bytes) = args.disk_max_bytes {
            self.cache.disk_max_bytes = disk_max_bytes;
        }
        if let Some(memory_max_bytes) = args.memory_max_bytes {
            self.cache.memory_max_bytes = memory_max_bytes;
        }
        if let Some(timeout_secs) = args.timeout_secs {
            self.loader.timeout_secs = timeout_secs;
        }
    }

    /// Returns default config directory.
    #[must_use]
    pub fn default_config_dir() -> Option<PathBuf> {
        ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME)
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Returns default config file path.
    #[must_use]
    pub fn default_config_path() -> Option<PathBuf> {
        Self::default_config_dir().map(|dir| dir.join("config.toml"))
    }

    /// Returns default log file path.
    #[must_use]
    pub fn default_log_path() -> Option<PathBuf> {
        ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME)
            .map(|dirs| dirs.data_dir().join("shelfcache.log"))
    }

    /// Returns effective config path.
    #[must_use]
    pub fn effective_config_path(&self) -> Option<PathBuf> {
        self.config.clone().or_else(Self::default_config_path)
    }

    /// Returns effective log path.
    #[must_use]
    pub fn effective_log_path(&self) -> Option<PathBuf> {
        self.log_path.clone().or_else(Self::default_log_path)
    }
}
