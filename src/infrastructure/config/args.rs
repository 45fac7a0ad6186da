use super::app_config::LogLevel;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::domain::entities::{DisplaySizePolicy, FetchClass};

/// Command-line arguments. Every global flag overrides the matching
/// `config.toml` value.
#[derive(Debug, Parser)]
#[command(
    name = "shelfcache",
    version,
    about = "Fetch, cache and scale book cover images",
    long_about = None
)]
pub struct CliArgs {
    /// Configuration file path.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log file path.
    #[arg(long, value_name = "PATH")]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Disk cache directory.
    #[arg(long, value_name = "PATH")]
    pub cache_dir: Option<PathBuf>,

    /// Disk cache budget in bytes.
    #[arg(long)]
    pub disk_max_bytes: Option<u64>,

    /// Memory cache budget in bytes.
    #[arg(long)]
    pub memory_max_bytes: Option<usize>,

    /// HTTP request timeout in seconds.
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Operation to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Operations exposed by the binary.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch an image through the cache and write the scaled result as PNG.
    Fetch {
        /// Image URI.
        uri: String,

        /// Requested display size.
        #[command(flatten)]
        size: SizeArgs,

        /// Treat the request as a thumbnail.
        #[arg(long)]
        thumbnail: bool,

        /// Output file.
        #[arg(short, long, value_name = "PATH")]
        out: Option<PathBuf>,
    },
    /// Render the placeholder cover for a title and author.
    Placeholder {
        /// Book title.
        title: String,

        /// Book author.
        author: String,

        /// Requested display size.
        #[command(flatten)]
        size: SizeArgs,

        /// Output file.
        #[arg(short, long, value_name = "PATH")]
        out: Option<PathBuf>,
    },
    /// Print cache statistics.
    Stats,
    /// Remove every cached entry.
    Clear,
}

impl Command {
    /// Fetch class implied by the command.
    #[must_use]
    pub const fn fetch_class(&self) -> FetchClass {
        match self {
            Self::Fetch {
                thumbnail: true, ..
            } => FetchClass::Thumbnail,
            _ => FetchClass::Cover,
        }
    }
}

/// Display-size flags shared by `fetch` and `placeholder`.
#[derive(Debug, Clone, Args)]
pub struct SizeArgs {
    /// Target height in pixels.
    #[arg(long, default_value_t = 400)]
    pub height: u32,

    /// Fit inside WIDTH x HEIGHT instead of matching the height exactly.
    #[arg(long, conflicts_with = "native")]
    pub width: Option<u32>,

    /// Keep the native resolution.
    #[arg(long)]
    pub native: bool,
}

impl SizeArgs {
    /// Display-size policy selected by the flags.
    #[must_use]
    pub const fn policy(&self) -> DisplaySizePolicy {
        if self.native {
            return DisplaySizePolicy::ScalePreserve;
        }
        match self.width {
            Some(width) => DisplaySizePolicy::ScaleSizeHint {
                width,
                height: self.height,
            },
            None => DisplaySizePolicy::HeightPreservingAspect {
                height: self.height,
            },
        }
    }
}
