use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use shelfcache::application::CoverService;
use shelfcache::domain::ports::FnListener;
use shelfcache::domain::{Bitmap, ImageError};
use shelfcache::infrastructure::config::{
    AppConfig, CliArgs, Command, ConfigSource, LoadedConfig, StorageManager,
};

fn init_logging(config: &AppConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.to_string()));

    if let Some(log_path) = config.effective_log_path() {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)?;

        let file_layer = fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .init();

        info!(path = %log_path.display(), "Logging initialized");
    } else {
        tracing_subscriber::registry().with(filter).init();
    }

    Ok(())
}

fn load_config(args: &CliArgs) -> Result<LoadedConfig> {
    let storage = StorageManager::new()?;
    let mut loaded = storage.load_config(args.config.as_deref())?;
    loaded.config.merge_with_args(args);
    Ok(loaded)
}

fn report_config_source(source: &ConfigSource) {
    match source {
        ConfigSource::File(path) => debug!(path = %path.display(), "Loaded configuration"),
        ConfigSource::Created(path) => {
            info!(path = %path.display(), "Config file not found, wrote defaults");
        }
        ConfigSource::Defaults(error) => warn!(error = %error, "Using default configuration"),
    }
}

fn write_png(bitmap: &Bitmap, out: Option<PathBuf>, fallback: &str) -> Result<()> {
    let path = out.unwrap_or_else(|| PathBuf::from(fallback));
    save(bitmap, &path)?;
    println!("{}x{} -> {}", bitmap.width(), bitmap.height(), path.display());
    Ok(())
}

fn save(bitmap: &Bitmap, path: &Path) -> Result<()> {
    bitmap
        .to_rgb()
        .save(path)
        .wrap_err_with(|| format!("Failed to write {}", path.display()))
}

async fn run(args: CliArgs, config: AppConfig) -> Result<()> {
    let class = args.command.fetch_class();
    let service = CoverService::new(&config).await?;
    let loader = service.loader();

    match args.command {
        Command::Fetch { uri, size, out, .. } => {
            let listener = Arc::new(FnListener::new(
                |uri: &str, bitmap: Arc<Bitmap>| {
                    info!(uri = %uri, bytes = bitmap.byte_size(), "Cover delivered");
                },
                |uri: &str, error: ImageError| warn!(uri = %uri, error = %error, "Cover failed"),
            ));
            let request = loader.get(uri, size.policy(), class, listener);
            let bitmap = request.await?;
            write_png(&bitmap, out, "cover.png")?;
        }
        Command::Placeholder {
            title,
            author,
            size,
            out,
        } => {
            let uri = CoverService::cover_uri_or_placeholder(None, &title, &author);
            let loaded = loader.load(&uri, size.policy()).await?;
            write_png(&loaded.bitmap, out, "placeholder.png")?;
        }
        Command::Stats => {
            let disk = loader.cache().disk();
            println!("memory: {}", loader.memory_cache_stats());
            println!(
                "disk: {} entries, {} / {} bytes ({})",
                disk.len(),
                disk.current_size(),
                disk.max_size(),
                disk.cache_dir().display()
            );
        }
        Command::Clear => {
            loader.clear_all().await;
            println!("Cleared cover caches");
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = CliArgs::parse();
    let LoadedConfig { config, source } = load_config(&args)?;

    init_logging(&config)?;

    info!(version = shelfcache::VERSION, "Starting shelfcache");
    report_config_source(&source);

    run(args, config).await
}
