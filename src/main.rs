use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use color_eyre::eyre::Result;
use parking_lot::Mutex;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use thumbloader::infrastructure::config::{AppConfig, CliArgs, load_config};
use thumbloader::infrastructure::downloader;
use thumbloader::Downloader;

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
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = CliArgs::parse();
    let mut config = load_config(args.config.as_deref())?;
    config.merge_with_args(&args);

    init_logging(&config)?;
    info!(version = thumbloader::VERSION, "Starting thumbloader");

    let (delivery, mut deliveries) = downloader::channel();
    let loader: Downloader<usize> = Downloader::from_config(&config.downloader, Arc::new(delivery))?;

    let remaining: Arc<Mutex<HashSet<usize>>> =
        Arc::new(Mutex::new((0..args.urls.len()).collect()));
    let urls = Arc::new(args.urls.clone());
    {
        let remaining = remaining.clone();
        let urls = urls.clone();
        loader.set_listener(move |target, image| {
            remaining.lock().remove(&target);
            println!(
                "{target}\t{}\t{}x{}",
                urls[target],
                image.width(),
                image.height()
            );
        });
    }

    loader.start()?;
    for url in &args.preload {
        loader.preload(url)?;
    }
    for (target, url) in args.urls.iter().enumerate() {
        loader.queue(target, Some(url.as_str()))?;
    }

    let wait = Duration::from_secs(args.wait_secs);
    while !remaining.lock().is_empty() {
        match tokio::time::timeout(wait, deliveries.run_next()).await {
            Ok(true) => {}
            Ok(false) => break,
            Err(_) => {
                warn!(
                    missing = remaining.lock().len(),
                    "Timed out waiting for images"
                );
                break;
            }
        }
    }

    info!(stats = %loader.cache_stats(), "Finished");
    loader.shutdown().await;

    Ok(())
}
