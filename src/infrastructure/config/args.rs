use super::app_config::LogLevel;
use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments of the `thumbloader` binary.
#[derive(Debug, Parser)]
#[command(
    name = "thumbloader",
    version,
    about = "Fetch, decode and cache images in the background",
    long_about = None
)]
pub struct CliArgs {
    /// Image URLs to download; each is bound to its position as target.
    #[arg(value_name = "URL")]
    pub urls: Vec<String>,

    /// URLs to preload into the cache before the downloads.
    #[arg(long, value_name = "URL")]
    pub preload: Vec<String>,

    /// Configuration file path.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log file path.
    #[arg(long, value_name = "PATH")]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Decoded image cache budget in bytes.
    #[arg(long)]
    pub cache_budget_bytes: Option<usize>,

    /// HTTP request timeout in seconds.
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Give up after this many seconds without a delivery.
    #[arg(long, default_value_t = 30)]
    pub wait_secs: u64,
}
