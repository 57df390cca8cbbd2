//! Command-line configuration

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Default API base path of a locally running mock server
pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";

#[derive(Parser, Debug)]
#[command(name = "mockmon")]
#[command(author, version, about = "Terminal console for a local HTTP mock and record server")]
pub struct Cli {
    /// Mock server API base URL
    #[arg(short, long, default_value = DEFAULT_API_URL, env = "MOCKMON_API_URL")]
    pub api_url: String,

    /// Request log refresh interval in milliseconds
    #[arg(short, long, default_value = "5000", env = "MOCKMON_REFRESH_MS")]
    pub refresh_ms: u64,

    /// Start with automatic log refresh turned off
    #[arg(long)]
    pub no_auto_refresh: bool,

    /// Directory request log exports are written to
    #[arg(long, env = "MOCKMON_EXPORT_DIR")]
    pub export_dir: Option<PathBuf>,

    /// Directory for diagnostic log files
    #[arg(long, env = "MOCKMON_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    /// HTTP request timeout in seconds
    #[arg(long, default_value = "10")]
    pub timeout_secs: u64,
}

/// Resolved settings for one console session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_url: String,
    pub refresh_interval: Duration,
    pub auto_refresh: bool,
    pub export_dir: PathBuf,
    pub log_dir: PathBuf,
    pub timeout: Duration,
}

impl From<Cli> for Config {
    fn from(cli: Cli) -> Self {
        Self {
            api_url: cli.api_url,
            // A zero period would spin the poller
            refresh_interval: Duration::from_millis(cli.refresh_ms.max(100)),
            auto_refresh: !cli.no_auto_refresh,
            export_dir: cli.export_dir.unwrap_or_else(|| PathBuf::from(".")),
            log_dir: cli.log_dir.unwrap_or_else(default_log_dir),
            timeout: Duration::from_secs(cli.timeout_secs),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            refresh_interval: Duration::from_millis(5000),
            auto_refresh: true,
            export_dir: PathBuf::from("."),
            log_dir: default_log_dir(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// `<data dir>/mockmon`, or the working directory when the OS has none
pub fn default_log_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("mockmon"))
        .unwrap_or_else(|| PathBuf::from("."))
}
