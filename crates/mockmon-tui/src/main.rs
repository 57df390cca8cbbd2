//! Mockmon - terminal console for a local HTTP mock/record server
//!
//! # Usage
//!
//! ```bash
//! # Connect to the server on localhost:8000
//! mockmon
//!
//! # Connect to a different server
//! mockmon --api-url http://127.0.0.1:4000/api
//!
//! # Poll request logs every second
//! mockmon --refresh-ms 1000
//! ```

use clap::Parser;
use mockmon_tui::config::Cli;
use mockmon_tui::{logging, App, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from(Cli::parse());

    // Logs go to a file; stdout belongs to the terminal UI.
    let _guard = logging::init(&config.log_dir)?;
    tracing::info!(api_url = %config.api_url, "Starting mockmon");

    let app = App::new(&config).await?;
    mockmon_tui::run(app).await
}
