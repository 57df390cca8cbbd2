//! Mockmon TUI - terminal operator console for a local HTTP mock/record server
//!
//! Talks to the server's management API to:
//!
//! - **Mocks**: list, create, edit, delete and clear canned responses
//! - **Request logs**: watch live traffic with expandable request/response detail
//! - **Proxy**: point unmatched requests at an upstream and record them
//! - **Export**: dump the request log to a timestamped JSON file
//! - **Shutdown**: stop the server after confirmation
//!
//! # Example
//!
//! ```no_run
//! use mockmon_tui::{App, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::default();
//!     let app = App::new(&config).await?;
//!     mockmon_tui::run(app).await
//! }
//! ```

pub mod api;
pub mod app;
pub mod body_mode;
pub mod components;
pub mod config;
pub mod console;
pub mod editor;
pub mod error;
pub mod event;
pub mod export;
pub mod headers;
pub mod logging;
pub mod logs;
pub mod poller;
pub mod theme;
pub mod ui;

#[cfg(test)]
mod testing;

pub use app::App;
pub use config::Config;
pub use event::{Event, EventHandler};
pub use theme::Theme;

use crossterm::{
    event::{DisableBracketedPaste, EnableBracketedPaste},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::time::Duration;

/// Redraw cadence; also drives status message expiry
const TICK_RATE: Duration = Duration::from_millis(250);

/// Run the console with the given app state.
///
/// Sets up the terminal, runs the event loop and restores the terminal on
/// exit, even when the loop fails.
pub async fn run(mut app: App) -> anyhow::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app).await;
    app.teardown();

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableBracketedPaste
    )?;
    terminal.show_cursor()?;

    if let Err(e) = &result {
        tracing::error!("Console exited with error: {:#}", e);
    }
    result
}

/// Main event loop
async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> anyhow::Result<()> {
    let mut events = EventHandler::new(TICK_RATE);
    app.attach(events.sender());

    while !app.should_quit {
        terminal.draw(|f| ui::draw(f, app))?;

        // Scheduled log fetches run on their own task and come back as
        // `Event::Logs`, so a slow backend never holds up key handling.
        match events.next().await {
            Some(event) => app.handle_event(event).await,
            None => break,
        }
    }

    Ok(())
}
