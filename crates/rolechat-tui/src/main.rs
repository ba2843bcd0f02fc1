mod app;
mod handler;
mod tui;
mod ui;

use std::fs::{self, File};
use std::sync::Mutex;
use anyhow::Result;
use tracing_subscriber::EnvFilter;
use rolechat_core::Preferences;
use app::App;
use tui::EventHandler;

/// Environment variable holding the log filter, e.g. `debug` or `rolechat_core=trace`
const LOG_FILTER_ENV: &str = "ROLECHAT_LOG";

/// Directives from the environment, or `info` when unset or unparsable
fn log_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

/// Log to a file under the cache directory; stderr belongs to the terminal UI
fn init_logging() -> Result<()> {
    let Some(cache_dir) = dirs::cache_dir() else {
        return Ok(());
    };
    let log_dir = cache_dir.join("rolechat");
    fs::create_dir_all(&log_dir)?;
    let file = File::create(log_dir.join("rolechat.log"))?;

    tracing_subscriber::fmt()
        .with_env_filter(log_filter(std::env::var(LOG_FILTER_ENV).ok().as_deref()))
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = init_logging() {
        eprintln!("Logging disabled: {}", e);
    }

    let prefs = Preferences::load()?;
    let mut app = App::new(prefs);

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "rolechat started");

    let result = run(&mut terminal, &mut app, &mut events).await;

    tui::restore()?;
    tracing::info!("rolechat exited");
    result
}

async fn run(terminal: &mut tui::Tui, app: &mut App, events: &mut EventHandler) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event).await?,
            None => break,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_filter_defaults_to_info() {
        assert_eq!(log_filter(None).to_string(), "info");
        assert_eq!(log_filter(Some("rolechat_core=loud")).to_string(), "info");
    }

    #[test]
    fn test_log_filter_accepts_per_target_directives() {
        assert_eq!(
            log_filter(Some("rolechat_core=trace")).to_string(),
            "rolechat_core=trace"
        );
    }
}
