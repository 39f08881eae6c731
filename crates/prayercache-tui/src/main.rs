//! prayercache - today's prayer times in the terminal.
//!
//! Times come from the Aladhan calendar API a month at a time and are
//! cached locally, so the screen keeps working offline.

mod app;
mod ui;

use std::io;
use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use prayercache_core::{build_client, AppClient, Config, LoadReport};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use app::{App, AppState};
use ui::input::handle_input;
use ui::render::render;

// ============================================================================
// Constants
// ============================================================================

/// Timeout for polling terminal events (in milliseconds)
const EVENT_POLL_TIMEOUT_MS: u64 = 100;

/// Log file prefix inside the cache directory
const LOG_FILE_PREFIX: &str = "prayercache.log";

/// Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Log to stderr, for the plain-text mode
fn init_stderr_tracing() {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(env_filter())
        .init();
}

/// Log to a daily file, since stderr would draw over the TUI
fn init_file_tracing(log_dir: &Path) -> WorkerGuard {
    let appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(env_filter())
        .init();
    guard
}

/// Command line flags
#[derive(Debug, Default, PartialEq)]
struct CliArgs {
    help: bool,
    print_mode: bool,
    force_refresh: bool,
    clear_cache: bool,
}

impl CliArgs {
    fn parse(args: &[String]) -> Self {
        let has = |flag: &str| args.iter().any(|a| a == flag);
        Self {
            help: has("--help") || has("-h"),
            print_mode: has("--print"),
            force_refresh: has("--refresh"),
            clear_cache: has("--clear-cache"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let cli = CliArgs::parse(&args);

    if cli.help {
        println!("Usage: prayercache [--print] [--refresh] [--clear-cache]");
        println!();
        println!("  --print        print today's times and exit instead of opening the TUI");
        println!("  --refresh      skip the cache and fetch new times on start");
        println!("  --clear-cache  delete the cached month and exit");
        return Ok(());
    }

    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Warning: {:#}; using default configuration", e);
            Config::default()
        }
    };

    if cli.clear_cache {
        init_stderr_tracing();
        let client = build_client(&config)?;
        client.cache().clear()?;
        println!("Cache cleared: {}", client.cache().cache_dir().display());
        return Ok(());
    }

    if cli.print_mode {
        init_stderr_tracing();
        let client = build_client(&config)?;
        return print_today(&client, cli.force_refresh).await;
    }

    let client = build_client(&config)?;
    let _log_guard = init_file_tracing(client.cache().cache_dir());
    info!("prayercache TUI starting");

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(client);
    app.start_load(cli.force_refresh);

    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
    }

    info!("prayercache TUI shutting down");
    Ok(())
}

/// Run one load and print the result as plain text
async fn print_today(client: &AppClient, force_refresh: bool) -> Result<()> {
    let report = client.load(force_refresh).await;

    for line in plain_lines(&report) {
        println!("{}", line);
    }
    for notice in &report.notices {
        eprintln!("! {}", notice);
    }

    if report.is_error_state() {
        warn!("No prayer times available");
        anyhow::bail!("No prayer times available");
    }
    Ok(())
}

fn plain_lines(report: &LoadReport) -> Vec<String> {
    let mut lines = vec![report.location.display()];
    if let Some(ref view) = report.view {
        lines.push(view.date_line());
        for (prayer, time) in view.times.iter() {
            lines.push(format!("  {:<8} {:>8}", prayer.name(), time));
        }
        lines.push(view.provenance.last_updated_line());
    }
    lines
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        terminal.draw(|f| render(f, app))?;

        // Poll for events with timeout to allow background updates
        if event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            if let Event::Key(key) = event::read()? {
                // Ctrl+C to quit
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    return Ok(());
                }

                if handle_input(app, key) {
                    return Ok(());
                }
            }
        }

        // Check for completed loads and expired notices
        app.check_background_tasks();

        if matches!(app.state, AppState::Quitting) {
            return Ok(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use prayercache_core::models::{DateInfo, DayTimings, Position, Timings};
    use prayercache_core::prayer::{LocationStatus, Provenance, TodayView};

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|a| a.to_string()).collect()
    }

    #[test]
    fn test_cli_args() {
        assert_eq!(CliArgs::parse(&[]), CliArgs::default());

        // --refresh applies to the TUI as well as to --print
        let tui = CliArgs::parse(&args(&["--refresh"]));
        assert!(tui.force_refresh);
        assert!(!tui.print_mode);

        let print = CliArgs::parse(&args(&["--print", "--refresh"]));
        assert!(print.print_mode && print.force_refresh);

        assert!(CliArgs::parse(&args(&["-h"])).help);
        assert!(CliArgs::parse(&args(&["--clear-cache"])).clear_cache);
    }

    #[test]
    fn test_plain_lines_error_state() {
        let report = LoadReport {
            location: LocationStatus::Unavailable,
            ..LoadReport::default()
        };
        assert_eq!(plain_lines(&report), vec!["Location unavailable.".to_string()]);
    }

    #[test]
    fn test_plain_lines_with_times() {
        let day = DayTimings {
            timings: Some(Timings {
                fajr: Some("05:12 (EEST)".to_string()),
                ..Timings::default()
            }),
            date: DateInfo {
                readable: "17 Oct 2026".to_string(),
                gregorian: None,
            },
        };
        let fetched_at = Utc.with_ymd_and_hms(2026, 10, 15, 8, 0, 0).unwrap();
        let report = LoadReport {
            view: TodayView::from_day(&day, Provenance::Cached { fetched_at }),
            location: LocationStatus::Known(Position::new(41.0, 29.0)),
            notices: Vec::new(),
        };

        let lines = plain_lines(&report);
        assert_eq!(lines[0], "Location: Lat 41.00, Lon 29.00");
        assert_eq!(lines[1], "Saturday, October 17, 2026");
        assert_eq!(lines[2], "  Fajr      5:12 AM");
        assert_eq!(lines.len(), 9);
        assert!(lines[8].starts_with("(from cache, last fetched: "));
    }
}
