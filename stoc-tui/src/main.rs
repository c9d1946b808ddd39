//! STOC TUI — six-panel terminal stock dashboard with vim-style navigation.
//!
//! Panels:
//! 1. Query — symbol, exchange and date range
//! 2. Data — decorated price table
//! 3. Metrics — score breakdown, calculation steps, summary
//! 4. Chart — one plot per numeric column plus the comparison plots
//! 5. Heatmap — correlation matrix
//! 6. Help — keyboard shortcuts

mod app;
mod input;
mod persistence;
mod theme;
mod ui;
mod worker;

use std::fs::{self, File};
use std::io::{self, stdout};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use crossterm::event::{self, Event};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use stoc_core::data::{CircuitBreaker, ParquetCache};
use stoc_report::{ReportContext, StocConfig, DEFAULT_CONFIG_FILE};

use crate::app::{AppState, ErrorCategory, QueryState};
use crate::worker::{WorkerCommand, WorkerResponse};

fn main() -> Result<()> {
    // Install a panic hook that restores the terminal before printing the panic.
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stderr(), LeaveAlternateScreen);
        default_hook(info);
    }));

    // Paths
    let config_dir = dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("stoc");
    let state_path = config_dir.join("state.json");
    init_logging(&config_dir)?;

    let config = StocConfig::load_or_default(Path::new(DEFAULT_CONFIG_FILE))?;
    let exchange = config.exchange()?;
    let ctx = build_context(&config);

    // Load persisted state
    let persisted = persistence::load(&state_path);

    // Worker channels
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let (resp_tx, resp_rx) = mpsc::channel();

    let worker_handle = worker::spawn_worker(cmd_rx, resp_tx, ctx)?;

    let start = NaiveDate::from_ymd_opt(2020, 1, 1).context("invalid default start date")?;
    let today = Local::now().date_naive();
    let query = QueryState::new(exchange, start, today);
    let mut app = AppState::new(cmd_tx.clone(), resp_rx, query, PathBuf::from("."));

    persistence::apply(&mut app, persisted);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = run_app(&mut terminal, &mut app);

    // Save state before exit
    let persisted = persistence::extract(&app);
    if let Err(e) = persistence::save(&state_path, &persisted) {
        warn!("failed to save state: {e:#}");
    }

    let _ = cmd_tx.send(WorkerCommand::Shutdown);
    let _ = worker_handle.join();

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

/// Logs go to a file; the terminal belongs to the UI.
fn init_logging(config_dir: &Path) -> Result<()> {
    fs::create_dir_all(config_dir)
        .with_context(|| format!("cannot create {}", config_dir.display()))?;
    let log_path = config_dir.join("stoc.log");
    let file = File::create(&log_path)
        .with_context(|| format!("cannot open log file {}", log_path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn build_context(config: &StocConfig) -> ReportContext {
    let breaker = Arc::new(CircuitBreaker::default_provider());
    let provider = match config.build_provider(config.provider, breaker) {
        Ok(p) => Some(p),
        Err(e) => {
            warn!(provider = %config.provider, "provider unavailable, cache only: {e}");
            None
        }
    };
    info!(provider = %config.provider, cache = %config.cache_dir.display(), "report context ready");
    ReportContext {
        metrics: config.metrics.clone(),
        weights: config.weights,
        ..ReportContext::new(Some(ParquetCache::new(&config.cache_dir)), provider)
    }
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut AppState,
) -> Result<()> {
    loop {
        // 1. Render
        terminal.draw(|f| ui::draw(f, app))?;

        // 2. Drain worker responses (non-blocking)
        while let Ok(resp) = app.worker_rx.try_recv() {
            handle_worker_response(app, resp);
        }

        // 3. Poll for input events (50ms timeout for ~20 FPS tick)
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                input::handle_key(app, key);
            }
        }

        if !app.running {
            break;
        }
    }
    Ok(())
}

fn handle_worker_response(app: &mut AppState, resp: WorkerResponse) {
    app.loading = false;
    match resp {
        WorkerResponse::ReportReady { report } => {
            let report = *report;
            let msg = if report.warnings.is_empty() {
                format!(
                    "{}: {} rows, score {:.2}",
                    report.ticker,
                    report.frame.len(),
                    report.score.overall
                )
            } else {
                format!(
                    "{}: {} rows, {} warning(s)",
                    report.ticker,
                    report.frame.len(),
                    report.warnings.len()
                )
            };
            let warned = !report.warnings.is_empty();
            app.set_report(report);
            if warned {
                app.set_warning(msg);
            } else {
                app.set_status(msg);
            }
        }
        WorkerResponse::ReportFailed { error, no_data } => {
            let category = if no_data {
                ErrorCategory::Data
            } else {
                ErrorCategory::Network
            };
            let context = app.query.symbol.clone();
            app.push_error(category, error, context);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc::channel;
    use stoc_core::domain::Exchange;
    use stoc_report::{build_report, ReportRequest};

    fn app() -> AppState {
        let (tx, _rx) = channel();
        let (_tx2, rx2) = channel();
        let d = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let query = QueryState::new(Exchange::find("NYSE").unwrap(), d, d);
        AppState::new(tx, rx2, query, PathBuf::from("."))
    }

    #[test]
    fn failed_report_records_data_error() {
        let mut app = app();
        app.loading = true;
        handle_worker_response(
            &mut app,
            WorkerResponse::ReportFailed {
                error: stoc_report::NO_DATA_MESSAGE.into(),
                no_data: true,
            },
        );
        assert!(!app.loading);
        assert_eq!(app.error_history.len(), 1);
        assert_eq!(app.error_history[0].category, ErrorCategory::Data);
    }

    #[test]
    fn ready_report_is_installed() {
        let mut app = app();
        app.loading = true;
        app.data_scroll = 7;
        let ctx = ReportContext {
            offline: true,
            synthetic: true,
            ..ReportContext::new(None, None)
        };
        let request = ReportRequest::new(
            "ACME",
            Exchange::find("NYSE").unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 29).unwrap(),
        );
        let report = build_report(&ctx, &request).unwrap();
        handle_worker_response(
            &mut app,
            WorkerResponse::ReportReady {
                report: Box::new(report),
            },
        );
        assert!(!app.loading);
        assert!(app.report.is_some());
        assert_eq!(app.data_scroll, 0);
    }
}
