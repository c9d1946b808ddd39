//! STOC Report — turns a ticker, exchange and date range into a scored report.
//!
//! This crate builds on `stoc-core` to provide:
//! - `stoc.toml` configuration and provider selection
//! - Bar loading with cache/download/synthetic fallback
//! - The weighted score card and its step-by-step explanation
//! - CSV and Markdown export
//! - Best-effort e-mail notification

pub mod config;
pub mod data_loader;
pub mod explain;
pub mod export;
pub mod notify;
pub mod report;
pub mod scoring;

pub use config::{
    ConfigError, CsvConfig, NotifyConfig, ProviderKind, StocConfig, DEFAULT_CONFIG_FILE,
};
pub use data_loader::{generate_synthetic_bars, load_bars, LoadError, LoadOptions, LoadedBars};
pub use explain::{explain, render_steps, summary_lines, Step};
pub use export::{
    append_file_name, default_file_name, frame_to_csv, generate_markdown, save_csv,
    save_markdown, ExportMode,
};
pub use notify::{
    notify_best_effort, EmailRelayNotifier, LogNotifier, Notification, Notifier, NotifyError,
};
pub use report::{
    build_report, build_reports, Report, ReportContext, ReportError, ReportRequest, NO_DATA_MESSAGE,
};
pub use scoring::{ScoreCard, ScoreComponent, ScoreInputs, ScoreWeights};

/// Bars from closes: open = previous close, high/low ±1, volume 1000,
/// consecutive days from 2024-01-02.
#[cfg(test)]
pub(crate) fn test_bars(closes: &[f64]) -> Vec<stoc_core::domain::Bar> {
    let base = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| {
            let open = if i == 0 { c } else { closes[i - 1] };
            stoc_core::domain::Bar {
                date: base + chrono::Duration::days(i as i64),
                open,
                high: open.max(c) + 1.0,
                low: open.min(c) - 1.0,
                close: c,
                adj_close: c,
                volume: 1_000,
            }
        })
        .collect()
}
