//! STOC CLI — stock reports, downloads and cache management.
//!
//! Commands:
//! - `report` — fetch, decorate and score one or more tickers
//! - `download` — fetch market data and cache it as Parquet
//! - `exchanges` — list the supported exchanges
//! - `cache status` — report cache size, symbol count, date ranges
//! - `cache clean` — remove symbols not fetched recently

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use stoc_core::data::{download_symbols, CircuitBreaker, LogProgress, ParquetCache};
use stoc_core::domain::{Exchange, PriceFrame};
use stoc_report::{
    build_reports, notify_best_effort, render_steps, save_csv, save_markdown, summary_lines,
    EmailRelayNotifier, ExportMode, LogNotifier, Notification, Notifier, ProviderKind, Report,
    ReportContext, ReportRequest, StocConfig, DEFAULT_CONFIG_FILE,
};
use tracing::warn;
use tracing_subscriber::EnvFilter;

const DEFAULT_START: &str = "2020-01-01";
const HEAD_ROWS: usize = 5;

#[derive(Parser)]
#[command(name = "stoc", about = "STOC — stock dashboard: prices, metrics and a weighted score")]
struct Cli {
    /// Path to the TOML config file.
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a report for one or more symbols.
    Report {
        /// Symbols as listed on the exchange (e.g., AAPL, RELIANCE).
        #[arg(required = true)]
        symbols: Vec<String>,

        /// Exchange name (see `stoc exchanges`). Defaults to the config value.
        #[arg(long)]
        exchange: Option<String>,

        /// Start date (YYYY-MM-DD). Defaults to 2020-01-01.
        #[arg(long)]
        start: Option<String>,

        /// End date (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        end: Option<String>,

        /// Write the decorated frame as CSV into this directory.
        #[arg(long)]
        export: Option<PathBuf>,

        /// Append to the accumulating {SYMBOL}.csv instead of a per-range file.
        #[arg(long, default_value_t = false)]
        append: bool,

        /// Also write a markdown report next to the CSV (or into the current directory).
        #[arg(long, default_value_t = false)]
        markdown: bool,

        /// Offline mode: serve from the cache only.
        #[arg(long, default_value_t = false)]
        offline: bool,

        /// Fall back to synthetic data when nothing else is available.
        #[arg(long, default_value_t = false)]
        synthetic: bool,

        /// Re-fetch even when the cache covers the range.
        #[arg(long, default_value_t = false)]
        force: bool,

        /// Data provider: yahoo, alpha_vantage or csv. Defaults to the config value.
        #[arg(long)]
        provider: Option<String>,

        /// E-mail the summary to this address.
        #[arg(long)]
        notify: Option<String>,
    },
    /// Download market data and cache it as Parquet.
    Download {
        /// Symbols to download (e.g., AAPL MSFT).
        #[arg(required = true)]
        symbols: Vec<String>,

        /// Exchange name. Defaults to the config value.
        #[arg(long)]
        exchange: Option<String>,

        /// Start date (YYYY-MM-DD). Defaults to 2020-01-01.
        #[arg(long)]
        start: Option<String>,

        /// End date (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        end: Option<String>,

        /// Force re-download even if cached.
        #[arg(long, default_value_t = false)]
        force: bool,

        /// Data provider: yahoo, alpha_vantage or csv.
        #[arg(long)]
        provider: Option<String>,
    },
    /// List supported exchanges with their ticker suffix and benchmark.
    Exchanges {
        /// Only exchanges whose name contains this text.
        #[arg(long)]
        search: Option<String>,
    },
    /// Cache management commands.
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand)]
enum CacheAction {
    /// Report cache size, symbol count, and date ranges.
    Status,
    /// Remove cached symbols not fetched within the given number of days.
    Clean {
        /// Remove symbols not fetched in this many days.
        #[arg(long)]
        unused_days: u64,

        /// Actually delete (without this flag, only previews what would be removed).
        #[arg(long, default_value_t = false)]
        confirm: bool,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {e:#}");
            std::process::exit(1);
        }
    }
}

/// `Ok(false)` means the command ran but at least one symbol failed.
fn run(cli: Cli) -> Result<bool> {
    let config = StocConfig::load_or_default(&cli.config)?;

    match cli.command {
        Commands::Report {
            symbols,
            exchange,
            start,
            end,
            export,
            append,
            markdown,
            offline,
            synthetic,
            force,
            provider,
            notify,
        } => {
            let opts = ReportArgs {
                exchange,
                start,
                end,
                export,
                mode: if append {
                    ExportMode::Append
                } else {
                    ExportMode::Overwrite
                },
                markdown,
                offline,
                synthetic,
                force,
                provider,
                notify,
            };
            run_report(&config, &symbols, opts)
        }
        Commands::Download {
            symbols,
            exchange,
            start,
            end,
            force,
            provider,
        } => run_download(&config, &symbols, exchange, start, end, force, provider),
        Commands::Exchanges { search } => {
            run_exchanges(search.as_deref());
            Ok(true)
        }
        Commands::Cache { action } => match action {
            CacheAction::Status => run_cache_status(&config.cache_dir).map(|()| true),
            CacheAction::Clean {
                unused_days,
                confirm,
            } => run_cache_clean(&config.cache_dir, unused_days, confirm).map(|()| true),
        },
    }
}

struct ReportArgs {
    exchange: Option<String>,
    start: Option<String>,
    end: Option<String>,
    export: Option<PathBuf>,
    mode: ExportMode,
    markdown: bool,
    offline: bool,
    synthetic: bool,
    force: bool,
    provider: Option<String>,
    notify: Option<String>,
}

fn parse_date(value: Option<&str>, default: NaiveDate) -> Result<NaiveDate> {
    value
        .map(|s| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .with_context(|| format!("invalid date '{s}' (expected YYYY-MM-DD)"))
        })
        .transpose()
        .map(|d| d.unwrap_or(default))
}

fn date_range(start: Option<&str>, end: Option<&str>) -> Result<(NaiveDate, NaiveDate)> {
    let default_start = NaiveDate::parse_from_str(DEFAULT_START, "%Y-%m-%d")?;
    let today = chrono::Local::now().date_naive();
    let start = parse_date(start, default_start)?;
    let end = parse_date(end, today)?;
    if start > end {
        bail!("start date {start} is after end date {end}");
    }
    Ok((start, end))
}

fn resolve_exchange(config: &StocConfig, name: Option<&str>) -> Result<&'static Exchange> {
    match name {
        Some(n) => Ok(Exchange::find(n)?),
        None => Ok(config.exchange()?),
    }
}

fn resolve_provider(config: &StocConfig, name: Option<&str>) -> Result<ProviderKind> {
    match name {
        Some(n) => Ok(n.parse()?),
        None => Ok(config.provider),
    }
}

fn run_report(config: &StocConfig, symbols: &[String], args: ReportArgs) -> Result<bool> {
    let exchange = resolve_exchange(config, args.exchange.as_deref())?;
    let (start, end) = date_range(args.start.as_deref(), args.end.as_deref())?;
    let kind = resolve_provider(config, args.provider.as_deref())?;

    let provider = if args.offline {
        None
    } else {
        let breaker = Arc::new(CircuitBreaker::default_provider());
        match config.build_provider(kind, breaker) {
            Ok(p) => Some(p),
            Err(e) => {
                warn!(provider = %kind, "provider unavailable, serving from cache: {e}");
                None
            }
        }
    };

    let ctx = ReportContext {
        offline: args.offline,
        synthetic: args.synthetic,
        force: args.force,
        metrics: config.metrics.clone(),
        weights: config.weights,
        ..ReportContext::new(Some(ParquetCache::new(&config.cache_dir)), provider)
    };

    let requests: Vec<ReportRequest> = symbols
        .iter()
        .map(|s| ReportRequest::new(s.as_str(), exchange, start, end))
        .collect();

    let recipient = args.notify.clone().or_else(|| config.notify.recipient.clone());
    let notifier = recipient
        .as_ref()
        .map(|_| build_notifier(&config.notify.sender));

    let mut all_ok = true;
    for (request, result) in requests.iter().zip(build_reports(&ctx, &requests)) {
        match result {
            Ok(report) => {
                print_report(&report);
                write_outputs(&report, &args, start, end)?;
                if let (Some(notifier), Some(to)) = (&notifier, &recipient) {
                    let notification = Notification::for_report(&report, to.as_str());
                    notify_best_effort(notifier.as_ref(), &notification);
                }
            }
            Err(e) => {
                all_ok = false;
                eprintln!("{}: {e}", request.ticker());
            }
        }
    }
    Ok(all_ok)
}

fn build_notifier(sender: &str) -> Box<dyn Notifier> {
    match EmailRelayNotifier::from_env(sender) {
        Ok(n) => Box::new(n),
        Err(e) => {
            warn!("e-mail relay not configured, logging notifications instead: {e}");
            Box::new(LogNotifier)
        }
    }
}

fn write_outputs(report: &Report, args: &ReportArgs, start: NaiveDate, end: NaiveDate) -> Result<()> {
    if let Some(dir) = &args.export {
        let path = save_csv(&report.frame, dir, start, end, args.mode)?;
        println!("CSV saved to: {}", path.display());
    }
    if args.markdown {
        let dir = args.export.clone().unwrap_or_else(|| PathBuf::from("."));
        let path = save_markdown(report, &dir)?;
        println!("Markdown saved to: {}", path.display());
    }
    Ok(())
}

fn print_report(report: &Report) {
    println!();
    println!("=== {} ===", report.ticker);
    println!("Exchange:       {}", report.request.exchange.name);
    println!(
        "Period:         {} to {}",
        report.request.start, report.request.end
    );
    println!("Rows:           {}", report.frame.len());
    println!("Source:         {}", report.source);
    println!("Benchmark:      {}", report.benchmark_ticker);
    if report.is_synthetic() {
        println!("                (synthetic data, not market prices)");
    }
    println!();
    print_head(&report.frame, HEAD_ROWS);
    println!();
    print!("{}", render_steps(&report.steps));
    println!();
    for line in summary_lines(&report.score) {
        println!("{line}");
    }
    if !report.warnings.is_empty() {
        println!();
        println!("Warnings:");
        for w in &report.warnings {
            println!("  - {w}");
        }
    }
}

fn print_head(frame: &PriceFrame, n: usize) {
    let head = frame.head(n);
    let columns = head.numeric_columns();
    let values: Vec<Vec<f64>> = columns
        .iter()
        .map(|c| head.column(c).unwrap_or_default())
        .collect();

    let mut header = format!("{:<12}", "Date");
    for c in &columns {
        header.push_str(&format!(" {:>14}", truncate(c, 14)));
    }
    println!("{header}");
    println!("{}", "-".repeat(header.len()));

    for (row, bar) in head.bars.iter().enumerate() {
        let mut line = format!("{:<12}", bar.date.to_string());
        for col in &values {
            let v = col.get(row).copied().unwrap_or(f64::NAN);
            if v.is_nan() {
                line.push_str(&format!(" {:>14}", "NaN"));
            } else {
                line.push_str(&format!(" {:>14.4}", v));
            }
        }
        println!("{line}");
    }
}

fn truncate(s: &str, width: usize) -> String {
    s.chars().take(width).collect()
}

fn run_download(
    config: &StocConfig,
    symbols: &[String],
    exchange: Option<String>,
    start: Option<String>,
    end: Option<String>,
    force: bool,
    provider: Option<String>,
) -> Result<bool> {
    let exchange = resolve_exchange(config, exchange.as_deref())?;
    let (start_date, end_date) = date_range(start.as_deref(), end.as_deref())?;
    let kind = resolve_provider(config, provider.as_deref())?;

    let circuit_breaker = Arc::new(CircuitBreaker::default_provider());
    let provider = config.build_provider(kind, circuit_breaker)?;
    let cache = ParquetCache::new(&config.cache_dir);

    let tickers: Vec<String> = symbols.iter().map(|s| exchange.ticker(s)).collect();
    let refs: Vec<&str> = tickers.iter().map(|s| s.as_str()).collect();

    let summary = download_symbols(
        provider.as_ref(),
        &cache,
        &refs,
        start_date,
        end_date,
        force,
        &LogProgress,
    );

    for (sym, err) in &summary.errors {
        eprintln!("Error for {sym}: {err}");
    }
    println!(
        "Downloaded {} of {} symbol(s) into {}",
        summary.succeeded,
        summary.total,
        config.cache_dir.display()
    );
    Ok(summary.all_succeeded())
}

fn run_exchanges(search: Option<&str>) {
    let list = match search {
        Some(s) => Exchange::search(s),
        None => Exchange::all().iter().collect(),
    };
    if list.is_empty() {
        println!("No exchange matches.");
        return;
    }
    println!("{:<45} {:<8} {:<10}", "Exchange", "Suffix", "Benchmark");
    println!("{}", "-".repeat(65));
    for e in list {
        let suffix = if e.suffix.is_empty() { "-" } else { e.suffix };
        println!("{:<45} {:<8} {:<10}", e.name, suffix, e.benchmark());
    }
}

fn run_cache_status(cache_dir: &Path) -> Result<()> {
    if !cache_dir.exists() {
        println!("Cache directory does not exist: {}", cache_dir.display());
        return Ok(());
    }

    let cache = ParquetCache::new(cache_dir);
    let mut entries = cache.entries()?;
    if entries.is_empty() {
        println!("Cache is empty: {}", cache_dir.display());
        return Ok(());
    }
    entries.sort_by(|a, b| a.symbol.cmp(&b.symbol));

    let total_size: u64 = entries.iter().map(|e| e.size_bytes).sum();

    println!("Cache: {}", cache_dir.display());
    println!("Symbols: {}", entries.len());
    println!("Total size: {}", format_size(total_size));
    println!();
    println!(
        "{:<14} {:<25} {:<12} {:>10}",
        "Symbol", "Date Range", "Bars", "Size"
    );
    println!("{}", "-".repeat(64));
    for entry in &entries {
        let (range, bars) = match &entry.meta {
            Some(meta) => (
                format!("{} to {}", meta.start_date, meta.end_date),
                format!("{} bars", meta.bar_count),
            ),
            None => ("(no meta)".into(), "-".into()),
        };
        println!(
            "{:<14} {:<25} {:<12} {:>10}",
            entry.symbol,
            range,
            bars,
            format_size(entry.size_bytes)
        );
    }

    Ok(())
}

fn run_cache_clean(cache_dir: &Path, unused_days: u64, confirm: bool) -> Result<()> {
    if !cache_dir.exists() {
        println!("Cache directory does not exist: {}", cache_dir.display());
        return Ok(());
    }

    let cutoff =
        chrono::Local::now().naive_local() - chrono::Duration::days(unused_days as i64);
    let cache = ParquetCache::new(cache_dir);
    let stale = cache.stale_entries(cutoff)?;

    if stale.is_empty() {
        println!("No symbols older than {unused_days} days to remove.");
        return Ok(());
    }

    println!(
        "Found {} symbol(s) not fetched in {unused_days} days:",
        stale.len()
    );
    for entry in &stale {
        println!("  {} ({})", entry.symbol, format_size(entry.size_bytes));
    }

    if !confirm {
        println!();
        println!("Dry run, pass --confirm to actually delete.");
        return Ok(());
    }

    for entry in &stale {
        cache.remove(&entry.symbol)?;
        println!("Removed: {}", entry.symbol);
    }

    println!("Done. Removed {} symbol(s).", stale.len());
    Ok(())
}

fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn report_flags_parse() {
        let cli = Cli::try_parse_from([
            "stoc", "report", "AAPL", "MSFT", "--exchange", "NASDAQ", "--start", "2024-01-01",
            "--offline", "--append", "--export", "out",
        ])
        .unwrap();
        match cli.command {
            Commands::Report {
                symbols,
                exchange,
                offline,
                append,
                export,
                ..
            } => {
                assert_eq!(symbols, vec!["AAPL", "MSFT"]);
                assert_eq!(exchange.as_deref(), Some("NASDAQ"));
                assert!(offline);
                assert!(append);
                assert_eq!(export, Some(PathBuf::from("out")));
            }
            _ => panic!("expected report"),
        }
    }

    #[test]
    fn dates_default_and_validate() {
        let (start, end) = date_range(None, None).unwrap();
        assert_eq!(start, NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
        assert!(end >= start);
        assert!(date_range(Some("2024-02-01"), Some("2024-01-01")).is_err());
        assert!(date_range(Some("01/02/2024"), None).is_err());
    }

    #[test]
    fn explicit_provider_overrides_config() {
        let config = StocConfig::default();
        assert_eq!(resolve_provider(&config, None).unwrap(), ProviderKind::Yahoo);
        assert_eq!(
            resolve_provider(&config, Some("alpha-vantage")).unwrap(),
            ProviderKind::AlphaVantage
        );
        assert!(resolve_provider(&config, Some("bloomberg")).is_err());
    }

    #[test]
    fn size_formatting() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.0 MB");
    }
}
