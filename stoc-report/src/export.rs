//! CSV and Markdown export of a report.
//!
//! CSV columns follow the decorated frame: `Date`, the six base columns, then
//! the derived columns in the order they were appended. Missing values are
//! written as empty fields.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use stoc_core::domain::PriceFrame;
use tracing::info;

use crate::explain::{fmt_num, summary_lines};
use crate::report::Report;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportMode {
    /// Replace the file.
    #[default]
    Overwrite,
    /// Add rows to the per-ticker `{SYMBOL}.csv`, accumulating across date
    /// ranges. The header is written only when the file is new or empty, and
    /// an existing header must match the frame's columns.
    Append,
}

// ─── CSV export ─────────────────────────────────────────────────────

fn csv_field(v: f64) -> String {
    if v.is_nan() {
        String::new()
    } else {
        v.to_string()
    }
}

/// Serialize the frame as CSV, optionally with the header row.
pub fn frame_to_csv(frame: &PriceFrame, header: bool) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    if header {
        wtr.write_record(frame.column_names())?;
    }

    for (i, bar) in frame.bars.iter().enumerate() {
        let mut row = vec![
            bar.date.to_string(),
            csv_field(bar.open),
            csv_field(bar.high),
            csv_field(bar.low),
            csv_field(bar.close),
            csv_field(bar.adj_close),
            bar.volume.to_string(),
        ];
        row.extend(frame.derived().iter().map(|d| csv_field(d.values[i])));
        wtr.write_record(&row)?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// `{SYMBOL}_{start}_{end}.csv`
pub fn default_file_name(symbol: &str, start: NaiveDate, end: NaiveDate) -> String {
    format!("{symbol}_{start}_{end}.csv")
}

/// `{SYMBOL}.csv`, the accumulating file append mode writes to.
pub fn append_file_name(symbol: &str) -> String {
    format!("{symbol}.csv")
}

/// Header of an existing CSV, or `None` when the file is missing or empty.
fn existing_header(path: &Path) -> Result<Option<Vec<String>>> {
    match std::fs::metadata(path) {
        Ok(m) if m.len() > 0 => {}
        _ => return Ok(None),
    }
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let header = rdr
        .headers()
        .with_context(|| format!("failed to read header of {}", path.display()))?;
    Ok(Some(header.iter().map(str::to_string).collect()))
}

/// Write `frame` under `dir`. Overwrite uses [`default_file_name`], append
/// uses [`append_file_name`]. Returns the path written.
pub fn save_csv(
    frame: &PriceFrame,
    dir: &Path,
    start: NaiveDate,
    end: NaiveDate,
    mode: ExportMode,
) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create export dir: {}", dir.display()))?;
    let path = match mode {
        ExportMode::Overwrite => dir.join(default_file_name(&frame.symbol, start, end)),
        ExportMode::Append => dir.join(append_file_name(&frame.symbol)),
    };

    match mode {
        ExportMode::Overwrite => {
            let csv = frame_to_csv(frame, true)?;
            std::fs::write(&path, csv)
                .with_context(|| format!("failed to write {}", path.display()))?;
        }
        ExportMode::Append => {
            let existing = existing_header(&path)?;
            if let Some(header) = &existing {
                let columns = frame.column_names();
                if *header != columns {
                    bail!(
                        "cannot append to {}: file columns [{}] differ from [{}]",
                        path.display(),
                        header.join(", "),
                        columns.join(", ")
                    );
                }
            }
            let csv = frame_to_csv(frame, existing.is_none())?;
            let mut file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("failed to open {}", path.display()))?;
            file.write_all(csv.as_bytes())
                .with_context(|| format!("failed to append to {}", path.display()))?;
        }
    }

    info!(path = %path.display(), rows = frame.len(), ?mode, "exported CSV");
    Ok(path)
}

// ─── Markdown reports ───────────────────────────────────────────────

pub fn generate_markdown(report: &Report) -> String {
    let mut md = String::new();
    let card = &report.score;

    md.push_str(&format!("# STOC Report: {}\n\n", report.ticker));

    md.push_str("## Metadata\n\n");
    md.push_str("| Field | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!("| Symbol | {} |\n", report.request.symbol));
    md.push_str(&format!("| Exchange | {} |\n", report.request.exchange.name));
    md.push_str(&format!(
        "| Period | {} to {} |\n",
        report.request.start, report.request.end
    ));
    md.push_str(&format!("| Rows | {} |\n", report.frame.len()));
    md.push_str(&format!("| Source | {} |\n", report.source));
    md.push_str(&format!("| Benchmark | {} |\n", report.benchmark_ticker));
    if let Some(class) = card.size_class {
        md.push_str(&format!("| Size | {} |\n", class.label()));
    }
    if let Some(vix) = card.mean_vix {
        md.push_str(&format!("| Mean VIX | {vix:.2} |\n"));
    }
    if report.is_synthetic() {
        md.push_str("| Data | **SYNTHETIC** |\n");
    }
    md.push('\n');

    md.push_str("## Scores\n\n");
    md.push_str("| Metric | Score | Weight | Weighted |\n");
    md.push_str("| --- | --- | --- | --- |\n");
    for (name, c) in [
        ("Return (%)", &card.ret),
        ("Volatility (%)", &card.volatility),
        ("Market Capitalization (bn)", &card.market_cap),
        ("National Average Return (%)", &card.benchmark),
    ] {
        md.push_str(&format!(
            "| {name} | {} | {} | {} |\n",
            fmt_num(c.score, 4),
            fmt_num(c.weight, 2),
            fmt_num(c.weighted, 4)
        ));
    }
    md.push_str(&format!(
        "| **Overall** | | | **{}** |\n\n",
        fmt_num(card.overall, 4)
    ));

    md.push_str("## Calculation\n\n");
    for step in &report.steps {
        md.push_str(&format!("{}. **{}**\n", step.number, step.title));
        if !step.formula.is_empty() {
            md.push_str(&format!("   - `{}`\n", step.formula));
        }
        md.push_str(&format!("   - {}\n", step.value));
    }
    md.push('\n');

    md.push_str("## Assessment\n\n");
    for line in summary_lines(card) {
        md.push_str(&format!("- {line}\n"));
    }
    md.push('\n');

    if !report.warnings.is_empty() {
        md.push_str("## Data Warnings\n\n");
        for w in &report.warnings {
            md.push_str(&format!("- {w}\n"));
        }
        md.push('\n');
    }

    md
}

/// Write the Markdown report next to the CSV. Returns the path written.
pub fn save_markdown(report: &Report, dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create export dir: {}", dir.display()))?;
    let name = default_file_name(&report.ticker, report.request.start, report.request.end)
        .replace(".csv", ".md");
    let path = dir.join(name);
    std::fs::write(&path, generate_markdown(report))
        .with_context(|| format!("failed to write {}", path.display()))?;
    info!(path = %path.display(), "exported Markdown report");
    Ok(path)
}
