//! Ingest pipeline: order, dedupe, drop void rows, flag insane ones.
//!
//! Insane rows (inverted high/low, non-positive prices) are counted and kept.

use std::collections::HashSet;

use tracing::warn;

use crate::domain::Bar;

#[derive(Debug, Clone, PartialEq)]
pub struct IngestResult {
    pub bars: Vec<Bar>,
    /// Human-readable notes about rows that looked wrong.
    pub warnings: Vec<String>,
    /// Rows removed (duplicates and all-missing rows).
    pub dropped: usize,
}

pub fn ingest(mut bars: Vec<Bar>) -> IngestResult {
    let input = bars.len();
    // stable sort keeps provider order among equal dates, so "first wins"
    bars.sort_by_key(|b| b.date);

    let mut seen = HashSet::with_capacity(bars.len());
    let mut duplicates = 0;
    let mut void = 0;
    // void rows never claim a date, so a real bar behind a placeholder survives
    bars.retain(|b| {
        if b.is_void() {
            void += 1;
            return false;
        }
        if !seen.insert(b.date) {
            duplicates += 1;
            return false;
        }
        true
    });

    let mut warnings = Vec::new();
    if duplicates > 0 {
        warnings.push(format!("dropped {duplicates} duplicate date(s)"));
    }
    if void > 0 {
        warnings.push(format!("dropped {void} row(s) with no prices"));
    }
    let insane: Vec<_> = bars.iter().filter(|b| !b.is_void() && !b.is_sane()).collect();
    if let Some(first) = insane.first() {
        warnings.push(format!(
            "{} row(s) fail basic price checks (first on {})",
            insane.len(),
            first.date
        ));
    }
    for w in &warnings {
        warn!("{w}");
    }

    IngestResult {
        dropped: input - bars.len(),
        bars,
        warnings,
    }
}
