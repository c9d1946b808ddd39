//! PriceFrame — the bar table plus appended derived columns.
//!
//! Base columns come straight from the provider and are never mutated.
//! Derived columns are appended in order and always have one value per bar.

use chrono::NaiveDate;

use super::bar::Bar;
use crate::metrics::DerivedColumn;

/// Names of the base columns, in export order.
pub const BASE_COLUMNS: [&str; 7] = ["Date", "Open", "High", "Low", "Close", "Adj Close", "Volume"];

/// A derived column and its values.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedSeries {
    pub column: DerivedColumn,
    pub values: Vec<f64>,
}

/// Daily bars for one ticker, indexed by trading date.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceFrame {
    pub symbol: String,
    pub bars: Vec<Bar>,
    derived: Vec<DerivedSeries>,
}

impl PriceFrame {
    pub fn new(symbol: impl Into<String>, bars: Vec<Bar>) -> Self {
        Self {
            symbol: symbol.into(),
            bars,
            derived: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.bars.iter().map(|b| b.date).collect()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.bars.first().map(|b| b.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|b| b.date)
    }

    /// A copy holding only the first `n` rows (derived columns truncated too).
    pub fn head(&self, n: usize) -> PriceFrame {
        let n = n.min(self.len());
        PriceFrame {
            symbol: self.symbol.clone(),
            bars: self.bars[..n].to_vec(),
            derived: self
                .derived
                .iter()
                .map(|d| DerivedSeries {
                    column: d.column,
                    values: d.values[..n].to_vec(),
                })
                .collect(),
        }
    }

    pub fn derived(&self) -> &[DerivedSeries] {
        &self.derived
    }

    /// Append a derived column, replacing it if already present.
    ///
    /// # Panics
    /// If `values` does not have one entry per bar.
    pub fn push_derived(&mut self, column: DerivedColumn, values: Vec<f64>) {
        assert_eq!(
            values.len(),
            self.bars.len(),
            "derived column '{}' has {} values for {} bars",
            column.label(),
            values.len(),
            self.bars.len()
        );
        match self.derived.iter_mut().find(|d| d.column == column) {
            Some(existing) => existing.values = values,
            None => self.derived.push(DerivedSeries { column, values }),
        }
    }

    pub fn derived_values(&self, column: DerivedColumn) -> Option<&[f64]> {
        self.derived
            .iter()
            .find(|d| d.column == column)
            .map(|d| d.values.as_slice())
    }

    /// Every column name: base columns first, then derived labels in insertion order.
    pub fn column_names(&self) -> Vec<String> {
        BASE_COLUMNS
            .iter()
            .map(|s| s.to_string())
            .chain(self.derived.iter().map(|d| d.column.label().to_string()))
            .collect()
    }

    /// Every column that holds numbers (all but `Date`).
    pub fn numeric_columns(&self) -> Vec<String> {
        self.column_names().into_iter().skip(1).collect()
    }

    /// Numeric values of a column by name. `Date` is not numeric and returns `None`.
    pub fn column(&self, name: &str) -> Option<Vec<f64>> {
        let base = |f: fn(&Bar) -> f64| Some(self.bars.iter().map(f).collect());
        match name {
            "Open" => base(|b| b.open),
            "High" => base(|b| b.high),
            "Low" => base(|b| b.low),
            "Close" => base(|b| b.close),
            "Adj Close" => base(|b| b.adj_close),
            "Volume" => base(|b| b.volume as f64),
            _ => self
                .derived
                .iter()
                .find(|d| d.column.label() == name)
                .map(|d| d.values.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bars(closes: &[f64]) -> Vec<Bar> {
        let base = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Bar {
                date: base + chrono::Duration::days(i as i64),
                open: c - 1.0,
                high: c + 1.0,
                low: c - 2.0,
                close: c,
                adj_close: c,
                volume: 1_000 * (i as u64 + 1),
            })
            .collect()
    }

    #[test]
    fn base_columns_are_addressable() {
        let frame = PriceFrame::new("SPY", bars(&[10.0, 11.0]));
        assert_eq!(frame.column("Close"), Some(vec![10.0, 11.0]));
        assert_eq!(frame.column("Volume"), Some(vec![1000.0, 2000.0]));
        assert_eq!(frame.column("Date"), None);
        assert_eq!(frame.column("Nope"), None);
    }

    #[test]
    fn derived_columns_append_in_order() {
        let mut frame = PriceFrame::new("SPY", bars(&[10.0, 11.0]));
        frame.push_derived(DerivedColumn::Return, vec![f64::NAN, 0.1]);
        frame.push_derived(DerivedColumn::PriceRange, vec![3.0, 3.0]);

        let names = frame.column_names();
        assert_eq!(names.len(), 9);
        assert_eq!(names[7], "Return");
        assert_eq!(names[8], "Price Range");
        assert_eq!(frame.numeric_columns().len(), 8);
        assert_eq!(frame.column("Price Range"), Some(vec![3.0, 3.0]));
    }

    #[test]
    fn pushing_same_column_replaces_it() {
        let mut frame = PriceFrame::new("SPY", bars(&[10.0, 11.0]));
        frame.push_derived(DerivedColumn::PriceRange, vec![1.0, 1.0]);
        frame.push_derived(DerivedColumn::PriceRange, vec![2.0, 2.0]);
        assert_eq!(frame.derived().len(), 1);
        assert_eq!(frame.derived_values(DerivedColumn::PriceRange), Some(&[2.0, 2.0][..]));
    }

    #[test]
    #[should_panic(expected = "has 1 values for 2 bars")]
    fn length_mismatch_panics() {
        let mut frame = PriceFrame::new("SPY", bars(&[10.0, 11.0]));
        frame.push_derived(DerivedColumn::PriceRange, vec![1.0]);
    }

    #[test]
    fn head_truncates_everything() {
        let mut frame = PriceFrame::new("SPY", bars(&[10.0, 11.0, 12.0]));
        frame.push_derived(DerivedColumn::PriceRange, vec![1.0, 2.0, 3.0]);
        let head = frame.head(2);
        assert_eq!(head.len(), 2);
        assert_eq!(head.derived_values(DerivedColumn::PriceRange), Some(&[1.0, 2.0][..]));
        assert_eq!(frame.head(10).len(), 3);
    }
}
