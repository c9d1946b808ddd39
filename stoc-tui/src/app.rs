//! Application state — single-owner, main-thread only.
//!
//! All TUI state lives here. The worker thread communicates via channels.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::mpsc::{Receiver, Sender};

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use stoc_core::domain::Exchange;
use stoc_report::Report;

use crate::worker::{WorkerCommand, WorkerResponse};

/// Which panel is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Panel {
    Query,
    Data,
    Metrics,
    Chart,
    Heatmap,
    Help,
}

impl Panel {
    const ALL: [Panel; 6] = [
        Panel::Query,
        Panel::Data,
        Panel::Metrics,
        Panel::Chart,
        Panel::Heatmap,
        Panel::Help,
    ];

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|p| *p == self).unwrap_or(0)
    }

    pub fn from_index(i: usize) -> Option<Self> {
        Self::ALL.get(i).copied()
    }

    pub fn label(self) -> &'static str {
        match self {
            Panel::Query => "Query",
            Panel::Data => "Data",
            Panel::Metrics => "Metrics",
            Panel::Chart => "Chart",
            Panel::Heatmap => "Heatmap",
            Panel::Help => "Help",
        }
    }

    pub fn next(self) -> Panel {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Panel {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Status message severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Warning,
    Error,
}

/// An error record for the error history overlay.
#[derive(Debug, Clone)]
pub struct ErrorRecord {
    pub timestamp: NaiveDateTime,
    pub category: ErrorCategory,
    pub message: String,
    pub context: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Data,
    Input,
    Export,
    Other,
}

impl ErrorCategory {
    pub fn label(self) -> &'static str {
        match self {
            ErrorCategory::Network => "NET",
            ErrorCategory::Data => "DATA",
            ErrorCategory::Input => "INPUT",
            ErrorCategory::Export => "EXPORT",
            ErrorCategory::Other => "ERR",
        }
    }
}

/// Editable fields of the query panel, top to bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryField {
    Symbol,
    Exchange,
    Start,
    End,
}

impl QueryField {
    pub const ALL: [QueryField; 4] = [
        QueryField::Symbol,
        QueryField::Exchange,
        QueryField::Start,
        QueryField::End,
    ];

    pub fn label(self) -> &'static str {
        match self {
            QueryField::Symbol => "Ticker Symbol",
            QueryField::Exchange => "Exchange",
            QueryField::Start => "Start Date",
            QueryField::End => "End Date",
        }
    }
}

/// Query panel state: the sidebar inputs of the dashboard.
#[derive(Debug, Clone)]
pub struct QueryState {
    pub symbol: String,
    pub exchange: &'static Exchange,
    pub start: String,
    pub end: String,
    pub cursor: usize,
    /// Keystrokes go into the focused text field.
    pub editing: bool,
}

impl QueryState {
    pub fn new(exchange: &'static Exchange, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            symbol: String::new(),
            exchange,
            start: start.to_string(),
            end: end.to_string(),
            cursor: 0,
            editing: false,
        }
    }

    pub fn field(&self) -> QueryField {
        QueryField::ALL[self.cursor.min(QueryField::ALL.len() - 1)]
    }

    /// The text buffer behind the focused field, if it is free text.
    pub fn buffer_mut(&mut self) -> Option<&mut String> {
        match self.field() {
            QueryField::Symbol => Some(&mut self.symbol),
            QueryField::Start => Some(&mut self.start),
            QueryField::End => Some(&mut self.end),
            QueryField::Exchange => None,
        }
    }

    /// Parse the inputs; the error names the offending field.
    pub fn validate(&self) -> Result<(String, NaiveDate, NaiveDate), String> {
        let symbol = self.symbol.trim();
        if symbol.is_empty() {
            return Err("Enter a ticker symbol".into());
        }
        let parse = |field: QueryField, raw: &str| {
            NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
                .map_err(|_| format!("{}: expected YYYY-MM-DD, got '{}'", field.label(), raw.trim()))
        };
        let start = parse(QueryField::Start, &self.start)?;
        let end = parse(QueryField::End, &self.end)?;
        if start > end {
            return Err(format!("Start Date {start} is after End Date {end}"));
        }
        Ok((symbol.to_uppercase(), start, end))
    }
}

/// Exchange picker overlay: type to filter, j/k to move.
#[derive(Debug, Clone, Default)]
pub struct ExchangePicker {
    pub filter: String,
    pub cursor: usize,
}

impl ExchangePicker {
    pub fn matches(&self) -> Vec<&'static Exchange> {
        Exchange::search(&self.filter)
    }

    pub fn selected(&self) -> Option<&'static Exchange> {
        self.matches().get(self.cursor).copied()
    }
}

/// One entry in the chart panel's plot selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChartView {
    /// Line chart of one numeric column over time.
    Column(String),
    /// Share trade volume as bars.
    Volume,
    CloseVsAdjClose,
    CloseVsOpen,
}

impl ChartView {
    /// Every column except Volume and Adj Close, then volume and the comparisons.
    pub fn available(columns: &[String]) -> Vec<ChartView> {
        columns
            .iter()
            .filter(|c| c.as_str() != "Volume" && c.as_str() != "Adj Close")
            .map(|c| ChartView::Column(c.clone()))
            .chain([
                ChartView::Volume,
                ChartView::CloseVsAdjClose,
                ChartView::CloseVsOpen,
            ])
            .collect()
    }

    pub fn title(&self) -> String {
        match self {
            ChartView::Column(c) => match c.as_str() {
                "Close" => "Closing Stock Prices".into(),
                "Open" => "Opening Stock Prices".into(),
                other => format!("{other} over Time"),
            },
            ChartView::Volume => "Share Trade Volume".into(),
            ChartView::CloseVsAdjClose => "Close vs Adjusted Close".into(),
            ChartView::CloseVsOpen => "Close vs Open".into(),
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ChartView::Column(c) => match c.as_str() {
                "Close" => "The closing price of the stock at the end of the trading day.",
                "Open" => "The opening price of the stock at the beginning of the trading day.",
                _ => "",
            },
            ChartView::Volume => "The number of shares traded during the day.",
            ChartView::CloseVsAdjClose => {
                "Compares closing and adjusted closing prices. The gap between them shows \
                 the dividend payouts of the stock."
            }
            ChartView::CloseVsOpen => {
                "Compares closing and opening prices. This shows the daily price movement \
                 of the stock."
            }
        }
    }

    /// Columns drawn for this view, in legend order.
    pub fn series(&self) -> Vec<&str> {
        match self {
            ChartView::Column(c) => vec![c.as_str()],
            ChartView::Volume => vec!["Volume"],
            ChartView::CloseVsAdjClose => vec!["Close", "Adj Close"],
            ChartView::CloseVsOpen => vec!["Close", "Open"],
        }
    }
}

/// Which overlay (if any) is shown on top.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Overlay {
    None,
    Welcome,
    ErrorHistory,
    ExchangePicker,
}

/// Top-level application state.
pub struct AppState {
    pub active_panel: Panel,
    pub running: bool,

    pub query: QueryState,
    pub picker: ExchangePicker,
    pub report: Option<Report>,
    pub loading: bool,

    pub data_scroll: usize,
    pub metrics_scroll: usize,
    pub chart_index: usize,
    pub heatmap_scroll: usize,

    pub worker_tx: Sender<WorkerCommand>,
    pub worker_rx: Receiver<WorkerResponse>,

    pub status_message: Option<(String, StatusLevel)>,
    pub error_history: VecDeque<ErrorRecord>,
    pub error_scroll: usize,
    pub overlay: Overlay,

    pub export_dir: PathBuf,
}

impl AppState {
    pub fn new(
        worker_tx: Sender<WorkerCommand>,
        worker_rx: Receiver<WorkerResponse>,
        query: QueryState,
        export_dir: PathBuf,
    ) -> Self {
        Self {
            active_panel: Panel::Query,
            running: true,
            query,
            picker: ExchangePicker::default(),
            report: None,
            loading: false,
            data_scroll: 0,
            metrics_scroll: 0,
            chart_index: 0,
            heatmap_scroll: 0,
            worker_tx,
            worker_rx,
            status_message: None,
            error_history: VecDeque::with_capacity(50),
            error_scroll: 0,
            overlay: Overlay::None,
            export_dir,
        }
    }

    /// Push an error to the history, capping at 50.
    pub fn push_error(&mut self, category: ErrorCategory, message: String, context: String) {
        let record = ErrorRecord {
            timestamp: chrono::Local::now().naive_local(),
            category,
            message: message.clone(),
            context,
        };
        self.error_history.push_front(record);
        if self.error_history.len() > 50 {
            self.error_history.pop_back();
        }
        self.status_message = Some((message, StatusLevel::Error));
    }

    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Info));
    }

    pub fn set_warning(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Warning));
    }

    /// Plot choices for the current report (empty without one).
    pub fn chart_views(&self) -> Vec<ChartView> {
        self.report
            .as_ref()
            .map(|r| ChartView::available(&r.frame.numeric_columns()))
            .unwrap_or_default()
    }

    /// Install a finished report and reset per-report scroll positions.
    pub fn set_report(&mut self, report: Report) {
        self.data_scroll = 0;
        self.metrics_scroll = 0;
        self.chart_index = 0;
        self.heatmap_scroll = 0;
        self.report = Some(report);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> AppState {
        let (tx, _rx) = std::sync::mpsc::channel();
        let (_tx2, rx2) = std::sync::mpsc::channel();
        let d = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let query = QueryState::new(Exchange::find("NYSE").unwrap(), d, d);
        AppState::new(tx, rx2, query, PathBuf::from("."))
    }

    #[test]
    fn panel_cycle() {
        assert_eq!(Panel::Query.next(), Panel::Data);
        assert_eq!(Panel::Help.next(), Panel::Query);
        assert_eq!(Panel::Query.prev(), Panel::Help);
        assert_eq!(Panel::Data.prev(), Panel::Query);
    }

    #[test]
    fn panel_from_index() {
        for i in 0..6 {
            let p = Panel::from_index(i).unwrap();
            assert_eq!(p.index(), i);
        }
        assert!(Panel::from_index(6).is_none());
    }

    #[test]
    fn error_history_caps_at_50() {
        let mut app = app();
        for i in 0..60 {
            app.push_error(ErrorCategory::Other, format!("error {i}"), String::new());
        }
        assert_eq!(app.error_history.len(), 50);
        assert!(app.error_history[0].message.contains("59"));
    }

    #[test]
    fn query_validation() {
        let mut q = app().query;
        assert_eq!(q.validate().unwrap_err(), "Enter a ticker symbol");

        q.symbol = " aapl ".into();
        q.start = "2024-01-01".into();
        q.end = "2024-06-30".into();
        let (symbol, start, end) = q.validate().unwrap();
        assert_eq!(symbol, "AAPL");
        assert!(start < end);

        q.end = "30/06/2024".into();
        assert!(q.validate().unwrap_err().starts_with("End Date"));

        q.end = "2023-01-01".into();
        assert!(q.validate().unwrap_err().contains("after"));
    }

    #[test]
    fn exchange_field_has_no_text_buffer() {
        let mut q = app().query;
        q.cursor = 1;
        assert_eq!(q.field(), QueryField::Exchange);
        assert!(q.buffer_mut().is_none());
        q.cursor = 0;
        assert!(q.buffer_mut().is_some());
    }

    #[test]
    fn chart_views_skip_volume_and_adj_close_columns() {
        let columns: Vec<String> = ["Open", "High", "Low", "Close", "Adj Close", "Volume", "Return"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let views = ChartView::available(&columns);
        assert_eq!(views.len(), 5 + 3);
        assert_eq!(views[0], ChartView::Column("Open".into()));
        assert!(!views.contains(&ChartView::Column("Volume".into())));
        assert_eq!(views.last(), Some(&ChartView::CloseVsOpen));
        assert_eq!(ChartView::CloseVsAdjClose.series(), vec!["Close", "Adj Close"]);
    }

    #[test]
    fn picker_filters_exchanges() {
        let picker = ExchangePicker {
            filter: "toronto".into(),
            cursor: 0,
        };
        assert_eq!(picker.selected().unwrap().suffix, ".TO");
    }
}
