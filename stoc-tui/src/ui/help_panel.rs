//! Panel 6 — Help: keyboard shortcuts.

use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::app::AppState;
use crate::theme;

pub fn render(f: &mut Frame, area: Rect, _app: &AppState) {
    let mut lines: Vec<Line> = Vec::new();

    section(&mut lines, "Global");
    key(&mut lines, "1-6", "Switch to panel by number");
    key(&mut lines, "Tab / Shift+Tab", "Cycle panels forward / back");
    key(&mut lines, "g", "Get data: build the report for the current query");
    key(&mut lines, "x", "Export the decorated frame as CSV");
    key(&mut lines, "e", "Open error history overlay");
    key(&mut lines, "q", "Quit");
    lines.push(Line::from(""));

    section(&mut lines, "Panel 1 - Query");
    key(&mut lines, "j / k", "Move between fields");
    key(&mut lines, "Enter / i", "Edit the field, or open the exchange picker");
    key(&mut lines, "Esc / Enter", "Stop editing");
    lines.push(Line::from(""));

    section(&mut lines, "Exchange picker");
    key(&mut lines, "type", "Filter exchanges by name");
    key(&mut lines, "Up / Down", "Move selection");
    key(&mut lines, "Enter / Esc", "Choose / cancel");
    lines.push(Line::from(""));

    section(&mut lines, "Panels 2, 3, 5 - Data, Metrics, Heatmap");
    key(&mut lines, "j / k", "Scroll one row");
    key(&mut lines, "PgDn / PgUp", "Scroll twenty rows");
    key(&mut lines, "Home", "Back to the top");
    lines.push(Line::from(""));

    section(&mut lines, "Panel 4 - Chart");
    key(&mut lines, "h / l", "Previous / next plot");
    lines.push(Line::from(""));

    section(&mut lines, "Scoring");
    key(&mut lines, "Return", "Mean daily return x 100, weight 0.3");
    key(&mut lines, "Volatility", "Mean rolling volatility x 100, weight 0.2");
    key(&mut lines, "Market Cap", "Market capitalisation in billions, weight 0.3");
    key(&mut lines, "National Avg", "Benchmark mean daily return x 100, weight 0.2");
    key(&mut lines, "Assessment", "Return % / Volatility %");

    f.render_widget(Paragraph::new(lines), area);
}

fn section<'a>(lines: &mut Vec<Line<'a>>, title: &str) {
    lines.push(Line::from(Span::styled(title.to_string(), theme::accent_bold())));
}

fn key<'a>(lines: &mut Vec<Line<'a>>, keys: &str, desc: &str) {
    lines.push(Line::from(vec![
        Span::styled(format!("  {:>16}  ", keys), theme::accent()),
        Span::styled(desc.to_string(), theme::muted()),
    ]));
}
