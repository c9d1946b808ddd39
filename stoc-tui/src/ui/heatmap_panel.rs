//! Panel 5 — Heatmap: the correlation matrix with two-decimal annotations
//! on a diverging -1 … 1 colour scale.

use ratatui::layout::{Constraint, Rect};
use ratatui::style::Style;
use ratatui::widgets::{Cell, Row, Table};
use ratatui::Frame;

use crate::app::AppState;
use crate::theme;
use crate::ui::render_no_report;

const LABEL_WIDTH: u16 = 16;
const CELL_WIDTH: u16 = 7;

/// Column headers are truncated to fit a cell.
pub fn short_label(name: &str, width: usize) -> String {
    name.chars().take(width).collect()
}

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let Some(report) = &app.report else {
        render_no_report(f, area, app);
        return;
    };
    let m = &report.correlation;
    if m.is_empty() {
        render_no_report(f, area, app);
        return;
    }

    let header = Row::new(
        std::iter::once(Cell::from("Correlation").style(theme::neutral())).chain(
            m.columns
                .iter()
                .map(|c| Cell::from(short_label(c, CELL_WIDTH as usize)).style(theme::accent())),
        ),
    );

    let visible = area.height.saturating_sub(1) as usize;
    let start = app.heatmap_scroll.min(m.len().saturating_sub(1));
    let end = (start + visible).min(m.len());

    let rows = (start..end).map(|i| {
        let label = Cell::from(short_label(&m.columns[i], LABEL_WIDTH as usize)).style(theme::accent());
        let cells = m.values[i].iter().map(|&v| {
            let text = if v.is_nan() { " n/a".to_string() } else { format!("{v:>6.2}") };
            Cell::from(text).style(Style::default().bg(theme::heat_color(v)).fg(theme::heat_text(v)))
        });
        Row::new(std::iter::once(label).chain(cells))
    });

    let widths: Vec<Constraint> = std::iter::once(Constraint::Length(LABEL_WIDTH))
        .chain(std::iter::repeat(Constraint::Length(CELL_WIDTH)).take(m.len()))
        .collect();

    let table = Table::new(rows, widths).header(header).column_spacing(0);
    f.render_widget(table, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_truncate_on_char_boundaries() {
        assert_eq!(short_label("Compounded Daily Growth Rate", 7), "Compoun");
        assert_eq!(short_label("Low", 7), "Low");
    }
}
