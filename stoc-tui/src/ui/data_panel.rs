//! Panel 2 — Data: the decorated frame as a scrollable table.

use ratatui::layout::{Constraint, Rect};
use ratatui::widgets::{Cell, Row, Table};
use ratatui::Frame;

use crate::app::AppState;
use crate::theme;
use crate::ui::{cell_num, render_no_report};

const COLUMN_WIDTH: u16 = 12;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let Some(report) = &app.report else {
        render_no_report(f, area, app);
        return;
    };
    let frame = &report.frame;
    let names = frame.column_names();

    let header = Row::new(names.iter().map(|n| Cell::from(n.clone()).style(theme::accent_bold())));

    let visible = area.height.saturating_sub(1) as usize;
    let start = app.data_scroll.min(frame.len().saturating_sub(1));
    let end = (start + visible).min(frame.len());

    let rows = (start..end).map(|i| {
        let bar = &frame.bars[i];
        let mut cells = vec![
            Cell::from(bar.date.to_string()).style(theme::muted()),
            Cell::from(cell_num(bar.open, 2)),
            Cell::from(cell_num(bar.high, 2)),
            Cell::from(cell_num(bar.low, 2)),
            Cell::from(cell_num(bar.close, 2)),
            Cell::from(cell_num(bar.adj_close, 2)),
            Cell::from(bar.volume.to_string()),
        ];
        cells.extend(frame.derived().iter().map(|d| {
            let v = d.values[i];
            Cell::from(cell_num(v, 4)).style(theme::metric_color(v))
        }));
        Row::new(cells)
    });

    let widths = vec![Constraint::Length(COLUMN_WIDTH); names.len()];
    let table = Table::new(rows, widths).header(header).column_spacing(1);
    f.render_widget(table, area);
}
