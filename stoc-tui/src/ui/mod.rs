//! Top-level UI layout — one panel at a time with a status bar.

pub mod chart_panel;
pub mod data_panel;
pub mod heatmap_panel;
pub mod help_panel;
pub mod metrics_panel;
pub mod overlays;
pub mod query_panel;
pub mod status_bar;

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::app::{AppState, Overlay, Panel};
use crate::theme;

/// Draw the entire UI.
pub fn draw(f: &mut Frame, app: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(f.area());

    let main_area = chunks[0];
    let status_area = chunks[1];

    draw_panel(f, main_area, app);
    status_bar::render(f, status_area, app);

    match &app.overlay {
        Overlay::Welcome => overlays::render_welcome(f, main_area),
        Overlay::ErrorHistory => overlays::render_error_history(f, main_area, app),
        Overlay::ExchangePicker => overlays::render_exchange_picker(f, main_area, app),
        Overlay::None => {}
    }
}

fn draw_panel(f: &mut Frame, area: Rect, app: &AppState) {
    let panel = app.active_panel;

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::panel_border(true))
        .title(format!(" {} [{}] ", panel.label(), panel.index() + 1))
        .title_style(theme::panel_title(true));

    let inner = block.inner(area);
    f.render_widget(block, area);

    match panel {
        Panel::Query => query_panel::render(f, inner, app),
        Panel::Data => data_panel::render(f, inner, app),
        Panel::Metrics => metrics_panel::render(f, inner, app),
        Panel::Chart => chart_panel::render(f, inner, app),
        Panel::Heatmap => heatmap_panel::render(f, inner, app),
        Panel::Help => help_panel::render(f, inner, app),
    }
}

/// Placeholder for panels that need a report.
pub fn render_no_report(f: &mut Frame, area: Rect, app: &AppState) {
    let msg = if app.loading {
        Span::styled("Fetching data...", theme::warning())
    } else {
        Span::styled(
            "No report yet. Fill in the Query panel (press 1) and press g to get data.",
            theme::muted(),
        )
    };
    f.render_widget(Paragraph::new(vec![Line::from(""), Line::from(msg)]), area);
}

/// Compute a centered rect for overlays.
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

/// Fixed-width numeric cell text; NaN renders blank.
pub fn cell_num(value: f64, decimals: usize) -> String {
    if value.is_nan() {
        String::new()
    } else {
        format!("{value:.decimals$}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_rect_is_inside() {
        let area = Rect::new(0, 0, 100, 50);
        let r = centered_rect(60, 40, area);
        assert_eq!(r.width, 60);
        assert_eq!(r.height, 20);
        assert!(r.x >= area.x && r.right() <= area.right());
    }

    #[test]
    fn cell_num_blanks_nan() {
        assert_eq!(cell_num(f64::NAN, 2), "");
        assert_eq!(cell_num(1.005, 1), "1.0");
    }
}
