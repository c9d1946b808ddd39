//! Overlay widgets — welcome, error history, exchange picker.

use ratatui::layout::Rect;
use ratatui::style::Modifier;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use crate::app::AppState;
use crate::theme;
use crate::ui::centered_rect;

/// First-run welcome overlay.
pub fn render_welcome(f: &mut Frame, area: Rect) {
    let popup = centered_rect(60, 40, area);
    f.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::accent())
        .title(" Welcome to STOC ")
        .title_style(theme::accent_bold());

    let text = vec![
        Line::from(""),
        Line::from(Span::styled("Getting started:", theme::accent_bold())),
        Line::from(""),
        Line::from(Span::styled(
            "  1. Enter a ticker symbol in the Query panel",
            theme::muted(),
        )),
        Line::from(Span::styled(
            "  2. Pick an exchange and a date range",
            theme::muted(),
        )),
        Line::from(Span::styled("  3. Press g to get data", theme::muted())),
        Line::from(Span::styled(
            "  4. Browse Data, Metrics, Chart and Heatmap with 2-5",
            theme::muted(),
        )),
        Line::from(""),
        Line::from(Span::styled("Press any key to dismiss...", theme::neutral())),
    ];

    let para = Paragraph::new(text).block(block).wrap(Wrap { trim: true });
    f.render_widget(para, popup);
}

/// Error history overlay.
pub fn render_error_history(f: &mut Frame, area: Rect, app: &AppState) {
    let popup = centered_rect(80, 70, area);
    f.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::negative())
        .title(format!(
            " Error History ({}) [Esc]close [j/k]scroll ",
            app.error_history.len()
        ))
        .title_style(theme::negative());

    let inner = block.inner(popup);
    f.render_widget(block, popup);

    if app.error_history.is_empty() {
        let text = Paragraph::new(Span::styled("No errors recorded.", theme::muted()));
        f.render_widget(text, inner);
        return;
    }

    let visible_height = inner.height as usize;
    let start = app.error_scroll;
    let end = (start + visible_height).min(app.error_history.len());

    let mut lines: Vec<Line> = Vec::new();
    for (i, err) in app.error_history.iter().enumerate().take(end).skip(start) {
        let style = if i == app.error_scroll {
            theme::negative().add_modifier(Modifier::BOLD)
        } else {
            theme::muted()
        };

        lines.push(Line::from(vec![
            Span::styled(
                format!("[{}] ", err.timestamp.format("%H:%M:%S")),
                theme::muted(),
            ),
            Span::styled(format!("[{}] ", err.category.label()), theme::warning()),
            Span::styled(err.message.as_str(), style),
        ]));

        if !err.context.is_empty() {
            lines.push(Line::from(vec![
                Span::raw("  "),
                Span::styled(err.context.as_str(), theme::muted()),
            ]));
        }
    }

    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

/// Exchange picker: filter line plus the matching exchanges.
pub fn render_exchange_picker(f: &mut Frame, area: Rect, app: &AppState) {
    let popup = centered_rect(60, 70, area);
    f.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::accent())
        .title(" Select Exchange [Enter]choose [Esc]cancel ")
        .title_style(theme::accent_bold());

    let inner = block.inner(popup);
    f.render_widget(block, popup);

    let matches = app.picker.matches();
    let mut lines = vec![
        Line::from(vec![
            Span::styled("> ", theme::accent()),
            Span::styled(app.picker.filter.as_str(), theme::accent_bold()),
            Span::styled("_", theme::accent()),
        ]),
        Line::from(""),
    ];

    if matches.is_empty() {
        lines.push(Line::from(Span::styled("No exchange matches.", theme::muted())));
    }

    let visible = inner.height.saturating_sub(2) as usize;
    let first = app.picker.cursor.saturating_sub(visible.saturating_sub(1));
    for (i, exchange) in matches.iter().enumerate().skip(first).take(visible) {
        let style = if i == app.picker.cursor {
            theme::accent().add_modifier(Modifier::REVERSED)
        } else {
            theme::muted()
        };
        lines.push(Line::from(vec![
            Span::styled(format!("{:<44}", exchange.name), style),
            Span::styled(format!(" {:<6}", exchange.suffix), theme::neutral()),
            Span::styled(format!(" {}", exchange.benchmark()), theme::muted()),
        ]));
    }

    f.render_widget(Paragraph::new(lines), inner);
}
