//! Panel 1 — Query: ticker, exchange, start and end dates, "get data".

use ratatui::layout::Rect;
use ratatui::style::Modifier;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::app::{AppState, QueryField};
use crate::theme;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let q = &app.query;
    let mut lines: Vec<Line> = vec![
        Line::from(Span::styled("Welcome to STOC!", theme::accent_bold())),
        Line::from(Span::styled(
            "STOC is your one-stop solution to all your investing questions!",
            theme::muted(),
        )),
        Line::from(""),
    ];

    for (i, field) in QueryField::ALL.iter().enumerate() {
        let focused = i == q.cursor;
        let value = match field {
            QueryField::Symbol => q.symbol.clone(),
            QueryField::Exchange => format!(
                "{}  ({})",
                q.exchange.name,
                if q.exchange.suffix.is_empty() { "no suffix" } else { q.exchange.suffix }
            ),
            QueryField::Start => q.start.clone(),
            QueryField::End => q.end.clone(),
        };
        let value_style = if focused && q.editing {
            theme::warning().add_modifier(Modifier::BOLD)
        } else if focused {
            theme::accent().add_modifier(Modifier::REVERSED)
        } else {
            theme::accent()
        };

        let mut spans = vec![
            Span::styled(format!("  {:>14}: ", field.label()), theme::muted()),
            Span::styled(value, value_style),
        ];
        if focused && q.editing {
            spans.push(Span::styled("_", theme::warning()));
        }
        lines.push(Line::from(spans));
    }

    lines.push(Line::from(""));
    if let Ok((symbol, _, _)) = q.validate() {
        lines.push(Line::from(vec![
            Span::styled("  Provider ticker: ", theme::muted()),
            Span::styled(q.exchange.ticker(&symbol), theme::neutral()),
            Span::styled("   Benchmark: ", theme::muted()),
            Span::styled(q.exchange.benchmark(), theme::neutral()),
        ]));
        lines.push(Line::from(""));
    }

    let action = if app.loading {
        Span::styled("  Fetching data...", theme::warning())
    } else {
        Span::styled("  [g] Get Data", theme::accent_bold())
    };
    lines.push(Line::from(action));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "  [j/k] move  [Enter] edit / pick exchange  [Esc] stop editing  [x] export CSV",
        theme::muted(),
    )));

    if let Some(report) = &app.report {
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled("  Last report: ", theme::muted()),
            Span::styled(report.ticker.as_str(), theme::accent()),
            Span::styled(
                format!(
                    "  {} rows, {} to {}, source {}",
                    report.frame.len(),
                    report.request.start,
                    report.request.end,
                    report.source
                ),
                theme::muted(),
            ),
        ]));
    }

    f.render_widget(Paragraph::new(lines), area);
}
