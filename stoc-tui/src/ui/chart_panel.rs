//! Panel 4 — Chart: one plot at a time, cycled with h/l.
//!
//! Price and derived columns draw as lines, volume as bars, and the two
//! comparison plots overlay a pair of columns.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::symbols;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Axis, Chart, Dataset, GraphType, Paragraph, Wrap};
use ratatui::Frame;

use stoc_core::domain::PriceFrame;

use crate::app::{AppState, ChartView};
use crate::theme;
use crate::ui::render_no_report;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let Some(report) = &app.report else {
        render_no_report(f, area, app);
        return;
    };
    let views = app.chart_views();
    let Some(view) = views.get(app.chart_index.min(views.len().saturating_sub(1))) else {
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(5)])
        .split(area);

    let header = vec![
        Line::from(vec![
            Span::styled(view.title(), theme::accent_bold()),
            Span::styled(
                format!("  [{}/{}]  [h/l] change plot", app.chart_index + 1, views.len()),
                theme::muted(),
            ),
        ]),
        Line::from(Span::styled(view.description(), theme::muted())),
    ];
    f.render_widget(Paragraph::new(header).wrap(Wrap { trim: true }), chunks[0]);

    render_chart(f, chunks[1], &report.frame, view);
}

/// `(index, value)` points with NaN dropped.
pub fn points(values: &[f64]) -> Vec<(f64, f64)> {
    values
        .iter()
        .enumerate()
        .filter(|(_, v)| v.is_finite())
        .map(|(i, &v)| (i as f64, v))
        .collect()
}

/// Padded y bounds over every series; `None` when nothing is finite.
pub fn y_bounds(series: &[Vec<(f64, f64)>], from_zero: bool) -> Option<[f64; 2]> {
    let ys = series.iter().flatten().map(|&(_, y)| y);
    let (min, max) = ys.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), y| {
        (lo.min(y), hi.max(y))
    });
    if !min.is_finite() {
        return None;
    }
    let min = if from_zero { min.min(0.0) } else { min };
    let padding = ((max - min).abs() * 0.05).max(1e-9);
    Some([min - padding, max + padding])
}

fn render_chart(f: &mut Frame, area: Rect, frame: &PriceFrame, view: &ChartView) {
    let names = view.series();
    let series: Vec<Vec<(f64, f64)>> = names
        .iter()
        .map(|n| points(&frame.column(n).unwrap_or_default()))
        .collect();

    let is_volume = matches!(view, ChartView::Volume);
    let Some([y_min, y_max]) = y_bounds(&series, is_volume) else {
        f.render_widget(
            Paragraph::new(Span::styled("No finite values to plot.", theme::muted())),
            area,
        );
        return;
    };

    let datasets: Vec<Dataset> = names
        .iter()
        .zip(&series)
        .zip(theme::SERIES.iter().cycle())
        .map(|((name, data), color)| {
            Dataset::default()
                .name(name.to_string())
                .marker(if is_volume {
                    symbols::Marker::HalfBlock
                } else {
                    symbols::Marker::Braille
                })
                .style(Style::default().fg(*color))
                .graph_type(if is_volume { GraphType::Bar } else { GraphType::Line })
                .data(data)
        })
        .collect();

    let x_max = frame.len().saturating_sub(1) as f64;
    let date_label = |i: usize| {
        frame
            .bars
            .get(i)
            .map(|b| b.date.to_string())
            .unwrap_or_default()
    };
    let x_labels = vec![
        Span::styled(date_label(0), theme::muted()),
        Span::styled(date_label(frame.len() / 2), theme::muted()),
        Span::styled(date_label(frame.len().saturating_sub(1)), theme::muted()),
    ];

    let chart = Chart::new(datasets)
        .x_axis(
            Axis::default()
                .title(Span::styled("Date", theme::muted()))
                .style(theme::muted())
                .bounds([0.0, x_max.max(1.0)])
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .title(Span::styled(names.join(" / "), theme::muted()))
                .style(theme::muted())
                .bounds([y_min, y_max])
                .labels(vec![
                    Span::styled(format_axis(y_min), theme::muted()),
                    Span::styled(format_axis((y_min + y_max) / 2.0), theme::muted()),
                    Span::styled(format_axis(y_max), theme::muted()),
                ]),
        );

    f.render_widget(chart, area);
}

fn format_axis(v: f64) -> String {
    let a = v.abs();
    if a >= 1e9 {
        format!("{:.1}B", v / 1e9)
    } else if a >= 1e6 {
        format!("{:.1}M", v / 1e6)
    } else if a >= 100.0 {
        format!("{v:.0}")
    } else {
        format!("{v:.3}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn points_skip_nan() {
        let p = points(&[f64::NAN, 1.0, f64::INFINITY, 2.0]);
        assert_eq!(p, vec![(1.0, 1.0), (3.0, 2.0)]);
    }

    #[test]
    fn bounds_are_padded() {
        let [lo, hi] = y_bounds(&[vec![(0.0, 10.0), (1.0, 20.0)]], false).unwrap();
        assert!(lo < 10.0 && hi > 20.0);
    }

    #[test]
    fn volume_bounds_start_at_zero() {
        let [lo, _] = y_bounds(&[vec![(0.0, 500.0), (1.0, 900.0)]], true).unwrap();
        assert!(lo <= 0.0);
    }

    #[test]
    fn empty_series_has_no_bounds() {
        assert!(y_bounds(&[vec![]], false).is_none());
    }

    #[test]
    fn axis_labels_are_compact() {
        assert_eq!(format_axis(2_500_000.0), "2.5M");
        assert_eq!(format_axis(3.2e12), "3200.0B");
        assert_eq!(format_axis(0.01234), "0.012");
    }
}
