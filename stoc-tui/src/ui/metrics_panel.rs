//! Panel 3 — Metrics: score card, the nine calculation steps, assessment.

use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Wrap};
use ratatui::Frame;

use stoc_report::explain::fmt_num;
use stoc_report::{summary_lines, ScoreComponent};

use crate::app::AppState;
use crate::theme;
use crate::ui::render_no_report;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let Some(report) = &app.report else {
        render_no_report(f, area, app);
        return;
    };
    let card = &report.score;
    let mut lines: Vec<Line> = Vec::new();

    lines.push(Line::from(vec![
        Span::styled(format!("{} ", report.ticker), theme::accent_bold()),
        Span::styled(
            format!(
                "{}  {} to {}",
                report.request.exchange.name, report.request.start, report.request.end
            ),
            theme::muted(),
        ),
    ]));
    if report.is_synthetic() {
        lines.push(Line::from(Span::styled(
            "SYNTHETIC DATA: not market prices",
            theme::warning(),
        )));
    }
    lines.push(Line::from(""));

    lines.push(Line::from(Span::styled(
        format!("  {:<26}{:>14}{:>8}{:>14}", "Metric", "Score", "Weight", "Weighted"),
        theme::neutral(),
    )));
    component(&mut lines, "Return (%)", &card.ret);
    component(&mut lines, "Volatility (%)", &card.volatility);
    component(&mut lines, "Market Cap (bn)", &card.market_cap);
    component(&mut lines, "National Avg Return (%)", &card.benchmark);
    lines.push(Line::from(vec![
        Span::styled(format!("  {:<48}", "Overall Score"), theme::accent_bold()),
        Span::styled(
            format!("{:>14}", fmt_num(card.overall, 4)),
            theme::metric_color(card.overall),
        ),
    ]));
    if let Some(class) = card.size_class {
        lines.push(Line::from(Span::styled(
            format!("  {} (benchmark {})", class.label(), report.benchmark_ticker),
            theme::muted(),
        )));
    }
    if let Some(vix) = card.mean_vix {
        lines.push(Line::from(Span::styled(
            format!("  Mean VIX over the period: {vix:.2}"),
            theme::muted(),
        )));
    }
    lines.push(Line::from(""));

    lines.push(Line::from(Span::styled("Calculating scores:", theme::accent_bold())));
    for step in &report.steps {
        lines.push(Line::from(Span::styled(
            format!("{}. {}:", step.number, step.title),
            theme::neutral(),
        )));
        if !step.formula.is_empty() {
            lines.push(Line::from(Span::styled(
                format!("   {}", step.formula),
                theme::muted(),
            )));
        }
        lines.push(Line::from(Span::styled(format!("   {}", step.value), theme::accent())));
    }
    lines.push(Line::from(""));

    lines.push(Line::from(Span::styled(
        "Assessment Score and Metrics:",
        theme::accent_bold(),
    )));
    for line in summary_lines(card) {
        lines.push(Line::from(Span::styled(format!("  {line}"), theme::accent())));
    }

    if !report.warnings.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("Data warnings:", theme::warning())));
        for w in &report.warnings {
            lines.push(Line::from(Span::styled(format!("  - {w}"), theme::muted())));
        }
    }

    let para = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((app.metrics_scroll.min(u16::MAX as usize) as u16, 0));
    f.render_widget(para, area);
}

fn component<'a>(lines: &mut Vec<Line<'a>>, label: &str, c: &ScoreComponent) {
    lines.push(Line::from(vec![
        Span::styled(format!("  {label:<26}"), theme::muted()),
        Span::styled(format!("{:>14}", fmt_num(c.score, 4)), theme::metric_color(c.score)),
        Span::styled(format!("{:>8}", fmt_num(c.weight, 2)), theme::muted()),
        Span::styled(
            format!("{:>14}", fmt_num(c.weighted, 4)),
            theme::metric_color(c.weighted),
        ),
    ]));
}
