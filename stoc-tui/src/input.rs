//! Keyboard input dispatch — text editing → overlays → global keys → panel handlers.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use stoc_report::{save_csv, ExportMode, ReportRequest};

use crate::app::{AppState, ErrorCategory, Overlay, Panel, QueryField};
use crate::worker::WorkerCommand;

pub fn handle_key(app: &mut AppState, key: KeyEvent) {
    // Only handle key press events (Windows sends both Press and Release).
    if key.kind != KeyEventKind::Press {
        return;
    }

    // 1. A focused text field swallows everything.
    if app.query.editing {
        handle_text_edit(app, key);
        return;
    }

    // 2. Overlays consume input next.
    match &app.overlay {
        Overlay::Welcome => {
            app.overlay = Overlay::None;
            return;
        }
        Overlay::ErrorHistory => {
            handle_error_overlay(app, key);
            return;
        }
        Overlay::ExchangePicker => {
            handle_picker_overlay(app, key);
            return;
        }
        Overlay::None => {}
    }

    // 3. Global keys.
    match key.code {
        KeyCode::Char('q') => {
            app.running = false;
            return;
        }
        KeyCode::Char(c @ '1'..='6') => {
            if let Some(panel) = Panel::from_index(c as usize - '1' as usize) {
                app.active_panel = panel;
            }
            return;
        }
        KeyCode::Tab => {
            if key.modifiers.contains(KeyModifiers::SHIFT) {
                app.active_panel = app.active_panel.prev();
            } else {
                app.active_panel = app.active_panel.next();
            }
            return;
        }
        KeyCode::BackTab => {
            app.active_panel = app.active_panel.prev();
            return;
        }
        KeyCode::Char('g') => {
            submit_query(app);
            return;
        }
        KeyCode::Char('x') => {
            export_csv(app);
            return;
        }
        KeyCode::Char('e') => {
            app.overlay = Overlay::ErrorHistory;
            app.error_scroll = 0;
            return;
        }
        _ => {}
    }

    // 4. Panel-specific keys.
    match app.active_panel {
        Panel::Query => handle_query_key(app, key),
        Panel::Data => {
            let rows = app.report.as_ref().map(|r| r.frame.len()).unwrap_or(0);
            scroll(&mut app.data_scroll, rows, key);
        }
        Panel::Metrics => {
            let rows = app.report.as_ref().map(|r| r.steps.len() * 3).unwrap_or(0);
            scroll(&mut app.metrics_scroll, rows, key);
        }
        Panel::Chart => handle_chart_key(app, key),
        Panel::Heatmap => {
            let rows = app.report.as_ref().map(|r| r.correlation.len()).unwrap_or(0);
            scroll(&mut app.heatmap_scroll, rows, key);
        }
        Panel::Help => {}
    }
}

fn scroll(offset: &mut usize, rows: usize, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            if *offset + 1 < rows {
                *offset += 1;
            }
        }
        KeyCode::Char('k') | KeyCode::Up => *offset = offset.saturating_sub(1),
        KeyCode::PageDown => *offset = (*offset + 20).min(rows.saturating_sub(1)),
        KeyCode::PageUp => *offset = offset.saturating_sub(20),
        KeyCode::Home => *offset = 0,
        _ => {}
    }
}

fn handle_text_edit(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Enter | KeyCode::Esc => app.query.editing = false,
        KeyCode::Backspace => {
            if let Some(buf) = app.query.buffer_mut() {
                buf.pop();
            }
        }
        KeyCode::Char(c) => {
            if let Some(buf) = app.query.buffer_mut() {
                buf.push(c);
            }
        }
        _ => {}
    }
}

fn handle_error_overlay(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('e') => {
            app.overlay = Overlay::None;
        }
        KeyCode::Char('j') | KeyCode::Down => {
            if app.error_scroll + 1 < app.error_history.len() {
                app.error_scroll += 1;
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.error_scroll = app.error_scroll.saturating_sub(1);
        }
        _ => {}
    }
}

fn handle_picker_overlay(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.overlay = Overlay::None;
        }
        KeyCode::Enter => {
            if let Some(exchange) = app.picker.selected() {
                app.query.exchange = exchange;
                app.set_status(format!("Exchange: {}", exchange.name));
            }
            app.overlay = Overlay::None;
        }
        KeyCode::Down => {
            if app.picker.cursor + 1 < app.picker.matches().len() {
                app.picker.cursor += 1;
            }
        }
        KeyCode::Up => {
            app.picker.cursor = app.picker.cursor.saturating_sub(1);
        }
        KeyCode::Backspace => {
            app.picker.filter.pop();
            app.picker.cursor = 0;
        }
        KeyCode::Char(c) => {
            app.picker.filter.push(c);
            app.picker.cursor = 0;
        }
        _ => {}
    }
}

fn handle_query_key(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            if app.query.cursor + 1 < QueryField::ALL.len() {
                app.query.cursor += 1;
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.query.cursor = app.query.cursor.saturating_sub(1);
        }
        KeyCode::Enter | KeyCode::Char('i') => match app.query.field() {
            QueryField::Exchange => {
                app.picker.filter.clear();
                app.picker.cursor = app.query.exchange.index();
                app.overlay = Overlay::ExchangePicker;
            }
            _ => app.query.editing = true,
        },
        _ => {}
    }
}

fn handle_chart_key(app: &mut AppState, key: KeyEvent) {
    let count = app.chart_views().len();
    if count == 0 {
        return;
    }
    match key.code {
        KeyCode::Char('l') | KeyCode::Right | KeyCode::Char('j') | KeyCode::Down => {
            app.chart_index = (app.chart_index + 1) % count;
        }
        KeyCode::Char('h') | KeyCode::Left | KeyCode::Char('k') | KeyCode::Up => {
            app.chart_index = (app.chart_index + count - 1) % count;
        }
        _ => {}
    }
}

/// "Get Data": validate the query and hand it to the worker.
fn submit_query(app: &mut AppState) {
    if app.loading {
        app.set_warning("A report is already being built");
        return;
    }
    let (symbol, start, end) = match app.query.validate() {
        Ok(v) => v,
        Err(msg) => {
            app.push_error(ErrorCategory::Input, msg, "query".into());
            return;
        }
    };
    let exchange = app.query.exchange;
    let request = ReportRequest::new(symbol.clone(), exchange, start, end);
    if app
        .worker_tx
        .send(WorkerCommand::BuildReport { request })
        .is_err()
    {
        app.push_error(ErrorCategory::Other, "Worker is not running".into(), symbol);
        return;
    }
    app.loading = true;
    app.set_status(format!(
        "Fetching data for {symbol} from {} between {start} and {end}",
        exchange.name
    ));
}

fn export_csv(app: &mut AppState) {
    let Some(report) = &app.report else {
        app.set_warning("Nothing to export yet: press g to get data");
        return;
    };
    let result = save_csv(
        &report.frame,
        &app.export_dir,
        report.request.start,
        report.request.end,
        ExportMode::Overwrite,
    );
    match result {
        Ok(path) => app.set_status(format!("Saved {}", path.display())),
        Err(e) => {
            let ticker = report.ticker.clone();
            app.push_error(ErrorCategory::Export, format!("{e:#}"), ticker);
        }
    }
}
