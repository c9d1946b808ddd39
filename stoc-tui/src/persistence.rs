//! App state persistence — the last query survives restarts.

use std::path::Path;

use serde::{Deserialize, Serialize};
use stoc_core::domain::Exchange;

use crate::app::{AppState, Overlay, Panel};

/// Serializable subset of app state that persists across restarts.
#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistedState {
    pub symbol: String,
    pub exchange: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub active_panel: Panel,
    pub welcome_dismissed: bool,
}

impl Default for PersistedState {
    fn default() -> Self {
        Self {
            symbol: String::new(),
            exchange: None,
            start: None,
            end: None,
            active_panel: Panel::Query,
            welcome_dismissed: false,
        }
    }
}

/// Load persisted state from disk. Returns defaults if file is missing or corrupt.
pub fn load(path: &Path) -> PersistedState {
    match std::fs::read_to_string(path) {
        Ok(content) => serde_json::from_str(&content).unwrap_or_default(),
        Err(_) => PersistedState::default(),
    }
}

/// Save persisted state to disk. Creates parent directories if needed.
pub fn save(path: &Path, state: &PersistedState) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(state)?;
    std::fs::write(path, json)?;
    Ok(())
}

pub fn extract(app: &AppState) -> PersistedState {
    PersistedState {
        symbol: app.query.symbol.clone(),
        exchange: Some(app.query.exchange.name.to_string()),
        start: Some(app.query.start.clone()),
        end: Some(app.query.end.clone()),
        active_panel: app.active_panel,
        welcome_dismissed: app.overlay != Overlay::Welcome,
    }
}

/// Apply persisted state. An exchange that no longer exists keeps the current one.
pub fn apply(app: &mut AppState, state: PersistedState) {
    app.query.symbol = state.symbol;
    if let Some(exchange) = state.exchange.as_deref().and_then(|n| Exchange::find(n).ok()) {
        app.query.exchange = exchange;
    }
    if let Some(start) = state.start {
        app.query.start = start;
    }
    if let Some(end) = state.end {
        app.query.end = end;
    }
    app.active_panel = state.active_panel;
    if !state.welcome_dismissed {
        app.overlay = Overlay::Welcome;
    }
}
