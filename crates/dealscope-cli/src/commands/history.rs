use anyhow::{Context, Result};
use colored::Colorize;
use dealscope_core::{build_view, HistoryPage, HistoryRecord, HistoryView, TimeFilter};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use super::{calendar, confirm, print_json};
use crate::auth::{self, authenticated_client};
use crate::settings::Settings;
use crate::{block_on, render, spinner};

/// A saved `/api/history` response, or a bare list of records.
#[derive(Deserialize)]
#[serde(untagged)]
enum SavedHistory {
    Records(Vec<HistoryRecord>),
    Page(HistoryPage),
}

impl SavedHistory {
    fn into_records(self) -> Vec<HistoryRecord> {
        match self {
            SavedHistory::Records(records) => records,
            SavedHistory::Page(page) => page.items,
        }
    }
}

#[derive(Serialize)]
struct HistoryJson<'a> {
    filter: TimeFilter,
    total: usize,
    view: &'a HistoryView<HistoryRecord>,
}

fn read_saved(path: &Path) -> Result<Vec<HistoryRecord>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let saved: SavedHistory = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse history file {}", path.display()))?;
    Ok(saved.into_records())
}

fn fetch(settings: &Settings, filter: TimeFilter, no_spinner: bool) -> Result<Vec<HistoryRecord>> {
    let client = authenticated_client(settings)?;
    let result = spinner::run("Loading viewing history...", no_spinner, || {
        block_on(client.history(filter))
    })?;
    Ok(result.map_err(auth::explain)?.items)
}

pub fn show(
    settings: &Settings,
    filter: Option<TimeFilter>,
    json: bool,
    input: Option<&Path>,
    no_spinner: bool,
) -> Result<()> {
    let filter = filter.unwrap_or(settings.default_filter);
    let records = match input {
        Some(path) => read_saved(path)?,
        None => fetch(settings, filter, no_spinner)?,
    };
    tracing::debug!(filter = filter.as_str(), records = records.len(), "building history view");

    let calendar = calendar()?;
    let view = build_view(filter, records, &calendar);

    if json {
        return print_json(&HistoryJson {
            filter,
            total: view.total(),
            view: &view,
        });
    }

    println!("\n{}\n", render::history_text(filter, &view, &calendar));
    Ok(())
}

pub fn delete(settings: &Settings, id: &str, no_spinner: bool) -> Result<()> {
    let client = authenticated_client(settings)?;
    let result = spinner::run("Removing from history...", no_spinner, || {
        block_on(client.delete_history_item(id))
    })?;
    result.map_err(auth::explain)?;

    println!("\n  {}\n", format!("Removed {} from your history.", id.bold()).green());
    Ok(())
}

pub fn clear(settings: &Settings, yes: bool, no_spinner: bool) -> Result<()> {
    let client = authenticated_client(settings)?;
    if !yes && !confirm("Clear your entire viewing history?")? {
        println!("{}", "  Cancelled.\n".bright_black());
        return Ok(());
    }

    let result = spinner::run("Clearing history...", no_spinner, || {
        block_on(client.clear_history())
    })?;
    result.map_err(auth::explain)?;

    println!("\n  {}\n", "Viewing history cleared.".green());
    Ok(())
}
