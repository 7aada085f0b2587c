//! CLI command implementations

pub mod account;
pub mod build;
pub mod schema;
pub mod submit;

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use strategy_builder::client::{Session, SqliteTokenStore, StrategyApiClient};
use strategy_builder::{DraftStore, EditCommand, Settings};
use tracing::{debug, info};

/// Read an edit script: a JSON array of edit commands
pub fn load_script(path: &Path) -> Result<Vec<EditCommand>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read edit script {}", path.display()))?;
    let commands: Vec<EditCommand> =
        serde_json::from_str(&contents).context("Failed to parse edit script JSON")?;
    info!("Loaded {} edit commands from {}", commands.len(), path.display());
    Ok(commands)
}

/// Apply a script to a fresh draft, stopping at the first rejected edit
pub fn build_draft(commands: &[EditCommand]) -> Result<DraftStore> {
    let mut store = DraftStore::new();
    for (i, command) in commands.iter().enumerate() {
        debug!("Applying edit #{}: {:?}", i + 1, command);
        command
            .apply(&mut store)
            .with_context(|| format!("Edit #{} rejected", i + 1))?;
    }
    Ok(store)
}

pub fn open_session(settings: &Settings) -> Result<Session> {
    let tokens = SqliteTokenStore::open(&settings.token_db).context("Failed to open token store")?;
    let client = StrategyApiClient::with_config(settings.client_config())?;
    Ok(Session::new(client, Arc::new(tokens)))
}
