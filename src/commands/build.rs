//! Build command: run an edit script and print the cleaned payload

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;
use strategy_builder::clean_for_submission;
use strategy_builder::submission::lint;
use tracing::{info, warn};

use super::{build_draft, load_script};

pub fn run(script: PathBuf, out: Option<PathBuf>, raw: bool) -> Result<()> {
    let commands = load_script(&script)?;
    let store = build_draft(&commands)?;
    let draft = store.draft();
    info!(
        "Draft '{}' built: {} rules, {} conditions, revision {}",
        draft.name,
        draft.rules.len(),
        draft.condition_count(),
        store.revision()
    );

    let payload = clean_for_submission(draft);
    for issue in lint(&payload, store.registry()) {
        warn!("Draft check: {}", issue);
    }

    let json = if raw {
        serde_json::to_string_pretty(draft.as_ref())?
    } else {
        serde_json::to_string_pretty(&payload)?
    };

    match out {
        Some(path) => {
            fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Payload written to {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}
