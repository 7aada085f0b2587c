//! Submit command: build a draft from a script and create it on the service

use anyhow::Result;
use std::path::PathBuf;
use strategy_builder::Settings;
use tracing::{error, info};

use super::{build_draft, load_script, open_session};

pub async fn run(settings: &Settings, script: PathBuf) -> Result<()> {
    let store = build_draft(&load_script(&script)?)?;
    let session = open_session(settings)?;

    info!("Submitting to {}", session.client().base_url());
    match session.submit(store).await {
        Ok(record) => {
            println!("{}", serde_json::to_string_pretty(&record)?);
            Ok(())
        }
        Err(failed) => {
            error!(
                "Draft '{}' not saved ({} rules)",
                failed.store.draft().name,
                failed.store.draft().rules.len()
            );
            if failed.error.is_unauthorized() {
                error!("Run `strategy-builder login` and try again");
            }
            Err(failed.error.into())
        }
    }
}
