//! Account commands: listing, login, registration

use anyhow::Result;
use strategy_builder::client::Credentials;
use strategy_builder::Settings;
use tracing::info;

use super::open_session;

pub async fn list(settings: &Settings) -> Result<()> {
    let session = open_session(settings)?;
    let strategies = session.list_strategies().await?;
    info!("Fetched {} strategies", strategies.len());

    if strategies.is_empty() {
        println!("No strategies yet.");
        return Ok(());
    }

    println!("{:<38} {:<28} {:>6} {}", "ID", "Name", "Rules", "Created");
    println!("{}", "-".repeat(96));
    for s in &strategies {
        let id = match &s.id {
            serde_json::Value::String(id) => id.clone(),
            other => other.to_string(),
        };
        println!(
            "{:<38} {:<28} {:>6} {}",
            id,
            s.name,
            s.rule_count(),
            s.created_at.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}

pub async fn whoami(settings: &Settings) -> Result<()> {
    let session = open_session(settings)?;
    let user = session.current_user().await?;
    println!("Logged in as {}", user.email);

    let portfolios = session.list_portfolios().await?;
    println!("{} portfolio(s)", portfolios.len());
    for p in &portfolios {
        println!("  {:<28} {}", p.name, p.description.as_deref().unwrap_or(""));
    }
    Ok(())
}

pub async fn login(settings: &Settings, email: String, password: String) -> Result<()> {
    let session = open_session(settings)?;
    session.login(&Credentials::new(email, password)).await?;
    println!("Login successful.");
    Ok(())
}

pub async fn register(settings: &Settings, email: String, password: String) -> Result<()> {
    let session = open_session(settings)?;
    let message = session.register(&Credentials::new(email, password)).await?;
    println!("{}", message);
    Ok(())
}

pub fn logout(settings: &Settings) -> Result<()> {
    open_session(settings)?.logout()?;
    println!("Logged out.");
    Ok(())
}
