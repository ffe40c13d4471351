use anyhow::{bail, Context, Result};
use colored::Colorize;
use comfy_table::Cell;

use automl_types::models::AccountUpdate;

use crate::commands::App;
use crate::terminal::table;

pub async fn show_account(app: &App, json: bool) -> Result<()> {
    let account = app.client.account().await.context("Failed to load account")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&account)?);
        return Ok(());
    }

    println!("{}", "Account".cyan().bold());
    println!("  Username: {}", account.username);
    println!("  Email: {}", account.email);
    if let Some(created) = &account.created_at {
        println!("  Member since: {}", created);
    }
    Ok(())
}

pub async fn update_account(
    app: &App,
    email: Option<String>,
    username: Option<String>,
    password: Option<String>,
) -> Result<()> {
    let update = AccountUpdate { email, username, password };
    if update.is_empty() {
        bail!("Specify at least one of --email, --username, --password");
    }

    let account = app.client.update_account(&update).await.context("Failed to update account")?;
    println!("{} Account updated: {} <{}>", "✓".green(), account.username.green(), account.email);
    Ok(())
}

pub async fn history(app: &App, json: bool) -> Result<()> {
    let entries = app.client.history().await.context("Failed to load history")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("{}", "No activity yet.".yellow());
        return Ok(());
    }

    let mut table = table(vec!["When", "Action", "Dataset", "Model", "Summary"]);
    for entry in &entries {
        table.add_row(vec![
            Cell::new(entry.created_at.as_deref().unwrap_or("-")),
            Cell::new(&entry.kind),
            Cell::new(entry.dataset_id.as_ref().map_or_else(|| "-".to_string(), ToString::to_string)),
            Cell::new(entry.model_id.as_ref().map_or_else(|| "-".to_string(), ToString::to_string)),
            Cell::new(entry.summary.as_deref().unwrap_or("")),
        ]);
    }
    println!("{table}");
    println!("\n{} entries", entries.len());
    Ok(())
}
