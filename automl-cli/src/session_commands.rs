use anyhow::{Context, Result};
use colored::Colorize;
use futures::future;

use automl_client::TokenClaims;

use crate::commands::App;
use crate::terminal::prompt_secret;

fn password_or_prompt(password: Option<String>) -> Result<String> {
    match password {
        Some(password) => Ok(password),
        None => prompt_secret("Password").context("Failed to read password"),
    }
}

pub async fn login(app: &App, username: &str, password: Option<String>) -> Result<()> {
    let password = password_or_prompt(password)?;
    app.client.login(username, &password).await.context("Login failed")?;
    println!("{} Logged in as {}", "✓".green(), username.green());
    Ok(())
}

pub async fn signup(app: &App, email: &str, username: &str, password: Option<String>) -> Result<()> {
    let password = password_or_prompt(password)?;
    app.client.signup(email, username, &password).await.context("Signup failed")?;
    println!("{} Account created, logged in as {}", "✓".green(), username.green());
    Ok(())
}

pub fn logout(app: &App) -> Result<()> {
    app.client.logout().context("Failed to clear stored token")?;
    println!("{} Logged out", "✓".green());
    Ok(())
}

pub async fn status(app: &App) -> Result<()> {
    let session = app.client.session();

    println!("{}", "AutoML Studio Status".cyan().bold());
    println!("  API: {}", app.client.config().base_url);
    println!("  Data: {}", app.data_dir.display());
    println!("  Version: {}", env!("CARGO_PKG_VERSION"));

    let Some(token) = session.token() else {
        println!("  Session: {}", "logged out".yellow());
        return Ok(());
    };

    println!("  Session: {}", "logged in".green());
    if let Some(claims) = TokenClaims::decode(&token) {
        if let Some(sub) = &claims.sub {
            println!("  Subject: {}", sub);
        }
        if let Some(expires) = claims.expires_at() {
            let label = if expires < chrono::Utc::now() { "expired".red() } else { "valid".green() };
            println!("  Expires: {} ({})", expires.format("%Y-%m-%d %H:%M UTC"), label);
        }
    }
    if let Some(dataset) = &app.ui.last_dataset {
        println!("  Last dataset: {} ({})", dataset.name, dataset.id);
    }
    if let Some(model) = &app.ui.last_model_id {
        println!("  Last model: {}", model);
    }

    let (account, datasets) = future::join(app.client.account(), app.client.list_datasets()).await;
    match (account, datasets) {
        (Ok(account), Ok(datasets)) => {
            println!("  Account: {} <{}>", account.username, account.email);
            println!("  Datasets: {}", datasets.len());
        },
        (Err(e), _) | (_, Err(e)) => {
            println!("  Backend: {} ({})", "unavailable".red(), e);
        },
    }
    Ok(())
}

