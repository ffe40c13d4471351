//! AutoML Studio CLI
//!
//! Terminal front end for the AutoML backend:
//! - Logs in and keeps the session token in the data directory
//! - Uploads and inspects datasets, trains models, runs predictions
//! - Remembers the last dataset, model and training configuration between runs
//!
//! Backend: `--api-url` / `AUTOML_API_URL` (default http://127.0.0.1:8000/api)

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod account_commands;
mod cli;
mod commands;
mod dataset_commands;
mod model_commands;
mod session_commands;
mod terminal;

use cli::Cli;
use commands::App;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_new(&cli.log_level)
        .with_context(|| format!("Invalid log level: {}", cli.log_level))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let mut app = App::open(cli.api_url.as_deref())?;
    let busy = terminal::spawn_busy_indicator(app.client.session().subscribe_busy());

    let result = commands::handle_command(&mut app, cli.command).await;

    if let Some(busy) = busy {
        busy.abort();
    }
    app.save();
    result
}
