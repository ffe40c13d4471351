//! Terminal rendering of session signals.

use automl_client::SessionEvents;
use colored::Colorize;
use std::io::{self, BufRead, IsTerminal, Write};
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Prints notices and login prompts to stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalEvents;

impl SessionEvents for TerminalEvents {
    fn error_notice(&self, message: &str) {
        clear_status_line();
        eprintln!("{} {}", "✗".red(), message.red());
    }

    fn login_required(&self) {
        clear_status_line();
        eprintln!(
            "{} Session expired. Run {} to sign in again.",
            "!".yellow(),
            "automl login <username>".cyan()
        );
    }
}

/// Shows an in-flight indicator on stderr while the session has pending requests.
///
/// Does nothing when stderr is not a terminal.
pub fn spawn_busy_indicator(mut pending: watch::Receiver<usize>) -> Option<JoinHandle<()>> {
    if !io::stderr().is_terminal() {
        return None;
    }

    Some(tokio::spawn(async move {
        while pending.changed().await.is_ok() {
            let count = *pending.borrow_and_update();
            if count == 0 {
                clear_status_line();
            } else {
                let label = if count == 1 { "request" } else { "requests" };
                eprint!("\r{}", format!("… {count} {label} in flight").dimmed());
                let _ = io::stderr().flush();
            }
        }
    }))
}

fn clear_status_line() {
    if io::stderr().is_terminal() {
        eprint!("\r\x1b[2K");
    }
}

/// Reads a secret from stdin after printing `label` on stderr.
///
/// Input is echoed; the terminal is not switched to no-echo mode.
pub fn prompt_secret(label: &str) -> io::Result<String> {
    eprint!("{label}: ");
    io::stderr().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Table with the standard preset and `header`.
pub fn table<I, T>(header: I) -> comfy_table::Table
where
    I: IntoIterator<Item = T>,
    T: Into<comfy_table::Cell>,
{
    let mut table = comfy_table::Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.set_header(header);
    table
}
