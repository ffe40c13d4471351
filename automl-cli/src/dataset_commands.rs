use anyhow::{Context, Result};
use colored::Colorize;
use comfy_table::{Cell, Color};
use std::path::Path;

use automl_types::ResourceId;

use crate::commands::App;
use crate::terminal::table;

pub async fn list_datasets(app: &mut App, json: bool) -> Result<()> {
    let datasets = app.client.list_datasets().await.context("Failed to list datasets")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&datasets)?);
        return Ok(());
    }

    if datasets.is_empty() {
        println!("{}", "No datasets uploaded yet.".yellow());
        return Ok(());
    }

    let current = app.ui.last_dataset.as_ref().map(|d| d.id.clone());
    let mut table = table(vec!["ID", "Name", "Rows", "Columns", "Created"]);
    for dataset in &datasets {
        let id = if current.as_ref() == Some(&dataset.id) {
            Cell::new(format!("{} *", dataset.id)).fg(Color::Green)
        } else {
            Cell::new(&dataset.id)
        };
        table.add_row(vec![
            id,
            Cell::new(dataset.display_name()),
            Cell::new(count_or_dash(dataset.rows)),
            Cell::new(count_or_dash(dataset.columns)),
            Cell::new(dataset.created_at.as_deref().unwrap_or("-")),
        ]);
    }

    println!("{table}");
    println!("\n{} datasets total", datasets.len());
    Ok(())
}

fn count_or_dash(count: Option<u64>) -> String {
    count.map_or_else(|| "-".to_string(), |n| n.to_string())
}

pub async fn upload_dataset(app: &mut App, path: &Path) -> Result<()> {
    let (preview, response) = app
        .client
        .upload_dataset(path)
        .await
        .with_context(|| format!("Upload of {} failed", path.display()))?;

    let name = match &response.filename {
        Some(name) => name.clone(),
        None => path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default(),
    };
    app.remember_dataset(&response.dataset_id, Some(&name));

    println!(
        "{} Uploaded {} as dataset {}",
        "✓".green(),
        name.green(),
        response.dataset_id.to_string().bold()
    );
    if let Some(message) = &response.message {
        println!("  {}", message);
    }

    let mut table = table(preview.columns.iter().map(String::as_str));
    for row in &preview.rows {
        table.add_row(row);
    }
    println!("{table}");
    Ok(())
}

pub async fn preview_dataset(app: &mut App, dataset: Option<ResourceId>, json: bool) -> Result<()> {
    let dataset_id = app.dataset(dataset)?;
    let preview = app
        .client
        .preview_dataset(&dataset_id)
        .await
        .with_context(|| format!("Failed to preview dataset {dataset_id}"))?;
    app.remember_dataset(&dataset_id, None);

    if json {
        println!("{}", serde_json::to_string_pretty(&preview)?);
        return Ok(());
    }

    let mut table = table(preview.columns.iter().map(String::as_str));
    for row in &preview.rows {
        table.add_row(preview.row_cells(row));
    }
    println!("{table}");
    if let Some(total) = preview.total_rows {
        println!("\nShowing {} of {} rows", preview.rows.len(), total);
    }
    Ok(())
}

pub async fn analyze_dataset(app: &mut App, dataset: Option<ResourceId>, json: bool) -> Result<()> {
    let dataset_id = app.dataset(dataset)?;
    println!("{}", format!("Analyzing dataset {dataset_id}...").cyan());
    let report = app
        .client
        .analyze_dataset(&dataset_id)
        .await
        .with_context(|| format!("Failed to analyze dataset {dataset_id}"))?;
    app.remember_dataset(&dataset_id, None);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let columns = report.columns();
    println!("{}", "Analysis".cyan().bold());
    println!("  Columns: {}", if columns.is_empty() { "-".to_string() } else { columns.join(", ") });
    if let Some(target) = report.suggested_target() {
        println!("  Suggested target: {}", target.green());
    }
    if let Some(task) = report.task_type() {
        println!("  Task type: {}", task);
    }
    Ok(())
}
