use anyhow::{anyhow, bail, Context, Result};
use colored::Colorize;
use comfy_table::{Cell, Color};
use serde_json::{Map, Value};

use automl_types::models::{display_value, AutoMlRequest, PredictSchema};
use automl_types::{PredictRequest, ResourceId, TaskType, TrainRequest, UiState};

use crate::commands::App;
use crate::terminal::table;

/// Training options as given on the command line.
pub struct TrainOptions {
    pub target: Option<String>,
    pub task: Option<String>,
    pub features: Vec<String>,
    pub algorithm: Option<String>,
    pub reuse: bool,
}

pub async fn list_algorithms(app: &mut App, dataset: Option<ResourceId>, json: bool) -> Result<()> {
    let dataset_id = app.dataset(dataset)?;
    let algorithms = app
        .client
        .list_algorithms(&dataset_id)
        .await
        .with_context(|| format!("Failed to list algorithms for dataset {dataset_id}"))?;
    app.remember_dataset(&dataset_id, None);

    if json {
        println!("{}", serde_json::to_string_pretty(&algorithms)?);
        return Ok(());
    }

    let mut table = table(vec!["Name", "Display Name", "Task", "Description"]);
    for algo in &algorithms {
        table.add_row(vec![
            Cell::new(&algo.name).fg(Color::Cyan),
            Cell::new(algo.display_name.as_deref().unwrap_or("-")),
            Cell::new(algo.task_type.as_ref().map_or_else(|| "-".to_string(), ToString::to_string)),
            Cell::new(algo.description.as_deref().unwrap_or("")),
        ]);
    }
    println!("{table}");
    Ok(())
}

pub async fn train(app: &mut App, dataset: Option<ResourceId>, options: TrainOptions) -> Result<()> {
    let dataset_id = app.dataset(dataset)?;
    let request = if options.reuse {
        app.ui
            .training_config(&dataset_id)
            .with_context(|| format!("No saved training configuration for dataset {dataset_id}"))?
            .to_request(dataset_id.clone())
    } else {
        build_train_request(app, &dataset_id, options).await?
    };

    println!(
        "{}",
        format!(
            "Training {} on dataset {} (target: {}, {})...",
            request.algorithm, dataset_id, request.target_column, request.task_type
        )
        .cyan()
    );
    let response = app.client.train(&request).await.context("Training failed")?;

    app.ui.remember_training(&request);
    app.ui.last_model_id = Some(response.model_id.clone());
    app.remember_dataset(&dataset_id, None);

    println!("{} Model {} trained", "✓".green(), response.model_id.to_string().bold());
    if !response.metrics.is_empty() {
        let mut table = table(vec!["Metric", "Value"]);
        for (name, value) in &response.metrics {
            table.add_row(vec![name.clone(), format_metric(value)]);
        }
        println!("{table}");
    }
    Ok(())
}

/// Fills target and task from the backend analysis when they are not given.
async fn build_train_request(
    app: &App,
    dataset_id: &ResourceId,
    options: TrainOptions,
) -> Result<TrainRequest> {
    let algorithm = options
        .algorithm
        .context("Pass --algorithm (see `automl algorithms` for choices)")?;

    let (target_column, task_type) = match (options.target, options.task) {
        (Some(target), Some(task)) => (target, TaskType::from(task.as_str())),
        (target, task) => {
            let report = app
                .client
                .analyze_dataset(dataset_id)
                .await
                .context("Failed to analyze dataset")?;
            let target = target
                .or_else(|| report.suggested_target().map(str::to_string))
                .context("Pass --target; the backend suggested none")?;
            let task = task
                .map(|t| TaskType::from(t.as_str()))
                .or_else(|| report.task_type())
                .context("Pass --task; the backend detected none")?;
            (target, task)
        },
    };

    Ok(TrainRequest {
        dataset_id: dataset_id.clone(),
        target_column,
        task_type,
        features: options.features,
        algorithm,
    })
}

pub async fn show_results(app: &mut App, model: Option<ResourceId>, json: bool) -> Result<()> {
    let model_id = app.model(model)?;
    let result = app
        .client
        .training_results(&model_id)
        .await
        .with_context(|| format!("Failed to load results of model {model_id}"))?;
    app.ui.last_model_id = Some(model_id);

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!("{}", format!("Model {}", result.model_id).cyan().bold());
    println!("  Algorithm: {}", result.algorithm);
    if let Some(task) = &result.task_type {
        println!("  Task: {}", task);
    }
    if let Some(target) = &result.target_column {
        println!("  Target: {}", target);
    }
    if let Some(status) = &result.status {
        println!("  Status: {}", status);
    }

    let mut metrics = table(vec!["Metric", "Value"]);
    for (name, value) in &result.metrics {
        metrics.add_row(vec![name.clone(), format_metric(value)]);
    }
    println!("{metrics}");

    let ranked = result.ranked_features();
    if !ranked.is_empty() {
        let mut importance = table(vec!["Feature", "Importance"]);
        for (name, value) in ranked.iter().take(10) {
            importance.add_row(vec![name.to_string(), format_number(*value)]);
        }
        println!("{importance}");
    }
    Ok(())
}

pub async fn show_schema(app: &mut App, model: Option<ResourceId>, json: bool) -> Result<()> {
    let model_id = app.model(model)?;
    let schema = app
        .client
        .prediction_schema(&model_id)
        .await
        .with_context(|| format!("Failed to load schema of model {model_id}"))?;
    app.ui.last_model_id = Some(model_id.clone());

    if json {
        println!("{}", serde_json::to_string_pretty(&schema)?);
        return Ok(());
    }

    let mut table = table(vec!["Feature", "Type", "Example"]);
    for feature in &schema.features {
        table.add_row(vec![
            Cell::new(&feature.name),
            Cell::new(feature.dtype.as_deref().unwrap_or("-")),
            Cell::new(feature.example.as_ref().map_or_else(String::new, Value::to_string)),
        ]);
    }
    println!("{table}");
    if let Some(target) = &schema.target {
        println!("\nPredicts: {}", target.green());
    }
    println!("Usage: automl predict {} --set <feature>=<value> ...", model_id);
    Ok(())
}

pub async fn predict(
    app: &mut App,
    model: Option<ResourceId>,
    values: &[String],
    input: Option<&str>,
) -> Result<()> {
    let model_id = app.model(model)?;
    let request = match input {
        Some(raw) => parse_json_input(raw)?,
        None => {
            let schema = app
                .client
                .prediction_schema(&model_id)
                .await
                .with_context(|| format!("Failed to load schema of model {model_id}"))?;
            let features = collect_features(&schema, values)?;
            let missing = schema.missing_features(&features);
            if !missing.is_empty() {
                bail!("Missing feature values: {}", missing.join(", "));
            }
            PredictRequest::Single { features }
        },
    };
    app.ui.last_model_id = Some(model_id.clone());

    let response = match app.client.predict(&model_id, &request).await {
        Ok(response) => response,
        Err(e) if e.is_corrupted_model() => {
            eprintln!("{} {}", "!".yellow(), retrain_hint(&app.ui));
            return Err(anyhow!(e)).context("Model needs retraining");
        },
        Err(e) => return Err(anyhow!(e)).context("Prediction failed"),
    };

    let labels = response.labels();
    if let [label] = labels.as_slice() {
        println!("{} Prediction: {}", "✓".green(), label.bold());
    } else {
        let mut table = table(vec!["#", "Prediction"]);
        for (i, label) in labels.iter().enumerate() {
            table.add_row(vec![(i + 1).to_string(), label.clone()]);
        }
        println!("{table}");
    }
    if let Some(probabilities) = &response.probabilities {
        println!("Probabilities: {}", serde_json::to_string_pretty(probabilities)?);
    }
    Ok(())
}

pub async fn run_automl(
    app: &mut App,
    dataset: Option<ResourceId>,
    target: String,
    task: Option<String>,
) -> Result<()> {
    let dataset_id = app.dataset(dataset)?;
    let request = AutoMlRequest {
        target_column: target,
        task_type: task.as_deref().map(TaskType::from),
    };

    println!("{}", format!("Running AutoML on dataset {dataset_id}...").cyan());
    let response = app
        .client
        .run_automl(&dataset_id, &request)
        .await
        .context("AutoML run failed")?;
    app.remember_dataset(&dataset_id, None);

    let mut leaderboard = response.leaderboard.clone();
    // Unscored candidates sink to the bottom.
    leaderboard.sort_by(|a, b| {
        let (a, b) = (a.score.unwrap_or(f64::NEG_INFINITY), b.score.unwrap_or(f64::NEG_INFINITY));
        b.total_cmp(&a)
    });

    let mut table = table(vec!["Rank", "Algorithm", "Model", "Score"]);
    for (i, entry) in leaderboard.iter().enumerate() {
        let is_best = entry.model_id.is_some() && entry.model_id == response.best_model_id;
        let algorithm = if is_best {
            Cell::new(&entry.algorithm).fg(Color::Green)
        } else {
            Cell::new(&entry.algorithm)
        };
        table.add_row(vec![
            Cell::new(i + 1),
            algorithm,
            Cell::new(entry.model_id.as_ref().map_or_else(|| "-".to_string(), ToString::to_string)),
            Cell::new(entry.score.map_or_else(|| "-".to_string(), format_number)),
        ]);
    }
    println!("{table}");

    if let Some(best) = response.best_model_id {
        println!(
            "{} Best model: {} ({})",
            "✓".green(),
            best.to_string().bold(),
            response.best_algorithm.as_deref().unwrap_or("unknown algorithm")
        );
        app.ui.last_model_id = Some(best);
    }
    Ok(())
}

fn format_number(value: f64) -> String {
    format!("{value:.4}")
}

/// Numbers to four decimals; null as `-`; anything else as compact JSON.
fn format_metric(value: &Value) -> String {
    match value {
        Value::Null => "-".to_string(),
        other => other.as_f64().map_or_else(|| display_value(other), format_number),
    }
}

/// Splits `feature=value`; the value may itself contain `=`.
fn parse_assignment(raw: &str) -> Result<(&str, &str)> {
    let (key, value) = raw
        .split_once('=')
        .with_context(|| format!("Expected FEATURE=VALUE, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        bail!("Empty feature name in '{raw}'");
    }
    Ok((key, value.trim()))
}

/// Builds a record from `--set` values, typed by the model schema.
fn collect_features(schema: &PredictSchema, values: &[String]) -> Result<Map<String, Value>> {
    let mut features = Map::new();
    for raw in values {
        let (name, value) = parse_assignment(raw)?;
        let value = match schema.feature(name) {
            Some(spec) => spec.coerce(value),
            None if schema.features.is_empty() => Value::String(value.to_string()),
            None => {
                let known: Vec<&str> = schema.features.iter().map(|f| f.name.as_str()).collect();
                bail!("Unknown feature '{}'; expected one of: {}", name, known.join(", "));
            },
        };
        features.insert(name.to_string(), value);
    }
    Ok(features)
}

/// `--json` input: one record object, or an array of them.
fn parse_json_input(raw: &str) -> Result<PredictRequest> {
    let value: Value = serde_json::from_str(raw).context("Invalid JSON input")?;
    match value {
        Value::Object(features) => Ok(PredictRequest::Single { features }),
        Value::Array(items) => {
            let records = items
                .into_iter()
                .map(|item| match item {
                    Value::Object(record) => Ok(record),
                    other => Err(anyhow!("Expected a record object, got {other}")),
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(PredictRequest::Batch { records })
        },
        _ => bail!("JSON input must be an object or an array of objects"),
    }
}

/// Suggestion shown when the backend reports a model that must be retrained.
fn retrain_hint(ui: &UiState) -> String {
    match &ui.last_dataset {
        Some(dataset) if ui.training_config(&dataset.id).is_some() => format!(
            "The model file is unusable. Retrain it with: automl train {} --reuse",
            dataset.id
        ),
        _ => "The model file is unusable. Retrain it with: automl train <dataset> --target <column> --algorithm <name>"
            .to_string(),
    }
}
