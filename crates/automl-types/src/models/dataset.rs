//! Dataset, preview, and analysis models.

use super::{ResourceId, TaskType};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A dataset registered with the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Dataset {
    pub id: ResourceId,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Original upload filename
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    /// Row count, when the backend has computed it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<u64>,
    /// Column count, when the backend has computed it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<u64>,
    /// Creation timestamp as sent by the backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Dataset {
    /// Name for display, falling back to the filename and then the id.
    pub fn display_name(&self) -> String {
        if !self.name.is_empty() {
            return self.name.clone();
        }
        self.filename.clone().unwrap_or_else(|| format!("dataset {}", self.id))
    }
}

/// Request body of `POST /datasets`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateDatasetRequest {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Response body of `POST /upload`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UploadResponse {
    /// Id of the dataset created from the upload
    #[serde(alias = "id")]
    pub dataset_id: ResourceId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Response body of `GET /datasets/{id}/preview`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct DatasetPreview {
    #[serde(default)]
    pub columns: Vec<String>,
    /// Each row is either an object keyed by column or a positional array
    #[serde(default)]
    pub rows: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_rows: Option<u64>,
}

impl DatasetPreview {
    /// Cell values of `row` in column order, rendered as display strings.
    pub fn row_cells(&self, row: &Value) -> Vec<String> {
        match row {
            Value::Object(map) => self
                .columns
                .iter()
                .map(|c| map.get(c).map(display_value).unwrap_or_default())
                .collect(),
            Value::Array(items) => items.iter().map(display_value).collect(),
            other => vec![display_value(other)],
        }
    }
}

/// Response body of `POST /analyze/{id}`.
///
/// The analysis payload is open-ended; typed accessors cover the fields the
/// front end relies on and the raw value is kept for display.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(transparent)]
pub struct AnalysisReport(pub Value);

impl AnalysisReport {
    /// Column names reported by the analysis.
    pub fn columns(&self) -> Vec<String> {
        match self.0.get("columns") {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|c| match c {
                    Value::String(s) => Some(s.clone()),
                    Value::Object(o) => o.get("name").and_then(Value::as_str).map(str::to_string),
                    _ => None,
                })
                .collect(),
            Some(Value::Object(map)) => map.keys().cloned().collect(),
            _ => Vec::new(),
        }
    }

    /// Target column suggested by the backend, if any.
    pub fn suggested_target(&self) -> Option<&str> {
        self.0
            .get("suggested_target")
            .or_else(|| self.0.get("target"))
            .and_then(Value::as_str)
    }

    /// Task type inferred by the backend, if any.
    pub fn task_type(&self) -> Option<TaskType> {
        self.0.get("task_type").and_then(Value::as_str).map(TaskType::from)
    }
}

/// Renders a JSON value as table text: strings unquoted, null as empty.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn preview_cells_follow_column_order() {
        let preview = DatasetPreview {
            columns: vec!["b".to_string(), "a".to_string()],
            rows: vec![json!({"a": 1, "b": "x"}), json!([3, null])],
            total_rows: Some(2),
        };
        assert_eq!(preview.row_cells(&preview.rows[0]), vec!["x", "1"]);
        assert_eq!(preview.row_cells(&preview.rows[1]), vec!["3", ""]);
    }

    #[test]
    fn analysis_accessors_handle_both_column_shapes() {
        let listed = AnalysisReport(json!({
            "columns": [{"name": "age"}, "income"],
            "suggested_target": "income",
            "task_type": "regression"
        }));
        assert_eq!(listed.columns(), vec!["age", "income"]);
        assert_eq!(listed.suggested_target(), Some("income"));
        assert_eq!(listed.task_type(), Some(TaskType::Regression));

        let keyed = AnalysisReport(json!({"columns": {"x": {}, "y": {}}}));
        assert_eq!(keyed.columns(), vec!["x", "y"]);
        assert_eq!(keyed.suggested_target(), None);
    }

    #[test]
    fn dataset_tolerates_sparse_payloads() {
        let ds: Dataset = serde_json::from_value(json!({"id": 3, "extra": true})).unwrap();
        assert_eq!(ds.id.as_str(), "3");
        assert_eq!(ds.display_name(), "dataset 3");
    }
}
