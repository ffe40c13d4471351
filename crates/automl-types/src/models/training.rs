//! Algorithm selection, training, and AutoML run models.

use super::ResourceId;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Learning task of a training run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum TaskType {
    #[default]
    Classification,
    Regression,
    /// Task type this client does not know about, kept verbatim
    Other(String),
}

impl TaskType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Classification => "classification",
            Self::Regression => "regression",
            Self::Other(s) => s,
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for TaskType {
    fn from(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "classification" => Self::Classification,
            "regression" => Self::Regression,
            _ => Self::Other(s.to_string()),
        }
    }
}

impl Serialize for TaskType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TaskType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::from(raw.as_str()))
    }
}

/// An algorithm the backend offers for a dataset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AlgorithmInfo {
    /// Identifier sent back in `TrainRequest::algorithm`
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_type: Option<TaskType>,
}

/// Response body of `GET /algorithms/{id}`.
///
/// Older backends return a bare list of names, newer ones an object with an
/// `algorithms` array of descriptors.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum AlgorithmList {
    Names(Vec<String>),
    Detailed {
        algorithms: Vec<AlgorithmInfo>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        task_type: Option<TaskType>,
    },
}

impl AlgorithmList {
    /// Normalizes both shapes into descriptors.
    pub fn into_infos(self) -> Vec<AlgorithmInfo> {
        match self {
            Self::Names(names) => names
                .into_iter()
                .map(|name| AlgorithmInfo {
                    name,
                    display_name: None,
                    description: None,
                    task_type: None,
                })
                .collect(),
            Self::Detailed { algorithms, task_type } => algorithms
                .into_iter()
                .map(|mut info| {
                    if info.task_type.is_none() {
                        info.task_type.clone_from(&task_type);
                    }
                    info
                })
                .collect(),
        }
    }
}

/// Request body of `POST /train`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrainRequest {
    pub dataset_id: ResourceId,
    pub target_column: String,
    pub task_type: TaskType,
    /// Input feature columns; empty means "all except target"
    #[serde(default)]
    pub features: Vec<String>,
    pub algorithm: String,
}

/// Response body of `POST /train`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrainResponse {
    #[serde(alias = "id")]
    pub model_id: ResourceId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Metrics, when training completed synchronously. Values are usually
    /// numbers but may be null or nested (confusion matrices, reports).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metrics: BTreeMap<String, Value>,
}

/// Response body of `GET /train/results/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrainResult {
    #[serde(alias = "id")]
    pub model_id: ResourceId,
    #[serde(default)]
    pub algorithm: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_type: Option<TaskType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_column: Option<String>,
    #[serde(default)]
    pub metrics: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_importance: Option<BTreeMap<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl TrainResult {
    /// Numeric feature importances sorted from most to least important.
    pub fn ranked_features(&self) -> Vec<(&str, f64)> {
        let mut ranked: Vec<(&str, f64)> = self
            .feature_importance
            .iter()
            .flatten()
            .filter_map(|(k, v)| v.as_f64().map(|v| (k.as_str(), v)))
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked
    }
}

/// Request body of `POST /automl/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AutoMlRequest {
    pub target_column: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_type: Option<TaskType>,
}

/// One candidate in an AutoML leaderboard.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LeaderboardEntry {
    pub algorithm: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_id: Option<ResourceId>,
    /// Missing when the candidate failed to train
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub metrics: BTreeMap<String, Value>,
}

/// Response body of `POST /automl/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct AutoMlResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_model_id: Option<ResourceId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_algorithm: Option<String>,
    #[serde(default)]
    pub leaderboard: Vec<LeaderboardEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn task_type_round_trips_unknown_values() {
        let t: TaskType = serde_json::from_value(json!("Clustering")).unwrap();
        assert_eq!(t, TaskType::Other("Clustering".to_string()));
        assert_eq!(serde_json::to_value(&t).unwrap(), json!("Clustering"));
        assert_eq!(TaskType::from("REGRESSION"), TaskType::Regression);
    }

    #[test]
    fn algorithm_list_accepts_both_shapes() {
        let names: AlgorithmList = serde_json::from_value(json!(["rf", "xgb"])).unwrap();
        assert_eq!(names.into_infos().len(), 2);

        let detailed: AlgorithmList = serde_json::from_value(json!({
            "task_type": "classification",
            "algorithms": [{"name": "rf", "display_name": "Random Forest"}]
        }))
        .unwrap();
        let infos = detailed.into_infos();
        assert_eq!(infos[0].display_name.as_deref(), Some("Random Forest"));
        assert_eq!(infos[0].task_type, Some(TaskType::Classification));
    }

    #[test]
    fn ranked_features_sorts_descending() {
        let result: TrainResult = serde_json::from_value(json!({
            "model_id": 9,
            "metrics": {"accuracy": 0.91},
            "feature_importance": {"a": 0.1, "b": 0.7, "c": 0.2}
        }))
        .unwrap();
        let names: Vec<&str> = result.ranked_features().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["b", "c", "a"]);
    }

    #[test]
    fn metrics_tolerate_nested_and_null_values() {
        let response: TrainResponse = serde_json::from_value(json!({
            "model_id": 3,
            "metrics": {"accuracy": 0.9, "confusion_matrix": [[5, 1], [0, 4]]}
        }))
        .unwrap();
        assert_eq!(response.metrics["accuracy"], json!(0.9));
        assert_eq!(response.metrics["confusion_matrix"], json!([[5, 1], [0, 4]]));

        let result: TrainResult = serde_json::from_value(json!({
            "model_id": 3,
            "metrics": {"r2": null},
            "feature_importance": {"a": 0.4, "b": null}
        }))
        .unwrap();
        assert_eq!(result.metrics["r2"], Value::Null);
        assert_eq!(result.ranked_features(), vec![("a", 0.4)]);
    }

    #[test]
    fn leaderboard_accepts_null_score() {
        let response: AutoMlResponse = serde_json::from_value(json!({
            "leaderboard": [
                {"algorithm": "rf", "score": null},
                {"algorithm": "knn", "model_id": 8, "score": 0.81, "metrics": {"f1": null}}
            ]
        }))
        .unwrap();
        assert_eq!(response.leaderboard[0].score, None);
        assert_eq!(response.leaderboard[1].score, Some(0.81));
    }
}
