//! Front-end state persisted across runs.
//!
//! Nothing here affects correctness: it restores context (the last model, the
//! last dataset, the training form per dataset) so the user does not retype it.

use super::{ResourceId, TaskType, TrainRequest};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Last-used training form for one dataset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrainingConfig {
    pub target_column: String,
    pub task_type: TaskType,
    #[serde(default)]
    pub features: Vec<String>,
    pub algorithm: String,
    /// Unix timestamp of the last save
    #[serde(default)]
    pub saved_at: i64,
}

impl TrainingConfig {
    /// Captures the form fields of a submitted training request.
    pub fn from_request(request: &TrainRequest) -> Self {
        Self {
            target_column: request.target_column.clone(),
            task_type: request.task_type.clone(),
            features: request.features.clone(),
            algorithm: request.algorithm.clone(),
            saved_at: chrono::Utc::now().timestamp(),
        }
    }

    /// Rebuilds a training request for `dataset_id` from the cached form.
    pub fn to_request(&self, dataset_id: ResourceId) -> TrainRequest {
        TrainRequest {
            dataset_id,
            target_column: self.target_column.clone(),
            task_type: self.task_type.clone(),
            features: self.features.clone(),
            algorithm: self.algorithm.clone(),
        }
    }
}

/// Minimal copy of the last selected dataset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DatasetSnapshot {
    pub id: ResourceId,
    #[serde(default)]
    pub name: String,
}

/// Everything the front end keeps between runs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct UiState {
    /// Dataset id -> last training form
    #[serde(default)]
    pub training_configs: BTreeMap<String, TrainingConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_model_id: Option<ResourceId>,
    /// Last command path the user ran (e.g. "datasets preview")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_dataset: Option<DatasetSnapshot>,
}

impl UiState {
    pub fn training_config(&self, dataset_id: &ResourceId) -> Option<&TrainingConfig> {
        self.training_configs.get(dataset_id.as_str())
    }

    pub fn remember_training(&mut self, request: &TrainRequest) {
        self.training_configs
            .insert(request.dataset_id.to_string(), TrainingConfig::from_request(request));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remembered_training_rebuilds_request() {
        let request = TrainRequest {
            dataset_id: ResourceId::from(4),
            target_column: "churn".to_string(),
            task_type: TaskType::Classification,
            features: vec!["tenure".to_string()],
            algorithm: "random_forest".to_string(),
        };
        let mut state = UiState::default();
        state.remember_training(&request);

        let cached = state.training_config(&ResourceId::from("4")).unwrap();
        assert_eq!(cached.to_request(ResourceId::from(4)), request);
    }
}
