//! Prediction schema and request/response models.

use super::dataset::display_value;
use super::ResourceId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One model input as described by `GET /predict/schema/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeatureSpec {
    pub name: String,
    /// Backend dtype label ("int64", "float64", "object", ...)
    #[serde(default, alias = "type", skip_serializing_if = "Option::is_none")]
    pub dtype: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
}

impl FeatureSpec {
    /// Whether values for this feature should be sent as JSON numbers.
    pub fn is_numeric(&self) -> bool {
        self.dtype.as_deref().is_some_and(|d| {
            let d = d.to_ascii_lowercase();
            d.starts_with("int") || d.starts_with("float") || d == "number" || d == "numeric"
        })
    }

    /// Converts a raw command-line value into the JSON value this feature expects.
    ///
    /// Numeric features fall back to a string when the input does not parse,
    /// leaving rejection to the backend.
    pub fn coerce(&self, raw: &str) -> Value {
        if self.is_numeric() {
            if let Ok(n) = raw.parse::<i64>() {
                return Value::from(n);
            }
            if let Some(n) = raw.parse::<f64>().ok().and_then(serde_json::Number::from_f64) {
                return Value::Number(n);
            }
        }
        Value::String(raw.to_string())
    }
}

/// Response body of `GET /predict/schema/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PredictSchema {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_id: Option<ResourceId>,
    #[serde(default)]
    pub features: Vec<FeatureSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

impl PredictSchema {
    pub fn feature(&self, name: &str) -> Option<&FeatureSpec> {
        self.features.iter().find(|f| f.name == name)
    }

    /// Schema features with no value in `record`.
    pub fn missing_features<'a>(&'a self, record: &Map<String, Value>) -> Vec<&'a str> {
        self.features
            .iter()
            .filter(|f| !record.contains_key(&f.name))
            .map(|f| f.name.as_str())
            .collect()
    }
}

/// Request body of `POST /predict/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum PredictRequest {
    /// A single record of feature values
    Single { features: Map<String, Value> },
    /// Several records scored in one call
    Batch { records: Vec<Map<String, Value>> },
}

/// Response body of `POST /predict/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PredictResponse {
    /// Scalar for single predictions, array for batches
    #[serde(alias = "predictions")]
    pub prediction: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probabilities: Option<Value>,
}

impl PredictResponse {
    /// Predictions as display strings, one per record.
    pub fn labels(&self) -> Vec<String> {
        match &self.prediction {
            Value::Array(items) => items.iter().map(display_value).collect(),
            other => vec![display_value(other)],
        }
    }
}
