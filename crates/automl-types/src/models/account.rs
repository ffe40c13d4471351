//! Account and activity history models.

use super::ResourceId;
use serde::{Deserialize, Serialize};

/// Profile of the signed-in user, from `GET /account`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Account {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ResourceId>,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// Request body of `PUT /account`. Unset fields are left unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct AccountUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl AccountUpdate {
    pub const fn is_empty(&self) -> bool {
        self.email.is_none() && self.username.is_none() && self.password.is_none()
    }
}

/// One item of `GET /history`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryEntry {
    pub id: ResourceId,
    /// Activity kind ("upload", "train", "predict", ...)
    #[serde(default, alias = "type", alias = "action")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset_id: Option<ResourceId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_id: Option<ResourceId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_update_serializes_to_empty_object() {
        let update = AccountUpdate::default();
        assert!(update.is_empty());
        assert_eq!(serde_json::to_value(&update).unwrap(), json!({}));
    }

    #[test]
    fn history_entry_accepts_type_alias() {
        let entry: HistoryEntry =
            serde_json::from_value(json!({"id": 1, "type": "train", "model_id": "m1"})).unwrap();
        assert_eq!(entry.kind, "train");
        assert_eq!(entry.model_id, Some(ResourceId::from("m1")));
    }
}
