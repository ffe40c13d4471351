//! Account and history endpoints.

use crate::client::AutoMlClient;
use crate::error::ClientError;
use crate::pipeline::ApiRequest;
use automl_types::models::{Account, AccountUpdate, HistoryEntry};

impl AutoMlClient {
    /// `GET /account`
    pub async fn account(&self) -> Result<Account, ClientError> {
        self.send_json(ApiRequest::get("/account")).await
    }

    /// `PUT /account`
    pub async fn update_account(&self, update: &AccountUpdate) -> Result<Account, ClientError> {
        self.send_json(ApiRequest::put("/account").json(update)?).await
    }

    /// `GET /history`
    pub async fn history(&self) -> Result<Vec<HistoryEntry>, ClientError> {
        self.send_json(ApiRequest::get("/history")).await
    }
}
