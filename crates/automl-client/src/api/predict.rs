//! Prediction endpoints.

use crate::client::AutoMlClient;
use crate::error::ClientError;
use crate::pipeline::ApiRequest;
use automl_types::models::{PredictRequest, PredictResponse, PredictSchema, ResourceId};
use reqwest::StatusCode;

impl AutoMlClient {
    /// `GET /predict/schema/{id}`
    pub async fn prediction_schema(&self, model_id: &ResourceId) -> Result<PredictSchema, ClientError> {
        self.send_json(ApiRequest::get(format!("/predict/schema/{model_id}"))).await
    }

    /// `POST /predict/{id}`
    ///
    /// A 400 means the inputs were rejected; the caller renders that inline,
    /// so no error notice is emitted for it.
    pub async fn predict(
        &self,
        model_id: &ResourceId,
        request: &PredictRequest,
    ) -> Result<PredictResponse, ClientError> {
        let request = ApiRequest::post(format!("/predict/{model_id}"))
            .json(request)?
            .suppress_notice_for(StatusCode::BAD_REQUEST);
        self.send_json(request).await
    }
}
