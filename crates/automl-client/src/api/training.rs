//! Algorithm, training, and AutoML endpoints.

use crate::client::AutoMlClient;
use crate::error::ClientError;
use crate::pipeline::ApiRequest;
use automl_types::models::{
    AlgorithmInfo, AlgorithmList, AutoMlRequest, AutoMlResponse, ResourceId, TrainRequest,
    TrainResponse, TrainResult,
};

impl AutoMlClient {
    /// `GET /algorithms/{id}`
    pub async fn list_algorithms(&self, dataset_id: &ResourceId) -> Result<Vec<AlgorithmInfo>, ClientError> {
        let list: AlgorithmList =
            self.send_json(ApiRequest::get(format!("/algorithms/{dataset_id}"))).await?;
        Ok(list.into_infos())
    }

    /// `POST /train`
    pub async fn train(&self, request: &TrainRequest) -> Result<TrainResponse, ClientError> {
        self.send_json(ApiRequest::post("/train").json(request)?).await
    }

    /// `GET /train/results/{id}`
    pub async fn training_results(&self, model_id: &ResourceId) -> Result<TrainResult, ClientError> {
        self.send_json(ApiRequest::get(format!("/train/results/{model_id}"))).await
    }

    /// `POST /automl/{id}`
    pub async fn run_automl(
        &self,
        dataset_id: &ResourceId,
        request: &AutoMlRequest,
    ) -> Result<AutoMlResponse, ClientError> {
        self.send_json(ApiRequest::post(format!("/automl/{dataset_id}")).json(request)?).await
    }
}
