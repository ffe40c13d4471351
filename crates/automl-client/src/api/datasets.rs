//! Dataset endpoints.

use crate::client::AutoMlClient;
use crate::dataset_file::{self, FilePreview};
use crate::error::ClientError;
use crate::pipeline::{ApiRequest, FilePart};
use automl_types::models::{
    AnalysisReport, CreateDatasetRequest, Dataset, DatasetPreview, ResourceId, UploadResponse,
};
use bytes::Bytes;
use std::path::Path;
use tracing::info;

/// Multipart field carrying the dataset file.
const UPLOAD_FIELD: &str = "file";

impl AutoMlClient {
    /// `GET /datasets`
    pub async fn list_datasets(&self) -> Result<Vec<Dataset>, ClientError> {
        self.send_json(ApiRequest::get("/datasets")).await
    }

    /// `POST /datasets`
    pub async fn create_dataset(&self, request: &CreateDatasetRequest) -> Result<Dataset, ClientError> {
        self.send_json(ApiRequest::post("/datasets").json(request)?).await
    }

    /// Validates the file at `path` locally, then uploads it.
    ///
    /// Nothing is sent when validation fails.
    pub async fn upload_dataset(&self, path: &Path) -> Result<(FilePreview, UploadResponse), ClientError> {
        let (preview, content) = dataset_file::inspect_path(path).await?;
        let file_name = dataset_file::file_name_of(path);
        let response = self.upload_validated(&file_name, &preview, content).await?;
        Ok((preview, response))
    }

    /// Same as [`upload_dataset`](Self::upload_dataset) for in-memory content.
    pub async fn upload_dataset_bytes(
        &self,
        file_name: &str,
        content: Bytes,
    ) -> Result<(FilePreview, UploadResponse), ClientError> {
        let preview = dataset_file::inspect(file_name, &content)?;
        let response = self.upload_validated(file_name, &preview, content).await?;
        Ok((preview, response))
    }

    async fn upload_validated(
        &self,
        file_name: &str,
        preview: &FilePreview,
        content: Bytes,
    ) -> Result<UploadResponse, ClientError> {
        info!(
            "Uploading {} ({} bytes, {} columns)",
            file_name,
            content.len(),
            preview.columns.len()
        );
        let part = FilePart {
            field: UPLOAD_FIELD.to_string(),
            file_name: file_name.to_string(),
            content_type: Some(preview.format.mime_type().to_string()),
            data: content,
        };
        self.send_json(ApiRequest::post("/upload").multipart(Vec::new(), vec![part])).await
    }

    /// `GET /datasets/{id}/preview`
    pub async fn preview_dataset(&self, dataset_id: &ResourceId) -> Result<DatasetPreview, ClientError> {
        self.send_json(ApiRequest::get(format!("/datasets/{dataset_id}/preview"))).await
    }

    /// `POST /analyze/{id}`
    pub async fn analyze_dataset(&self, dataset_id: &ResourceId) -> Result<AnalysisReport, ClientError> {
        self.send_json(ApiRequest::post(format!("/analyze/{dataset_id}"))).await
    }
}
