use std::path::Path;

use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Client, Response,
};
use serde::de::DeserializeOwned;
use shared::{
    domain::{EvaluationResult, JobHistoryEntry, JobId},
    error::{ApiError, ApiException},
    protocol::{
        cv_upload_route, evaluate_route, job_description_route, jobs_route, results_route,
        CvUploadResponse, EvaluateResponse, JobUploadResponse, JobsResponse, ResultsResponse,
        CV_FILES_FIELD, JOB_DESCRIPTION_FIELD,
    },
};
use tracing::{debug, info};

pub mod error;
pub mod events;
pub mod progress;
pub mod render;
pub mod workflow;

pub use error::WorkflowError;
pub use events::{StatusKind, StatusRegion, Step, WorkflowEvent};
pub use progress::{ProgressConfig, ProgressTicker};
pub use workflow::{Session, Workflow, WorkflowOptions};

pub const PDF_MIME: &str = "application/pdf";
const FALLBACK_MIME: &str = "application/octet-stream";

/// A local file queued for upload, with the media type it declares.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub filename: String,
    pub mime_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(filename: impl Into<String>, mime_type: Option<&str>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            mime_type: mime_type.map(str::to_string),
            bytes,
        }
    }

    pub async fn from_path(path: &Path) -> std::io::Result<Self> {
        let filename = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("upload.bin")
            .to_string();
        let bytes = tokio::fs::read(path).await?;
        let mime_type = mime_guess::from_path(path).first_raw().map(str::to_string);
        Ok(Self {
            filename,
            mime_type,
            bytes,
        })
    }

    pub fn is_pdf(&self) -> bool {
        self.mime_type.as_deref() == Some(PDF_MIME)
    }

    fn into_part(self) -> Result<Part, ApiException> {
        let mime = self.mime_type.unwrap_or_else(|| FALLBACK_MIME.to_string());
        Part::bytes(self.bytes)
            .file_name(self.filename)
            .mime_str(&mime)
            .map_err(|e| ApiException::transport(format!("invalid media type '{mime}': {e}")))
    }
}

#[async_trait]
pub trait AssessmentApi: Send + Sync {
    async fn upload_job_description(
        &self,
        file: UploadFile,
    ) -> Result<JobUploadResponse, ApiException>;
    async fn upload_cvs(
        &self,
        job_id: &JobId,
        files: Vec<UploadFile>,
    ) -> Result<CvUploadResponse, ApiException>;
    async fn start_evaluation(&self, job_id: &JobId) -> Result<EvaluateResponse, ApiException>;
    async fn fetch_results(&self, job_id: &JobId)
        -> Result<Vec<EvaluationResult>, ApiException>;
    async fn fetch_job_history(&self) -> Result<Vec<JobHistoryEntry>, ApiException>;
}

/// HTTP client for the assessment service.
pub struct AssessmentClient {
    http: Client,
    server_url: String,
}

impl AssessmentClient {
    pub fn new(server_url: impl Into<String>) -> Self {
        Self::with_http_client(Client::new(), server_url)
    }

    pub fn with_http_client(http: Client, server_url: impl Into<String>) -> Self {
        let server_url = server_url.into().trim_end_matches('/').to_string();
        Self { http, server_url }
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    fn url(&self, route: &str) -> String {
        format!("{}{route}", self.server_url)
    }
}

fn transport_error(err: reqwest::Error) -> ApiException {
    ApiException::transport(err.to_string())
}

async fn decode_response<T: DeserializeOwned>(response: Response) -> Result<T, ApiException> {
    let status = response.status();
    let body = response.bytes().await.map_err(transport_error)?;

    if status.is_success() {
        return serde_json::from_slice(&body).map_err(|e| {
            ApiException::transport(format!("unexpected response from server: {e}"))
        });
    }

    let detail = serde_json::from_slice::<ApiError>(&body)
        .ok()
        .and_then(|error| error.detail_text())
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .map(str::to_string)
                .unwrap_or_else(|| format!("server returned status {}", status.as_u16()))
        });
    debug!(status = status.as_u16(), %detail, "assessment api request failed");
    Err(ApiException::server(status.as_u16(), detail))
}

#[async_trait]
impl AssessmentApi for AssessmentClient {
    async fn upload_job_description(
        &self,
        file: UploadFile,
    ) -> Result<JobUploadResponse, ApiException> {
        info!(filename = %file.filename, bytes = file.bytes.len(), "uploading job description");
        let form = Form::new().part(JOB_DESCRIPTION_FIELD, file.into_part()?);
        let response = self
            .http
            .post(self.url(job_description_route()))
            .multipart(form)
            .send()
            .await
            .map_err(transport_error)?;
        decode_response(response).await
    }

    async fn upload_cvs(
        &self,
        job_id: &JobId,
        files: Vec<UploadFile>,
    ) -> Result<CvUploadResponse, ApiException> {
        info!(job_id = %job_id, count = files.len(), "uploading cvs");
        let mut form = Form::new();
        for file in files {
            form = form.part(CV_FILES_FIELD, file.into_part()?);
        }
        let response = self
            .http
            .post(self.url(&cv_upload_route(job_id)))
            .multipart(form)
            .send()
            .await
            .map_err(transport_error)?;
        decode_response(response).await
    }

    async fn start_evaluation(&self, job_id: &JobId) -> Result<EvaluateResponse, ApiException> {
        info!(job_id = %job_id, "starting evaluation");
        let response = self
            .http
            .post(self.url(&evaluate_route(job_id)))
            .send()
            .await
            .map_err(transport_error)?;
        decode_response(response).await
    }

    async fn fetch_results(
        &self,
        job_id: &JobId,
    ) -> Result<Vec<EvaluationResult>, ApiException> {
        let response = self
            .http
            .get(self.url(&results_route(job_id)))
            .send()
            .await
            .map_err(transport_error)?;
        let body: ResultsResponse = decode_response(response).await?;
        Ok(body.results)
    }

    async fn fetch_job_history(&self) -> Result<Vec<JobHistoryEntry>, ApiException> {
        let response = self
            .http
            .get(self.url(jobs_route()))
            .send()
            .await
            .map_err(transport_error)?;
        let body: JobsResponse = decode_response(response).await?;
        Ok(body.jobs)
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
