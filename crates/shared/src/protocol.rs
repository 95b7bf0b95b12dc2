use serde::{Deserialize, Serialize};

use crate::domain::{CvDescriptor, CvId, EvaluationResult, JobHistoryEntry, JobId};

pub const JOB_DESCRIPTION_FIELD: &str = "file";
pub const CV_FILES_FIELD: &str = "files";

pub fn job_description_route() -> &'static str {
    "/upload/job-description"
}

pub fn cv_upload_route(job_id: &JobId) -> String {
    format!("/upload/cvs/{job_id}")
}

pub fn evaluate_route(job_id: &JobId) -> String {
    format!("/evaluate/{job_id}")
}

pub fn results_route(job_id: &JobId) -> String {
    format!("/results/{job_id}")
}

pub fn jobs_route() -> &'static str {
    "/jobs"
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobUploadResponse {
    pub job_id: JobId,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CvUploadResponse {
    pub uploaded_cvs: Vec<CvDescriptor>,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationStatus {
    pub cv_id: CvId,
    pub filename: String,
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluateResponse {
    pub message: String,
    #[serde(default)]
    pub results: Vec<EvaluationStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultsResponse {
    #[serde(default)]
    pub results: Vec<EvaluationResult>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobsResponse {
    #[serde(default)]
    pub jobs: Vec<JobHistoryEntry>,
}
