//! Upload and evaluation workflow.
//!
//! Stages advance Idle -> JobReady -> CvsReady -> Evaluated. Every transition
//! publishes [`WorkflowEvent`]s so a front end can mirror the state without
//! reaching into the controller.

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use serde::{Deserialize, Serialize};
use shared::domain::{CvDescriptor, EvaluationResult, JobHistoryEntry, JobId, Stage};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

use crate::{
    error::WorkflowError,
    events::{StatusKind, StatusRegion, Step, WorkflowEvent},
    progress::{ProgressConfig, ProgressTicker, COMPLETE},
    render::sort_results,
    AssessmentApi, UploadFile,
};

const EVENT_CAPACITY: usize = 1024;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub stage: Stage,
    pub current_job_id: Option<JobId>,
    pub uploaded_cvs: Vec<CvDescriptor>,
}

impl Session {
    pub fn can_upload_cvs(&self) -> bool {
        self.current_job_id.is_some()
    }

    pub fn can_evaluate(&self) -> bool {
        self.current_job_id.is_some() && !self.uploaded_cvs.is_empty()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct WorkflowOptions {
    pub progress: ProgressConfig,
    /// Pause between a finished evaluation and fetching its results.
    pub results_delay: Duration,
}

impl Default for WorkflowOptions {
    fn default() -> Self {
        Self {
            progress: ProgressConfig::default(),
            results_delay: Duration::from_millis(1_000),
        }
    }
}

pub struct Workflow {
    api: Arc<dyn AssessmentApi>,
    options: WorkflowOptions,
    session: Mutex<Session>,
    evaluation_trigger_enabled: AtomicBool,
    events: broadcast::Sender<WorkflowEvent>,
}

/// Re-enables the evaluation trigger when dropped, including when the
/// evaluation future is cancelled mid-request.
struct TriggerGuard<'a> {
    workflow: &'a Workflow,
}

impl<'a> TriggerGuard<'a> {
    fn disable(workflow: &'a Workflow) -> Self {
        workflow.set_trigger_enabled(false);
        Self { workflow }
    }
}

impl Drop for TriggerGuard<'_> {
    fn drop(&mut self) {
        self.workflow.set_trigger_enabled(true);
    }
}

impl Workflow {
    pub fn new(api: Arc<dyn AssessmentApi>, options: WorkflowOptions) -> Self {
        Self::resume(api, options, Session::default())
    }

    pub fn resume(api: Arc<dyn AssessmentApi>, options: WorkflowOptions, session: Session) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            api,
            options,
            session: Mutex::new(session),
            evaluation_trigger_enabled: AtomicBool::new(true),
            events,
        }
    }

    /// Builds a fresh workflow and loads the job history once, as a newly
    /// opened page would.
    pub async fn open(api: Arc<dyn AssessmentApi>, options: WorkflowOptions) -> Self {
        let workflow = Self::new(api, options);
        workflow.load_job_history().await;
        workflow
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<WorkflowEvent> {
        self.events.subscribe()
    }

    pub async fn session(&self) -> Session {
        self.session.lock().await.clone()
    }

    pub async fn stage(&self) -> Stage {
        self.session.lock().await.stage
    }

    pub fn evaluation_trigger_enabled(&self) -> bool {
        self.evaluation_trigger_enabled.load(Ordering::SeqCst)
    }

    fn emit(&self, event: WorkflowEvent) {
        let _ = self.events.send(event);
    }

    fn status(&self, region: StatusRegion, kind: StatusKind, message: impl Into<String>) {
        self.emit(WorkflowEvent::status(region, kind, message));
    }

    fn fail(&self, region: StatusRegion, err: WorkflowError) -> WorkflowError {
        self.status(region, StatusKind::Error, err.status_text());
        err
    }

    /// Uploads a job description. Files that do not declare a PDF media type
    /// are ignored and yield `Ok(None)`.
    pub async fn submit_job_description(
        &self,
        file: UploadFile,
    ) -> Result<Option<JobId>, WorkflowError> {
        if !file.is_pdf() {
            debug!(filename = %file.filename, mime_type = ?file.mime_type, "ignoring non-pdf job description");
            return Ok(None);
        }

        self.status(
            StatusRegion::Job,
            StatusKind::Info,
            "Uploading job description...",
        );

        let response = match self.api.upload_job_description(file).await {
            Ok(response) => response,
            Err(err) => return Err(self.fail(StatusRegion::Job, err.into())),
        };

        {
            let mut guard = self.session.lock().await;
            guard.current_job_id = Some(response.job_id.clone());
            guard.stage = Stage::JobReady;
        }
        info!(job_id = %response.job_id, "job description uploaded");

        self.status(
            StatusRegion::Job,
            StatusKind::Success,
            format!("✅ {}", response.message),
        );
        self.emit(WorkflowEvent::StepShown(Step::CvUpload));
        self.load_job_history().await;

        Ok(Some(response.job_id))
    }

    /// Uploads CVs against the current job. Non-PDF files are dropped first;
    /// if nothing is left the call is a no-op returning `Ok(None)`.
    pub async fn submit_cvs(
        &self,
        files: Vec<UploadFile>,
    ) -> Result<Option<Vec<CvDescriptor>>, WorkflowError> {
        let total = files.len();
        let files: Vec<UploadFile> = files.into_iter().filter(UploadFile::is_pdf).collect();
        if files.is_empty() {
            debug!(total, "no pdf files among selected cvs");
            return Ok(None);
        }
        if files.len() < total {
            debug!(dropped = total - files.len(), "ignoring non-pdf cvs");
        }

        let job_id = self.session.lock().await.current_job_id.clone();
        let Some(job_id) = job_id else {
            return Err(self.fail(StatusRegion::Cvs, WorkflowError::JobRequired));
        };

        self.status(StatusRegion::Cvs, StatusKind::Info, "Uploading CVs...");

        let response = match self.api.upload_cvs(&job_id, files).await {
            Ok(response) => response,
            Err(err) => return Err(self.fail(StatusRegion::Cvs, err.into())),
        };

        {
            let mut guard = self.session.lock().await;
            guard.uploaded_cvs = response.uploaded_cvs.clone();
            guard.stage = Stage::CvsReady;
        }
        info!(job_id = %job_id, count = response.uploaded_cvs.len(), "cvs uploaded");

        self.status(
            StatusRegion::Cvs,
            StatusKind::Success,
            format!("✅ {}", response.message),
        );
        self.emit(WorkflowEvent::CvsListed(response.uploaded_cvs.clone()));
        self.emit(WorkflowEvent::StepShown(Step::Evaluation));

        Ok(Some(response.uploaded_cvs))
    }

    /// Runs a server-side evaluation for the current job and, on success,
    /// loads its results.
    ///
    /// The trigger is disabled for the whole call and re-enabled on every
    /// exit path once the request has been started, including when the
    /// returned future is dropped early. The controller does not reject
    /// overlapping calls itself; front ends honour the trigger flag.
    pub async fn start_evaluation(&self) -> Result<(), WorkflowError> {
        let job_id = {
            let guard = self.session.lock().await;
            if !guard.can_evaluate() {
                None
            } else {
                guard.current_job_id.clone()
            }
        };
        let Some(job_id) = job_id else {
            return Err(self.fail(
                StatusRegion::Evaluation,
                WorkflowError::EvaluationPrerequisites,
            ));
        };

        let _trigger = TriggerGuard::disable(self);
        self.emit(WorkflowEvent::ProgressShown);
        self.status(
            StatusRegion::Evaluation,
            StatusKind::Info,
            "Starting evaluation...",
        );

        self.run_evaluation(&job_id).await
    }

    async fn run_evaluation(&self, job_id: &JobId) -> Result<(), WorkflowError> {
        let ticker = ProgressTicker::start(self.options.progress, self.events.clone());
        let response = self.api.start_evaluation(job_id).await;
        ticker.stop().await;

        let response = match response {
            Ok(response) => response,
            Err(err) => {
                warn!(job_id = %job_id, error = %err, "evaluation failed");
                return Err(self.fail(StatusRegion::Evaluation, err.into()));
            }
        };
        info!(job_id = %job_id, message = %response.message, evaluated = response.results.len(), "evaluation finished");

        self.emit(WorkflowEvent::Progress(COMPLETE));
        self.status(
            StatusRegion::Evaluation,
            StatusKind::Success,
            "✅ Evaluation completed!",
        );

        tokio::time::sleep(self.options.results_delay).await;

        self.load_results_for(job_id).await;

        {
            let mut guard = self.session.lock().await;
            if guard.current_job_id.as_ref() != Some(job_id) {
                debug!(job_id = %job_id, current = ?guard.current_job_id, "job changed during evaluation; stage left as is");
                return Ok(());
            }
            guard.stage = Stage::Evaluated;
        }
        self.emit(WorkflowEvent::StepShown(Step::Results));
        Ok(())
    }

    fn set_trigger_enabled(&self, enabled: bool) {
        self.evaluation_trigger_enabled.store(enabled, Ordering::SeqCst);
        self.emit(WorkflowEvent::EvaluationTrigger { enabled });
    }

    /// Fetches results for the current job, sorted for display. Failures are
    /// logged and leave whatever was rendered before untouched.
    pub async fn load_results(&self) -> Option<Vec<EvaluationResult>> {
        let job_id = self.session.lock().await.current_job_id.clone()?;
        self.load_results_for(&job_id).await
    }

    async fn load_results_for(&self, job_id: &JobId) -> Option<Vec<EvaluationResult>> {
        match self.api.fetch_results(job_id).await {
            Ok(mut results) => {
                sort_results(&mut results);
                self.emit(WorkflowEvent::ResultsRendered(results.clone()));
                Some(results)
            }
            Err(err) => {
                warn!(job_id = %job_id, error = %err, "failed to load results");
                None
            }
        }
    }

    /// Refreshes job history. Failures are logged and otherwise ignored.
    pub async fn load_job_history(&self) -> Option<Vec<JobHistoryEntry>> {
        match self.api.fetch_job_history().await {
            Ok(jobs) => {
                let active_job = self.session.lock().await.current_job_id.clone();
                self.emit(WorkflowEvent::JobHistoryUpdated {
                    jobs: jobs.clone(),
                    active_job,
                });
                Some(jobs)
            }
            Err(err) => {
                warn!(error = %err, "failed to load job history");
                None
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/workflow_tests.rs"]
mod tests;
