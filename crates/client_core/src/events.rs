//! Presentation events published by the workflow controller.

use shared::domain::{CvDescriptor, EvaluationResult, JobHistoryEntry, JobId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusRegion {
    Job,
    Cvs,
    Evaluation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Success,
    Error,
}

/// Steps revealed as the workflow advances. The job step is always visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    CvUpload,
    Evaluation,
    Results,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowEvent {
    Status {
        region: StatusRegion,
        kind: StatusKind,
        message: String,
    },
    StepShown(Step),
    EvaluationTrigger {
        enabled: bool,
    },
    ProgressShown,
    Progress(f64),
    CvsListed(Vec<CvDescriptor>),
    /// Results in display order.
    ResultsRendered(Vec<EvaluationResult>),
    JobHistoryUpdated {
        jobs: Vec<JobHistoryEntry>,
        active_job: Option<JobId>,
    },
}

impl WorkflowEvent {
    pub fn status(region: StatusRegion, kind: StatusKind, message: impl Into<String>) -> Self {
        Self::Status {
            region,
            kind,
            message: message.into(),
        }
    }
}
