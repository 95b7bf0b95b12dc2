//! Terminal rendering of workflow events.

use client_core::{
    render::{render_cv_list, render_job_history, render_results},
    StatusRegion, WorkflowEvent,
};
use tokio::{
    sync::broadcast::{self, error::RecvError},
    task::JoinHandle,
};
use tracing::warn;

fn region_label(region: StatusRegion) -> &'static str {
    match region {
        StatusRegion::Job => "job",
        StatusRegion::Cvs => "cvs",
        StatusRegion::Evaluation => "evaluation",
    }
}

pub fn format_event(event: &WorkflowEvent) -> Option<String> {
    match event {
        WorkflowEvent::Status {
            region, message, ..
        } => Some(format!("[{}] {message}", region_label(*region))),
        WorkflowEvent::Progress(value) => Some(format!(
            "Evaluating candidates... {}%",
            value.round() as u32
        )),
        WorkflowEvent::CvsListed(cvs) => Some(format!("Uploaded CVs:\n{}", render_cv_list(cvs))),
        WorkflowEvent::ResultsRendered(results) => {
            Some(format!("Results:\n{}", render_results(results)))
        }
        WorkflowEvent::JobHistoryUpdated { jobs, active_job } => Some(format!(
            "Job history:\n{}",
            render_job_history(jobs, active_job.as_ref())
        )),
        WorkflowEvent::StepShown(_)
        | WorkflowEvent::EvaluationTrigger { .. }
        | WorkflowEvent::ProgressShown => None,
    }
}

/// Prints events until every sender is gone.
pub fn spawn(mut events: broadcast::Receiver<WorkflowEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => {
                    if let Some(line) = format_event(&event) {
                        println!("{}", line.trim_end());
                    }
                }
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "event printer fell behind"),
                Err(RecvError::Closed) => break,
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use client_core::{StatusKind, Step};
    use shared::domain::{JobHistoryEntry, JobId};

    #[test]
    fn statuses_are_prefixed_with_their_region() {
        let line = format_event(&WorkflowEvent::status(
            StatusRegion::Cvs,
            StatusKind::Error,
            "❌ Please upload job description first",
        ));
        assert_eq!(
            line.as_deref(),
            Some("[cvs] ❌ Please upload job description first")
        );
    }

    #[test]
    fn progress_is_rounded() {
        assert_eq!(
            format_event(&WorkflowEvent::Progress(42.6)).as_deref(),
            Some("Evaluating candidates... 43%")
        );
    }

    #[test]
    fn ui_only_events_print_nothing() {
        assert_eq!(format_event(&WorkflowEvent::StepShown(Step::Results)), None);
        assert_eq!(
            format_event(&WorkflowEvent::EvaluationTrigger { enabled: false }),
            None
        );
    }

    #[test]
    fn job_history_highlights_active_job() {
        let line = format_event(&WorkflowEvent::JobHistoryUpdated {
            jobs: vec![JobHistoryEntry {
                id: JobId::from("J1"),
                filename: "backend.pdf".into(),
                created_at: None,
                cv_count: 2,
                evaluated_count: 2,
            }],
            active_job: Some(JobId::from("J1")),
        })
        .expect("printed");
        assert!(line.contains("* backend (J1)"));
    }
}
