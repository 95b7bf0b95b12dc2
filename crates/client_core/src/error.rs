use shared::error::{ApiException, ErrorCategory};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum WorkflowError {
    #[error("Please upload job description first")]
    JobRequired,
    #[error("Please upload job description and CVs first")]
    EvaluationPrerequisites,
    #[error(transparent)]
    Api(#[from] ApiException),
}

impl WorkflowError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::JobRequired | Self::EvaluationPrerequisites => ErrorCategory::Validation,
            Self::Api(err) => err.category,
        }
    }

    /// Text shown in the status region of the step that failed.
    pub fn status_text(&self) -> String {
        match self {
            Self::Api(err) => format!("❌ Error: {}", err.detail),
            other => format!("❌ {other}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_have_no_error_prefix() {
        assert_eq!(
            WorkflowError::JobRequired.status_text(),
            "❌ Please upload job description first"
        );
        assert_eq!(
            WorkflowError::EvaluationPrerequisites.category(),
            ErrorCategory::Validation
        );
    }

    #[test]
    fn api_errors_surface_server_detail() {
        let err = WorkflowError::from(ApiException::server(404, "Job description not found"));
        assert_eq!(err.category(), ErrorCategory::Server);
        assert_eq!(err.status_text(), "❌ Error: Job description not found");
    }
}
