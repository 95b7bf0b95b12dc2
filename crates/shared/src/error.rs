use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    Validation,
    Transport,
    Server,
}

/// Error body returned by the assessment service on non-2xx responses.
///
/// `detail` is usually a string, but request validation failures carry a
/// structured list instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    #[serde(default)]
    pub detail: Option<Value>,
}

impl ApiError {
    pub fn detail_text(&self) -> Option<String> {
        match &self.detail {
            None | Some(Value::Null) => None,
            Some(Value::String(text)) => Some(text.clone()),
            Some(other) => Some(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("{detail}")]
pub struct ApiException {
    pub category: ErrorCategory,
    pub status: Option<u16>,
    pub detail: String,
}

impl ApiException {
    pub fn server(status: u16, detail: impl Into<String>) -> Self {
        Self {
            category: ErrorCategory::Server,
            status: Some(status),
            detail: detail.into(),
        }
    }

    pub fn transport(detail: impl Into<String>) -> Self {
        Self {
            category: ErrorCategory::Transport,
            status: None,
            detail: detail.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_detail_is_used_verbatim() {
        let body: ApiError =
            serde_json::from_str(r#"{"detail":"Only PDF files are allowed"}"#).expect("decode");
        assert_eq!(
            body.detail_text().as_deref(),
            Some("Only PDF files are allowed")
        );
    }

    #[test]
    fn structured_detail_is_rendered_as_json() {
        let body: ApiError =
            serde_json::from_str(r#"{"detail":[{"msg":"field required"}]}"#).expect("decode");
        assert_eq!(
            body.detail_text().as_deref(),
            Some(r#"[{"msg":"field required"}]"#)
        );
    }

    #[test]
    fn missing_detail_yields_none() {
        let body: ApiError = serde_json::from_str("{}").expect("decode");
        assert_eq!(body.detail_text(), None);
    }
}
