use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

id_newtype!(JobId);
id_newtype!(CvId);

/// Workflow stages, ordered by how far a job has progressed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    #[default]
    Idle,
    JobReady,
    CvsReady,
    Evaluated,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CvDescriptor {
    pub filename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cv_id: Option<CvId>,
}

/// Per-CV scoring as stored by the assessment service.
///
/// Scores sit in a 0-10 range. `None` means the score was never computed,
/// which is different from a zero score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cv_id: Option<CvId>,
    pub filename: String,
    #[serde(default)]
    pub overall_score: Option<f64>,
    #[serde(default)]
    pub skill_score: Option<f64>,
    #[serde(default)]
    pub cultural_score: Option<f64>,
    #[serde(default)]
    pub skill_assessment: Option<String>,
    #[serde(default)]
    pub cultural_assessment: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub recommendation: Option<String>,
    #[serde(default)]
    pub has_error: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evaluated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobHistoryEntry {
    pub id: JobId,
    pub filename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default)]
    pub cv_count: u32,
    #[serde(default)]
    pub evaluated_count: u32,
}
