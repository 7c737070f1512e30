//! Error types for the prediction pipeline

use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Failures surfaced by the collector and the prediction adapter
#[derive(Error, Debug, Clone)]
pub enum PredictorError {
    /// Artifact file missing at the configured path
    #[error("model artifact not found at {}", .path.display())]
    ArtifactNotFound { path: PathBuf },

    /// Artifact present but unreadable or not a usable model
    #[error("model artifact at {} could not be loaded: {reason}", .path.display())]
    ArtifactCorrupt { path: PathBuf, reason: String },

    /// Artifact rejected the input or failed while computing
    #[error("inference failed: {0}")]
    InferenceError(String),

    /// No artifact is loaded, so inference was not attempted
    #[error("model unavailable: {reason}")]
    ModelUnavailable { reason: String },

    /// Raw input did not describe a valid feature record
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl PredictorError {
    /// Stable short name, used for metric labels and API payloads
    pub fn kind(&self) -> &'static str {
        match self {
            PredictorError::ArtifactNotFound { .. } => "artifact_not_found",
            PredictorError::ArtifactCorrupt { .. } => "artifact_corrupt",
            PredictorError::InferenceError(_) => "inference_error",
            PredictorError::ModelUnavailable { .. } => "model_unavailable",
            PredictorError::Validation(_) => "validation",
        }
    }
}

/// A single rejected field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldIssue {
    pub field: String,
    pub reason: String,
}

impl FieldIssue {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Every problem found in one batch of raw input
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("invalid input: {}", describe_issues(.issues))]
pub struct ValidationError {
    pub issues: Vec<FieldIssue>,
}

impl ValidationError {
    pub fn single(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            issues: vec![FieldIssue::new(field, reason)],
        }
    }

    pub fn mentions(&self, field: &str) -> bool {
        self.issues.iter().any(|issue| issue.field == field)
    }
}

fn describe_issues(issues: &[FieldIssue]) -> String {
    issues
        .iter()
        .map(|issue| format!("{} {}", issue.field, issue.reason))
        .collect::<Vec<_>>()
        .join("; ")
}
