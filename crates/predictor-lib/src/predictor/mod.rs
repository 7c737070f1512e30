//! Prediction adapter and model artifacts

mod adapter;
mod onnx;
mod output;

pub use adapter::{AdapterState, InferenceStats, LoadedArtifact, PredictionAdapter, DEFAULT_MODEL_PATH};
pub use onnx::{load_artifact, OnnxArtifact};
pub use output::{
    format_percent, format_result, unavailable_message, BannerStyle, ResultView,
};

use crate::models::{ClassDistribution, FeatureRow, HitLabel};
use anyhow::Result;
use serde::Serialize;

/// A trained classifier loaded from disk.
///
/// Implementations must be read-only after construction: one handle is
/// shared by every request for the lifetime of the process.
pub trait ModelArtifact: Send + Sync {
    /// Predicted class for a single row
    fn classify(&self, row: &FeatureRow) -> Result<HitLabel>;

    /// Probability mass per class for a single row
    fn estimate_distribution(&self, row: &FeatureRow) -> Result<ClassDistribution>;

    /// Label and distribution from one evaluation of the row.
    ///
    /// Artifacts that produce both from a single pass should override this.
    fn infer(&self, row: &FeatureRow) -> Result<(HitLabel, ClassDistribution)> {
        Ok((self.classify(row)?, self.estimate_distribution(row)?))
    }

    /// Provenance of the loaded artifact
    fn describe(&self) -> ArtifactInfo;
}

/// Where an artifact came from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArtifactInfo {
    pub format: String,
    pub path: String,
    pub sha256: String,
    pub size_bytes: usize,
}
