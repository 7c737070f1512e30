//! Prediction adapter
//!
//! Owns the process-wide artifact handle and bridges feature records to it.
//! The artifact is loaded at most once; a failed load is remembered and
//! every later prediction short-circuits instead of retrying.

use super::{load_artifact, ArtifactInfo, ModelArtifact};
use crate::error::PredictorError;
use crate::models::{FeatureRecord, FeatureRow, PredictionResult};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Artifact location relative to the working directory
pub const DEFAULT_MODEL_PATH: &str = "models/spotify_model_pipeline.onnx";

/// Inference latency above which a warning is logged
const MAX_INFERENCE_MS: u128 = 50;

type Loader = Box<dyn Fn(&Path) -> Result<Arc<dyn ModelArtifact>, PredictorError> + Send + Sync>;

/// Lifecycle of the adapter's artifact handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AdapterState {
    Unloaded,
    Loaded,
    LoadFailed,
}

/// A successfully loaded artifact
#[derive(Clone)]
pub struct LoadedArtifact {
    pub artifact: Arc<dyn ModelArtifact>,
    pub loaded_at: DateTime<Utc>,
}

/// Inference statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InferenceStats {
    pub total_inferences: u64,
    pub failed_inferences: u64,
    pub slow_inferences: u64,
}

pub struct PredictionAdapter {
    model_path: PathBuf,
    loader: Loader,
    slot: OnceLock<Result<LoadedArtifact, PredictorError>>,
    inference_count: AtomicU64,
    failed_count: AtomicU64,
    slow_inference_count: AtomicU64,
}

impl PredictionAdapter {
    /// Adapter for the ONNX artifact at `model_path`, not yet loaded
    pub fn new(model_path: impl Into<PathBuf>) -> Self {
        Self::with_loader(model_path, load_artifact)
    }

    /// Adapter with a custom artifact loader, not yet loaded
    pub fn with_loader<F>(model_path: impl Into<PathBuf>, loader: F) -> Self
    where
        F: Fn(&Path) -> Result<Arc<dyn ModelArtifact>, PredictorError> + Send + Sync + 'static,
    {
        Self {
            model_path: model_path.into(),
            loader: Box::new(loader),
            slot: OnceLock::new(),
            inference_count: AtomicU64::new(0),
            failed_count: AtomicU64::new(0),
            slow_inference_count: AtomicU64::new(0),
        }
    }

    /// Adapter wrapping an artifact that is already in memory
    pub fn with_artifact(artifact: Arc<dyn ModelArtifact>) -> Self {
        let path = PathBuf::from(artifact.describe().path);
        let adapter = Self::with_loader(path, |path: &Path| {
            Err(PredictorError::ArtifactNotFound {
                path: path.to_path_buf(),
            })
        });
        let _ = adapter.slot.set(Ok(LoadedArtifact {
            artifact,
            loaded_at: Utc::now(),
        }));
        adapter
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    /// Load the artifact on first call; later calls return the cached outcome
    pub fn load(&self) -> Result<LoadedArtifact, PredictorError> {
        self.slot
            .get_or_init(|| {
                let start = Instant::now();
                let outcome = (self.loader)(&self.model_path).map(|artifact| LoadedArtifact {
                    artifact,
                    loaded_at: Utc::now(),
                });
                match &outcome {
                    Ok(_) => info!(
                        path = %self.model_path.display(),
                        elapsed_ms = start.elapsed().as_millis(),
                        "Model artifact loaded"
                    ),
                    Err(e) => warn!(
                        path = %self.model_path.display(),
                        error = %e,
                        "Model artifact unavailable, predictions disabled"
                    ),
                }
                outcome
            })
            .clone()
    }

    pub fn state(&self) -> AdapterState {
        match self.slot.get() {
            None => AdapterState::Unloaded,
            Some(Ok(_)) => AdapterState::Loaded,
            Some(Err(_)) => AdapterState::LoadFailed,
        }
    }

    pub fn is_available(&self) -> bool {
        self.state() == AdapterState::Loaded
    }

    /// The cached load failure, if loading was attempted and failed
    pub fn load_error(&self) -> Option<&PredictorError> {
        self.slot.get().and_then(|outcome| outcome.as_ref().err())
    }

    pub fn loaded_artifact(&self) -> Option<&LoadedArtifact> {
        self.slot.get().and_then(|outcome| outcome.as_ref().ok())
    }

    pub fn artifact_info(&self) -> Option<ArtifactInfo> {
        self.loaded_artifact().map(|loaded| loaded.artifact.describe())
    }

    /// Classify a record
    pub fn predict(&self, record: &FeatureRecord) -> Result<PredictionResult, PredictorError> {
        self.predict_row(&record.to_row())
    }

    /// Classify a positional row after checking its layout
    pub fn predict_row(&self, row: &FeatureRow) -> Result<PredictionResult, PredictorError> {
        let loaded = self.load().map_err(|e| PredictorError::ModelUnavailable {
            reason: e.to_string(),
        })?;

        if let Some(problem) = row.schema_mismatch() {
            return Err(self.inference_failure(format!("input shape rejected: {}", problem)));
        }

        let artifact = loaded.artifact.as_ref();
        let start = Instant::now();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| artifact.infer(row)));
        let elapsed = start.elapsed();
        self.inference_count.fetch_add(1, Ordering::Relaxed);

        if elapsed.as_millis() > MAX_INFERENCE_MS {
            self.slow_inference_count.fetch_add(1, Ordering::Relaxed);
            warn!(elapsed_ms = elapsed.as_millis(), "Inference exceeded {}ms target", MAX_INFERENCE_MS);
        } else {
            debug!(elapsed_us = elapsed.as_micros(), "Inference completed");
        }

        let (label, distribution) = match outcome {
            Ok(Ok(prediction)) => prediction,
            Ok(Err(e)) => return Err(self.inference_failure(format!("{:#}", e))),
            Err(payload) => return Err(self.inference_failure(panic_message(payload.as_ref()))),
        };

        if !distribution.is_normalized() {
            return Err(self.inference_failure(format!(
                "class probabilities flop={:.4} hit={:.4} do not form a distribution",
                distribution.flop, distribution.hit
            )));
        }

        Ok(PredictionResult::from_distribution(label, &distribution))
    }

    pub fn stats(&self) -> InferenceStats {
        InferenceStats {
            total_inferences: self.inference_count.load(Ordering::Relaxed),
            failed_inferences: self.failed_count.load(Ordering::Relaxed),
            slow_inferences: self.slow_inference_count.load(Ordering::Relaxed),
        }
    }

    fn inference_failure(&self, message: String) -> PredictorError {
        self.failed_count.fetch_add(1, Ordering::Relaxed);
        warn!(error = %message, "Inference failed");
        PredictorError::InferenceError(message)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("artifact panicked: {}", message)
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("artifact panicked: {}", message)
    } else {
        "artifact panicked".to_string()
    }
}
