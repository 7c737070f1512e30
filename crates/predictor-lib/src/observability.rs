//! Observability infrastructure for the hit predictor
//!
//! Provides:
//! - Prometheus metrics (prediction latency, outcomes by label, errors by kind, artifact state)
//! - Structured logging of prediction lifecycle events with tracing

use crate::error::PredictorError;
use crate::models::{FeatureRecord, PredictionResult};
use prometheus::{
    register_histogram, register_int_counter, register_int_counter_vec, register_int_gauge,
    Histogram, IntCounter, IntCounterVec, IntGauge,
};
use std::path::Path;
use std::sync::OnceLock;
use tracing::{info, warn};

/// Histogram buckets for inference latency (in seconds)
const LATENCY_BUCKETS: &[f64] = &[
    0.0001, 0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25,
];

/// Histogram buckets for artifact load time (in seconds)
const LOAD_BUCKETS: &[f64] = &[0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<PredictorMetricsInner> = OnceLock::new();

struct PredictorMetricsInner {
    prediction_latency_seconds: Histogram,
    predictions_total: IntCounterVec,
    prediction_errors_total: IntCounterVec,
    validation_rejections_total: IntCounter,
    artifact_loaded: IntGauge,
    artifact_load_seconds: Histogram,
}

impl PredictorMetricsInner {
    fn new() -> Self {
        Self {
            prediction_latency_seconds: register_histogram!(
                "hit_predictor_prediction_latency_seconds",
                "Time spent running the classifier for one record",
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register prediction_latency_seconds"),

            predictions_total: register_int_counter_vec!(
                "hit_predictor_predictions_total",
                "Predictions served, by predicted label",
                &["label"]
            )
            .expect("Failed to register predictions_total"),

            prediction_errors_total: register_int_counter_vec!(
                "hit_predictor_prediction_errors_total",
                "Prediction attempts that failed, by error kind",
                &["kind"]
            )
            .expect("Failed to register prediction_errors_total"),

            validation_rejections_total: register_int_counter!(
                "hit_predictor_validation_rejections_total",
                "Input batches rejected before a record was built"
            )
            .expect("Failed to register validation_rejections_total"),

            artifact_loaded: register_int_gauge!(
                "hit_predictor_artifact_loaded",
                "1 when the model artifact is loaded, 0 otherwise"
            )
            .expect("Failed to register artifact_loaded"),

            artifact_load_seconds: register_histogram!(
                "hit_predictor_artifact_load_seconds",
                "Time spent reading and optimizing the model artifact",
                LOAD_BUCKETS.to_vec()
            )
            .expect("Failed to register artifact_load_seconds"),
        }
    }
}

/// Handle to the global Prometheus metrics.
///
/// Clones share the same underlying metrics.
#[derive(Clone)]
pub struct PredictorMetrics {
    _private: (),
}

impl Default for PredictorMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl PredictorMetrics {
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(PredictorMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &PredictorMetricsInner {
        GLOBAL_METRICS.get_or_init(PredictorMetricsInner::new)
    }

    pub fn observe_prediction(&self, result: &PredictionResult, duration_secs: f64) {
        let inner = self.inner();
        inner.prediction_latency_seconds.observe(duration_secs);
        inner
            .predictions_total
            .with_label_values(&[result.label.as_str()])
            .inc();
    }

    pub fn inc_prediction_error(&self, error: &PredictorError) {
        self.inner()
            .prediction_errors_total
            .with_label_values(&[error.kind()])
            .inc();
    }

    pub fn inc_validation_rejection(&self) {
        self.inner().validation_rejections_total.inc();
    }

    pub fn set_artifact_loaded(&self, loaded: bool, load_secs: f64) {
        let inner = self.inner();
        inner.artifact_loaded.set(i64::from(loaded));
        inner.artifact_load_seconds.observe(load_secs);
    }
}

/// Structured logger for service events
#[derive(Clone)]
pub struct EventLogger {
    instance: String,
}

impl EventLogger {
    pub fn new(instance: impl Into<String>) -> Self {
        Self {
            instance: instance.into(),
        }
    }

    pub fn log_startup(&self, version: &str, model_path: &Path) {
        info!(
            event = "service_started",
            instance = %self.instance,
            version = %version,
            model_path = %model_path.display(),
            "Hit predictor started"
        );
    }

    pub fn log_artifact_loaded(&self, model_path: &Path, sha256: &str, size_bytes: usize) {
        info!(
            event = "artifact_loaded",
            instance = %self.instance,
            model_path = %model_path.display(),
            sha256 = %sha256,
            size_bytes = size_bytes,
            "Model artifact ready"
        );
    }

    pub fn log_artifact_load_failed(&self, model_path: &Path, error: &PredictorError) {
        warn!(
            event = "artifact_load_failed",
            instance = %self.instance,
            model_path = %model_path.display(),
            kind = error.kind(),
            error = %error,
            "Model artifact unavailable, prediction disabled"
        );
    }

    pub fn log_prediction(&self, record: &FeatureRecord, result: &PredictionResult) {
        info!(
            event = "prediction",
            instance = %self.instance,
            label = %result.label,
            probability = result.probability,
            danceability = record.danceability,
            energy = record.energy,
            duration_ms = record.duration_ms,
            "Prediction served"
        );
    }

    pub fn log_prediction_failed(&self, error: &PredictorError) {
        warn!(
            event = "prediction_failed",
            instance = %self.instance,
            kind = error.kind(),
            error = %error,
            "Prediction attempt failed"
        );
    }

    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "service_shutdown",
            instance = %self.instance,
            reason = %reason,
            "Hit predictor shutting down"
        );
    }
}
