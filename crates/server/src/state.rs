//! Shared application state and the composition root's startup sequence

use predictor_lib::health::components;
use predictor_lib::predictor::PredictionAdapter;
use predictor_lib::{
    ComponentStatus, EventLogger, FeatureRecord, HealthRegistry, PredictionResult, PredictorError,
    PredictorMetrics,
};
use std::sync::Arc;
use std::time::Instant;

/// State shared by every request handler
#[derive(Clone)]
pub struct AppState {
    pub adapter: Arc<PredictionAdapter>,
    pub health_registry: HealthRegistry,
    pub metrics: PredictorMetrics,
    pub logger: EventLogger,
}

impl AppState {
    pub fn new(
        adapter: Arc<PredictionAdapter>,
        health_registry: HealthRegistry,
        metrics: PredictorMetrics,
        logger: EventLogger,
    ) -> Self {
        Self {
            adapter,
            health_registry,
            metrics,
            logger,
        }
    }

    /// Load the artifact once and publish the outcome to health and metrics.
    ///
    /// A failed load is logged and leaves the service running with
    /// prediction disabled.
    pub async fn initialize(&self) {
        let adapter = self.adapter.clone();
        let start = Instant::now();
        let outcome = tokio::task::spawn_blocking(move || adapter.load().map(|loaded| loaded.artifact.describe()))
            .await
            .unwrap_or_else(|e| {
                Err(PredictorError::ArtifactCorrupt {
                    path: self.adapter.model_path().to_path_buf(),
                    reason: format!("loader task failed: {}", e),
                })
            });
        let load_secs = start.elapsed().as_secs_f64();

        match &outcome {
            Ok(info) => {
                self.logger
                    .log_artifact_loaded(self.adapter.model_path(), &info.sha256, info.size_bytes);
                self.health_registry
                    .observe_artifact(self.adapter.state(), None)
                    .await;
            }
            Err(e) => {
                self.logger.log_artifact_load_failed(self.adapter.model_path(), e);
                self.health_registry
                    .observe_artifact(self.adapter.state(), Some(e.to_string()))
                    .await;
            }
        }
        self.metrics.set_artifact_loaded(outcome.is_ok(), load_secs);
        self.health_registry
            .set(components::HTTP, ComponentStatus::Healthy, None)
            .await;
        self.health_registry.mark_started().await;
    }

    /// Run one prediction on the blocking pool, recording metrics and log events
    pub async fn run_prediction(&self, record: &FeatureRecord) -> Result<PredictionResult, PredictorError> {
        let adapter = self.adapter.clone();
        let owned = *record;
        let start = Instant::now();
        let outcome = tokio::task::spawn_blocking(move || adapter.predict(&owned))
            .await
            .unwrap_or_else(|e| Err(PredictorError::InferenceError(format!("prediction task failed: {}", e))));

        match outcome {
            Ok(result) => {
                self.metrics
                    .observe_prediction(&result, start.elapsed().as_secs_f64());
                self.logger.log_prediction(record, &result);
                Ok(result)
            }
            Err(e) => {
                self.metrics.inc_prediction_error(&e);
                self.logger.log_prediction_failed(&e);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use predictor_lib::predictor::{ArtifactInfo, ModelArtifact};
    use predictor_lib::{ClassDistribution, FeatureRow, HitLabel};
    use std::sync::mpsc::{self, Receiver};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Blocks inside inference until released from the async side
    struct GatedArtifact {
        gate: Mutex<Receiver<()>>,
    }

    impl ModelArtifact for GatedArtifact {
        fn classify(&self, _row: &FeatureRow) -> anyhow::Result<HitLabel> {
            let gate = self.gate.lock().map_err(|_| anyhow::anyhow!("gate poisoned"))?;
            gate.recv_timeout(Duration::from_secs(5))?;
            Ok(HitLabel::Hit)
        }

        fn estimate_distribution(&self, _row: &FeatureRow) -> anyhow::Result<ClassDistribution> {
            Ok(ClassDistribution::new(0.2, 0.8))
        }

        fn describe(&self) -> ArtifactInfo {
            ArtifactInfo {
                format: "fixture".to_string(),
                path: "models/gated.onnx".to_string(),
                sha256: String::new(),
                size_bytes: 0,
            }
        }
    }

    #[tokio::test]
    async fn test_prediction_does_not_block_the_runtime() {
        let (release, gate) = mpsc::channel();
        let state = AppState::new(
            Arc::new(PredictionAdapter::with_artifact(Arc::new(GatedArtifact {
                gate: Mutex::new(gate),
            }))),
            HealthRegistry::new(),
            PredictorMetrics::new(),
            EventLogger::new("test"),
        );

        // Single-threaded runtime: the release only runs if inference is off this thread
        let releaser = async move {
            tokio::task::yield_now().await;
            release.send(()).unwrap();
        };
        let record = FeatureRecord::default();
        let (result, ()) = tokio::join!(state.run_prediction(&record), releaser);

        let result = result.unwrap();
        assert_eq!(result.label, HitLabel::Hit);
        assert_eq!(result.probability, 0.8);
    }
}
