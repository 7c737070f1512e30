//! Health reporting for the hit predictor service
//!
//! A missing or unreadable artifact does not take the service down: the
//! form keeps rendering, so the artifact component is reported as degraded
//! and readiness stays true.

use crate::predictor::AdapterState;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Health status of a component
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    Healthy,
    /// Still serving, with reduced functionality
    Degraded,
    Unhealthy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub status: ComponentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub updated_at: i64,
}

impl ComponentHealth {
    fn with_status(status: ComponentStatus, message: Option<String>) -> Self {
        Self {
            status,
            message,
            updated_at: chrono::Utc::now().timestamp(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: ComponentStatus,
    pub components: BTreeMap<String, ComponentHealth>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Component names for health tracking
pub mod components {
    pub const ARTIFACT: &str = "artifact";
    pub const HTTP: &str = "http";
}

/// Shared view of component health, cheap to clone
#[derive(Debug, Clone, Default)]
pub struct HealthRegistry {
    components: Arc<RwLock<BTreeMap<String, ComponentHealth>>>,
    started: Arc<RwLock<bool>>,
}

impl HealthRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set(&self, name: &str, status: ComponentStatus, message: Option<String>) {
        self.components
            .write()
            .await
            .insert(name.to_string(), ComponentHealth::with_status(status, message));
    }

    /// Reflect the adapter lifecycle in the artifact component
    pub async fn observe_artifact(&self, state: AdapterState, detail: Option<String>) {
        let (status, message) = match state {
            AdapterState::Loaded => (ComponentStatus::Healthy, None),
            AdapterState::Unloaded => (
                ComponentStatus::Degraded,
                Some("artifact not loaded yet".to_string()),
            ),
            AdapterState::LoadFailed => (
                ComponentStatus::Degraded,
                Some(detail.unwrap_or_else(|| "artifact failed to load".to_string())),
            ),
        };
        self.set(components::ARTIFACT, status, message).await;
    }

    /// Mark startup as finished
    pub async fn mark_started(&self) {
        *self.started.write().await = true;
    }

    /// Overall status is the worst component status
    pub async fn health(&self) -> HealthResponse {
        let components = self.components.read().await.clone();
        let status = components
            .values()
            .map(|c| c.status)
            .max()
            .unwrap_or(ComponentStatus::Healthy);
        HealthResponse { status, components }
    }

    pub async fn readiness(&self) -> ReadinessResponse {
        if !*self.started.read().await {
            return ReadinessResponse {
                ready: false,
                reason: Some("Service still starting".to_string()),
            };
        }
        match self.health().await.status {
            ComponentStatus::Unhealthy => ReadinessResponse {
                ready: false,
                reason: Some("Critical component unhealthy".to_string()),
            },
            _ => ReadinessResponse {
                ready: true,
                reason: None,
            },
        }
    }
}
