//! Hit predictor library
//!
//! This crate provides the core functionality for:
//! - Collecting and validating the 13 song descriptors
//! - Loading a trained classification pipeline exported to ONNX
//! - Turning classifier output into a display-ready verdict
//! - Health checks and observability

pub mod collector;
pub mod error;
pub mod health;
pub mod models;
pub mod observability;
pub mod predictor;

pub use error::{FieldIssue, PredictorError, ValidationError};
pub use health::{ComponentHealth, ComponentStatus, HealthRegistry, HealthResponse, ReadinessResponse};
pub use models::*;
pub use observability::{EventLogger, PredictorMetrics};
