//! Hit predictor web service
//!
//! Serves the interactive prediction form, a JSON prediction API and
//! health/metrics endpoints on top of `predictor-lib`.

pub mod api;
pub mod config;
pub mod page;
pub mod state;

pub use api::create_router;
pub use state::AppState;
