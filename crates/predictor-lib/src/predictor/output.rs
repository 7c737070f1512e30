//! Prediction output formatting
//!
//! Turns a `PredictionResult` into the pieces the result surface shows:
//! a styled banner, a 0-100 progress value and a one-line confidence statement.

use crate::models::{HitLabel, PredictionResult};
use serde::Serialize;
use std::path::Path;

/// Visual treatment of the result banner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BannerStyle {
    Success,
    Error,
}

/// Display-ready prediction
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultView {
    pub label: HitLabel,
    pub headline: String,
    pub style: BannerStyle,
    pub progress_percent: u8,
    pub confidence_text: String,
}

/// Format a probability as a percentage with two decimals, e.g. `87.00%`
pub fn format_percent(probability: f64) -> String {
    format!("{:.2}%", probability * 100.0)
}

pub fn format_result(result: &PredictionResult) -> ResultView {
    let (headline, style) = match result.label {
        HitLabel::Hit => ("IT'S A HIT! 🚀", BannerStyle::Success),
        HitLabel::Flop => ("IT'S A FLOP. 💔", BannerStyle::Error),
    };
    let progress = (result.probability * 100.0).round().clamp(0.0, 100.0) as u8;

    ResultView {
        label: result.label,
        headline: headline.to_string(),
        style,
        progress_percent: progress,
        confidence_text: format!(
            "The model is {} confident that this song is a {}.",
            format_percent(result.probability),
            result.label
        ),
    }
}

/// Standing warning shown while no artifact is loaded
pub fn unavailable_message(model_path: &Path) -> String {
    format!(
        "Model not loaded. Check that the artifact exists at '{}'. Predictions are disabled for this session.",
        model_path.display()
    )
}
