//! Per-field bounds, defaults and widget hints for the input form

use crate::models::{FEATURE_COLUMNS, NUM_FEATURES};
use serde::Serialize;

/// Numeric type of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Float,
    Integer,
}

/// Control used to render a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WidgetKind {
    /// Bounded continuous slider
    Slider,
    /// Bounded numeric entry
    Number,
    /// Discrete choice among the integers in `[min, max]`
    Choice,
}

/// Declared domain and presentation of one input field
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub widget: WidgetKind,
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub default: f64,
}

const fn slider(name: &'static str, label: &'static str, default: f64) -> FieldSpec {
    FieldSpec {
        name,
        label,
        kind: FieldKind::Float,
        widget: WidgetKind::Slider,
        min: 0.0,
        max: 1.0,
        step: 0.01,
        default,
    }
}

const fn number(
    name: &'static str,
    label: &'static str,
    kind: FieldKind,
    min: f64,
    max: f64,
    step: f64,
    default: f64,
) -> FieldSpec {
    FieldSpec {
        name,
        label,
        kind,
        widget: WidgetKind::Number,
        min,
        max,
        step,
        default,
    }
}

const fn choice(name: &'static str, label: &'static str, min: f64, max: f64, default: f64) -> FieldSpec {
    FieldSpec {
        name,
        label,
        kind: FieldKind::Integer,
        widget: WidgetKind::Choice,
        min,
        max,
        step: 1.0,
        default,
    }
}

/// Input fields in `FEATURE_COLUMNS` order
pub const FEATURE_SCHEMA: [FieldSpec; NUM_FEATURES] = [
    slider("danceability", "Danceability", 0.75),
    slider("energy", "Energy", 0.8),
    choice("key", "Key", 0.0, 11.0, 5.0),
    number("loudness", "Loudness (dB)", FieldKind::Float, -60.0, 5.0, 0.1, -5.5),
    choice("mode", "Mode (1: major, 0: minor)", 0.0, 1.0, 1.0),
    slider("acousticness", "Acousticness", 0.1),
    slider("instrumentalness", "Instrumentalness", 0.0),
    slider("valence", "Valence (positivity)", 0.6),
    number("duration_ms", "Duration (ms)", FieldKind::Integer, 30_000.0, 1_000_000.0, 1000.0, 210_000.0),
    choice("time_signature", "Time signature", 1.0, 5.0, 4.0),
    number("chorus_hit", "Chorus hit (s)", FieldKind::Float, 0.0, 300.0, 0.1, 40.5),
    choice("sections", "Sections", 1.0, 50.0, 10.0),
    choice("is_vocal_track", "Vocal track", 0.0, 1.0, 1.0),
];

/// Position of a field in `FEATURE_COLUMNS`
pub fn position(name: &str) -> Option<usize> {
    FEATURE_COLUMNS.iter().position(|column| *column == name)
}

/// Spec for a field by name
pub fn field_spec(name: &str) -> Option<&'static FieldSpec> {
    position(name).map(|i| &FEATURE_SCHEMA[i])
}

impl FieldSpec {
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Widget semantics: pull a value into the domain, rounding integers
    pub fn clamp(&self, value: f64) -> f64 {
        let value = value.clamp(self.min, self.max);
        match self.kind {
            FieldKind::Float => value,
            FieldKind::Integer => value.round(),
        }
    }

    /// Allowed values for a choice widget
    pub fn choices(&self) -> Vec<i64> {
        match self.widget {
            WidgetKind::Choice => (self.min as i64..=self.max as i64).collect(),
            _ => Vec::new(),
        }
    }

    /// Parse free-text input, rejecting anything outside the declared domain
    pub fn parse(&self, raw: &str) -> Result<f64, String> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err("is empty".to_string());
        }
        let value: f64 = trimmed
            .parse()
            .map_err(|_| format!("is not a number: '{}'", trimmed))?;
        if !value.is_finite() {
            return Err(format!("is not a number: '{}'", trimmed));
        }
        if self.kind == FieldKind::Integer && value.fract() != 0.0 {
            return Err(format!("must be a whole number, got {}", trimmed));
        }
        if !self.contains(value) {
            return Err(format!(
                "must be between {} and {}",
                self.format_value(self.min),
                self.format_value(self.max)
            ));
        }
        Ok(value)
    }

    pub fn format_value(&self, value: f64) -> String {
        match self.kind {
            FieldKind::Integer => format!("{}", value as i64),
            FieldKind::Float => format!("{}", value),
        }
    }
}
