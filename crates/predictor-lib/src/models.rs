//! Core data models for the hit predictor

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of input features expected by the model
pub const NUM_FEATURES: usize = 13;

/// Column order the pipeline was fitted on.
///
/// The artifact binds its inputs by position, not by name, so every row
/// handed to it must follow this order exactly.
pub const FEATURE_COLUMNS: [&str; NUM_FEATURES] = [
    "danceability",
    "energy",
    "key",
    "loudness",
    "mode",
    "acousticness",
    "instrumentalness",
    "valence",
    "duration_ms",
    "time_signature",
    "chorus_hit",
    "sections",
    "is_vocal_track",
];

/// Tolerance used when checking that class probabilities sum to one
pub const PROBABILITY_TOLERANCE: f64 = 1e-4;

/// Song descriptors fed to the classifier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    pub danceability: f64,
    pub energy: f64,
    pub key: i64,
    pub loudness: f64,
    pub mode: i64,
    pub acousticness: f64,
    pub instrumentalness: f64,
    pub valence: f64,
    pub duration_ms: i64,
    pub time_signature: i64,
    pub chorus_hit: f64,
    pub sections: i64,
    pub is_vocal_track: i64,
}

impl Default for FeatureRecord {
    fn default() -> Self {
        Self {
            danceability: 0.75,
            energy: 0.8,
            key: 5,
            loudness: -5.5,
            mode: 1,
            acousticness: 0.1,
            instrumentalness: 0.0,
            valence: 0.6,
            duration_ms: 210_000,
            time_signature: 4,
            chorus_hit: 40.5,
            sections: 10,
            is_vocal_track: 1,
        }
    }
}

impl FeatureRecord {
    /// Build a record from values laid out in `FEATURE_COLUMNS` order.
    ///
    /// Integer columns are rounded; callers are expected to have clamped
    /// the values into their domains already.
    pub fn from_ordered(values: [f64; NUM_FEATURES]) -> Self {
        let int = |v: f64| v.round() as i64;
        Self {
            danceability: values[0],
            energy: values[1],
            key: int(values[2]),
            loudness: values[3],
            mode: int(values[4]),
            acousticness: values[5],
            instrumentalness: values[6],
            valence: values[7],
            duration_ms: int(values[8]),
            time_signature: int(values[9]),
            chorus_hit: values[10],
            sections: int(values[11]),
            is_vocal_track: int(values[12]),
        }
    }

    /// Field values paired with their column names, in `FEATURE_COLUMNS` order
    pub fn values(&self) -> [(&'static str, FieldValue); NUM_FEATURES] {
        use FieldValue::{Float, Integer};
        let v = [
            Float(self.danceability),
            Float(self.energy),
            Integer(self.key),
            Float(self.loudness),
            Integer(self.mode),
            Float(self.acousticness),
            Float(self.instrumentalness),
            Float(self.valence),
            Integer(self.duration_ms),
            Integer(self.time_signature),
            Float(self.chorus_hit),
            Integer(self.sections),
            Integer(self.is_vocal_track),
        ];
        std::array::from_fn(|i| (FEATURE_COLUMNS[i], v[i]))
    }

    /// Serialize into the positional row the artifact consumes
    pub fn to_row(&self) -> FeatureRow {
        let values = self.values();
        FeatureRow::new(
            values.iter().map(|(name, _)| name.to_string()).collect(),
            values.iter().map(|(_, value)| value.as_f64() as f32).collect(),
        )
    }
}

/// A single typed field value
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Float(f64),
    Integer(i64),
}

impl FieldValue {
    pub fn as_f64(&self) -> f64 {
        match self {
            FieldValue::Float(v) => *v,
            FieldValue::Integer(v) => *v as f64,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Float(v) => write!(f, "{}", v),
            FieldValue::Integer(v) => write!(f, "{}", v),
        }
    }
}

/// Positional input row for an artifact.
///
/// Column names travel with the values only so the adapter can verify the
/// layout before inference; the artifact itself sees `values` alone.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    pub columns: Vec<String>,
    pub values: Vec<f32>,
}

impl FeatureRow {
    pub fn new(columns: Vec<String>, values: Vec<f32>) -> Self {
        Self { columns, values }
    }

    /// True when columns and values match `FEATURE_COLUMNS` in count and order
    pub fn matches_schema(&self) -> bool {
        self.schema_mismatch().is_none()
    }

    /// Describe how this row deviates from the expected layout
    pub fn schema_mismatch(&self) -> Option<String> {
        if self.columns.len() != NUM_FEATURES {
            return Some(format!(
                "expected {} columns, got {}",
                NUM_FEATURES,
                self.columns.len()
            ));
        }
        if self.values.len() != self.columns.len() {
            return Some(format!(
                "row has {} columns but {} values",
                self.columns.len(),
                self.values.len()
            ));
        }
        self.columns
            .iter()
            .zip(FEATURE_COLUMNS)
            .enumerate()
            .find(|(_, (got, expected))| got.as_str() != *expected)
            .map(|(position, (got, expected))| {
                format!(
                    "column {} is '{}', expected '{}'",
                    position, got, expected
                )
            })
    }
}

/// Output class of the classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HitLabel {
    Flop,
    Hit,
}

impl HitLabel {
    /// Map the pipeline's class index (0 = flop, 1 = hit)
    pub fn from_class_index(index: i64) -> Option<Self> {
        match index {
            0 => Some(HitLabel::Flop),
            1 => Some(HitLabel::Hit),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HitLabel::Flop => "Flop",
            HitLabel::Hit => "Hit",
        }
    }
}

impl fmt::Display for HitLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Probability mass per class
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassDistribution {
    pub flop: f64,
    pub hit: f64,
}

impl ClassDistribution {
    pub fn new(flop: f64, hit: f64) -> Self {
        Self { flop, hit }
    }

    pub fn probability_of(&self, label: HitLabel) -> f64 {
        match label {
            HitLabel::Flop => self.flop,
            HitLabel::Hit => self.hit,
        }
    }

    /// Class with the larger mass; ties go to Hit, matching a 0.5 threshold
    pub fn most_likely(&self) -> HitLabel {
        if self.hit >= self.flop {
            HitLabel::Hit
        } else {
            HitLabel::Flop
        }
    }

    /// Both masses in [0, 1] and summing to one within tolerance
    pub fn is_normalized(&self) -> bool {
        let in_range = |p: f64| p.is_finite() && (0.0..=1.0).contains(&p);
        in_range(self.flop)
            && in_range(self.hit)
            && ((self.flop + self.hit) - 1.0).abs() <= PROBABILITY_TOLERANCE
    }
}

/// Classifier verdict ready for display
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub label: HitLabel,
    /// Probability mass of `label`, not of the positive class
    pub probability: f64,
}

impl PredictionResult {
    pub fn from_distribution(label: HitLabel, distribution: &ClassDistribution) -> Self {
        Self {
            label,
            probability: distribution.probability_of(label),
        }
    }
}
