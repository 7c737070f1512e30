//! Input collection for the prediction form
//!
//! Holds the current value of every field, applies widget bounds when a
//! value changes and assembles a `FeatureRecord` in the fixed column order.
//! Free-text input goes through `apply_raw`, which validates every field
//! before anything is committed.

mod schema;

#[cfg(test)]
mod tests;

pub use schema::{field_spec, position, FieldKind, FieldSpec, WidgetKind, FEATURE_SCHEMA};

use crate::error::{FieldIssue, ValidationError};
use crate::models::{FeatureRecord, NUM_FEATURES};

/// Current form state, one value per field in column order
#[derive(Debug, Clone)]
pub struct InputCollector {
    values: [f64; NUM_FEATURES],
}

impl Default for InputCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl InputCollector {
    /// Start from every field's default
    pub fn new() -> Self {
        Self {
            values: FEATURE_SCHEMA.map(|spec| spec.default),
        }
    }

    /// Assemble the record for the current state
    pub fn collect(&self) -> FeatureRecord {
        FeatureRecord::from_ordered(self.values)
    }

    /// Set a field the way a bounded widget would: out-of-range values are
    /// pulled to the nearest edge. Returns the value actually stored.
    pub fn set(&mut self, name: &str, value: f64) -> Result<f64, ValidationError> {
        let index = position(name).ok_or_else(|| ValidationError::single(name, "is not a known field"))?;
        if !value.is_finite() {
            return Err(ValidationError::single(name, "is not a number"));
        }
        let stored = FEATURE_SCHEMA[index].clamp(value);
        self.values[index] = stored;
        Ok(stored)
    }

    /// Apply free-text values. Either every pair is valid and the state is
    /// updated, or nothing changes and all issues are reported together.
    pub fn apply_raw<I, K, V>(&mut self, pairs: I) -> Result<FeatureRecord, ValidationError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut staged = self.values;
        let mut issues = Vec::new();

        for (name, raw) in pairs {
            let name = name.as_ref();
            let Some(index) = position(name) else {
                issues.push(FieldIssue::new(name, "is not a known field"));
                continue;
            };
            match FEATURE_SCHEMA[index].parse(raw.as_ref()) {
                Ok(value) => staged[index] = value,
                Err(reason) => issues.push(FieldIssue::new(name, reason)),
            }
        }

        if !issues.is_empty() {
            // Report in column order regardless of input order
            issues.sort_by_key(|issue| position(&issue.field).unwrap_or(NUM_FEATURES));
            return Err(ValidationError { issues });
        }

        self.values = staged;
        Ok(self.collect())
    }
}

/// Validate a batch of free-text values on top of the defaults
pub fn parse_raw<I, K, V>(pairs: I) -> Result<FeatureRecord, ValidationError>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    InputCollector::new().apply_raw(pairs)
}
