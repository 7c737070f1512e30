//! ONNX model artifact using tract
//!
//! Loads a classification pipeline exported to ONNX and runs it on a
//! single `[1, 13]` float row. Accepted output layouts are those produced
//! by the usual scikit-learn converters:
//! - a label tensor followed by a `[1, 2]` probability tensor
//! - a lone `[1, 2]` probability tensor (label is the argmax)
//! - a lone positive-class score (`[1]` or `[1, 1]`)

use super::{ArtifactInfo, ModelArtifact};
use crate::error::PredictorError;
use crate::models::{ClassDistribution, FeatureRow, HitLabel, NUM_FEATURES};
use anyhow::{bail, Context, Result};
use sha2::{Digest, Sha256};
use std::io::ErrorKind;
use std::ops::Deref;
use std::path::Path;
use std::sync::Arc;
use tract_onnx::prelude::*;
use tracing::debug;

type TractModel = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// ONNX classifier backed by an optimized tract plan
pub struct OnnxArtifact {
    plan: TractModel,
    info: ArtifactInfo,
}

impl OnnxArtifact {
    /// Parse and optimize a model from bytes
    pub fn from_bytes(model_bytes: &[u8], origin: &Path) -> Result<Self> {
        let plan = Self::build_plan(model_bytes)?;
        let info = ArtifactInfo {
            format: "onnx".to_string(),
            path: origin.display().to_string(),
            sha256: hex::encode(Sha256::digest(model_bytes)),
            size_bytes: model_bytes.len(),
        };
        Ok(Self { plan, info })
    }

    fn build_plan(model_bytes: &[u8]) -> Result<TractModel> {
        let model = tract_onnx::onnx()
            .model_for_read(&mut std::io::Cursor::new(model_bytes))
            .context("Failed to parse ONNX model")?
            .with_input_fact(0, f32::fact([1, NUM_FEATURES]).into())
            .context("Failed to set input shape")?
            .into_optimized()
            .context("Failed to optimize model")?
            .into_runnable()
            .context("Failed to create runnable model")?;
        Ok(model)
    }

    fn row_to_tensor(row: &FeatureRow) -> Result<Tensor> {
        let array = tract_ndarray::Array2::from_shape_vec((1, row.values.len()), row.values.clone())
            .context("Feature row does not form a single-row matrix")?;
        Ok(array.into())
    }

    fn run(&self, row: &FeatureRow) -> Result<(HitLabel, ClassDistribution)> {
        let input = Self::row_to_tensor(row)?;
        let outputs = self.plan.run(tvec!(input.into()))?;
        let outcome = interpret_outputs(outputs.as_slice())?;
        debug!(label = %outcome.0, p_hit = outcome.1.hit, "ONNX inference completed");
        Ok(outcome)
    }
}

impl ModelArtifact for OnnxArtifact {
    fn classify(&self, row: &FeatureRow) -> Result<HitLabel> {
        self.run(row).map(|(label, _)| label)
    }

    fn estimate_distribution(&self, row: &FeatureRow) -> Result<ClassDistribution> {
        self.run(row).map(|(_, distribution)| distribution)
    }

    fn infer(&self, row: &FeatureRow) -> Result<(HitLabel, ClassDistribution)> {
        self.run(row)
    }

    fn describe(&self) -> ArtifactInfo {
        self.info.clone()
    }
}

/// Read and parse the artifact at `path`
pub fn load_artifact(path: &Path) -> Result<Arc<dyn ModelArtifact>, PredictorError> {
    let bytes = std::fs::read(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => PredictorError::ArtifactNotFound {
            path: path.to_path_buf(),
        },
        _ => PredictorError::ArtifactCorrupt {
            path: path.to_path_buf(),
            reason: e.to_string(),
        },
    })?;

    let artifact = OnnxArtifact::from_bytes(&bytes, path).map_err(|e| PredictorError::ArtifactCorrupt {
        path: path.to_path_buf(),
        reason: format!("{:#}", e),
    })?;
    Ok(Arc::new(artifact))
}

fn interpret_outputs<T: Deref<Target = Tensor>>(outputs: &[T]) -> Result<(HitLabel, ClassDistribution)> {
    match outputs {
        [label, probabilities] => {
            let distribution = distribution_from(probabilities)?;
            Ok((label_from(label)?, distribution))
        }
        [probabilities] => {
            let distribution = distribution_from(probabilities)?;
            Ok((distribution.most_likely(), distribution))
        }
        _ => bail!("Model produced {} outputs, expected 1 or 2", outputs.len()),
    }
}

fn label_from(tensor: &Tensor) -> Result<HitLabel> {
    let index = if let Ok(view) = tensor.to_array_view::<i64>() {
        view.iter().next().copied()
    } else if let Ok(view) = tensor.to_array_view::<i32>() {
        view.iter().next().map(|v| i64::from(*v))
    } else {
        bail!("Label output has unsupported type {:?}", tensor.datum_type());
    };
    let index = index.context("Label output is empty")?;
    HitLabel::from_class_index(index).with_context(|| format!("Unknown class index {}", index))
}

fn distribution_from(tensor: &Tensor) -> Result<ClassDistribution> {
    let view = tensor
        .to_array_view::<f32>()
        .context("Probability output is not f32")?;
    let values: Vec<f64> = view.iter().map(|v| f64::from(*v)).collect();
    match values.as_slice() {
        [flop, hit] => Ok(ClassDistribution::new(*flop, *hit)),
        [hit] => Ok(ClassDistribution::new(1.0 - hit, *hit)),
        other => bail!("Probability output has {} values, expected 1 or 2", other.len()),
    }
}
