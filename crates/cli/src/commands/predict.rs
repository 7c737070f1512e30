//! `hitp predict`

use anyhow::Result;
use clap::Args;
use predictor_lib::collector::parse_raw;
use predictor_lib::predictor::{format_result, unavailable_message, PredictionAdapter, DEFAULT_MODEL_PATH};
use predictor_lib::{FeatureRecord, PredictionResult};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tabled::Tabled;

use crate::client::{ApiClient, ApiError, PredictResponse};
use crate::config::Config;
use crate::output::{print_error, print_info, print_verdict, print_warning, OutputFormat};

/// Song characteristics; any field left out takes its default
#[derive(Args, Debug, Default)]
pub struct PredictArgs {
    /// Danceability, 0 to 1
    #[arg(long)]
    pub danceability: Option<String>,

    /// Energy, 0 to 1
    #[arg(long)]
    pub energy: Option<String>,

    /// Pitch class, 0 to 11
    #[arg(long)]
    pub key: Option<String>,

    /// Loudness in dB, -60 to 5
    #[arg(long, allow_negative_numbers = true)]
    pub loudness: Option<String>,

    /// 1 for major, 0 for minor
    #[arg(long)]
    pub mode: Option<String>,

    /// Acousticness, 0 to 1
    #[arg(long)]
    pub acousticness: Option<String>,

    /// Instrumentalness, 0 to 1
    #[arg(long)]
    pub instrumentalness: Option<String>,

    /// Valence, 0 to 1
    #[arg(long)]
    pub valence: Option<String>,

    /// Duration in milliseconds, 30000 to 1000000
    #[arg(long = "duration-ms")]
    pub duration_ms: Option<String>,

    /// Beats per bar, 1 to 5
    #[arg(long = "time-signature")]
    pub time_signature: Option<String>,

    /// Seconds until the chorus starts, 0 to 300
    #[arg(long = "chorus-hit")]
    pub chorus_hit: Option<String>,

    /// Number of sections, 1 to 50
    #[arg(long)]
    pub sections: Option<String>,

    /// 1 if the track has vocals, else 0
    #[arg(long = "is-vocal-track")]
    pub is_vocal_track: Option<String>,

    /// Run the model in-process instead of asking the server
    #[arg(long)]
    pub local: bool,

    /// Model artifact for --local
    #[arg(long, requires = "local")]
    pub model: Option<PathBuf>,
}

impl PredictArgs {
    /// Supplied values keyed by column name
    pub fn pairs(&self) -> Vec<(&'static str, &str)> {
        let fields: [(&'static str, &Option<String>); 13] = [
            ("danceability", &self.danceability),
            ("energy", &self.energy),
            ("key", &self.key),
            ("loudness", &self.loudness),
            ("mode", &self.mode),
            ("acousticness", &self.acousticness),
            ("instrumentalness", &self.instrumentalness),
            ("valence", &self.valence),
            ("duration_ms", &self.duration_ms),
            ("time_signature", &self.time_signature),
            ("chorus_hit", &self.chorus_hit),
            ("sections", &self.sections),
            ("is_vocal_track", &self.is_vocal_track),
        ];
        fields
            .into_iter()
            .filter_map(|(name, value)| value.as_deref().map(|v| (name, v)))
            .collect()
    }
}

/// Row for the record table
#[derive(Tabled)]
struct FieldRow {
    #[tabled(rename = "Field")]
    field: String,
    #[tabled(rename = "Value")]
    value: String,
}

pub async fn run(
    client: &ApiClient,
    config: &Config,
    args: &PredictArgs,
    format: OutputFormat,
) -> Result<()> {
    let (record, result) = if args.local {
        let path = args
            .model
            .clone()
            .or_else(|| config.model_path.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MODEL_PATH));
        predict_local(&path, &args.pairs())?
    } else {
        predict_remote(client, &args.pairs()).await?
    };

    render(record, &result, format)
}

/// Validate and classify in-process
fn predict_local(path: &Path, pairs: &[(&str, &str)]) -> Result<(FeatureRecord, PredictionResult)> {
    let record = parse_raw(pairs.iter().copied()).map_err(|e| {
        for issue in &e.issues {
            print_error(&format!("{} {}", issue.field, issue.reason));
        }
        e
    })?;

    let adapter = PredictionAdapter::new(path);
    if let Err(e) = adapter.load() {
        print_warning(&unavailable_message(path));
        return Err(e.into());
    }

    let result = adapter.predict(&record)?;
    Ok((record, result))
}

async fn predict_remote(
    client: &ApiClient,
    pairs: &[(&str, &str)],
) -> Result<(FeatureRecord, PredictionResult)> {
    let body: Map<String, Value> = pairs
        .iter()
        .map(|(name, value)| (name.to_string(), Value::String(value.to_string())))
        .collect();

    let response: PredictResponse = client.post("api/v1/predict", &body).await.map_err(|e| {
        if let Some(api) = e.downcast_ref::<ApiError>() {
            for issue in &api.issues {
                print_error(&format!("{} {}", issue.field, issue.reason));
            }
        }
        e
    })?;

    let result = PredictionResult {
        label: response.label,
        probability: response.probability,
    };
    Ok((response.record, result))
}

fn render(record: FeatureRecord, result: &PredictionResult, format: OutputFormat) -> Result<()> {
    let view = format_result(result);

    match format {
        OutputFormat::Json => {
            let output = PredictResponse {
                label: result.label,
                probability: result.probability,
                confidence_text: view.confidence_text,
                record,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Table => {
            let rows: Vec<FieldRow> = record
                .values()
                .iter()
                .map(|(name, value)| FieldRow {
                    field: name.to_string(),
                    value: value.to_string(),
                })
                .collect();

            let table = tabled::Table::new(rows)
                .with(tabled::settings::Style::rounded())
                .to_string();
            print_info("Song characteristics");
            println!("{}\n", table);
            print_verdict(&view);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use predictor_lib::{PredictorError, ValidationError, FEATURE_COLUMNS};

    #[test]
    fn test_pairs_use_column_names() {
        let args = PredictArgs {
            loudness: Some("-7".to_string()),
            duration_ms: Some("180000".to_string()),
            is_vocal_track: Some("0".to_string()),
            ..Default::default()
        };

        let pairs = args.pairs();
        assert_eq!(
            pairs,
            vec![("loudness", "-7"), ("duration_ms", "180000"), ("is_vocal_track", "0")]
        );
        assert!(pairs.iter().all(|(name, _)| FEATURE_COLUMNS.contains(name)));
    }

    #[test]
    fn test_every_column_has_a_flag() {
        let value = Some("1".to_string());
        let args = PredictArgs {
            danceability: value.clone(),
            energy: value.clone(),
            key: value.clone(),
            loudness: value.clone(),
            mode: value.clone(),
            acousticness: value.clone(),
            instrumentalness: value.clone(),
            valence: value.clone(),
            duration_ms: value.clone(),
            time_signature: value.clone(),
            chorus_hit: value.clone(),
            sections: value.clone(),
            is_vocal_track: value,
            ..Default::default()
        };

        let names: Vec<&str> = args.pairs().into_iter().map(|(name, _)| name).collect();
        assert_eq!(names, FEATURE_COLUMNS.to_vec());
    }

    #[test]
    fn test_local_rejects_invalid_input_before_loading() {
        let dir = tempfile::tempdir().unwrap();
        let err = predict_local(&dir.path().join("model.onnx"), &[("energy", "loud")]).unwrap_err();

        let validation = err.downcast_ref::<ValidationError>().unwrap();
        assert!(validation.mentions("energy"));
    }

    #[test]
    fn test_local_missing_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let err = predict_local(&dir.path().join("model.onnx"), &[]).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<PredictorError>(),
            Some(PredictorError::ArtifactNotFound { .. })
        ));
    }
}
