//! API client for the hit predictor server

use anyhow::{Context, Result};
use predictor_lib::{FeatureRecord, HitLabel};
use reqwest::{Client, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use url::Url;

/// Error reported by the server in its JSON error body
#[derive(Debug, thiserror::Error)]
#[error("API error ({status}): {message}")]
pub struct ApiError {
    pub status: u16,
    pub kind: String,
    pub message: String,
    pub issues: Vec<FieldIssue>,
}

/// API client for the hit predictor server
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        let base_url = Url::parse(base_url).context("Invalid API URL")?;

        Ok(Self { client, base_url })
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.base_url.join(path).context("Invalid path")?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to send request")?;

        Self::decode(response).await
    }

    /// Make a POST request with JSON body
    pub async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        let url = self.base_url.join(path).context("Invalid path")?;

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .context("Failed to send request")?;

        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(match serde_json::from_str::<ErrorResponse>(&body) {
                Ok(err) => ApiError {
                    status,
                    kind: err.error,
                    message: err.message,
                    issues: err.issues,
                },
                Err(_) => ApiError {
                    status,
                    kind: "unknown".to_string(),
                    message: body,
                    issues: Vec::new(),
                },
            }
            .into());
        }

        response.json().await.context("Failed to parse response")
    }
}

// API response types

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictResponse {
    pub label: HitLabel,
    pub probability: f64,
    pub confidence_text: String,
    pub record: FeatureRecord,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaField {
    pub name: String,
    pub label: String,
    pub kind: String,
    pub widget: String,
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub default: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactInfo {
    pub format: String,
    pub path: String,
    pub sha256: String,
    pub size_bytes: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelStatus {
    pub state: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact: Option<ArtifactInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loaded_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldIssue {
    pub field: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(default)]
    pub issues: Vec<FieldIssue>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_model_status() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v1/model")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"state":"load_failed","path":"models/spotify_model_pipeline.onnx","error":"model artifact not found at models/spotify_model_pipeline.onnx"}"#)
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        let status: ModelStatus = client.get("api/v1/model").await.unwrap();

        mock.assert_async().await;
        assert_eq!(status.state, "load_failed");
        assert!(status.artifact.is_none());
        assert!(status.error.unwrap().contains("not found"));
    }

    #[tokio::test]
    async fn test_post_predict() {
        let mut server = mockito::Server::new_async().await;
        let body = serde_json::json!({
            "label": "Hit",
            "probability": 0.87,
            "confidence_text": "The model is 87.00% confident that this song is a Hit.",
            "record": FeatureRecord::default(),
        });
        server
            .mock("POST", "/api/v1/predict")
            .match_body(mockito::Matcher::Json(serde_json::json!({"energy": "0.9"})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        let response: PredictResponse = client
            .post("api/v1/predict", &serde_json::json!({"energy": "0.9"}))
            .await
            .unwrap();

        assert_eq!(response.label, HitLabel::Hit);
        assert_eq!(response.record, FeatureRecord::default());
    }

    #[tokio::test]
    async fn test_validation_error_is_decoded() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/v1/predict")
            .with_status(422)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error":"validation","message":"invalid input: energy must be between 0 and 1","issues":[{"field":"energy","reason":"must be between 0 and 1"}]}"#)
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        let err = client
            .post::<PredictResponse, _>("api/v1/predict", &serde_json::json!({"energy": "2"}))
            .await
            .unwrap_err();

        let api_err = err.downcast_ref::<ApiError>().unwrap();
        assert_eq!(api_err.status, 422);
        assert_eq!(api_err.kind, "validation");
        assert_eq!(api_err.issues[0].field, "energy");
    }

    #[tokio::test]
    async fn test_plain_text_error_is_kept() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/v1/schema")
            .with_status(502)
            .with_body("bad gateway")
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        let err = client.get::<Vec<SchemaField>>("api/v1/schema").await.unwrap_err();

        assert_eq!(err.to_string(), "API error (502): bad gateway");
    }

    #[test]
    fn test_invalid_url() {
        assert!(ApiClient::new("not a url").is_err());
    }
}
