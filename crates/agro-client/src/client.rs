//! HTTP client for the prediction service

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use agro_core::{
    DiseaseResult, Error, FormInput, HealthStatus, PredictionResult, PredictionService, Result,
    Severity,
};

use crate::config::ApiConfig;

/// Client for `POST /predict`, `POST /disease` and `GET /health`.
///
/// Every call is a single attempt. Transport failures, timeouts and non-2xx
/// answers all end up as one error carrying the message to show the user.
pub struct PredictionClient {
    config: ApiConfig,
    client: Client,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

#[derive(Deserialize)]
struct DiseaseResponse {
    disease: String,
    confidence: Option<f64>,
    severity: Option<Severity>,
    recommended_pesticide: Option<String>,
    recommendations: Option<Vec<String>>,
}

impl From<DiseaseResponse> for DiseaseResult {
    fn from(response: DiseaseResponse) -> Self {
        let recommendations = match (response.recommendations, response.recommended_pesticide) {
            (Some(list), _) => list,
            (None, Some(pesticide)) => vec![pesticide],
            (None, None) => Vec::new(),
        };

        Self {
            disease: response.disease,
            confidence: response.confidence,
            severity: response.severity,
            recommendations,
        }
    }
}

impl PredictionClient {
    /// Create a new client from configuration
    pub fn new(config: ApiConfig) -> Result<Self> {
        config.validate()?;

        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| Error::Transport(e.to_string()))?;

        Ok(Self { config, client })
    }

    /// Create a new client from environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(ApiConfig::from_env()?)
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    async fn read<T: DeserializeOwned>(&self, response: Response) -> Result<T> {
        let status = response.status();
        let body = response.text().await.map_err(|e| Error::Transport(e.to_string()))?;
        decode_response(status, &body)
    }
}

/// Turn a status and body into the decoded payload or the user-facing error.
///
/// The service's own `error` field wins over anything generic. A 2xx body that
/// does not have the expected shape is reported as a service error.
pub fn decode_response<T: DeserializeOwned>(status: StatusCode, body: &str) -> Result<T> {
    if status.is_success() {
        return serde_json::from_str(body).map_err(|e| {
            Error::service(
                Some(status.as_u16()),
                format!("Unexpected response from prediction service: {}", e),
            )
        });
    }

    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.error)
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| format!("Request failed with status code {}", status.as_u16()));

    Err(Error::service(Some(status.as_u16()), message))
}

#[async_trait]
impl PredictionService for PredictionClient {
    async fn predict(&self, input: &FormInput) -> Result<PredictionResult> {
        let url = self.config.endpoint("predict")?;
        tracing::debug!(%url, crop = %input.crop_type, soil = %input.soil_type, "requesting yield prediction");

        let response = self
            .client
            .post(url)
            .header("Accept", "application/json")
            .json(input)
            .send()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        let result: PredictionResult = self.read(response).await?;
        tracing::info!(
            predicted_yield = result.predicted_yield,
            recommendations = result.recommended_crops.len(),
            "prediction received"
        );
        Ok(result)
    }

    async fn detect_disease(&self, file_name: &str, image: Vec<u8>) -> Result<DiseaseResult> {
        let url = self.config.endpoint("disease")?;
        tracing::debug!(%url, file_name, bytes = image.len(), "uploading image for disease detection");

        let part = Part::bytes(image).file_name(file_name.to_string());
        let form = Form::new().part("image", part);

        let response = self
            .client
            .post(url)
            .header("Accept", "application/json")
            .multipart(form)
            .send()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        let raw: DiseaseResponse = self.read(response).await?;
        Ok(raw.into())
    }

    async fn health(&self) -> Result<HealthStatus> {
        let url = self.config.endpoint("health")?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        self.read(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_field_wins() {
        let err = decode_response::<PredictionResult>(StatusCode::BAD_REQUEST, r#"{"error":"bad soil_type"}"#)
            .unwrap_err();
        assert_eq!(err.to_string(), "bad soil_type");
        assert!(matches!(err, Error::Service { status: Some(400), .. }));
    }

    #[test]
    fn test_non_json_error_body() {
        let err = decode_response::<PredictionResult>(StatusCode::BAD_GATEWAY, "<html>oops</html>").unwrap_err();
        assert_eq!(err.to_string(), "Request failed with status code 502");
    }

    #[test]
    fn test_success_body_decoded() {
        let result: PredictionResult = decode_response(
            StatusCode::OK,
            r#"{"predicted_yield": 4.5, "recommended_crops": ["Wheat", "Maize"]}"#,
        )
        .unwrap();
        assert_eq!(result.predicted_yield, 4.5);
        assert_eq!(result.recommended_crops, vec!["Wheat", "Maize"]);
    }

    #[test]
    fn test_shape_mismatch_is_service_error() {
        let err = decode_response::<PredictionResult>(StatusCode::OK, r#"{"yield": 4.5}"#).unwrap_err();
        assert!(matches!(err, Error::Service { status: Some(200), .. }));
        assert!(err.to_string().starts_with("Unexpected response from prediction service"));
    }

    #[test]
    fn test_disease_pesticide_fallback() {
        let raw: DiseaseResponse = serde_json::from_str(
            r#"{"disease": "Rust", "recommended_pesticide": "Apply sulfur fungicide and ensure proper aeration."}"#,
        )
        .unwrap();
        let result = DiseaseResult::from(raw);
        assert_eq!(result.disease, "Rust");
        assert_eq!(result.confidence, None);
        assert_eq!(
            result.recommendations,
            vec!["Apply sulfur fungicide and ensure proper aeration."]
        );
    }

    #[test]
    fn test_disease_unknown_severity_rejected() {
        let err = decode_response::<DiseaseResponse>(
            StatusCode::OK,
            r#"{"disease": "Late Blight", "severity": "catastrophic"}"#,
        );
        assert!(err.is_err());
    }
}
