//! Capability traits for the external collaborators
//!
//! The prediction service, the device location source and the weather lookup
//! are all remote or platform-provided. These traits keep the session logic
//! independent from the concrete HTTP clients.

use async_trait::async_trait;

use crate::types::{AmbientWeather, Coordinates, DiseaseResult, FormInput, HealthStatus, PredictionResult};
use crate::Result;

/// Remote yield and disease inference
#[async_trait]
pub trait PredictionService: Send + Sync {
    /// Request a yield prediction for an already validated form
    async fn predict(&self, input: &FormInput) -> Result<PredictionResult>;

    /// Upload a leaf image for disease detection
    async fn detect_disease(&self, file_name: &str, image: Vec<u8>) -> Result<DiseaseResult>;

    /// Report whether the remote models are loaded
    async fn health(&self) -> Result<HealthStatus>;
}

/// Source of the device position
#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn current_position(&self) -> Result<Coordinates>;
}

/// Current-conditions lookup used to prefill the form
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn current_conditions(&self, coordinates: Coordinates) -> Result<AmbientWeather>;
}
