//! HTTP clients for AgroCast
//!
//! This crate provides the reqwest implementation of the PredictionService
//! trait, the Open-Meteo weather lookup and the location enricher.

mod client;
mod config;
mod location;
mod weather;


pub use client::{decode_response, PredictionClient};
pub use config::{ApiConfig, DEFAULT_API_BASE_URL, DEFAULT_WEATHER_API_URL};
pub use location::{Enrichment, FixedLocation, LocationEnricher};
pub use weather::OpenMeteoClient;

// Re-export core types for convenience
pub use agro_core::{
    DiseaseResult, Error, FormInput, HealthStatus, LocationProvider, PredictionResult,
    PredictionService, Result, WeatherProvider,
};
