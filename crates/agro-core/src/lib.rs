//! Core traits and types for AgroCast
//!
//! This crate holds the pure part of the crop-yield pipeline: form validation,
//! the bounded prediction history, chart series derivation and report export.
//! It also defines the capability traits implemented by the HTTP clients, which
//! keeps the orchestration testable without a network.

pub mod charts;
pub mod error;
pub mod history;
pub mod report;
pub mod service;
pub mod types;
pub mod validation;


pub use charts::{
    comparison_series, history_series, parameter_impact_series, recommendation_ranking,
    ComparisonPoint, Condition, HistoryPoint, ImpactPoint, RankedCrop,
};
pub use error::{Error, Result};
pub use history::{HistoryEntry, HistoryStore, HISTORY_CAPACITY};
pub use report::{
    disease_artifact, to_clipboard_summary, to_detailed_summary, to_downloadable_artifact, Artifact,
    DiseaseReport, YieldReport,
};
pub use service::{LocationProvider, PredictionService, WeatherProvider};
pub use types::*;
pub use validation::{validate_all, validate_field, Field, FormDraft, ValidationErrors};
