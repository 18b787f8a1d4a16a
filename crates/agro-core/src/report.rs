//! Report export for the latest prediction or disease analysis
//!
//! Callers must hold a result before exporting; there is nothing to export
//! otherwise.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::{DiseaseResult, FormInput, PredictionResult};

pub const YIELD_REPORT_PREFIX: &str = "crop-yield-report";
pub const DISEASE_REPORT_PREFIX: &str = "disease-report";

/// A file ready to be written or downloaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub file_name: String,
    pub content: Vec<u8>,
}

/// JSON document of an exported yield prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YieldReport {
    pub inputs: FormInput,
    pub result: PredictionResult,
    pub timestamp: String,
}

/// JSON document of an exported disease analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiseaseReport {
    pub analysis: DiseaseResult,
    pub timestamp: String,
    pub file_name: Option<String>,
}

pub fn to_downloadable_artifact(result: &PredictionResult, inputs: &FormInput) -> Result<Artifact> {
    yield_artifact_at(result, inputs, Utc::now())
}

pub fn yield_artifact_at(
    result: &PredictionResult,
    inputs: &FormInput,
    now: DateTime<Utc>,
) -> Result<Artifact> {
    let report = YieldReport {
        inputs: inputs.clone(),
        result: result.clone(),
        timestamp: now.to_rfc3339_opts(SecondsFormat::Millis, true),
    };

    Ok(Artifact {
        file_name: format!("{}-{}.json", YIELD_REPORT_PREFIX, now.format("%Y-%m-%d")),
        content: serde_json::to_vec_pretty(&report)?,
    })
}

pub fn disease_artifact(result: &DiseaseResult, image_name: Option<&str>) -> Result<Artifact> {
    disease_artifact_at(result, image_name, Utc::now())
}

pub fn disease_artifact_at(
    result: &DiseaseResult,
    image_name: Option<&str>,
    now: DateTime<Utc>,
) -> Result<Artifact> {
    let report = DiseaseReport {
        analysis: result.clone(),
        timestamp: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        file_name: image_name.map(str::to_string),
    };

    Ok(Artifact {
        file_name: format!("{}-{}.json", DISEASE_REPORT_PREFIX, now.timestamp_millis()),
        content: serde_json::to_vec_pretty(&report)?,
    })
}

/// One-line summary for the clipboard
pub fn to_clipboard_summary(result: &PredictionResult) -> String {
    format!("Predicted Yield: {:.2} tons/hectare", result.predicted_yield)
}

/// Multi-line summary including every input
pub fn to_detailed_summary(result: &PredictionResult, inputs: &FormInput, generated: DateTime<Utc>) -> String {
    let mut lines = vec![
        "Crop Yield Prediction".to_string(),
        "━━━━━━━━━━━━━━━━━━━━".to_string(),
        format!("Expected Yield: {:.2} tons/hectare", result.predicted_yield),
        format!("Temperature: {}°C", inputs.temperature),
        format!("Humidity: {}%", inputs.humidity),
        format!("Soil Type: {}", inputs.soil_type),
        format!("Crop Type: {}", inputs.crop_type),
        format!("Water Flow: {} L/min", inputs.water_flow),
        format!("Location: {}, {}", inputs.latitude, inputs.longitude),
    ];
    if !result.recommended_crops.is_empty() {
        lines.push(format!("Recommended: {}", result.recommended_crops.join(", ")));
    }
    lines.push(format!("Generated: {}", generated.format("%Y-%m-%d %H:%M:%S UTC")));
    lines.join("\n")
}
