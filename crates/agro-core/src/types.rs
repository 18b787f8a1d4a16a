//! Common types used across the AgroCast system

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Soil categories accepted by the prediction service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SoilType {
    Clay,
    Sandy,
    Loamy,
    Peaty,
}

impl SoilType {
    pub const ALL: [SoilType; 4] = [SoilType::Clay, SoilType::Sandy, SoilType::Loamy, SoilType::Peaty];

    pub fn as_str(&self) -> &'static str {
        match self {
            SoilType::Clay => "clay",
            SoilType::Sandy => "sandy",
            SoilType::Loamy => "loamy",
            SoilType::Peaty => "peaty",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            SoilType::Clay => "Heavy, nutrient-rich soil",
            SoilType::Sandy => "Well-draining, light soil",
            SoilType::Loamy => "Ideal balanced soil",
            SoilType::Peaty => "Acidic, organic-rich soil",
        }
    }
}

impl fmt::Display for SoilType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SoilType {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|soil| soil.as_str().eq_ignore_ascii_case(s))
            .ok_or(())
    }
}

/// Crops the yield model was trained on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CropType {
    Wheat,
    Rice,
    Maize,
    Soybean,
}

impl CropType {
    pub const ALL: [CropType; 4] = [CropType::Wheat, CropType::Rice, CropType::Maize, CropType::Soybean];

    pub fn as_str(&self) -> &'static str {
        match self {
            CropType::Wheat => "wheat",
            CropType::Rice => "rice",
            CropType::Maize => "maize",
            CropType::Soybean => "soybean",
        }
    }

    /// Growing conditions shown next to the crop picker
    pub fn optimal_conditions(&self) -> &'static str {
        match self {
            CropType::Wheat => "15-25°C, 60-70% humidity",
            CropType::Rice => "20-30°C, 70-80% humidity",
            CropType::Maize => "18-27°C, 60-70% humidity",
            CropType::Soybean => "20-30°C, 60-65% humidity",
        }
    }
}

impl fmt::Display for CropType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CropType {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|crop| crop.as_str().eq_ignore_ascii_case(s))
            .ok_or(())
    }
}

/// A validated form, ready to be sent to the prediction service.
///
/// Serializes to the exact request body of `POST /predict`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormInput {
    pub temperature: f64,
    pub humidity: f64,
    pub soil_type: SoilType,
    pub crop_type: CropType,
    pub water_flow: f64,
    pub latitude: f64,
    pub longitude: f64,
}

/// Successful response of `POST /predict`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Tons per hectare
    pub predicted_yield: f64,
    /// Most suitable first
    pub recommended_crops: Vec<String>,
}

/// Ordinal risk label of a disease analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    None,
    Low,
    Medium,
    High,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::None => "none",
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        };
        f.write_str(label)
    }
}

/// Normalized outcome of `POST /disease`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiseaseResult {
    pub disease: String,
    /// Percentage, 0-100
    pub confidence: Option<f64>,
    pub severity: Option<Severity>,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// Coordinates rounded to 4 decimal places, the precision the form keeps.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude: round_to(latitude, 4),
            longitude: round_to(longitude, 4),
        }
    }
}

/// Current conditions used to prefill the form
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmbientWeather {
    pub temperature: f64,
    pub humidity: f64,
}

impl AmbientWeather {
    pub fn new(temperature: f64, humidity: f64) -> Self {
        Self {
            temperature: round_to(temperature, 1),
            humidity: round_to(humidity, 1),
        }
    }
}

/// Response of `GET /health`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub crop_model: String,
    pub disease_model: String,
}

impl HealthStatus {
    pub fn is_ready(&self) -> bool {
        self.crop_model == "ready"
    }
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
