//! Form validation
//!
//! The validator works on the raw strings a user types. Every edit re-runs
//! [`validate_all`]; a submission is only allowed when it comes back empty.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::types::{CropType, FormInput, SoilType};

/// Every input of the yield-prediction form
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Temperature,
    Humidity,
    SoilType,
    CropType,
    WaterFlow,
    Latitude,
    Longitude,
}

impl Field {
    pub const ALL: [Field; 7] = [
        Field::Temperature,
        Field::Humidity,
        Field::SoilType,
        Field::CropType,
        Field::WaterFlow,
        Field::Latitude,
        Field::Longitude,
    ];

    /// Wire name, also accepted by [`Field::from_str`]
    pub fn name(&self) -> &'static str {
        match self {
            Field::Temperature => "temperature",
            Field::Humidity => "humidity",
            Field::SoilType => "soil_type",
            Field::CropType => "crop_type",
            Field::WaterFlow => "water_flow",
            Field::Latitude => "latitude",
            Field::Longitude => "longitude",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Field::Temperature => "Temperature",
            Field::Humidity => "Humidity",
            Field::SoilType => "Soil type",
            Field::CropType => "Crop type",
            Field::WaterFlow => "Water flow",
            Field::Latitude => "Latitude",
            Field::Longitude => "Longitude",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            Field::Temperature => "°C",
            Field::Humidity => "%",
            Field::WaterFlow => "L/min",
            _ => "",
        }
    }

    /// Inclusive bounds for numeric fields, `None` for categorical ones
    pub fn range(&self) -> Option<(f64, f64)> {
        match self {
            Field::Temperature => Some((-50.0, 60.0)),
            Field::Humidity => Some((0.0, 100.0)),
            Field::WaterFlow => Some((0.0, 1000.0)),
            Field::Latitude => Some((-90.0, 90.0)),
            Field::Longitude => Some((-180.0, 180.0)),
            Field::SoilType | Field::CropType => None,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Field {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        let normalized = match normalized.as_str() {
            "soiltype" | "soil" => "soil_type",
            "croptype" | "crop" => "crop_type",
            "waterflow" | "water" => "water_flow",
            "lat" => "latitude",
            "lon" | "lng" => "longitude",
            "temp" => "temperature",
            other => other,
        };
        Field::ALL
            .into_iter()
            .find(|field| field.name() == normalized)
            .ok_or_else(|| format!("Unknown field '{}'", s.trim()))
    }
}

/// Field name to message; an absent key means the field is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<Field, String>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn insert(&mut self, field: Field, message: String) {
        self.0.insert(field, message);
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .iter()
            .map(|(field, message)| format!("{}: {}", field, message))
            .collect();
        f.write_str(&parts.join("; "))
    }
}

/// Check a single raw value. Returns the message to show next to the field.
pub fn validate_field(field: Field, raw: Option<&str>) -> Option<String> {
    let value = match raw.map(str::trim) {
        Some(value) if !value.is_empty() => value,
        _ => return Some(format!("{} is required", field.label())),
    };

    match field {
        Field::SoilType => {
            if value.parse::<SoilType>().is_err() {
                return Some(one_of(field, SoilType::ALL.iter().map(SoilType::as_str)));
            }
            None
        }
        Field::CropType => {
            if value.parse::<CropType>().is_err() {
                return Some(one_of(field, CropType::ALL.iter().map(CropType::as_str)));
            }
            None
        }
        _ => {
            let number = match parse_number(value) {
                Some(number) => number,
                None => return Some("Please enter a valid number".to_string()),
            };
            let (min, max) = field.range()?;
            if number < min || number > max {
                return Some(format!("Value must be between {} and {}", min, max));
            }
            None
        }
    }
}

/// Validate every field of the draft
pub fn validate_all(draft: &FormDraft) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    for field in Field::ALL {
        if let Some(message) = validate_field(field, draft.get(field)) {
            errors.insert(field, message);
        }
    }
    errors
}

fn parse_number(value: &str) -> Option<f64> {
    value.parse::<f64>().ok().filter(|number| number.is_finite())
}

fn one_of<'a>(field: Field, options: impl Iterator<Item = &'a str>) -> String {
    let options: Vec<&str> = options.collect();
    format!("{} must be one of: {}", field.label(), options.join(", "))
}

/// The form as the user is editing it: one raw string per field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormDraft {
    pub temperature: Option<String>,
    pub humidity: Option<String>,
    pub soil_type: Option<String>,
    pub crop_type: Option<String>,
    pub water_flow: Option<String>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
}

impl Default for FormDraft {
    fn default() -> Self {
        Self {
            temperature: None,
            humidity: None,
            soil_type: Some(SoilType::Loamy.as_str().to_string()),
            crop_type: Some(CropType::Wheat.as_str().to_string()),
            water_flow: None,
            latitude: None,
            longitude: None,
        }
    }
}

impl FormDraft {
    pub fn get(&self, field: Field) -> Option<&str> {
        self.slot(field).as_deref()
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        *self.slot_mut(field) = Some(value.into());
    }

    pub fn clear(&mut self, field: Field) {
        *self.slot_mut(field) = None;
    }

    /// Turn the draft into typed input, or report every invalid field.
    pub fn parse(&self) -> Result<FormInput, ValidationErrors> {
        let errors = validate_all(self);
        if !errors.is_empty() {
            return Err(errors);
        }

        // validate_all guarantees every slot parses
        let number = |field: Field| {
            self.get(field)
                .and_then(|value| parse_number(value.trim()))
                .unwrap_or_default()
        };
        let categorical_error = |field: Field| {
            let mut errors = ValidationErrors::new();
            errors.insert(field, format!("{} is required", field.label()));
            errors
        };

        Ok(FormInput {
            temperature: number(Field::Temperature),
            humidity: number(Field::Humidity),
            soil_type: self
                .get(Field::SoilType)
                .and_then(|value| value.parse().ok())
                .ok_or_else(|| categorical_error(Field::SoilType))?,
            crop_type: self
                .get(Field::CropType)
                .and_then(|value| value.parse().ok())
                .ok_or_else(|| categorical_error(Field::CropType))?,
            water_flow: number(Field::WaterFlow),
            latitude: number(Field::Latitude),
            longitude: number(Field::Longitude),
        })
    }

    fn slot(&self, field: Field) -> &Option<String> {
        match field {
            Field::Temperature => &self.temperature,
            Field::Humidity => &self.humidity,
            Field::SoilType => &self.soil_type,
            Field::CropType => &self.crop_type,
            Field::WaterFlow => &self.water_flow,
            Field::Latitude => &self.latitude,
            Field::Longitude => &self.longitude,
        }
    }

    fn slot_mut(&mut self, field: Field) -> &mut Option<String> {
        match field {
            Field::Temperature => &mut self.temperature,
            Field::Humidity => &mut self.humidity,
            Field::SoilType => &mut self.soil_type,
            Field::CropType => &mut self.crop_type,
            Field::WaterFlow => &mut self.water_flow,
            Field::Latitude => &mut self.latitude,
            Field::Longitude => &mut self.longitude,
        }
    }
}

impl From<&FormInput> for FormDraft {
    fn from(input: &FormInput) -> Self {
        Self {
            temperature: Some(input.temperature.to_string()),
            humidity: Some(input.humidity.to_string()),
            soil_type: Some(input.soil_type.as_str().to_string()),
            crop_type: Some(input.crop_type.as_str().to_string()),
            water_flow: Some(input.water_flow.to_string()),
            latitude: Some(input.latitude.to_string()),
            longitude: Some(input.longitude.to_string()),
        }
    }
}
