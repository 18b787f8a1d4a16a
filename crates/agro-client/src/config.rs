//! Client configuration

use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use url::Url;

use agro_core::{Coordinates, Error, Result};

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000";
pub const DEFAULT_WEATHER_API_URL: &str = "https://api.open-meteo.com/v1/forecast";
pub const DEFAULT_GEOLOCATION_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for the prediction and weather clients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub api_base_url: String,
    pub weather_api_url: String,
    /// `None` keeps the transport default
    pub request_timeout: Option<Duration>,
    pub geolocation_timeout: Duration,
    /// Position reported as the device location, when known
    pub device_location: Option<Coordinates>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            weather_api_url: DEFAULT_WEATHER_API_URL.to_string(),
            request_timeout: None,
            geolocation_timeout: DEFAULT_GEOLOCATION_TIMEOUT,
            device_location: None,
        }
    }
}

impl ApiConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let api_base_url = env::var("API_BASE_URL")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());

        let weather_api_url = env::var("WEATHER_API_URL")
            .unwrap_or_else(|_| DEFAULT_WEATHER_API_URL.to_string());

        let request_timeout = match env::var("API_TIMEOUT_SECS") {
            Ok(value) => Some(Duration::from_secs(parse_env("API_TIMEOUT_SECS", &value)?)),
            Err(_) => None,
        };

        let geolocation_timeout = match env::var("GEOLOCATION_TIMEOUT_SECS") {
            Ok(value) => Duration::from_secs(parse_env("GEOLOCATION_TIMEOUT_SECS", &value)?),
            Err(_) => DEFAULT_GEOLOCATION_TIMEOUT,
        };

        let device_location =
            device_location_from(env::var("AGRO_LATITUDE").ok(), env::var("AGRO_LONGITUDE").ok())?;

        let config = Self {
            api_base_url,
            weather_api_url,
            request_timeout,
            geolocation_timeout,
            device_location,
        };
        config.validate()?;
        Ok(config)
    }

    /// Create configuration pointing at an explicit prediction service
    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_device_location(mut self, coordinates: Coordinates) -> Self {
        self.device_location = Some(coordinates);
        self
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("API_BASE_URL", &self.api_base_url),
            ("WEATHER_API_URL", &self.weather_api_url),
        ] {
            Url::parse(value)
                .map_err(|e| Error::Configuration(format!("{} '{}' is not a valid URL: {}", name, value, e)))?;
        }
        Ok(())
    }

    /// Resolve a path such as `predict` against the base URL, keeping any
    /// path prefix the base URL already carries.
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        let mut base = Url::parse(&self.api_base_url)
            .map_err(|e| Error::Configuration(format!("Invalid API_BASE_URL: {}", e)))?;
        if !base.path().ends_with('/') {
            let with_slash = format!("{}/", base.path());
            base.set_path(&with_slash);
        }
        base.join(path.trim_start_matches('/'))
            .map_err(|e| Error::Configuration(format!("Invalid endpoint '{}': {}", path, e)))
    }
}

/// Both coordinates or neither; a lone one is a configuration mistake.
fn device_location_from(latitude: Option<String>, longitude: Option<String>) -> Result<Option<Coordinates>> {
    match (latitude, longitude) {
        (Some(lat), Some(lon)) => Ok(Some(Coordinates::new(
            parse_env("AGRO_LATITUDE", &lat)?,
            parse_env("AGRO_LONGITUDE", &lon)?,
        ))),
        (Some(_), None) => Err(Error::Configuration(
            "AGRO_LATITUDE is set but AGRO_LONGITUDE is missing".to_string(),
        )),
        (None, Some(_)) => Err(Error::Configuration(
            "AGRO_LONGITUDE is set but AGRO_LATITUDE is missing".to_string(),
        )),
        (None, None) => Ok(None),
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::Configuration(format!("{} has an invalid value '{}'", name, value)))
}
