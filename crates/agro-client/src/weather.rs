//! Open-Meteo current conditions lookup

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use agro_core::{AmbientWeather, Coordinates, Error, Result, WeatherProvider};

use crate::config::ApiConfig;

/// Public weather API used to prefill temperature and humidity
pub struct OpenMeteoClient {
    forecast_url: String,
    client: Client,
}

#[derive(Deserialize)]
struct ForecastResponse {
    current: CurrentConditions,
}

#[derive(Deserialize)]
struct CurrentConditions {
    temperature_2m: f64,
    relative_humidity_2m: f64,
}

impl OpenMeteoClient {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| Error::Transport(e.to_string()))?;

        Ok(Self {
            forecast_url: config.weather_api_url.clone(),
            client,
        })
    }

    fn request_url(&self, coordinates: Coordinates) -> Result<Url> {
        Url::parse_with_params(
            &self.forecast_url,
            &[
                ("latitude", coordinates.latitude.to_string()),
                ("longitude", coordinates.longitude.to_string()),
                ("current", "temperature_2m,relative_humidity_2m".to_string()),
                ("temperature_unit", "celsius".to_string()),
            ],
        )
        .map_err(|e| Error::Configuration(format!("Invalid WEATHER_API_URL: {}", e)))
    }
}

#[async_trait]
impl WeatherProvider for OpenMeteoClient {
    async fn current_conditions(&self, coordinates: Coordinates) -> Result<AmbientWeather> {
        let url = self.request_url(coordinates)?;
        tracing::debug!(%url, "fetching current weather");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::service(
                Some(status.as_u16()),
                format!("Weather service returned status {}", status),
            ));
        }

        let forecast: ForecastResponse = response
            .json()
            .await
            .map_err(|e| Error::Serialization(e.to_string()))?;

        Ok(AmbientWeather::new(
            forecast.current.temperature_2m,
            forecast.current.relative_humidity_2m,
        ))
    }
}
