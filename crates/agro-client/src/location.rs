//! Device location and weather enrichment
//!
//! Coordinates and weather are fetched independently. A failed weather lookup
//! never discards coordinates that were already obtained; it only produces an
//! advisory message.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

use agro_core::{
    AmbientWeather, Coordinates, Error, LocationProvider, Result, WeatherProvider,
};

use crate::config::ApiConfig;
use crate::weather::OpenMeteoClient;

/// Location provider that always reports the same position
#[derive(Debug, Clone, Copy)]
pub struct FixedLocation {
    coordinates: Coordinates,
}

impl FixedLocation {
    pub fn new(coordinates: Coordinates) -> Self {
        Self { coordinates }
    }
}

#[async_trait]
impl LocationProvider for FixedLocation {
    async fn current_position(&self) -> Result<Coordinates> {
        Ok(self.coordinates)
    }
}

/// Outcome of a location lookup with optional weather prefill
#[derive(Debug, Clone, PartialEq)]
pub struct Enrichment {
    pub coordinates: Coordinates,
    pub weather: Option<AmbientWeather>,
    /// Set when the weather lookup failed; the coordinates are still valid.
    pub advisory: Option<String>,
}

pub struct LocationEnricher {
    locator: Option<Arc<dyn LocationProvider>>,
    weather: Option<Arc<dyn WeatherProvider>>,
    locate_timeout: Duration,
}

impl LocationEnricher {
    pub fn new(
        locator: Option<Arc<dyn LocationProvider>>,
        weather: Option<Arc<dyn WeatherProvider>>,
        locate_timeout: Duration,
    ) -> Self {
        Self {
            locator,
            weather,
            locate_timeout,
        }
    }

    /// Build the enricher described by the configuration: a fixed device
    /// location when one is configured, and Open-Meteo for weather.
    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        let locator = config
            .device_location
            .map(|coords| Arc::new(FixedLocation::new(coords)) as Arc<dyn LocationProvider>);
        let weather = Arc::new(OpenMeteoClient::new(config)?) as Arc<dyn WeatherProvider>;

        Ok(Self::new(locator, Some(weather), config.geolocation_timeout))
    }

    pub fn has_location(&self) -> bool {
        self.locator.is_some()
    }

    pub async fn locate(&self) -> Result<Coordinates> {
        let locator = self.locator.as_ref().ok_or(Error::GeolocationUnavailable)?;

        match timeout(self.locate_timeout, locator.current_position()).await {
            Ok(Ok(coords)) => Ok(Coordinates::new(coords.latitude, coords.longitude)),
            Ok(Err(Error::GeolocationUnavailable)) => Err(Error::GeolocationUnavailable),
            Ok(Err(Error::GeolocationDenied(reason))) => Err(Error::GeolocationDenied(reason)),
            Ok(Err(other)) => Err(Error::GeolocationDenied(other.to_string())),
            Err(_) => Err(Error::GeolocationDenied("location request timed out".to_string())),
        }
    }

    /// Weather lookup; any failure is reported as [`Error::EnrichmentDegraded`].
    pub async fn fetch_ambient_weather(&self, coordinates: Coordinates) -> Result<AmbientWeather> {
        let weather = self
            .weather
            .as_ref()
            .ok_or_else(|| Error::EnrichmentDegraded("no weather source configured".to_string()))?;

        weather
            .current_conditions(coordinates)
            .await
            .map_err(|e| Error::EnrichmentDegraded(e.to_string()))
    }

    /// Locate the device, then try to prefill the weather.
    pub async fn enrich(&self) -> Result<Enrichment> {
        let coordinates = self.locate().await?;

        match self.fetch_ambient_weather(coordinates).await {
            Ok(weather) => Ok(Enrichment {
                coordinates,
                weather: Some(weather),
                advisory: None,
            }),
            Err(e) => {
                tracing::warn!(error = %e, "weather enrichment failed, keeping coordinates");
                Ok(Enrichment {
                    coordinates,
                    weather: None,
                    advisory: Some(e.to_string()),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StaticWeather(Option<AmbientWeather>);

    #[async_trait]
    impl WeatherProvider for StaticWeather {
        async fn current_conditions(&self, _coordinates: Coordinates) -> Result<AmbientWeather> {
            self.0.ok_or_else(|| Error::Transport("connection refused".to_string()))
        }
    }

    struct HangingLocation;

    #[async_trait]
    impl LocationProvider for HangingLocation {
        async fn current_position(&self) -> Result<Coordinates> {
            std::future::pending().await
        }
    }

    struct RefusingLocation;

    #[async_trait]
    impl LocationProvider for RefusingLocation {
        async fn current_position(&self) -> Result<Coordinates> {
            Err(Error::GeolocationDenied("user denied the request".to_string()))
        }
    }

    fn fixed() -> Option<Arc<dyn LocationProvider>> {
        Some(Arc::new(FixedLocation::new(Coordinates::new(28.6139, 77.209))))
    }

    #[tokio::test]
    async fn test_no_locator_is_unavailable() {
        let enricher = LocationEnricher::new(None, None, Duration::from_secs(1));
        assert!(matches!(enricher.locate().await, Err(Error::GeolocationUnavailable)));
        assert!(matches!(enricher.enrich().await, Err(Error::GeolocationUnavailable)));
    }

    #[tokio::test]
    async fn test_refusal_is_denied() {
        let enricher = LocationEnricher::new(Some(Arc::new(RefusingLocation)), None, Duration::from_secs(1));
        match enricher.locate().await {
            Err(Error::GeolocationDenied(reason)) => assert_eq!(reason, "user denied the request"),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_timeout_is_denied() {
        let enricher =
            LocationEnricher::new(Some(Arc::new(HangingLocation)), None, Duration::from_millis(20));
        assert!(matches!(enricher.locate().await, Err(Error::GeolocationDenied(_))));
    }

    #[tokio::test]
    async fn test_weather_prefill() {
        let weather = Arc::new(StaticWeather(Some(AmbientWeather::new(24.3, 61.0))));
        let enricher = LocationEnricher::new(fixed(), Some(weather), Duration::from_secs(1));

        let enrichment = enricher.enrich().await.unwrap();
        assert_eq!(enrichment.coordinates, Coordinates::new(28.6139, 77.209));
        assert_eq!(enrichment.weather, Some(AmbientWeather::new(24.3, 61.0)));
        assert!(enrichment.advisory.is_none());
    }

    #[tokio::test]
    async fn test_weather_failure_keeps_coordinates() {
        let weather = Arc::new(StaticWeather(None));
        let enricher = LocationEnricher::new(fixed(), Some(weather), Duration::from_secs(1));

        let enrichment = enricher.enrich().await.unwrap();
        assert_eq!(enrichment.coordinates.latitude, 28.6139);
        assert!(enrichment.weather.is_none());
        assert_eq!(
            enrichment.advisory.as_deref(),
            Some("Weather lookup failed: Network error: connection refused")
        );
    }
}
