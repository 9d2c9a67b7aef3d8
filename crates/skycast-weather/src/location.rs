//! Device position sources.
//!
//! A terminal has no browser geolocation prompt, so the position comes from
//! fixed coordinates in the config or an IP lookup service. Every source is
//! bounded by a timeout.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use skycast_core::{LocationConfig, LocationMode};
use std::time::Duration;
use tracing::instrument;

use crate::types::{LocationError, LocationQuery};

/// A resolved device position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn to_query(self) -> LocationQuery {
        LocationQuery::coordinates(self.latitude, self.longitude)
    }
}

/// Source of the device's current position
#[async_trait]
pub trait Geolocator: Send + Sync {
    async fn locate(&self) -> Result<Coordinates, LocationError>;

    fn name(&self) -> &'static str;
}

/// Always reports the configured coordinates
#[derive(Debug, Clone)]
pub struct FixedGeolocator {
    coordinates: Coordinates,
}

impl FixedGeolocator {
    pub fn new(coordinates: Coordinates) -> Self {
        Self { coordinates }
    }
}

#[async_trait]
impl Geolocator for FixedGeolocator {
    async fn locate(&self) -> Result<Coordinates, LocationError> {
        Ok(self.coordinates)
    }

    fn name(&self) -> &'static str {
        "fixed"
    }
}

/// Location access turned off; behaves like a denied permission prompt
#[derive(Debug, Clone, Default)]
pub struct DisabledGeolocator;

#[async_trait]
impl Geolocator for DisabledGeolocator {
    async fn locate(&self) -> Result<Coordinates, LocationError> {
        Err(LocationError::PermissionDenied)
    }

    fn name(&self) -> &'static str {
        "disabled"
    }
}

#[derive(Debug, Deserialize)]
struct IpLookupResponse {
    status: String,
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lon: Option<f64>,
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Approximate position from an ip-api.com style `/json` endpoint
#[derive(Debug, Clone)]
pub struct IpGeolocator {
    client: Client,
    base_url: String,
}

impl IpGeolocator {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, LocationError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LocationError::Other(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl Geolocator for IpGeolocator {
    #[instrument(skip(self), fields(base_url = %self.base_url))]
    async fn locate(&self) -> Result<Coordinates, LocationError> {
        let url = format!("{}/json", self.base_url);
        let response = self.client.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                LocationError::Timeout
            } else {
                LocationError::ServiceUnavailable
            }
        })?;

        if !response.status().is_success() {
            tracing::warn!(status = %response.status(), "IP lookup failed");
            return Err(LocationError::ServiceUnavailable);
        }

        let body: IpLookupResponse = response
            .json()
            .await
            .map_err(|e| LocationError::Other(format!("invalid lookup response: {}", e)))?;

        if body.status != "success" {
            return Err(LocationError::Other(
                body.message.unwrap_or_else(|| "lookup failed".to_string()),
            ));
        }

        match (body.lat, body.lon) {
            (Some(lat), Some(lon)) => {
                tracing::info!(city = ?body.city, "Resolved position from IP");
                Ok(Coordinates::new(lat, lon))
            }
            _ => Err(LocationError::Other("lookup returned no coordinates".into())),
        }
    }

    fn name(&self) -> &'static str {
        "ip"
    }
}

/// Run `geolocator`, giving up after `timeout`.
pub async fn locate_with_timeout(
    geolocator: &dyn Geolocator,
    timeout: Duration,
) -> Result<Coordinates, LocationError> {
    match tokio::time::timeout(timeout, geolocator.locate()).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(source = geolocator.name(), ?timeout, "Geolocation timed out");
            Err(LocationError::Timeout)
        }
    }
}

/// Build the geolocator selected by `config.mode`.
pub fn geolocator_from_config(
    config: &LocationConfig,
) -> Result<Box<dyn Geolocator>, LocationError> {
    match config.mode {
        LocationMode::Fixed => match (config.latitude, config.longitude) {
            (Some(lat), Some(lon)) => Ok(Box::new(FixedGeolocator::new(Coordinates::new(lat, lon)))),
            _ => Err(LocationError::Other(
                "fixed location mode needs latitude and longitude".into(),
            )),
        },
        LocationMode::Ip => Ok(Box::new(IpGeolocator::new(
            config.ip_lookup_url.clone(),
            config.timeout(),
        )?)),
        LocationMode::Disabled => Ok(Box::new(DisabledGeolocator)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Stalled;

    #[async_trait]
    impl Geolocator for Stalled {
        async fn locate(&self) -> Result<Coordinates, LocationError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(Coordinates::new(0.0, 0.0))
        }

        fn name(&self) -> &'static str {
            "stalled"
        }
    }

    #[tokio::test]
    async fn test_fixed_geolocator() {
        let geo = FixedGeolocator::new(Coordinates::new(12.97, 77.59));
        let coords = locate_with_timeout(&geo, Duration::from_secs(1)).await.unwrap();
        assert_eq!(coords, Coordinates::new(12.97, 77.59));
        assert_eq!(coords.to_query().as_query_param(), "12.97,77.59");
    }

    #[tokio::test]
    async fn test_disabled_is_permission_denied() {
        let err = locate_with_timeout(&DisabledGeolocator, Duration::from_secs(1))
            .await
            .unwrap_err();
        assert_eq!(err, LocationError::PermissionDenied);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_geolocator_times_out() {
        let err = locate_with_timeout(&Stalled, Duration::from_secs(10))
            .await
            .unwrap_err();
        assert_eq!(err, LocationError::Timeout);
    }

    #[test]
    fn test_from_config_fixed_requires_coordinates() {
        let mut config = LocationConfig {
            mode: LocationMode::Fixed,
            ..LocationConfig::default()
        };
        assert!(geolocator_from_config(&config).is_err());

        config.latitude = Some(1.0);
        config.longitude = Some(2.0);
        assert_eq!(geolocator_from_config(&config).unwrap().name(), "fixed");
    }

    #[test]
    fn test_from_config_default_is_ip() {
        let geo = geolocator_from_config(&LocationConfig::default()).unwrap();
        assert_eq!(geo.name(), "ip");
    }
}
