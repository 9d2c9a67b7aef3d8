use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use skycast_core::FetchErrorKind;

use crate::format::format_naive_date;

/// What the user asked for: a free-text city or a coordinate pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationQuery {
    City(String),
    Coordinates { latitude: f64, longitude: f64 },
}

impl LocationQuery {
    pub fn city(name: impl Into<String>) -> Self {
        Self::City(name.into())
    }

    pub fn coordinates(latitude: f64, longitude: f64) -> Self {
        Self::Coordinates {
            latitude,
            longitude,
        }
    }

    /// Value sent as the provider's `q` parameter
    pub fn as_query_param(&self) -> String {
        match self {
            Self::City(name) => name.trim().to_string(),
            Self::Coordinates {
                latitude,
                longitude,
            } => format!("{},{}", latitude, longitude),
        }
    }

    pub fn is_city(&self) -> bool {
        matches!(self, Self::City(_))
    }

    /// The error an explicit provider rejection maps to for this kind of query
    pub fn rejection(&self, message: impl Into<String>) -> FetchError {
        match self {
            Self::City(_) => FetchError::CityNotFound(message.into()),
            Self::Coordinates { .. } => FetchError::LocationRejected(message.into()),
        }
    }
}

impl std::fmt::Display for LocationQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::City(name) => write!(f, "{}", name),
            Self::Coordinates {
                latitude,
                longitude,
            } => write!(f, "{:.4}, {:.4}", latitude, longitude),
        }
    }
}

/// Resolved place, as reported by the provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub region: String,
    pub country: String,
    pub timezone: String,
    pub local_time: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Condition text plus the provider's icon reference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub text: String,
    pub icon: String,
    pub code: u32,
}

/// Pollutant concentrations in μg/m³
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirQuality {
    pub pm2_5: f64,
    pub pm10: f64,
    pub co: f64,
    pub no2: f64,
    pub so2: f64,
    pub o3: f64,
    pub us_epa_index: Option<u8>,
    pub gb_defra_index: Option<u8>,
}

/// Current weather conditions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub temperature: f64,
    pub feels_like: f64,
    pub condition: Condition,
    pub wind_kph: f64,
    pub wind_degree: u16,
    pub wind_direction: String,
    pub gust_kph: f64,
    pub humidity: u8,
    pub cloud_cover: u8,
    pub visibility_km: f64,
    pub pressure_mb: f64,
    pub uv_index: f64,
    pub is_day: bool,
    pub last_updated: String,
    pub air_quality: AirQuality,
}

/// One calendar day's aggregated summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySummary {
    pub max_temp: f64,
    pub min_temp: f64,
    pub avg_temp: f64,
    pub max_wind_kph: f64,
    pub total_precip_mm: f64,
    pub avg_humidity: f64,
    pub chance_of_rain: u8,
    pub uv_index: f64,
    pub condition: Condition,
}

/// Sunrise/sunset/moonrise/moonset, as local clock strings ("06:12 AM")
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Astro {
    pub sunrise: String,
    pub sunset: String,
    pub moonrise: String,
    pub moonset: String,
}

/// Forecast (or historical) data for one calendar day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayForecast {
    pub date: NaiveDate,
    pub day: DaySummary,
    pub astro: Astro,
}

/// Severe weather alert attached to a forecast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub headline: String,
    pub severity: String,
    pub event: String,
    pub areas: String,
    pub effective: String,
    pub expires: String,
}

/// A validated forecast response: every block the dashboard needs is present
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherPayload {
    pub location: Location,
    pub current: CurrentConditions,
    pub forecast: Vec<DayForecast>,
    pub alerts: Vec<Alert>,
}

impl WeatherPayload {
    pub fn today(&self) -> Option<&DayForecast> {
        self.forecast.first()
    }
}

/// Where a timeline entry came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntrySource {
    History,
    Forecast,
}

/// One merged day record in the history + forecast timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub date: NaiveDate,
    pub day: DaySummary,
    pub astro: Astro,
    pub source: EntrySource,
    pub is_today: bool,
}

impl TimelineEntry {
    pub fn from_day(day: DayForecast, source: EntrySource, today: NaiveDate) -> Self {
        Self {
            is_today: day.date == today,
            date: day.date,
            day: day.day,
            astro: day.astro,
            source,
        }
    }

    /// Date as shown on the timeline card (DD-MM-YYYY)
    pub fn display_date(&self) -> String {
        format_naive_date(self.date)
    }
}

/// Geolocation failures
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LocationError {
    #[error("Location permission denied")]
    PermissionDenied,
    #[error("Location service unavailable")]
    ServiceUnavailable,
    #[error("Location request timed out")]
    Timeout,
    #[error("Location error: {0}")]
    Other(String),
}

/// Weather provider errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FetchError {
    #[error("City not found: {0}")]
    CityNotFound(String),
    #[error("Location rejected by provider: {0}")]
    LocationRejected(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Invalid weather data: {0}")]
    InvalidData(String),
}

impl FetchError {
    pub fn kind(&self) -> FetchErrorKind {
        match self {
            Self::CityNotFound(_) => FetchErrorKind::CityNotFound,
            Self::LocationRejected(_) => FetchErrorKind::LocationError,
            Self::Network(_) => FetchErrorKind::NetworkError,
            Self::InvalidData(_) => FetchErrorKind::DataError,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_param_for_city_is_trimmed() {
        assert_eq!(LocationQuery::city("  Pune ").as_query_param(), "Pune");
    }

    #[test]
    fn test_query_param_for_coordinates() {
        assert_eq!(
            LocationQuery::coordinates(12.97, 77.59).as_query_param(),
            "12.97,77.59"
        );
    }

    #[test]
    fn test_rejection_depends_on_query_kind() {
        assert_eq!(
            LocationQuery::city("Atlantis").rejection("No matching location found."),
            FetchError::CityNotFound("No matching location found.".into())
        );
        assert_eq!(
            LocationQuery::coordinates(0.0, 0.0).rejection("nope").kind(),
            FetchErrorKind::LocationError
        );
    }

    #[test]
    fn test_fetch_error_kinds() {
        assert_eq!(
            FetchError::Network("HTTP 500".into()).kind(),
            FetchErrorKind::NetworkError
        );
        assert_eq!(
            FetchError::InvalidData("missing".into()).kind(),
            FetchErrorKind::DataError
        );
    }
}
