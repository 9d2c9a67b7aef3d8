//! Centralized error types for SkyCast.
//!
//! This module provides a typed error hierarchy that:
//! - Classifies weather failures into the four kinds the dashboard can show
//! - Provides user-friendly messages suitable for display
//! - Preserves full error context for logging

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The error kinds a fetch cycle can end in.
///
/// Each kind maps to one error panel in the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchErrorKind {
    /// The provider has no match for the requested city name.
    CityNotFound,
    /// Transport failure or a non-success status without an error payload.
    NetworkError,
    /// Geolocation failed, or the provider rejected a coordinate query.
    LocationError,
    /// The response was missing required blocks or could not be decoded.
    DataError,
}

impl FetchErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CityNotFound => "city_not_found",
            Self::NetworkError => "network_error",
            Self::LocationError => "location_error",
            Self::DataError => "data_error",
        }
    }

    /// Primary line of the error panel.
    pub fn headline(self) -> &'static str {
        match self {
            Self::CityNotFound => "We couldn't find the city you searched for.",
            Self::NetworkError => "Unable to connect to weather services.",
            Self::LocationError => "Unable to access your location.",
            Self::DataError => "Weather data is temporarily unavailable.",
        }
    }

    /// Secondary hint shown under the headline.
    pub fn hint(self) -> &'static str {
        match self {
            Self::CityNotFound => "Please check the spelling and try again.",
            Self::NetworkError => "Please check your internet connection.",
            Self::LocationError => "Please allow location access or search manually.",
            Self::DataError => "Please try again in a moment.",
        }
    }
}

impl std::fmt::Display for FetchErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Headline used when an error carries no classification.
pub const UNEXPECTED_HEADLINE: &str = "An unexpected error occurred.";
/// Hint paired with [`UNEXPECTED_HEADLINE`].
pub const UNEXPECTED_HINT: &str = "Please try again.";

/// Top-level application error type.
///
/// Use `user_message()` to get a display-appropriate message.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Weather service error: {0}")]
    Weather(#[from] WeatherError),

    #[error("City lookup error: {0}")]
    Lookup(#[from] LookupError),
}

impl AppError {
    /// Returns a user-friendly message suitable for display.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Config(e) => e.user_message(),
            AppError::Weather(e) => e.user_message(),
            AppError::Lookup(e) => e.user_message(),
        }
    }

    /// The dashboard error kind, if this error has one.
    pub fn kind(&self) -> Option<FetchErrorKind> {
        match self {
            AppError::Weather(e) => Some(e.kind()),
            AppError::Config(_) | AppError::Lookup(_) => None,
        }
    }
}

/// Transport failures, classified from a reqwest error. Callers keep the
/// rendered message.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::Invalid(_) => "Invalid configuration. Check your settings.",
        }
    }
}

/// Weather service errors, as surfaced to the dashboard.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("City not found: {0}")]
    CityNotFound(String),

    #[error("Location error: {0}")]
    Location(String),

    #[error("Weather API unreachable: {0}")]
    Network(String),

    #[error("Incomplete weather data: {0}")]
    Data(String),
}

impl WeatherError {
    pub fn kind(&self) -> FetchErrorKind {
        match self {
            WeatherError::CityNotFound(_) => FetchErrorKind::CityNotFound,
            WeatherError::Location(_) => FetchErrorKind::LocationError,
            WeatherError::Network(_) => FetchErrorKind::NetworkError,
            WeatherError::Data(_) => FetchErrorKind::DataError,
        }
    }

    pub fn user_message(&self) -> &'static str {
        self.kind().headline()
    }
}

/// City lookup (autocomplete) errors.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("City not found")]
    NotFound,

    #[error("Lookup request failed: {0}")]
    Network(String),

    #[error("City lookup is not configured")]
    NotConfigured,
}

impl LookupError {
    pub fn user_message(&self) -> &'static str {
        match self {
            LookupError::NotFound => "City not found",
            LookupError::Network(_) => "Check your internet connection",
            LookupError::NotConfigured => "City suggestions are unavailable.",
        }
    }
}

/// Extension trait for converting reqwest errors to our error types.
pub trait ReqwestErrorExt {
    fn into_network_error(self) -> NetworkError;
}

impl ReqwestErrorExt for reqwest::Error {
    fn into_network_error(self) -> NetworkError {
        if self.is_timeout() {
            NetworkError::Timeout
        } else if self.is_connect() {
            NetworkError::ConnectionFailed(self.to_string())
        } else if let Some(status) = self.status() {
            NetworkError::ServerError {
                status: status.as_u16(),
                message: self.to_string(),
            }
        } else if self.is_decode() {
            NetworkError::InvalidResponse(self.to_string())
        } else {
            NetworkError::ConnectionFailed(self.to_string())
        }
    }
}
