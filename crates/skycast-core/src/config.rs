use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Environment variable consulted when `weather.api_key` is empty.
pub const WEATHER_API_KEY_ENV: &str = "SKYCAST_WEATHER_API_KEY";
/// Environment variable consulted when `lookup.api_key` is empty.
pub const LOOKUP_API_KEY_ENV: &str = "SKYCAST_LOOKUP_API_KEY";

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Weather provider settings
    #[serde(default)]
    pub weather: WeatherConfig,

    /// City lookup (autocomplete) settings
    #[serde(default)]
    pub lookup: LookupConfig,

    /// Geolocation settings
    #[serde(default)]
    pub location: LocationConfig,

    /// Terminal presentation preferences
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    /// Base URL of the WeatherAPI-compatible provider
    pub base_url: String,

    /// API key; empty means "read SKYCAST_WEATHER_API_KEY"
    pub api_key: String,

    /// Forecast horizon when querying by city name
    pub city_forecast_days: u8,

    /// Forecast horizon when querying by coordinates
    pub coords_forecast_days: u8,

    /// Number of past days fetched for the timeline
    pub history_days: u8,

    /// Per-request timeout
    pub timeout_secs: u64,

    /// City shown when nothing is selected and geolocation fails
    pub default_city: String,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.weatherapi.com/v1".to_string(),
            api_key: String::new(),
            city_forecast_days: 4,
            coords_forecast_days: 3,
            history_days: 3,
            timeout_secs: 10,
            default_city: "Bangalore".to_string(),
        }
    }
}

impl WeatherConfig {
    /// Configured key, or the environment fallback.
    pub fn resolved_api_key(&self) -> Option<String> {
        resolve_key(&self.api_key, WEATHER_API_KEY_ENV)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupConfig {
    /// Base URL of the GeoDB-compatible city API
    pub base_url: String,

    /// RapidAPI key; empty means "read SKYCAST_LOOKUP_API_KEY"
    pub api_key: String,

    /// Value sent as `X-RapidAPI-Host`
    pub host: String,

    /// Maximum number of cities requested
    pub limit: u8,

    /// Country code whose cities are ranked first (e.g. "IN")
    pub preferred_country: Option<String>,

    /// Quiet period before a lookup is issued
    pub debounce_ms: u64,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            base_url: "https://wft-geo-db.p.rapidapi.com/v1".to_string(),
            api_key: String::new(),
            host: "wft-geo-db.p.rapidapi.com".to_string(),
            limit: 10,
            preferred_country: Some("IN".to_string()),
            debounce_ms: 300,
        }
    }
}

impl LookupConfig {
    pub fn resolved_api_key(&self) -> Option<String> {
        resolve_key(&self.api_key, LOOKUP_API_KEY_ENV)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

/// How the current position is obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LocationMode {
    /// Ask an IP geolocation service
    #[default]
    Ip,
    /// Use the configured latitude/longitude
    Fixed,
    /// Never geolocate; always fall back to the default city
    Disabled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationConfig {
    pub mode: LocationMode,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Base URL of the ip-api compatible service
    pub ip_lookup_url: String,
    pub timeout_secs: u64,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            mode: LocationMode::Ip,
            latitude: None,
            longitude: None,
            ip_lookup_url: "http://ip-api.com".to_string(),
            timeout_secs: 10,
        }
    }
}

impl LocationConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Render the air quality panel
    pub show_air_quality: bool,

    /// Use ANSI colors in the terminal renderer
    pub color: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            show_air_quality: true,
            color: true,
        }
    }
}

fn resolve_key(configured: &str, env_var: &str) -> Option<String> {
    if !configured.trim().is_empty() {
        return Some(configured.trim().to_string());
    }
    std::env::var(env_var)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Config {
    /// Load configuration from the default location, creating it if missing
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit path, writing defaults if the file doesn't exist
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            let config = Self::default();
            config.save_to(config_path)?;
            return Ok(config);
        }

        let contents =
            std::fs::read_to_string(config_path).context("Failed to read config file")?;

        let config: Config = toml::from_str(&contents).context("Failed to parse config file")?;

        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Warnings are logged; critical errors fail the load.
    pub fn load_validated(config_path: Option<&Path>) -> Result<(Self, ValidationResult)> {
        let config = match config_path {
            Some(path) => Self::load_from(path)?,
            None => Self::load()?,
        };
        let validation = config.validate();

        if !validation.is_valid() {
            anyhow::bail!(
                "Configuration validation failed: {}",
                validation.error_summary()
            );
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    /// Validate the configuration
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        validate_url(&self.weather.base_url, "weather.base_url", &mut result);
        validate_url(&self.lookup.base_url, "lookup.base_url", &mut result);

        if self.weather.resolved_api_key().is_none() {
            result.add_warning(
                "weather.api_key",
                format!("No API key configured (set {})", WEATHER_API_KEY_ENV),
            );
        }
        if self.lookup.resolved_api_key().is_none() {
            result.add_warning(
                "lookup.api_key",
                "No city lookup key configured - suggestions will be unavailable",
            );
        }

        for (field, days) in [
            ("weather.city_forecast_days", self.weather.city_forecast_days),
            ("weather.coords_forecast_days", self.weather.coords_forecast_days),
        ] {
            if !(1..=14).contains(&days) {
                result.add_error(field, "Forecast days must be between 1 and 14");
            }
        }

        if self.weather.history_days > 7 {
            result.add_error(
                "weather.history_days",
                "History is limited to the previous 7 days",
            );
        }

        for (field, secs) in [
            ("weather.timeout_secs", self.weather.timeout_secs),
            ("location.timeout_secs", self.location.timeout_secs),
        ] {
            if secs == 0 {
                result.add_error(field, "Timeout must be greater than 0");
            }
        }

        if self.weather.default_city.trim().is_empty() {
            result.add_error("weather.default_city", "Default city must not be empty");
        }

        if self.lookup.limit == 0 {
            result.add_error("lookup.limit", "Lookup limit must be greater than 0");
        }

        match self.location.mode {
            LocationMode::Fixed => match (self.location.latitude, self.location.longitude) {
                (Some(lat), Some(lon)) => {
                    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
                        result.add_error(
                            "location",
                            "Coordinates out of range (latitude -90..90, longitude -180..180)",
                        );
                    }
                }
                _ => result.add_error(
                    "location",
                    "Fixed mode requires both latitude and longitude",
                ),
            },
            LocationMode::Ip => {
                validate_url(
                    &self.location.ip_lookup_url,
                    "location.ip_lookup_url",
                    &mut result,
                );
            }
            LocationMode::Disabled => {}
        }

        result
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(config_path, contents).context("Failed to write config file")?;

        Ok(())
    }

    /// Get the path to the configuration file
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("skycast");

        Ok(config_dir.join("config.toml"))
    }
}

fn validate_url(url_str: &str, field_name: &str, result: &mut ValidationResult) {
    match Url::parse(url_str) {
        Ok(url) => {
            if url.scheme() != "http" && url.scheme() != "https" {
                result.add_error(
                    field_name,
                    format!("URL must use http or https scheme, got: {}", url.scheme()),
                );
            }

            if url.host().is_none() {
                result.add_error(field_name, "URL must have a host");
            }

            if url.port() == Some(0) {
                result.add_error(field_name, "Port cannot be 0");
            }
        }
        Err(e) => {
            result.add_error(field_name, format!("Invalid URL: {}", e));
        }
    }
}
