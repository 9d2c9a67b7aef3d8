//! WeatherAPI client: forecast (current + days + air quality) and per-day history.

use chrono::NaiveDate;
use reqwest::{Client, Response, StatusCode};
use skycast_core::{ReqwestErrorExt, WeatherConfig};
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

use crate::types::{DayForecast, FetchError, LocationQuery, WeatherPayload};
use crate::wire::ApiResponse;

const USER_AGENT: &str = concat!("SkyCast/", env!("CARGO_PKG_VERSION"));

/// Connection settings for [`WeatherProvider`]
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub base_url: String,
    pub api_key: Option<String>,
    pub city_forecast_days: u8,
    pub coords_forecast_days: u8,
    pub timeout: Duration,
}

impl From<&WeatherConfig> for ProviderSettings {
    fn from(config: &WeatherConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.resolved_api_key(),
            city_forecast_days: config.city_forecast_days,
            coords_forecast_days: config.coords_forecast_days,
            timeout: config.timeout(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct WeatherProvider {
    client: Arc<Client>,
    settings: ProviderSettings,
}

impl WeatherProvider {
    pub fn new(settings: ProviderSettings) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| FetchError::Network(e.to_string()))?;

        if settings.api_key.is_none() {
            tracing::warn!("No weather API key configured; requests will be rejected upstream");
        }

        Ok(Self {
            client: Arc::new(client),
            settings,
        })
    }

    pub fn from_config(config: &WeatherConfig) -> Result<Self, FetchError> {
        Self::new(ProviderSettings::from(config))
    }

    fn forecast_days_for(&self, query: &LocationQuery) -> u8 {
        if query.is_city() {
            self.settings.city_forecast_days
        } else {
            self.settings.coords_forecast_days
        }
    }

    /// Fetch current conditions, forecast days and air quality in one request.
    ///
    /// The payload is validated before it is returned; see [`FetchError`] for
    /// how failures are classified.
    #[instrument(skip(self), fields(q = %query))]
    pub async fn fetch(&self, query: &LocationQuery) -> Result<WeatherPayload, FetchError> {
        let days = self.forecast_days_for(query).to_string();
        let q = query.as_query_param();
        let url = format!("{}/forecast.json", self.settings.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("key", self.api_key()),
                ("q", q.as_str()),
                ("days", days.as_str()),
                ("aqi", "yes"),
                ("alerts", "yes"),
            ])
            .send()
            .await
            .map_err(transport_error)?;

        let envelope = read_envelope(response, query).await?;
        let payload = envelope.into_payload()?;

        tracing::info!(
            location = %payload.location.name,
            days = payload.forecast.len(),
            "Forecast fetched"
        );
        Ok(payload)
    }

    /// Fetch the historical summary for one calendar day.
    #[instrument(skip(self), fields(q = %query, dt = %date))]
    pub async fn fetch_history_day(
        &self,
        query: &LocationQuery,
        date: NaiveDate,
    ) -> Result<DayForecast, FetchError> {
        let q = query.as_query_param();
        let dt = date.format("%Y-%m-%d").to_string();
        let url = format!("{}/history.json", self.settings.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[("key", self.api_key()), ("q", q.as_str()), ("dt", dt.as_str())])
            .send()
            .await
            .map_err(transport_error)?;

        read_envelope(response, query).await?.into_history_day()
    }

    fn api_key(&self) -> &str {
        self.settings.api_key.as_deref().unwrap_or_default()
    }
}

fn transport_error(e: reqwest::Error) -> FetchError {
    FetchError::Network(e.into_network_error().to_string())
}

/// Read and classify a provider response.
///
/// An explicit `{error}` payload wins over the HTTP status. Otherwise a
/// non-success status is a network error and an undecodable body is a data
/// error.
async fn read_envelope(
    response: Response,
    query: &LocationQuery,
) -> Result<ApiResponse, FetchError> {
    let status = response.status();
    let body = response.text().await.map_err(transport_error)?;
    let parsed = serde_json::from_str::<ApiResponse>(&body);

    if let Ok(ApiResponse {
        error: Some(error), ..
    }) = &parsed
    {
        tracing::debug!(code = ?error.code, status = %status, "Provider returned an error payload");
        return Err(if error.is_query_rejection() {
            query.rejection(error.message.clone())
        } else {
            FetchError::Network(format!("provider error: {}", error.message))
        });
    }

    if !status.is_success() {
        return Err(FetchError::Network(describe_status(status)));
    }

    parsed.map_err(|e| FetchError::InvalidData(format!("undecodable response: {}", e)))
}

fn describe_status(status: StatusCode) -> String {
    format!("HTTP error! status: {}", status.as_u16())
}
