//! City name autocomplete against a GeoDB-style `/geo/cities` endpoint.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use skycast_core::{LookupConfig, LookupError, ReqwestErrorExt};
use tracing::instrument;

/// One city as returned by the lookup service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityRecord {
    pub name: String,
    #[serde(default)]
    pub country: String,
    #[serde(default, rename = "countryCode")]
    pub country_code: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
}

impl CityRecord {
    /// Short country marker used in labels, preferring the ISO code
    fn country_marker(&self) -> &str {
        self.country_code.as_deref().unwrap_or(&self.country)
    }

    fn in_country(&self, country: &str) -> bool {
        self.country_code
            .as_deref()
            .is_some_and(|code| code.eq_ignore_ascii_case(country))
            || self.country.eq_ignore_ascii_case(country)
    }
}

/// A ranked suggestion: the label shown and the city it selects
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    pub label: String,
    pub city: String,
}

impl Suggestion {
    fn from_record(record: &CityRecord) -> Self {
        let label = format!("{}, {}", record.name, record.country_marker());
        Self {
            city: city_from_suggestion(&label).to_string(),
            label,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CitiesResponse {
    #[serde(default)]
    data: Vec<CityRecord>,
}

#[derive(Debug, Clone)]
pub struct CityLookupClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    host: String,
    limit: u8,
    preferred_country: Option<String>,
}

impl CityLookupClient {
    pub fn from_config(config: &LookupConfig) -> Result<Self, LookupError> {
        let client = Client::builder()
            .build()
            .map_err(|e| LookupError::Network(e.to_string()))?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.resolved_api_key(),
            host: config.host.clone(),
            limit: config.limit,
            preferred_country: config.preferred_country.clone(),
        })
    }

    /// Point the client at another server (used by tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Ranked suggestions for a typed prefix.
    ///
    /// Blank input returns no suggestions without contacting the service.
    #[instrument(skip(self))]
    pub async fn search(&self, input: &str) -> Result<Vec<Suggestion>, LookupError> {
        let prefix = input.trim();
        if prefix.is_empty() {
            return Ok(Vec::new());
        }

        let api_key = self.api_key.as_deref().ok_or(LookupError::NotConfigured)?;
        let limit = self.limit.to_string();
        let url = format!("{}/geo/cities", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("namePrefix", prefix),
                ("limit", limit.as_str()),
                ("sort", "-population"),
            ])
            .header("X-RapidAPI-Key", api_key)
            .header("X-RapidAPI-Host", &self.host)
            .send()
            .await
            .map_err(|e| LookupError::Network(e.into_network_error().to_string()))?;

        if !response.status().is_success() {
            tracing::warn!(status = %response.status(), "City lookup failed");
            return Err(LookupError::Network(format!(
                "HTTP error! status: {}",
                response.status().as_u16()
            )));
        }

        let body: CitiesResponse = response
            .json()
            .await
            .map_err(|e| LookupError::Network(e.to_string()))?;

        if body.data.is_empty() {
            return Err(LookupError::NotFound);
        }

        let suggestions = rank_suggestions(prefix, &body.data, self.preferred_country.as_deref());
        tracing::debug!(count = suggestions.len(), "City suggestions ranked");
        Ok(suggestions)
    }
}

/// Order lookup results for display.
///
/// With a preferred country, only its cities are kept (an exact name match
/// first); if none are in that country every result is shown.
pub fn rank_suggestions(
    input: &str,
    cities: &[CityRecord],
    preferred_country: Option<&str>,
) -> Vec<Suggestion> {
    let preferred: Vec<&CityRecord> = match preferred_country {
        Some(country) => cities.iter().filter(|c| c.in_country(country)).collect(),
        None => cities.iter().collect(),
    };

    if preferred.is_empty() {
        return cities.iter().map(Suggestion::from_record).collect();
    }

    let needle = input.trim().to_lowercase();
    let exact = preferred
        .iter()
        .position(|c| c.name.to_lowercase() == needle);

    let mut ranked = Vec::with_capacity(preferred.len());
    if let Some(index) = exact {
        ranked.push(Suggestion::from_record(preferred[index]));
    }
    ranked.extend(
        preferred
            .iter()
            .enumerate()
            .filter(|(i, _)| Some(*i) != exact)
            .map(|(_, c)| Suggestion::from_record(c)),
    );
    ranked
}

/// City name carried by a suggestion label ("Pune, IN" -> "Pune")
pub fn city_from_suggestion(label: &str) -> &str {
    label.split(',').next().unwrap_or(label).trim()
}
