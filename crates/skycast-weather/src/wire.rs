//! WeatherAPI response shapes and their conversion into the crate's types.
//!
//! Scalar readings default when absent; only the blocks the dashboard cannot
//! work without are optional here, so validation can name what is missing.

use chrono::NaiveDate;
use serde::Deserialize;

use crate::types::{
    AirQuality, Alert, Astro, Condition, CurrentConditions, DayForecast, DaySummary, FetchError,
    Location, WeatherPayload,
};

/// Provider error codes that describe the service or account, not the query
const SERVICE_ERROR_CODES: &[u32] = &[1002, 2006, 2007, 2008, 2009, 9999];

/// Envelope shared by `/forecast.json` and `/history.json`
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ApiResponse {
    pub error: Option<ApiErrorBody>,
    pub location: Option<ApiLocation>,
    pub current: Option<ApiCurrent>,
    pub forecast: Option<ApiForecast>,
    pub alerts: Option<ApiAlerts>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    pub code: Option<u32>,
    #[serde(default)]
    pub message: String,
}

impl ApiErrorBody {
    /// True when the error is about the query itself (unknown place, bad `q`)
    pub fn is_query_rejection(&self) -> bool {
        !self
            .code
            .is_some_and(|code| SERVICE_ERROR_CODES.contains(&code))
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct ApiLocation {
    name: String,
    region: String,
    country: String,
    tz_id: String,
    localtime: String,
    lat: f64,
    lon: f64,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ApiCondition {
    #[serde(default)]
    text: String,
    #[serde(default)]
    icon: String,
    #[serde(default)]
    code: u32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct ApiAirQuality {
    co: f64,
    no2: f64,
    o3: f64,
    so2: f64,
    pm2_5: f64,
    pm10: f64,
    #[serde(rename = "us-epa-index")]
    us_epa_index: Option<u8>,
    #[serde(rename = "gb-defra-index")]
    gb_defra_index: Option<u8>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct ApiCurrent {
    last_updated: String,
    temp_c: f64,
    feelslike_c: f64,
    is_day: u8,
    pub condition: Option<ApiCondition>,
    wind_kph: f64,
    wind_degree: u16,
    wind_dir: String,
    gust_kph: f64,
    humidity: u8,
    cloud: u8,
    vis_km: f64,
    pressure_mb: f64,
    uv: f64,
    pub air_quality: Option<ApiAirQuality>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ApiForecast {
    #[serde(default)]
    pub forecastday: Vec<ApiForecastDay>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiForecastDay {
    date: String,
    #[serde(default)]
    day: ApiDay,
    #[serde(default)]
    astro: ApiAstro,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct ApiDay {
    maxtemp_c: f64,
    mintemp_c: f64,
    avgtemp_c: f64,
    maxwind_kph: f64,
    totalprecip_mm: f64,
    avghumidity: f64,
    daily_chance_of_rain: u8,
    uv: f64,
    condition: ApiCondition,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct ApiAstro {
    sunrise: String,
    sunset: String,
    moonrise: String,
    moonset: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ApiAlerts {
    #[serde(default)]
    alert: Vec<ApiAlert>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct ApiAlert {
    headline: String,
    severity: String,
    event: String,
    areas: String,
    effective: String,
    expires: String,
}

impl From<ApiCondition> for Condition {
    fn from(c: ApiCondition) -> Self {
        Self {
            text: c.text,
            icon: normalize_icon_url(&c.icon),
            code: c.code,
        }
    }
}

/// The provider sends protocol-relative icon URLs ("//cdn.weatherapi.com/...")
fn normalize_icon_url(icon: &str) -> String {
    if icon.starts_with("//") {
        format!("https:{}", icon)
    } else {
        icon.to_string()
    }
}

impl From<ApiAirQuality> for AirQuality {
    fn from(a: ApiAirQuality) -> Self {
        Self {
            pm2_5: a.pm2_5,
            pm10: a.pm10,
            co: a.co,
            no2: a.no2,
            so2: a.so2,
            o3: a.o3,
            us_epa_index: a.us_epa_index,
            gb_defra_index: a.gb_defra_index,
        }
    }
}

impl From<ApiLocation> for Location {
    fn from(l: ApiLocation) -> Self {
        Self {
            name: l.name,
            region: l.region,
            country: l.country,
            timezone: l.tz_id,
            local_time: l.localtime,
            latitude: l.lat,
            longitude: l.lon,
        }
    }
}

impl From<ApiAlert> for Alert {
    fn from(a: ApiAlert) -> Self {
        Self {
            headline: a.headline,
            severity: a.severity,
            event: a.event,
            areas: a.areas,
            effective: a.effective,
            expires: a.expires,
        }
    }
}

impl ApiForecastDay {
    pub fn into_day(self) -> Result<DayForecast, FetchError> {
        let date = NaiveDate::parse_from_str(&self.date, "%Y-%m-%d").map_err(|e| {
            FetchError::InvalidData(format!("invalid forecast date {:?}: {}", self.date, e))
        })?;

        Ok(DayForecast {
            date,
            day: DaySummary {
                max_temp: self.day.maxtemp_c,
                min_temp: self.day.mintemp_c,
                avg_temp: self.day.avgtemp_c,
                max_wind_kph: self.day.maxwind_kph,
                total_precip_mm: self.day.totalprecip_mm,
                avg_humidity: self.day.avghumidity,
                chance_of_rain: self.day.daily_chance_of_rain,
                uv_index: self.day.uv,
                condition: self.day.condition.into(),
            },
            astro: Astro {
                sunrise: self.astro.sunrise,
                sunset: self.astro.sunset,
                moonrise: self.astro.moonrise,
                moonset: self.astro.moonset,
            },
        })
    }
}

impl ApiResponse {
    /// Check that every block the dashboard needs is present and convert.
    ///
    /// Requires `current.condition`, `location`, `forecast.forecastday[0]`
    /// and `current.air_quality`.
    pub fn into_payload(self) -> Result<WeatherPayload, FetchError> {
        let current = self
            .current
            .ok_or_else(|| missing("current"))?;
        let condition = current
            .condition
            .ok_or_else(|| missing("current.condition"))?;
        let location = self.location.ok_or_else(|| missing("location"))?;
        let days = self
            .forecast
            .map(|f| f.forecastday)
            .filter(|days| !days.is_empty())
            .ok_or_else(|| missing("forecast.forecastday"))?;
        let air_quality = current
            .air_quality
            .ok_or_else(|| missing("current.air_quality"))?;

        let forecast = days
            .into_iter()
            .map(ApiForecastDay::into_day)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(WeatherPayload {
            location: location.into(),
            current: CurrentConditions {
                temperature: current.temp_c,
                feels_like: current.feelslike_c,
                condition: condition.into(),
                wind_kph: current.wind_kph,
                wind_degree: current.wind_degree,
                wind_direction: current.wind_dir,
                gust_kph: current.gust_kph,
                humidity: current.humidity,
                cloud_cover: current.cloud,
                visibility_km: current.vis_km,
                pressure_mb: current.pressure_mb,
                uv_index: current.uv,
                is_day: current.is_day != 0,
                last_updated: current.last_updated,
                air_quality: air_quality.into(),
            },
            forecast,
            alerts: self
                .alerts
                .map(|a| a.alert.into_iter().map(Alert::from).collect())
                .unwrap_or_default(),
        })
    }

    /// First day of a `/history.json` response
    pub fn into_history_day(self) -> Result<DayForecast, FetchError> {
        self.forecast
            .and_then(|f| f.forecastday.into_iter().next())
            .ok_or_else(|| missing("forecast.forecastday"))?
            .into_day()
    }
}

fn missing(block: &str) -> FetchError {
    FetchError::InvalidData(format!("response is missing `{}`", block))
}
