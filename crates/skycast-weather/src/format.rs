//! Display helpers: dates, air-quality bands and condition icons.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Reformat an ISO date (`2024-03-05`) as `05-03-2024`.
pub fn format_date(iso_date: &str) -> Result<String, chrono::ParseError> {
    let date = NaiveDate::parse_from_str(iso_date.trim(), "%Y-%m-%d")?;
    Ok(format_naive_date(date))
}

pub fn format_naive_date(date: NaiveDate) -> String {
    date.format("%d-%m-%Y").to_string()
}

/// Severity band for a particulate reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AqiLevel {
    Good,
    Moderate,
    UnhealthyForSensitive,
    Unhealthy,
}

impl AqiLevel {
    pub fn from_reading(value: f64) -> Self {
        if value <= 50.0 {
            Self::Good
        } else if value <= 100.0 {
            Self::Moderate
        } else if value <= 150.0 {
            Self::UnhealthyForSensitive
        } else {
            Self::Unhealthy
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Good => "Good",
            Self::Moderate => "Moderate",
            Self::UnhealthyForSensitive => "Unhealthy for sensitive groups",
            Self::Unhealthy => "Unhealthy",
        }
    }

    /// Color token used by the renderer
    pub fn color(self) -> &'static str {
        match self {
            Self::Good => "green",
            Self::Moderate => "yellow",
            Self::UnhealthyForSensitive => "orange",
            Self::Unhealthy => "red",
        }
    }
}

/// Icon chosen from a forecast day's condition text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionIcon {
    Sun,
    Cloud,
    CloudRain,
    CloudSnow,
    CloudLightning,
    CloudFog,
    Moon,
}

impl ConditionIcon {
    pub fn from_text(condition: &str) -> Self {
        let text = condition.to_lowercase();
        let has = |needle: &str| text.contains(needle);

        if has("sun") || has("clear") {
            Self::Sun
        } else if has("cloud") {
            Self::Cloud
        } else if has("rain") {
            Self::CloudRain
        } else if has("snow") {
            Self::CloudSnow
        } else if has("thunder") || has("storm") {
            Self::CloudLightning
        } else if has("fog") || has("mist") {
            Self::CloudFog
        } else if has("night") {
            Self::Moon
        } else {
            Self::Cloud
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            Self::Sun => "☀",
            Self::Cloud => "☁",
            Self::CloudRain => "🌧",
            Self::CloudSnow => "🌨",
            Self::CloudLightning => "🌩",
            Self::CloudFog => "🌫",
            Self::Moon => "☾",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_date() {
        assert_eq!(format_date("2024-03-05").unwrap(), "05-03-2024");
        assert_eq!(format_date("1999-12-31").unwrap(), "31-12-1999");
    }

    #[test]
    fn test_format_date_rejects_garbage() {
        assert!(format_date("05-03-2024").is_err());
        assert!(format_date("").is_err());
    }

    #[test]
    fn test_aqi_bands() {
        assert_eq!(AqiLevel::from_reading(12.0), AqiLevel::Good);
        assert_eq!(AqiLevel::from_reading(50.0), AqiLevel::Good);
        assert_eq!(AqiLevel::from_reading(50.1), AqiLevel::Moderate);
        assert_eq!(AqiLevel::from_reading(150.0), AqiLevel::UnhealthyForSensitive);
        assert_eq!(AqiLevel::from_reading(151.0), AqiLevel::Unhealthy);
    }

    #[test]
    fn test_condition_icons() {
        assert_eq!(ConditionIcon::from_text("Sunny"), ConditionIcon::Sun);
        assert_eq!(ConditionIcon::from_text("Partly cloudy"), ConditionIcon::Cloud);
        assert_eq!(
            ConditionIcon::from_text("Patchy rain possible"),
            ConditionIcon::CloudRain
        );
        assert_eq!(
            ConditionIcon::from_text("Thundery outbreaks possible"),
            ConditionIcon::CloudLightning
        );
        assert_eq!(ConditionIcon::from_text("Freezing fog"), ConditionIcon::CloudFog);
        assert_eq!(ConditionIcon::from_text("Blizzard"), ConditionIcon::Cloud);
    }
}
